//! netdd — a network-to-device bulk transfer daemon.
//!
//! One TCP port per configured device: a client connects, streams bytes,
//! and the daemon writes them verbatim to a local block/char device or
//! file, parameterized with `dd`-style operands (`of=`, `bs=`).
//!
//! # Architecture Overview
//!
//! ```text
//! config file ──▶ config::loader ──▶ Vec<ConfigRecord>
//!                                          │
//!                                lifecycle::Supervisor
//!                                          │  one tokio task per record
//!                                  net::PortListener
//!                         bind [::]:port → listen → accept loop
//!                                          │  one connection at a time
//!                                  net::ClientSession
//!                          client socket ──bytes──▶ of=<device>
//! ```
//!
//! Ports operate independently: a bind failure or a failed session on one
//! port never affects its siblings. The only state shared across ports is
//! the [`lifecycle::Shutdown`] coordinator.

pub mod config;
pub mod lifecycle;
pub mod net;

pub use config::{load_config, ConfigRecord};
pub use lifecycle::{Shutdown, Supervisor};
pub use net::{ClientSession, PortListener};
