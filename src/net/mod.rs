//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (per-port bind + accept loop, one client at a time)
//!     → session.rs (byte relay: client socket → configured device)
//!
//! Listener states:
//!     Created → Bound → Listening → Accepting ⇄ Serving → Stopped
//! ```
//!
//! # Design Decisions
//! - One listener per configured port; ports share no state
//! - Sessions on a port are strictly serialized, not pipelined
//! - Session failures are logged and the port resumes accepting

pub mod listener;
pub mod session;

pub use listener::{ListenerError, PortListener};
pub use session::{ClientSession, SessionError, SessionParams};
