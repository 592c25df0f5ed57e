//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse CLI → Load config → Supervisor spawns one task per record
//!
//! Shutdown (shutdown.rs):
//!     Signal received → trigger() → listeners stop at loop boundaries
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Listener failures never propagate across ports; the supervisor only
//!   observes task completion
//! - Shutdown is cooperative: a device write in progress always finishes
//! - Join order is newest listener first

pub mod shutdown;
pub mod signals;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use supervisor::Supervisor;
