//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (line-oriented, dd operand format)
//!     → loader.rs (line parsing, one ConfigRecord per accepted line)
//!     → Vec<ConfigRecord> (immutable for the process lifetime)
//!     → shared via Arc to one listener task per record
//!
//! Per accepted connection:
//!     record.parameter_map() → session parameters (of=, bs=)
//! ```
//!
//! # Design Decisions
//! - Records are immutable once loaded; there is no reload path
//! - Malformed or commented lines are skipped, never fatal
//! - An empty record set is the caller's problem (main exits early)

pub mod loader;
pub mod record;

pub use loader::load_config;
pub use loader::ConfigError;
pub use record::ConfigRecord;
