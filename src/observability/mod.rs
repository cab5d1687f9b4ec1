//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Server diagnostics (startup, bind, shutdown):
//!     tracing macros
//!         → logging.rs (registry + EnvFilter + fmt layer)
//!         → or tracing.rs (RequestLogLayer, same line format as Logger)
//! ```
//!
//! # Design Decisions
//! - The server's own diagnostics use `tracing` with structured fields
//! - The bridge layer lets `tracing::info!` inside a request carry the
//!   request id without changing call sites

pub mod logging;
pub mod tracing;

pub use self::logging::init_tracing;
pub use self::tracing::RequestLogLayer;
