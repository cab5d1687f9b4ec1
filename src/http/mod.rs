//! HTTP integration.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, TraceLayer)
//!     → request.rs (ContextLayer: new request id, ambient scope)
//!     → handlers (log through Logger; id picked up implicitly)
//!     → response with x-request-id
//! ```

pub mod request;
pub mod server;

pub use request::{init_logger, ContextLayer, ContextService, LoggerOptions, X_REQUEST_ID};
pub use server::DemoServer;
