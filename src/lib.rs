//! Request-scoped logging.
//!
//! Every line logged while a request is being handled carries that
//! request's id, without passing the id around. The entry layer
//! ([`init_logger`]) opens an ambient [`RequestContext`] for each request;
//! [`Logger`] handles read it on every call and pick the line shape:
//!
//! ```text
//! no request        2024-05-01 10:00:00.000 <db> [INFO]: connected
//! request, text     2024-05-01 10:00:00.000 [5f0c…] <db> [INFO]: query ok
//! request, json     {"timestamp":"…","requestId":"5f0c…","meta":{"str":"db"},"level":"info","message":"query ok"}
//! ```

pub mod config;
pub mod context;
pub mod format;
pub mod http;
pub mod lifecycle;
pub mod logger;
pub mod observability;

pub use config::LoggerConfig;
pub use context::{OutputFormat, RequestContext};
pub use format::{Inspect, Level, Metadata};
pub use http::{init_logger, ContextLayer, DemoServer, LoggerOptions};
pub use lifecycle::Shutdown;
pub use logger::{Logger, LOGGER};
