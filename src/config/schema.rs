//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::context::OutputFormat;
use crate::http::request::LoggerOptions;

/// Root configuration for the demo server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// Listener settings.
    pub server: ServerConfig,

    /// Request logging settings.
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Request logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Line encoding inside requests ("text" or "json").
    pub output: OutputFormat,

    /// Add `x-request-id` to every response.
    pub echo_request_id: bool,

    /// Reuse an incoming `x-request-id` header instead of generating one.
    pub trust_request_id_header: bool,

    /// Filter for the server's own diagnostics (trace, debug, info, warn, error).
    pub diagnostics_level: String,

    /// Render the server's own `tracing` events in the request log format.
    pub bridge_tracing: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::Text,
            echo_request_id: true,
            trust_request_id_header: false,
            diagnostics_level: "info".to_string(),
            bridge_tracing: false,
        }
    }
}

impl LoggingConfig {
    pub fn options(&self) -> LoggerOptions {
        LoggerOptions {
            output: self.output,
            echo_request_id: self.echo_request_id,
            trust_request_id_header: self.trust_request_id_header,
        }
    }
}
