//! Request-scoped logging demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ ContextLayer ──▶ TraceLayer ──▶ handler ──▶ nested async fns
//!                    (new id,                          │              │
//!                     ambient scope)                   │   context::spawn / spawn_blocking
//!                                                      ▼              ▼
//!                                                   Logger ◀───── Logger
//!                                                      │
//!                                                      ▼
//!                               format::Record (reads ambient context)
//!                                                      │
//!                                  stdout (stderr for ERROR), text or JSON
//! ```
//!
//! Usage: `request-logger [--config path.toml] [--output text|json] [--bind addr]`

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use request_logger::config::{load_config, validate_config, ConfigError, LoggerConfig};
use request_logger::observability::init_tracing;
use request_logger::{DemoServer, OutputFormat, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "request-logger")]
#[command(about = "Demo server tagging every log line with its request id", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Line encoding inside requests (text or json).
    #[arg(short, long)]
    output: Option<OutputFormat>,

    /// Bind address, e.g. 127.0.0.1:3000.
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    fn load(&self) -> Result<LoggerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => LoggerConfig::default(),
        };
        if let Some(output) = self.output {
            config.logging.output = output;
        }
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    init_tracing(&config.logging)?;

    tracing::info!(
        bind_address = %config.server.bind_address,
        output = %config.logging.output,
        trust_request_id_header = config.logging.trust_request_id_header,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    DemoServer::new(config)
        .run(listener, shutdown.signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
