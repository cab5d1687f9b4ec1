//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use request_logger::logger::MemorySink;
use request_logger::{DemoServer, Logger, LoggerConfig, Shutdown};
use tokio::net::TcpListener;

/// A demo server on an ephemeral port, capturing its log lines.
pub struct TestServer {
    pub addr: SocketAddr,
    pub sink: MemorySink,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a demo server with `config`, listening on 127.0.0.1:0.
pub async fn start_server(mut config: LoggerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.server.bind_address = addr.to_string();

    let sink = MemorySink::new();
    let logger = Logger::new().with_sink(Arc::new(sink.clone()));
    let shutdown = Shutdown::new();
    let server = DemoServer::with_logger(config, logger);
    let signal = shutdown.signal();

    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    TestServer {
        addr,
        sink,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
