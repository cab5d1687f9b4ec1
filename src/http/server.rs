//! Demo HTTP server.
//!
//! # Responsibilities
//! - Create Axum Router with the demo handlers
//! - Wire up middleware (request context, tracing)
//! - Serve on a bound listener until the shutdown future resolves
//!
//! The handlers log from nested async calls, from a detached background
//! task and from a blocking worker, so every propagation path can be
//! observed in the output.

use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::LoggerConfig;
use crate::context;
use crate::format::Metadata;
use crate::http::request::init_logger;
use crate::logger::{Logger, LOGGER};

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub logger: Logger,
}

/// HTTP server exercising request-scoped logging.
pub struct DemoServer {
    router: Router,
    config: LoggerConfig,
}

impl DemoServer {
    /// Server whose handlers log through the default logger.
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_logger(config, LOGGER.clone())
    }

    /// Server whose handlers log through `logger` (tags and sink included).
    pub fn with_logger(config: LoggerConfig, logger: Logger) -> Self {
        let state = AppState { logger };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &LoggerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/work/{steps}", get(work_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            // outermost, so the trace layer's own events run in scope too
            .layer(init_logger(config.logging.options()))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            output = %self.config.logging.output,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Logs once in the handler and once from a detached task, then returns
/// the request id.
async fn index_handler(State(state): State<AppState>) -> String {
    let logger = state.logger.child(Metadata::new().with("route", "/"));
    crate::info!(logger, "handling request");

    let background = logger.child(Metadata::new().with("task", "background"));
    context::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        crate::debug!(background, "background work finished");
    });

    context::current_request_id().unwrap_or_default()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkReport {
    request_id: Option<String>,
    steps: u32,
    checksum: u64,
}

/// Descends `steps` levels of async calls, yielding at each level, then
/// hands the result to a blocking worker.
async fn work_handler(State(state): State<AppState>, Path(steps): Path<u32>) -> Json<WorkReport> {
    let steps = steps.min(32);
    let logger = state.logger.child(Metadata::new().with("route", "/work"));
    crate::http!(logger, "work requested", steps);

    let total = descend(&logger, steps).await;

    let worker = logger.child(Metadata::new().with("task", "blocking"));
    let checksum = context::spawn_blocking(move || {
        crate::verbose!(worker, "checksum computed", total);
        total
    })
    .await
    .unwrap_or_default();

    Json(WorkReport {
        request_id: context::current_request_id(),
        steps,
        checksum,
    })
}

fn descend<'a>(logger: &'a Logger, depth: u32) -> std::pin::Pin<Box<dyn Future<Output = u64> + Send + 'a>> {
    Box::pin(async move {
        if depth == 0 {
            return 0;
        }
        tokio::task::yield_now().await;
        crate::silly!(logger, "step", depth);
        depth as u64 + descend(logger, depth - 1).await
    })
}

async fn health_handler() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OutputFormat;
    use crate::logger::MemorySink;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn server(output: OutputFormat) -> (DemoServer, MemorySink) {
        let sink = MemorySink::new();
        let mut config = LoggerConfig::default();
        config.logging.output = output;
        let logger = Logger::new().with_sink(Arc::new(sink.clone()));
        (DemoServer::with_logger(config, logger), sink)
    }

    #[tokio::test]
    async fn test_health() {
        let (server, sink) = server(OutputFormat::Text);
        let res = server
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn test_index_logs_with_request_id() {
        let (server, sink) = server(OutputFormat::Text);
        let res = server
            .router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let id = res.headers()["x-request-id"].to_str().unwrap().to_string();
        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(body, id.as_bytes());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let lines = sink.stdout();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(&format!("[{}] <route=/> [INFO]: handling request", id)));
        assert!(lines[1].contains(&format!(
            "[{}] <route=/ | task=background> [DEBUG]: background work finished",
            id
        )));
    }

    #[tokio::test]
    async fn test_work_json_lines_share_request_id() {
        let (server, sink) = server(OutputFormat::Json);
        let res = server
            .router()
            .oneshot(Request::get("/work/3").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(res.into_body(), 4096).await.unwrap();
        let report: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["steps"], 3);
        assert_eq!(report["checksum"], 6);
        let id = report["requestId"].as_str().unwrap().to_string();

        let lines: Vec<Value> = sink
            .stdout()
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        // 1 http + 3 steps + 1 blocking
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l["requestId"] == id.as_str()));
        assert_eq!(lines[0]["level"], "http");
        assert_eq!(lines[1]["message"], "step 3");
        assert_eq!(lines[4]["meta"]["task"], "blocking");
    }
}
