//! Ambient per-request context.
//!
//! # Data Flow
//! ```text
//! ContextLayer (http/request.rs)
//!     → establish(ctx, response_future)
//!     → handler code, any depth, any number of .await points
//!     → Logger / formatter calls current()
//! ```
//!
//! # Design Decisions
//! - Backed by a tokio task-local: each task sees only the scope it runs in
//! - Nested scopes shadow the outer value and restore it on exit
//! - `tokio::spawn` does not inherit task-locals; use [`spawn`] or
//!   [`propagate`] to carry the context into detached work

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

tokio::task_local! {
    static CURRENT_CONTEXT: RequestContext;
}

/// Encoding chosen once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colorized bracketed plaintext.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an output format name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown output format `{0}` (expected `text` or `json`)")]
pub struct ParseOutputFormatError(String);

impl FromStr for OutputFormat {
    type Err = ParseOutputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ParseOutputFormatError(s.to_string())),
        }
    }
}

/// Identity of one logical request.
///
/// Cheap to clone; the id is shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: Arc<str>,
    output: OutputFormat,
}

impl RequestContext {
    pub fn new(request_id: impl Into<Arc<str>>, output: OutputFormat) -> Self {
        Self {
            request_id: request_id.into(),
            output,
        }
    }

    /// Context with a freshly generated UUID v4 id.
    pub fn generate(output: OutputFormat) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), output)
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}

/// Run `future` with `context` as the ambient value for its whole execution.
pub async fn establish<F>(context: RequestContext, future: F) -> F::Output
where
    F: Future,
{
    CURRENT_CONTEXT.scope(context, future).await
}

/// Synchronous counterpart of [`establish`].
pub fn establish_sync<F, R>(context: RequestContext, f: F) -> R
where
    F: FnOnce() -> R,
{
    CURRENT_CONTEXT.sync_scope(context, f)
}

/// The context of the calling execution, if any scope dominates it.
pub fn current() -> Option<RequestContext> {
    CURRENT_CONTEXT.try_with(|ctx| ctx.clone()).ok()
}

pub fn current_request_id() -> Option<String> {
    CURRENT_CONTEXT
        .try_with(|ctx| ctx.request_id().to_string())
        .ok()
}

/// Capture the caller's context (if any) so `future` re-enters it wherever it
/// is eventually polled.
pub fn propagate<F>(future: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    let captured = current();
    async move {
        match captured {
            Some(ctx) => establish(ctx, future).await,
            None => future.await,
        }
    }
}

/// `tokio::spawn` that keeps the caller's request context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(propagate(future))
}

/// `tokio::task::spawn_blocking` that keeps the caller's request context.
pub fn spawn_blocking<F, R>(f: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let captured = current();
    tokio::task::spawn_blocking(move || match captured {
        Some(ctx) => establish_sync(ctx, f),
        None => f(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn id() -> Option<String> {
        current_request_id()
    }

    #[tokio::test]
    async fn test_absent_outside_scope() {
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn test_visible_across_await_points() {
        let ctx = RequestContext::new("req-1", OutputFormat::Json);
        establish(ctx, async {
            assert_eq!(id().as_deref(), Some("req-1"));
            tokio::time::sleep(Duration::from_millis(5)).await;
            tokio::task::yield_now().await;
            let seen = current().unwrap();
            assert_eq!(seen.request_id(), "req-1");
            assert_eq!(seen.output(), OutputFormat::Json);
        })
        .await;
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn test_nested_scope_restores_outer() {
        let outer = RequestContext::new("outer", OutputFormat::Text);
        let inner = RequestContext::new("inner", OutputFormat::Json);
        establish(outer, async {
            assert_eq!(id().as_deref(), Some("outer"));
            establish(inner, async {
                assert_eq!(id().as_deref(), Some("inner"));
            })
            .await;
            assert_eq!(id().as_deref(), Some("outer"));
        })
        .await;
    }

    #[tokio::test]
    async fn test_concurrent_scopes_are_isolated() {
        let (tx_b_done, rx_b_done) = tokio::sync::oneshot::channel::<()>();

        let a = tokio::spawn(establish(
            RequestContext::new("A", OutputFormat::Text),
            async move {
                assert_eq!(id().as_deref(), Some("A"));
                rx_b_done.await.unwrap();
                // B has started and finished in the meantime
                id()
            },
        ));

        let b = tokio::spawn(establish(
            RequestContext::new("B", OutputFormat::Text),
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                let seen = id();
                tx_b_done.send(()).unwrap();
                seen
            },
        ));

        assert_eq!(b.await.unwrap().as_deref(), Some("B"));
        assert_eq!(a.await.unwrap().as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_plain_spawn_does_not_inherit() {
        let ctx = RequestContext::new("req-2", OutputFormat::Text);
        let seen = establish(ctx, async { tokio::spawn(async { id() }).await.unwrap() }).await;
        assert_eq!(seen, None);
    }

    #[tokio::test]
    async fn test_spawn_carries_context() {
        let ctx = RequestContext::new("req-3", OutputFormat::Text);
        let handle = establish(ctx, async {
            spawn(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                id()
            })
        })
        .await;
        // the scope has ended; the spawned task still sees the id
        assert_eq!(handle.await.unwrap().as_deref(), Some("req-3"));
    }

    #[tokio::test]
    async fn test_spawn_blocking_carries_context() {
        let ctx = RequestContext::new("req-4", OutputFormat::Text);
        let seen = establish(ctx, async { spawn_blocking(id).await.unwrap() }).await;
        assert_eq!(seen.as_deref(), Some("req-4"));
    }

    #[test]
    fn test_sync_scope() {
        let ctx = RequestContext::new("sync", OutputFormat::Text);
        assert_eq!(establish_sync(ctx, id).as_deref(), Some("sync"));
        assert!(current().is_none());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = RequestContext::generate(OutputFormat::Text);
        let b = RequestContext::generate(OutputFormat::Text);
        assert_ne!(a.request_id(), b.request_id());
        assert_eq!(a.request_id().len(), 36);
    }
}
