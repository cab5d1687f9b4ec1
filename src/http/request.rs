//! Request context middleware.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Run the rest of the request inside the ambient context scope
//! - Expose the context to handlers via request extensions
//! - Optionally echo the ID back in the `x-request-id` response header
//!
//! # Design Decisions
//! - The inner `call` and the whole response future both run in scope, so
//!   handler work after any number of `.await`s still sees the ID
//! - Incoming `x-request-id` headers are ignored unless explicitly trusted

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::http::{HeaderName, HeaderValue, Request, Response};
use tower::{Layer, Service};

use crate::context::{self, OutputFormat, RequestContext};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Options for [`init_logger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerOptions {
    /// Encoding used by every log line inside the request.
    pub output: OutputFormat,
    /// Add `x-request-id` to responses.
    pub echo_request_id: bool,
    /// Reuse a non-empty incoming `x-request-id` instead of generating one.
    pub trust_request_id_header: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            output: OutputFormat::Text,
            echo_request_id: true,
            trust_request_id_header: false,
        }
    }
}

impl LoggerOptions {
    pub fn output(output: OutputFormat) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }
}

/// Build the request entry hook.
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use request_logger::{init_logger, LoggerOptions, OutputFormat};
///
/// let app: Router = Router::new()
///     .route("/", get(|| async { "ok" }))
///     .layer(init_logger(LoggerOptions::output(OutputFormat::Json)));
/// ```
pub fn init_logger(options: LoggerOptions) -> ContextLayer {
    ContextLayer { options }
}

/// Layer establishing a fresh [`RequestContext`] per request.
#[derive(Debug, Clone, Default)]
pub struct ContextLayer {
    options: LoggerOptions,
}

impl<S> Layer<S> for ContextLayer {
    type Service = ContextService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ContextService {
            inner,
            options: self.options.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContextService<S> {
    inner: S,
    options: LoggerOptions,
}

impl<S> ContextService<S> {
    fn context_for<B>(&self, req: &Request<B>) -> RequestContext {
        if self.options.trust_request_id_header {
            let incoming = req
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(id) = incoming {
                return RequestContext::new(id, self.options.output);
            }
        }
        RequestContext::generate(self.options.output)
    }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

impl<S, B, ResBody> Service<Request<B>> for ContextService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let ctx = self.context_for(&req);
        req.extensions_mut().insert(ctx.clone());

        let inner = &mut self.inner;
        let response = context::establish_sync(ctx.clone(), move || inner.call(req));
        let echo = self.options.echo_request_id;

        Box::pin(async move {
            let mut response = context::establish(ctx.clone(), response).await?;
            if echo {
                if let Ok(value) = HeaderValue::from_str(ctx.request_id()) {
                    response.headers_mut().insert(X_REQUEST_ID, value);
                }
            }
            Ok(response)
        })
    }
}
