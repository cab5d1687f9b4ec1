//! Record formatting.
//!
//! # Data Flow
//! ```text
//! Logger::info(args)
//!     → Record::capture (level, metadata, rendered args, context::current())
//!     → Record::render
//!         no context          → colorized line, no request id
//!         context, Text       → colorized line with [request-id]
//!         context, Json       → one JSON object, no color
//!     → Sink::write_line (stderr for ERROR, stdout otherwise)
//! ```
//!
//! # Design Decisions
//! - Presence of a request context is the only switch between the
//!   standalone and request-scoped shapes; metadata never affects it
//! - Rendering is pure given a record; reading the clock and the ambient
//!   context happens once in `capture`

pub mod inspect;
pub mod level;
pub mod meta;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;

use crate::context::{self, OutputFormat, RequestContext};

pub use inspect::{render_args, Debugged, Displayed, Inspect, Inspector};
pub use level::{color_for, Level, RESET};
pub use meta::Metadata;

/// Standard stream a line is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn for_level(level: Level) -> Self {
        match level {
            Level::Error => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }
}

/// A finished line and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub stream: Stream,
    pub line: String,
}

/// One log call, captured at the call site.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub level: Level,
    pub timestamp: DateTime<Utc>,
    pub context: Option<RequestContext>,
    pub meta: &'a Metadata,
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonLine<'a> {
    timestamp: String,
    request_id: &'a str,
    meta: &'a Metadata,
    level: &'static str,
    message: &'a str,
}

impl<'a> Record<'a> {
    /// Capture a record for the calling execution.
    pub fn capture(level: Level, meta: &'a Metadata, args: &[&dyn Inspect]) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            context: context::current(),
            meta,
            message: render_args(args),
        }
    }

    pub fn render(&self) -> Rendered {
        let stream = Stream::for_level(self.level);
        let line = match &self.context {
            None => self.text_line(None),
            Some(ctx) => match ctx.output() {
                OutputFormat::Text => self.text_line(Some(ctx.request_id())),
                OutputFormat::Json => self.json_line(ctx.request_id()),
            },
        };
        Rendered { stream, line }
    }

    fn text_line(&self, request_id: Option<&str>) -> String {
        let request_id = request_id
            .map(|id| format!("[{}] ", id))
            .unwrap_or_default();
        format!(
            "{}{} {}{}[{}]: {}{}",
            self.level.color(),
            text_timestamp(&self.timestamp),
            request_id,
            self.meta.prefix(),
            self.level.as_upper(),
            self.message,
            RESET,
        )
    }

    fn json_line(&self, request_id: &str) -> String {
        let line = JsonLine {
            timestamp: json_timestamp(&self.timestamp),
            request_id,
            meta: self.meta,
            level: self.level.as_str(),
            message: &self.message,
        };
        match serde_json::to_string(&line) {
            Ok(json) => json,
            Err(_) => self.text_line(Some(request_id)),
        }
    }
}

/// Local time, `YYYY-MM-DD HH:MM:SS.mmm`.
pub fn text_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// UTC RFC 3339 with milliseconds, e.g. `2024-05-01T10:00:00.000Z`.
pub fn json_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn record<'a>(level: Level, meta: &'a Metadata, ctx: Option<RequestContext>) -> Record<'a> {
        Record {
            level,
            timestamp: fixed_time(),
            context: ctx,
            meta,
            message: "hello".to_string(),
        }
    }

    #[test]
    fn test_standalone_line() {
        let meta = Metadata::new();
        let out = record(Level::Info, &meta, None).render();
        assert_eq!(out.stream, Stream::Stdout);
        assert!(out.line.starts_with("\x1b[32m"));
        assert!(out.line.ends_with("[INFO]: hello\x1b[0m"));
        let expected = format!("\x1b[32m{} [INFO]: hello\x1b[0m", text_timestamp(&fixed_time()));
        assert_eq!(out.line, expected);
    }

    #[test]
    fn test_standalone_with_metadata() {
        let meta = Metadata::new().with("file", "db.rs").with("line", 9);
        let out = record(Level::Warn, &meta, None).render();
        let expected = format!(
            "\x1b[33m{} <file=db.rs | line=9> [WARN]: hello\x1b[0m",
            text_timestamp(&fixed_time())
        );
        assert_eq!(out.line, expected);
    }

    #[test]
    fn test_request_scoped_text_line() {
        let meta = Metadata::scalar("auth");
        let ctx = RequestContext::new("abc", OutputFormat::Text);
        let out = record(Level::Debug, &meta, Some(ctx)).render();
        let expected = format!(
            "\x1b[34m{} [abc] <auth> [DEBUG]: hello\x1b[0m",
            text_timestamp(&fixed_time())
        );
        assert_eq!(out.line, expected);
        assert_eq!(out.stream, Stream::Stdout);
    }

    #[test]
    fn test_request_scoped_json_line() {
        let meta = Metadata::new().with("user", 0);
        let ctx = RequestContext::new("abc", OutputFormat::Json);
        let out = record(Level::Error, &meta, Some(ctx)).render();
        assert_eq!(out.stream, Stream::Stderr);
        assert!(!out.line.contains('\x1b'));

        let parsed: Value = serde_json::from_str(&out.line).unwrap();
        assert_eq!(parsed["timestamp"], "2024-05-01T10:00:00.000Z");
        assert_eq!(parsed["requestId"], "abc");
        assert_eq!(parsed["meta"]["user"], 0);
        assert_eq!(parsed["level"], "error");
        assert_eq!(parsed["message"], "hello");
    }

    #[test]
    fn test_json_field_order() {
        let meta = Metadata::new();
        let ctx = RequestContext::new("r", OutputFormat::Json);
        let out = record(Level::Info, &meta, Some(ctx)).render();
        assert_eq!(
            out.line,
            r#"{"timestamp":"2024-05-01T10:00:00.000Z","requestId":"r","meta":{},"level":"info","message":"hello"}"#
        );
    }

    #[test]
    fn test_error_goes_to_stderr_without_context() {
        let meta = Metadata::new();
        assert_eq!(record(Level::Error, &meta, None).render().stream, Stream::Stderr);
        assert_eq!(record(Level::Silly, &meta, None).render().stream, Stream::Stdout);
    }

    #[test]
    fn test_capture_reads_ambient_context() {
        let meta = Metadata::new();
        let ctx = RequestContext::new("cap", OutputFormat::Text);
        let captured = context::establish_sync(ctx, || {
            Record::capture(Level::Info, &meta, &[&"a", &1]).render()
        });
        assert!(captured.line.contains("[cap] [INFO]: a 1"));

        let outside = Record::capture(Level::Info, &meta, &[&"a"]).render();
        assert!(!outside.line.contains("[cap]"));
    }

    #[test]
    fn test_timestamp_shapes() {
        let text = text_timestamp(&fixed_time());
        assert_eq!(text.len(), "2024-05-01 10:00:00.000".len());
        assert_eq!(&text[4..5], "-");
        assert_eq!(&text[19..20], ".");
        assert_eq!(json_timestamp(&fixed_time()), "2024-05-01T10:00:00.000Z");
    }
}
