//! Logger handles.
//!
//! A [`Logger`] binds a fixed set of tags and forwards each call to the
//! formatter. It holds no per-request state: the request id is read from
//! the ambient context on every call, so one handle can be shared freely
//! across concurrent requests.

pub mod sink;

use std::fmt;
use std::sync::Arc;

use crate::format::{Inspect, Level, Metadata, Record};

pub use sink::{MemorySink, Sink, StdSink};

/// Process-wide logger with no tags.
pub static LOGGER: Logger = Logger::new();

/// A tagged logger.
#[derive(Clone, Default)]
pub struct Logger {
    meta: Metadata,
    sink: Option<Arc<dyn Sink>>,
}

impl Logger {
    /// Untagged logger writing to the standard streams.
    pub const fn new() -> Self {
        Self {
            meta: Metadata::new(),
            sink: None,
        }
    }

    /// Logger tagged with a scalar (`"db"`, `42`) or a [`Metadata`] mapping.
    ///
    /// Scalars become the bare `<value>` prefix; mappings render as
    /// `<key=value | ...>`.
    pub fn tagged(tag: impl Into<Metadata>) -> Self {
        Self {
            meta: tag.into(),
            sink: None,
        }
    }

    /// Send lines to `sink` instead of the standard streams.
    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Logger with `extra` tags appended (or overriding same-named tags).
    pub fn child(&self, extra: Metadata) -> Logger {
        let mut meta = self.meta.clone();
        for (key, value) in extra.iter() {
            meta.insert(key, value.clone());
        }
        Self {
            meta,
            sink: self.sink.clone(),
        }
    }

    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub fn log(&self, level: Level, args: &[&dyn Inspect]) {
        let rendered = Record::capture(level, &self.meta, args).render();
        match &self.sink {
            Some(sink) => sink.write_line(rendered.stream, &rendered.line),
            None => StdSink.write_line(rendered.stream, &rendered.line),
        }
    }

    pub fn error(&self, args: &[&dyn Inspect]) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: &[&dyn Inspect]) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: &[&dyn Inspect]) {
        self.log(Level::Info, args);
    }

    pub fn http(&self, args: &[&dyn Inspect]) {
        self.log(Level::Http, args);
    }

    pub fn verbose(&self, args: &[&dyn Inspect]) {
        self.log(Level::Verbose, args);
    }

    pub fn debug(&self, args: &[&dyn Inspect]) {
        self.log(Level::Debug, args);
    }

    pub fn silly(&self, args: &[&dyn Inspect]) {
        self.log(Level::Silly, args);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("meta", &self.meta)
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}

/// Log at an explicit level: `log!(logger, Level::Info, "user", id)`.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(, $arg:expr)* $(,)?) => {
        $logger.log($level, &[$(&$arg as &dyn $crate::format::Inspect),*])
    };
}

/// `error!(logger, "failed", err_code)`
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.error(&[$(&$arg as &dyn $crate::format::Inspect),*])
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.warn(&[$(&$arg as &dyn $crate::format::Inspect),*])
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.info(&[$(&$arg as &dyn $crate::format::Inspect),*])
    };
}

#[macro_export]
macro_rules! http {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.http(&[$(&$arg as &dyn $crate::format::Inspect),*])
    };
}

#[macro_export]
macro_rules! verbose {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.verbose(&[$(&$arg as &dyn $crate::format::Inspect),*])
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.debug(&[$(&$arg as &dyn $crate::format::Inspect),*])
    };
}

#[macro_export]
macro_rules! silly {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.silly(&[$(&$arg as &dyn $crate::format::Inspect),*])
    };
}
