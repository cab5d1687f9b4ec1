//! Output sinks.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use crate::format::{Rendered, Stream};

/// Destination for finished lines. One call per log line.
pub trait Sink: Send + Sync {
    fn write_line(&self, stream: Stream, line: &str);
}

/// Process standard output and standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdSink;

impl Sink for StdSink {
    fn write_line(&self, stream: Stream, line: &str) {
        // Write failures (closed pipe, full disk) are dropped.
        let _ = match stream {
            Stream::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
            Stream::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
        };
    }
}

/// Keeps every line in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<Rendered>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<Rendered> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn stdout(&self) -> Vec<String> {
        self.on(Stream::Stdout)
    }

    pub fn stderr(&self) -> Vec<String> {
        self.on(Stream::Stderr)
    }

    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn on(&self, stream: Stream) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|r| r.stream == stream)
            .map(|r| r.line)
            .collect()
    }
}

impl Sink for MemorySink {
    fn write_line(&self, stream: Stream, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Rendered {
                stream,
                line: line.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_splits_streams() {
        let sink = MemorySink::new();
        sink.write_line(Stream::Stdout, "a");
        sink.write_line(Stream::Stderr, "b");
        sink.write_line(Stream::Stdout, "c");

        assert_eq!(sink.stdout(), vec!["a", "c"]);
        assert_eq!(sink.stderr(), vec!["b"]);
        assert_eq!(sink.lines().len(), 3);

        sink.clear();
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_clones_share_buffer() {
        let sink = MemorySink::new();
        let other = sink.clone();
        other.write_line(Stream::Stdout, "x");
        assert_eq!(sink.stdout(), vec!["x"]);
    }
}
