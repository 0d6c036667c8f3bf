//! Per-request access log.
//!
//! One line per request: `<local time> - User: <name> - Path: <path>`.
//! The logger never affects routing; sink failures are reported through
//! `tracing` and otherwise ignored.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::pipeline::{Next, Outcome, RequestContext, Stage};

/// Append-only destination for request log lines.
pub trait LogSink: Send + Sync {
    fn append(&self, line: &str) -> io::Result<()>;
}

/// Appends to a file, creating it if needed.
#[derive(Debug)]
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(|p| p.into_inner());
        writeln!(file, "{line}")
    }
}

/// Emits lines as `tracing` events under the `request_log` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn append(&self, line: &str) -> io::Result<()> {
        tracing::info!(target: "request_log", "{line}");
        Ok(())
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl LogSink for MemorySink {
    fn append(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(line.to_string());
        Ok(())
    }
}

/// Open the configured sink, falling back to tracing when the file is unusable.
pub fn open_sink(path: &str) -> Arc<dyn LogSink> {
    if path.is_empty() {
        return Arc::new(TracingSink);
    }
    match FileSink::open(path) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            tracing::warn!(path, error = %e, "Cannot open request log, logging through tracing instead");
            Arc::new(TracingSink)
        }
    }
}

/// First pipeline stage: records who asked for what, then always continues.
pub struct RequestLogger {
    sink: Arc<dyn LogSink>,
}

impl RequestLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn format_line(ctx: &RequestContext) -> String {
        format!(
            "{} - User: {} - Path: {}",
            ctx.local_time.format("%Y-%m-%d %H:%M:%S%.6f"),
            ctx.identity.display_name(),
            ctx.path
        )
    }
}

impl Stage for RequestLogger {
    fn name(&self) -> &'static str {
        "request_logger"
    }

    fn process(&self, ctx: &RequestContext, next: Next<'_>) -> Outcome {
        if let Err(e) = self.sink.append(&Self::format_line(ctx)) {
            tracing::warn!(error = %e, path = %ctx.path, "Failed to write request log line");
        }
        next.run(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::context;
    use crate::pipeline::Pipeline;
    use crate::security::identity::Identity;
    use axum::http::Method;

    struct BrokenSink;

    impl LogSink for BrokenSink {
        fn append(&self, _line: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_line_format() {
        let mut ctx = context(Method::GET, "/api/conversations");
        assert_eq!(
            RequestLogger::format_line(&ctx),
            "2026-01-15 19:00:00.000000 - User: Anonymous - Path: /api/conversations"
        );

        ctx.identity = Identity::user("u-1", "alice", None);
        assert!(RequestLogger::format_line(&ctx).contains("User: alice"));
    }

    #[test]
    fn test_logs_and_continues() {
        let sink = Arc::new(MemorySink::default());
        let pipeline = Pipeline::builder()
            .stage(RequestLogger::new(sink.clone()))
            .build();

        assert!(pipeline.run(&context(Method::POST, "/api/messages")).is_dispatch());
        assert_eq!(sink.lines().len(), 1);
        assert!(sink.lines()[0].ends_with("Path: /api/messages"));
    }

    #[test]
    fn test_sink_failure_does_not_block_request() {
        let pipeline = Pipeline::builder()
            .stage(RequestLogger::new(Arc::new(BrokenSink)))
            .build();
        assert!(pipeline.run(&context(Method::GET, "/")).is_dispatch());
    }

    #[test]
    fn test_file_sink_appends() {
        let path = std::env::temp_dir().join(format!("requests-{}.log", uuid::Uuid::new_v4()));
        {
            let sink = FileSink::open(&path).unwrap();
            sink.append("first").unwrap();
        }
        {
            let sink = FileSink::open(&path).unwrap();
            sink.append("second").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unopenable_path_falls_back() {
        let sink = open_sink("/nonexistent-dir/requests.log");
        assert!(sink.append("line").is_ok());
    }
}
