//! In-memory log sink and tracing setup.
//!
//! While the demo owns the terminal, tracing output cannot go to stderr
//! without corrupting the screen. A `LogHandle` handed to `init_tracing`
//! collects formatted lines instead; the status bar shows the newest one.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

pub const DEFAULT_MAX_LINES: usize = 500;

/// Install a compact fmt subscriber at `level`, writing into `sink` when
/// given and to stderr otherwise. Later calls are no-ops.
pub fn init_tracing(level: Level, sink: Option<LogHandle>) {
    let writer = match sink {
        Some(handle) => BoxMakeWriter::new(handle),
        None => BoxMakeWriter::new(io::stderr),
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .compact()
        .try_init();
}

#[derive(Debug)]
struct LogLines {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl LogLines {
    fn push(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

/// Shared, bounded list of log lines.
#[derive(Clone, Debug)]
pub struct LogHandle {
    inner: Arc<Mutex<LogLines>>,
}

impl Default for LogHandle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl LogHandle {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogLines {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
            })),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut lines) = self.inner.lock() {
            lines.push(line.into());
        }
    }

    pub fn latest(&self) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|lines| lines.lines.back().cloned())
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|lines| lines.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn writer(&self) -> LogWriter {
        LogWriter {
            handle: self.clone(),
            pending: Vec::new(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogHandle {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer()
    }
}

/// `io::Write` adapter that splits output into lines.
#[derive(Debug)]
pub struct LogWriter {
    handle: LogHandle,
    pending: Vec<u8>,
}

impl LogWriter {
    fn push_complete_lines(&mut self) {
        let Some(end) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return;
        };
        let complete: Vec<u8> = self.pending.drain(..=end).collect();
        String::from_utf8_lossy(&complete)
            .split('\n')
            .filter(|line| !line.is_empty())
            .for_each(|line| self.handle.push(line));
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.push_complete_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.push_complete_lines();
        if !self.pending.is_empty() {
            let rest = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            self.handle.push(rest);
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
