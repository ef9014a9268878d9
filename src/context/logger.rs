//! Verbose-gated logging surface supplied by the host.

use std::sync::Mutex;

/// Logger contract consumed by plugins.
///
/// `verbose` lines are progress chatter the host only shows when asked;
/// non-verbose lines are always user-visible.
pub trait DeployLogger: Send + Sync {
    fn log(&self, message: &str, verbose: bool);
}

/// Production logger emitting through `tracing`.
///
/// Verbose lines map to `debug!`, everything else to `info!`; the host owns
/// subscriber installation and filtering.
pub struct TracingLogger;

impl DeployLogger for TracingLogger {
    fn log(&self, message: &str, verbose: bool) {
        if verbose {
            tracing::debug!("{message}");
        } else {
            tracing::info!("{message}");
        }
    }
}

/// A single captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub message: String,
    pub verbose: bool,
}

/// Logger that captures every line for later inspection.
///
/// Used by tests to assert on log output; also useful to hosts that buffer
/// plugin output per pipeline stage.
#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().expect("logger lock poisoned").clone()
    }

    /// Messages of every captured line, in order
    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|l| l.message).collect()
    }
}

impl DeployLogger for RecordingLogger {
    fn log(&self, message: &str, verbose: bool) {
        self.lines
            .lock()
            .expect("logger lock poisoned")
            .push(LogLine {
                message: message.to_string(),
                verbose,
            });
    }
}
