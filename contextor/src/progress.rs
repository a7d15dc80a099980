//! Lightweight progress reporting for the document and question pipelines.
//!
//! Use `NoopProgress` when nobody listens and `StatusLog` to collect the
//! status lines shown to the user.

use std::sync::Mutex;

use serde::Serialize;
use tracing::{info, warn};

/// Minimal progress interface used inside the pipelines.
pub trait Progress: Send + Sync {
    /// A long-running stage starts (spinner text).
    fn step(&self, _msg: &str) {}
    /// Neutral status line.
    fn info(&self, _msg: &str) {}
    /// A stage completed.
    fn success(&self, _msg: &str) {}
    /// Something the user should notice.
    fn warning(&self, _msg: &str) {}
}

/// No-op reporter for headless runs.
#[derive(Default, Clone, Copy)]
pub struct NoopProgress;
impl Progress for NoopProgress {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Step,
    Info,
    Success,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub level: StatusLevel,
    pub message: String,
}

/// Records status lines in order and mirrors them to `tracing`.
#[derive(Default)]
pub struct StatusLog {
    lines: Mutex<Vec<StatusLine>>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: StatusLevel, msg: &str) {
        match level {
            StatusLevel::Warning => warn!(status = msg),
            _ => info!(status = msg),
        }
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(StatusLine {
                level,
                message: msg.to_string(),
            });
        }
    }

    /// Consumes the log, returning lines in emission order.
    pub fn into_lines(self) -> Vec<StatusLine> {
        self.lines.into_inner().unwrap_or_default()
    }
}

impl Progress for StatusLog {
    fn step(&self, msg: &str) {
        self.push(StatusLevel::Step, msg);
    }
    fn info(&self, msg: &str) {
        self.push(StatusLevel::Info, msg);
    }
    fn success(&self, msg: &str) {
        self.push(StatusLevel::Success, msg);
    }
    fn warning(&self, msg: &str) {
        self.push(StatusLevel::Warning, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_and_levels() {
        let log = StatusLog::new();
        log.step("extracting");
        log.info("1200 characters");
        log.warning("page 3 empty");
        log.success("12 chunks");

        let levels: Vec<_> = log.into_lines().into_iter().map(|l| l.level).collect();
        assert_eq!(
            levels,
            vec![
                StatusLevel::Step,
                StatusLevel::Info,
                StatusLevel::Warning,
                StatusLevel::Success
            ]
        );
    }
}
