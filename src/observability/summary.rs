//! Per-run success tally

use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    label: String,
    total: usize,
    succeeded: usize,
}

impl ExtractionSummary {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            total: 0,
            succeeded: 0,
        }
    }

    pub fn record(&mut self, success: bool) {
        self.total += 1;
        if success {
            self.succeeded += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// Every entry succeeded. An empty run counts as a success.
    pub fn success(&self) -> bool {
        self.succeeded == self.total
    }

    pub fn log(&self) {
        if self.success() {
            info!("{}", self);
        } else {
            warn!("{} ({} failed)", self, self.failed());
        }
    }
}

impl fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} extraction completed: {}/{} successful", self.label, self.succeeded, self.total)
    }
}
