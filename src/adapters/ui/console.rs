//! Implements ReporterPort on stdout.
//!
//! Stdout carries only progress lines and the final marker; tracing output goes to stderr.

use crate::domain::{CompletionMarker, DomainError};
use crate::ports::ReporterPort;
use std::io::{Write, stdout};

/// Line-oriented stdout reporter. Flushes every line so a supervising process sees
/// progress while the run is still going.
#[derive(Debug, Default)]
pub struct StdoutReporter;

impl StdoutReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ReporterPort for StdoutReporter {
    fn progress(&self, line: &str) {
        let mut out = stdout().lock();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }

    fn complete(&self, marker: &CompletionMarker) -> Result<(), DomainError> {
        let line = marker
            .to_line()
            .map_err(|e| DomainError::Report(format!("encode completion marker: {}", e)))?;
        let mut out = stdout().lock();
        writeln!(out, "{}", line)
            .and_then(|_| out.flush())
            .map_err(|e| DomainError::Report(format!("write completion marker: {}", e)))
    }
}
