//! Reporter outbound port. Human progress lines and the machine-readable completion marker.

use crate::domain::{CompletionMarker, DomainError};

/// Port for the stdout contract with the supervising process.
///
/// Progress lines are free-form. The completion marker is emitted once, as the
/// last line of a successful run.
pub trait ReporterPort: Send + Sync {
    fn progress(&self, line: &str);

    fn complete(&self, marker: &CompletionMarker) -> Result<(), DomainError>;
}
