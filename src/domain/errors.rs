//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Chats directory not found: {}", .0.display())]
    NamespaceNotFound(PathBuf),

    #[error("No chat export directories found in {}", .0.display())]
    NoExports(PathBuf),

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("AI completion failed: {0}")]
    Ai(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Progress or completion marker could not be emitted to the supervising process.
    #[error("Reporter error: {0}")]
    Report(String),
}

impl DomainError {
    /// True for the "nothing to analyze for this user" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::NamespaceNotFound(_) | DomainError::NoExports(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_error_message() {
        let err = DomainError::Report("write completion marker: broken pipe".to_string());
        assert_eq!(
            err.to_string(),
            "Reporter error: write completion marker: broken pipe"
        );
        assert!(!err.is_not_found());
    }
}
