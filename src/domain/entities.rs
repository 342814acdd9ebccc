//! Domain entities. Pure data structures for the core business.
//!
//! No filesystem or HTTP types here beyond paths; adapters produce and consume these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of export directories written by the chat reader (`chats_<timestamp>`).
pub const EXPORT_DIR_PREFIX: &str = "chats_";

/// Extension of transcript files inside an export directory.
pub const TRANSCRIPT_EXTENSION: &str = "txt";

/// Name of the results subdirectory created inside the export directory.
pub const RESULTS_DIR_NAME: &str = "analysis_results";

/// Prefix of a successful analysis file.
pub const ANALYSIS_PREFIX: &str = "analysis_";

/// Prefix of an error record file.
pub const ERROR_PREFIX: &str = "error_";

/// Literal prefix of the completion marker line read by the supervising process.
pub const COMPLETION_MARKER_PREFIX: &str = "ANALYSIS_COMPLETE_JSON:";

/// A `chats_*` directory candidate seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportCandidate {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Picks the most recently created export. Ties keep the later candidate in input order.
pub fn select_latest(candidates: Vec<ExportCandidate>) -> Option<ExportCandidate> {
    candidates.into_iter().max_by_key(|c| c.created_at)
}

/// One user's chat export, resolved to a concrete directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDirectory {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl ExportDirectory {
    /// Base name of the export directory, e.g. `chats_2024-01-01_10-00`.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn results_dir(&self) -> PathBuf {
        self.path.join(RESULTS_DIR_NAME)
    }

    /// `analysis_results_<export-name>.zip`
    pub fn archive_file_name(&self) -> String {
        format!("{}_{}.zip", RESULTS_DIR_NAME, self.name())
    }

    /// The archive lives next to `analysis_results/`, inside the export directory.
    pub fn archive_path(&self) -> PathBuf {
        self.path.join(self.archive_file_name())
    }
}

/// A plain-text transcript of one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub path: PathBuf,
    pub file_name: String,
}

impl Transcript {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name }
    }
}

/// Kind of file written to the results directory for a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Analysis,
    Error,
}

impl ResultKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ResultKind::Analysis => ANALYSIS_PREFIX,
            ResultKind::Error => ERROR_PREFIX,
        }
    }

    /// The kind that must not coexist with this one for the same transcript.
    pub fn other(self) -> Self {
        match self {
            ResultKind::Analysis => ResultKind::Error,
            ResultKind::Error => ResultKind::Analysis,
        }
    }

    /// `analysis_<name>` or `error_<name>`.
    pub fn file_name_for(self, transcript: &Transcript) -> String {
        format!("{}{}", self.prefix(), transcript.file_name)
    }
}

/// Separator the model puts before the drafted re-engagement message.
pub const FOLLOW_UP_DELIMITER: &str = "+++";

/// A completion split into its summary and optional follow-up message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReply {
    pub summary: String,
    pub follow_up: Option<String>,
}

impl AnalysisReply {
    /// Splits at the first `+++`. An empty follow-up counts as none.
    pub fn parse(text: &str) -> Self {
        match text.split_once(FOLLOW_UP_DELIMITER) {
            Some((summary, rest)) => {
                let follow_up = rest.trim();
                Self {
                    summary: summary.trim().to_string(),
                    follow_up: (!follow_up.is_empty()).then(|| follow_up.to_string()),
                }
            }
            None => Self {
                summary: text.trim().to_string(),
                follow_up: None,
            },
        }
    }
}

/// What happened to a single transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    Analyzed { result_path: PathBuf, has_follow_up: bool },
    Failed { error_path: PathBuf, reason: String },
}

/// Totals for one analysis run over an export directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub analyzed: usize,
    pub failed: usize,
    pub follow_ups: usize,
}

impl RunStats {
    pub fn record(&mut self, outcome: &TranscriptOutcome) {
        self.total += 1;
        match outcome {
            TranscriptOutcome::Analyzed { has_follow_up, .. } => {
                self.analyzed += 1;
                if *has_follow_up {
                    self.follow_ups += 1;
                }
            }
            TranscriptOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Payload of the final stdout line: `ANALYSIS_COMPLETE_JSON:{"zipFileName":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMarker {
    #[serde(rename = "zipFileName")]
    pub zip_file_name: String,
}

impl CompletionMarker {
    pub fn new(zip_file_name: impl Into<String>) -> Self {
        Self {
            zip_file_name: zip_file_name.into(),
        }
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        Ok(format!(
            "{}{}",
            COMPLETION_MARKER_PREFIX,
            serde_json::to_string(self)?
        ))
    }
}
