//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, ExportDirectory, ResultKind, Transcript};
use std::path::{Path, PathBuf};

/// Chat completion service. Submit a prompt, get model text back.
#[async_trait::async_trait]
pub trait CompletionPort: Send + Sync {
    /// Send `prompt` as a single user message and return the first completion.
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;
}

/// Export store port. Locate exports, read transcripts, write per-transcript results.
#[async_trait::async_trait]
pub trait ExportStorePort: Send + Sync {
    /// Most recently created `chats_*` directory for the user.
    ///
    /// Fails with `NamespaceNotFound` when `user-<id>/chats` is missing and
    /// `NoExports` when it holds no export directories.
    async fn find_latest_export(&self, user_id: &str) -> Result<ExportDirectory, DomainError>;

    /// `*.txt` files directly inside the export, sorted by file name.
    async fn list_transcripts(
        &self,
        export: &ExportDirectory,
    ) -> Result<Vec<Transcript>, DomainError>;

    async fn read_transcript(&self, transcript: &Transcript) -> Result<String, DomainError>;

    /// Create `analysis_results/` if needed. Returns its path.
    async fn prepare_results_dir(&self, export: &ExportDirectory) -> Result<PathBuf, DomainError>;

    /// Write `analysis_<name>` or `error_<name>` into the results directory.
    async fn write_result(
        &self,
        export: &ExportDirectory,
        transcript: &Transcript,
        kind: ResultKind,
        contents: &str,
    ) -> Result<PathBuf, DomainError>;
}

/// Archive port. Pack a directory tree into a single compressed file.
#[async_trait::async_trait]
pub trait ArchivePort: Send + Sync {
    /// Pack every file under `source_dir` into `dest`, with entry names relative to
    /// `source_dir`. Returns the number of entries written.
    async fn archive_dir(&self, source_dir: &Path, dest: &Path) -> Result<usize, DomainError>;
}
