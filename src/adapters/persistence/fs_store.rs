//! Implements ExportStorePort on the shared data volume.
//! Layout: {root}/user-{id}/chats/chats_*/ holds *.txt transcripts; results go to
//! analysis_results/ inside the chosen export.

use crate::domain::entities::{EXPORT_DIR_PREFIX, TRANSCRIPT_EXTENSION};
use crate::domain::{
    DomainError, ExportCandidate, ExportDirectory, ResultKind, Transcript, select_latest,
};
use crate::ports::ExportStorePort;
use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// File-system export store rooted at the shared data mount.
pub struct FsExportStore {
    root: PathBuf,
}

impl FsExportStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// `{root}/user-{id}/chats`
    pub fn chats_dir(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("user-{}", user_id)).join("chats")
    }

    /// Creation time, or modification time where the filesystem does not record birth time.
    fn created_at(meta: &Metadata) -> DateTime<Utc> {
        meta.created()
            .or_else(|_| meta.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| DateTime::<Utc>::from(std::time::UNIX_EPOCH))
    }

    async fn scan_candidates(chats_dir: &Path) -> Result<Vec<ExportCandidate>, DomainError> {
        let mut entries = fs::read_dir(chats_dir)
            .await
            .map_err(|e| DomainError::Repo(format!("read {}: {}", chats_dir.display(), e)))?;
        let mut candidates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?
        {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(EXPORT_DIR_PREFIX) {
                continue;
            }
            // fs::metadata follows symlinks, matching a glob + isdir check.
            let path = entry.path();
            let meta = match fs::metadata(&path).await {
                Ok(m) => m,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !meta.is_dir() {
                continue;
            }
            candidates.push(ExportCandidate {
                path,
                created_at: Self::created_at(&meta),
            });
        }
        Ok(candidates)
    }
}

fn is_transcript_name(name: &str) -> bool {
    !name.starts_with('.')
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext == TRANSCRIPT_EXTENSION)
}

/// Remove a stale result file. Missing files are fine; directories are left alone
/// since they never end up as archive entries.
async fn remove_stale(path: &Path) -> Result<(), DomainError> {
    match fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => {
            warn!(path = %path.display(), "stale result path is a directory, leaving it");
            Ok(())
        }
        Ok(_) => match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "stale result removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Repo(format!(
                "remove {}: {}",
                path.display(),
                e
            ))),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DomainError::Repo(format!("stat {}: {}", path.display(), e))),
    }
}

#[async_trait::async_trait]
impl ExportStorePort for FsExportStore {
    async fn find_latest_export(&self, user_id: &str) -> Result<ExportDirectory, DomainError> {
        let chats_dir = self.chats_dir(user_id);
        match fs::metadata(&chats_dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(DomainError::NamespaceNotFound(chats_dir)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DomainError::NamespaceNotFound(chats_dir));
            }
            Err(e) => return Err(DomainError::Repo(e.to_string())),
        }

        let candidates = Self::scan_candidates(&chats_dir).await?;
        let count = candidates.len();
        let latest = select_latest(candidates).ok_or(DomainError::NoExports(chats_dir))?;
        info!(
            user_id,
            candidates = count,
            path = %latest.path.display(),
            created_at = %latest.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            "selected latest chat export"
        );
        Ok(ExportDirectory {
            path: latest.path,
            created_at: latest.created_at,
        })
    }

    async fn list_transcripts(
        &self,
        export: &ExportDirectory,
    ) -> Result<Vec<Transcript>, DomainError> {
        let mut entries = fs::read_dir(&export.path)
            .await
            .map_err(|e| DomainError::Repo(format!("read {}: {}", export.path.display(), e)))?;
        let mut transcripts = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_transcript_name(&name) {
                continue;
            }
            let path = entry.path();
            let is_file = fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if is_file {
                transcripts.push(Transcript::new(path));
            }
        }
        transcripts.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(transcripts)
    }

    async fn read_transcript(&self, transcript: &Transcript) -> Result<String, DomainError> {
        fs::read_to_string(&transcript.path).await.map_err(|e| {
            DomainError::Repo(format!("read {}: {}", transcript.path.display(), e))
        })
    }

    async fn prepare_results_dir(&self, export: &ExportDirectory) -> Result<PathBuf, DomainError> {
        let dir = export.results_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| DomainError::Repo(format!("create {}: {}", dir.display(), e)))?;
        Ok(dir)
    }

    async fn write_result(
        &self,
        export: &ExportDirectory,
        transcript: &Transcript,
        kind: ResultKind,
        contents: &str,
    ) -> Result<PathBuf, DomainError> {
        let dir = export.results_dir();
        let path = dir.join(kind.file_name_for(transcript));
        fs::write(&path, contents)
            .await
            .map_err(|e| DomainError::Repo(format!("write {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), bytes = contents.len(), "result written");
        // One result per transcript: drop the other kind left by an earlier run or a
        // partial write.
        remove_stale(&dir.join(kind.other().file_name_for(transcript))).await?;
        Ok(path)
    }
}
