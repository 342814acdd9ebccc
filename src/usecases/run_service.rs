//! Main run logic: resolve export -> list transcripts -> analyze -> archive -> marker.
//!
//! - Fails fast when the user has no export directory
//! - Stops early, without creating results, when the export holds no transcripts
//! - Builds the archive only after every transcript has a result or error record
//! - Emits the completion marker last, and only after the archive is on disk

use crate::domain::{CompletionMarker, DomainError, ExportDirectory, RunStats};
use crate::ports::{ArchivePort, ExportStorePort, ReporterPort};
use crate::usecases::AnalysisService;
use std::sync::Arc;
use tracing::info;

/// How a run ended when no fatal error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Archive written and completion marker emitted.
    Completed {
        archive_file_name: String,
        entries: usize,
        stats: RunStats,
    },
    /// The export directory had no transcripts; nothing was written.
    NoTranscripts { export: ExportDirectory },
}

/// Run service. One-shot pipeline for a single user.
pub struct RunService {
    store: Arc<dyn ExportStorePort>,
    archiver: Arc<dyn ArchivePort>,
    reporter: Arc<dyn ReporterPort>,
    analysis: AnalysisService,
}

impl RunService {
    pub fn new(
        store: Arc<dyn ExportStorePort>,
        archiver: Arc<dyn ArchivePort>,
        reporter: Arc<dyn ReporterPort>,
        analysis: AnalysisService,
    ) -> Self {
        Self {
            store,
            archiver,
            reporter,
            analysis,
        }
    }

    pub async fn run(&self, user_id: &str) -> Result<RunOutcome, DomainError> {
        self.reporter
            .progress(&format!("Received analysis request for user ID: {}", user_id));

        let export = match self.store.find_latest_export(user_id).await {
            Ok(export) => export,
            Err(e) => {
                self.reporter.progress(&format!("Error: {}", e));
                return Err(e);
            }
        };

        self.reporter.progress(&format!(
            "\n--- Starting analysis of chats from directory: {} (created {}) ---\n",
            export.name(),
            export.created_at.format("%Y-%m-%d %H:%M UTC")
        ));

        let transcripts = self.store.list_transcripts(&export).await?;
        if transcripts.is_empty() {
            self.reporter
                .progress("The directory contains no chat files to analyze.");
            info!(export = %export.name(), "no transcripts found");
            return Ok(RunOutcome::NoTranscripts { export });
        }

        let stats = self.analysis.analyze_export(&export, &transcripts).await?;

        self.reporter.progress(&format!(
            "\n--- Analysis of {} chats finished ({} analyzed, {} failed, {} follow-ups drafted). Packing results... ---",
            stats.total, stats.analyzed, stats.failed, stats.follow_ups
        ));

        let archive_file_name = export.archive_file_name();
        let entries = match self
            .archiver
            .archive_dir(&export.results_dir(), &export.archive_path())
            .await
        {
            Ok(n) => n,
            Err(e) => {
                self.reporter
                    .progress(&format!("Error: failed to pack results: {}", e));
                return Err(e);
            }
        };
        self.reporter
            .progress(&format!("Results packed into: {}", archive_file_name));

        self.reporter
            .complete(&CompletionMarker::new(archive_file_name.clone()))?;

        Ok(RunOutcome::Completed {
            archive_file_name,
            entries,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::archive::ZipArchiver;
    use crate::adapters::persistence::FsExportStore;
    use crate::usecases::testing::{RecordingReporter, ScriptedCompletion};
    use std::fs::File;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    struct Harness {
        tmp: tempfile::TempDir,
        reporter: Arc<RecordingReporter>,
        completion: Arc<ScriptedCompletion>,
        service: RunService,
    }

    fn harness() -> Harness {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(FsExportStore::new(tmp.path()));
        let reporter = Arc::new(RecordingReporter::default());
        let completion = Arc::new(ScriptedCompletion::default());
        let analysis = AnalysisService::new(
            completion.clone(),
            store.clone(),
            reporter.clone(),
            Duration::ZERO,
        );
        let service = RunService::new(
            store,
            Arc::new(ZipArchiver::new()),
            reporter.clone(),
            analysis,
        );
        Harness {
            tmp,
            reporter,
            completion,
            service,
        }
    }

    fn export_dir(root: &Path, user: &str, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = root.join(format!("user-{}", user)).join("chats").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for (file, body) in files {
            std::fs::write(dir.join(file), body).unwrap();
        }
        dir
    }

    fn zip_names(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_unknown_user_is_fatal() {
        let h = harness();

        let err = h.service.run("404").await.unwrap_err();

        assert!(matches!(err, DomainError::NamespaceNotFound(_)));
        assert!(h.reporter.marker().is_none());
        assert!(h.reporter.lines().last().unwrap().starts_with("Error: "));
        assert!(h.completion.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_export_creates_nothing() {
        let h = harness();
        let dir = export_dir(h.tmp.path(), "5", "chats_20240101", &[("readme.md", "x")]);

        let outcome = h.service.run("5").await.unwrap();

        assert!(matches!(outcome, RunOutcome::NoTranscripts { .. }));
        assert!(!dir.join("analysis_results").exists());
        assert!(!dir.join("analysis_results_chats_20240101.zip").exists());
        assert!(h.reporter.marker().is_none());
    }

    #[tokio::test]
    async fn test_mixed_results_are_archived() {
        let h = harness();
        let dir = export_dir(
            h.tmp.path(),
            "9",
            "chats_20240101",
            &[("alice.txt", "Алиса: а курс ещё идёт?"), ("bob.txt", "FAIL")],
        );

        let outcome = h.service.run("9").await.unwrap();

        assert!(h.reporter.lines().iter().any(|l| l
            .contains("Starting analysis of chats from directory: chats_20240101 (created ")));
        let results = dir.join("analysis_results");
        assert!(results.join("analysis_alice.txt").is_file());
        assert!(results.join("error_bob.txt").is_file());

        let archive = dir.join("analysis_results_chats_20240101.zip");
        assert_eq!(
            zip_names(&archive),
            vec!["analysis_alice.txt".to_string(), "error_bob.txt".to_string()]
        );
        assert_eq!(
            outcome,
            RunOutcome::Completed {
                archive_file_name: "analysis_results_chats_20240101.zip".to_string(),
                entries: 2,
                stats: RunStats {
                    total: 2,
                    analyzed: 1,
                    failed: 1,
                    follow_ups: 1
                },
            }
        );
        assert_eq!(
            h.reporter.marker().unwrap().zip_file_name,
            "analysis_results_chats_20240101.zip"
        );
        assert_eq!(
            h.reporter.last_line().unwrap(),
            r#"ANALYSIS_COMPLETE_JSON:{"zipFileName":"analysis_results_chats_20240101.zip"}"#
        );
    }

    #[tokio::test]
    async fn test_rerun_with_flipped_outcome_keeps_one_result() {
        let h = harness();
        let dir = export_dir(h.tmp.path(), "4", "chats_20240101", &[("bob.txt", "ok")]);
        h.service.run("4").await.unwrap();

        std::fs::write(dir.join("bob.txt"), "FAIL").unwrap();
        h.service.run("4").await.unwrap();

        let mut on_disk: Vec<String> = std::fs::read_dir(dir.join("analysis_results"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        on_disk.sort();
        assert_eq!(on_disk, vec!["error_bob.txt".to_string()]);
        assert_eq!(
            zip_names(&dir.join("analysis_results_chats_20240101.zip")),
            vec!["error_bob.txt".to_string()]
        );

        std::fs::write(dir.join("bob.txt"), "ok again").unwrap();
        h.service.run("4").await.unwrap();
        assert_eq!(
            zip_names(&dir.join("analysis_results_chats_20240101.zip")),
            vec!["analysis_bob.txt".to_string()]
        );
    }

    #[tokio::test]
    async fn test_all_success_archive_has_one_entry_per_transcript() {
        let h = harness();
        let files: Vec<(String, String)> = (0..5)
            .map(|i| (format!("contact_{}.txt", i), format!("chat {}", i)))
            .collect();
        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(n, b)| (n.as_str(), b.as_str()))
            .collect();
        let dir = export_dir(h.tmp.path(), "3", "chats_2024-05-01_12-00", &borrowed);

        h.service.run("3").await.unwrap();

        let names = zip_names(&dir.join("analysis_results_chats_2024-05-01_12-00.zip"));
        let expected: Vec<String> = (0..5).map(|i| format!("analysis_contact_{}.txt", i)).collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn test_archive_failure_suppresses_marker() {
        let h = harness();
        let dir = export_dir(h.tmp.path(), "2", "chats_x", &[("alice.txt", "hi")]);
        // A directory squatting on the archive path makes File::create fail.
        std::fs::create_dir_all(dir.join("analysis_results_chats_x.zip")).unwrap();

        let err = h.service.run("2").await.unwrap_err();

        assert!(matches!(err, DomainError::Archive(_)));
        assert!(h.reporter.marker().is_none());
        // Per-file results are still on disk.
        assert!(dir.join("analysis_results").join("analysis_alice.txt").is_file());
    }
}
