//! Analysis service. Runs every transcript of an export through the completion service.
//!
//! Coordinates between the export store (transcripts, results), the completion port
//! (analysis), and the reporter (progress lines).

use crate::adapters::ai::build_analysis_prompt;
use crate::domain::{
    AnalysisReply, DomainError, ExportDirectory, ResultKind, RunStats, Transcript,
    TranscriptOutcome,
};
use crate::ports::{CompletionPort, ExportStorePort, ReporterPort};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Service for per-transcript AI analysis.
///
/// Orchestrates the flow for each transcript:
/// 1. Read the transcript
/// 2. Embed it in the analysis prompt
/// 3. Send to the completion service
/// 4. Save `analysis_<name>`, or `error_<name>` if any step failed
pub struct AnalysisService {
    completion: Arc<dyn CompletionPort>,
    store: Arc<dyn ExportStorePort>,
    reporter: Arc<dyn ReporterPort>,
    request_delay: Duration,
}

impl AnalysisService {
    /// Create a new analysis service.
    ///
    /// # Arguments
    /// * `completion` - Completion port implementation (OpenAI, Mock, etc.)
    /// * `store` - Store the transcripts are read from and results written to
    /// * `reporter` - Progress sink
    /// * `request_delay` - Pause between successive completion calls
    pub fn new(
        completion: Arc<dyn CompletionPort>,
        store: Arc<dyn ExportStorePort>,
        reporter: Arc<dyn ReporterPort>,
        request_delay: Duration,
    ) -> Self {
        Self {
            completion,
            store,
            reporter,
            request_delay,
        }
    }

    /// Analyze every transcript, in order. Per-file failures become error records;
    /// only a failure to create the results directory or write an error record is fatal.
    pub async fn analyze_export(
        &self,
        export: &ExportDirectory,
        transcripts: &[Transcript],
    ) -> Result<RunStats, DomainError> {
        self.store.prepare_results_dir(export).await?;

        let total = transcripts.len();
        let mut stats = RunStats::default();
        let mut calls_made = 0usize;

        for (i, transcript) in transcripts.iter().enumerate() {
            self.reporter.progress(&format!(
                "[{}/{}] Analyzing file: {}...",
                i + 1,
                total,
                transcript.file_name
            ));

            let outcome = self
                .analyze_transcript(export, transcript, &mut calls_made)
                .await?;
            match &outcome {
                TranscriptOutcome::Analyzed { .. } => self.reporter.progress(&format!(
                    " -> Analysis for {} saved.",
                    transcript.file_name
                )),
                TranscriptOutcome::Failed { reason, .. } => self.reporter.progress(&format!(
                    " -> Error analyzing file {}: {}",
                    transcript.file_name, reason
                )),
            }
            stats.record(&outcome);
        }

        info!(
            export = %export.name(),
            total = stats.total,
            analyzed = stats.analyzed,
            failed = stats.failed,
            follow_ups = stats.follow_ups,
            "export analysis complete"
        );

        Ok(stats)
    }

    /// Analyze one transcript. Returns `Err` only if the error record itself cannot be written.
    ///
    /// `calls_made` counts completion calls so far in this run; the rate-limit pause only
    /// separates actual calls.
    async fn analyze_transcript(
        &self,
        export: &ExportDirectory,
        transcript: &Transcript,
        calls_made: &mut usize,
    ) -> Result<TranscriptOutcome, DomainError> {
        match self.try_analyze(export, transcript, calls_made).await {
            Ok((result_path, has_follow_up)) => Ok(TranscriptOutcome::Analyzed {
                result_path,
                has_follow_up,
            }),
            Err(e) => {
                warn!(file = %transcript.file_name, error = %e, "transcript analysis failed");
                let reason = e.to_string();
                let body = format!("An error occurred while analyzing the file:\n{}", reason);
                let error_path = self
                    .store
                    .write_result(export, transcript, ResultKind::Error, &body)
                    .await?;
                Ok(TranscriptOutcome::Failed { error_path, reason })
            }
        }
    }

    async fn try_analyze(
        &self,
        export: &ExportDirectory,
        transcript: &Transcript,
        calls_made: &mut usize,
    ) -> Result<(PathBuf, bool), DomainError> {
        let content = self.store.read_transcript(transcript).await?;
        let prompt = build_analysis_prompt(&content);

        if *calls_made > 0 && !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
        *calls_made += 1;
        let completion = self.completion.complete(&prompt).await?;
        let reply = AnalysisReply::parse(&completion);
        info!(
            file = %transcript.file_name,
            summary_len = reply.summary.len(),
            has_follow_up = reply.follow_up.is_some(),
            "completion received"
        );

        let path = self
            .store
            .write_result(export, transcript, ResultKind::Analysis, &completion)
            .await?;
        Ok((path, reply.follow_up.is_some()))
    }
}
