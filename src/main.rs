//! Wiring & DI. Entry point: parse CLI, bootstrap adapters, inject into services, run.
//! No business logic here; the pipeline lives in RunService.

use clap::Parser;
use contact_analyzer::adapters::ai::{MockCompletionAdapter, OpenAiAdapter};
use contact_analyzer::adapters::archive::ZipArchiver;
use contact_analyzer::adapters::persistence::FsExportStore;
use contact_analyzer::adapters::ui::StdoutReporter;
use contact_analyzer::ports::{ArchivePort, CompletionPort, ExportStorePort, ReporterPort};
use contact_analyzer::shared::config::AppConfig;
use contact_analyzer::usecases::{AnalysisService, RunOutcome, RunService};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when `--strict` is set and at least one transcript failed.
const EXIT_PARTIAL_FAILURE: u8 = 3;

/// Analyze the latest chat export of a user with an LLM and zip the results.
#[derive(Debug, Parser)]
#[command(name = "contact-analyzer", version, about)]
struct Cli {
    /// User identifier; exports are read from <root>/user-<USER_ID>/chats/chats_*
    user_id: String,

    /// Shared data root (overrides CONTACT_ANALYZER_SHARED_DATA_PATH)
    #[arg(long, env = "CONTACT_ANALYZER_ROOT")]
    root: Option<PathBuf>,

    /// Exit with status 3 when any transcript could not be analyzed
    #[arg(long)]
    strict: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Stdout belongs to the supervising process; logs go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    let root = cli
        .root
        .clone()
        .unwrap_or_else(|| PathBuf::from(cfg.shared_data_path_or_default()));
    info!(root = %root.display(), user_id = %cli.user_id, "starting contact analysis");

    // --- Completion service (real endpoint when a key is set, mock otherwise) ---
    let completion: Arc<dyn CompletionPort> = if cfg.is_ai_configured() {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "AI analysis enabled with OpenAI adapter"
        );
        Arc::new(
            OpenAiAdapter::new(
                cfg.ai_api_url_or_default(),
                cfg.ai_api_key().unwrap_or_default(),
                cfg.ai_model_or_default(),
                Duration::from_secs(cfg.ai_timeout_secs_or_default()),
            )
            .map_err(|e| anyhow::anyhow!("{}", e))?
            .with_temperature(cfg.ai_temperature)
            .with_web_search(cfg.web_search_or_default()),
        )
    } else {
        warn!("CONTACT_ANALYZER_AI_API_KEY not set, using mock AI adapter");
        Arc::new(MockCompletionAdapter::new())
    };

    let store: Arc<dyn ExportStorePort> = Arc::new(FsExportStore::new(&root));
    let archiver: Arc<dyn ArchivePort> = Arc::new(ZipArchiver::new());
    let reporter: Arc<dyn ReporterPort> = Arc::new(StdoutReporter::new());

    // --- Rate limit between completion calls ---
    let request_delay_ms = cfg.request_delay_ms_or_default();
    info!(
        request_delay_ms,
        "rate limit: {} ms between completion requests", request_delay_ms
    );

    let analysis = AnalysisService::new(
        completion,
        Arc::clone(&store),
        Arc::clone(&reporter),
        Duration::from_millis(request_delay_ms),
    );
    let run_service = RunService::new(store, archiver, reporter, analysis);

    match run_service.run(&cli.user_id).await {
        Ok(RunOutcome::Completed {
            archive_file_name,
            entries,
            stats,
        }) => {
            info!(
                archive = %archive_file_name,
                entries,
                failed = stats.failed,
                "run complete"
            );
            if cli.strict && stats.failed > 0 {
                warn!(failed = stats.failed, "strict mode: transcripts failed");
                return Ok(ExitCode::from(EXIT_PARTIAL_FAILURE));
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(RunOutcome::NoTranscripts { export }) => {
            info!(export = %export.path.display(), "nothing to analyze");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_not_found() => {
            error!(error = %e, "no chat export to analyze");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!(error = %e, "analysis run failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
