//! Application use cases. Orchestrate domain logic via ports.

pub mod analysis_service;
pub mod run_service;

pub use analysis_service::AnalysisService;
pub use run_service::{RunOutcome, RunService};
