//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    AnalysisReply, CompletionMarker, ExportCandidate, ExportDirectory, ResultKind, RunStats,
    Transcript, TranscriptOutcome, select_latest,
};
pub use errors::DomainError;
