//! Port traits. API boundaries for the hexagon.
//!
//! - Outbound: Called by application into infrastructure
//! - Reporter: Called by application to talk to the supervising process

pub mod outbound;
pub mod reporter;

pub use outbound::{ArchivePort, CompletionPort, ExportStorePort};
pub use reporter::ReporterPort;
