//! Infrastructure adapters. Implement outbound ports.
//!
//! LLM client, filesystem, zip archive, stdout. Map errors to DomainError.

pub mod ai;
pub mod archive;
pub mod persistence;
pub mod ui;
