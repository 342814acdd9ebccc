//! contact-analyzer: batch LLM analysis of exported chat transcripts, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
