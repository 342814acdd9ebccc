//! AI adapter module. Implements CompletionPort for LLM integration.
//!
//! Provides OpenAI-compatible adapter and mock adapter for offline runs.

pub mod mock_adapter;
pub mod openai_adapter;
pub mod prompt;

pub use mock_adapter::MockCompletionAdapter;
pub use openai_adapter::OpenAiAdapter;
pub use prompt::build_analysis_prompt;
