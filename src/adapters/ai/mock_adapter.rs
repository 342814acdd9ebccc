//! Mock completion adapter for running without API calls.
//!
//! Returns hardcoded responses for development and testing purposes.

use crate::domain::DomainError;
use crate::domain::entities::FOLLOW_UP_DELIMITER;
use crate::ports::CompletionPort;
use std::time::Duration;
use tracing::info;

/// Mock completion adapter.
///
/// Returns a predetermined reply without making API calls.
/// Simulates network latency with configurable delay.
pub struct MockCompletionAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockCompletionAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for MockCompletionAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CompletionPort for MockCompletionAdapter {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        info!(
            prompt_len = prompt.len(),
            "[MOCK] Simulating AI completion"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        let line_count = prompt.lines().filter(|l| !l.trim().is_empty()).count();
        Ok(format!(
            "[MOCK] Simulated summary of a prompt with {} non-empty lines. \
             Configure an API key to get a real analysis.\n\
             {}\n\
             [MOCK] Здравствуйте! Хотели уточнить, актуален ли для Вас наш разговор?",
            line_count, FOLLOW_UP_DELIMITER
        ))
    }
}
