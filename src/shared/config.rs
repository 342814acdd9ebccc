//! Application configuration. Data root, AI endpoint, rate limiting.

use serde::Deserialize;

/// Default mount point of the shared data volume.
pub const DEFAULT_SHARED_DATA_PATH: &str = "/shared_data";

/// Default pause between completion requests.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 2000;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Root holding `user-<id>/chats/`. Read from CONTACT_ANALYZER_SHARED_DATA_PATH.
    #[serde(default)]
    pub shared_data_path: Option<String>,

    /// Delay in ms between completion requests. Read from CONTACT_ANALYZER_REQUEST_DELAY_MS.
    #[serde(default)]
    pub request_delay_ms: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // AI Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// AI API key (e.g., OpenAI). Read from CONTACT_ANALYZER_AI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// AI API URL. Defaults to OpenAI. Read from CONTACT_ANALYZER_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// AI model name. Defaults to "gpt-4". Read from CONTACT_ANALYZER_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,

    /// Sampling temperature; provider default when unset.
    #[serde(default)]
    pub ai_temperature: Option<f32>,

    /// HTTP timeout per completion request, in seconds.
    #[serde(default)]
    pub ai_timeout_secs: Option<u64>,

    /// Web-search augmentation for gateways that support it. Off by default.
    #[serde(default)]
    pub web_search: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("CONTACT_ANALYZER").try_parsing(true));
        if let Ok(path) = std::env::var("CONTACT_ANALYZER_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the shared data root. Defaults to `/shared_data`.
    pub fn shared_data_path_or_default(&self) -> String {
        self.shared_data_path
            .clone()
            .unwrap_or_else(|| DEFAULT_SHARED_DATA_PATH.to_string())
    }

    /// Returns request delay in milliseconds. Defaults to 2000 if unset.
    pub fn request_delay_ms_or_default(&self) -> u64 {
        self.request_delay_ms.unwrap_or(DEFAULT_REQUEST_DELAY_MS)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // AI Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the AI API key if configured. Empty strings count as unset.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key.clone().filter(|k| !k.trim().is_empty())
    }

    /// Returns the AI API URL. Defaults to OpenAI chat completions endpoint.
    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string())
    }

    /// Returns the AI model name. Defaults to "gpt-4".
    pub fn ai_model_or_default(&self) -> String {
        self.ai_model.clone().unwrap_or_else(|| "gpt-4".to_string())
    }

    pub fn ai_timeout_secs_or_default(&self) -> u64 {
        self.ai_timeout_secs.unwrap_or(120)
    }

    pub fn web_search_or_default(&self) -> bool {
        self.web_search.unwrap_or(false)
    }

    /// Returns true if AI is configured (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.ai_api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.shared_data_path_or_default(), "/shared_data");
        assert_eq!(cfg.request_delay_ms_or_default(), 2000);
        assert_eq!(cfg.ai_model_or_default(), "gpt-4");
        assert_eq!(
            cfg.ai_api_url_or_default(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(cfg.ai_timeout_secs_or_default(), 120);
        assert!(!cfg.web_search_or_default());
        assert!(!cfg.is_ai_configured());
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let cfg = AppConfig {
            ai_api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!cfg.is_ai_configured());
    }

    #[test]
    fn test_file_source_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("analyzer.toml");
        std::fs::write(
            &path,
            "shared_data_path = \"/data\"\nrequest_delay_ms = 0\nai_model = \"llama3.2\"\nweb_search = true\n",
        )
        .unwrap();

        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.shared_data_path_or_default(), "/data");
        assert_eq!(cfg.request_delay_ms_or_default(), 0);
        assert_eq!(cfg.ai_model_or_default(), "llama3.2");
        assert!(cfg.web_search_or_default());
    }
}
