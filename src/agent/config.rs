//! Panel configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default LLM provider.
const DEFAULT_PROVIDER: &str = "ollama";
/// Default judge model for relevance grading.
const DEFAULT_JUDGE_MODEL: &str = "llama3.1:latest";
/// Default judge sampling temperature.
const DEFAULT_JUDGE_TEMPERATURE: f32 = 0.8;
/// Default judge max tokens. Graders answer in a word or two; the headroom
/// covers models that pad their binary answer with a sentence.
const DEFAULT_JUDGE_MAX_TOKENS: u32 = 128;
/// Default aggregator model for the final summary.
const DEFAULT_AGGREGATOR_MODEL: &str = "llama3.1:latest";
/// Default aggregator sampling temperature.
const DEFAULT_AGGREGATOR_TEMPERATURE: f32 = 0.7;
/// Default aggregator max tokens.
const DEFAULT_AGGREGATOR_MAX_TOKENS: u32 = 2048;
/// Default analyst sampling temperature. Low, so panel disagreement comes
/// from the models rather than from sampling noise.
const DEFAULT_ANALYST_TEMPERATURE: f32 = 0.2;
/// Default analyst max tokens.
const DEFAULT_ANALYST_MAX_TOKENS: u32 = 1024;
/// Default passages requested from the retrieval service per query.
const DEFAULT_TOP_K: usize = 5;
/// Default maximum concurrent analyst calls.
const DEFAULT_MAX_CONCURRENCY: usize = 4;
/// Default per-call timeout in seconds. Small local models can take minutes
/// on long contexts.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// The default analyst panel: four small local models, id paired with model tag.
const DEFAULT_PANEL: [(&str, &str); 4] = [
    ("phi3", "phi3:latest"),
    ("gemma2", "gemma2:latest"),
    ("qwen2", "qwen2:latest"),
    ("stablelm2", "stablelm2:latest"),
];

/// Configuration for a single analyst on the panel.
///
/// Panel membership is data: adding an analyst means adding one of these
/// to [`PanelConfig::analysts`], never touching orchestration code.
#[derive(Debug, Clone)]
pub struct AnalystConfig {
    /// Stable identifier reported on every answer.
    pub id: String,
    /// Model identifier used for generation.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens for the answer.
    pub max_tokens: u32,
}

impl AnalystConfig {
    /// Creates an analyst with the default temperature and token budget.
    pub fn new(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            temperature: DEFAULT_ANALYST_TEMPERATURE,
            max_tokens: DEFAULT_ANALYST_MAX_TOKENS,
        }
    }

    /// Creates an analyst from a model tag, deriving the id from the part
    /// before the first `:` (`"phi3:latest"` → id `"phi3"`).
    pub fn from_model(model: impl Into<String>) -> Self {
        let model = model.into();
        let id = model.split(':').next().unwrap_or(&model).to_string();
        Self::new(id, model)
    }

    /// The built-in four-model panel.
    #[must_use]
    pub fn default_panel() -> Vec<Self> {
        DEFAULT_PANEL
            .iter()
            .map(|&(id, model)| Self::new(id, model))
            .collect()
    }
}

/// Configuration for the analyst panel pipeline.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// LLM provider name (`"ollama"` or `"openai"`).
    pub provider: String,
    /// API key; required by the `OpenAI` provider, unused by Ollama.
    pub api_key: Option<String>,
    /// Optional base URL override (for proxies or a remote daemon).
    pub base_url: Option<String>,
    /// The analyst panel, in registration order.
    ///
    /// Registration order is the order answers come back in, regardless of
    /// which analyst finishes first.
    pub analysts: Vec<AnalystConfig>,
    /// Model for the relevance judge.
    pub judge_model: String,
    /// Sampling temperature for the judge.
    pub judge_temperature: f32,
    /// Maximum tokens for judge responses.
    pub judge_max_tokens: u32,
    /// Model for the aggregator.
    pub aggregator_model: String,
    /// Sampling temperature for the aggregator.
    pub aggregator_temperature: f32,
    /// Maximum tokens for the aggregated summary.
    pub aggregator_max_tokens: u32,
    /// Passages requested from the retrieval service per query.
    pub top_k: usize,
    /// Maximum concurrent analyst calls during fan-out.
    pub max_concurrency: usize,
    /// Per-call timeout applied to judge, analyst, and aggregator calls.
    pub timeout: Duration,
    /// Directory containing prompt template files.
    ///
    /// When set, system prompts are loaded from markdown files in this
    /// directory, falling back to compiled-in defaults for missing files.
    pub prompt_dir: Option<PathBuf>,
}

impl PanelConfig {
    /// Creates a new builder for `PanelConfig`.
    #[must_use]
    pub fn builder() -> PanelConfigBuilder {
        PanelConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if the configured provider
    /// requires an API key and none is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`PanelConfig`].
#[derive(Debug, Clone, Default)]
pub struct PanelConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    analysts: Option<Vec<AnalystConfig>>,
    judge_model: Option<String>,
    judge_temperature: Option<f32>,
    judge_max_tokens: Option<u32>,
    aggregator_model: Option<String>,
    aggregator_temperature: Option<f32>,
    aggregator_max_tokens: Option<u32>,
    top_k: Option<usize>,
    max_concurrency: Option<usize>,
    timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

impl PanelConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("FINPANEL_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY")
                .or_else(|_| std::env::var("FINPANEL_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL")
                .or_else(|_| std::env::var("FINPANEL_BASE_URL"))
                .ok();
        }
        if self.analysts.is_none() {
            self.analysts = std::env::var("FINPANEL_ANALYST_MODELS").ok().map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(AnalystConfig::from_model)
                    .collect()
            });
        }
        if self.judge_model.is_none() {
            self.judge_model = std::env::var("FINPANEL_JUDGE_MODEL").ok();
        }
        if self.aggregator_model.is_none() {
            self.aggregator_model = std::env::var("FINPANEL_AGGREGATOR_MODEL").ok();
        }
        if self.top_k.is_none() {
            self.top_k = std::env::var("FINPANEL_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.max_concurrency.is_none() {
            self.max_concurrency = std::env::var("FINPANEL_MAX_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.timeout.is_none() {
            self.timeout = std::env::var("FINPANEL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("FINPANEL_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Adds one analyst to the panel.
    ///
    /// The first call replaces the default panel rather than extending it.
    #[must_use]
    pub fn analyst(mut self, analyst: AnalystConfig) -> Self {
        self.analysts.get_or_insert_with(Vec::new).push(analyst);
        self
    }

    /// Replaces the whole analyst panel.
    #[must_use]
    pub fn analysts(mut self, analysts: Vec<AnalystConfig>) -> Self {
        self.analysts = Some(analysts);
        self
    }

    /// Sets the judge model.
    #[must_use]
    pub fn judge_model(mut self, model: impl Into<String>) -> Self {
        self.judge_model = Some(model.into());
        self
    }

    /// Sets the judge temperature.
    #[must_use]
    pub const fn judge_temperature(mut self, t: f32) -> Self {
        self.judge_temperature = Some(t);
        self
    }

    /// Sets the judge max tokens.
    #[must_use]
    pub const fn judge_max_tokens(mut self, n: u32) -> Self {
        self.judge_max_tokens = Some(n);
        self
    }

    /// Sets the aggregator model.
    #[must_use]
    pub fn aggregator_model(mut self, model: impl Into<String>) -> Self {
        self.aggregator_model = Some(model.into());
        self
    }

    /// Sets the aggregator temperature.
    #[must_use]
    pub const fn aggregator_temperature(mut self, t: f32) -> Self {
        self.aggregator_temperature = Some(t);
        self
    }

    /// Sets the aggregator max tokens.
    #[must_use]
    pub const fn aggregator_max_tokens(mut self, n: u32) -> Self {
        self.aggregator_max_tokens = Some(n);
        self
    }

    /// Sets how many passages to request from the retrieval service.
    #[must_use]
    pub const fn top_k(mut self, n: usize) -> Self {
        self.top_k = Some(n);
        self
    }

    /// Sets the maximum concurrency for analyst fan-out.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = Some(n);
        self
    }

    /// Sets the per-call timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`PanelConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if the provider is `"openai"`
    /// and no API key was set, and [`AgentError::NoAnalysts`] if the panel
    /// was explicitly set to be empty.
    pub fn build(self) -> Result<PanelConfig, AgentError> {
        let provider = self
            .provider
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

        if provider == "openai" && self.api_key.is_none() {
            return Err(AgentError::ApiKeyMissing);
        }

        let analysts = self.analysts.unwrap_or_else(AnalystConfig::default_panel);
        if analysts.is_empty() {
            return Err(AgentError::NoAnalysts);
        }

        Ok(PanelConfig {
            provider,
            api_key: self.api_key,
            base_url: self.base_url,
            analysts,
            judge_model: self
                .judge_model
                .unwrap_or_else(|| DEFAULT_JUDGE_MODEL.to_string()),
            judge_temperature: self.judge_temperature.unwrap_or(DEFAULT_JUDGE_TEMPERATURE),
            judge_max_tokens: self.judge_max_tokens.unwrap_or(DEFAULT_JUDGE_MAX_TOKENS),
            aggregator_model: self
                .aggregator_model
                .unwrap_or_else(|| DEFAULT_AGGREGATOR_MODEL.to_string()),
            aggregator_temperature: self
                .aggregator_temperature
                .unwrap_or(DEFAULT_AGGREGATOR_TEMPERATURE),
            aggregator_max_tokens: self
                .aggregator_max_tokens
                .unwrap_or(DEFAULT_AGGREGATOR_MAX_TOKENS),
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
            max_concurrency: self.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = PanelConfig::builder()
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.judge_model, "llama3.1:latest");
        assert_eq!(config.aggregator_model, "llama3.1:latest");
        assert_eq!(config.top_k, DEFAULT_TOP_K);
        assert_eq!(config.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.analysts.len(), 4);
        assert_eq!(config.analysts[0].id, "phi3");
        assert_eq!(config.analysts[3].model, "stablelm2:latest");
    }

    #[test]
    fn test_openai_requires_api_key() {
        let result = PanelConfig::builder().provider("openai").build();
        assert!(matches!(result, Err(AgentError::ApiKeyMissing)));

        let config = PanelConfig::builder()
            .provider("openai")
            .api_key("sk-test")
            .build();
        assert!(config.is_ok());
    }

    #[test]
    fn test_empty_panel_rejected() {
        let result = PanelConfig::builder().analysts(Vec::new()).build();
        assert!(matches!(result, Err(AgentError::NoAnalysts)));
    }

    #[test]
    fn test_analyst_setter_replaces_default_panel() {
        let config = PanelConfig::builder()
            .analyst(AnalystConfig::from_model("phi3:latest"))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.analysts.len(), 1);
        assert_eq!(config.analysts[0].id, "phi3");
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PanelConfig::builder()
            .judge_model("llama3.2:latest")
            .judge_temperature(0.5)
            .aggregator_model("mistral:latest")
            .top_k(8)
            .max_concurrency(2)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.judge_model, "llama3.2:latest");
        assert!((config.judge_temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.aggregator_model, "mistral:latest");
        assert_eq!(config.top_k, 8);
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_explicit_setters_survive_from_env() {
        // from_env only fills unset fields, so explicit values win
        // regardless of what the environment holds.
        let config = PanelConfig::builder()
            .provider("ollama")
            .judge_model("llama3.2:latest")
            .top_k(7)
            .from_env()
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.judge_model, "llama3.2:latest");
        assert_eq!(config.top_k, 7);
    }

    #[test]
    fn test_from_model_derives_id() {
        let analyst = AnalystConfig::from_model("qwen2:7b-instruct");
        assert_eq!(analyst.id, "qwen2");
        assert_eq!(analyst.model, "qwen2:7b-instruct");
        assert!((analyst.temperature - DEFAULT_ANALYST_TEMPERATURE).abs() < f32::EPSILON);

        let untagged = AnalystConfig::from_model("mistral");
        assert_eq!(untagged.id, "mistral");
    }
}
