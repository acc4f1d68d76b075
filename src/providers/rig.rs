//! rig-core integration for changelog generation.
//!
//! Uses rig-core's provider clients and Agent abstraction for multi-provider
//! support. Currently supports: Anthropic, OpenAI, Cohere, Gemini, Perplexity,
//! DeepSeek, xAI, Groq, and any OpenAI-compatible API.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;

use crate::config::{GenerationConfig, ProviderConfig};
use crate::models::ProviderName;
use crate::prompt::ChangelogPrompt;

use super::{non_blank, ChangelogProvider, ProviderError};

/// Build a one-shot agent from a rig-core client and prompt it.
///
/// Always sets `max_tokens`: without it some providers (e.g. Gemini)
/// default to a low limit that truncates responses.
macro_rules! prompt_once {
    ($client:expr, $model:expr, $settings:expr, $prompt:expr, $label:expr) => {{
        let agent = $client
            .agent($model)
            .preamble($prompt.system.as_str())
            .temperature($settings.temperature)
            .max_tokens($settings.max_tokens)
            .build();
        agent
            .prompt($prompt.user.as_str())
            .await
            .map_err(|e| classify_failure(format!("{} API error: {e}", $label)))
    }};
}

/// Create a rig-core client using the `Client::new(api_key)` convention.
macro_rules! new_client {
    ($provider_mod:path, $api_key:expr, $label:expr) => {{
        <$provider_mod>::new($api_key).map_err(|e| {
            ProviderError::NotConfigured(format!("failed to create {} client: {e}", $label))
        })
    }};
}

/// rig-core based changelog provider.
///
/// The provider name in config selects which rig-core client is used.
/// A missing API key is reported when [`ChangelogProvider::complete`] runs,
/// so commands that never generate work without one.
pub struct RigProvider {
    config: ProviderConfig,
    settings: GenerationConfig,
}

impl RigProvider {
    pub fn new(config: ProviderConfig, settings: GenerationConfig) -> Self {
        Self { config, settings }
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_openai_client(
        &self,
        api_key: &str,
    ) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(ref base_url) = self.config.base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::CompletionsClient = builder.build().map_err(|e| {
            ProviderError::NotConfigured(format!("failed to create OpenAI client: {e}"))
        })?;
        Ok(client)
    }

    /// Require `base_url` for OpenAI-compatible providers.
    fn require_base_url(&self) -> Result<&str, ProviderError> {
        self.config.base_url.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            )
        })
    }

    /// Get the API key or fail with an auth error.
    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ProviderError::Auth(format!(
                    "no API key found for provider '{}'. Set {} or {}.",
                    self.config.name,
                    crate::constants::ENV_API_KEY,
                    self.config.name.api_key_env_var()
                ))
            })
    }

    /// Make a completion call through rig-core and return the raw response text.
    async fn call_rig(&self, prompt: &ChangelogPrompt) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let model = self.config.model.as_str();
        let settings = &self.settings;

        match self.config.name {
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ProviderError::NotConfigured(format!(
                            "failed to create Anthropic client: {e}"
                        ))
                    })?;
                prompt_once!(client, model, settings, prompt, "Anthropic")
            }
            ProviderName::OpenAI => {
                let client = self.build_openai_client(api_key)?;
                prompt_once!(client, model, settings, prompt, "OpenAI")
            }
            ProviderName::Cohere => {
                let client = new_client!(providers::cohere::Client, api_key, "Cohere")?;
                prompt_once!(client, model, settings, prompt, "Cohere")
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, "Gemini")?;
                prompt_once!(client, model, settings, prompt, "Gemini")
            }
            ProviderName::Perplexity => {
                let client = new_client!(providers::perplexity::Client, api_key, "Perplexity")?;
                prompt_once!(client, model, settings, prompt, "Perplexity")
            }
            ProviderName::DeepSeek => {
                let client = new_client!(providers::deepseek::Client, api_key, "DeepSeek")?;
                prompt_once!(client, model, settings, prompt, "DeepSeek")
            }
            ProviderName::XAI => {
                let client = new_client!(providers::xai::Client, api_key, "xAI")?;
                prompt_once!(client, model, settings, prompt, "xAI")
            }
            ProviderName::Groq => {
                let client = new_client!(providers::groq::Client, api_key, "Groq")?;
                prompt_once!(client, model, settings, prompt, "Groq")
            }
            ProviderName::OpenAICompatible => {
                let base_url = self.require_base_url()?;
                let client: providers::openai::CompletionsClient =
                    providers::openai::CompletionsClient::builder()
                        .api_key(api_key)
                        .base_url(base_url)
                        .build()
                        .map_err(|e| {
                            ProviderError::NotConfigured(format!(
                                "failed to create OpenAI-compatible client: {e}"
                            ))
                        })?;
                prompt_once!(client, model, settings, prompt, "OpenAI-compatible")
            }
        }
    }
}

#[async_trait]
impl ChangelogProvider for RigProvider {
    async fn complete(&self, prompt: &ChangelogPrompt) -> Result<String, ProviderError> {
        tracing::debug!(
            provider = %self.config.name,
            model = %self.config.model,
            commits = prompt.included,
            "requesting completion"
        );
        let text = self.call_rig(prompt).await?;
        non_blank(text)
    }
}

/// Sort a failed call into an auth failure or an upstream fault.
///
/// rig-core reports HTTP failures as formatted strings, so the status code
/// and common provider phrasings are matched on the message.
pub fn classify_failure(message: String) -> ProviderError {
    let lower = message.to_lowercase();
    let is_auth = ["401", "403", "invalid api key", "invalid x-api-key", "unauthorized", "authentication"]
        .iter()
        .any(|needle| lower.contains(needle));
    if is_auth {
        ProviderError::Auth(message)
    } else {
        ProviderError::Unavailable(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: ProviderName, base_url: Option<&str>, api_key: Option<&str>) -> RigProvider {
        RigProvider::new(
            ProviderConfig {
                name,
                model: "test-model".to_string(),
                base_url: base_url.map(String::from),
                api_key: api_key.map(String::from),
            },
            GenerationConfig::default(),
        )
    }

    fn sample_prompt() -> ChangelogPrompt {
        ChangelogPrompt {
            system: "system".into(),
            user: "user".into(),
            included: 1,
            omitted: 0,
        }
    }

    #[tokio::test]
    async fn missing_api_key_is_auth_error_without_network() {
        let err = provider(ProviderName::Anthropic, None, None)
            .complete(&sample_prompt())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Auth(_)), "got: {err}");
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"), "got: {err}");
    }

    #[tokio::test]
    async fn blank_api_key_is_auth_error() {
        let err = provider(ProviderName::OpenAI, None, Some("   "))
            .complete(&sample_prompt())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Auth(_)));
    }

    #[test]
    fn require_base_url_missing() {
        let provider = provider(ProviderName::OpenAICompatible, None, Some("key"));
        let result = provider.require_base_url();
        assert!(result.is_err());
        assert!(
            result.unwrap_err().to_string().contains("base_url"),
            "should mention base_url"
        );
    }

    #[test]
    fn require_base_url_present() {
        let provider = provider(
            ProviderName::OpenAICompatible,
            Some("https://my-api.example.com"),
            Some("key"),
        );
        assert_eq!(
            provider.require_base_url().unwrap(),
            "https://my-api.example.com"
        );
    }

    #[test]
    fn classify_auth_failures() {
        for msg in [
            "Anthropic API error: HttpError: Invalid status code 401 Unauthorized",
            "OpenAI API error: Incorrect API key provided: invalid api key",
            "Gemini API error: 403 Forbidden",
            "Groq API error: authentication_error",
        ] {
            assert!(
                matches!(classify_failure(msg.to_string()), ProviderError::Auth(_)),
                "not auth: {msg}"
            );
        }
    }

    #[test]
    fn classify_other_failures_as_unavailable() {
        for msg in [
            "Anthropic API error: HttpError: Invalid status code 529 Overloaded",
            "OpenAI API error: error sending request: connection refused",
            "Gemini API error: 429 Too Many Requests",
            "DeepSeek API error: request timed out",
        ] {
            assert!(
                matches!(classify_failure(msg.to_string()), ProviderError::Unavailable(_)),
                "not unavailable: {msg}"
            );
        }
    }

    #[test]
    fn error_kinds() {
        use crate::models::ErrorKind;
        assert_eq!(ProviderError::Auth("x".into()).kind(), ErrorKind::Auth);
        assert_eq!(ProviderError::Unavailable("x".into()).kind(), ErrorKind::UpstreamUnavailable);
        assert_eq!(ProviderError::EmptyResponse.kind(), ErrorKind::EmptyResponse);
    }
}
