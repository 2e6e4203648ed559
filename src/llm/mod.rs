//! AI integration for ShasthoBondhu.
//!
//! The triage service only sees the [`LlmProvider`] trait. The concrete
//! provider is Perplexity's chat-completions API, called over reqwest.

pub mod perplexity;
pub mod provider;

pub use perplexity::PerplexityProvider;
pub use provider::*;

use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::error::LlmError;

/// Default Perplexity model.
pub const DEFAULT_MODEL: &str = "sonar-pro";

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub model: String,
    /// Override for the chat-completions URL (defaults to Perplexity's).
    pub endpoint: Option<String>,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    if config.api_key.expose_secret().trim().is_empty() {
        return Err(LlmError::MissingApiKey {
            provider: "perplexity".to_string(),
        });
    }

    let provider = match &config.endpoint {
        Some(endpoint) => {
            PerplexityProvider::with_endpoint(config.api_key.clone(), &config.model, endpoint)
        }
        None => PerplexityProvider::new(config.api_key.clone(), &config.model),
    };
    tracing::info!("Using Perplexity (model: {})", config.model);
    Ok(Arc::new(provider))
}
