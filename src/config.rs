//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::channels::TwilioConfig;
use crate::error::ConfigError;
use crate::llm::{DEFAULT_MODEL, LlmConfig};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Service configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Directory holding the two JSON collections.
    pub data_dir: PathBuf,
    pub llm: LlmConfig,
    /// Present only when all three Twilio variables are set.
    pub twilio: Option<TwilioConfig>,
    /// When set, logs are also written to a daily-rotated file here.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for variable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let api_key = var("PERPLEXITY_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("PERPLEXITY_API_KEY".to_string()))?;

        Ok(Self {
            port,
            data_dir: var("SHASTHO_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            llm: LlmConfig {
                api_key: SecretString::from(api_key),
                model: var("PERPLEXITY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                endpoint: None,
            },
            twilio: TwilioConfig::from_parts(
                var("TWILIO_ACCOUNT_SID"),
                var("TWILIO_AUTH_TOKEN"),
                var("TWILIO_PHONE_NUMBER"),
            ),
            log_dir: var("SHASTHO_LOG_DIR").map(PathBuf::from),
        })
    }
}
