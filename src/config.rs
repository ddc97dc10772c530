// src/config.rs
use secrecy::SecretString;

pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Persona sent as the system instruction on every model call.
pub const SYSTEM_INSTRUCTION: &str = "You are an intelligent business assistant for online merchants. \
Your job is to help them understand their business performance using simple, easy-to-understand language. \
You are given data like sales volume per month, popular items, and inventory trends. \
You explain patterns clearly, suggest actionable marketing strategies, highlight issues (like slow-moving items), \
and give growth advice based on the merchant's size, type, and region. \
Always keep your tone friendly, clear, and practical.";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Process-wide settings, built once in `main` and read-only afterwards.
#[derive(Debug)]
pub struct Config {
    pub api_key: SecretString,
    pub port: u16,
    pub model: String,
    pub base_url: String,
    pub system_instruction: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GOOGLE_API_KEY").ok_or(ConfigError::Missing("GOOGLE_API_KEY"))?;

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let base_url = get("GEMINI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key: SecretString::from(api_key),
            port,
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
        })
    }
}
