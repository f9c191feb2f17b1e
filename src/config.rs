//! Engine configuration
//!
//! Values come from the process environment (after `dotenv` in the binaries).
//! Remote endpoints default to the coaching backend's routes under
//! `FINCOACH_API_BASE_URL`.

use crate::error::EngineError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";
pub const ADVISOR_PATH: &str = "/api/ai/reason";
pub const ANALYZER_PATH: &str = "/api/finances/analyze";
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 120;
pub const DEFAULT_CURRENCY: &str = "INR";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub advisor_url: String,
    pub analyzer_url: String,
    /// Pause between steps when a trace is revealed progressively.
    pub reveal_delay: Duration,
    /// Currency label used in advisor prompts.
    pub currency: String,
    pub port: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_API_BASE_URL)
    }
}

impl EngineConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            advisor_url: format!("{}{}", base, ADVISOR_PATH),
            analyzer_url: format!("{}{}", base, ANALYZER_PATH),
            reveal_delay: Duration::from_millis(DEFAULT_REVEAL_DELAY_MS),
            currency: DEFAULT_CURRENCY.to_string(),
            port: DEFAULT_PORT,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = get("FINCOACH_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let mut config = Self::with_base_url(&base_url);

        if let Some(url) = get("FINCOACH_ADVISOR_URL") {
            config.advisor_url = url;
        }
        if let Some(url) = get("FINCOACH_ANALYZER_URL") {
            config.analyzer_url = url;
        }
        if let Some(currency) = get("FINCOACH_CURRENCY") {
            config.currency = currency;
        }

        if let Some(raw) = get("FINCOACH_REVEAL_DELAY_MS") {
            let millis: u64 = raw.parse().map_err(|_| {
                EngineError::Config(format!("FINCOACH_REVEAL_DELAY_MS is not a number: {}", raw))
            })?;
            config.reveal_delay = Duration::from_millis(millis);
        }

        if let Some(raw) = get("PORT").or_else(|| get("API_PORT")) {
            config.port = raw
                .parse()
                .map_err(|_| EngineError::Config(format!("PORT is not a valid port: {}", raw)))?;
        }

        for (name, url) in [("advisor", &config.advisor_url), ("analyzer", &config.analyzer_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(EngineError::Config(format!(
                    "{} URL must be http(s): {}",
                    name, url
                )));
            }
        }

        Ok(config)
    }
}
