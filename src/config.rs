use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RESTAURANT: &str = "Koko Loko";

pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_MODEL: &str = "SALES_DIGEST_MODEL";
pub const ENV_API_URL: &str = "SALES_DIGEST_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "SALES_DIGEST_TIMEOUT_SECS";
pub const ENV_MAX_TOKENS: &str = "SALES_DIGEST_MAX_TOKENS";
pub const ENV_RESTAURANT: &str = "SALES_DIGEST_RESTAURANT";

/// Runtime settings for the content generator.
pub struct Settings {
    pub api_key: Option<SecretString>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub restaurant: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            restaurant: DEFAULT_RESTAURANT.to_owned(),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("restaurant", &self.restaurant)
            .finish()
    }
}

impl Settings {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(key) = get(ENV_API_KEY) {
            settings.api_key = Some(SecretString::new(key.trim().into()));
        }
        if let Some(url) = get(ENV_API_URL) {
            settings.api_url = url;
        }
        if let Some(model) = get(ENV_MODEL) {
            settings.model = model;
        }
        if let Some(restaurant) = get(ENV_RESTAURANT) {
            settings.restaurant = restaurant;
        }
        if let Some(max_tokens) = parse_or_warn::<u32>(ENV_MAX_TOKENS, get(ENV_MAX_TOKENS)) {
            settings.max_tokens = max_tokens;
        }
        if let Some(secs) = parse_or_warn::<u64>(ENV_TIMEOUT_SECS, get(ENV_TIMEOUT_SECS)) {
            settings.timeout = Duration::from_secs(secs);
        }
        settings
    }

    pub fn with_restaurant(mut self, restaurant: impl Into<String>) -> Self {
        self.restaurant = restaurant.into();
        self
    }
}

fn parse_or_warn<T: FromStr>(name: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(variable = name, value = %value, "ignoring invalid setting, using default");
            None
        }
    }
}
