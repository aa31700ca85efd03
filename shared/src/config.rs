//! Configuration management for the feedback function.

use std::env;
use std::fmt;

use crate::openai::{OpenAiClient, DEFAULT_API_URL, DEFAULT_MODEL};
use crate::origin::OriginPolicy;
use crate::prompt::PromptTemplate;
use crate::{Error, Result};

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Provider credential; absence is reported per request
    pub openai_api_key: Option<String>,
    /// Provider endpoint
    pub openai_api_url: String,
    /// Model identifier sent upstream
    pub openai_model: String,
    /// Which browser origins may call the endpoint
    pub origins: OriginPolicy,
    /// Evaluator prompt
    pub prompt: PromptTemplate,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_api_url", &self.openai_api_url)
            .field("openai_model", &self.openai_model)
            .field("origins", &self.origins)
            .field("prompt", &self.prompt)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let exact_origins: Vec<String> = get("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let allow_loopback = match get("ALLOW_LOOPBACK_ORIGINS") {
            Some(value) => parse_bool(&value)
                .ok_or_else(|| Error::Config(format!("ALLOW_LOOPBACK_ORIGINS must be true or false, got '{}'", value)))?,
            None => true,
        };

        let prompt = get("EVALUATOR_SYSTEM_PROMPT")
            .map(PromptTemplate::new)
            .unwrap_or_default();

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY").map(|k| k.trim().to_string()),
            openai_api_url: get("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            origins: OriginPolicy::new(exact_origins, allow_loopback)?,
            prompt,
        })
    }

    /// Build the provider client described by this configuration.
    pub fn openai_client(&self) -> OpenAiClient {
        OpenAiClient::new(reqwest::Client::new(), &self.openai_api_url, &self.openai_model)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::DEFAULT_SYSTEM_PROMPT;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.openai_api_url, DEFAULT_API_URL);
        assert_eq!(config.openai_model, DEFAULT_MODEL);
        assert!(config.origins.exact_origins().is_empty());
        assert_eq!(config.origins.allow(Some("http://localhost:3000")), Some("http://localhost:3000"));
        assert_eq!(config.prompt.system(), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_allowed_origins_list() {
        let config = config(&[(
            "ALLOWED_ORIGINS",
            " https://learn.example.org , https://courses.example.org,,",
        )])
        .unwrap();
        assert_eq!(
            config.origins.exact_origins(),
            ["https://learn.example.org", "https://courses.example.org"]
        );
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = config(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_loopback_flag() {
        let disabled = config(&[("ALLOW_LOOPBACK_ORIGINS", "false")]).unwrap();
        assert_eq!(disabled.origins.allow(Some("http://localhost:3000")), None);

        let err = config(&[("ALLOW_LOOPBACK_ORIGINS", "maybe")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = config(&[("OPENAI_API_KEY", "sk-very-secret")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
