use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;

/// Process configuration, loaded once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub bind_addr: String,
    pub static_dir: String,
    pub max_body_bytes: usize,
    pub model_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("GOOGLE_API_KEY"))
            .context("GEMINI_API_KEY (or GOOGLE_API_KEY) must be set")?;

        let max_body_bytes = match non_empty("MAX_BODY_BYTES") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_BODY_BYTES is not a valid size: {}", v))?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let timeout_secs = match non_empty("MODEL_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("MODEL_TIMEOUT_SECS is not a number: {}", v))?,
            None => DEFAULT_MODEL_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: non_empty("GEMINI_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            static_dir: non_empty("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            max_body_bytes,
            model_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "key")])).unwrap();

        assert_eq!(config.api_key, "key");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.max_body_bytes, 20 * 1024 * 1024);
        assert_eq!(config.model_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_google_api_key_fallback() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "  "),
            ("GOOGLE_API_KEY", "google-key"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "google-key");
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn test_invalid_number_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "key"),
            ("MODEL_TIMEOUT_SECS", "soon"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_API_BASE", "http://localhost:8081/v1beta/"),
        ]))
        .unwrap();

        assert_eq!(config.api_base, "http://localhost:8081/v1beta");
    }
}
