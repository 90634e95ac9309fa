use crate::core::FallbackPolicy;
use crate::providers::{default_providers, ResponseShape};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,
    /// HTTP timeout in seconds. Bounds whole provider requests, but only
    /// connect and read stalls for downloads.
    pub timeout: u64,
    /// Upper bound for one provider attempt, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_timeout: Option<u64>,
    /// Retries per media URL when downloading.
    pub retries: u32,
    pub policy: FallbackPolicy,
    /// Relay that fetches media on our behalf, called as `<proxy>?url=<media url>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub endpoint: String,
    #[serde(default = "default_param")]
    pub param: String,
    pub shape: ResponseShape,
}

fn default_param() -> String {
    "url".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout: 30,
            attempt_timeout: Some(15),
            retries: 3,
            policy: FallbackPolicy::Sequential,
            proxy: None,
            providers: default_providers(),
        }
    }
}

impl Config {
    /// Reads a TOML file when a path is given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout == 0 {
            anyhow::bail!("timeout must be at least one second");
        }
        if self.attempt_timeout == Some(0) {
            anyhow::bail!("attempt_timeout must be at least one second");
        }
        if self.providers.is_empty() {
            anyhow::bail!("at least one provider must be configured");
        }
        for provider in &self.providers {
            Url::parse(&provider.endpoint).with_context(|| {
                format!("provider {} has an invalid endpoint", provider.name)
            })?;
        }
        if let Some(proxy) = &self.proxy {
            Url::parse(proxy).context("invalid proxy URL")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.providers.len(), 4);
        assert_eq!(config.policy, FallbackPolicy::Sequential);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            timeout = 10
            policy = "race"

            [[providers]]
            name = "local"
            endpoint = "http://127.0.0.1:8080/parse"
            shape = "media-items"
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout, 10);
        assert_eq!(config.retries, 3);
        assert_eq!(config.policy, FallbackPolicy::Race);
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].param, "url");
        assert_eq!(config.providers[0].shape, ResponseShape::MediaItems);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.providers.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.providers[0].endpoint = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.proxy = Some("relay".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_preserves_provider_order() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.providers, config.providers);
    }
}
