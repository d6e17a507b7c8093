//! Provider configuration.
//!
//! The host sends the provider block as JSON during Configure. It is
//! deserialized into [`ProviderConfig`], which resolves defaults and the API
//! base URL for the client.

use serde::Deserialize;
use std::fmt;

use crate::error::ProviderError;

/// Default values applied when the configuration leaves them out.
pub mod defaults {
    /// Default Sweet environment.
    pub const ENV: &str = "prod";

    /// Default Sweet sub-environment.
    pub const SUBENV: &str = "main";
}

/// Configuration constants for the Sweet API.
pub mod api {
    /// Base URL of the production environment.
    pub const PROD_BASE_URL: &str = "https://api.sweet.security";

    /// Environment variable overriding the API base URL.
    pub const BASE_URL_ENV_VAR: &str = "SWEET_API_URL";
}

/// The provider block: credentials plus the target environment.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    /// Sweet API key.
    pub api_key: String,
    /// Sweet API secret.
    pub secret: String,
    /// Sweet environment to use.
    #[serde(default)]
    pub env: Option<String>,
    /// Sweet sub environment to use.
    #[serde(default)]
    pub subenv: Option<String>,
}

impl ProviderConfig {
    /// Create a configuration using the default environment.
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            env: None,
            subenv: None,
        }
    }

    /// Parse the configuration sent by the host.
    ///
    /// Only presence is checked here. Invalid credentials surface on the
    /// first API call.
    pub fn from_value(config: serde_json::Value) -> Result<Self, ProviderError> {
        serde_json::from_value(config)
            .map_err(|e| ProviderError::Configuration(format!("invalid provider block: {}", e)))
    }

    /// Set the environment.
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Set the sub-environment.
    pub fn with_subenv(mut self, subenv: impl Into<String>) -> Self {
        self.subenv = Some(subenv.into());
        self
    }

    /// The environment, defaulting to `prod`.
    pub fn env(&self) -> &str {
        self.env.as_deref().unwrap_or(defaults::ENV)
    }

    /// The sub-environment, defaulting to `main`.
    pub fn subenv(&self) -> &str {
        self.subenv.as_deref().unwrap_or(defaults::SUBENV)
    }

    /// Resolve the API base URL.
    ///
    /// `SWEET_API_URL` wins when set; otherwise the URL follows the environment.
    pub fn base_url(&self) -> String {
        match std::env::var(api::BASE_URL_ENV_VAR) {
            Ok(url) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
            _ => base_url_for_env(self.env()),
        }
    }
}

// Credentials must never reach the logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("env", &self.env())
            .field("subenv", &self.subenv())
            .finish()
    }
}

/// Base URL of the API for an environment name.
pub fn base_url_for_env(env: &str) -> String {
    if env == defaults::ENV {
        api::PROD_BASE_URL.to_string()
    } else {
        format!("https://api.{}.sweet.security", env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_applied() {
        let config = ProviderConfig::from_value(json!({
            "api_key": "key",
            "secret": "secret"
        }))
        .unwrap();

        assert_eq!(config.env(), "prod");
        assert_eq!(config.subenv(), "main");
    }

    #[test]
    fn test_null_env_uses_defaults() {
        let config = ProviderConfig::from_value(json!({
            "api_key": "key",
            "secret": "secret",
            "env": null,
            "subenv": null
        }))
        .unwrap();

        assert_eq!(config.env(), "prod");
        assert_eq!(config.subenv(), "main");
    }

    #[test]
    fn test_explicit_env() {
        let config = ProviderConfig::new("key", "secret")
            .with_env("staging")
            .with_subenv("eu");
        assert_eq!(config.env(), "staging");
        assert_eq!(config.subenv(), "eu");
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = ProviderConfig::from_value(json!({"api_key": "key"})).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(err.to_string().contains("secret"));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = ProviderConfig::new("AKIA-very-secret", "hunter2");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("AKIA-very-secret"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("prod"));
    }

    #[test]
    fn test_base_url_for_env() {
        assert_eq!(base_url_for_env("prod"), "https://api.sweet.security");
        assert_eq!(base_url_for_env("dev"), "https://api.dev.sweet.security");
    }
}
