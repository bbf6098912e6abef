//! Connection settings for [`crate::HttpGateway`].

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Environment variable holding the control-panel base URL.
pub const ENV_URL: &str = "PANEL_URL";
/// Environment variable holding the account user name.
pub const ENV_USER: &str = "PANEL_USER";
/// Environment variable holding the API token.
pub const ENV_TOKEN: &str = "PANEL_TOKEN";
/// Environment variable overriding the request timeout, in whole seconds (at least 1).
pub const ENV_TIMEOUT_SECS: &str = "PANEL_TIMEOUT_SECS";
/// Environment variable that, when `1` or `true`, disables certificate checks.
pub const ENV_INSECURE: &str = "PANEL_INSECURE";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while building an [`HttpGatewayConfig`] or the gateway itself.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was not supplied.
    #[error("Missing configuration value: {name}")]
    Missing {
        /// Name of the setting (environment variable name when read from env).
        name: &'static str,
    },

    /// A setting was supplied but could not be parsed.
    #[error("Invalid value for {name}: {value:?}")]
    Invalid {
        /// Name of the setting.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The base URL cannot carry a path (e.g. `mailto:`).
    #[error("Base URL cannot carry a path: {0}")]
    UnusableBaseUrl(Url),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Settings for one control-panel account.
#[derive(Clone, Deserialize)]
pub struct HttpGatewayConfig {
    /// Base URL of the control panel, e.g. `https://host.example:2083`.
    pub base_url: Url,
    /// Account user name.
    pub username: String,
    /// API token for `username`.
    pub api_token: String,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Skip TLS certificate verification (self-signed panels).
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("panel-http/{}", env!("CARGO_PKG_VERSION"))
}

impl HttpGatewayConfig {
    /// Creates a config with default timeout, user agent and TLS checks on.
    pub fn new(base_url: Url, username: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url,
            username: username.into(),
            api_token: api_token.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: false,
            user_agent: default_user_agent(),
        }
    }

    /// Reads the config from the `PANEL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the config through `lookup`, which maps a variable name to its value.
    ///
    /// An empty value counts as unset for every variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let value = |name: &'static str| lookup(name).filter(|v| !v.is_empty());
        let required = |name: &'static str| value(name).ok_or(ConfigError::Missing { name });

        let raw_url = required(ENV_URL)?;
        let base_url = Url::parse(&raw_url).map_err(|_| ConfigError::Invalid {
            name: ENV_URL,
            value: raw_url.clone(),
        })?;

        let mut config = Self::new(base_url, required(ENV_USER)?, required(ENV_TOKEN)?);

        if let Some(raw) = value(ENV_TIMEOUT_SECS) {
            config.timeout_secs = match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: ENV_TIMEOUT_SECS,
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = value(ENV_INSECURE) {
            config.accept_invalid_certs = match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: ENV_INSECURE,
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }

    /// The request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// The token stays out of logs.
impl std::fmt::Debug for HttpGatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGatewayConfig")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup<'a>(
        vars: &'a HashMap<&'static str, &'static str>,
    ) -> impl Fn(&'static str) -> Option<String> + 'a {
        move |name| vars.get(name).map(|v| (*v).to_owned())
    }

    #[test]
    fn reads_required_and_optional_values() {
        let vars = HashMap::from([
            (ENV_URL, "https://panel.test:2083"),
            (ENV_USER, "bob"),
            (ENV_TOKEN, "T0KEN"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_INSECURE, "true"),
        ]);

        let config = HttpGatewayConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.base_url.as_str(), "https://panel.test:2083/");
        assert_eq!(config.username, "bob");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn missing_token_is_reported_by_name() {
        let vars = HashMap::from([(ENV_URL, "https://panel.test"), (ENV_USER, "bob")]);

        let err = HttpGatewayConfig::from_lookup(lookup(&vars)).unwrap_err();

        assert!(matches!(err, ConfigError::Missing { name } if name == ENV_TOKEN));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let vars = HashMap::from([
            (ENV_URL, "https://panel.test"),
            (ENV_USER, "bob"),
            (ENV_TOKEN, "t"),
            (ENV_TIMEOUT_SECS, "soon"),
        ]);

        let err = HttpGatewayConfig::from_lookup(lookup(&vars)).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == ENV_TIMEOUT_SECS));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let vars = HashMap::from([
            (ENV_URL, "https://panel.test"),
            (ENV_USER, "bob"),
            (ENV_TOKEN, "t"),
            (ENV_TIMEOUT_SECS, "0"),
        ]);

        let err = HttpGatewayConfig::from_lookup(lookup(&vars)).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Invalid { name, ref value } if name == ENV_TIMEOUT_SECS && value == "0"
        ));
    }

    #[test]
    fn empty_optional_values_fall_back_to_defaults() {
        let vars = HashMap::from([
            (ENV_URL, "https://panel.test"),
            (ENV_USER, "bob"),
            (ENV_TOKEN, "t"),
            (ENV_TIMEOUT_SECS, ""),
            (ENV_INSECURE, ""),
        ]);

        let config = HttpGatewayConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn unrecognised_insecure_flag_is_rejected() {
        let vars = HashMap::from([
            (ENV_URL, "https://panel.test"),
            (ENV_USER, "bob"),
            (ENV_TOKEN, "t"),
            (ENV_INSECURE, "maybe"),
        ]);

        let err = HttpGatewayConfig::from_lookup(lookup(&vars)).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == ENV_INSECURE));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: HttpGatewayConfig = serde_json::from_str(
            r#"{"base_url":"https://panel.test:2083","username":"bob","api_token":"t"}"#,
        )
        .unwrap();

        assert_eq!(config.timeout_secs, 30);
        assert!(!config.accept_invalid_certs);
        assert!(config.user_agent.starts_with("panel-http/"));
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let config = HttpGatewayConfig::new(
            Url::parse("https://panel.test").unwrap(),
            "bob",
            "SECRET",
        );
        assert!(!format!("{config:?}").contains("SECRET"));
    }
}
