//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored when present.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::profile::{BackendKind, BackendProfile};
use crate::transport::DEFAULT_TIMEOUT;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the challenges service (`CHALLENGES_API_URL`).
    pub api_base_url: String,
    /// Backend variant to talk to (`CHALLENGES_BACKEND`).
    pub backend: BackendKind,
    /// Per-call deadline (`CHALLENGES_TIMEOUT_MS`, `0` disables it).
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            backend: BackendKind::HttpClient,
            request_timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = match lookup("CHALLENGES_API_URL") {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::Invalid {
                    var: "CHALLENGES_API_URL",
                    reason: "must not be empty".to_string(),
                })
            }
            Some(url) => url.trim().to_string(),
            None => defaults.api_base_url,
        };

        let backend = match lookup("CHALLENGES_BACKEND") {
            Some(kind) => kind.parse::<BackendKind>().map_err(|reason| ConfigError::Invalid {
                var: "CHALLENGES_BACKEND",
                reason,
            })?,
            None => defaults.backend,
        };

        let request_timeout = match lookup("CHALLENGES_TIMEOUT_MS") {
            Some(ms) => {
                let ms: u64 = ms.trim().parse().map_err(|e| ConfigError::Invalid {
                    var: "CHALLENGES_TIMEOUT_MS",
                    reason: format!("{e}"),
                })?;
                (ms > 0).then(|| Duration::from_millis(ms))
            }
            None => defaults.request_timeout,
        };

        Ok(Self {
            api_base_url,
            backend,
            request_timeout,
        })
    }

    pub fn profile(&self) -> BackendProfile {
        BackendProfile::from_kind(self.backend, &self.api_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.profile().name, "http-client");
    }

    #[test]
    fn reads_all_variables() {
        let config = Config::from_lookup(lookup(&[
            ("CHALLENGES_API_URL", "http://strava.internal:9090/"),
            ("CHALLENGES_BACKEND", "rest-template"),
            ("CHALLENGES_TIMEOUT_MS", "2500"),
        ]))
        .unwrap();
        assert_eq!(config.backend, BackendKind::RestTemplate);
        assert_eq!(config.request_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(config.profile().base_url, "http://strava.internal:9090");
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let config = Config::from_lookup(lookup(&[("CHALLENGES_TIMEOUT_MS", "0")])).unwrap();
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn rejects_bad_values() {
        let err = Config::from_lookup(lookup(&[("CHALLENGES_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("CHALLENGES_TIMEOUT_MS"));

        let err = Config::from_lookup(lookup(&[("CHALLENGES_BACKEND", "soap")])).unwrap_err();
        assert!(err.to_string().contains("CHALLENGES_BACKEND"));

        let err = Config::from_lookup(lookup(&[("CHALLENGES_API_URL", " ")])).unwrap_err();
        assert!(err.to_string().contains("CHALLENGES_API_URL"));
    }
}
