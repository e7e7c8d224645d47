//! Environment-driven configuration.

use anyhow::{Context, Result};
use fitlog_import::IntermediaryConfig;
use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};
use tracing::debug;

/// Runtime configuration for the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where entries are stored
    pub data_dir: PathBuf,

    /// Intermediary and provider endpoints
    pub intermediary: IntermediaryConfig,

    /// How long to wait for consent; `None` waits until the user closes it
    pub consent_timeout: Option<Duration>,
}

impl Config {
    /// Load from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = IntermediaryConfig::default();

        let data_dir = PathBuf::from(or_default(&lookup, "FITLOG_DATA_DIR", ".fitlog".to_string()));
        let auth_base_url = or_default(&lookup, "FITLOG_AUTH_URL", defaults.auth_base_url);
        let measure_url = or_default(&lookup, "FITLOG_MEASURE_URL", defaults.measure_url);
        let timeout_secs: u64 = parse_or(&lookup, "FITLOG_HTTP_TIMEOUT_SECS", 30)?;
        let consent_secs: u64 = parse_or(&lookup, "FITLOG_CONSENT_TIMEOUT_SECS", 600)?;

        Ok(Self {
            data_dir,
            intermediary: IntermediaryConfig {
                auth_base_url,
                measure_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            consent_timeout: (consent_secs > 0).then(|| Duration::from_secs(consent_secs)),
        })
    }
}

fn or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: String) -> String {
    lookup(key).unwrap_or_else(|| {
        debug!("{key} not set, using default: {default}");
        default
    })
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw:?}")),
        None => {
            debug!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".fitlog"));
        assert_eq!(config.intermediary.measure_url, "https://wbsapi.withings.net/measure");
        assert_eq!(config.intermediary.timeout, Duration::from_secs(30));
        assert_eq!(config.consent_timeout, Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("FITLOG_DATA_DIR", "/tmp/fit"),
            ("FITLOG_AUTH_URL", "http://localhost:54321/functions/v1"),
            ("FITLOG_HTTP_TIMEOUT_SECS", "5"),
            ("FITLOG_CONSENT_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/fit"));
        assert_eq!(config.intermediary.auth_base_url, "http://localhost:54321/functions/v1");
        assert_eq!(config.intermediary.timeout, Duration::from_secs(5));
        assert_eq!(config.consent_timeout, None);
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        let err = Config::from_lookup(lookup(&[("FITLOG_HTTP_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("FITLOG_HTTP_TIMEOUT_SECS"));
    }
}
