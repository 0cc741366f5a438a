//! Runtime configuration for the optimizer client.

use std::time::Duration;

use crate::payload::ParseMode;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5001";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

pub const ENV_API_BASE: &str = "FRONTIER_API_BASE";
pub const ENV_TIMEOUT_MS: &str = "FRONTIER_TIMEOUT_MS";
pub const ENV_STRICT: &str = "FRONTIER_STRICT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Scheme, host and port of the optimizer service, no trailing slash.
    pub api_base: String,
    pub timeout: Duration,
    pub parse_mode: ParseMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            parse_mode: ParseMode::Lenient,
        }
    }
}

impl Config {
    /// Defaults overridden by `FRONTIER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Config::from_env`] with an injectable variable source.
    /// Unparsable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(base) = lookup(ENV_API_BASE) {
            let base = base.trim();
            if base.is_empty() {
                tracing::warn!(var = ENV_API_BASE, "empty api base ignored");
            } else {
                config = config.with_api_base(base);
            }
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.timeout = Duration::from_millis(ms),
                _ => tracing::warn!(var = ENV_TIMEOUT_MS, value = %raw, "invalid timeout ignored"),
            }
        }

        if let Some(raw) = lookup(ENV_STRICT) {
            match parse_flag(&raw) {
                Some(true) => config.parse_mode = ParseMode::Strict,
                Some(false) => config.parse_mode = ParseMode::Lenient,
                None => tracing::warn!(var = ENV_STRICT, value = %raw, "invalid flag ignored"),
            }
        }

        config
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
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
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.parse_mode, ParseMode::Lenient);
    }

    #[test]
    fn environment_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_API_BASE, "http://optimizer.local:8080/"),
            (ENV_TIMEOUT_MS, "2500"),
            (ENV_STRICT, "TRUE"),
        ]));
        assert_eq!(config.api_base, "http://optimizer.local:8080");
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.parse_mode, ParseMode::Strict);
        assert_eq!(
            config.url("/api/optimize/frontier"),
            "http://optimizer.local:8080/api/optimize/frontier"
        );
    }

    #[test]
    fn bad_values_are_ignored() {
        let config = Config::from_lookup(lookup(&[
            (ENV_API_BASE, "  "),
            (ENV_TIMEOUT_MS, "soon"),
            (ENV_STRICT, "maybe"),
        ]));
        assert_eq!(config, Config::default());
    }
}
