//! Runtime settings from `.env` and the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::data::DEFAULT_DATA_URL;
use crate::error::AppError;
use crate::stats::{DEFAULT_TOP_N, DisplayThreshold};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_url: String,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    pub threshold: DisplayThreshold,
    pub top_n: usize,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            cache_dir: PathBuf::from(".covid-cache"),
            cache_ttl: Duration::from_secs(10_800),
            threshold: DisplayThreshold::DEFAULT,
            top_n: DEFAULT_TOP_N,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read `COVID_*` variables over the defaults.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut settings = Self::default();

        if let Some(url) = lookup("COVID_DATA_URL").filter(|s| !s.trim().is_empty()) {
            settings.data_url = url.trim().to_string();
        }
        if let Some(dir) = lookup("COVID_CACHE_DIR").filter(|s| !s.trim().is_empty()) {
            settings.cache_dir = PathBuf::from(dir.trim());
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "COVID_CACHE_TTL_SECS")? {
            settings.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(min) = parse_var::<u64>(&lookup, "COVID_DISPLAY_THRESHOLD")? {
            settings.threshold = DisplayThreshold::new(min);
        }
        if let Some(n) = parse_var::<usize>(&lookup, "COVID_TOP_N")? {
            if n == 0 {
                return Err(AppError::new(2, "COVID_TOP_N must be at least 1."));
            }
            settings.top_n = n;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "COVID_HTTP_TIMEOUT_SECS")? {
            settings.http_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::new(2, format!("Invalid {key}='{raw}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.cache_ttl, Duration::from_secs(3 * 3600));
        assert_eq!(settings.threshold.min(), 3);
    }

    #[test]
    fn overrides_apply() {
        let settings = Settings::from_lookup(lookup(&[
            ("COVID_CACHE_DIR", "/tmp/covid"),
            ("COVID_DISPLAY_THRESHOLD", " 5 "),
            ("COVID_TOP_N", "4"),
        ]))
        .unwrap();
        assert_eq!(settings.cache_dir, PathBuf::from("/tmp/covid"));
        assert_eq!(settings.threshold, DisplayThreshold::new(5));
        assert_eq!(settings.top_n, 4);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = Settings::from_lookup(lookup(&[("COVID_CACHE_TTL_SECS", "soon")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("COVID_CACHE_TTL_SECS"));

        let err = Settings::from_lookup(lookup(&[("COVID_TOP_N", "0")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
