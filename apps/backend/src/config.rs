//! Service configuration read from the environment.

use std::env;

use thiserror::Error;

use study_core::DEFAULT_THRESHOLD;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Backend configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Similarity at or above which typed answers are accepted.
    pub grading_threshold: f64,
}

impl Config {
    /// Load from process environment, after reading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
                reason: "expected a port number",
            })?,
            None => 3000,
        };

        let grading_threshold = match lookup("GRADING_THRESHOLD") {
            Some(value) => parse_threshold(&value).ok_or(ConfigError::Invalid {
                name: "GRADING_THRESHOLD",
                value,
                reason: "expected a number between 0 and 1",
            })?,
            None => DEFAULT_THRESHOLD,
        };

        Ok(Self {
            database_url,
            host,
            port,
            grading_threshold,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_threshold(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|t| (0.0..=1.0).contains(t))
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
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/study")])).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.grading_threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/study"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("GRADING_THRESHOLD", "0.9"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.grading_threshold, 0.9);
    }

    #[test]
    fn test_missing_database_url() {
        let error = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(error.to_string(), "DATABASE_URL must be set");
    }

    #[test]
    fn test_invalid_port() {
        let error = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/study"),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let error = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/study"),
            ("GRADING_THRESHOLD", "1.5"),
        ]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { name: "GRADING_THRESHOLD", .. }));
    }
}
