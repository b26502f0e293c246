//! Application configuration loaded from environment variables.

use chrono::{FixedOffset, Offset, Utc};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL connection string; the in-memory store is
///   used when unset
/// - `DASHBOARD_UTC_OFFSET` — offset such as `-03:00` whose calendar day
///   counts as "today" on the dashboard (default: `+00:00`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub utc_offset: FixedOffset,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            utc_offset: lookup("DASHBOARD_UTC_OFFSET")
                .and_then(|o| o.parse().ok())
                .unwrap_or(defaults.utc_offset),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            utc_offset: Utc.fix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_reads_every_variable() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
            ("RUST_LOG", "debug"),
            ("DATABASE_URL", "postgres://localhost/delivery"),
            ("DASHBOARD_UTC_OFFSET", "-03:00"),
        ]));
        assert_eq!(config.addr(), "127.0.0.1:8081");
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/delivery")
        );
        assert_eq!(config.utc_offset.local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("DASHBOARD_UTC_OFFSET", "Mars/Olympus"),
            ("DATABASE_URL", ""),
        ]));
        assert_eq!(config.port, 3000);
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
        assert!(config.database_url.is_none());
    }
}
