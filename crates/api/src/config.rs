use std::str::FromStr;

use axum::http::HeaderValue;
use innkeep_core::config::BookingConfig;
use innkeep_core::error::CoreError;

/// Default bounded queue size for outgoing booking notices.
pub const DEFAULT_NOTIFICATION_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("Invalid booking policy: {0}")]
    Policy(#[from] CoreError),
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for queued notices to drain on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL URL. Without it the server runs on the in-memory store.
    pub database_url: Option<String>,
    pub notification_queue_capacity: usize,
    /// Stay limits and cancellation policy.
    pub booking: BookingConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                    |
    /// | `DATABASE_URL`                | unset (in-memory store) |
    /// | `NOTIFICATION_QUEUE_CAPACITY` | `256`                   |
    /// | `MIN_STAY_NIGHTS`             | `1`                     |
    /// | `MAX_STAY_NIGHTS`             | `14`                    |
    /// | `FREE_CANCELLATION_HOURS`     | `24`                    |
    /// | `CANCELLATION_FEE_RATE`       | `0.5`                   |
    /// | `CHECK_IN_HOUR`               | `0`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = BookingConfig::default();

        let booking = BookingConfig {
            min_stay_nights: parse_or(&lookup, "MIN_STAY_NIGHTS", defaults.min_stay_nights)?,
            max_stay_nights: parse_or(&lookup, "MAX_STAY_NIGHTS", defaults.max_stay_nights)?,
            free_cancellation_hours: parse_or(
                &lookup,
                "FREE_CANCELLATION_HOURS",
                defaults.free_cancellation_hours,
            )?,
            cancellation_fee_rate: parse_or(
                &lookup,
                "CANCELLATION_FEE_RATE",
                defaults.cancellation_fee_rate,
            )?,
            check_in_hour: parse_or(&lookup, "CHECK_IN_HOUR", defaults.check_in_hour)?,
        };
        booking.validate()?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| o.parse::<HeaderValue>().is_err())
        {
            return Err(ConfigError::Invalid {
                key: "CORS_ORIGINS",
                value: bad.clone(),
            });
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "PORT", 3000)?,
            cors_origins,
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: parse_or(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            notification_queue_capacity: parse_or(
                &lookup,
                "NOTIFICATION_QUEUE_CAPACITY",
                DEFAULT_NOTIFICATION_QUEUE_CAPACITY,
            )?,
            booking,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert!(config.database_url.is_none());
        assert_eq!(config.notification_queue_capacity, 256);
        assert_eq!(config.booking, BookingConfig::default());
    }

    #[test]
    fn booking_policy_is_read() {
        let config = load(&[
            ("MAX_STAY_NIGHTS", "30"),
            ("CANCELLATION_FEE_RATE", "0.25"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ])
        .unwrap();
        assert_eq!(config.booking.max_stay_nights, 30);
        assert_eq!(config.booking.cancellation_fee_rate, 0.25);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn unparsable_value_is_reported() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { key: "PORT", .. });
    }

    #[test]
    fn invalid_cors_origin_is_reported() {
        let err = load(&[("CORS_ORIGINS", "http://ok.test,bad\norigin")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { key: "CORS_ORIGINS", .. });
    }

    #[test]
    fn inconsistent_policy_is_rejected() {
        let err = load(&[("MIN_STAY_NIGHTS", "5"), ("MAX_STAY_NIGHTS", "2")]).unwrap_err();
        assert_matches!(err, ConfigError::Policy(_));
    }
}
