//! Environment-driven process configuration.

use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

use stockroom_core::PageLimits;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Postgres + Redis connection settings, present only when persistent
/// stores are selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    pub database_url: String,
    pub redis_url: String,
    pub db_max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub persistence: Option<PersistenceConfig>,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub seed_sample_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Build from an explicit variable map (`from_env` passes the process
    /// environment).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let persistence = if flag(get("USE_PERSISTENT_STORES")) {
            Some(PersistenceConfig {
                database_url: get("DATABASE_URL")
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?
                    .to_string(),
                redis_url: get("REDIS_URL").unwrap_or(DEFAULT_REDIS_URL).to_string(),
                db_max_connections: parse(
                    "DB_MAX_CONNECTIONS",
                    get("DB_MAX_CONNECTIONS"),
                    DEFAULT_DB_MAX_CONNECTIONS,
                )?,
            })
        } else {
            None
        };

        let limits = PageLimits::default();
        let config = Self {
            bind_addr: get("BIND_ADDR").unwrap_or(DEFAULT_BIND_ADDR).to_string(),
            persistence,
            default_page_size: parse(
                "DEFAULT_PAGE_SIZE",
                get("DEFAULT_PAGE_SIZE"),
                limits.default_size,
            )?,
            max_page_size: parse("MAX_PAGE_SIZE", get("MAX_PAGE_SIZE"), limits.max_size)?,
            seed_sample_data: flag(get("SEED_SAMPLE_DATA")),
        };

        if config.default_page_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DEFAULT_PAGE_SIZE",
                value: "0".into(),
            });
        }
        if config.max_page_size < config.default_page_size {
            return Err(ConfigError::Invalid {
                name: "MAX_PAGE_SIZE",
                value: config.max_page_size.to_string(),
            });
        }
        Ok(config)
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_size: self.default_page_size,
            max_size: self.max_page_size,
        }
    }
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn parse<T: FromStr>(name: &'static str, value: Option<&str>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_select_in_memory_backends() {
        let config = AppConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.persistence.is_none());
        assert_eq!(config.page_limits(), PageLimits::default());
        assert!(!config.seed_sample_data);
    }

    #[test]
    fn persistent_mode_requires_database_url() {
        let err = AppConfig::from_vars(&vars(&[("USE_PERSISTENT_STORES", "true")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

        let config = AppConfig::from_vars(&vars(&[
            ("USE_PERSISTENT_STORES", "TRUE"),
            ("DATABASE_URL", "postgres://localhost/stockroom"),
            ("DB_MAX_CONNECTIONS", "4"),
        ]))
        .unwrap();
        let persistence = config.persistence.unwrap();
        assert_eq!(persistence.redis_url, DEFAULT_REDIS_URL);
        assert_eq!(persistence.db_max_connections, 4);
    }

    #[test]
    fn bad_numbers_are_reported_by_name() {
        let err = AppConfig::from_vars(&vars(&[("MAX_PAGE_SIZE", "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "MAX_PAGE_SIZE",
                value: "lots".into()
            }
        );
        assert!(AppConfig::from_vars(&vars(&[("DEFAULT_PAGE_SIZE", "0")])).is_err());
        assert!(
            AppConfig::from_vars(&vars(&[("DEFAULT_PAGE_SIZE", "50"), ("MAX_PAGE_SIZE", "10")]))
                .is_err()
        );
    }
}
