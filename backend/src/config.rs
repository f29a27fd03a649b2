//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `CLINIC_*` environment variables, command-line flags or
//! a configuration file. Session cookie settings are read separately by
//! [`crate::inbound::http::session_config`] because they carry secrets.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_TIMEOUT_SECS: u64 = 10;

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid bind address '{value}': {message}")]
    BindAddr { value: String, message: String },
    #[error("CLINIC_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error("pool_max_size must be at least 1")]
    EmptyPool,
}

/// Application settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLINIC")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections kept open.
    pub pool_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_timeout_secs: Option<u64>,
}

impl AppSettings {
    /// Parsed bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim().parse().map_err(|err: std::net::AddrParseError| {
            ConfigError::BindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            }
        })
    }

    /// Pool settings derived from the database options.
    pub fn pool_config(&self) -> Result<PoolConfig, ConfigError> {
        let url = self
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        let max_size = self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE);
        if max_size == 0 {
            return Err(ConfigError::EmptyPool);
        }
        let timeout = Duration::from_secs(self.pool_timeout_secs.unwrap_or(DEFAULT_POOL_TIMEOUT_SECS));

        let mut config = PoolConfig::new(url)
            .with_max_size(max_size)
            .with_connection_timeout(timeout);
        if let Some(min_idle) = self.pool_min_idle {
            config = config.with_min_idle(Some(min_idle.min(max_size)));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    //! Configuration parsing from the environment.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "CLINIC_BIND_ADDR",
        "CLINIC_DATABASE_URL",
        "CLINIC_POOL_MAX_SIZE",
        "CLINIC_POOL_MIN_IDLE",
        "CLINIC_POOL_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("clinic-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(
            settings.pool_config().expect_err("no url"),
            ConfigError::MissingDatabaseUrl
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CLINIC_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "CLINIC_DATABASE_URL",
                Some("postgres://clinic@localhost/clinic".to_owned()),
            ),
            ("CLINIC_POOL_MAX_SIZE", Some("4".to_owned())),
            ("CLINIC_POOL_MIN_IDLE", Some("9".to_owned())),
            ("CLINIC_POOL_TIMEOUT_SECS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal")
        );
        let pool = settings.pool_config().expect("pool config");
        assert_eq!(pool.database_url(), "postgres://clinic@localhost/clinic");
        assert_eq!(pool.max_size(), 4);
    }

    #[rstest]
    #[case(Some("not-an-address"))]
    #[case(Some("localhost"))]
    fn malformed_bind_addresses_are_rejected(#[case] raw: Option<&str>) {
        let settings = AppSettings {
            bind_addr: raw.map(str::to_owned),
            database_url: None,
            pool_max_size: None,
            pool_min_idle: None,
            pool_timeout_secs: None,
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(ConfigError::BindAddr { .. })
        ));
    }

    #[rstest]
    fn zero_sized_pool_is_rejected() {
        let settings = AppSettings {
            bind_addr: None,
            database_url: Some("postgres://localhost/clinic".to_owned()),
            pool_max_size: Some(0),
            pool_min_idle: None,
            pool_timeout_secs: None,
        };
        assert_eq!(settings.pool_config().expect_err("empty"), ConfigError::EmptyPool);
    }
}
