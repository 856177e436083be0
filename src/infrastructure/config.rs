//! Runtime configuration read from environment variables.

use crate::domain::{DomainError, ReferenceData};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const PRIVATE_KEY_ENV: &str = "CREATE_REQUEST_PRIVATE_KEY";
pub const LOG_FILE_ENV: &str = "CREATE_REQUEST_LOG_FILE";
pub const REFERENCE_FILE_ENV: &str = "CREATE_REQUEST_REFERENCE_FILE";
pub const CONFIRMATION_DEFER_ENV: &str = "CREATE_REQUEST_CONFIRMATION_DEFER_MS";
pub const CONFIRMATION_RETRY_DELAY_ENV: &str = "CREATE_REQUEST_CONFIRMATION_RETRY_DELAY_MS";
pub const CONFIRMATION_MAX_RETRY_ENV: &str = "CREATE_REQUEST_CONFIRMATION_MAX_RETRY";
pub const HTTP_TIMEOUT_ENV: &str = "CREATE_REQUEST_HTTP_TIMEOUT_SECS";

const DEFAULT_LOG_FILE: &str = "create-request.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("cannot read reference file {path}: {source}")]
    ReferenceFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Reference(#[from] DomainError),
}

/// Timing of the gateway's persist/confirm exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Wait before the first confirmation query.
    pub confirmation_defer: Duration,
    pub confirmation_retry_delay: Duration,
    pub confirmation_max_retry: u32,
    pub http_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            confirmation_defer: Duration::from_millis(3000),
            confirmation_retry_delay: Duration::from_millis(1000),
            confirmation_max_retry: 30,
            http_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct AppConfig {
    /// Hex-encoded key of the local wallet; `None` leaves the wallet disconnected.
    pub private_key: Option<String>,
    pub log_file: PathBuf,
    pub reference_file: Option<PathBuf>,
    pub gateway: GatewayConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("log_file", &self.log_file)
            .field("reference_file", &self.reference_file)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = GatewayConfig::default();
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let number = |var: &'static str| -> Result<Option<u64>, ConfigError> {
            match non_empty(var) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidValue { var, value }),
                None => Ok(None),
            }
        };

        let max_retry = match number(CONFIRMATION_MAX_RETRY_ENV)? {
            Some(n) => u32::try_from(n).map_err(|_| ConfigError::InvalidValue {
                var: CONFIRMATION_MAX_RETRY_ENV,
                value: n.to_string(),
            })?,
            None => defaults.confirmation_max_retry,
        };

        Ok(Self {
            private_key: non_empty(PRIVATE_KEY_ENV),
            log_file: non_empty(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            reference_file: non_empty(REFERENCE_FILE_ENV).map(PathBuf::from),
            gateway: GatewayConfig {
                confirmation_defer: number(CONFIRMATION_DEFER_ENV)?
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.confirmation_defer),
                confirmation_retry_delay: number(CONFIRMATION_RETRY_DELAY_ENV)?
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.confirmation_retry_delay),
                confirmation_max_retry: max_retry,
                http_timeout: number(HTTP_TIMEOUT_ENV)?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.http_timeout),
            },
        })
    }

    /// Built-in reference tables, or the override file when one is configured.
    pub fn load_reference_data(&self) -> Result<ReferenceData, ConfigError> {
        match &self.reference_file {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| ConfigError::ReferenceFile {
                    path: path.clone(),
                    source,
                })?;
                Ok(ReferenceData::from_json(&json)?)
            }
            None => Ok(ReferenceData::default()),
        }
    }
}
