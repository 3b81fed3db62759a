//! # Service Configuration
//!
//! Configuration is read from environment variables, optionally layered
//! over a YAML file named by `KYC_CONFIG`. Environment values win.
//!
//! | Variable | YAML key | Default |
//! |----------|----------|---------|
//! | `PORT` | `port` | `8080` |
//! | `AUTH_TOKEN` | `auth_token` | unset (auth disabled) |
//! | `KYC_ALLOWED_ORIGINS` | `allowed_origins` | `http://localhost:3001,http://localhost:3002` |
//! | `KYC_LEDGER_URL` | `ledger.url` | unset (in-memory ledger) |
//! | `KYC_LEDGER_CONTRACT` | `ledger.contract` | required with a URL |
//! | `KYC_LEDGER_TOKEN` | `ledger.token` | unset |
//! | `KYC_LEDGER_TIMEOUT_SECS` | `ledger.timeout_secs` | `30` |
//! | `KYC_PROOF_STORE` | `proof_store.backend` | `file` |
//! | `KYC_PROOF_STORE_PATH` | `proof_store.path` | `data/proofs.json` |
//! | `KYC_PROOF_TTL_DAYS` | `proof_store.ttl_days` | `365` |
//! | `DATABASE_URL` | `database_url` | unset |

use std::path::{Path, PathBuf};

use kyc_ledger::LedgerClientConfig;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:3001", "http://localhost:3002"];
pub const DEFAULT_PROOF_STORE_PATH: &str = "data/proofs.json";

/// Where presented proofs are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofStoreBackend {
    Memory,
    File,
    Postgres,
}

impl std::str::FromStr for ProofStoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(ConfigError::Invalid {
                key: "KYC_PROOF_STORE",
                reason: format!("unknown backend {other:?}, expected memory, file or postgres"),
            }),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error(transparent)]
    Ledger(#[from] kyc_ledger::config::ConfigError),
}

// -- YAML file layout --------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub auth_token: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
    #[serde(default)]
    pub ledger: FileLedgerConfig,
    #[serde(default)]
    pub proof_store: FileProofStoreConfig,
    pub database_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLedgerConfig {
    pub url: Option<String>,
    pub contract: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileProofStoreConfig {
    pub backend: Option<ProofStoreBackend>,
    pub path: Option<PathBuf>,
    pub ttl_days: Option<i64>,
}

impl FileConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }
}

// -- Resolved configuration --------------------------------------------------

/// Resolved service configuration.
///
/// Custom `Debug` redacts the auth token and the database URL.
#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Static bearer token guarding write and admin routes. `None`
    /// disables authentication.
    pub auth_token: Option<String>,
    pub allowed_origins: Vec<String>,
    /// Ledger gateway. `None` runs against an in-memory ledger.
    pub ledger: Option<LedgerClientConfig>,
    pub proof_store: ProofStoreBackend,
    pub proof_store_path: PathBuf,
    pub proof_ttl_days: i64,
    pub database_url: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("allowed_origins", &self.allowed_origins)
            .field("ledger", &self.ledger)
            .field("proof_store", &self.proof_store)
            .field("proof_store_path", &self.proof_store_path)
            .field("proof_ttl_days", &self.proof_ttl_days)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            auth_token: None,
            allowed_origins: DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect(),
            ledger: None,
            proof_store: ProofStoreBackend::File,
            proof_store_path: PathBuf::from(DEFAULT_PROOF_STORE_PATH),
            proof_ttl_days: kyc_store::DEFAULT_TTL_DAYS,
            database_url: None,
        }
    }
}

impl AppConfig {
    /// Load from `KYC_CONFIG` (if set) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var("KYC_CONFIG") {
            Ok(path) if !path.trim().is_empty() => FileConfig::load(Path::new(&path))?,
            _ => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Environment only, ignoring `KYC_CONFIG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(FileConfig::default(), |key| std::env::var(key).ok())
    }

    /// Merge a file configuration with environment lookups.
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match env("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                reason: format!("{raw:?} is not a port number"),
            })?,
            None => file.port.unwrap_or(defaults.port),
        };

        let allowed_origins = match env("KYC_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => file.allowed_origins.unwrap_or(defaults.allowed_origins),
        };

        let ledger_url = env("KYC_LEDGER_URL").or(file.ledger.url);
        let ledger = match ledger_url {
            Some(url) => {
                let contract = env("KYC_LEDGER_CONTRACT")
                    .or(file.ledger.contract)
                    .ok_or(kyc_ledger::config::ConfigError::Missing("KYC_LEDGER_CONTRACT"))?;
                let timeout = match env("KYC_LEDGER_TIMEOUT_SECS") {
                    Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                        key: "KYC_LEDGER_TIMEOUT_SECS",
                        reason: format!("{raw:?} is not a number of seconds"),
                    })?,
                    None => file.ledger.timeout_secs.unwrap_or(30),
                };
                Some(LedgerClientConfig::new(
                    &url,
                    &contract,
                    env("KYC_LEDGER_TOKEN").or(file.ledger.token),
                    timeout,
                )?)
            }
            None => None,
        };

        let proof_store = match env("KYC_PROOF_STORE") {
            Some(raw) => raw.parse()?,
            None => file.proof_store.backend.unwrap_or(defaults.proof_store),
        };

        let proof_ttl_days = match env("KYC_PROOF_TTL_DAYS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "KYC_PROOF_TTL_DAYS",
                reason: format!("{raw:?} is not a number of days"),
            })?,
            None => file.proof_store.ttl_days.unwrap_or(defaults.proof_ttl_days),
        };
        if proof_ttl_days <= 0 {
            return Err(ConfigError::Invalid {
                key: "KYC_PROOF_TTL_DAYS",
                reason: "must be positive".into(),
            });
        }

        let database_url = env("DATABASE_URL").or(file.database_url);
        if proof_store == ProofStoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Invalid {
                key: "DATABASE_URL",
                reason: "required when KYC_PROOF_STORE=postgres".into(),
            });
        }

        Ok(Self {
            port,
            auth_token: env("AUTH_TOKEN").or(file.auth_token),
            allowed_origins,
            ledger,
            proof_store,
            proof_store_path: env("KYC_PROOF_STORE_PATH")
                .map(PathBuf::from)
                .or(file.proof_store.path)
                .unwrap_or(defaults.proof_store_path),
            proof_ttl_days,
            database_url,
        })
    }

    pub fn proof_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.proof_ttl_days)
    }
}
