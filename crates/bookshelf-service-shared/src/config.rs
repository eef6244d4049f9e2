//! Environment-driven configuration for the Bookshelf HTTP service.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `SERVICE_PORT` | `8080` | Listen port |
//! | `BOOKSHELF_STORE` | `table` | `table` (SQLite) or `memory` |
//! | `BOOKSHELF_DB_PATH` | `/data/books.db` | SQLite file for the table store |
//! | `BOOKSHELF_TABLE_NAME` | `books` | Table name |
//! | `BOOKSHELF_SEED_PATH` | unset | JSON array of books loaded into the memory store |
//! | `BOOKSHELF_API_KEY` | unset | Function key; authentication is off when unset |
//! | `BOOKSHELF_READ_ONLY` | `false` | Mount only the read operations |

use std::path::PathBuf;

use bookshelf_lib::{ApiKey, DEFAULT_TABLE_NAME};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_PATH: &str = "/data/books.db";

/// Which store implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// SQLite-backed table store.
    #[default]
    Table,
    /// Process-lifetime in-memory store, optionally seeded.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" | "sqlite" => Ok(StoreBackend::Table),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::UnknownStore(other.to_string())),
        }
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `SERVICE_PORT` is not a valid port number.
    InvalidPort(String),
    /// `BOOKSHELF_STORE` names an unknown backend.
    UnknownStore(String),
    /// A boolean flag has an unrecognised value.
    InvalidFlag { name: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPort(value) => write!(f, "invalid SERVICE_PORT '{}'", value),
            Self::UnknownStore(value) => {
                write!(f, "unknown BOOKSHELF_STORE '{}'; expected table or memory", value)
            }
            Self::InvalidFlag { name, value } => {
                write!(f, "invalid {} '{}'; expected true or false", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub store: StoreBackend,
    pub db_path: PathBuf,
    pub table_name: String,
    pub seed_path: Option<PathBuf>,
    pub api_key: Option<ApiKey>,
    pub read_only: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            store: StoreBackend::Table,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            seed_path: None,
            api_key: None,
            read_only: false,
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns the value of a
    /// variable if set. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("SERVICE_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };

        let store = match get("BOOKSHELF_STORE") {
            Some(raw) => raw.parse()?,
            None => defaults.store,
        };

        let read_only = match get("BOOKSHELF_READ_ONLY") {
            Some(raw) => parse_flag("BOOKSHELF_READ_ONLY", &raw)?,
            None => defaults.read_only,
        };

        Ok(Self {
            port,
            store,
            db_path: get("BOOKSHELF_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            table_name: get("BOOKSHELF_TABLE_NAME").unwrap_or(defaults.table_name),
            seed_path: get("BOOKSHELF_SEED_PATH").map(PathBuf::from),
            api_key: get("BOOKSHELF_API_KEY").and_then(ApiKey::new),
            read_only,
        })
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}
