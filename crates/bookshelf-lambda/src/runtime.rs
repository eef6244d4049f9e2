//! Lambda runtime initialization.
//!
//! The store is opened once per execution environment and reused across
//! invocations.
//!
//! # Environment Variables
//!
//! - `BOOKSHELF_STORE`: `table` (default) or `memory`
//! - `BOOKSHELF_DB_PATH`: SQLite file (default: `/tmp/books.db`)
//! - `BOOKSHELF_TABLE_NAME`: table name (default: `books`)
//! - `BOOKSHELF_SEED_PATH`: JSON seed file for the memory store
//! - `BOOKSHELF_API_KEY`: function key; unset disables authentication
//! - `BOOKSHELF_READ_ONLY`: `true` mounts only the read operations

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use tracing::{error, info};

use bookshelf_lib::{
    ApiKey, BookStore, Error as LibError, MemoryStore, RouteTable, TableStore, DEFAULT_TABLE_NAME,
};

/// Writable location inside the Lambda sandbox.
const DEFAULT_DB_PATH: &str = "/tmp/books.db";

static RUNTIME: OnceLock<Result<LambdaRuntime, InitError>> = OnceLock::new();

/// Error during runtime initialization.
#[derive(Debug, Clone)]
pub struct InitError {
    pub message: String,
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lambda initialization failed: {}", self.message)
    }
}

impl std::error::Error for InitError {}

impl From<LibError> for InitError {
    fn from(err: LibError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Store selection and access settings read at cold start.
#[derive(Debug, Clone, Default)]
pub struct LambdaConfig {
    pub memory_store: bool,
    pub db_path: Option<PathBuf>,
    pub table_name: Option<String>,
    pub seed_path: Option<PathBuf>,
    pub api_key: Option<ApiKey>,
    pub read_only: bool,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self, InitError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InitError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store = get("BOOKSHELF_STORE").map(|v| v.trim().to_lowercase());
        let memory_store = match store.as_deref() {
            None | Some("table") | Some("sqlite") => false,
            Some("memory") | Some("in-memory") => true,
            Some(other) => {
                return Err(InitError {
                    message: format!("unknown BOOKSHELF_STORE '{}'", other),
                })
            }
        };

        let read_only = match get("BOOKSHELF_READ_ONLY") {
            Some(raw) => parse_flag("BOOKSHELF_READ_ONLY", &raw)?,
            None => false,
        };

        Ok(Self {
            memory_store,
            db_path: get("BOOKSHELF_DB_PATH").map(PathBuf::from),
            table_name: get("BOOKSHELF_TABLE_NAME"),
            seed_path: get("BOOKSHELF_SEED_PATH").map(PathBuf::from),
            api_key: get("BOOKSHELF_API_KEY").and_then(ApiKey::new),
            read_only,
        })
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, InitError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(InitError {
            message: format!("{} must be a boolean, got '{}'", name, raw),
        }),
    }
}

/// Everything an invocation needs: the store, the function key and the
/// mounted routes.
pub struct LambdaRuntime {
    store: Arc<dyn BookStore>,
    api_key: Option<ApiKey>,
    routes: RouteTable,
}

impl LambdaRuntime {
    pub fn new(store: Arc<dyn BookStore>, api_key: Option<ApiKey>, read_only: bool) -> Self {
        Self {
            store,
            api_key,
            routes: RouteTable::new(read_only),
        }
    }

    /// Open and provision the configured store.
    pub fn from_config(config: &LambdaConfig) -> Result<Self, InitError> {
        let store: Arc<dyn BookStore> = if config.memory_store {
            match &config.seed_path {
                Some(path) => Arc::new(MemoryStore::from_seed_file(path)?),
                None => Arc::new(MemoryStore::new()),
            }
        } else {
            let path = config
                .db_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
            let table = config.table_name.as_deref().unwrap_or(DEFAULT_TABLE_NAME);
            Arc::new(TableStore::open(path, table)?)
        };

        store.ensure_table_exists()?;

        Ok(Self::new(store, config.api_key.clone(), config.read_only))
    }

    pub fn store(&self) -> &dyn BookStore {
        self.store.as_ref()
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

/// Initialize the shared runtime from the environment.
///
/// Later calls return the cached outcome, including a cached failure.
pub fn init_runtime() -> Result<&'static LambdaRuntime, InitError> {
    let result = RUNTIME.get_or_init(|| {
        let start = Instant::now();
        let config = LambdaConfig::from_env()?;
        let runtime = LambdaRuntime::from_config(&config)?;

        info!(
            backend = runtime.store().backend(),
            table = runtime.store().table_name(),
            read_only = config.read_only,
            auth = config.api_key.is_some(),
            init_ms = start.elapsed().as_millis() as u64,
            "Lambda runtime initialization complete"
        );
        Ok(runtime)
    });

    result.as_ref().map_err(|e| {
        error!(error = %e, "Lambda runtime initialization failed");
        e.clone()
    })
}
