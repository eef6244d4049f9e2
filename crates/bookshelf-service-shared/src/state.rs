//! Application state for the HTTP service.
//!
//! Holds the injected store handle, the configured function key and the
//! mounted route table. The store is the only state that outlives a request.

use std::sync::Arc;

use bookshelf_lib::{ApiKey, BookStore, Error as LibError, MemoryStore, RouteTable, TableStore};

use crate::config::{ServiceConfig, StoreBackend};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to open the backing store.
    StoreOpen(LibError),

    /// Failed to provision the backing table.
    Provision(LibError),

    /// Failed to load the seed file for the memory store.
    Seed(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreOpen(e) => write!(f, "failed to open book store: {}", e),
            Self::Provision(e) => write!(f, "failed to provision book table: {}", e),
            Self::Seed(e) => write!(f, "failed to seed book store: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StoreOpen(e) | Self::Provision(e) | Self::Seed(e) => Some(e),
        }
    }
}

/// Shared application state for all axum handlers.
///
/// Cheaply cloneable; share it via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn BookStore>,
    api_key: Option<ApiKey>,
    routes: RouteTable,
}

impl AppState {
    /// Open the configured store and provision its table.
    pub fn load(config: &ServiceConfig) -> Result<Self, AppStateError> {
        let store: Arc<dyn BookStore> = match config.store {
            StoreBackend::Table => {
                tracing::info!(
                    path = %config.db_path.display(),
                    table = %config.table_name,
                    "opening table store"
                );
                Arc::new(
                    TableStore::open(&config.db_path, &config.table_name)
                        .map_err(AppStateError::StoreOpen)?,
                )
            }
            StoreBackend::Memory => match &config.seed_path {
                Some(path) => {
                    tracing::info!(path = %path.display(), "seeding memory store");
                    Arc::new(MemoryStore::from_seed_file(path).map_err(AppStateError::Seed)?)
                }
                None => {
                    tracing::info!("using empty memory store");
                    Arc::new(MemoryStore::new())
                }
            },
        };

        store
            .ensure_table_exists()
            .map_err(AppStateError::Provision)?;

        Ok(Self::from_store(store)
            .with_api_key(config.api_key.clone())
            .with_read_only(config.read_only))
    }

    /// Wrap an already-provisioned store, with every route mounted and no
    /// function key.
    pub fn from_store(store: Arc<dyn BookStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                api_key: None,
                routes: RouteTable::full(),
            }),
        }
    }

    pub fn with_api_key(self, api_key: Option<ApiKey>) -> Self {
        self.rebuild(|inner| inner.api_key = api_key)
    }

    pub fn with_read_only(self, read_only: bool) -> Self {
        self.rebuild(|inner| inner.routes = RouteTable::new(read_only))
    }

    fn rebuild(self, edit: impl FnOnce(&mut AppStateInner)) -> Self {
        let mut inner = AppStateInner {
            store: Arc::clone(&self.inner.store),
            api_key: self.inner.api_key.clone(),
            routes: self.inner.routes.clone(),
        };
        edit(&mut inner);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Access the book store.
    pub fn store(&self) -> &dyn BookStore {
        self.inner.store.as_ref()
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.inner.api_key.as_ref()
    }

    /// Operations mounted by this deployment.
    pub fn routes(&self) -> &RouteTable {
        &self.inner.routes
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.inner.store.backend())
            .field("table", &self.inner.store.table_name())
            .field("auth_enabled", &self.inner.api_key.is_some())
            .field("operations", &self.inner.routes.operations().len())
            .finish()
    }
}
