//! The shared store handle.
//!
//! [`Store`] wraps a [`KvStore`] backend with JSON helpers and the single
//! writer lock that serializes every index mutation in this process.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use crate::kv::{
    CloudflareConfig, CloudflareKvStore, KvError, KvStore, MemoryKvStore, PgKvStore,
};

/// Proof that the caller holds the writer lock.
pub type WriteGuard<'a> = MutexGuard<'a, ()>;

/// Which backend to bind, read from `STORE_BACKEND`.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Memory,
    Postgres { database_url: String },
    Cloudflare(CloudflareConfig),
}

impl StoreConfig {
    /// Load the store binding from the environment.
    ///
    /// | Env Var         | Values                                  |
    /// |-----------------|-----------------------------------------|
    /// | `STORE_BACKEND` | `memory`, `postgres`, `cloudflare`, unset |
    ///
    /// Unset (or `none`) leaves the store unbound and every data route
    /// answers 503.
    ///
    /// # Panics
    ///
    /// Panics on an unknown backend name or when the chosen backend's
    /// required variables are missing.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("STORE_BACKEND").ok()?;
        match backend.trim().to_ascii_lowercase().as_str() {
            "" | "none" => None,
            "memory" => Some(Self::Memory),
            "postgres" => Some(Self::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .expect("DATABASE_URL must be set for the postgres store"),
            }),
            "cloudflare" => Some(Self::Cloudflare(CloudflareConfig::from_env())),
            other => panic!("Unknown STORE_BACKEND '{other}'. Must be one of: memory, postgres, cloudflare"),
        }
    }
}

/// Open the configured backend.
pub async fn connect(config: &StoreConfig) -> Result<Store, KvError> {
    let kv: Arc<dyn KvStore> = match config {
        StoreConfig::Memory => Arc::new(MemoryKvStore::new()),
        StoreConfig::Postgres { database_url } => Arc::new(PgKvStore::connect(database_url).await?),
        StoreConfig::Cloudflare(cf) => Arc::new(CloudflareKvStore::new(cf)?),
    };
    tracing::info!(backend = kv.backend(), "Store connected");
    Ok(Store::new(kv))
}

/// Cheaply cloneable store handle shared by all handlers.
#[derive(Clone)]
pub struct Store {
    kv: Arc<dyn KvStore>,
    writer: Arc<Mutex<()>>,
}

impl Store {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// A fresh in-memory store.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()))
    }

    pub fn backend(&self) -> &'static str {
        self.kv.backend()
    }

    /// Acquire the writer lock. Held for the whole of a multi-key mutation.
    pub async fn lock_writes(&self) -> WriteGuard<'_> {
        self.writer.lock().await
    }

    /// Read and decode a JSON value. Missing keys are `Ok(None)`; read
    /// failures and undecodable values are errors.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KvError> {
        match self.kv.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| KvError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    pub async fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), KvError> {
        let raw = serde_json::to_string(value)?;
        self.kv.put(key, &raw).await
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, KvError> {
        self.kv.get(key).await
    }

    pub async fn put_raw(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.kv.put(key, value).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), KvError> {
        self.kv.delete(key).await
    }

    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        self.kv.list_keys(prefix).await
    }

    pub async fn health_check(&self) -> Result<(), KvError> {
        self.kv.health_check().await
    }
}
