//! Key-value store abstraction.
//!
//! The store is a flat namespace of string keys holding string (JSON)
//! values. Every call is an independent request: there are no transactions
//! and no multi-key atomicity. Backends:
//!
//! - [`memory::MemoryKvStore`] -- process-local map for development and tests.
//! - [`postgres::PgKvStore`] -- a single `kv_entries` table.
//! - [`cloudflare::CloudflareKvStore`] -- Workers KV over its REST API.

pub mod cloudflare;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

pub use cloudflare::{CloudflareConfig, CloudflareKvStore};
pub use memory::MemoryKvStore;
pub use postgres::PgKvStore;

/// Errors that can occur during KV operations.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("KV API returned HTTP {status} for key {key}")]
    HttpStatus { status: u16, key: String },

    #[error("Corrupt value at {key}: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Backend(String),
}

/// Operations every store backend provides.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    /// Read a value. A missing key is `Ok(None)`, never an error.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Write a value, replacing whatever was there.
    async fn put(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Remove a key. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), KvError>;

    /// All keys starting with `prefix`, sorted.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, KvError>;

    /// Cheap round trip used by the health endpoint.
    async fn health_check(&self) -> Result<(), KvError> {
        self.get("__health").await.map(|_| ())
    }
}
