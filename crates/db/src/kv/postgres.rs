use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{KvError, KvStore};

/// Store backed by the `kv_entries` table.
#[derive(Debug, Clone)]
pub struct PgKvStore {
    pool: PgPool,
}

impl PgKvStore {
    /// Connect, run migrations, and wrap the pool.
    pub async fn connect(database_url: &str) -> Result<Self, KvError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), KvError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| KvError::Backend(format!("migration failed: {e}")))
}

#[async_trait]
impl KvStore for PgKvStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), KvError> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        // `left()` avoids escaping LIKE wildcards in the prefix.
        let keys = sqlx::query_scalar::<_, String>(
            "SELECT key FROM kv_entries WHERE left(key, length($1)) = $1 ORDER BY key",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }

    async fn health_check(&self) -> Result<(), KvError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
