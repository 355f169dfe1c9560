//! PostgreSQL document store.
//!
//! The tree is flattened into the `documents` table with one row per leaf,
//! keyed by its full path. A subtree is every row whose path equals the
//! requested path or starts with it followed by `/`.
//!
//! Batches run in a single transaction. Create-only paths take a
//! transaction-scoped advisory lock before their existence check, so two
//! concurrent batches claiming the same path serialize and the second one
//! sees a conflict.

use async_trait::async_trait;
use domain::paths;
use domain::store::{tree, DocumentStore, StoreError, WriteBatch, WriteOp};
use serde_json::{Map, Value};
use sqlx::{Executor, PgPool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::metrics::{record_batch, StoreOp, StoreTimer};

/// Document store backed by a PostgreSQL table.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Creates a new PgDocumentStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let mut guarded: Vec<String> = batch
            .writes()
            .iter()
            .filter(|w| matches!(w.op, WriteOp::CreateOnly(_)))
            .map(|w| w.path.clone())
            .collect();
        // Fixed lock order across batches
        guarded.sort_unstable();

        for path in &guarded {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(path)
                .execute(&mut *tx)
                .await
                .map_err(backend)?;
        }
        for path in guarded {
            if subtree_exists(&mut *tx, &path).await? {
                return Err(StoreError::Conflict { path });
            }
        }

        let write_count = batch.len();
        for write in batch.into_writes() {
            sqlx::query("DELETE FROM documents WHERE path = $1 OR starts_with(path, $2)")
                .bind(&write.path)
                .bind(subtree_prefix(&write.path))
                .execute(&mut *tx)
                .await
                .map_err(backend)?;

            let value = match write.op {
                WriteOp::Set(value) | WriteOp::CreateOnly(value) => value,
                WriteOp::Delete => continue,
            };

            // Leaves above the new value turn into interior nodes.
            let ancestors: Vec<String> = paths::ancestors(&write.path)
                .into_iter()
                .map(str::to_string)
                .collect();
            if !ancestors.is_empty() {
                sqlx::query("DELETE FROM documents WHERE path = ANY($1)")
                    .bind(ancestors)
                    .execute(&mut *tx)
                    .await
                    .map_err(backend)?;
            }

            let mut leaves = Vec::new();
            flatten(&write.path, value, &mut leaves)?;
            for (path, value) in leaves {
                sqlx::query(
                    r#"
                    INSERT INTO documents (path, value)
                    VALUES ($1, $2)
                    ON CONFLICT (path) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
                    "#,
                )
                .bind(path)
                .bind(value)
                .execute(&mut *tx)
                .await
                .map_err(backend)?;
            }
        }

        tx.commit().await.map_err(backend)?;
        debug!(writes = write_count, "Committed document batch");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn generate_id(&self) -> Result<String, StoreError> {
        Ok(Uuid::new_v4().to_string())
    }

    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        ensure_valid(path)?;
        let timer = StoreTimer::start(StoreOp::Exists);
        timer.finish(subtree_exists(&self.pool, path).await)
    }

    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        ensure_valid(path)?;
        let timer = StoreTimer::start(StoreOp::Get);
        let rows = sqlx::query_as::<_, (String, Value)>(
            r#"
            SELECT path, value
            FROM documents
            WHERE path = $1 OR starts_with(path, $2)
            "#,
        )
        .bind(path)
        .bind(subtree_prefix(path))
        .fetch_all(&self.pool)
        .await
        .map_err(backend);
        Ok(assemble(path, timer.finish(rows)?))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        batch.validate()?;
        if batch.is_empty() {
            return Ok(());
        }
        let create_only = batch
            .writes()
            .iter()
            .filter(|w| matches!(w.op, WriteOp::CreateOnly(_)))
            .count();
        record_batch(batch.len(), create_only);

        let timer = StoreTimer::start(StoreOp::Commit);
        timer.finish(self.apply(batch).await)
    }
}

async fn subtree_exists<'e, E>(executor: E, path: &str) -> Result<bool, StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM documents WHERE path = $1 OR starts_with(path, $2))",
    )
    .bind(path)
    .bind(subtree_prefix(path))
    .fetch_one(executor)
    .await
    .map_err(backend)
}

fn ensure_valid(path: &str) -> Result<(), StoreError> {
    if paths::is_valid_path(path) {
        Ok(())
    } else {
        Err(StoreError::InvalidPath(path.to_string()))
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn subtree_prefix(path: &str) -> String {
    format!("{}/", path)
}

/// Splits `value` into leaf rows at and below `path`. Nulls produce nothing.
fn flatten(path: &str, value: Value, out: &mut Vec<(String, Value)>) -> Result<(), StoreError> {
    match value {
        Value::Null => Ok(()),
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let child_path = format!("{}/{}", path, key);
                if !paths::is_valid_segment(&key) {
                    return Err(StoreError::InvalidPath(child_path));
                }
                flatten(&child_path, child, out)?;
            }
            Ok(())
        }
        leaf => {
            out.push((path.to_string(), leaf));
            Ok(())
        }
    }
}

/// Rebuilds the value at `path` from the leaf rows of its subtree.
fn assemble(path: &str, rows: Vec<(String, Value)>) -> Option<Value> {
    let prefix = subtree_prefix(path);
    let mut root: Option<Value> = None;
    for (row_path, value) in rows {
        if row_path == path {
            return Some(value);
        }
        if let Some(relative) = row_path.strip_prefix(&prefix) {
            tree::set_at(
                root.get_or_insert_with(|| Value::Object(Map::new())),
                relative,
                value,
            );
        }
    }
    root
}
