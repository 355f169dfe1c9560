//! In-memory document store.
//!
//! This implementation is suitable for:
//! - Development and testing
//! - Single-process deployments that don't need durability
//!
//! Commits are serialized behind one write lock, which makes every batch
//! atomic and create-only checks race-free.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{tree, DocumentStore, StoreError, WriteBatch, WriteOp};

#[derive(Debug, Clone)]
pub struct MemoryStore {
    root: Arc<RwLock<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(Value::Object(Map::new()))),
        }
    }

    /// Returns a copy of the whole tree.
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn generate_id(&self) -> Result<String, StoreError> {
        Ok(Uuid::new_v4().to_string())
    }

    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        Ok(self.get(path).await?.is_some())
    }

    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        if !crate::paths::is_valid_path(path) {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        let root = self.root.read().await;
        Ok(tree::get_at(&root, path).cloned())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        batch.validate()?;

        let mut root = self.root.write().await;

        // Check every precondition before touching anything.
        for write in batch.writes() {
            if matches!(write.op, WriteOp::CreateOnly(_))
                && tree::get_at(&root, &write.path).is_some()
            {
                return Err(StoreError::Conflict {
                    path: write.path.clone(),
                });
            }
        }

        for write in batch.into_writes() {
            match write.op {
                WriteOp::Set(value) | WriteOp::CreateOnly(value) => {
                    tree::set_at(&mut root, &write.path, value)
                }
                WriteOp::Delete => {
                    tree::remove_at(&mut root, &write.path);
                }
            }
        }

        Ok(())
    }
}
