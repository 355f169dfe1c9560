//! Document store abstraction.
//!
//! The store is a hierarchical key-value tree addressed by slash-separated
//! paths (see [`crate::paths`]). Backends implement [`DocumentStore`] so the
//! services don't depend on a particular database engine.
//!
//! All writes go through [`DocumentStore::commit`], which applies a
//! [`WriteBatch`] atomically: either every write becomes visible or none does.

pub mod memory;
pub mod tree;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::paths;

pub use memory::MemoryStore;

/// Uniform error type for all store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A create-only write found something already stored at its path.
    #[error("path already exists: {path}")]
    Conflict { path: String },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

/// What a single write does at its path.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Replace whatever is stored at the path.
    Set(Value),
    /// Store the value only if nothing exists at the path yet.
    CreateOnly(Value),
    /// Remove the path and everything below it.
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    pub path: String,
    pub op: WriteOp,
}

/// A multi-path update applied as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(&mut self, path: String, value: &T) -> Result<&mut Self, StoreError> {
        let value = serde_json::to_value(value)?;
        self.writes.push(Write {
            path,
            op: WriteOp::Set(value),
        });
        Ok(self)
    }

    pub fn create_only<T: Serialize>(
        &mut self,
        path: String,
        value: &T,
    ) -> Result<&mut Self, StoreError> {
        let value = serde_json::to_value(value)?;
        self.writes.push(Write {
            path,
            op: WriteOp::CreateOnly(value),
        });
        Ok(self)
    }

    pub fn delete(&mut self, path: String) -> &mut Self {
        self.writes.push(Write {
            path,
            op: WriteOp::Delete,
        });
        self
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Checks every path and rejects batches where one path contains another.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (i, write) in self.writes.iter().enumerate() {
            if !paths::is_valid_path(&write.path) {
                return Err(StoreError::InvalidPath(write.path.clone()));
            }
            for other in &self.writes[i + 1..] {
                if paths::is_same_or_ancestor(&write.path, &other.path)
                    || paths::is_same_or_ancestor(&other.path, &write.path)
                {
                    return Err(StoreError::InvalidPath(format!(
                        "overlapping paths in one update: {} and {}",
                        write.path, other.path
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Hierarchical document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns a fresh identifier for a new record.
    async fn generate_id(&self) -> Result<String, StoreError>;

    /// Whether anything is stored at `path` or below it.
    async fn exists(&self, path: &str) -> Result<bool, StoreError>;

    /// Reads the subtree rooted at `path`.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Applies every write in `batch` atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

/// Reads and deserializes the record at `path`.
pub async fn read<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(path).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_builders() {
        let mut batch = WriteBatch::new();
        batch
            .set("groups/g1".to_string(), &json!({ "name": "Trip" }))
            .unwrap()
            .create_only("groupCodes/ABCDEF".to_string(), &json!({ "groupId": "g1" }))
            .unwrap()
            .delete("groupMembers/g0/U1".to_string());

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.writes()[2].op, WriteOp::Delete);
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let mut batch = WriteBatch::new();
        batch
            .set("groups/g1".to_string(), &json!({}))
            .unwrap()
            .set("groups/g1/code".to_string(), &json!("ABCDEF"))
            .unwrap();

        assert!(matches!(batch.validate(), Err(StoreError::InvalidPath(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_path() {
        let mut batch = WriteBatch::new();
        batch.delete("users/U1/currentGroupId".to_string());
        batch.delete("users/U1/currentGroupId".to_string());

        assert!(batch.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_path() {
        let mut batch = WriteBatch::new();
        batch.delete("groups/a.b".to_string());
        assert!(matches!(batch.validate(), Err(StoreError::InvalidPath(_))));
    }

    #[test]
    fn test_siblings_with_shared_prefix_do_not_overlap() {
        let mut batch = WriteBatch::new();
        batch.delete("groups/g1".to_string());
        batch.delete("groups/g10".to_string());
        assert!(batch.validate().is_ok());
    }
}
