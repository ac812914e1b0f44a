// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document persistence.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::DocumentStore;

type Collection = HashMap<String, Value>;

#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error("no document {id:?} in collection {collection:?}")]
    DocumentNotFound { collection: String, id: String },

    #[error("merge fields must be a JSON object")]
    InvalidMergeFields,

    #[error("stored document {id:?} in collection {collection:?} is not a JSON object")]
    InvalidDocument { collection: String, id: String },

    #[error(transparent)]
    Codec(#[from] serde_json::Error),
}

/// Documents held by a [`MemoryStore`], keyed by collection name and then by
/// document id.
#[derive(Debug, Default)]
pub struct InnerMemoryStore {
    collections: HashMap<String, Collection>,
    pinned_clock: Option<DateTime<Utc>>,
}

/// An in-memory [`DocumentStore`].
///
/// `MemoryStore` supports usage in asynchronous and multi-threaded contexts
/// by wrapping an `InnerMemoryStore` with an `RwLock` and `Arc`. Convenience
/// methods are provided to obtain a read- or write-lock on the underlying
/// store. Cloning yields another handle onto the same state.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<InnerMemoryStore>>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a read-lock on the store.
    pub fn read_store(&self) -> RwLockReadGuard<'_, InnerMemoryStore> {
        self.inner
            .read()
            .expect("acquire shared read access on store")
    }

    /// Obtain a write-lock on the store.
    pub fn write_store(&self) -> RwLockWriteGuard<'_, InnerMemoryStore> {
        self.inner
            .write()
            .expect("acquire exclusive write access on store")
    }
}

#[cfg(any(test, feature = "test_utils"))]
impl MemoryStore {
    /// Pin the store clock to a fixed instant. Until unpinned or advanced,
    /// every [`DocumentStore::server_time`] call returns this instant.
    pub fn set_clock(&self, now: DateTime<Utc>) {
        self.write_store().pinned_clock = Some(now);
    }

    /// Advance a pinned clock. Panics if the clock was never pinned.
    pub fn advance_clock(&self, by: chrono::Duration) {
        let mut store = self.write_store();
        let pinned = store.pinned_clock.expect("clock has been pinned");
        store.pinned_clock = Some(pinned + by);
    }
}

impl DocumentStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn get<T>(&self, collection: &str, id: &str) -> Result<Option<T>, Self::Error>
    where
        T: DeserializeOwned,
    {
        let store = self.read_store();
        match store.collections.get(collection).and_then(|c| c.get(id)) {
            Some(document) => Ok(Some(serde_json::from_value(document.clone())?)),
            None => Ok(None),
        }
    }

    async fn list<T>(&self, collection: &str) -> Result<Vec<T>, Self::Error>
    where
        T: DeserializeOwned,
    {
        let store = self.read_store();
        let Some(collection) = store.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut result = Vec::with_capacity(collection.len());
        for document in collection.values() {
            result.push(serde_json::from_value(document.clone())?);
        }

        Ok(result)
    }

    async fn insert<T>(&mut self, collection: &str, document: &T) -> Result<String, Self::Error>
    where
        T: Serialize + Sync,
    {
        let id = Uuid::new_v4().to_string();
        let document = serde_json::to_value(document)?;

        self.write_store()
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), document);

        Ok(id)
    }

    async fn merge(
        &mut self,
        collection: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), Self::Error> {
        let Value::Object(fields) = fields else {
            return Err(MemoryStoreError::InvalidMergeFields);
        };

        let mut store = self.write_store();
        let Some(document) = store
            .collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
        else {
            return Err(MemoryStoreError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        };

        let Value::Object(document) = document else {
            return Err(MemoryStoreError::InvalidDocument {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        };

        for (key, value) in fields {
            document.insert(key, value);
        }

        Ok(())
    }

    async fn delete(&mut self, collection: &str, id: &str) -> Result<bool, Self::Error> {
        let mut store = self.write_store();
        let removed = store
            .collections
            .get_mut(collection)
            .and_then(|c| c.remove(id));

        Ok(removed.is_some())
    }

    async fn server_time(&self) -> Result<DateTime<Utc>, Self::Error> {
        match self.read_store().pinned_clock {
            Some(pinned) => Ok(pinned),
            None => Ok(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use crate::DocumentStore;

    use super::{MemoryStore, MemoryStoreError};

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn insert_get_round_trip() {
        let mut store = MemoryStore::new();
        let doc = Doc {
            name: "first".to_string(),
            count: 1,
        };

        let id = store.insert("docs", &doc).await.expect("no errors");

        let loaded: Doc = store
            .get("docs", &id)
            .await
            .expect("no errors")
            .expect("document exists");
        assert_eq!(loaded, doc);

        let missing: Option<Doc> = store.get("docs", "nope").await.expect("no errors");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_returns_every_document() {
        let mut store = MemoryStore::new();
        for count in 0..3 {
            let doc = Doc {
                name: format!("doc-{count}"),
                count,
            };
            store.insert("docs", &doc).await.expect("no errors");
        }

        let all: Vec<Doc> = store.list("docs").await.expect("no errors");
        assert_eq!(all.len(), 3);

        let empty: Vec<Doc> = store.list("other").await.expect("no errors");
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn merge_replaces_only_named_fields() {
        let mut store = MemoryStore::new();
        let doc = Doc {
            name: "before".to_string(),
            count: 7,
        };
        let id = store.insert("docs", &doc).await.expect("no errors");

        store
            .merge("docs", &id, json!({ "name": "after" }))
            .await
            .expect("no errors");

        let loaded: Doc = store
            .get("docs", &id)
            .await
            .expect("no errors")
            .expect("document exists");
        assert_eq!(loaded.name, "after");
        assert_eq!(loaded.count, 7);
    }

    #[tokio::test]
    async fn merge_into_absent_document_errors() {
        let mut store = MemoryStore::new();
        let result = store.merge("docs", "nope", json!({ "name": "x" })).await;
        assert!(matches!(
            result,
            Err(MemoryStoreError::DocumentNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn merge_rejects_non_object_fields() {
        let mut store = MemoryStore::new();
        let doc = Doc {
            name: "doc".to_string(),
            count: 0,
        };
        let id = store.insert("docs", &doc).await.expect("no errors");

        let result = store.merge("docs", &id, json!(42)).await;
        assert!(matches!(result, Err(MemoryStoreError::InvalidMergeFields)));
    }

    #[tokio::test]
    async fn delete_reports_absence() {
        let mut store = MemoryStore::new();
        let doc = Doc {
            name: "doc".to_string(),
            count: 0,
        };
        let id = store.insert("docs", &doc).await.expect("no errors");

        assert!(store.delete("docs", &id).await.expect("no errors"));
        assert!(!store.delete("docs", &id).await.expect("no errors"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mut store = MemoryStore::new();
        let handle = store.clone();

        let doc = Doc {
            name: "shared".to_string(),
            count: 0,
        };
        let id = store.insert("docs", &doc).await.expect("no errors");

        let loaded: Option<Doc> = handle.get("docs", &id).await.expect("no errors");
        assert!(loaded.is_some());
    }

    #[tokio::test]
    async fn pinned_clock_is_returned_verbatim() {
        let store = MemoryStore::new();
        let pinned = "2026-01-02T03:04:05Z"
            .parse::<chrono::DateTime<chrono::Utc>>()
            .expect("valid timestamp");

        store.set_clock(pinned);
        assert_eq!(store.server_time().await.expect("no errors"), pinned);

        store.advance_clock(chrono::Duration::seconds(90));
        assert_eq!(
            store.server_time().await.expect("no errors"),
            pinned + chrono::Duration::seconds(90)
        );
    }
}
