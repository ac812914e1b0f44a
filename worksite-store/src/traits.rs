// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A document-oriented persistence collaborator.
///
/// Documents live in named collections and are addressed by a string id
/// generated by the store on insertion. The store treats documents as opaque
/// serializable values; it performs no validation of their contents.
pub trait DocumentStore {
    type Error: Error + Send + Sync + 'static;

    /// Load a document by id.
    ///
    /// Returns `None` when no document exists under this id.
    fn get<T>(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<T>, Self::Error>>
    where
        T: DeserializeOwned;

    /// Load every document in a collection.
    ///
    /// No ordering is guaranteed; callers sort and filter the result
    /// themselves.
    fn list<T>(&self, collection: &str) -> impl Future<Output = Result<Vec<T>, Self::Error>>
    where
        T: DeserializeOwned;

    /// Insert a document, returning the store-generated id.
    fn insert<T>(
        &mut self,
        collection: &str,
        document: &T,
    ) -> impl Future<Output = Result<String, Self::Error>>
    where
        T: Serialize + Sync;

    /// Shallow-merge top-level fields into an existing document.
    ///
    /// Keys present in `fields` replace the stored keys wholesale; keys
    /// absent from `fields` are left untouched. Merging into an absent
    /// document is an error.
    fn merge(
        &mut self,
        collection: &str,
        id: &str,
        fields: serde_json::Value,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Delete a document.
    ///
    /// Returns `false` when no document existed under this id.
    fn delete(
        &mut self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<bool, Self::Error>>;

    /// The store's clock.
    ///
    /// Creation and update stamps are taken from here so that "now" is
    /// assigned by the collaborator, not by callers with skewed clocks.
    fn server_time(&self) -> impl Future<Output = Result<DateTime<Utc>, Self::Error>>;
}

/// A blob-store collaborator.
///
/// Blobs are write-once: a path is uploaded exactly once and the returned
/// reference URL stays valid until the blob is deleted.
pub trait BlobStore {
    type Error: Error + Send + Sync + 'static;

    /// Upload bytes under `path`, returning a public reference URL.
    fn upload(
        &mut self,
        path: &str,
        bytes: &[u8],
    ) -> impl Future<Output = Result<String, Self::Error>>;

    /// Ensure no blob exists behind `url`.
    ///
    /// Deleting an already-absent blob is success, not an error.
    fn delete(&mut self, url: &str) -> impl Future<Output = Result<(), Self::Error>>;
}
