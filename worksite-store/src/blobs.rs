// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory blob persistence.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::BlobStore;

/// An in-memory [`BlobStore`].
///
/// Reference URLs use the `memory://` scheme followed by the upload path.
/// Like [`MemoryStore`](crate::MemoryStore), cloning yields another handle
/// onto the same state.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore {
    inner: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// Create a new in-memory blob store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `true` if a blob exists behind `url`.
    pub fn contains(&self, url: &str) -> bool {
        self.read_store().contains_key(url)
    }

    /// Number of blobs currently held.
    pub fn len(&self) -> usize {
        self.read_store().len()
    }

    /// Return `true` if no blobs are held.
    pub fn is_empty(&self) -> bool {
        self.read_store().is_empty()
    }

    fn read_store(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<u8>>> {
        self.inner
            .read()
            .expect("acquire shared read access on store")
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<u8>>> {
        self.inner
            .write()
            .expect("acquire exclusive write access on store")
    }
}

impl BlobStore for MemoryBlobStore {
    type Error = Infallible;

    async fn upload(&mut self, path: &str, bytes: &[u8]) -> Result<String, Self::Error> {
        let url = format!("memory://{path}");
        self.write_store().insert(url.clone(), bytes.to_vec());
        Ok(url)
    }

    async fn delete(&mut self, url: &str) -> Result<(), Self::Error> {
        self.write_store().remove(url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::BlobStore;

    use super::MemoryBlobStore;

    #[tokio::test]
    async fn upload_returns_scoped_url() {
        let mut blobs = MemoryBlobStore::new();

        let url = blobs
            .upload("projects/p1/attachments/a1/plan.pdf", b"pdf bytes")
            .await
            .expect("no errors");

        assert_eq!(url, "memory://projects/p1/attachments/a1/plan.pdf");
        assert!(blobs.contains(&url));
        assert_eq!(blobs.len(), 1);
    }

    #[tokio::test]
    async fn delete_is_ensure_absent() {
        let mut blobs = MemoryBlobStore::new();
        let url = blobs.upload("some/path", b"bytes").await.expect("no errors");

        blobs.delete(&url).await.expect("no errors");
        assert!(!blobs.contains(&url));

        // Deleting again is success, not an error.
        blobs.delete(&url).await.expect("no errors");
        assert!(blobs.is_empty());
    }
}
