//! Object storage access
//!
//! Thin wrapper over [`ObjectStore`] exposing exactly the capabilities the
//! pipeline needs: list every object path, fetch one object's bytes, and
//! build the public URL for an object. Production runs open a Google Cloud
//! Storage bucket; tests inject an in-memory store.

use crate::config::BucketSettings;
use crate::error::{StorageError, StorageResult};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::debug;

/// Handle to the source bucket
#[derive(Clone)]
pub struct BucketSource {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    public_url_base: String,
}

impl BucketSource {
    /// Open a Google Cloud Storage bucket from settings
    pub fn open(settings: &BucketSettings) -> StorageResult<Self> {
        let mut builder = GoogleCloudStorageBuilder::new().with_bucket_name(&settings.name);

        if let Some(cred_path) = &settings.credential_path {
            let path_str = cred_path.to_str().ok_or_else(|| StorageError::InvalidCredentials {
                path: cred_path.display().to_string(),
                cause: "path is not valid UTF-8".to_string(),
            })?;
            builder = builder.with_service_account_path(path_str);
        }

        let store = builder.build().map_err(|e| StorageError::BucketUnavailable {
            bucket: settings.name.clone(),
            cause: e.to_string(),
        })?;

        Ok(Self::with_store(Arc::new(store), settings))
    }

    /// Wrap an already-built object store (used by tests with an in-memory
    /// backend)
    pub fn with_store(store: Arc<dyn ObjectStore>, settings: &BucketSettings) -> Self {
        Self {
            store,
            bucket: settings.name.clone(),
            public_url_base: settings.public_url_base.clone(),
        }
    }

    /// List every object path in the bucket, in the order the backend
    /// enumerates them. The order is never re-sorted.
    pub async fn list_all(&self) -> StorageResult<Vec<String>> {
        let mut stream = self.store.list(None);
        let mut paths = Vec::new();

        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| StorageError::ListFailed { cause: e.to_string() })?
        {
            paths.push(meta.location.to_string());
        }

        debug!("Listed {} objects in bucket {}", paths.len(), self.bucket);
        Ok(paths)
    }

    /// Fetch one object fully into memory
    pub async fn fetch(&self, path: &str) -> StorageResult<Bytes> {
        let object_path = ObjectPath::from(path);
        let result = self
            .store
            .get(&object_path)
            .await
            .map_err(|e| StorageError::FetchFailed {
                path: path.to_string(),
                cause: e.to_string(),
            })?;

        result.bytes().await.map_err(|e| StorageError::FetchFailed {
            path: path.to_string(),
            cause: e.to_string(),
        })
    }

    /// Public URL for an object in this bucket
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_url_base.trim_end_matches('/'),
            self.bucket,
            path
        )
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn test_source() -> BucketSource {
        let settings = BucketSettings::new("test-bucket");
        BucketSource::with_store(Arc::new(InMemory::new()), &settings)
    }

    #[tokio::test]
    async fn test_list_and_fetch_roundtrip() {
        let source = test_source();
        let path = ObjectPath::from("data/salesdb/public/orders/part1.csv");
        source
            .store
            .put(&path, Bytes::from_static(b"id,amount\n1,9.5\n"))
            .await
            .unwrap();

        let paths = source.list_all().await.unwrap();
        assert_eq!(paths, vec!["data/salesdb/public/orders/part1.csv"]);

        let bytes = source.fetch(&paths[0]).await.unwrap();
        assert_eq!(&bytes[..], b"id,amount\n1,9.5\n");
    }

    #[tokio::test]
    async fn test_fetch_missing_object_is_error() {
        let source = test_source();
        let err = source.fetch("data/nothing/here/at/all.csv").await.unwrap_err();
        assert!(matches!(err, StorageError::FetchFailed { .. }));
    }

    #[test]
    fn test_public_url_shape() {
        let source = test_source();
        assert_eq!(
            source.public_url("data/mediadb/assets/photos/cat.png"),
            "https://storage.googleapis.com/test-bucket/data/mediadb/assets/photos/cat.png"
        );
    }
}
