//! # Blob storage: avatar images and other uploaded files
//!
//! [`BlobStore`] mirrors a bucket/path object API: upload (optionally
//! overwriting), derive the public URL of an object, and remove objects in bulk.
//! [`MemoryBlobStore`] keeps objects in a shared map and serves as the test
//! double.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;

/// Async access to bucketed object storage.
pub trait BlobStore {
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> impl std::future::Future<Output = Result<(), StoreError>>;
    fn public_url(&self, bucket: &str, path: &str) -> String;
    fn remove(
        &self,
        bucket: &str,
        paths: Vec<String>,
    ) -> impl std::future::Future<Output = Result<(), StoreError>>;
}

/// A stored object.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory BlobStore keyed by `(bucket, path)`.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<BTreeMap<(String, String), StoredBlob>>>,
    fail_uploads: Arc<Mutex<bool>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryBlobStore {
    pub const BASE_URL: &'static str = "memory://storage";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: &str, path: &str) -> Option<StoredBlob> {
        lock(&self.objects)
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    /// Paths stored in a bucket, sorted.
    pub fn paths(&self, bucket: &str) -> Vec<String> {
        lock(&self.objects)
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Make every following upload fail until reset.
    pub fn set_fail_uploads(&self, fail: bool) {
        *lock(&self.fail_uploads) = fail;
    }
}

impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StoreError> {
        if *lock(&self.fail_uploads) {
            return Err(StoreError::Rejected {
                status: 500,
                message: "upload failed".to_string(),
            });
        }
        let mut objects = lock(&self.objects);
        let key = (bucket.to_string(), path.to_string());
        if !upsert && objects.contains_key(&key) {
            return Err(StoreError::Rejected {
                status: 409,
                message: format!("{bucket}/{path} already exists"),
            });
        }
        objects.insert(
            key,
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{bucket}/{path}", Self::BASE_URL)
    }

    async fn remove(&self, bucket: &str, paths: Vec<String>) -> Result<(), StoreError> {
        let mut objects = lock(&self.objects);
        for path in paths {
            objects.remove(&(bucket.to_string(), path));
        }
        Ok(())
    }
}
