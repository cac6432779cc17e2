use std::sync::Arc;

use crate::{domain::value_objects::BucketName, ports::storage::ObjectStore};

/// Handle to one bucket reached with already-resolved credentials.
///
/// Created by the caller and passed by reference into every service call;
/// services themselves keep no connection state.
#[derive(Clone)]
pub struct StorageSession {
    bucket: BucketName,
    store: Arc<dyn ObjectStore>,
}

impl StorageSession {
    pub fn new(bucket: BucketName, store: Arc<dyn ObjectStore>) -> Self {
        Self { bucket, store }
    }

    pub fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

impl std::fmt::Debug for StorageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSession")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}
