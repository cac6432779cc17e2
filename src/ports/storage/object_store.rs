use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::{
    errors::EngineResult,
    models::{LinkMethod, ObjectDescriptor},
    value_objects::{ObjectKey, Prefix},
};

/// Chunked object body
pub type ByteStream = BoxStream<'static, EngineResult<Bytes>>;

/// One delimited list request against the provider.
///
/// Keys below the next `/` after `prefix` come back grouped as common prefixes.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPageRequest {
    pub prefix: Prefix,
    pub continuation_token: Option<String>,
    pub max_keys: usize,
}

/// A bounded page of listing results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub objects: Vec<ObjectDescriptor>,
    /// Sub-prefixes, each ending in `/`
    pub common_prefixes: Vec<String>,
    /// Present while the provider has more pages for this request
    pub next_token: Option<String>,
}

/// Port for the storage provider client.
///
/// Every method is one provider round trip. Implementations are bound to a
/// single bucket with already-resolved credentials.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Fetch one page of keys and common prefixes
    async fn list_page(&self, request: &ListPageRequest) -> EngineResult<ListPage>;

    /// Server-side copy within the bucket; overwrites the destination
    async fn copy_object(&self, source: &ObjectKey, destination: &ObjectKey) -> EngineResult<()>;

    /// Delete object data
    async fn delete_object(&self, key: &ObjectKey) -> EngineResult<()>;

    /// Get object metadata without retrieving data
    async fn head_object(&self, key: &ObjectKey) -> EngineResult<ObjectDescriptor>;

    /// Stream the object body
    async fn get_object_stream(&self, key: &ObjectKey) -> EngineResult<ByteStream>;

    /// Store object data
    async fn put_object(&self, key: &ObjectKey, data: Bytes) -> EngineResult<ObjectDescriptor>;

    /// Sign a time-limited URL with the provider's signing primitive
    async fn presign(
        &self,
        method: LinkMethod,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> EngineResult<String>;
}
