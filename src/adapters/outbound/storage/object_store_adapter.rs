use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use object_store::{
    path::Path as ObjectPath, signer::Signer, ObjectMeta, ObjectStore as ObjectStoreBackend,
    PutPayload,
};
use tracing::warn;

use crate::{
    adapters::outbound::storage::error::map_store_error,
    domain::{
        errors::{EngineError, EngineResult},
        models::{LinkMethod, ObjectDescriptor},
        value_objects::{ObjectKey, Prefix},
    },
    ports::storage::{ByteStream, ListPage, ListPageRequest, ObjectStore},
};

/// Adapter that implements our ObjectStore port using Apache object_store.
///
/// The wrapped store is already bound to one bucket. Presigning needs a
/// signer such as `S3LinkSigner`; without one it reports a provider error.
#[derive(Clone)]
pub struct ObjectStoreAdapter {
    inner: Arc<dyn ObjectStoreBackend>,
    signer: Option<Arc<dyn Signer>>,
}

impl ObjectStoreAdapter {
    pub fn new(store: Arc<dyn ObjectStoreBackend>) -> Self {
        Self {
            inner: store,
            signer: None,
        }
    }

    /// Use `signer` for presigned links
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Keys reach the store verbatim; `ObjectPath::from` would percent-encode
    /// characters such as `#` or `%`
    fn to_object_path(operation: &str, key: &ObjectKey) -> EngineResult<ObjectPath> {
        ObjectPath::parse(key.as_str())
            .map_err(|e| map_store_error(operation, key.as_str(), e.into()))
    }

    fn to_prefix_path(prefix: &Prefix) -> EngineResult<Option<ObjectPath>> {
        if prefix.is_root() {
            return Ok(None);
        }
        ObjectPath::parse(prefix.as_str())
            .map(Some)
            .map_err(|e| map_store_error("list", prefix.as_str(), e.into()))
    }

    fn to_descriptor(meta: ObjectMeta) -> EngineResult<ObjectDescriptor> {
        let key = ObjectKey::new(meta.location.to_string()).map_err(|e| {
            EngineError::provider(
                "list",
                format!("provider returned unusable key '{}': {}", meta.location, e),
            )
        })?;
        Ok(ObjectDescriptor {
            key,
            size: meta.size,
            last_modified: meta.last_modified,
            etag: meta.e_tag,
        })
    }

    /// Keys the port cannot represent are dropped from listings
    fn collect_descriptors(metas: impl IntoIterator<Item = ObjectMeta>) -> Vec<ObjectDescriptor> {
        metas
            .into_iter()
            .filter_map(|meta| match Self::to_descriptor(meta) {
                Ok(descriptor) => Some(descriptor),
                Err(err) => {
                    warn!(error = %err, "skipping listed object");
                    None
                }
            })
            .collect()
    }

}

#[async_trait]
impl ObjectStore for ObjectStoreAdapter {
    async fn list_page(&self, request: &ListPageRequest) -> EngineResult<ListPage> {
        // object_store follows provider continuation internally for delimited
        // listings, so the whole level arrives as a single page
        if request.continuation_token.is_some() {
            return Ok(ListPage::default());
        }

        let prefix = Self::to_prefix_path(&request.prefix)?;
        let result = self
            .inner
            .list_with_delimiter(prefix.as_ref())
            .await
            .map_err(|e| map_store_error("list", request.prefix.as_str(), e))?;

        Ok(ListPage {
            objects: Self::collect_descriptors(result.objects),
            common_prefixes: result
                .common_prefixes
                .into_iter()
                .map(|p| format!("{}/", p))
                .collect(),
            next_token: None,
        })
    }

    async fn copy_object(&self, source: &ObjectKey, destination: &ObjectKey) -> EngineResult<()> {
        let from = Self::to_object_path("copy", source)?;
        let to = Self::to_object_path("copy", destination)?;

        self.inner
            .copy(&from, &to)
            .await
            .map_err(|e| map_store_error("copy", source.as_str(), e))
    }

    async fn delete_object(&self, key: &ObjectKey) -> EngineResult<()> {
        let path = Self::to_object_path("delete", key)?;

        self.inner
            .delete(&path)
            .await
            .map_err(|e| map_store_error("delete", key.as_str(), e))
    }

    async fn head_object(&self, key: &ObjectKey) -> EngineResult<ObjectDescriptor> {
        let path = Self::to_object_path("head", key)?;

        let meta = self
            .inner
            .head(&path)
            .await
            .map_err(|e| map_store_error("head", key.as_str(), e))?;

        Ok(ObjectDescriptor {
            key: key.clone(),
            size: meta.size,
            last_modified: meta.last_modified,
            etag: meta.e_tag,
        })
    }

    async fn get_object_stream(&self, key: &ObjectKey) -> EngineResult<ByteStream> {
        let path = Self::to_object_path("get", key)?;

        let result = self
            .inner
            .get(&path)
            .await
            .map_err(|e| map_store_error("get", key.as_str(), e))?;

        let owned_key = key.as_str().to_string();
        Ok(result
            .into_stream()
            .map_err(move |e| map_store_error("get", &owned_key, e))
            .boxed())
    }

    async fn put_object(&self, key: &ObjectKey, data: Bytes) -> EngineResult<ObjectDescriptor> {
        let path = Self::to_object_path("put", key)?;
        let size = data.len() as u64;

        let result = self
            .inner
            .put(&path, PutPayload::from(data))
            .await
            .map_err(|e| map_store_error("put", key.as_str(), e))?;

        Ok(ObjectDescriptor {
            key: key.clone(),
            size,
            last_modified: Utc::now(),
            etag: result.e_tag,
        })
    }

    async fn presign(
        &self,
        method: LinkMethod,
        key: &ObjectKey,
        expires_in: Duration,
    ) -> EngineResult<String> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            EngineError::provider("presign", "storage backend cannot sign links")
        })?;
        let http_method = match method {
            LinkMethod::Get => http::Method::GET,
            LinkMethod::Put => http::Method::PUT,
        };

        let path = Self::to_object_path("presign", key)?;
        let url = signer
            .signed_url(http_method, &path, expires_in)
            .await
            .map_err(|e| map_store_error("presign", key.as_str(), e))?;

        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    fn key(value: &str) -> ObjectKey {
        ObjectKey::new(value).unwrap()
    }

    async fn seeded(keys: &[&str]) -> ObjectStoreAdapter {
        let adapter = ObjectStoreAdapter::new(Arc::new(InMemory::new()));
        for k in keys {
            adapter
                .put_object(&key(k), Bytes::from(k.to_string()))
                .await
                .unwrap();
        }
        adapter
    }

    fn request(prefix: &str, token: Option<String>) -> ListPageRequest {
        ListPageRequest {
            prefix: Prefix::new(prefix).unwrap(),
            continuation_token: token,
            max_keys: 1000,
        }
    }

    #[tokio::test]
    async fn test_delimited_listing_splits_prefixes() {
        let adapter = seeded(&["photos/a.jpg", "photos/2024/b.jpg", "docs/c.txt"]).await;

        let page = adapter
            .list_page(&request("photos/", None))
            .await
            .unwrap();

        let keys: Vec<&str> = page.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["photos/a.jpg"]);
        assert_eq!(page.common_prefixes, vec!["photos/2024/".to_string()]);
        assert!(page.next_token.is_none());
    }

    #[tokio::test]
    async fn test_continuation_page_is_empty() {
        let adapter = seeded(&["photos/a.jpg"]).await;

        let page = adapter
            .list_page(&request("photos/", Some("photos/a.jpg".to_string())))
            .await
            .unwrap();
        assert_eq!(page, ListPage::default());
    }

    #[tokio::test]
    async fn test_reserved_characters_stay_verbatim() {
        let adapter = seeded(&["in/q1#final.txt", "in/100%.txt"]).await;

        adapter
            .copy_object(&key("in/q1#final.txt"), &key("in/q1#final.log"))
            .await
            .unwrap();
        adapter.delete_object(&key("in/100%.txt")).await.unwrap();

        let mut backend_keys: Vec<String> = adapter
            .inner
            .list(None)
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await
            .unwrap();
        backend_keys.sort();
        assert_eq!(backend_keys, vec!["in/q1#final.log", "in/q1#final.txt"]);
    }

    #[tokio::test]
    async fn test_unaddressable_key_is_invalid_input() {
        let adapter = seeded(&[]).await;

        let err = adapter.head_object(&key("a/../b.txt")).await.unwrap_err();
        assert_eq!(err.kind(), crate::domain::errors::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_copy_delete_and_head() {
        let adapter = seeded(&["a.txt"]).await;

        adapter.copy_object(&key("a.txt"), &key("a.md")).await.unwrap();
        adapter.delete_object(&key("a.txt")).await.unwrap();

        let head = adapter.head_object(&key("a.md")).await.unwrap();
        assert_eq!(head.size, 5);
        let missing = adapter.head_object(&key("a.txt")).await.unwrap_err();
        assert_eq!(missing.kind(), crate::domain::errors::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_copy_missing_source_is_not_found() {
        let adapter = seeded(&[]).await;

        let err = adapter
            .copy_object(&key("nope.txt"), &key("nope.md"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::domain::errors::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_stream_returns_body() {
        let adapter = seeded(&["body.bin"]).await;

        let chunks: Vec<Bytes> = adapter
            .get_object_stream(&key("body.bin"))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let body: Vec<u8> = chunks.concat();
        assert_eq!(body, b"body.bin");
    }

    #[tokio::test]
    async fn test_presign_without_signer_is_provider_error() {
        let adapter = seeded(&["a.txt"]).await;

        let err = adapter
            .presign(LinkMethod::Get, &key("a.txt"), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::domain::errors::ErrorKind::ProviderError);
    }
}
