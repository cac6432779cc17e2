//! Shared test fixtures: an in-process bucket with S3-like paging and
//! injectable faults.
#![allow(dead_code)]

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use bucket_ext_rename::{
    ports::storage::ByteStream, BucketName, EngineError, EngineResult, EngineSettings, LinkMethod,
    ListPage, ListPageRequest, ObjectDescriptor, ObjectKey, ObjectStore, StorageSession,
};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use futures::StreamExt;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

const CHUNK_SIZE: usize = 7;

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    etag: String,
    last_modified: DateTime<Utc>,
}

#[derive(Default)]
struct Faults {
    deny_copy: HashSet<String>,
    deny_delete: HashSet<String>,
    fail_list_call: Option<usize>,
    copy_delay: Option<Duration>,
    cancel_after_copies: Option<(usize, CancellationToken)>,
    cancel_after_lists: Option<(usize, CancellationToken)>,
}

/// Bucket double implementing the storage port
pub struct FakeStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    page_size: usize,
    faults: Mutex<Faults>,
    list_calls: AtomicUsize,
    copy_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::with_page_size(1000)
    }

    /// Provider pages never exceed `page_size` entries
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            page_size: page_size.max(1),
            faults: Mutex::new(Faults::default()),
            list_calls: AtomicUsize::new(0),
            copy_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub async fn insert(&self, key: &str, data: impl Into<Bytes>) {
        let data = data.into();
        let etag = format!("\"{:x}\"", md5::compute(&data));
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                etag,
                last_modified: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            },
        );
    }

    pub async fn seed(&self, keys: &[&str]) {
        for key in keys {
            self.insert(key, format!("content of {}", key)).await;
        }
    }

    pub async fn remove(&self, key: &str) {
        self.objects.write().await.remove(key);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    pub async fn data(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).map(|o| o.data.clone())
    }

    pub fn deny_copy(&self, key: &str) {
        self.faults.lock().unwrap().deny_copy.insert(key.to_string());
    }

    pub fn deny_delete(&self, key: &str) {
        self.faults.lock().unwrap().deny_delete.insert(key.to_string());
    }

    /// The `call`th list request (1-based) fails with a provider error
    pub fn fail_list_call(&self, call: usize) {
        self.faults.lock().unwrap().fail_list_call = Some(call);
    }

    pub fn delay_copies(&self, delay: Duration) {
        self.faults.lock().unwrap().copy_delay = Some(delay);
    }

    pub fn cancel_after_copies(&self, copies: usize, token: &CancellationToken) {
        self.faults.lock().unwrap().cancel_after_copies = Some((copies, token.clone()));
    }

    pub fn cancel_after_lists(&self, lists: usize, token: &CancellationToken) {
        self.faults.lock().unwrap().cancel_after_lists = Some((lists, token.clone()));
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn copy_calls(&self) -> usize {
        self.copy_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn descriptor(key: &str, object: &StoredObject) -> ObjectDescriptor {
        ObjectDescriptor {
            key: ObjectKey::new(key).unwrap(),
            size: object.data.len() as u64,
            last_modified: object.last_modified,
            etag: Some(object.etag.clone()),
        }
    }
}

enum Item {
    Object(String),
    Prefix(String),
}

impl Item {
    fn marker(&self) -> &str {
        match self {
            Item::Object(key) | Item::Prefix(key) => key,
        }
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn list_page(&self, request: &ListPageRequest) -> EngineResult<ListPage> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let faults = self.faults.lock().unwrap();
            if faults.fail_list_call == Some(call) {
                return Err(EngineError::provider("list", "injected list failure"));
            }
        }

        let objects = self.objects.read().await;
        let prefix = request.prefix.as_str();

        // merge keys and common prefixes into one ordered sequence, as S3 does
        let mut prefixes = BTreeSet::new();
        let mut items = Vec::new();
        for key in objects.keys().filter(|k| k.starts_with(prefix)) {
            let rest = &key[prefix.len()..];
            match rest.find('/') {
                Some(idx) => {
                    prefixes.insert(format!("{}{}", prefix, &rest[..=idx]));
                }
                None => items.push(Item::Object(key.clone())),
            }
        }
        items.extend(prefixes.into_iter().map(Item::Prefix));
        items.sort_by(|a, b| a.marker().cmp(b.marker()));

        let start = match &request.continuation_token {
            Some(token) => items
                .iter()
                .position(|item| item.marker() > token.as_str())
                .unwrap_or(items.len()),
            None => 0,
        };
        let limit = self.page_size.min(request.max_keys.max(1));
        let end = (start + limit).min(items.len());

        let mut page = ListPage::default();
        for item in &items[start..end] {
            match item {
                Item::Object(key) => page.objects.push(Self::descriptor(key, &objects[key])),
                Item::Prefix(p) => page.common_prefixes.push(p.clone()),
            }
        }
        if end < items.len() {
            page.next_token = Some(items[end - 1].marker().to_string());
        }
        drop(objects);

        let faults = self.faults.lock().unwrap();
        if let Some((after, token)) = &faults.cancel_after_lists {
            if call >= *after {
                token.cancel();
            }
        }
        Ok(page)
    }

    async fn copy_object(&self, source: &ObjectKey, destination: &ObjectKey) -> EngineResult<()> {
        let delay = self.faults.lock().unwrap().copy_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let copies = self.copy_calls.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let faults = self.faults.lock().unwrap();
            if let Some((after, token)) = &faults.cancel_after_copies {
                if copies >= *after {
                    token.cancel();
                }
            }
            if faults.deny_copy.contains(source.as_str()) {
                return Err(EngineError::PermissionDenied {
                    key: source.as_str().to_string(),
                    operation: "copy".to_string(),
                });
            }
        }

        let mut objects = self.objects.write().await;
        let object = objects
            .get(source.as_str())
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                key: source.as_str().to_string(),
            })?;
        objects.insert(destination.as_str().to_string(), object);
        Ok(())
    }

    async fn delete_object(&self, key: &ObjectKey) -> EngineResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let denied = self.faults.lock().unwrap().deny_delete.contains(key.as_str());
        if denied {
            return Err(EngineError::PermissionDenied {
                key: key.as_str().to_string(),
                operation: "delete".to_string(),
            });
        }
        self.objects.write().await.remove(key.as_str());
        Ok(())
    }

    async fn head_object(&self, key: &ObjectKey) -> EngineResult<ObjectDescriptor> {
        let objects = self.objects.read().await;
        objects
            .get(key.as_str())
            .map(|object| Self::descriptor(key.as_str(), object))
            .ok_or_else(|| EngineError::NotFound {
                key: key.as_str().to_string(),
            })
    }

    async fn get_object_stream(&self, key: &ObjectKey) -> EngineResult<ByteStream> {
        let data = self
            .data(key.as_str())
            .await
            .ok_or_else(|| EngineError::NotFound {
                key: key.as_str().to_string(),
            })?;

        let chunks: Vec<EngineResult<Bytes>> = data
            .chunks(CHUNK_SIZE)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }

    async fn put_object(&self, key: &ObjectKey, data: Bytes) -> EngineResult<ObjectDescriptor> {
        self.insert(key.as_str(), data).await;
        self.head_object(key).await
    }

    async fn presign(
        &self,
        _method: LinkMethod,
        _key: &ObjectKey,
        _expires_in: Duration,
    ) -> EngineResult<String> {
        Err(EngineError::provider("presign", "fake store cannot sign"))
    }
}

pub fn session(store: &Arc<FakeStore>) -> StorageSession {
    StorageSession::new(BucketName::new("test-bucket").unwrap(), store.clone())
}

pub fn settings(concurrency: usize) -> EngineSettings {
    EngineSettings::builder().concurrency(concurrency).build()
}
