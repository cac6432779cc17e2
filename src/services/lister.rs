use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    domain::{
        errors::{EngineError, EngineResult},
        models::{FileEntry, FolderEntry, FolderListing, Listing, ObjectDescriptor},
        value_objects::Prefix,
    },
    ports::storage::{ListPage, ListPageRequest},
    services::{settings::EngineSettings, timeout::bounded, StorageSession},
};

/// Set by a cancellable walk that stopped before the provider ran out of pages
#[derive(Debug, Clone, Default)]
pub struct WalkStatus(Arc<AtomicBool>);

impl WalkStatus {
    pub fn interrupted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn mark_interrupted(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Walks a bucket prefix page by page.
///
/// Pagination is hidden from callers: each stream transparently follows
/// continuation tokens until the provider reports no more pages. Recursive
/// walks descend depth-first into every common prefix and only ever yield
/// objects. A failed page ends the stream with that error; there are no
/// internal retries.
#[derive(Debug, Clone, Default)]
pub struct ObjectLister {
    settings: EngineSettings,
}

impl ObjectLister {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Lazily list `prefix`. Each call re-queries current bucket state.
    pub fn list(
        &self,
        session: &StorageSession,
        prefix: &Prefix,
        recursive: bool,
    ) -> BoxStream<'static, EngineResult<ObjectDescriptor>> {
        self.walk(session, prefix, recursive, None, WalkStatus::default())
    }

    /// Like [`ObjectLister::list`], but stops issuing page requests once
    /// `cancel` fires. The page already in flight is allowed to finish.
    /// The returned status reports whether pages were left unfetched.
    pub fn list_cancellable(
        &self,
        session: &StorageSession,
        prefix: &Prefix,
        recursive: bool,
        cancel: &CancellationToken,
    ) -> (BoxStream<'static, EngineResult<ObjectDescriptor>>, WalkStatus) {
        let status = WalkStatus::default();
        let stream = self.walk(session, prefix, recursive, Some(cancel.clone()), status.clone());
        (stream, status)
    }

    /// Drain a cancellable listing into memory
    pub async fn collect(
        &self,
        session: &StorageSession,
        prefix: &Prefix,
        recursive: bool,
        cancel: &CancellationToken,
    ) -> EngineResult<Listing> {
        let (stream, status) = self.list_cancellable(session, prefix, recursive, cancel);
        let objects: Vec<ObjectDescriptor> = stream.try_collect().await?;

        Ok(Listing {
            cancelled: status.interrupted(),
            objects,
        })
    }

    /// One delimited level of the bucket split into folders and direct files
    pub async fn browse(
        &self,
        session: &StorageSession,
        prefix: &Prefix,
    ) -> EngineResult<FolderListing> {
        let mut listing = FolderListing {
            prefix: prefix.clone(),
            ..FolderListing::default()
        };
        let mut token = None;

        loop {
            let page = self.fetch_page(session, prefix, token.take()).await?;

            for common in page.common_prefixes {
                let name = prefix
                    .relative(&common)
                    .unwrap_or(&common)
                    .trim_end_matches('/')
                    .to_string();
                if !name.is_empty() {
                    listing.folders.push(FolderEntry {
                        name,
                        full_path: common,
                    });
                }
            }

            for object in page.objects {
                let key = object.key.as_str();
                if object.key.is_folder_marker() || !prefix.is_direct_child(key) {
                    continue;
                }
                listing.files.push(FileEntry {
                    name: object.key.file_name().to_string(),
                    full_path: key.to_string(),
                    size: object.size,
                });
            }

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        info!(
            bucket = %session.bucket(),
            prefix = %prefix,
            folders = listing.folders.len(),
            files = listing.files.len(),
            "browsed prefix"
        );
        Ok(listing)
    }

    /// Single one-key request against the bucket root
    pub async fn ping(&self, session: &StorageSession) -> EngineResult<()> {
        let request = ListPageRequest {
            prefix: Prefix::root(),
            continuation_token: None,
            max_keys: 1,
        };
        bounded(
            "list",
            self.settings.request_timeout(),
            session.store().list_page(&request),
        )
        .await
        .map(|_| ())
    }

    async fn fetch_page(
        &self,
        session: &StorageSession,
        prefix: &Prefix,
        continuation_token: Option<String>,
    ) -> EngineResult<ListPage> {
        let request = ListPageRequest {
            prefix: prefix.clone(),
            continuation_token,
            max_keys: self.settings.page_size(),
        };
        bounded(
            "list",
            self.settings.request_timeout(),
            session.store().list_page(&request),
        )
        .await
    }

    fn walk(
        &self,
        session: &StorageSession,
        prefix: &Prefix,
        recursive: bool,
        cancel: Option<CancellationToken>,
        status: WalkStatus,
    ) -> BoxStream<'static, EngineResult<ObjectDescriptor>> {
        let lister = self.clone();
        let session = session.clone();
        let root = prefix.clone();

        async_stream::try_stream! {
            let mut pending = vec![root.clone()];
            let mut pages = 0usize;
            let mut yielded = 0usize;

            'walk: while let Some(current) = pending.pop() {
                let mut token: Option<String> = None;
                let mut discovered = Vec::new();

                loop {
                    if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                        info!(prefix = %root, pages, yielded, "listing cancelled");
                        status.mark_interrupted();
                        break 'walk;
                    }

                    let page = lister
                        .fetch_page(&session, &current, token.take())
                        .await
                        .inspect_err(|err| {
                            error!(prefix = %current, error = %err, "listing page failed");
                        })?;
                    pages += 1;
                    debug!(
                        prefix = %current,
                        page = pages,
                        objects = page.objects.len(),
                        prefixes = page.common_prefixes.len(),
                        "fetched list page"
                    );

                    for object in page.objects {
                        if object.key.is_folder_marker() {
                            continue;
                        }
                        yielded += 1;
                        yield object;
                    }

                    if recursive {
                        for common in page.common_prefixes {
                            let child = Prefix::new(&common).map_err(EngineError::from)?;
                            // a provider echoing the parent back would loop forever
                            if child.as_str().len() > current.as_str().len()
                                && child.as_str().starts_with(current.as_str())
                            {
                                discovered.push(child);
                            }
                        }
                    }

                    match page.next_token {
                        Some(next) => token = Some(next),
                        None => break,
                    }
                }

                // visit sub-prefixes in the order the provider returned them
                pending.extend(discovered.into_iter().rev());
            }

            debug!(prefix = %root, pages, yielded, recursive, "listing finished");
        }
        .boxed()
    }
}
