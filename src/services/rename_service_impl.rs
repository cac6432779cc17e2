use async_trait::async_trait;
use futures::{stream::BoxStream, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    domain::{
        errors::EngineResult,
        models::{
            BatchResult, ExtensionFilter, FolderListing, ObjectDescriptor, RenamePlan,
            RenamePreview, RenameRequest,
        },
        value_objects::Prefix,
    },
    ports::services::RenameService,
    services::{planner, settings::EngineSettings, ObjectLister, RenameExecutor, StorageSession},
};

/// Implementation of RenameService wiring lister, filter, planner and executor
#[derive(Debug, Clone, Default)]
pub struct RenameServiceImpl {
    lister: ObjectLister,
    executor: RenameExecutor,
}

impl RenameServiceImpl {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            lister: ObjectLister::new(settings.clone()),
            executor: RenameExecutor::new(settings),
        }
    }

    pub fn lister(&self) -> &ObjectLister {
        &self.lister
    }
}

#[async_trait]
impl RenameService for RenameServiceImpl {
    async fn test_connection(&self, session: &StorageSession) -> EngineResult<()> {
        self.lister.ping(session).await?;
        info!(bucket = %session.bucket(), "connection ok");
        Ok(())
    }

    fn list(
        &self,
        session: &StorageSession,
        prefix: &Prefix,
        recursive: bool,
    ) -> BoxStream<'static, EngineResult<ObjectDescriptor>> {
        self.lister.list(session, prefix, recursive)
    }

    async fn browse(
        &self,
        session: &StorageSession,
        prefix: &Prefix,
    ) -> EngineResult<FolderListing> {
        self.lister.browse(session, prefix).await
    }

    async fn preview(
        &self,
        session: &StorageSession,
        request: &RenameRequest,
        cancel: &CancellationToken,
    ) -> EngineResult<RenamePreview> {
        info!(
            bucket = %session.bucket(),
            prefix = %request.prefix,
            old = %request.old_extension,
            new = %request.new_extension,
            recursive = request.recursive,
            "listing objects for rename"
        );

        let filter = ExtensionFilter::new(request.old_extension.clone());
        let (mut stream, status) =
            self.lister
                .list_cancellable(session, &request.prefix, request.recursive, cancel);

        let mut listed = 0;
        let mut matched = Vec::new();
        while let Some(descriptor) = stream.try_next().await? {
            listed += 1;
            if filter.matches(&descriptor) {
                matched.push(descriptor);
            }
        }

        let matched_count = matched.len();
        let listing_cancelled = status.interrupted();
        let plan = planner::plan(matched, &request.old_extension, &request.new_extension);

        info!(
            listed,
            matched = matched_count,
            planned = plan.len(),
            cancelled = listing_cancelled,
            "rename preview ready"
        );

        Ok(RenamePreview {
            plan,
            listed,
            matched: matched_count,
            listing_cancelled,
        })
    }

    async fn apply(
        &self,
        session: &StorageSession,
        plan: &mut RenamePlan,
        keep_original: bool,
        cancel: &CancellationToken,
    ) -> BatchResult {
        self.executor
            .execute(session, plan, keep_original, cancel)
            .await
    }
}
