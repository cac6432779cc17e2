use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{
        errors::EngineResult,
        models::{
            BatchResult, FolderListing, ObjectDescriptor, RenamePlan, RenamePreview, RenameRequest,
        },
        value_objects::Prefix,
    },
    services::StorageSession,
};

/// Service port for discovering objects and renaming their extension
#[async_trait]
pub trait RenameService: Send + Sync + 'static {
    /// Issue one cheap list request to prove the session can reach the bucket
    async fn test_connection(&self, session: &StorageSession) -> EngineResult<()>;

    /// Lazily list every object under `prefix`, optionally descending into sub-prefixes
    fn list(
        &self,
        session: &StorageSession,
        prefix: &Prefix,
        recursive: bool,
    ) -> BoxStream<'static, EngineResult<ObjectDescriptor>>;

    /// Show one level of the bucket as folders and files
    async fn browse(
        &self,
        session: &StorageSession,
        prefix: &Prefix,
    ) -> EngineResult<FolderListing>;

    /// List, filter and plan without touching storage contents
    async fn preview(
        &self,
        session: &StorageSession,
        request: &RenameRequest,
        cancel: &CancellationToken,
    ) -> EngineResult<RenamePreview>;

    /// Execute the selected entries of `plan`, updating their statuses
    async fn apply(
        &self,
        session: &StorageSession,
        plan: &mut RenamePlan,
        keep_original: bool,
        cancel: &CancellationToken,
    ) -> BatchResult;
}
