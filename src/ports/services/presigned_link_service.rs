use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{
        errors::EngineResult,
        models::{LinkMethod, PresignedLink, PresignedLinkDescriptor},
        value_objects::ObjectKey,
    },
    services::StorageSession,
};

/// Service port for presigned access links
#[async_trait]
pub trait PresignedLinkService: Send + Sync + 'static {
    /// Sign a link for `key` valid for `ttl`
    async fn generate(
        &self,
        session: &StorageSession,
        key: &ObjectKey,
        method: LinkMethod,
        ttl: Duration,
    ) -> EngineResult<PresignedLink>;

    /// Decompose an existing link. Never touches the network.
    fn parse(&self, link: &str) -> EngineResult<PresignedLinkDescriptor>;
}
