use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tracing::info;

use crate::{
    domain::{
        errors::{EngineError, EngineResult},
        models::{LinkMethod, PresignedLink, PresignedLinkDescriptor},
        value_objects::ObjectKey,
    },
    ports::services::PresignedLinkService,
    services::{settings::EngineSettings, timeout::bounded, StorageSession},
};

/// Implementation of PresignedLinkService.
///
/// Signing is delegated to the session's storage provider; this layer only
/// validates inputs and stamps the validity window.
#[derive(Debug, Clone, Default)]
pub struct PresignedLinkServiceImpl {
    settings: EngineSettings,
}

impl PresignedLinkServiceImpl {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    fn validate_ttl(&self, ttl: Duration) -> EngineResult<TimeDelta> {
        if ttl.as_secs() == 0 {
            return Err(EngineError::invalid_input(
                "link lifetime must be at least one second",
            ));
        }
        if ttl > self.settings.max_link_ttl() {
            return Err(EngineError::invalid_input(format!(
                "link lifetime {}s exceeds the provider maximum of {}s",
                ttl.as_secs(),
                self.settings.max_link_ttl().as_secs()
            )));
        }
        TimeDelta::from_std(Duration::from_secs(ttl.as_secs()))
            .map_err(|e| EngineError::invalid_input(format!("link lifetime out of range: {}", e)))
    }
}

#[async_trait]
impl PresignedLinkService for PresignedLinkServiceImpl {
    async fn generate(
        &self,
        session: &StorageSession,
        key: &ObjectKey,
        method: LinkMethod,
        ttl: Duration,
    ) -> EngineResult<PresignedLink> {
        let validity = self.validate_ttl(ttl)?;
        let ttl = Duration::from_secs(ttl.as_secs());

        let issued_at = Utc::now();
        let url = bounded(
            "presign",
            self.settings.request_timeout(),
            session.store().presign(method, key, ttl),
        )
        .await?;

        info!(
            bucket = %session.bucket(),
            key = %key,
            method = %method,
            ttl_secs = ttl.as_secs(),
            "generated presigned link"
        );

        Ok(PresignedLink {
            url,
            key: key.clone(),
            method,
            issued_at,
            expires_at: issued_at + validity,
        })
    }

    fn parse(&self, link: &str) -> EngineResult<PresignedLinkDescriptor> {
        PresignedLinkDescriptor::parse(link)
    }
}
