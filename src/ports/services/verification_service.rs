use async_trait::async_trait;

use crate::{
    domain::models::{VerificationRequest, VerificationResult},
    services::StorageSession,
};

/// Service port for checking uploaded objects against expected fingerprints
#[async_trait]
pub trait VerificationService: Send + Sync + 'static {
    /// Verify a single object. Failures are reported inside the result.
    async fn verify(
        &self,
        session: &StorageSession,
        request: &VerificationRequest,
    ) -> VerificationResult;

    /// Verify several objects concurrently; results follow input order
    async fn verify_many(
        &self,
        session: &StorageSession,
        requests: &[VerificationRequest],
    ) -> Vec<VerificationResult>;
}
