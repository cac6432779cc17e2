use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use sha2::{Digest as _, Sha256};
use tracing::{debug, warn};

use crate::{
    domain::{
        errors::{EngineError, EngineResult},
        models::{
            normalize_etag, FingerprintKind, HashAlgorithm, VerificationRequest,
            VerificationResult,
        },
        value_objects::ObjectKey,
    },
    ports::{services::VerificationService, storage::ObjectStore},
    services::{settings::EngineSettings, timeout::bounded, StorageSession},
};

/// Implementation of VerificationService.
///
/// ETag and content-length checks are a single metadata request. Custom
/// hashes stream the entire object body, so their cost grows with object size.
#[derive(Debug, Clone, Default)]
pub struct VerificationServiceImpl {
    settings: EngineSettings,
}

impl VerificationServiceImpl {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    async fn check(
        &self,
        store: &Arc<dyn ObjectStore>,
        request: &VerificationRequest,
    ) -> EngineResult<(bool, String)> {
        let limit = self.settings.request_timeout();
        let expected = request.expected_fingerprint.trim();

        match request.kind {
            FingerprintKind::ETag => {
                let meta = bounded("head", limit, store.head_object(&request.key)).await?;
                let actual = meta.etag.ok_or_else(|| {
                    EngineError::provider("head", "provider reported no etag for object")
                })?;
                let actual = normalize_etag(&actual).to_string();
                Ok((actual == normalize_etag(expected), actual))
            }
            FingerprintKind::ContentLength => {
                let expected: u64 = expected.parse().map_err(|_| {
                    EngineError::invalid_input(format!(
                        "expected content length '{}' is not a byte count",
                        expected
                    ))
                })?;
                let meta = bounded("head", limit, store.head_object(&request.key)).await?;
                Ok((meta.size == expected, meta.size.to_string()))
            }
            FingerprintKind::CustomHash(algorithm) => {
                let expected = hex::decode(expected).map_err(|e| {
                    EngineError::invalid_input(format!("expected hash is not hex: {}", e))
                })?;
                if expected.len() != algorithm.digest_len() {
                    return Err(EngineError::invalid_input(format!(
                        "expected {:?} digest of {} bytes, got {}",
                        algorithm,
                        algorithm.digest_len(),
                        expected.len()
                    )));
                }

                let digest = hash_content(store, &request.key, algorithm, limit).await?;
                Ok((digest == expected, hex::encode(&digest)))
            }
        }
    }
}

#[async_trait]
impl VerificationService for VerificationServiceImpl {
    async fn verify(
        &self,
        session: &StorageSession,
        request: &VerificationRequest,
    ) -> VerificationResult {
        match self.check(session.store(), request).await {
            Ok((matched, actual)) => {
                debug!(
                    key = %request.key,
                    kind = ?request.kind,
                    matched,
                    actual = %actual,
                    "verified object"
                );
                VerificationResult::compared(request, matched, actual)
            }
            Err(err) => {
                warn!(key = %request.key, kind = %err.kind(), error = %err, "verification failed");
                VerificationResult::errored(request, &err)
            }
        }
    }

    async fn verify_many(
        &self,
        session: &StorageSession,
        requests: &[VerificationRequest],
    ) -> Vec<VerificationResult> {
        let pending: Vec<_> = requests
            .iter()
            .map(|request| self.verify(session, request))
            .collect();

        stream::iter(pending)
            .buffered(self.settings.concurrency())
            .collect()
            .await
    }
}

enum ContentHasher {
    Md5(md5::Context),
    Sha256(Sha256),
}

impl ContentHasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => ContentHasher::Md5(md5::Context::new()),
            HashAlgorithm::Sha256 => ContentHasher::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            ContentHasher::Md5(ctx) => ctx.consume(chunk),
            ContentHasher::Sha256(hasher) => hasher.update(chunk),
        }
    }

    fn finish(self) -> Vec<u8> {
        match self {
            ContentHasher::Md5(ctx) => ctx.compute().0.to_vec(),
            ContentHasher::Sha256(hasher) => hasher.finalize().to_vec(),
        }
    }
}

/// Stream the object body through the hasher; each chunk read is time-bounded
async fn hash_content(
    store: &Arc<dyn ObjectStore>,
    key: &ObjectKey,
    algorithm: HashAlgorithm,
    limit: Duration,
) -> EngineResult<Vec<u8>> {
    let mut body = bounded("get", limit, store.get_object_stream(key)).await?;
    let mut hasher = ContentHasher::new(algorithm);
    let mut bytes_read = 0u64;

    loop {
        let next = tokio::time::timeout(limit, body.next())
            .await
            .map_err(|_| EngineError::Timeout {
                operation: "read".to_string(),
                after: limit,
            })?;
        match next {
            Some(chunk) => {
                let chunk = chunk?;
                bytes_read += chunk.len() as u64;
                hasher.update(&chunk);
            }
            None => break,
        }
    }

    debug!(key = %key, bytes_read, algorithm = ?algorithm, "hashed object body");
    Ok(hasher.finish())
}
