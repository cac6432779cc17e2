use serde::Serialize;

use crate::domain::errors::{EngineError, ErrorKind};
use crate::domain::value_objects::ObjectKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    Md5,
    Sha256,
}

impl HashAlgorithm {
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha256 => 32,
        }
    }
}

/// Which property of the stored object the expected fingerprint describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "algorithm", rename_all = "snake_case")]
pub enum FingerprintKind {
    ETag,
    ContentLength,
    /// Hash computed locally over the full object body. Cost grows with
    /// object size since the whole content is downloaded.
    CustomHash(HashAlgorithm),
}

impl FingerprintKind {
    pub fn requires_content(&self) -> bool {
        matches!(self, FingerprintKind::CustomHash(_))
    }
}

impl std::str::FromStr for FingerprintKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "etag" => Ok(FingerprintKind::ETag),
            "length" | "content-length" | "size" => Ok(FingerprintKind::ContentLength),
            "md5" => Ok(FingerprintKind::CustomHash(HashAlgorithm::Md5)),
            "sha256" | "sha-256" => Ok(FingerprintKind::CustomHash(HashAlgorithm::Sha256)),
            other => Err(EngineError::invalid_input(format!(
                "unknown fingerprint kind '{}'",
                other
            ))),
        }
    }
}

/// Expected fingerprint for one uploaded object
#[derive(Debug, Clone, PartialEq, bon::Builder)]
pub struct VerificationRequest {
    pub key: ObjectKey,
    #[builder(into)]
    pub expected_fingerprint: String,
    pub kind: FingerprintKind,
}

/// Outcome of checking one object.
///
/// A mismatch is `matched = false` with no error; `error_kind` is only set
/// when the check itself could not be carried out (missing object, denied
/// access, bad expected value).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub key: ObjectKey,
    pub kind: FingerprintKind,
    pub matched: bool,
    pub actual_fingerprint: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub message: Option<String>,
}

impl VerificationResult {
    pub(crate) fn compared(
        request: &VerificationRequest,
        matched: bool,
        actual_fingerprint: String,
    ) -> Self {
        Self {
            key: request.key.clone(),
            kind: request.kind,
            matched,
            actual_fingerprint: Some(actual_fingerprint),
            error_kind: None,
            message: None,
        }
    }

    pub(crate) fn errored(request: &VerificationRequest, err: &EngineError) -> Self {
        Self {
            key: request.key.clone(),
            kind: request.kind,
            matched: false,
            actual_fingerprint: None,
            error_kind: Some(err.kind()),
            message: Some(err.to_string()),
        }
    }
}

/// Strip the quoting and weak-validator marker providers put around etags
pub fn normalize_etag(etag: &str) -> &str {
    let etag = etag.trim();
    let etag = etag.strip_prefix("W/").unwrap_or(etag);
    etag.trim_matches('"')
}
