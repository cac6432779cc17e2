mod common;

use std::sync::Arc;

use bucket_ext_rename::{
    EngineSettings, ErrorKind, FingerprintKind, HashAlgorithm, ObjectKey, VerificationRequest,
    VerificationResult, VerificationService, VerificationServiceImpl,
};
use common::{session, FakeStore};

const BODY: &str = "hello world";
const BODY_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";
const BODY_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

async fn store() -> Arc<FakeStore> {
    let store = Arc::new(FakeStore::new());
    store.insert("uploads/report.pdf", BODY).await;
    store
}

fn request(key: &str, expected: &str, kind: FingerprintKind) -> VerificationRequest {
    VerificationRequest::builder()
        .key(ObjectKey::new(key).unwrap())
        .expected_fingerprint(expected)
        .kind(kind)
        .build()
}

async fn verify(expected: &str, kind: FingerprintKind) -> VerificationResult {
    let store = store().await;
    VerificationServiceImpl::new(EngineSettings::default())
        .verify(
            &session(&store),
            &request("uploads/report.pdf", expected, kind),
        )
        .await
}

#[tokio::test]
async fn test_etag_mismatch_is_not_an_error() {
    let result = verify("0123456789abcdef0123456789abcdef", FingerprintKind::ETag).await;

    assert!(!result.matched);
    assert_eq!(result.error_kind, None);
    assert_eq!(result.actual_fingerprint.as_deref(), Some(BODY_MD5));
}

#[tokio::test]
async fn test_etag_match_ignores_quotes() {
    let quoted = format!("\"{}\"", BODY_MD5);

    assert!(verify(&quoted, FingerprintKind::ETag).await.matched);
    assert!(verify(BODY_MD5, FingerprintKind::ETag).await.matched);
}

#[tokio::test]
async fn test_missing_object_is_never_a_match() {
    let store = store().await;
    let service = VerificationServiceImpl::new(EngineSettings::default());

    for kind in [
        FingerprintKind::ETag,
        FingerprintKind::ContentLength,
        FingerprintKind::CustomHash(HashAlgorithm::Md5),
    ] {
        let expected = match kind {
            FingerprintKind::ContentLength => "11",
            _ => BODY_MD5,
        };
        let result = service
            .verify(&session(&store), &request("uploads/missing.pdf", expected, kind))
            .await;

        assert!(!result.matched);
        assert_eq!(result.error_kind, Some(ErrorKind::NotFound));
    }
}

#[tokio::test]
async fn test_content_length() {
    assert!(verify("11", FingerprintKind::ContentLength).await.matched);

    let short = verify("10", FingerprintKind::ContentLength).await;
    assert!(!short.matched);
    assert_eq!(short.actual_fingerprint.as_deref(), Some("11"));

    let invalid = verify("eleven", FingerprintKind::ContentLength).await;
    assert_eq!(invalid.error_kind, Some(ErrorKind::InvalidInput));
}

#[tokio::test]
async fn test_custom_hash_over_streamed_content() {
    let md5 = verify(BODY_MD5, FingerprintKind::CustomHash(HashAlgorithm::Md5)).await;
    assert!(md5.matched);

    let sha = verify(
        &BODY_SHA256.to_uppercase(),
        FingerprintKind::CustomHash(HashAlgorithm::Sha256),
    )
    .await;
    assert!(sha.matched);
    assert_eq!(sha.actual_fingerprint.as_deref(), Some(BODY_SHA256));
}

#[tokio::test]
async fn test_custom_hash_mismatch_reports_actual_digest() {
    let result = verify(
        &"00".repeat(32),
        FingerprintKind::CustomHash(HashAlgorithm::Sha256),
    )
    .await;

    assert!(!result.matched);
    assert_eq!(result.error_kind, None);
    assert_eq!(result.actual_fingerprint.as_deref(), Some(BODY_SHA256));
}

#[tokio::test]
async fn test_bad_expected_digest_is_invalid_input() {
    let not_hex = verify("zz", FingerprintKind::CustomHash(HashAlgorithm::Md5)).await;
    assert_eq!(not_hex.error_kind, Some(ErrorKind::InvalidInput));

    // an MD5 digest offered as SHA-256
    let wrong_len = verify(BODY_MD5, FingerprintKind::CustomHash(HashAlgorithm::Sha256)).await;
    assert_eq!(wrong_len.error_kind, Some(ErrorKind::InvalidInput));
    assert!(!wrong_len.matched);
}

#[tokio::test]
async fn test_verify_many_keeps_input_order() {
    let store = store().await;
    store.insert("uploads/b.bin", vec![0u8; 4096]).await;
    let service = VerificationServiceImpl::new(EngineSettings::default());

    let requests = vec![
        request("uploads/b.bin", "4096", FingerprintKind::ContentLength),
        request("uploads/gone.bin", "1", FingerprintKind::ContentLength),
        request("uploads/report.pdf", BODY_MD5, FingerprintKind::ETag),
    ];
    let results = service.verify_many(&session(&store), &requests).await;

    let keys: Vec<&str> = results.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["uploads/b.bin", "uploads/gone.bin", "uploads/report.pdf"]);
    let matched: Vec<bool> = results.iter().map(|r| r.matched).collect();
    assert_eq!(matched, vec![true, false, true]);
    assert_eq!(results[1].error_kind, Some(ErrorKind::NotFound));
}

#[test]
fn test_fingerprint_kind_names() {
    assert_eq!("etag".parse::<FingerprintKind>().unwrap(), FingerprintKind::ETag);
    assert_eq!(
        "SHA-256".parse::<FingerprintKind>().unwrap(),
        FingerprintKind::CustomHash(HashAlgorithm::Sha256)
    );
    let err = "crc32".parse::<FingerprintKind>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_verify_many_on_spawned_task() {
    let store = store().await;
    store.insert("uploads/notes.txt", "notes").await;
    let service: Arc<dyn VerificationService> = Arc::new(VerificationServiceImpl::new(
        EngineSettings::builder().concurrency(2).build(),
    ));
    let session = session(&store);
    let requests = vec![
        request("uploads/notes.txt", "5", FingerprintKind::ContentLength),
        request(
            "uploads/report.pdf",
            BODY_SHA256,
            FingerprintKind::CustomHash(HashAlgorithm::Sha256),
        ),
    ];

    let results = tokio::spawn(async move { service.verify_many(&session, &requests).await })
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.matched));
    assert_eq!(results[0].key.as_str(), "uploads/notes.txt");
}
