//! S3-compatible storage backends built on the object_store crate
//!
//! Both AWS S3 and MinIO go through `AmazonS3`. Presigned links are signed
//! by [`S3LinkSigner`] with the same credentials.

mod presign;

use std::sync::Arc;

use anyhow::{Context, Result};
use object_store::aws::AmazonS3Builder;

use super::ObjectStoreAdapter;

pub use presign::S3LinkSigner;

/// Already-resolved connection details for one bucket
#[derive(Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    pub endpoint: Option<String>,
    pub allow_http: bool,
}

impl S3Config {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            access_key: None,
            secret_key: None,
            session_token: None,
            endpoint: None,
            allow_http: false,
        }
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Point at an S3-compatible endpoint; plain `http://` endpoints are allowed
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.allow_http = endpoint.starts_with("http://");
        self.endpoint = Some(endpoint);
        self
    }

    /// MinIO deployments ignore the region but signing still needs one
    pub fn minio(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self::new(bucket, "us-east-1")
            .with_credentials(access_key, secret_key)
            .with_endpoint(endpoint)
    }
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("allow_http", &self.allow_http)
            .finish()
    }
}

/// Create an S3 store from configuration, able to sign links
pub fn create_s3_store(config: &S3Config) -> Result<ObjectStoreAdapter> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket)
        .with_region(&config.region)
        .with_allow_http(config.allow_http);

    if let Some(access_key) = &config.access_key {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(secret_key) = &config.secret_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(token) = &config.session_token {
        builder = builder.with_token(token);
    }

    if let Some(endpoint) = &config.endpoint {
        builder = builder.with_endpoint(endpoint);
    }

    let store = builder.build().context("Failed to build S3 store")?;
    let signer = S3LinkSigner::new(store.credentials().clone(), config);

    Ok(ObjectStoreAdapter::new(Arc::new(store)).with_signer(Arc::new(signer)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minio_config_allows_http() {
        let config = S3Config::minio("http://localhost:9000", "minioadmin", "minioadmin", "test");
        assert!(config.allow_http);
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = S3Config::new("bucket", "eu-west-1")
            .with_credentials("AKIA", "very-secret")
            .with_session_token("token-value");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("very-secret"));
        assert!(!printed.contains("token-value"));
    }

    #[test]
    fn test_build_s3_store_offline() {
        let config = S3Config::new("bucket", "us-east-1").with_credentials("AKIA", "secret");
        assert!(create_s3_store(&config).is_ok());
    }
}
