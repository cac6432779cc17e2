use std::{sync::Arc, time::Duration};

use object_store::memory::InMemory;
use tracing::info;

use crate::{
    adapters::outbound::storage::{create_s3_store, ObjectStoreAdapter, S3Config},
    domain::value_objects::BucketName,
    ports::storage::ObjectStore,
    services::{
        EngineSettings, PresignedLinkServiceImpl, RenameServiceImpl, StorageSession,
        VerificationServiceImpl,
    },
};

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub settings: EngineSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::InMemory {
                bucket: "local".to_string(),
            },
            settings: EngineSettings::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value if set
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| AppError::Configuration {
                message: format!("{} environment variable required", name),
            })
        };

        let storage_backend = match lookup("STORAGE_BACKEND").as_deref() {
            Some("s3") => StorageBackend::S3 {
                bucket: required("S3_BUCKET")?,
                region: required("S3_REGION")?,
                access_key: lookup("S3_ACCESS_KEY"),
                secret_key: lookup("S3_SECRET_KEY"),
                session_token: lookup("S3_SESSION_TOKEN"),
                endpoint: lookup("S3_ENDPOINT"),
            },
            Some("minio") => StorageBackend::MinIO {
                endpoint: required("MINIO_ENDPOINT")?,
                bucket: required("MINIO_BUCKET")?,
                access_key: required("MINIO_ACCESS_KEY")?,
                secret_key: required("MINIO_SECRET_KEY")?,
                use_ssl: lookup("MINIO_USE_SSL")
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            },
            Some("memory") | None => StorageBackend::InMemory {
                bucket: lookup("S3_BUCKET").unwrap_or_else(|| "local".to_string()),
            },
            Some(other) => {
                return Err(AppError::Configuration {
                    message: format!("Unknown storage backend: {}", other),
                })
            }
        };

        let concurrency = match lookup("RENAME_CONCURRENCY") {
            Some(value) => parse_number("RENAME_CONCURRENCY", &value)?,
            None => EngineSettings::default().concurrency(),
        };
        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_number("REQUEST_TIMEOUT_SECS", &value)? as u64),
            None => EngineSettings::default().request_timeout(),
        };

        Ok(Self {
            storage_backend,
            settings: EngineSettings::builder()
                .concurrency(concurrency)
                .request_timeout(request_timeout)
                .build(),
        })
    }
}

fn parse_number(name: &str, value: &str) -> Result<usize, AppError> {
    value.trim().parse().map_err(|_| AppError::Configuration {
        message: format!("{} must be a positive number, got '{}'", name, value),
    })
}

/// Storage backend configuration
#[derive(Clone)]
pub enum StorageBackend {
    InMemory {
        bucket: String,
    },
    S3 {
        bucket: String,
        region: String,
        access_key: Option<String>,
        secret_key: Option<String>,
        session_token: Option<String>,
        endpoint: Option<String>,
    },
    MinIO {
        endpoint: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        use_ssl: bool,
    },
}

impl StorageBackend {
    pub fn bucket(&self) -> &str {
        match self {
            StorageBackend::InMemory { bucket }
            | StorageBackend::S3 { bucket, .. }
            | StorageBackend::MinIO { bucket, .. } => bucket,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::InMemory { .. } => "memory",
            StorageBackend::S3 { .. } => "s3",
            StorageBackend::MinIO { .. } => "minio",
        }
    }
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("kind", &self.name())
            .field("bucket", &self.bucket())
            .finish_non_exhaustive()
    }
}

/// Application services container
pub struct AppServices {
    pub session: StorageSession,
    pub rename_service: RenameServiceImpl,
    pub verification_service: VerificationServiceImpl,
    pub link_service: PresignedLinkServiceImpl,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    /// Configure engine tuning
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.config.settings = settings;
        self
    }

    /// Build a session over `store` without touching the configured backend
    pub fn build_with_store(self, store: Arc<dyn ObjectStore>) -> Result<AppServices, AppError> {
        let bucket = self.bucket()?;
        Ok(self.assemble(StorageSession::new(bucket, store)))
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let bucket = self.bucket()?;
        let store = self.create_storage_adapter()?;

        info!(
            backend = self.config.storage_backend.name(),
            bucket = %bucket,
            concurrency = self.config.settings.concurrency(),
            "storage session ready"
        );

        Ok(self.assemble(StorageSession::new(bucket, store)))
    }

    fn bucket(&self) -> Result<BucketName, AppError> {
        BucketName::new(self.config.storage_backend.bucket()).map_err(|e| {
            AppError::Configuration {
                message: format!("invalid bucket name: {}", e),
            }
        })
    }

    fn assemble(self, session: StorageSession) -> AppServices {
        let settings = self.config.settings;
        AppServices {
            session,
            rename_service: RenameServiceImpl::new(settings.clone()),
            verification_service: VerificationServiceImpl::new(settings.clone()),
            link_service: PresignedLinkServiceImpl::new(settings),
        }
    }

    /// Create storage adapter based on configuration
    fn create_storage_adapter(&self) -> Result<Arc<dyn ObjectStore>, AppError> {
        let config = match &self.config.storage_backend {
            StorageBackend::InMemory { .. } => {
                return Ok(Arc::new(ObjectStoreAdapter::new(Arc::new(InMemory::new()))));
            }
            StorageBackend::S3 {
                bucket,
                region,
                access_key,
                secret_key,
                session_token,
                endpoint,
            } => {
                let mut config = S3Config::new(bucket, region);
                config.access_key = access_key.clone();
                config.secret_key = secret_key.clone();
                config.session_token = session_token.clone();
                match endpoint {
                    Some(endpoint) => config.with_endpoint(endpoint),
                    None => config,
                }
            }
            StorageBackend::MinIO {
                endpoint,
                bucket,
                access_key,
                secret_key,
                use_ssl,
            } => {
                let endpoint = if endpoint.contains("://") {
                    endpoint.clone()
                } else if *use_ssl {
                    format!("https://{}", endpoint)
                } else {
                    format!("http://{}", endpoint)
                };
                S3Config::minio(endpoint, access_key, secret_key, bucket)
            }
        };

        let adapter = create_s3_store(&config).map_err(|e| AppError::StorageInit {
            message: format!("{:#}", e),
        })?;
        Ok(Arc::new(adapter))
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    StorageInit { message: String },
}

/// Convenience functions for common configurations
///
/// Create an in-memory application for testing and development
pub async fn create_in_memory_app(bucket: &str) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::InMemory {
            bucket: bucket.to_string(),
        })
        .build()
        .await
}

/// Create a MinIO-backed application
pub async fn create_minio_app(
    endpoint: String,
    bucket: String,
    access_key: String,
    secret_key: String,
    use_ssl: bool,
) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::MinIO {
            endpoint,
            bucket,
            access_key,
            secret_key,
            use_ssl,
        })
        .build()
        .await
}

/// Create an S3-backed application
pub async fn create_s3_app(
    bucket: String,
    region: String,
    access_key: Option<String>,
    secret_key: Option<String>,
    session_token: Option<String>,
) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_storage_backend(StorageBackend::S3 {
            bucket,
            region,
            access_key,
            secret_key,
            session_token,
            endpoint: None,
        })
        .build()
        .await
}

/// Create application from environment variables
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_config(AppConfig::from_env()?)
        .build()
        .await
}
