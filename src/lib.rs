pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - value objects, models and errors
pub use domain::{
    // Models
    BatchResult,
    // Value objects
    BucketName,
    // Errors
    EngineError,
    EngineResult,
    EntryStatus,
    ErrorKind,
    Extension,
    ExtensionFilter,
    FingerprintKind,
    FolderListing,
    HashAlgorithm,
    LinkMethod,
    ObjectDescriptor,
    ObjectKey,
    Prefix,
    PresignedLink,
    PresignedLinkDescriptor,
    RenameOutcome,
    RenamePlan,
    RenamePlanEntry,
    RenamePreview,
    RenameRequest,
    ValidationError,
    VerificationRequest,
    VerificationResult,
};

// Port types - interfaces for external systems
pub use ports::{
    // Storage port
    ListPage,
    ListPageRequest,
    ObjectStore,
    // Service ports
    PresignedLinkService,
    RenameService,
    VerificationService,
};

// Service implementations - engine logic
pub use services::{
    EngineSettings, ObjectLister, PresignedLinkServiceImpl, RenameExecutor, RenameServiceImpl,
    StorageSession, VerificationServiceImpl, WalkStatus,
};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_in_memory_app, create_minio_app, create_s3_app, AppBuilder,
    AppConfig, AppError, AppServices, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{create_s3_store, ObjectStoreAdapter, S3Config};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_app, AppBuilder, AppServices, BucketName, EngineSettings, Extension,
        FingerprintKind, LinkMethod, ObjectKey, ObjectStore, ObjectStoreAdapter, Prefix,
        PresignedLinkService, RenameRequest, RenameService, StorageSession, VerificationRequest,
        VerificationService,
    };
    pub use tokio_util::sync::CancellationToken;
}
