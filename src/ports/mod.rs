pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use services::{PresignedLinkService, RenameService, VerificationService};
pub use storage::{ByteStream, ListPage, ListPageRequest, ObjectStore};
