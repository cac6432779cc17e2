mod presigned_link_service;
mod rename_service;
mod verification_service;

pub use presigned_link_service::PresignedLinkService;
pub use rename_service::RenameService;
pub use verification_service::VerificationService;
