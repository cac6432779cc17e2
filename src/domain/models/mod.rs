pub mod filter;
pub mod listing;
pub mod object;
pub mod presigned;
pub mod rename;
pub mod verification;

pub use filter::ExtensionFilter;
pub use listing::{FileEntry, FolderEntry, FolderListing, Listing};
pub use object::ObjectDescriptor;
pub use presigned::{LinkMethod, PresignedLink, PresignedLinkDescriptor, SignatureVersion};
pub use rename::{
    BatchResult, EntryStatus, ExcludedKey, ExclusionReason, RenameOutcome, RenamePlan,
    RenamePlanEntry, RenamePreview, RenameRequest,
};
pub use verification::{
    FingerprintKind, HashAlgorithm, VerificationRequest, VerificationResult, normalize_etag,
};
