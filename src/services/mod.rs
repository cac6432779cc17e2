mod executor;
mod lister;
pub mod planner;
mod presigned_link_service_impl;
mod rename_service_impl;
mod session;
mod settings;
mod timeout;
mod verification_service_impl;

pub use executor::RenameExecutor;
pub use lister::{ObjectLister, WalkStatus};
pub use presigned_link_service_impl::PresignedLinkServiceImpl;
pub use rename_service_impl::RenameServiceImpl;
pub use session::StorageSession;
pub use settings::EngineSettings;
pub use verification_service_impl::VerificationServiceImpl;
