// Provider error mapping
pub mod error;

// Port implementation over the object_store crate
pub mod object_store_adapter;

// Provider-specific builders
pub mod s3;

pub use error::map_store_error;
pub use object_store_adapter::ObjectStoreAdapter;
pub use s3::{create_s3_store, S3Config};
