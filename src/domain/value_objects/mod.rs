mod bucket_name;
mod extension;
mod object_key;
mod prefix;

pub use bucket_name::BucketName;
pub use extension::Extension;
pub use object_key::ObjectKey;
pub use prefix::Prefix;
