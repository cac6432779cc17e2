use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::ObjectKey;

/// Snapshot of one object as reported by the storage provider at listing
/// time. The etag is opaque: it may be a plain MD5 or a multipart composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectDescriptor {
    pub key: ObjectKey,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub etag: Option<String>,
}
