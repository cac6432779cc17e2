use serde::Serialize;

use crate::domain::models::ObjectDescriptor;
use crate::domain::value_objects::Prefix;

/// Fully collected result of a listing run.
///
/// `cancelled` is set when the caller's cancellation signal cut the walk
/// short; `objects` then holds everything gathered up to that point.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    pub objects: Vec<ObjectDescriptor>,
    pub cancelled: bool,
}

impl Listing {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// A sub-prefix shown while browsing one level of a bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderEntry {
    pub name: String,
    pub full_path: String,
}

/// An object living directly under the browsed prefix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub full_path: String,
    pub size: u64,
}

/// One delimited level of a bucket, split into folders and files
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderListing {
    pub prefix: Prefix,
    pub folders: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
}
