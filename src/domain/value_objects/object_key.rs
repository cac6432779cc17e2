use serde::Serialize;

use crate::domain::errors::ValidationError;
use crate::domain::value_objects::Extension;

const MAX_KEY_BYTES: usize = 1024;

/// A validated object key (path) in the storage system
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new ObjectKey with validation
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.len() > MAX_KEY_BYTES {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: value.len(),
                max: MAX_KEY_BYTES,
            });
        }

        if value.contains('\0') {
            return Err(ValidationError::InvalidObjectKeyCharacter('\0'));
        }

        if value.starts_with('/') {
            return Err(ValidationError::ObjectKeyStartsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::ObjectKeyContainsDoubleSlash);
        }

        Ok(Self(value))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the directory part of the key (everything before the last '/')
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..idx])
    }

    /// Get the file name part of the key (everything after the last '/')
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }

    /// Keys ending in '/' are zero-byte folder placeholders, not files
    pub fn is_folder_marker(&self) -> bool {
        self.0.ends_with('/')
    }

    pub fn has_extension(&self, extension: &Extension) -> bool {
        self.0.ends_with(extension.as_str())
    }

    /// Swap the trailing `old` extension for `new`, keeping the directory
    /// component untouched. Returns `None` when the key does not end in `old`.
    pub fn with_extension_replaced(
        &self,
        old: &Extension,
        new: &Extension,
    ) -> Option<Result<ObjectKey, ValidationError>> {
        let stem = self.0.strip_suffix(old.as_str())?;
        Some(ObjectKey::new(format!("{}{}", stem, new.as_str())))
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
