use serde::Serialize;

use crate::domain::errors::ValidationError;

/// A file-name extension, always stored with its leading dot.
///
/// `txt` and `.txt` both normalize to `.txt`. Matching against keys is an
/// exact, case-sensitive suffix comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Extension(String);

impl Extension {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref();
        let bare = raw.strip_prefix('.').unwrap_or(raw);

        if bare.is_empty() {
            return Err(ValidationError::EmptyExtension);
        }

        if bare.contains('/') {
            return Err(ValidationError::ExtensionContainsSeparator(raw.to_string()));
        }

        if bare.chars().any(char::is_whitespace) {
            return Err(ValidationError::ExtensionContainsWhitespace(raw.to_string()));
        }

        Ok(Self(format!(".{}", bare)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate an old/new pair for a rename. Identical suffixes would
    /// produce self-copies, so they are rejected up front.
    pub fn rename_pair(
        old: impl AsRef<str>,
        new: impl AsRef<str>,
    ) -> Result<(Extension, Extension), ValidationError> {
        let old = Extension::new(old)?;
        let new = Extension::new(new)?;
        if old == new {
            return Err(ValidationError::IdenticalExtensions(old.0));
        }
        Ok((old, new))
    }
}

impl std::fmt::Display for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
