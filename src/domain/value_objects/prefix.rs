use serde::Serialize;

use crate::domain::errors::ValidationError;

/// A "directory" within a bucket. Non-empty prefixes always end in `/`;
/// the empty prefix is the bucket root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Prefix(String);

impl Prefix {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let value = value.as_ref().trim();

        if value.is_empty() {
            return Ok(Self::root());
        }

        if value.starts_with('/') {
            return Err(ValidationError::PrefixStartsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::PrefixContainsDoubleSlash);
        }

        if value.ends_with('/') {
            Ok(Self(value.to_string()))
        } else {
            Ok(Self(format!("{}/", value)))
        }
    }

    /// Same as [`Prefix::new`] but refuses the bucket root
    pub fn non_empty(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let prefix = Self::new(value)?;
        if prefix.is_root() {
            return Err(ValidationError::PrefixRequired);
        }
        Ok(prefix)
    }

    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part of `key` below this prefix, if `key` lives under it
    pub fn relative<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.0.as_str())
    }

    /// Whether `key` sits directly under this prefix, not in a sub-prefix
    pub fn is_direct_child(&self, key: &str) -> bool {
        self.relative(key)
            .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
    }
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_separator_is_added() {
        assert_eq!(Prefix::new("photos").unwrap().as_str(), "photos/");
        assert_eq!(Prefix::new("photos/").unwrap().as_str(), "photos/");
        assert!(Prefix::new("").unwrap().is_root());
    }

    #[test]
    fn test_invalid_prefixes() {
        assert_eq!(
            Prefix::new("/photos"),
            Err(ValidationError::PrefixStartsWithSlash)
        );
        assert!(Prefix::new("a//b").is_err());
        assert_eq!(Prefix::non_empty(""), Err(ValidationError::PrefixRequired));
    }

    #[test]
    fn test_direct_children() {
        let prefix = Prefix::new("photos").unwrap();
        assert!(prefix.is_direct_child("photos/a.txt"));
        assert!(!prefix.is_direct_child("photos/2024/a.txt"));
        assert!(!prefix.is_direct_child("videos/a.txt"));
        assert!(Prefix::root().is_direct_child("a.txt"));
    }
}
