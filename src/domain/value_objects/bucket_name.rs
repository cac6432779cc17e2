use serde::Serialize;

use crate::domain::errors::ValidationError;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 63;

/// Prefixes and suffixes S3 keeps for access points and internal names
const RESERVED_PREFIXES: &[&str] = &["xn--", "sthree-", "amzn-s3-demo-"];
const RESERVED_SUFFIXES: &[&str] = &["-s3alias", "--ol-s3", "--x-s3"];

/// Name of the bucket a session is bound to.
///
/// Follows the S3 general purpose bucket rules, which MinIO also enforces:
/// 3 to 63 characters of lowercase letters, digits, hyphens and dots, where
/// every dot-separated label starts and ends with a letter or digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BucketName(String);

impl BucketName {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.len() < MIN_LEN {
            return Err(ValidationError::BucketNameTooShort {
                actual: value.len(),
                min: MIN_LEN,
            });
        }
        if value.len() > MAX_LEN {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max: MAX_LEN,
            });
        }

        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
        {
            return Err(ValidationError::BucketNameInvalidCharacter(c));
        }

        if !value.starts_with(is_alphanumeric) {
            return Err(ValidationError::BucketNameInvalidStart);
        }
        if !value.ends_with(is_alphanumeric) {
            return Err(ValidationError::BucketNameInvalidEnd);
        }

        for label in value.split('.') {
            if label.is_empty() {
                return Err(ValidationError::BucketNameConsecutiveDots);
            }
            // `a-.b` and `a.-b` put a hyphen next to the dot
            if !label.starts_with(is_alphanumeric) || !label.ends_with(is_alphanumeric) {
                return Err(ValidationError::BucketNameInvalidLabel(label.to_string()));
            }
        }

        if let Some(reserved) = RESERVED_PREFIXES
            .iter()
            .find(|p| value.starts_with(*p))
            .or_else(|| RESERVED_SUFFIXES.iter().find(|s| value.ends_with(*s)))
        {
            return Err(ValidationError::BucketNameReserved(reserved.to_string()));
        }

        if looks_like_ip_address(&value) {
            return Err(ValidationError::BucketNameLooksLikeIpAddress);
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_alphanumeric(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

fn looks_like_ip_address(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == 4 && parts.iter().all(|part| part.parse::<u8>().is_ok())
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
