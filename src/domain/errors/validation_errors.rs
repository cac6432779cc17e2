/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // ObjectKey validation errors
    EmptyObjectKey,
    ObjectKeyTooLong {
        actual: usize,
        max: usize,
    },
    InvalidObjectKeyCharacter(char),
    ObjectKeyStartsWithSlash,
    ObjectKeyContainsDoubleSlash,

    // BucketName validation errors
    BucketNameTooShort {
        actual: usize,
        min: usize,
    },
    BucketNameTooLong {
        actual: usize,
        max: usize,
    },
    BucketNameInvalidStart,
    BucketNameInvalidEnd,
    BucketNameInvalidCharacter(char),
    BucketNameConsecutiveDots,
    BucketNameInvalidLabel(String),
    BucketNameReserved(String),
    BucketNameLooksLikeIpAddress,

    // Prefix validation errors
    PrefixRequired,
    PrefixStartsWithSlash,
    PrefixContainsDoubleSlash,

    // Extension validation errors
    EmptyExtension,
    ExtensionContainsSeparator(String),
    ExtensionContainsWhitespace(String),
    IdenticalExtensions(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ObjectKey errors
            ValidationError::EmptyObjectKey => write!(f, "Object key cannot be empty"),
            ValidationError::ObjectKeyTooLong { actual, max } => {
                write!(f, "Object key too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidObjectKeyCharacter(c) => {
                write!(f, "Invalid character in object key: {:?}", c)
            }
            ValidationError::ObjectKeyStartsWithSlash => {
                write!(f, "Object key cannot start with '/'")
            }
            ValidationError::ObjectKeyContainsDoubleSlash => {
                write!(f, "Object key cannot contain '//'")
            }

            // BucketName errors
            ValidationError::BucketNameTooShort { actual, min } => {
                write!(
                    f,
                    "Bucket name too short: {} characters (min: {})",
                    actual, min
                )
            }
            ValidationError::BucketNameTooLong { actual, max } => {
                write!(
                    f,
                    "Bucket name too long: {} characters (max: {})",
                    actual, max
                )
            }
            ValidationError::BucketNameInvalidStart => {
                write!(f, "Bucket name must start with lowercase letter or number")
            }
            ValidationError::BucketNameInvalidEnd => {
                write!(f, "Bucket name must end with lowercase letter or number")
            }
            ValidationError::BucketNameInvalidCharacter(c) => {
                write!(
                    f,
                    "Invalid character in bucket name: '{}'. Only lowercase letters, numbers, dots and hyphens allowed",
                    c
                )
            }
            ValidationError::BucketNameConsecutiveDots => {
                write!(f, "Bucket name cannot contain consecutive dots")
            }
            ValidationError::BucketNameInvalidLabel(label) => {
                write!(
                    f,
                    "Bucket name label '{}' must start and end with a lowercase letter or number",
                    label
                )
            }
            ValidationError::BucketNameReserved(part) => {
                write!(f, "Bucket name cannot use the reserved '{}'", part)
            }
            ValidationError::BucketNameLooksLikeIpAddress => {
                write!(f, "Bucket name cannot be formatted as an IP address")
            }

            // Prefix errors
            ValidationError::PrefixRequired => write!(f, "A non-empty prefix is required"),
            ValidationError::PrefixStartsWithSlash => write!(f, "Prefix cannot start with '/'"),
            ValidationError::PrefixContainsDoubleSlash => {
                write!(f, "Prefix cannot contain '//'")
            }

            // Extension errors
            ValidationError::EmptyExtension => write!(f, "Extension cannot be empty"),
            ValidationError::ExtensionContainsSeparator(ext) => {
                write!(f, "Extension '{}' cannot contain '/'", ext)
            }
            ValidationError::ExtensionContainsWhitespace(ext) => {
                write!(f, "Extension '{}' cannot contain whitespace", ext)
            }
            ValidationError::IdenticalExtensions(ext) => {
                write!(
                    f,
                    "Old and new extension both normalize to '{}'; nothing to rename",
                    ext
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
