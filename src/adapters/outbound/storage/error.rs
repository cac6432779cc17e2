use crate::domain::errors::EngineError;

/// Convert an `object_store` error raised while running `operation` on `key`
/// into the engine's error taxonomy
pub fn map_store_error(operation: &str, key: &str, err: object_store::Error) -> EngineError {
    match err {
        object_store::Error::NotFound { .. } => EngineError::NotFound {
            key: key.to_string(),
        },
        object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. } => EngineError::PermissionDenied {
            key: key.to_string(),
            operation: operation.to_string(),
        },
        object_store::Error::NotSupported { .. } | object_store::Error::NotImplemented => {
            EngineError::provider(operation, format!("operation not supported: {}", err))
        }
        object_store::Error::InvalidPath { .. } => {
            EngineError::invalid_input(format!("invalid object path '{}': {}", key, err))
        }
        _ => {
            let message = err.to_string();
            // some S3-compatible providers only surface denial in the error body
            if message.contains("AccessDenied") || message.contains("403 Forbidden") {
                EngineError::PermissionDenied {
                    key: key.to_string(),
                    operation: operation.to_string(),
                }
            } else {
                EngineError::provider(operation, message)
            }
        }
    }
}
