use std::{future::Future, time::Duration};

use crate::domain::errors::{EngineError, EngineResult};

/// Run one provider call under `limit`; expiry becomes [`EngineError::Timeout`]
pub(crate) async fn bounded<T, F>(operation: &str, limit: Duration, call: F) -> EngineResult<T>
where
    F: Future<Output = EngineResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::Timeout {
            operation: operation.to_string(),
            after: limit,
        }),
    }
}
