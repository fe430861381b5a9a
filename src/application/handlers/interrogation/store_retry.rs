//! Store calls with a single retry on transient failure.

use std::future::Future;

use crate::domain::foundation::SessionId;
use crate::ports::StoreError;

/// Runs `op`, repeating it once if the first failure is transient.
pub async fn with_store_retry<T, F, Fut>(
    operation: &'static str,
    session_id: &SessionId,
    mut op: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    match op().await {
        Err(err) if err.is_transient() => {
            tracing::warn!(
                session_id = %session_id,
                operation,
                error = %err,
                "Transient store failure, retrying once"
            );
            op().await
        }
        other => other,
    }
}
