//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound how long a request worker waits on the upstream
//! - Turn an expired deadline into a distinct, reportable error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the wrapped future is dropped on expiry,
//!   which cancels the outbound call
//! - The deadline covers the response head only; a streamed body may run
//!   as long as the upstream keeps sending

use std::future::Future;
use std::time::Duration;

use crate::upstream::UpstreamError;

/// Run `fut`, failing with [`UpstreamError::Timeout`] after `deadline`.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::Timeout(deadline)),
    }
}
