//! Bounded retry with a fixed delay.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use bazaar_core::result::AppResult;

/// Run `op`, retrying up to `max_retries` more times with `delay` between
/// attempts. The last error is returned once retries are exhausted.
pub async fn retry_with_delay<T, F, Fut>(
    label: &str,
    max_retries: u32,
    delay: Duration,
    mut op: F,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_retries => {
                attempt += 1;
                warn!(
                    operation = label,
                    attempt,
                    max_retries,
                    error = %e,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
