//! Retry-wrapped fetch with linear-multiplied backoff
//!
//! The transform endpoint derives assets on first request and can answer
//! 423/5xx while the derivation is still warming up, so the fetch retries a
//! bounded number of times. The delay before retry `n` (1-indexed) is
//! `base_delay * n` with no jitter, and every non-success response is
//! retried identically — there is no transient/permanent classification.
//! The final attempt's failure is propagated unchanged.

use crate::config::RetryConfig;
use crate::error::TransformError;

/// Fetch a URL, retrying on any failure, and return the response bytes
///
/// Performs up to `retry.max_attempts` GET requests. A non-success status
/// or a transport error triggers a wait of `base_delay * attempt` before
/// the next try; the last failure becomes the returned [`TransformError`].
pub async fn fetch_bytes_with_retry(
    client: &reqwest::Client,
    url: &str,
    retry: &RetryConfig,
) -> Result<Vec<u8>, TransformError> {
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let failure = match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    match response.bytes().await {
                        Ok(bytes) => {
                            if attempt > 1 {
                                tracing::info!(url, attempt, "fetch succeeded after retry");
                            }
                            return Ok(bytes.to_vec());
                        }
                        Err(e) => TransformError::Request {
                            url: url.to_string(),
                            reason: e.to_string(),
                            attempts: attempt,
                        },
                    }
                } else {
                    TransformError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                        attempts: attempt,
                    }
                }
            }
            Err(e) => TransformError::Request {
                url: url.to_string(),
                reason: e.to_string(),
                attempts: attempt,
            },
        };

        if attempt >= retry.max_attempts {
            tracing::error!(
                url,
                attempts = attempt,
                error = %failure,
                "fetch failed after all attempts"
            );
            return Err(failure);
        }

        let delay = retry.base_delay * attempt;
        tracing::warn!(
            url,
            attempt,
            max_attempts = retry.max_attempts,
            delay_ms = delay.as_millis(),
            error = %failure,
            "fetch failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
