//! HTTP retry helper for tile requests.
//!
//! Retries connection failures, timeouts, HTTP 429 and HTTP 5xx with
//! exponential backoff. Other 4xx responses are permanent and returned
//! immediately as [`SurfaceError::Status`] so callers can treat 404 as
//! "no data".

use std::time::Duration;

use crate::SurfaceError;

/// Delay before the first retry; doubles on each further attempt.
const BASE_DELAY: Duration = Duration::from_millis(500);

/// Sends the request built by `build_request`, retrying transient
/// failures up to `max_retries` times. Returns the successful response.
///
/// The closure is called on every attempt because a
/// [`reqwest::RequestBuilder`] is consumed by `send()`.
///
/// # Errors
///
/// Returns [`SurfaceError::Http`] for transport errors and
/// [`SurfaceError::Status`] for non-success statuses once retries are
/// exhausted or the status is not retryable.
pub async fn send_with_retry<F>(
    build_request: F,
    max_retries: u32,
) -> Result<reqwest::Response, SurfaceError>
where
    F: Fn() -> reqwest::RequestBuilder + Send + Sync,
{
    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::debug!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    continue;
                }
                return Err(SurfaceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status} from {}", response.url());
                        continue;
                    }
                    return Err(SurfaceError::Status {
                        status: status.as_u16(),
                    });
                }

                if status.is_client_error() {
                    return Err(SurfaceError::Status {
                        status: status.as_u16(),
                    });
                }

                return Ok(response);
            }
        }
    }

    unreachable!("send_with_retry loop exited without returning")
}

fn backoff(attempt: u32) -> Duration {
    BASE_DELAY * 2u32.saturating_pow(attempt.saturating_sub(1))
}

/// Total sleep between attempts when all `max_retries` retries run.
pub fn total_backoff(max_retries: u32) -> Duration {
    (1..=max_retries).map(backoff).sum()
}

/// Returns `true` if the error is likely transient and worth retrying.
///
/// Builder errors (bad URL, invalid header) fail the same way every time.
fn is_transient(e: &reqwest::Error) -> bool {
    !e.is_builder() && (e.is_timeout() || e.is_connect() || e.is_body())
}
