//! Retry logic for idempotent relay calls.
//!
//! # Design Decisions
//! - Never retry POST (skeleton builds and broadcasts go out exactly once)
//! - Only transport failures are retried; a server answer is final
//! - Jittered backoff prevents thundering herd

use reqwest::Method;
use std::future::Future;

use crate::config::RetryConfig;
use crate::relay::error::RelayResult;
use crate::resilience::backoff::retry_delay;

/// Whether a request with this method may be repeated safely.
pub fn is_retryable(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Run `op`, retrying transport failures when `method` is idempotent.
pub async fn with_retries<T, F, Fut>(
    method: &Method,
    config: &RetryConfig,
    mut op: F,
) -> RelayResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RelayResult<T>>,
{
    let max_attempts = if config.enabled && is_retryable(method) {
        config.max_attempts.max(1)
    } else {
        1
    };

    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if attempt < max_attempts && e.is_transient() => {
                let delay = retry_delay(attempt, config);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient relay error, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::error::RelayError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy() -> RetryConfig {
        RetryConfig {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 2,
        }
    }

    fn network_error() -> RelayError {
        RelayError::Network {
            message: "connection reset".to_string(),
            connect: false,
        }
    }

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(&Method::GET));
        assert!(is_retryable(&Method::HEAD));
        assert!(!is_retryable(&Method::POST));
        assert!(!is_retryable(&Method::PUT));
    }

    #[tokio::test]
    async fn test_get_retried_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = with_retries(&Method::GET, &fast_policy(), move || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(network_error())
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_post_never_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: RelayResult<()> = with_retries(&Method::POST, &fast_policy(), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(network_error())
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_answers_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: RelayResult<()> = with_retries(&Method::GET, &fast_policy(), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(RelayError::Protocol {
                    status: 404,
                    message: "not found".to_string(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: RelayResult<()> = with_retries(&Method::GET, &fast_policy(), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(RelayError::Timeout("slow".to_string()))
            }
        })
        .await;
        assert!(matches!(result, Err(RelayError::Timeout(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
