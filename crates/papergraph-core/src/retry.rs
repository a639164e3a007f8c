//! Fixed-delay retry for rate-limited API calls

use std::time::Duration;

use crate::http::{HttpError, http_config};

/// How many times to retry a rate-limited call, and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Policy from the process-wide [`HttpConfig`](crate::http::HttpConfig)
    pub fn from_config() -> Self {
        let config = http_config();
        Self {
            max_retries: config.max_retries,
            delay: config.retry_delay,
        }
    }
}

/// Run `attempt_fn`, retrying only when it fails with HTTP 429.
///
/// Any other error is returned immediately. After `max_retries` retries
/// the last 429 error is returned.
pub fn retry_rate_limited<T>(
    label: &str,
    policy: &RetryPolicy,
    mut attempt_fn: impl FnMut() -> Result<T, HttpError>,
) -> Result<T, HttpError> {
    let mut retries = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_rate_limited() && retries < policy.max_retries => {
                retries += 1;
                log::warn!(
                    "{label}: rate limited, waiting {:?} before retry {retries}/{}",
                    policy.delay,
                    policy.max_retries
                );
                std::thread::sleep(policy.delay);
            }
            Err(e) => {
                log::error!("{label}: request failed: {e}");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: RetryPolicy = RetryPolicy {
        max_retries: 3,
        delay: Duration::ZERO,
    };

    fn status(code: u16) -> HttpError {
        HttpError::from_status(code, "test")
    }

    #[test]
    fn succeeds_after_rate_limits() {
        let mut calls = 0;
        let result = retry_rate_limited("t", &FAST, || {
            calls += 1;
            if calls < 3 { Err(status(429)) } else { Ok(calls) }
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn gives_up_after_max_retries() {
        let mut calls = 0;
        let result: Result<(), _> = retry_rate_limited("t", &FAST, || {
            calls += 1;
            Err(status(429))
        });
        assert!(result.unwrap_err().is_rate_limited());
        // first attempt + 3 retries
        assert_eq!(calls, 4);
    }

    #[test]
    fn other_status_fails_immediately() {
        let mut calls = 0;
        let result: Result<(), _> = retry_rate_limited("t", &FAST, || {
            calls += 1;
            Err(status(503))
        });
        assert_eq!(result.unwrap_err().status(), Some(503));
        assert_eq!(calls, 1);
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let policy = RetryPolicy {
            max_retries: 0,
            delay: Duration::ZERO,
        };
        let mut calls = 0;
        let _ = retry_rate_limited::<()>("t", &policy, || {
            calls += 1;
            Err(status(429))
        });
        assert_eq!(calls, 1);
    }
}
