use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

pub(crate) const RATE_LIMIT_MAX_RETRIES: usize = 3;
pub(crate) const RATE_LIMIT_BASE_DELAY: Duration = Duration::from_secs(1);
pub(crate) const RATE_LIMIT_MAX_DELAY: Duration = Duration::from_secs(8);

pub(crate) struct RetryPolicy {
    provider: &'static str,
    attempt: usize,
    delay: Duration,
}

impl RetryPolicy {
    pub(crate) fn new(provider: &'static str) -> Self {
        Self {
            provider,
            attempt: 0,
            delay: RATE_LIMIT_BASE_DELAY,
        }
    }

    pub(crate) async fn wait(&mut self, retry_after: Option<Duration>) -> bool {
        self.attempt += 1;
        if self.attempt >= RATE_LIMIT_MAX_RETRIES {
            return false;
        }
        let wait = retry_after
            .filter(|value| *value > self.delay)
            .unwrap_or(self.delay)
            .min(RATE_LIMIT_MAX_DELAY);
        warn!(
            "{} rate limited; retrying in {:.1}s (attempt {}/{})",
            self.provider,
            wait.as_secs_f32(),
            self.attempt,
            RATE_LIMIT_MAX_RETRIES
        );
        sleep(wait).await;
        self.delay = next_delay(self.delay);
        true
    }
}

pub(crate) fn is_rate_limited(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    let code = status.as_u16();
    if code == 529 || code == 503 {
        return true;
    }
    let lower = body.to_lowercase();
    lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("too many requests")
        || lower.contains("resource_exhausted")
        || lower.contains("overloaded")
}

pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get("retry-after")?.to_str().ok()?.trim();
    value.parse::<u64>().ok().map(Duration::from_secs)
}

fn next_delay(current: Duration) -> Duration {
    current.saturating_mul(2).min(RATE_LIMIT_MAX_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn detects_rate_limits_by_status_and_body() {
        assert!(is_rate_limited(StatusCode::TOO_MANY_REQUESTS, ""));
        assert!(is_rate_limited(StatusCode::SERVICE_UNAVAILABLE, ""));
        assert!(is_rate_limited(
            StatusCode::BAD_REQUEST,
            "{\"status\":\"RESOURCE_EXHAUSTED\"}"
        ));
        assert!(!is_rate_limited(StatusCode::UNAUTHORIZED, "invalid key"));
    }

    #[test]
    fn reads_numeric_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static(" 3 "));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(3)));
        headers.insert("retry-after", HeaderValue::from_static("soon"));
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn delay_doubles_up_to_cap() {
        assert_eq!(next_delay(Duration::from_secs(1)), Duration::from_secs(2));
        assert_eq!(next_delay(Duration::from_secs(6)), RATE_LIMIT_MAX_DELAY);
    }
}
