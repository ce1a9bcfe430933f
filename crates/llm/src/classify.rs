//! Backend error classification and retry delays.
//!
//! Providers do not share an error taxonomy, so failures are bucketed by
//! case-insensitive substring matches on the error text.

use std::time::Duration;

/// Substrings marking an exhausted quota, billing or balance problem.
pub const CREDIT_ERROR_KEYWORDS: &[&str] = &[
    "insufficient",
    "quota",
    "credit",
    "payment",
    "billing",
    "limit",
    "exceeded",
    "402",
    "balance",
];

/// Substrings marking request throttling.
pub const RATE_LIMIT_KEYWORDS: &[&str] = &["rate limit", "too many requests", "429", "throttle"];

/// Outcome of classifying a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Quota or billing exhausted; switch models immediately.
    Credit,
    /// Throttled; retry with exponential backoff.
    RateLimit,
    /// Anything else; retry after a flat delay.
    Other,
}

/// Classify an error message. Credit keywords win over rate-limit ones,
/// so "rate limit exceeded" is a credit error.
pub fn classify_error(message: &str) -> ErrorClass {
    let lower = message.to_lowercase();

    if CREDIT_ERROR_KEYWORDS.iter().any(|k| lower.contains(k)) {
        ErrorClass::Credit
    } else if RATE_LIMIT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        ErrorClass::RateLimit
    } else {
        ErrorClass::Other
    }
}

/// Delay before retrying after a failure of `class` on zero-based `attempt`.
///
/// Rate limits back off as `base * 2^attempt`; other errors wait `base`.
/// Credit errors never wait because they switch models instead.
pub fn backoff_delay(class: ErrorClass, attempt: u32, base: Duration) -> Duration {
    match class {
        ErrorClass::Credit => Duration::ZERO,
        ErrorClass::RateLimit => {
            let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
            base.saturating_mul(factor)
        }
        ErrorClass::Other => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_errors() {
        for msg in [
            "OpenAI API error 402 Payment Required: insufficient credits",
            "You exceeded your current quota",
            "Billing hard limit reached",
            "Account balance is zero",
            "INSUFFICIENT_FUNDS",
        ] {
            assert_eq!(classify_error(msg), ErrorClass::Credit, "{msg}");
        }
    }

    #[test]
    fn rate_limit_errors() {
        for msg in [
            "OpenAI API error 429 Too Many Requests",
            "request was throttled",
            "TOO MANY REQUESTS",
        ] {
            assert_eq!(classify_error(msg), ErrorClass::RateLimit, "{msg}");
        }
    }

    #[test]
    fn credit_wins_over_rate_limit() {
        assert_eq!(classify_error("rate limit exceeded"), ErrorClass::Credit);
        assert_eq!(classify_error("429: quota"), ErrorClass::Credit);
    }

    #[test]
    fn other_errors() {
        for msg in [
            "OpenAI API error 500 Internal Server Error",
            "connection reset by peer",
            "",
        ] {
            assert_eq!(classify_error(msg), ErrorClass::Other, "{msg}");
        }
    }

    #[test]
    fn rate_limit_backoff_doubles() {
        let base = Duration::from_millis(100);
        let delays: Vec<_> = (0..3)
            .map(|attempt| backoff_delay(ErrorClass::RateLimit, attempt, base))
            .collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
    }

    #[test]
    fn other_backoff_is_flat() {
        let base = Duration::from_millis(250);
        for attempt in 0..4 {
            assert_eq!(backoff_delay(ErrorClass::Other, attempt, base), base);
        }
    }

    #[test]
    fn credit_never_waits() {
        assert_eq!(
            backoff_delay(ErrorClass::Credit, 3, Duration::from_secs(1)),
            Duration::ZERO
        );
    }

    #[test]
    fn huge_attempt_saturates() {
        let delay = backoff_delay(ErrorClass::RateLimit, 64, Duration::from_secs(1));
        assert!(delay >= Duration::from_secs(u32::MAX as u64));
    }
}
