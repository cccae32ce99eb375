// ABOUTME: Per-client request throttling for the coach chat endpoint
// ABOUTME: Minimum-interval limiter with injected state and caller-supplied clock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

//! # Chat Rate Limiting
//!
//! One upstream LLM call every [`ChatRateLimiter`] interval per client key.
//! The limiter holds its own state and receives the clock from the caller:
//! nothing here reads ambient time, so tests drive it with explicit
//! timestamps and two server instances never share hidden globals.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use coach_core::errors::{AppError, AppResult};

/// User-facing message returned when a client sends requests too fast
pub const RATE_LIMIT_MESSAGE: &str = "Trop de requêtes. Réessayez dans un instant.";

/// Minimum-interval rate limiter keyed by client identifier
///
/// A request is admitted when the client has no recorded request or the last
/// one is at least `min_interval` old. Admission records the supplied `now`;
/// rejected requests leave the recorded timestamp untouched so a burst cannot
/// push its own window forward.
#[derive(Debug)]
pub struct ChatRateLimiter {
    last_request: DashMap<String, DateTime<Utc>>,
    min_interval: Duration,
}

impl ChatRateLimiter {
    /// Create a limiter admitting one request per `min_interval` per client
    #[must_use]
    pub fn new(min_interval: std::time::Duration) -> Self {
        Self {
            last_request: DashMap::new(),
            min_interval: Duration::from_std(min_interval)
                .unwrap_or_else(|_| Duration::seconds(2)),
        }
    }

    /// Admit or reject a request from `client_key` at time `now`
    ///
    /// # Errors
    ///
    /// Returns [`AppError::rate_limit_exceeded`] with the user-facing French
    /// message when the client's previous request is too recent.
    pub fn check(&self, client_key: &str, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(last) = self.last_request.get(client_key) {
            if now - *last < self.min_interval {
                debug!(client = client_key, "request rejected by rate limiter");
                return Err(AppError::rate_limit_exceeded(RATE_LIMIT_MESSAGE));
            }
        }
        self.last_request.insert(client_key.to_owned(), now);
        Ok(())
    }

    /// Number of client keys currently tracked
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.last_request.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::errors::ErrorCode;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn first_request_is_admitted() {
        let limiter = ChatRateLimiter::new(std::time::Duration::from_secs(2));
        assert!(limiter.check("client-a", at(0)).is_ok());
    }

    #[test]
    fn request_inside_the_interval_is_rejected() {
        let limiter = ChatRateLimiter::new(std::time::Duration::from_secs(2));
        limiter.check("client-a", at(0)).unwrap();
        let err = limiter.check("client-a", at(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::RateLimitExceeded);
        assert_eq!(err.message, RATE_LIMIT_MESSAGE);
    }

    #[test]
    fn request_after_the_interval_is_admitted() {
        let limiter = ChatRateLimiter::new(std::time::Duration::from_secs(2));
        limiter.check("client-a", at(0)).unwrap();
        assert!(limiter.check("client-a", at(2)).is_ok());
    }

    #[test]
    fn clients_are_throttled_independently() {
        let limiter = ChatRateLimiter::new(std::time::Duration::from_secs(2));
        limiter.check("client-a", at(0)).unwrap();
        assert!(limiter.check("client-b", at(0)).is_ok());
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn rejected_requests_do_not_extend_the_window() {
        let limiter = ChatRateLimiter::new(std::time::Duration::from_secs(2));
        limiter.check("client-a", at(0)).unwrap();
        // A rejected burst at t=1 must not push the window past t=2
        assert!(limiter.check("client-a", at(1)).is_err());
        assert!(limiter.check("client-a", at(2)).is_ok());
    }
}
