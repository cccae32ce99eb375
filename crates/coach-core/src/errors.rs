// ABOUTME: Unified error handling for the coach platform
// ABOUTME: Standard error codes, AppError with request correlation, and AppResult alias
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

//! # Unified Error Handling System
//!
//! Centralized error types shared by every crate in the workspace. The
//! intelligence core itself never fails — missing data degrades by omission —
//! so `AppError` is the currency of the orchestration layer: input
//! validation, rate limiting, and upstream LLM failures.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Request payload failed validation
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
    /// Client exceeded the per-client request rate
    #[serde(rename = "RATE_LIMIT_EXCEEDED")]
    RateLimitExceeded,
    /// The upstream AI service returned an error
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError,
    /// The upstream AI service did not answer in time
    #[serde(rename = "EXTERNAL_TIMEOUT")]
    ExternalTimeout,
    /// Server-side configuration problem
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError,
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// Human-readable description of this error code
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::RateLimitExceeded => "Rate limit exceeded",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalTimeout => "An external service did not respond in time",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal error occurred",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Request ID for log correlation, when known
    pub request_id: Option<String>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            request_id: None,
            source: None,
        }
    }

    /// Attach a request ID for log correlation
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Attach a source error for chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Invalid request input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Per-client rate limit exceeded
    #[must_use]
    pub fn rate_limit_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimitExceeded, message)
    }

    /// Upstream AI service failure
    #[must_use]
    pub fn external(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalServiceError, message)
    }

    /// Upstream AI service timeout
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalTimeout, message)
    }

    /// Configuration problem
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Unexpected internal failure
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_description() {
        let err = AppError::invalid_input("message too long");
        assert_eq!(
            err.to_string(),
            "The provided input is invalid: message too long"
        );
    }

    #[test]
    fn request_id_is_carried() {
        let err = AppError::timeout("no answer after 20s").with_request_id("req-42");
        assert_eq!(err.request_id.as_deref(), Some("req-42"));
        assert_eq!(err.code, ErrorCode::ExternalTimeout);
    }
}
