// ABOUTME: Chat pipeline configuration with production defaults
// ABOUTME: Request guardrails, timeouts, and model parameter bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

use std::time::Duration;

use crate::llm::CompletionSettings;

/// Tunable limits for the chat pipeline
///
/// Defaults reproduce the production guardrails. Injected into the
/// orchestrator so deployments (and tests) can tighten or relax them without
/// touching code.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Upper bound on one upstream LLM call
    pub request_timeout: Duration,
    /// Minimum delay between two requests from the same client
    pub min_request_interval: Duration,
    /// Per-message character cap
    pub max_message_chars: usize,
    /// Cap on the summed length of all messages in a request
    pub max_total_chars: usize,
    /// Hard ceiling on requested output tokens
    pub max_output_tokens: u32,
    /// Output token budget used when the caller does not ask for more
    pub default_output_tokens: u32,
    /// Low temperature keeps the coach factual rather than creative
    pub default_temperature: f32,
    /// Cap on the injected user-context block
    pub max_context_chars: usize,
    /// Only the most recent messages are forwarded upstream
    pub history_limit: usize,
}

impl ChatConfig {
    /// Production guardrail values
    #[must_use]
    pub const fn new() -> Self {
        Self {
            request_timeout: Duration::from_secs(20),
            min_request_interval: Duration::from_secs(2),
            max_message_chars: 4000,
            max_total_chars: 6000,
            max_output_tokens: 2048,
            default_output_tokens: 512,
            default_temperature: 0.2,
            max_context_chars: 2000,
            history_limit: 50,
        }
    }

    /// Decoding settings for one completion, client requests clamped into range
    ///
    /// Absent requests fall back to the factual defaults; out-of-range
    /// requests are clamped rather than rejected.
    #[must_use]
    pub fn completion_settings(
        &self,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> CompletionSettings {
        CompletionSettings {
            temperature: temperature.map_or(self.default_temperature, |t| t.clamp(0.0, 1.0)),
            max_output_tokens: max_tokens.map_or(
                self.default_output_tokens.min(self.max_output_tokens),
                |t| t.clamp(1, self.max_output_tokens),
            ),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_guardrails() {
        let config = ChatConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert_eq!(config.min_request_interval, Duration::from_secs(2));
        assert_eq!(config.max_message_chars, 4000);
        assert_eq!(config.history_limit, 50);
    }

    #[test]
    fn temperature_is_clamped_into_range() {
        let config = ChatConfig::default();
        let hot = config.completion_settings(Some(3.0), None);
        assert!((hot.temperature - 1.0).abs() < f32::EPSILON);
        let cold = config.completion_settings(Some(-1.0), None);
        assert!(cold.temperature.abs() < f32::EPSILON);
        let default = config.completion_settings(None, None);
        assert!((default.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn output_tokens_are_clamped_into_range() {
        let config = ChatConfig::default();
        assert_eq!(
            config.completion_settings(None, Some(100_000)).max_output_tokens,
            2048
        );
        assert_eq!(config.completion_settings(None, Some(0)).max_output_tokens, 1);
        assert_eq!(config.completion_settings(None, None).max_output_tokens, 512);
    }
}
