// ABOUTME: The coach chat request/response cycle around the anti-hallucination engine
// ABOUTME: Preprocessing, rate limiting, LLM dispatch with timeout, validation, fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

//! # Chat Orchestration
//!
//! One chat turn, end to end: sanitize and bound the request, throttle the
//! client, assemble the adapted system prompt, dispatch to the configured LLM
//! under a timeout, cross-check the reply against the user's real activity
//! data, and substitute the honest fallback whenever the reply (or the
//! provider) fails. Transport failures and rejected replies collapse to the
//! same outward behavior: the user always receives a data-faithful answer.
//!
//! Both clocks are caller-supplied — the calendar date anchoring the data
//! windows and the instant driving the rate limiter — so a full turn is
//! reproducible in tests.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use coach_core::errors::{AppError, AppResult};
use coach_core::models::ActivitySession;
use coach_intelligence::fallback::{generate_fallback, FallbackFocus, FallbackOptions};
use coach_intelligence::response_validator::{validate, ValidationReport};

use crate::config::ChatConfig;
use crate::llm::{build_messages_with_system, ChatMessage, CompletionRequest, LlmProvider};
use crate::rate_limiting::ChatRateLimiter;

/// Deterministic reply served while the activity snapshot is still empty
pub const DATA_LOADING_REPLY: &str = "⏳ Données en cours de chargement...\n\n\
Mes données d'activité sont toujours en train de se charger. Réessayez dans quelques \
secondes pour une réponse plus précise sur vos graphiques.\n\n\
En attendant, je peux répondre à d'autres questions sur l'entraînement en général !";

/// Questions about the dashboard data, where replies must be validated
static CHART_QUESTION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)graphique|km|bpm|distance|cardiaque|performance|activit").ok());

/// Questions about heart rate specifically
static BPM_QUESTION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)bpm|cardiaque|rythme").ok());

/// Interrogative heart-rate questions that warrant a one-line answer
static SHORT_BPM_QUESTION_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:quels?|quelles?|quelle est|as-tu|donne)\b.*\b(?:bpm|rythme|cardiaque)")
        .ok()
});

/// The user asked for a plan or next steps
static ASKED_FOR_PLAN_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)plan|prochaine\s+[ée]tape|que faire|exemple de plan").ok());

/// The user asked for advice
static ASKED_FOR_ADVICE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)conseils?|que faire|comment faire|plan").ok());

/// An unsolicited "Prochaine étape" section and everything after it
static NEXT_STEPS_SECTION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)\n?\s*prochaines?\s+étapes?\b.*$").ok());

/// An unsolicited "**Conseils**" section and everything after it
static ADVICE_SECTION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)\n?\s*\*\*\s*conseils.*$").ok());

fn matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// One chat request from a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Stable identifier throttling this client (forwarded address or similar)
    pub client_key: String,
    /// Conversation so far, the user's question last
    pub messages: Vec<ChatMessage>,
    /// Grounding context block, sent on the conversation's first turn
    pub user_context: Option<String>,
    /// Requested sampling temperature, clamped into [0, 1]
    pub temperature: Option<f32>,
    /// Requested output token budget, clamped into the configured range
    pub max_tokens: Option<u32>,
}

impl ChatTurn {
    /// A turn with only the required fields
    #[must_use]
    pub fn new(client_key: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            client_key: client_key.into(),
            messages,
            user_context: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Attach the first-turn grounding context block
    #[must_use]
    pub fn with_user_context(mut self, context: impl Into<String>) -> Self {
        self.user_context = Some(context.into());
        self
    }
}

/// Where the final reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// The LLM's reply, validated where required
    Model,
    /// The deterministic honest fallback
    Fallback,
    /// The data-still-loading notice, LLM never called
    DataLoading,
}

/// Result of one orchestrated chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// Final reply delivered to the user
    pub reply: String,
    /// Where the reply came from
    pub source: ReplySource,
    /// Validation verdict, present when the question was about chart data
    pub validation: Option<ValidationReport>,
    /// Correlation id for logs
    pub request_id: String,
}

/// The chat request/response cycle
///
/// Owns the provider, the per-client rate limiter, and the pipeline
/// configuration. Everything else — activity snapshot, calendar date,
/// wall-clock instant — arrives with each call.
#[derive(Debug)]
pub struct ChatOrchestrator<P> {
    provider: P,
    rate_limiter: ChatRateLimiter,
    config: ChatConfig,
}

impl<P: LlmProvider> ChatOrchestrator<P> {
    /// Create an orchestrator around a provider with the given configuration
    #[must_use]
    pub fn new(provider: P, config: ChatConfig) -> Self {
        let rate_limiter = ChatRateLimiter::new(config.min_request_interval);
        Self {
            provider,
            rate_limiter,
            config,
        }
    }

    /// Run one chat turn end to end
    ///
    /// `activities` is the caller's snapshot of the user's sessions, `today`
    /// anchors the data windows, and `now` drives the rate limiter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::invalid_input`] when the request violates the
    /// configured guardrails and [`AppError::rate_limit_exceeded`] when the
    /// client is throttled. Upstream LLM failures are not errors: they
    /// degrade to the honest fallback.
    pub async fn handle_turn(
        &self,
        turn: ChatTurn,
        activities: &[ActivitySession],
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<ChatOutcome> {
        let request_id = Uuid::new_v4().to_string();

        let messages = self
            .preprocess(turn.messages)
            .map_err(|err| err.with_request_id(request_id.clone()))?;
        self.rate_limiter
            .check(&turn.client_key, now)
            .map_err(|err| err.with_request_id(request_id.clone()))?;

        let question = messages
            .iter()
            .rev()
            .find_map(|message| match message {
                ChatMessage::User(content) => Some(content.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let about_charts = matches(&CHART_QUESTION_PATTERN, &question);

        if about_charts && activities.is_empty() {
            info!(%request_id, "activity snapshot empty, serving data-loading reply");
            return Ok(ChatOutcome {
                reply: DATA_LOADING_REPLY.to_owned(),
                source: ReplySource::DataLoading,
                validation: None,
                request_id,
            });
        }

        let mut upstream = build_messages_with_system(&messages);
        let context = turn
            .user_context
            .as_deref()
            .map(|raw| bounded(&sanitize_text(raw), self.config.max_context_chars))
            .filter(|context| !context.is_empty());
        if let Some(context) = context.clone() {
            upstream.insert(1, ChatMessage::System(context));
        }

        info!(
            %request_id,
            msg_count = messages.len(),
            has_user_context = context.is_some(),
            about_charts,
            activity_count = activities.len(),
            "dispatching chat turn"
        );

        let request = CompletionRequest {
            messages: upstream,
            settings: self
                .config
                .completion_settings(turn.temperature, turn.max_tokens),
        };

        let reply =
            match tokio::time::timeout(self.config.request_timeout, self.provider.complete(&request))
                .await
            {
                Ok(Ok(content)) if !content.trim().is_empty() => content,
                Ok(Ok(_)) => {
                    warn!(%request_id, "provider returned an empty reply");
                    return Ok(self.fallback_outcome(activities, &question, today, None, request_id));
                }
                Ok(Err(err)) => {
                    warn!(%request_id, error = %err, "provider error, degrading to fallback");
                    return Ok(self.fallback_outcome(activities, &question, today, None, request_id));
                }
                Err(_) => {
                    warn!(
                        %request_id,
                        timeout_secs = self.config.request_timeout.as_secs(),
                        "provider timed out, degrading to fallback"
                    );
                    return Ok(self.fallback_outcome(activities, &question, today, None, request_id));
                }
            };

        let validation = about_charts.then(|| validate(&reply, activities, today));
        if let Some(report) = &validation {
            if !report.valid {
                info!(
                    %request_id,
                    issue_count = report.issues.len(),
                    "reply failed validation, substituting honest fallback"
                );
                return Ok(self.fallback_outcome(
                    activities,
                    &question,
                    today,
                    validation.clone(),
                    request_id,
                ));
            }
        }

        let reply = postprocess_reply(reply, &question);
        debug!(%request_id, "reply delivered from model");
        Ok(ChatOutcome {
            reply,
            source: ReplySource::Model,
            validation,
            request_id,
        })
    }

    /// Sanitize and bound an incoming conversation
    ///
    /// Only the most recent messages are kept, every message is stripped of
    /// control characters, and the configured per-message and total length
    /// caps are enforced.
    fn preprocess(&self, messages: Vec<ChatMessage>) -> AppResult<Vec<ChatMessage>> {
        if messages.is_empty() {
            return Err(AppError::invalid_input("Provide at least one message"));
        }

        let skip = messages.len().saturating_sub(self.config.history_limit);
        let mut sanitized = Vec::with_capacity(messages.len() - skip);
        let mut total_chars = 0;
        for message in messages.into_iter().skip(skip) {
            let message = message.map_content(|content| sanitize_text(&content));
            if message.content().is_empty() {
                return Err(AppError::invalid_input("Message content cannot be empty"));
            }
            let chars = message.content().chars().count();
            if chars > self.config.max_message_chars {
                return Err(AppError::invalid_input(format!(
                    "A message exceeds {} characters",
                    self.config.max_message_chars
                )));
            }
            total_chars += chars;
            sanitized.push(message);
        }
        if total_chars > self.config.max_total_chars {
            return Err(AppError::invalid_input(format!(
                "Total content exceeds {} characters",
                self.config.max_total_chars
            )));
        }
        Ok(sanitized)
    }

    /// Render the honest fallback shaped by the user's question
    fn fallback_outcome(
        &self,
        activities: &[ActivitySession],
        question: &str,
        today: NaiveDate,
        validation: Option<ValidationReport>,
        request_id: String,
    ) -> ChatOutcome {
        let about_bpm = matches(&BPM_QUESTION_PATTERN, question);
        let short_bpm = about_bpm
            && (matches(&SHORT_BPM_QUESTION_PATTERN, question)
                || question.split_whitespace().count() <= 5);
        let options = FallbackOptions {
            focus: if about_bpm {
                FallbackFocus::Bpm
            } else {
                FallbackFocus::General
            },
            short: short_bpm,
            include_advice: matches(&ASKED_FOR_ADVICE_PATTERN, question),
        };
        ChatOutcome {
            reply: generate_fallback(activities, &options, today),
            source: ReplySource::Fallback,
            validation,
            request_id,
        }
    }
}

/// Strip control characters and surrounding whitespace
///
/// Newlines survive: the grounding context block and structured replies are
/// multi-line by contract.
fn sanitize_text(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Truncate to at most `max_chars` characters on a character boundary
fn bounded(input: &str, max_chars: usize) -> String {
    input.chars().take(max_chars).collect()
}

const fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x231A..=0x32FF | 0x1F000..=0x1FAFF | 0xFE00..=0xFE0F
    )
}

/// Enforce the prompt's format contract on a model reply
///
/// The prompt forbids emojis and unsolicited plan/advice sections, but models
/// drift; stripping here keeps the contract regardless.
fn postprocess_reply(reply: String, question: &str) -> String {
    let mut result = reply;

    if !matches(&ASKED_FOR_PLAN_PATTERN, question) {
        if let Some(re) = NEXT_STEPS_SECTION_PATTERN.as_ref() {
            result = re.replace(&result, "").trim().to_owned();
        }
    }
    if !matches(&ASKED_FOR_ADVICE_PATTERN, question) {
        if let Some(re) = ADVICE_SECTION_PATTERN.as_ref() {
            result = re.replace(&result, "").trim().to_owned();
        }
    }

    result
        .chars()
        .filter(|c| !is_emoji(*c))
        .collect::<String>()
        .trim()
        .to_owned()
}
