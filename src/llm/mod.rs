// ABOUTME: Service provider interface between the coach and a hosted LLM
// ABOUTME: Role-tagged conversation messages, clamped decoding settings, provider trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

//! # LLM Service Provider Interface
//!
//! The contract a vendor integration must implement to power the coach chat.
//! The orchestrator treats the upstream model as an opaque capability — send
//! the conversation, receive reply text — so vendor HTTP mechanics, model
//! selection, and retry policy live entirely behind [`LlmProvider`].
//!
//! The interface is deliberately narrow: a [`CompletionRequest`] carries the
//! role-tagged conversation plus decoding settings already clamped by the
//! chat configuration, and a completion yields the reply text alone. Anything
//! a vendor response carries beyond that (model ids, stop reasons, token
//! accounting) never reaches the coach pipeline and is the provider's own
//! business.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sportsee_coach::llm::{ChatMessage, CompletionRequest, CompletionSettings, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = CompletionRequest {
//!         messages: vec![
//!             ChatMessage::System("Tu es un coach sportif.".to_owned()),
//!             ChatMessage::User("Comment améliorer mon endurance ?".to_owned()),
//!         ],
//!         settings: CompletionSettings::factual(),
//!     };
//!     let reply = provider.complete(&request).await;
//! }
//! ```

pub mod prompts;

pub use prompts::{build_messages_with_system, ConversationProfile, COACH_SYSTEM_PROMPT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use coach_core::errors::AppError;

/// One utterance in a coach conversation
///
/// The role is the variant, so a message cannot exist without one; serde
/// renders the vendor-standard `{"role": ..., "content": ...}` wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum ChatMessage {
    /// Server-owned instruction: the persona prompt or the grounding context
    System(String),
    /// What the athlete typed
    User(String),
    /// A previous coach reply in the conversation history
    Assistant(String),
}

impl ChatMessage {
    /// Wire-format role label
    #[must_use]
    pub const fn role(&self) -> &'static str {
        match self {
            Self::System(_) => "system",
            Self::User(_) => "user",
            Self::Assistant(_) => "assistant",
        }
    }

    /// The message text
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::System(content) | Self::User(content) | Self::Assistant(content) => content,
        }
    }

    /// Whether this is a server-owned instruction
    ///
    /// Client-supplied system messages are discarded before dispatch; only
    /// the server may instruct the model.
    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System(_))
    }

    /// Rebuild the message with transformed content, keeping the role
    #[must_use]
    pub fn map_content(self, transform: impl FnOnce(String) -> String) -> Self {
        match self {
            Self::System(content) => Self::System(transform(content)),
            Self::User(content) => Self::User(transform(content)),
            Self::Assistant(content) => Self::Assistant(transform(content)),
        }
    }
}

/// Decoding settings for one completion
///
/// Always concrete: the orchestrator clamps client requests into range
/// before they reach a provider, so an implementation never second-guesses
/// bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// Sampling temperature in [0, 1]
    pub temperature: f32,
    /// Hard cap on generated tokens
    pub max_output_tokens: u32,
}

impl CompletionSettings {
    /// The coach's factual defaults: low temperature, bounded replies
    #[must_use]
    pub const fn factual() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 512,
        }
    }
}

/// What the orchestrator hands a provider for one completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Full conversation, server instructions first, the question last
    pub messages: Vec<ChatMessage>,
    /// Decoding settings, already clamped by the chat configuration
    pub settings: CompletionSettings,
}

/// LLM provider contract for coach chat completions
///
/// Implement this to plug a vendor API into the coach. The orchestrator only
/// ever calls [`LlmProvider::complete`] and consumes the reply text;
/// transport, authentication, and model choice are the implementation's
/// business.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., "mistral", "ollama")
    fn name(&self) -> &'static str;

    /// Human-readable display name for the provider
    fn display_name(&self) -> &'static str;

    /// Model the provider dispatches to
    fn default_model(&self) -> &str;

    /// Perform a chat completion and return the reply text
    ///
    /// # Errors
    ///
    /// Returns an error when the upstream API call fails; the orchestrator
    /// treats any error as grounds for the honest fallback.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_follow_the_variant() {
        assert_eq!(ChatMessage::System("a".to_owned()).role(), "system");
        assert_eq!(ChatMessage::User("b".to_owned()).role(), "user");
        assert_eq!(ChatMessage::Assistant("c".to_owned()).role(), "assistant");
        assert!(ChatMessage::System("a".to_owned()).is_system());
        assert!(!ChatMessage::User("b".to_owned()).is_system());
    }

    #[test]
    fn map_content_keeps_the_role() {
        let message = ChatMessage::User("  salut  ".to_owned());
        let trimmed = message.map_content(|content| content.trim().to_owned());
        assert_eq!(trimmed, ChatMessage::User("salut".to_owned()));
    }

    #[test]
    fn messages_serialize_to_the_vendor_wire_shape() {
        let json = serde_json::to_value(ChatMessage::User("salut".to_owned())).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "salut");
    }

    #[test]
    fn factual_settings_keep_the_coach_grounded() {
        let settings = CompletionSettings::factual();
        assert!((settings.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(settings.max_output_tokens, 512);
    }
}
