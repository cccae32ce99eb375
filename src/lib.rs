// ABOUTME: Main library entry point for the SportSee AI coach backend
// ABOUTME: Orchestrates LLM dispatch, reply validation, and honest fallbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

#![deny(unsafe_code)]

//! # SportSee Coach
//!
//! Backend for the SportSee AI coach chat. The coach answers questions about
//! the user's dashboard, grounded in their real activity data, under one
//! correctness contract: **never let the assistant state a number that isn't
//! true**.
//!
//! ## Architecture
//!
//! - **`coach_core`**: shared models (`ActivitySession`, profiles) and errors
//! - **`coach_intelligence`**: the anti-hallucination engine — windowing,
//!   context building, reply validation, fallback generation (pure functions,
//!   caller-supplied `now`)
//! - **[`llm`]**: provider abstraction and the coach system prompt
//! - **[`rate_limiting`]**: injected per-client request throttling
//! - **[`services`]**: the chat orchestration cycle gluing it all together
//!
//! ## Flow
//!
//! Per chat turn: preprocess and rate-limit the request, assemble the system
//! prompt plus the user's data context, dispatch to the configured LLM with a
//! timeout, validate the reply against the real data, and substitute a
//! deterministic fallback when the reply (or the provider) fails.

/// Chat pipeline configuration with production defaults
pub mod config;

/// LLM provider abstraction and system prompt assembly
pub mod llm;

/// Per-client request throttling with injected state and clock
pub mod rate_limiting;

/// Domain service layer
pub mod services;

pub use coach_core::errors::{AppError, AppResult, ErrorCode};
pub use coach_core::models::{ActivitySession, HeartRate, NutritionSummary, UserProfile};
pub use coach_intelligence as intelligence;
