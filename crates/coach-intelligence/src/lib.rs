// ABOUTME: Anti-hallucination engine for the SportSee AI coach
// ABOUTME: Windowing, statistics, context building, reply validation, honest fallbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

#![deny(unsafe_code)]

//! # Coach Intelligence
//!
//! The anti-hallucination core of the SportSee AI coach. Every function here
//! is a pure, synchronous transformation of `(activities, now, ...)` into a
//! string or a verdict: no I/O, no shared mutable state, no ambient clock.
//! Callers always supply `now`, which keeps results deterministic and makes
//! the whole crate safe to call concurrently without coordination.
//!
//! ## Pipeline
//!
//! 1. [`context_builder`] turns the user's activity data into a bounded,
//!    date-accurate French text block fed to the LLM as grounding context.
//! 2. [`response_validator`] cross-checks the LLM's free-text reply against
//!    the real data and produces a [`response_validator::ValidationReport`].
//! 3. [`fallback`] renders a deterministic, data-faithful substitute reply
//!    whenever the model's claims diverge from ground truth.
//!
//! The three stages agree on what data is "in scope" because they all derive
//! their date ranges from [`windowing`].

/// Validation tolerance configuration
pub mod config;

/// French text block assembly for LLM grounding context
pub mod context_builder;

/// Deterministic, data-grounded substitute replies
pub mod fallback;

/// Heuristic skill level classification
pub mod level;

/// Aggregate activity statistics over the displayed period
pub mod statistics;

/// Numeric and date cross-checking of AI replies
pub mod response_validator;

/// Week window computations anchored to a caller-supplied date
pub mod windowing;

pub use config::ValidationTolerances;
pub use context_builder::build_context;
pub use fallback::{generate_fallback, FallbackFocus, FallbackOptions};
pub use level::{estimate_level, SkillLevel};
pub use response_validator::{validate, ValidationReport};
pub use statistics::{compute_statistics, DataStatistics};
pub use windowing::{
    bucket_into_weeks, current_week_window, rolling_four_weeks_window, trailing_four_weeks_window,
    WeekBucket, WeekWindow,
};
