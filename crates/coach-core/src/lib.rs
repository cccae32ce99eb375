// ABOUTME: Core types and error handling for the SportSee coach platform
// ABOUTME: Foundation crate with activity models, user profile types, and AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

#![deny(unsafe_code)]

//! # Coach Core
//!
//! Foundation crate providing shared types for the SportSee coach platform.
//! This crate is designed to change infrequently, enabling incremental
//! compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **models**: Activity sessions, heart rate data, user profile and nutrition types
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `AppResult`

/// Unified error handling system with standard error codes
pub mod errors;

/// Core data models (`ActivitySession`, `HeartRate`, `UserProfile`, ...)
pub mod models;

pub use errors::{AppError, AppResult, ErrorCode};
pub use models::{ActivitySession, HeartRate, NutritionSummary, UserProfile};
