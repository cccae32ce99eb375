// ABOUTME: Domain service layer for the coach chat request/response cycle
// ABOUTME: Protocol-agnostic orchestration reusable behind any transport
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

//! Domain service layer
//!
//! Business logic kept out of transport handlers so the same chat cycle can
//! sit behind an HTTP route, a websocket, or a test harness unchanged.

/// Chat turn orchestration: preprocessing, dispatch, validation, fallback
pub mod chat_orchestration;

pub use chat_orchestration::{ChatOrchestrator, ChatOutcome, ChatTurn, ReplySource};
