// ABOUTME: Shared fixtures and a scripted mock LLM provider for integration tests
// ABOUTME: Mirrors the staging data set used by the dashboard mocks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee
#![allow(dead_code, clippy::must_use_candidate, clippy::missing_panics_doc)]

//! Shared test utilities for `sportsee_coach` integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use sportsee_coach::llm::{CompletionRequest, LlmProvider};
use sportsee_coach::{ActivitySession, AppError, NutritionSummary, UserProfile};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .init();
    });
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The staging user the dashboard mocks ship with
pub fn sophie_profile() -> UserProfile {
    UserProfile {
        first_name: "Sophie".to_owned(),
        last_name: "Martin".to_owned(),
    }
}

pub fn sophie_nutrition() -> NutritionSummary {
    NutritionSummary {
        calorie_count: Some(1930),
        protein_count: Some(155),
        carbohydrate_count: Some(290),
        lipid_count: Some(50),
    }
}

/// Three sessions in the week of 2025-11-17, totaling 12.3 km at 150 BPM avg
pub fn november_activities() -> Vec<ActivitySession> {
    vec![
        ActivitySession::new(date(2025, 11, 17), 5.0, 35)
            .with_heart_rate(140, 170, 150)
            .with_calories(380),
        ActivitySession::new(date(2025, 11, 18), 4.0, 30)
            .with_heart_rate(138, 172, 150)
            .with_calories(310),
        ActivitySession::new(date(2025, 11, 19), 3.3, 28)
            .with_heart_rate(142, 168, 150)
            .with_calories(255),
    ]
}

/// A `now` that puts [`november_activities`] inside the trailing 4-week window
pub fn december_checkpoint() -> NaiveDate {
    date(2025, 12, 3)
}

/// The single-session scenario used by the current-week BPM summaries
pub fn single_session() -> Vec<ActivitySession> {
    vec![ActivitySession::new(date(2025, 11, 18), 5.8, 38)
        .with_heart_rate(140, 178, 163)
        .with_calories(422)]
}

/// What the mock provider should do for one `complete` call
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return this text as the model reply
    Reply(String),
    /// Fail with an upstream service error
    Fail,
    /// Never answer (exercises the orchestrator timeout)
    Hang,
}

/// Scripted in-process stand-in for a vendor LLM integration
///
/// Cloning shares the script and the request recorder, so a test can keep a
/// handle after moving the provider into the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<MockBehavior>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next `complete` call
    pub fn replying(self, text: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(MockBehavior::Reply(text.to_owned()));
        self
    }

    /// Queue an upstream failure for the next `complete` call
    pub fn failing(self) -> Self {
        self.script.lock().unwrap().push_back(MockBehavior::Fail);
        self
    }

    /// Queue a hang for the next `complete` call
    pub fn hanging(self) -> Self {
        self.script.lock().unwrap().push_back(MockBehavior::Hang);
        self
    }

    /// Requests the orchestrator actually dispatched
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn display_name(&self) -> &'static str {
        "Mock LLM"
    }

    fn default_model(&self) -> &str {
        "mock-small-latest"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let behavior = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockBehavior::Fail);
        match behavior {
            MockBehavior::Reply(content) => Ok(content),
            MockBehavior::Fail => Err(AppError::external("mock upstream failure")),
            MockBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AppError::timeout("mock hang elapsed"))
            }
        }
    }
}
