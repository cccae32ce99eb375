// ABOUTME: Fitness activity models shared across the coach platform
// ABOUTME: Activity sessions, heart rate ranges, user profile and nutrition summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Heart rate range recorded for one activity session
///
/// `min <= average <= max` is the expected shape of provider data, but it is
/// not enforced here; consumers tolerate violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRate {
    /// Minimum heart rate during the session in BPM
    pub min: u32,
    /// Maximum heart rate during the session in BPM
    pub max: u32,
    /// Average heart rate during the session in BPM
    pub average: u32,
}

/// A single recorded activity session from the activity store
///
/// Sessions are externally owned and immutable from this crate's perspective.
/// The date is a pure calendar date: comparisons are year/month/day, never
/// instants, so no timezone conversion can shift a session into the wrong day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySession {
    /// Calendar date of the session (local, `YYYY-MM-DD`)
    pub date: NaiveDate,
    /// Distance covered in kilometers
    #[serde(rename = "distance")]
    pub distance_km: f64,
    /// Session duration in minutes
    #[serde(rename = "duration")]
    pub duration_min: u32,
    /// Heart rate range, when the provider recorded one
    #[serde(rename = "heartRate", default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<HeartRate>,
    /// Estimated calories burned during the session
    #[serde(rename = "caloriesBurned", default)]
    pub calories_burned: u32,
}

impl ActivitySession {
    /// Create a session with the required fields
    #[must_use]
    pub const fn new(date: NaiveDate, distance_km: f64, duration_min: u32) -> Self {
        Self {
            date,
            distance_km,
            duration_min,
            heart_rate: None,
            calories_burned: 0,
        }
    }

    /// Attach a heart rate range
    #[must_use]
    pub const fn with_heart_rate(mut self, min: u32, max: u32, average: u32) -> Self {
        self.heart_rate = Some(HeartRate { min, max, average });
        self
    }

    /// Attach a calorie estimate
    #[must_use]
    pub const fn with_calories(mut self, calories: u32) -> Self {
        self.calories_burned = calories;
        self
    }

    /// Average BPM for the session, when a heart rate range was recorded
    #[must_use]
    pub fn average_bpm(&self) -> Option<u32> {
        self.heart_rate.map(|hr| hr.average).filter(|bpm| *bpm > 0)
    }
}

/// Parse an activity date from its `YYYY-MM-DD` store representation
///
/// Defensive entry point for raw records: unparsable dates yield `None` so a
/// single malformed row cannot take down an aggregate computation.
#[must_use]
pub fn parse_session_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// User profile facts forwarded to the coach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User's first name
    pub first_name: String,
    /// User's last name
    #[serde(default)]
    pub last_name: String,
}

/// Daily nutrition counters from the user's dashboard
///
/// Every field is optional: absent data is omitted downstream, never rendered
/// as a fabricated zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionSummary {
    /// Calories burned today in kcal
    pub calorie_count: Option<u32>,
    /// Protein intake in grams
    pub protein_count: Option<u32>,
    /// Carbohydrate intake in grams
    pub carbohydrate_count: Option<u32>,
    /// Lipid intake in grams
    pub lipid_count: Option<u32>,
}
