// ABOUTME: Aggregate activity statistics over the displayed period
// ABOUTME: Ground truth figures the validator and fallback generator check against
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

use std::collections::BTreeMap;

use chrono::NaiveDate;
use coach_core::models::ActivitySession;
use serde::{Deserialize, Serialize};

use crate::windowing::{self, WeekWindow};

/// Kilometers and session count accumulated in one week
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekTotals {
    /// Sum of session distances
    pub km: f64,
    /// Number of sessions
    pub activities: usize,
}

/// Ground-truth statistics for one user over the displayed period
///
/// Recomputed on every call — `now` moves the window, so caching a previous
/// result would silently serve stale ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStatistics {
    /// Number of sessions in the window
    pub total_activities: usize,
    /// Total kilometers in the window, rounded to one decimal
    pub total_km: f64,
    /// Mean of per-session average BPM, rounded to the nearest beat
    pub avg_bpm: u32,
    /// Lowest per-session average BPM
    pub min_bpm: u32,
    /// Highest per-session average BPM
    pub max_bpm: u32,
    /// Sessions per week over the 4-week window, rounded to one decimal
    pub activities_per_week: f64,
    /// Per-week totals keyed by the Monday of each week
    pub weeks: BTreeMap<NaiveDate, WeekTotals>,
}

impl DataStatistics {
    /// Statistics for a window holding no sessions
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total_activities: 0,
            total_km: 0.0,
            avg_bpm: 0,
            min_bpm: 0,
            max_bpm: 0,
            activities_per_week: 0.0,
            weeks: BTreeMap::new(),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute statistics over the trailing four complete weeks before `now`
///
/// This is the window the kilometer chart displays, so the figures here are
/// exactly what the user sees on screen.
#[must_use]
pub fn compute_statistics(activities: &[ActivitySession], now: NaiveDate) -> DataStatistics {
    compute_statistics_over(activities, &windowing::trailing_four_weeks_window(now))
}

/// Compute statistics over the rolling 28-day window ending on `now`
///
/// Used by the fallback generator, which must account for sessions recorded
/// in the current, partially-elapsed week.
#[must_use]
pub fn compute_rolling_statistics(activities: &[ActivitySession], now: NaiveDate) -> DataStatistics {
    compute_statistics_over(activities, &windowing::rolling_four_weeks_window(now))
}

/// Compute statistics over an arbitrary window
#[must_use]
pub fn compute_statistics_over(
    activities: &[ActivitySession],
    window: &WeekWindow,
) -> DataStatistics {
    let in_window = windowing::sessions_in_window(activities, window);
    if in_window.is_empty() {
        return DataStatistics::empty();
    }

    let total_km: f64 = in_window.iter().map(|session| session.distance_km).sum();

    let bpms: Vec<u32> = in_window
        .iter()
        .filter_map(|session| session.average_bpm())
        .collect();
    let (avg_bpm, min_bpm, max_bpm) = if bpms.is_empty() {
        (0, 0, 0)
    } else {
        let sum: u32 = bpms.iter().sum();
        let avg = (f64::from(sum) / bpms.len() as f64).round() as u32;
        let min = bpms.iter().min().copied().unwrap_or(0);
        let max = bpms.iter().max().copied().unwrap_or(0);
        (avg, min, max)
    };

    let mut weeks: BTreeMap<NaiveDate, WeekTotals> = BTreeMap::new();
    for session in &in_window {
        let entry = weeks
            .entry(windowing::week_start(session.date))
            .or_default();
        entry.km += session.distance_km;
        entry.activities += 1;
    }

    DataStatistics {
        total_activities: in_window.len(),
        total_km: round1(total_km),
        avg_bpm,
        min_bpm,
        max_bpm,
        activities_per_week: round1(in_window.len() as f64 / 4.0),
        weeks,
    }
}
