// ABOUTME: Calendar week window computations for activity data
// ABOUTME: Current week, trailing complete weeks, and rolling windows from a supplied date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

//! # Week Windows
//!
//! The date ranges used everywhere in the engine, anchored to a
//! caller-supplied `now`. Weeks run Monday through Sunday. All comparisons
//! are calendar dates (year/month/day), never instants, so a session can
//! never drift into a neighboring day across timezones.

use chrono::{Datelike, Duration, NaiveDate};
use coach_core::models::ActivitySession;
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    /// First day of the window (inclusive)
    pub start: NaiveDate,
    /// Last day of the window (inclusive)
    pub end: NaiveDate,
}

impl WeekWindow {
    /// Whether the given calendar day falls inside the window
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One 7-day bucket of aggregated activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekBucket {
    /// Monday of the bucket
    pub start: NaiveDate,
    /// Sunday of the bucket
    pub end: NaiveDate,
    /// Sum of session distances in the bucket, rounded to one decimal
    pub total_km: f64,
    /// Number of sessions in the bucket
    pub sessions: usize,
}

/// Monday of the week containing `date`
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The Monday-through-Sunday week containing `now`
#[must_use]
pub fn current_week_window(now: NaiveDate) -> WeekWindow {
    let start = week_start(now);
    WeekWindow {
        start,
        end: start + Duration::days(6),
    }
}

/// The four fully-elapsed weeks before the week containing `now`
///
/// Runs from the Monday 28 days before the current week's Monday up to the
/// Sunday immediately before the current week. This window never overlaps
/// [`current_week_window`]: it matches what a "last 4 weeks" bar chart shows.
#[must_use]
pub fn trailing_four_weeks_window(now: NaiveDate) -> WeekWindow {
    let current_monday = week_start(now);
    WeekWindow {
        start: current_monday - Duration::days(28),
        end: current_monday - Duration::days(1),
    }
}

/// The rolling 28-day window ending on `now` (inclusive)
///
/// Unlike [`trailing_four_weeks_window`] this includes the current,
/// partially-elapsed week; the fallback generator summarizes over it so a
/// session recorded today is never reported as missing.
#[must_use]
pub fn rolling_four_weeks_window(now: NaiveDate) -> WeekWindow {
    WeekWindow {
        start: now - Duration::days(28),
        end: now,
    }
}

/// Sessions whose date falls inside `window`, in input order
#[must_use]
pub fn sessions_in_window<'a>(
    activities: &'a [ActivitySession],
    window: &WeekWindow,
) -> Vec<&'a ActivitySession> {
    activities
        .iter()
        .filter(|session| window.contains(session.date))
        .collect()
}

/// Aggregate sessions into 4 sequential 7-day buckets starting at `window_start`
#[must_use]
pub fn bucket_into_weeks(activities: &[ActivitySession], window_start: NaiveDate) -> [WeekBucket; 4] {
    core::array::from_fn(|week| {
        let start = window_start + Duration::days(7 * week as i64);
        let end = start + Duration::days(6);
        let in_bucket: Vec<_> = activities
            .iter()
            .filter(|session| session.date >= start && session.date <= end)
            .collect();
        let raw_km: f64 = in_bucket.iter().map(|session| session.distance_km).sum();
        WeekBucket {
            start,
            end,
            total_km: (raw_km * 10.0).round() / 10.0,
            sessions: in_bucket.len(),
        }
    })
}
