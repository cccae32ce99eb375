// ABOUTME: Heuristic skill level classification from activity history
// ABOUTME: Data-driven ordered rule table, first match wins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

use coach_core::models::ActivitySession;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Estimated training level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    /// Fewer than five sessions, or low volume
    Beginner,
    /// Regular training at moderate volume
    Intermediate,
    /// High volume, long sessions, frequent training
    Advanced,
}

impl SkillLevel {
    /// French label rendered into the LLM context
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "débutant",
            Self::Intermediate => "intermédiaire",
            Self::Advanced => "avancé",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification thresholds for one level
///
/// A rule matches when the averages and the frequency all exceed its
/// thresholds. Frequency is sessions per day over a 30-day month.
#[derive(Debug, Clone, Copy)]
struct LevelRule {
    label: SkillLevel,
    min_avg_distance_km: f64,
    min_avg_duration_min: f64,
    min_frequency: f64,
}

/// Ordered rule table, most demanding first; the first match wins
const LEVEL_RULES: &[LevelRule] = &[
    LevelRule {
        label: SkillLevel::Advanced,
        min_avg_distance_km: 10.0,
        min_avg_duration_min: 60.0,
        min_frequency: 3.0,
    },
    LevelRule {
        label: SkillLevel::Intermediate,
        min_avg_distance_km: 5.0,
        min_avg_duration_min: 30.0,
        min_frequency: 2.0,
    },
];

/// Sessions needed before any classification beyond beginner is attempted
const MIN_SESSIONS_FOR_CLASSIFICATION: usize = 5;

/// Estimate a user's training level from their activity history
#[must_use]
pub fn estimate_level(activities: &[ActivitySession]) -> SkillLevel {
    if activities.len() < MIN_SESSIONS_FOR_CLASSIFICATION {
        return SkillLevel::Beginner;
    }

    let count = activities.len() as f64;
    let avg_distance = activities
        .iter()
        .map(|session| session.distance_km)
        .sum::<f64>()
        / count;
    let avg_duration = activities
        .iter()
        .map(|session| f64::from(session.duration_min))
        .sum::<f64>()
        / count;
    let frequency = count / 30.0;

    LEVEL_RULES
        .iter()
        .find(|rule| {
            avg_distance > rule.min_avg_distance_km
                && avg_duration > rule.min_avg_duration_min
                && frequency > rule.min_frequency
        })
        .map_or(SkillLevel::Beginner, |rule| rule.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sessions(count: usize, km: f64, minutes: u32) -> Vec<ActivitySession> {
        (0..count)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()
                    + chrono::Duration::days((i % 28) as i64);
                ActivitySession::new(date, km, minutes)
            })
            .collect()
    }

    #[test]
    fn fewer_than_five_sessions_is_beginner() {
        assert_eq!(estimate_level(&sessions(4, 15.0, 90)), SkillLevel::Beginner);
        assert_eq!(estimate_level(&[]), SkillLevel::Beginner);
    }

    #[test]
    fn high_volume_frequent_training_is_advanced() {
        // 91 sessions / 30 days > 3 per day threshold
        assert_eq!(estimate_level(&sessions(91, 12.0, 75)), SkillLevel::Advanced);
    }

    #[test]
    fn moderate_volume_is_intermediate() {
        assert_eq!(estimate_level(&sessions(61, 6.0, 40)), SkillLevel::Intermediate);
    }

    #[test]
    fn low_volume_falls_back_to_beginner() {
        assert_eq!(estimate_level(&sessions(10, 2.0, 15)), SkillLevel::Beginner);
    }

    #[test]
    fn advanced_requires_all_three_thresholds() {
        // Long and frequent but short distance: not advanced
        assert_eq!(estimate_level(&sessions(91, 6.0, 90)), SkillLevel::Intermediate);
    }

    #[test]
    fn french_labels() {
        assert_eq!(SkillLevel::Beginner.to_string(), "débutant");
        assert_eq!(SkillLevel::Advanced.to_string(), "avancé");
    }
}
