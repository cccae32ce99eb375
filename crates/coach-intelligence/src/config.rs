// ABOUTME: Tolerance configuration for AI reply validation
// ABOUTME: Named constants preserved from the tuned production thresholds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

use serde::{Deserialize, Serialize};

/// Tolerances applied when cross-checking an AI reply against real data
///
/// The values were tuned empirically against observed coach replies; they are
/// kept as named configuration rather than re-derived so validation
/// strictness stays stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationTolerances {
    /// Claimed activity count may deviate from the real count by this
    /// fraction of the real count
    pub count_ratio: f64,
    /// Claimed kilometers may deviate from the real total by this fraction
    /// of the real total
    pub km_ratio: f64,
    /// A kilometer claim above this is flagged outright when the real total
    /// is below [`Self::km_gross_floor`]
    pub km_gross_claim: f64,
    /// Real-total ceiling for the gross overstatement check
    pub km_gross_floor: f64,
    /// Claimed BPM values may deviate from the real average by this many
    /// beats (absolute)
    pub bpm_max_deviation: f64,
    /// A reply quoting at least this many distinct numbers is suspicious...
    pub suspicious_number_count: usize,
    /// ...when the real data holds at most this many activities
    pub sparse_activity_count: usize,
    /// Replies longer than this with no newline and no colon are considered
    /// badly formatted
    pub unformatted_min_chars: usize,
    /// Replies shorter than this that look like a topic refusal are exempt
    /// from the formatting check
    pub refusal_max_chars: usize,
}

impl ValidationTolerances {
    /// Production thresholds
    pub const DEFAULT: Self = Self {
        count_ratio: 0.5,
        km_ratio: 0.3,
        km_gross_claim: 10.0,
        km_gross_floor: 5.0,
        bpm_max_deviation: 20.0,
        suspicious_number_count: 4,
        sparse_activity_count: 2,
        unformatted_min_chars: 100,
        refusal_max_chars: 300,
    };
}

impl Default for ValidationTolerances {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_production_thresholds() {
        let tol = ValidationTolerances::default();
        assert!((tol.count_ratio - 0.5).abs() < f64::EPSILON);
        assert!((tol.km_ratio - 0.3).abs() < f64::EPSILON);
        assert!((tol.bpm_max_deviation - 20.0).abs() < f64::EPSILON);
        assert_eq!(tol.suspicious_number_count, 4);
        assert_eq!(tol.sparse_activity_count, 2);
    }
}
