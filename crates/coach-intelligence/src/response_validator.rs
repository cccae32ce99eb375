// ABOUTME: Detects numeric and date hallucinations in AI coach replies
// ABOUTME: Regex extraction of claimed figures cross-checked against real activity data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

//! # Response Validator
//!
//! Cross-references a free-text AI reply against the user's real activity
//! data and flags every claim that diverges from ground truth beyond
//! tolerance. The guiding contract: the assistant must never state a number
//! that isn't true. False negatives (a truthful reply flagged invalid) are an
//! accepted cost — the caller substitutes a data-faithful fallback, so the
//! worst case is a blander answer, never a wrong one.
//!
//! Extraction is regex-based because the input is unstructured natural
//! language; each rule lives behind a named function so it can be tested
//! against literal strings in isolation.
//!
//! The exemption patterns below match the French phrasing produced by the
//! current coach prompt ("Aucun BPM ... semaine", "dernières séances", ...).
//! If the prompt wording changes, these exemptions silently stop firing and
//! the validator becomes stricter; revisit them together with any prompt
//! change.

use std::sync::LazyLock;

use chrono::NaiveDate;
use coach_core::models::ActivitySession;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ValidationTolerances;
use crate::statistics::{self, DataStatistics};

/// Any integer or decimal, comma or dot separator
static NUMBER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").ok());

/// An integer followed by an activity/session word
static ACTIVITY_COUNT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:activit[eé]s?|s[eé]ances?)").ok());

/// A decimal followed by "km"
static KM_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*km\b").ok());

/// An integer followed by a heart-rate unit
static BPM_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:bpm|beats?|pulsations?)").ok());

/// ISO `YYYY-MM-DD` substrings
static DATE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").ok());

/// A bulleted "- 163 BPM" list item
static BPM_LIST_ITEM_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)-\s*\d+\s*BPM").ok());

/// "Aucun ... BPM ... semaine" — an explicit no-data statement
static NO_BPM_THIS_WEEK_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)aucun\s+.*bpm\s+.*semaine").ok());

/// A "dernières séances" listing header
static RECENT_SESSIONS_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)derni[eè]res\s+s[eé]ances").ok());

/// Any mention of activities
static ACTIVITY_WORD_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)activit[eé]").ok());

/// Any mention of a total
static TOTAL_WORD_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)total").ok());

/// Any mention of BPM
static BPM_WORD_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)bpm").ok());

/// Topic-refusal markers used by the coach persona
static REFUSAL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)d[eé]sol|coach|specialis").ok());

fn matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// Verdict of one validation pass
///
/// Produced fresh on every call and never persisted: the statistics inside
/// depend on the supplied `now`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the reply is consistent with the real data
    pub valid: bool,
    /// One entry per detected inconsistency, in rule order
    pub issues: Vec<String>,
    /// The ground truth the reply was checked against
    pub stats: DataStatistics,
}

impl ValidationReport {
    fn passed(stats: DataStatistics) -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
            stats,
        }
    }
}

/// All numbers quoted in a reply (decimal comma tolerated)
#[must_use]
pub fn extract_numbers(text: &str) -> Vec<f64> {
    NUMBER_PATTERN.as_ref().map_or_else(Vec::new, |re| {
        re.find_iter(text)
            .filter_map(|m| m.as_str().replace(',', ".").parse().ok())
            .collect()
    })
}

/// The highest activity count the reply claims, if any
///
/// Looks for an integer directly before "activité(s)" or "séance(s)"
/// (case-insensitive) and keeps the maximum.
#[must_use]
pub fn extract_claimed_activity_count(text: &str) -> Option<u32> {
    let re = ACTIVITY_COUNT_PATTERN.as_ref()?;
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .max()
}

/// The highest kilometer figure the reply claims, if any
#[must_use]
pub fn extract_claimed_km(text: &str) -> Option<f64> {
    let re = KM_PATTERN.as_ref()?;
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().replace(',', ".").parse().ok())
        .fold(None, |max: Option<f64>, value| {
            Some(max.map_or(value, |m| m.max(value)))
        })
}

/// Every BPM figure the reply claims
#[must_use]
pub fn extract_claimed_bpms(text: &str) -> Vec<u32> {
    BPM_PATTERN.as_ref().map_or_else(Vec::new, |re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
            .collect()
    })
}

/// Every ISO date the reply mentions, unparsable candidates skipped
#[must_use]
pub fn extract_mentioned_dates(text: &str) -> Vec<NaiveDate> {
    DATE_PATTERN.as_ref().map_or_else(Vec::new, |re| {
        re.find_iter(text)
            .filter_map(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
            .collect()
    })
}

/// Validate an AI reply against the real activity data with the production
/// tolerances
#[must_use]
pub fn validate(reply: &str, activities: &[ActivitySession], now: NaiveDate) -> ValidationReport {
    validate_with_tolerances(reply, activities, now, &ValidationTolerances::DEFAULT)
}

/// Validate an AI reply against the real activity data
///
/// Ground truth is computed over the trailing four complete weeks before
/// `now` — the same window the dashboard charts display, so the model's
/// claims are held to what the user actually sees on screen.
// Long function: mirrors the ordered production rule set one rule at a time
#[must_use]
pub fn validate_with_tolerances(
    reply: &str,
    activities: &[ActivitySession],
    now: NaiveDate,
    tolerances: &ValidationTolerances,
) -> ValidationReport {
    let stats = statistics::compute_statistics(activities, now);

    let claimed_count = extract_claimed_activity_count(reply).unwrap_or(0);
    let claimed_km = extract_claimed_km(reply).unwrap_or(0.0);
    let claimed_bpms = extract_claimed_bpms(reply);
    let mentioned_dates = extract_mentioned_dates(reply);
    let numbers = extract_numbers(reply);
    let mentions_bpm = matches(&BPM_WORD_PATTERN, reply);

    // A detailed day-by-day BPM recitation anchored to real dates is exactly
    // the desired behavior; don't let the coarser aggregate checks punish it.
    let has_matching_date = mentioned_dates
        .iter()
        .any(|date| activities.iter().any(|session| session.date == *date));
    if mentions_bpm
        && !mentioned_dates.is_empty()
        && (!claimed_bpms.is_empty() || matches(&BPM_LIST_ITEM_PATTERN, reply))
        && has_matching_date
    {
        debug!("reply exempted: BPM detail anchored to real activity dates");
        return ValidationReport::passed(stats);
    }
    if matches(&NO_BPM_THIS_WEEK_PATTERN, reply) {
        debug!("reply exempted: explicit no-BPM-this-week statement");
        return ValidationReport::passed(stats);
    }
    if matches(&RECENT_SESSIONS_PATTERN, reply)
        && !mentioned_dates.is_empty()
        && !claimed_bpms.is_empty()
    {
        debug!("reply exempted: dated recent-session listing");
        return ValidationReport::passed(stats);
    }

    let mut issues = Vec::new();

    // With no real data, any claimed figure is pure invention
    if stats.total_activities == 0 {
        if claimed_count > 0 {
            issues.push(format!(
                "L'IA invente {claimed_count} activité(s) alors qu'il n'y en a pas"
            ));
        }
        if claimed_km > 0.0 {
            issues.push(format!(
                "L'IA invente {claimed_km}km alors que l'utilisateur n'a pas de données"
            ));
        }
        return finish(issues, stats);
    }

    if claimed_count > 0 {
        let tolerance = stats.total_activities as f64 * tolerances.count_ratio;
        if (f64::from(claimed_count) - stats.total_activities as f64).abs() > tolerance {
            issues.push(format!(
                "❌ L'IA dit {claimed_count} activité(s) mais le total réel est {}",
                stats.total_activities
            ));
        }
    } else if matches(&ACTIVITY_WORD_PATTERN, reply) && matches(&TOTAL_WORD_PATTERN, reply) {
        issues.push(
            "❌ L'IA évoque un total d'activités sans indiquer le nombre ou sans l'aligner avec les données réelles"
                .to_owned(),
        );
    }

    // A figure that matches one session exactly is a legitimate quotation,
    // not a total claim
    let quotes_session_distance = activities
        .iter()
        .any(|session| (session.distance_km - claimed_km).abs() < f64::EPSILON);
    if claimed_km > 0.0 && stats.total_km > 0.0 && !quotes_session_distance {
        let tolerance = stats.total_km * tolerances.km_ratio;
        if (claimed_km - stats.total_km).abs() > tolerance {
            issues.push(format!(
                "❌ L'IA dit {claimed_km}km mais le total réel est {}km",
                stats.total_km
            ));
        }
    }

    // The ratio check can miss gross overstatements at very small real totals
    if claimed_km > tolerances.km_gross_claim && stats.total_km < tolerances.km_gross_floor {
        issues.push(format!(
            "❌ HALLUCINATION KM: L'IA dit {claimed_km}km mais le total réel est seulement {}km",
            stats.total_km
        ));
    }

    if numbers.len() >= tolerances.suspicious_number_count
        && stats.total_activities <= tolerances.sparse_activity_count
        && !mentions_bpm
    {
        issues.push(
            "🚨 Trop de chiffres pour si peu de séances réelles : suspicion d'hallucination"
                .to_owned(),
        );
    }

    if !claimed_bpms.is_empty() && stats.avg_bpm > 0 {
        let outliers: Vec<u32> = claimed_bpms
            .iter()
            .copied()
            .filter(|bpm| {
                (f64::from(*bpm) - f64::from(stats.avg_bpm)).abs() > tolerances.bpm_max_deviation
            })
            .collect();
        if !outliers.is_empty() {
            let list = outliers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            issues.push(format!(
                "⚠️ L'IA mentionne des BPM très éloignés ({list}) de la moyenne réelle ({})",
                stats.avg_bpm
            ));
        }
    }

    if stats.total_activities == 1 && claimed_count > 1 {
        issues.push(format!(
            "🚨 HALLUCINATION: L'IA dit {claimed_count} activités mais l'utilisateur n'a que {}",
            stats.total_activities
        ));
    }

    let char_count = reply.chars().count();
    let is_refusal = char_count < tolerances.refusal_max_chars && matches(&REFUSAL_PATTERN, reply);
    if !reply.contains('\n')
        && char_count > tolerances.unformatted_min_chars
        && !reply.contains(':')
        && !is_refusal
    {
        issues.push("⚠️ La réponse n'est pas bien formatée".to_owned());
    }

    finish(issues, stats)
}

fn finish(issues: Vec<String>, stats: DataStatistics) -> ValidationReport {
    if !issues.is_empty() {
        debug!(issue_count = issues.len(), "reply failed validation");
    }
    ValidationReport {
        valid: issues.is_empty(),
        issues,
        stats,
    }
}
