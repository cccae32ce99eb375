// ABOUTME: Builds the grounding context block sent to the LLM with every conversation
// ABOUTME: Weekly distance totals, per-day heart rate, recent sessions, estimated level
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

//! # Context Builder
//!
//! Produces the single French text block the LLM receives as grounding
//! context. The block mirrors the figures shown by the dashboard charts: the
//! 4-week kilometer breakdown and the current-week heart rate detail, plus a
//! short recent-session listing and an estimated level.
//!
//! Missing data is stated explicitly, never silently omitted — an empty
//! context would be indistinguishable from "don't mention data" and the model
//! must not guess. The closing instruction line is a strict contract with the
//! upstream system prompt; do not reword it.

use chrono::{Duration, NaiveDate};
use coach_core::models::{ActivitySession, NutritionSummary, UserProfile};

use crate::level;
use crate::windowing;

/// Maximum number of sessions listed in the recent-activity section
const RECENT_SESSION_LIMIT: usize = 7;

/// French day names, Monday first
const DAY_NAMES: [&str; 7] = [
    "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche",
];

/// Closing instruction the upstream system prompt relies on verbatim
const CLOSING_INSTRUCTION: &str =
    "⚠️ INSTRUCTION: Utilise UNIQUEMENT ces données pour répondre. Ne invente rien.";

/// Build the full grounding context for one user
///
/// Never fails: absent profile or nutrition data degrades to omitted lines,
/// and an empty activity list produces an explicit no-data notice. The result
/// is bounded — at most [`RECENT_SESSION_LIMIT`] sessions are listed.
#[must_use]
pub fn build_context(
    profile: Option<&UserProfile>,
    nutrition: Option<&NutritionSummary>,
    activities: &[ActivitySession],
    now: NaiveDate,
) -> String {
    let mut sections = Vec::new();

    if let Some(section) = format_profile_section(profile, nutrition) {
        sections.push(section);
    }

    if activities.is_empty() {
        sections.push(
            "⚠️ Données d'activité: Chargement en cours ou aucune donnée disponible pour le moment."
                .to_owned(),
        );
    } else {
        sections.push(format_performance_metrics(activities, now));
        sections.push(format_recent_activities(activities, RECENT_SESSION_LIMIT, now));
        sections.push(format!(
            "Niveau estimé: {}",
            level::estimate_level(activities)
        ));
    }

    format!(
        "[DONNÉES UTILISATEUR SPORTSEE - À UTILISER IMPÉRATIVEMENT]\n📅 DATE ACTUELLE: {now}\n{}\n\n{CLOSING_INSTRUCTION}",
        sections.join("\n\n")
    )
}

/// Profile facts: first name and whichever nutrition counters are present
///
/// Absent fields are omitted, never rendered as zero.
fn format_profile_section(
    profile: Option<&UserProfile>,
    nutrition: Option<&NutritionSummary>,
) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(profile) = profile {
        if !profile.first_name.is_empty() {
            parts.push(format!("Prénom: {}", profile.first_name));
        }
    }

    if let Some(nutrition) = nutrition {
        if let Some(kcal) = nutrition.calorie_count {
            parts.push(format!("Calories brûlées: {kcal} kcal"));
        }
        if let Some(grams) = nutrition.protein_count {
            parts.push(format!("Protéines: {grams}g"));
        }
        if let Some(grams) = nutrition.carbohydrate_count {
            parts.push(format!("Glucides: {grams}g"));
        }
        if let Some(grams) = nutrition.lipid_count {
            parts.push(format!("Lipides: {grams}g"));
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(format!("Profil:\n{}", parts.join("\n")))
    }
}

/// The figures backing the two dashboard charts
fn format_performance_metrics(activities: &[ActivitySession], now: NaiveDate) -> String {
    let trailing = windowing::trailing_four_weeks_window(now);
    let buckets = windowing::bucket_into_weeks(activities, trailing.start);

    let mut result = String::from("📊 DONNÉES DES GRAPHIQUES:\n\n");
    result.push_str("🏃 Kilométrage - 4 dernières semaines:\n");
    for (index, bucket) in buckets.iter().enumerate() {
        let plural = if bucket.sessions > 1 { "s" } else { "" };
        result.push_str(&format!(
            "  Semaine {}: {}km ({} séance{plural})\n",
            index + 1,
            bucket.total_km,
            bucket.sessions
        ));
    }
    let total_km: f64 = buckets.iter().map(|bucket| bucket.total_km).sum();
    result.push_str(&format!(
        "  Total: {total_km:.1}km | Moyenne: {:.1}km/semaine\n\n",
        total_km / 4.0
    ));

    let current = windowing::current_week_window(now);
    result.push_str(&format!(
        "❤️ Fréquence cardiaque - Semaine courante ({} à {}):\n",
        current.start, current.end
    ));

    let mut shown_averages = Vec::new();
    for offset in 0..7 {
        let day = current.start + Duration::days(offset);
        let Some(session) = activities.iter().find(|session| session.date == day) else {
            continue;
        };
        let Some(hr) = session.heart_rate else {
            continue;
        };
        result.push_str(&format!(
            "  {} ({day}): Min={} Max={} Avg={} bpm\n",
            DAY_NAMES[offset as usize], hr.min, hr.max, hr.average
        ));
        shown_averages.push(hr.average);
    }

    if shown_averages.is_empty() {
        result.push_str("  Aucune activité cette semaine\n");
    } else {
        let sum: u32 = shown_averages.iter().sum();
        let avg = (f64::from(sum) / shown_averages.len() as f64).round() as u32;
        result.push_str(&format!("  Moyenne semaine: {avg} bpm\n"));
    }

    result
}

/// Short listing of the most recent sessions, oldest first
fn format_recent_activities(
    activities: &[ActivitySession],
    limit: usize,
    now: NaiveDate,
) -> String {
    let past: Vec<&ActivitySession> = activities
        .iter()
        .filter(|session| session.date <= now)
        .collect();

    if past.is_empty() {
        return "Aucune donnée d'activité passée disponible.".to_owned();
    }

    let start = past.len().saturating_sub(limit);
    let lines: Vec<String> = past[start..]
        .iter()
        .map(|session| {
            session.average_bpm().map_or_else(
                || {
                    format!(
                        "{}: {}km, {}min",
                        session.date, session.distance_km, session.duration_min
                    )
                },
                |bpm| {
                    format!(
                        "{}: {}km, {}min, {bpm} BPM",
                        session.date, session.distance_km, session.duration_min
                    )
                },
            )
        })
        .collect();

    format!("Activités récentes:\n{}", lines.join("\n"))
}
