// ABOUTME: Deterministic data-grounded replies substituted for rejected AI output
// ABOUTME: Short or structured French summaries computed only from real activity data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 SportSee

//! # Honest Fallback Generator
//!
//! When the validator rejects an AI reply — or the upstream call fails — the
//! user still gets a factually defensible answer. Everything here is rendered
//! from the real activity data alone: no LLM involvement, and byte-identical
//! output for identical `(activities, options, now)` inputs.
//!
//! Summaries cover the rolling 28 days ending on `now` so a session recorded
//! this week is never reported as missing, with a dedicated subset for the
//! current Monday-through-Sunday week.

use chrono::NaiveDate;
use coach_core::models::{ActivitySession, HeartRate};
use serde::{Deserialize, Serialize};

use crate::statistics;
use crate::windowing;

/// What the substitute reply should emphasize
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackFocus {
    /// Overall activity summary
    #[default]
    General,
    /// Heart rate detail
    Bpm,
}

/// Rendering options for a substitute reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackOptions {
    /// What to emphasize
    pub focus: FallbackFocus,
    /// Render a one/two-line summary instead of the structured form
    pub short: bool,
    /// Append the closing advice section (structured form only)
    pub include_advice: bool,
}

/// Per-session BPM figures aggregated over the current week
struct WeekBpm {
    avg: u32,
    min: u32,
    max: u32,
}

fn week_bpm(current_week: &[&ActivitySession]) -> WeekBpm {
    let rates: Vec<HeartRate> = current_week
        .iter()
        .filter_map(|session| session.heart_rate)
        .collect();

    let averages: Vec<u32> = rates.iter().map(|hr| hr.average).filter(|v| *v > 0).collect();
    let mins: Vec<u32> = rates.iter().map(|hr| hr.min).filter(|v| *v > 0).collect();
    let maxs: Vec<u32> = rates.iter().map(|hr| hr.max).filter(|v| *v > 0).collect();

    WeekBpm {
        avg: if averages.is_empty() {
            0
        } else {
            let sum: u32 = averages.iter().sum();
            (f64::from(sum) / averages.len() as f64).round() as u32
        },
        min: mins.iter().min().copied().unwrap_or(0),
        max: maxs.iter().max().copied().unwrap_or(0),
    }
}

fn bpm_part(value: Option<u32>) -> String {
    value.map_or_else(|| "N/A".to_owned(), |v| v.to_string())
}

fn session_bpm_line(session: &ActivitySession) -> String {
    let hr = session.heart_rate;
    format!(
        "- {} : {}-{} BPM (moy {})",
        session.date,
        bpm_part(hr.map(|h| h.min)),
        bpm_part(hr.map(|h| h.max)),
        bpm_part(hr.map(|h| h.average)),
    )
}

/// Render a deterministic, data-grounded reply
///
/// Never consults the LLM. With no session in the last 28 days the reply
/// states so explicitly instead of inventing figures.
// Long function: the short/structured variants are one rendering decision tree
#[must_use]
pub fn generate_fallback(
    activities: &[ActivitySession],
    options: &FallbackOptions,
    now: NaiveDate,
) -> String {
    let rolling = windowing::rolling_four_weeks_window(now);
    let recent = windowing::sessions_in_window(activities, &rolling);
    let current_window = windowing::current_week_window(now);
    let current_week: Vec<&ActivitySession> = recent
        .iter()
        .copied()
        .filter(|session| current_window.contains(session.date))
        .collect();
    let stats = statistics::compute_rolling_statistics(activities, now);
    let week = week_bpm(&current_week);

    if stats.total_activities == 0 {
        if options.short && options.focus == FallbackFocus::Bpm {
            return "Vous n'avez pas de données BPM enregistrées cette semaine.".to_owned();
        }
        return "Réponse sécurisée: je n'ai pas trouvé de données d'activité sur les 4 dernières semaines. Dès que vous enregistrez une activité, je pourrai détailler vos graphiques.".to_owned();
    }

    if options.short {
        if options.focus == FallbackFocus::Bpm {
            if !current_week.is_empty() && week.avg > 0 {
                let min_display = if week.min > 0 {
                    week.min
                } else if stats.min_bpm > 0 {
                    stats.min_bpm
                } else {
                    week.avg
                };
                let max_display = if week.max > 0 {
                    week.max
                } else if stats.max_bpm > 0 {
                    stats.max_bpm
                } else {
                    week.avg
                };
                return format!(
                    "Vos données BPM cette semaine : {} séance(s). Moyenne: {} BPM (plage {min_display}-{max_display}).",
                    current_week.len(),
                    week.avg
                );
            }
            return "Vous n'avez pas de données BPM enregistrées cette semaine.".to_owned();
        }
        let bpm_suffix = if stats.avg_bpm > 0 {
            format!(", moy BPM: {}", stats.avg_bpm)
        } else {
            String::new()
        };
        return format!(
            "Résumé : {} activité(s), {} km{bpm_suffix}.",
            stats.total_activities, stats.total_km
        );
    }

    let mut response = String::from("## Analyse de vos activités\n\n");
    response.push_str("**Résumé :**\n");
    response.push_str(&format!(
        "- Total: {} activité(s) enregistrée(s)\n",
        stats.total_activities
    ));
    response.push_str(&format!("- Distance totale: {}km\n", stats.total_km));
    if stats.avg_bpm > 0 {
        response.push_str(&format!(
            "- Fréquence cardiaque moyenne: {} BPM\n",
            stats.avg_bpm
        ));
        response.push_str(&format!("- Plage: {} - {} BPM\n", stats.min_bpm, stats.max_bpm));
    }

    if options.focus == FallbackFocus::Bpm && stats.avg_bpm > 0 {
        let mut sorted = recent.clone();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        let last_sessions = &sorted[..sorted.len().min(3)];

        response.push_str("\n**Focus BPM :**\n");
        if current_week.is_empty() {
            response.push_str(
                "- Aucun BPM enregistré cette semaine. Voici les dernières séances disponibles :\n",
            );
        } else {
            response.push_str(&format!(
                "- Semaine en cours : {} séance(s)\n",
                current_week.len()
            ));
            for session in &current_week {
                response.push_str(&format!("  {}\n", session_bpm_line(session)));
            }
        }
        for session in last_sessions {
            response.push_str(&format!("{}\n", session_bpm_line(session)));
        }
    }

    if options.include_advice {
        response.push_str("\n**Conseils :**\n");
        if stats.total_activities < 3 {
            response.push_str(
                "- Augmentez progressivement la fréquence de vos séances (visez 2-3 par semaine)\n",
            );
        }
        response.push_str("- Maintenez une hydratation régulière\n");
        response.push_str("- Écoutez votre corps et variez les intensités\n");
        response.push_str("\nContinuez vos efforts !");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn one_session() -> Vec<ActivitySession> {
        vec![
            ActivitySession::new(date(2025, 11, 18), 5.8, 38)
                .with_heart_rate(140, 178, 163)
                .with_calories(422),
        ]
    }

    fn short_bpm() -> FallbackOptions {
        FallbackOptions {
            focus: FallbackFocus::Bpm,
            short: true,
            include_advice: false,
        }
    }

    #[test]
    fn identical_inputs_render_identical_output() {
        let options = FallbackOptions {
            focus: FallbackFocus::General,
            short: true,
            include_advice: false,
        };
        let now = date(2025, 11, 23);
        let first = generate_fallback(&one_session(), &options, now);
        let second = generate_fallback(&one_session(), &options, now);
        assert_eq!(first, second);
    }

    #[test]
    fn no_recent_data_yields_the_safe_notice() {
        let reply = generate_fallback(&[], &FallbackOptions::default(), date(2025, 11, 23));
        assert_eq!(
            reply,
            "Réponse sécurisée: je n'ai pas trouvé de données d'activité sur les 4 dernières semaines. Dès que vous enregistrez une activité, je pourrai détailler vos graphiques."
        );
    }

    #[test]
    fn no_recent_data_with_short_bpm_focus_uses_the_week_wording() {
        let reply = generate_fallback(&[], &short_bpm(), date(2025, 11, 23));
        assert_eq!(reply, "Vous n'avez pas de données BPM enregistrées cette semaine.");
    }

    #[test]
    fn current_week_bpm_summary_reports_the_session() {
        // 2025-11-23 is the Sunday of the week containing the session
        let reply = generate_fallback(&one_session(), &short_bpm(), date(2025, 11, 23));
        assert_eq!(
            reply,
            "Vos données BPM cette semaine : 1 séance(s). Moyenne: 163 BPM (plage 140-178)."
        );
    }

    #[test]
    fn session_from_a_previous_week_is_not_reported_as_current() {
        // 2025-11-24 is the Monday after the session's week
        let reply = generate_fallback(&one_session(), &short_bpm(), date(2025, 11, 24));
        assert_eq!(reply, "Vous n'avez pas de données BPM enregistrées cette semaine.");
    }

    #[test]
    fn short_general_summary_quotes_window_totals() {
        let activities = vec![
            ActivitySession::new(date(2025, 11, 17), 5.0, 35).with_heart_rate(140, 170, 150),
            ActivitySession::new(date(2025, 11, 18), 4.0, 30).with_heart_rate(140, 170, 150),
            ActivitySession::new(date(2025, 11, 19), 3.3, 28).with_heart_rate(140, 170, 150),
        ];
        let options = FallbackOptions {
            focus: FallbackFocus::General,
            short: true,
            include_advice: false,
        };
        let reply = generate_fallback(&activities, &options, date(2025, 11, 23));
        assert_eq!(reply, "Résumé : 3 activité(s), 12.3 km, moy BPM: 150.");
    }

    #[test]
    fn structured_reply_has_summary_and_bpm_focus() {
        let options = FallbackOptions {
            focus: FallbackFocus::Bpm,
            short: false,
            include_advice: false,
        };
        let reply = generate_fallback(&one_session(), &options, date(2025, 11, 23));
        assert!(reply.starts_with("## Analyse de vos activités"));
        assert!(reply.contains("- Total: 1 activité(s) enregistrée(s)"));
        assert!(reply.contains("- Distance totale: 5.8km"));
        assert!(reply.contains("- Plage: 163 - 163 BPM"));
        assert!(reply.contains("**Focus BPM :**"));
        assert!(reply.contains("- Semaine en cours : 1 séance(s)"));
        assert!(reply.contains("  - 2025-11-18 : 140-178 BPM (moy 163)"));
        assert!(!reply.contains("**Conseils :**"));
    }

    #[test]
    fn structured_reply_notes_an_empty_current_week_before_older_sessions() {
        let options = FallbackOptions {
            focus: FallbackFocus::Bpm,
            short: false,
            include_advice: false,
        };
        let reply = generate_fallback(&one_session(), &options, date(2025, 11, 24));
        assert!(reply.contains("Aucun BPM enregistré cette semaine"));
        assert!(reply.contains("- 2025-11-18 : 140-178 BPM (moy 163)"));
    }

    #[test]
    fn advice_section_only_when_requested() {
        let options = FallbackOptions {
            focus: FallbackFocus::General,
            short: false,
            include_advice: true,
        };
        let reply = generate_fallback(&one_session(), &options, date(2025, 11, 23));
        assert!(reply.contains("**Conseils :**"));
        assert!(reply.contains("Augmentez progressivement la fréquence"));
        assert!(reply.ends_with("Continuez vos efforts !"));
    }

    #[test]
    fn bpm_focus_lists_at_most_three_recent_sessions() {
        let activities: Vec<ActivitySession> = (10..=18)
            .map(|day| {
                ActivitySession::new(date(2025, 11, day), 4.0, 30).with_heart_rate(130, 170, 150)
            })
            .collect();
        let options = FallbackOptions {
            focus: FallbackFocus::Bpm,
            short: false,
            include_advice: false,
        };
        let reply = generate_fallback(&activities, &options, date(2025, 11, 24));
        let listed = reply.matches("BPM (moy").count();
        assert_eq!(listed, 3);
        assert!(reply.contains("- 2025-11-18 : 130-170 BPM (moy 150)"));
        assert!(!reply.contains("2025-11-15"));
    }
}
