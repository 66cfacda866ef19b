use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::score::ReadingScore;
use crate::error::ValidationError;
use crate::settings::settings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawnCard {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default)]
    pub reversed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    pub text: String,
    pub scores: ReadingScore,
    #[serde(default)]
    pub themes: Vec<String>,
}

/// A past reading as stored by the persistence layer. Treated as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(default)]
    pub id: String,
    pub cards: Vec<DrawnCard>,
    pub interpretation: Interpretation,
    pub spread_type: String,
    pub created_at: String,
}

impl Reading {
    pub fn timestamp(&self) -> Result<DateTime<Utc>, ValidationError> {
        let raw = self.created_at.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| ValidationError::InvalidTimestamp {
                reading: self.id.clone(),
                value: self.created_at.clone(),
            })
    }

    fn normalized_themes(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.interpretation
            .themes
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UserPatternTracking {
    pub repeated_themes: Vec<String>,
    pub sophistication_growth: f64,
    pub consistency_score: u8,
}

impl UserPatternTracking {
    /// Short lines describing the history, handed to the interpretation
    /// generator as context for the next reading.
    pub fn context_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.repeated_themes.is_empty() {
            lines.push(format!(
                "Recurring themes: {}",
                self.repeated_themes.join(", ")
            ));
        }
        lines.push(format!(
            "Sophistication growth: {:.0}/100",
            self.sophistication_growth
        ));
        lines.push(format!("Consistency: {}/100", self.consistency_score));
        lines
    }
}

pub fn analyze_reading_patterns(
    readings: &[Reading],
) -> Result<UserPatternTracking, ValidationError> {
    if readings.is_empty() {
        return Ok(UserPatternTracking::default());
    }
    for reading in readings {
        reading.interpretation.scores.validate()?;
    }

    let mut dated = readings
        .iter()
        .map(|r| r.timestamp().map(|ts| (ts, r)))
        .collect::<Result<Vec<_>, _>>()?;
    dated.sort_by_key(|(ts, _)| *ts);
    let chronological: Vec<&Reading> = dated.into_iter().map(|(_, r)| r).collect();

    Ok(UserPatternTracking {
        repeated_themes: repeated_themes(readings),
        sophistication_growth: sophistication_growth(&chronological),
        consistency_score: consistency_score(readings),
    })
}

fn repeated_themes(readings: &[Reading]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for reading in readings {
        for theme in reading.normalized_themes() {
            match counts.iter_mut().find(|(t, _)| *t == theme) {
                Some((_, count)) => *count += 1,
                None => counts.push((theme, 1)),
            }
        }
    }

    let min_frequency = settings().patterns.theme_frequency;
    let total = readings.len() as f64;
    counts.retain(|(_, count)| *count as f64 / total >= min_frequency);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(theme, _)| theme).collect()
}

fn sophistication_growth(chronological: &[&Reading]) -> f64 {
    if chronological.len() < 2 {
        return 0.0;
    }

    let means: Vec<f64> = chronological
        .iter()
        .map(|r| r.interpretation.scores.shade_index.average())
        .collect();
    let positive: f64 = means
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .filter(|delta| *delta > 0.0)
        .sum();

    let steps = (chronological.len() - 1) as f64;
    (positive / steps * settings().patterns.growth_scale).min(100.0)
}

fn consistency_score(readings: &[Reading]) -> u8 {
    let p = &settings().patterns;

    let spreads: HashSet<&str> = readings.iter().map(|r| r.spread_type.as_str()).collect();
    let variety = spreads.len() as f64;
    let total = readings.len() as f64;
    let variety_score = (variety * p.variety_weight + total / variety * p.spread_ratio_weight)
        .min(100.0);

    let mut card_counts: HashMap<&str, usize> = HashMap::new();
    for card in readings.iter().flat_map(|r| r.cards.iter()) {
        *card_counts.entry(card.name.as_str()).or_default() += 1;
    }
    let frequencies: Vec<f64> = card_counts.values().map(|c| *c as f64).collect();
    let repetition_score =
        (100.0 - std_deviation(&frequencies) * p.card_deviation_weight).clamp(0.0, 100.0);

    ((variety_score + repetition_score) / 2.0).round() as u8
}

fn std_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::shade::ShadeIndex;

    fn reading(
        id: &str,
        created_at: &str,
        spread: &str,
        shade: u8,
        cards: &[&str],
        themes: &[&str],
    ) -> Reading {
        Reading {
            id: id.to_string(),
            cards: cards
                .iter()
                .map(|name| DrawnCard {
                    name: name.to_string(),
                    position: None,
                    reversed: false,
                })
                .collect(),
            interpretation: Interpretation {
                text: String::new(),
                scores: ReadingScore {
                    shade_index: ShadeIndex::uniform(shade),
                    ..Default::default()
                },
                themes: themes.iter().map(|t| t.to_string()).collect(),
            },
            spread_type: spread.to_string(),
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn test_empty_history() {
        let tracking = analyze_reading_patterns(&[]).unwrap();
        assert_eq!(tracking, UserPatternTracking::default());
    }

    #[test]
    fn test_single_reading_has_no_growth() {
        let history = [reading(
            "a",
            "2024-01-01T10:00:00Z",
            "classic",
            80,
            &["The Fool", "The Tower", "The Star"],
            &["career"],
        )];
        let tracking = analyze_reading_patterns(&history).unwrap();
        assert_eq!(tracking.sophistication_growth, 0.0);
        assert_eq!(tracking.repeated_themes, vec!["career".to_string()]);
        // variety 1*20 + 1/1*10 = 30, no repeated cards = 100
        assert_eq!(tracking.consistency_score, 65);
    }

    #[test]
    fn test_growth_uses_chronological_order() {
        // supplied out of order: means 40 -> 50 -> 45 -> 65 once sorted
        let history = [
            reading("c", "2024-03-01T00:00:00Z", "classic", 45, &[], &[]),
            reading("a", "2024-01-01T00:00:00Z", "classic", 40, &[], &[]),
            reading("d", "2024-04-01T00:00:00+02:00", "classic", 65, &[], &[]),
            reading("b", "2024-02-01T00:00:00Z", "classic", 50, &[], &[]),
        ];
        let tracking = analyze_reading_patterns(&history).unwrap();
        // positive deltas 10 + 20 over 3 steps, scaled by 10
        assert!((tracking.sophistication_growth - 100.0).abs() < 1e-9);

        let modest = [
            reading("a", "2024-01-01T00:00:00Z", "classic", 40, &[], &[]),
            reading("b", "2024-01-02T00:00:00Z", "classic", 41, &[], &[]),
            reading("c", "2024-01-03T00:00:00Z", "classic", 39, &[], &[]),
        ];
        let tracking = analyze_reading_patterns(&modest).unwrap();
        assert!((tracking.sophistication_growth - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_themes_threshold_and_order() {
        let history = [
            reading("1", "2024-01-01T00:00:00Z", "classic", 50, &[], &["Love", "money"]),
            reading("2", "2024-01-02T00:00:00Z", "classic", 50, &[], &["money", "love "]),
            reading("3", "2024-01-03T00:00:00Z", "classic", 50, &[], &["travel", "money"]),
            reading("4", "2024-01-04T00:00:00Z", "classic", 50, &[], &["health"]),
        ];
        let tracking = analyze_reading_patterns(&history).unwrap();
        // money 3/4, love 2/4, travel and health 1/4 < 0.3
        assert_eq!(
            tracking.repeated_themes,
            vec!["money".to_string(), "love".to_string()]
        );
    }

    #[test]
    fn test_theme_ties_keep_first_appearance() {
        let history = [
            reading("1", "2024-01-01T00:00:00Z", "classic", 50, &[], &["shadow", "light"]),
            reading(
                "2",
                "2024-01-02T00:00:00Z",
                "classic",
                50,
                &[],
                &["light", "shadow", "shadow"],
            ),
        ];
        let tracking = analyze_reading_patterns(&history).unwrap();
        assert_eq!(
            tracking.repeated_themes,
            vec!["shadow".to_string(), "light".to_string()]
        );
    }

    #[test]
    fn test_consistency_with_repeated_cards() {
        let history = [
            reading("1", "2024-01-01T00:00:00Z", "classic", 50, &["The Moon", "The Sun"], &[]),
            reading("2", "2024-01-02T00:00:00Z", "celtic-cross", 50, &["The Moon", "Death"], &[]),
            reading("3", "2024-01-03T00:00:00Z", "classic", 50, &["The Moon", "The Sun"], &[]),
            reading("4", "2024-01-04T00:00:00Z", "three-card", 50, &["The Moon"], &[]),
        ];
        let tracking = analyze_reading_patterns(&history).unwrap();
        // variety: 3*20 + 4/3*10 = 73.33
        // frequencies [4, 2, 1]: mean 7/3, stddev ~1.2472 -> 87.53
        assert_eq!(tracking.consistency_score, 80);
    }

    #[test]
    fn test_naive_timestamp_accepted() {
        let history = [
            reading("1", "2024-01-01T08:30:00", "classic", 40, &[], &[]),
            reading("2", "2024-01-02T08:30:00.250", "classic", 60, &[], &[]),
        ];
        let tracking = analyze_reading_patterns(&history).unwrap();
        assert!((tracking.sophistication_growth - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_timestamp_is_validation_error() {
        let history = [reading("broken", "last tuesday", "classic", 50, &[], &[])];
        assert_eq!(
            analyze_reading_patterns(&history),
            Err(ValidationError::InvalidTimestamp {
                reading: "broken".into(),
                value: "last tuesday".into()
            })
        );
    }

    #[test]
    fn test_out_of_range_history_score_is_rejected() {
        let mut history = [
            reading("1", "2024-01-01T00:00:00Z", "classic", 50, &[], &[]),
            reading("2", "2024-01-02T00:00:00Z", "classic", 60, &[], &[]),
        ];
        history[1].interpretation.scores.shade_index.strategic_vagueness = 101;
        assert_eq!(
            analyze_reading_patterns(&history),
            Err(ValidationError::OutOfRange {
                field: "strategicVagueness",
                value: 101
            })
        );
    }

    #[test]
    fn test_context_lines() {
        let tracking = UserPatternTracking {
            repeated_themes: vec!["money".into(), "love".into()],
            sophistication_growth: 42.4,
            consistency_score: 71,
        };
        assert_eq!(
            tracking.context_lines(),
            vec![
                "Recurring themes: money, love".to_string(),
                "Sophistication growth: 42/100".to_string(),
                "Consistency: 71/100".to_string(),
            ]
        );
    }
}
