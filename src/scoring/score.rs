use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::metrics::{core_metric_breakdown, CoreMetric, CoreMetrics, ExtendedMetrics};
use super::shade::{has_required_undertones, is_shade_level_passing, shade_level, ShadeIndex};
use crate::error::ValidationError;
use crate::settings::settings;

/// Everything the interpretation model scores for a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingScore {
    pub core_metrics: CoreMetrics,
    pub extended_metrics: ExtendedMetrics,
    pub shade_index: ShadeIndex,
}

impl ReadingScore {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.core_metrics.validate()?;
        self.extended_metrics.validate()?;
        self.shade_index.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WeightedScore {
    pub weighted: f64,
    pub max: f64,
}

impl WeightedScore {
    pub fn percent(&self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.weighted / self.max * 100.0
    }
}

pub fn core_weight(metric: CoreMetric) -> f64 {
    let w = &settings().weights.core;
    match metric {
        CoreMetric::Subtlety => w.subtlety,
        CoreMetric::Relatability => w.relatability,
        CoreMetric::Wisdom => w.wisdom,
        CoreMetric::Creative => w.creative,
        CoreMetric::Humor => w.humor,
    }
}

/// Display-only aggregate; never consulted for pass/fail.
pub fn calculate_weighted_score(
    metrics: &CoreMetrics,
) -> Result<WeightedScore, ValidationError> {
    metrics.validate()?;
    Ok(CoreMetric::iter().fold(WeightedScore::default(), |acc, metric| {
        let weight = core_weight(metric);
        WeightedScore {
            weighted: acc.weighted + metrics.get(metric) as f64 * weight,
            max: acc.max + weight * 100.0,
        }
    }))
}

pub fn calculate_extended_bonus(
    metrics: &ExtendedMetrics,
) -> Result<WeightedScore, ValidationError> {
    metrics.validate()?;
    let weights = &settings().weights.extended;
    Ok(metrics
        .categories()
        .into_iter()
        .fold(WeightedScore::default(), |acc, category| {
            let weight = weights.get(&category).copied().unwrap_or(1.0);
            let value = metrics.get(category).unwrap_or(0) as f64;
            WeightedScore {
                weighted: acc.weighted + value * weight,
                max: acc.max + weight * 100.0,
            }
        }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum ScoreClassification {
    #[strum(to_string = "Cosmic Level Shade")]
    CosmicLevelShade,
    #[strum(to_string = "Expert Passive Aggression")]
    ExpertPassiveAggression,
    #[strum(to_string = "Advanced Sass Master")]
    AdvancedSassMaster,
    #[strum(to_string = "Promising Shade Apprentice")]
    PromisingShadeApprentice,
    #[strum(to_string = "Needs More Side-Eye")]
    NeedsMoreSideEye,
}

pub fn get_score_classification(score: f64) -> ScoreClassification {
    let score10 = (score / 10.0).round();
    if score10 >= 9.0 {
        ScoreClassification::CosmicLevelShade
    } else if score10 >= 8.0 {
        ScoreClassification::ExpertPassiveAggression
    } else if score10 >= 7.0 {
        ScoreClassification::AdvancedSassMaster
    } else if score10 >= 6.0 {
        ScoreClassification::PromisingShadeApprentice
    } else {
        ScoreClassification::NeedsMoreSideEye
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
pub enum Achievement {
    #[strum(to_string = "Level 7 Achievement")]
    LevelSeven,
    #[strum(to_string = "Cosmic Shade")]
    CosmicShade,
    #[strum(to_string = "Plausible Deniability Pro")]
    DeniabilityPro,
    #[strum(to_string = "Comedy Gold")]
    ComedyGold,
    #[strum(to_string = "Instant Classic")]
    InstantClassic,
    #[strum(to_string = "Flawless Delivery")]
    FlawlessDelivery,
}

impl Achievement {
    fn is_unlocked(&self, score: &ReadingScore, level: u8) -> bool {
        let s = settings();
        let a = &s.achievements;
        match self {
            Self::LevelSeven => level >= s.thresholds.shade_passing_level,
            Self::CosmicShade => level >= a.cosmic_level,
            Self::DeniabilityPro => score.shade_index.plausible_deniability >= a.deniability_pro,
            Self::ComedyGold => score.core_metrics.humor >= a.comedy_gold,
            Self::InstantClassic => score
                .extended_metrics
                .quotability
                .is_some_and(|q| q >= a.instant_classic),
            Self::FlawlessDelivery => CoreMetric::iter()
                .all(|m| score.core_metrics.get(m) >= a.flawless_delivery),
        }
    }
}

pub fn unlocked_achievements(
    score: &ReadingScore,
) -> Result<Vec<Achievement>, ValidationError> {
    score.validate()?;
    let level = shade_level(&score.shade_index)?;
    Ok(Achievement::iter()
        .filter(|a| a.is_unlocked(score, level))
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityVerdict {
    pub is_passing: bool,
    pub core_passing: bool,
    pub shade_passing: bool,
    pub has_undertones: bool,
    pub shade_level: u8,
    pub feedback: Vec<String>,
    pub achievements: Vec<Achievement>,
}

/// A reading passes only when the core metrics, the Shade Level threshold and
/// the undertone minimum all hold. Each check is evaluated on its own.
pub fn evaluate_reading_quality(
    score: &ReadingScore,
) -> Result<QualityVerdict, ValidationError> {
    score.validate()?;
    let mut feedback = Vec::new();

    let checks = core_metric_breakdown(&score.core_metrics)?;
    for check in checks.iter().filter(|c| !c.passed) {
        feedback.push(format!("{} needs work ({}/100)", check.metric, check.score));
    }
    let core_passing = checks.iter().all(|c| c.passed);

    let level = shade_level(&score.shade_index)?;
    let shade_passing = is_shade_level_passing(&score.shade_index)?;
    if !shade_passing {
        feedback.push(format!("Shade Level™ too low (Level {level})"));
    }

    let has_undertones = has_required_undertones(&score.shade_index)?;
    if !has_undertones {
        feedback.push(format!("Missing required undertones (Level {level})"));
    }

    let achievements = unlocked_achievements(score)?;
    for achievement in &achievements {
        feedback.push(format!("Achievement unlocked: {achievement}"));
    }

    Ok(QualityVerdict {
        is_passing: core_passing && shade_passing && has_undertones,
        core_passing,
        shade_passing,
        has_undertones,
        shade_level: level,
        feedback,
        achievements,
    })
}
