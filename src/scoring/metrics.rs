use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{ConfigurationError, ValidationError};
use crate::settings::settings;

pub const MAX_SCORE: u8 = 100;

pub(crate) fn check_range(field: &'static str, value: u8) -> Result<(), ValidationError> {
    if value > MAX_SCORE {
        return Err(ValidationError::OutOfRange {
            field,
            value: value.into(),
        });
    }
    Ok(())
}

pub(crate) fn scale_score(value: u8, multiplier: f64, bonus: f64) -> u8 {
    (value as f64 * multiplier + bonus)
        .round()
        .clamp(0.0, MAX_SCORE as f64) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum CoreMetric {
    #[strum(serialize = "subtlety")]
    Subtlety,
    #[strum(serialize = "relatability")]
    Relatability,
    #[strum(serialize = "wisdom")]
    Wisdom,
    #[strum(serialize = "creative")]
    Creative,
    #[strum(serialize = "humor")]
    Humor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoreMetrics {
    pub subtlety: u8,
    pub relatability: u8,
    pub wisdom: u8,
    pub creative: u8,
    pub humor: u8,
}

impl CoreMetrics {
    pub fn uniform(value: u8) -> Self {
        Self {
            subtlety: value,
            relatability: value,
            wisdom: value,
            creative: value,
            humor: value,
        }
    }

    pub fn get(&self, metric: CoreMetric) -> u8 {
        match metric {
            CoreMetric::Subtlety => self.subtlety,
            CoreMetric::Relatability => self.relatability,
            CoreMetric::Wisdom => self.wisdom,
            CoreMetric::Creative => self.creative,
            CoreMetric::Humor => self.humor,
        }
    }

    pub(crate) fn map(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            subtlety: f(self.subtlety),
            relatability: f(self.relatability),
            wisdom: f(self.wisdom),
            creative: f(self.creative),
            humor: f(self.humor),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for metric in CoreMetric::iter() {
            check_range(metric.into(), self.get(metric))?;
        }
        Ok(())
    }
}

/// Result of checking one core metric against the minimum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCheck {
    pub metric: CoreMetric,
    pub score: u8,
    pub passed: bool,
}

impl Serialize for CoreMetric {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name: &'static str = (*self).into();
        serializer.serialize_str(name)
    }
}

pub fn core_metric_breakdown(
    metrics: &CoreMetrics,
) -> Result<Vec<MetricCheck>, ValidationError> {
    metrics.validate()?;
    let minimum = settings().thresholds.core_metric_min;
    Ok(CoreMetric::iter()
        .map(|metric| {
            let score = metrics.get(metric);
            MetricCheck {
                metric,
                score,
                passed: score >= minimum,
            }
        })
        .collect())
}

/// All five core metrics must reach the minimum; there is no partial credit.
pub fn validate_core_metrics(metrics: &CoreMetrics) -> Result<bool, ValidationError> {
    Ok(core_metric_breakdown(metrics)?
        .iter()
        .all(|check| check.passed))
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ThematicCategory {
    Snark,
    CulturalResonance,
    MetaphorMastery,
    Quotability,
}

impl ThematicCategory {
    pub fn parse(name: &str) -> Result<Self, ConfigurationError> {
        Self::from_str(name.trim())
            .map_err(|_| ConfigurationError::UnknownCategory(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedMetrics {
    pub snark: u8,
    pub cultural_resonance: u8,
    pub metaphor_mastery: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotability: Option<u8>,
}

impl ExtendedMetrics {
    pub fn get(&self, category: ThematicCategory) -> Option<u8> {
        match category {
            ThematicCategory::Snark => Some(self.snark),
            ThematicCategory::CulturalResonance => Some(self.cultural_resonance),
            ThematicCategory::MetaphorMastery => Some(self.metaphor_mastery),
            ThematicCategory::Quotability => self.quotability,
        }
    }

    /// Categories carrying a score, in declaration order.
    pub fn categories(&self) -> Vec<ThematicCategory> {
        ThematicCategory::iter()
            .filter(|c| self.get(*c).is_some())
            .collect()
    }

    pub(crate) fn map_categories(&self, f: impl Fn(ThematicCategory, u8) -> u8) -> Self {
        Self {
            snark: f(ThematicCategory::Snark, self.snark),
            cultural_resonance: f(ThematicCategory::CulturalResonance, self.cultural_resonance),
            metaphor_mastery: f(ThematicCategory::MetaphorMastery, self.metaphor_mastery),
            quotability: self
                .quotability
                .map(|q| f(ThematicCategory::Quotability, q)),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for category in ThematicCategory::iter() {
            if let Some(value) = self.get(category) {
                check_range(category.into(), value)?;
            }
        }
        Ok(())
    }
}
