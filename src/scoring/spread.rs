use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::metrics::{scale_score, ThematicCategory};
use super::score::ReadingScore;
use crate::error::{ConfigurationError, EngineError, ValidationError};
use crate::settings::settings;

/// Per-spread score adjustment. Category multipliers only touch the extended
/// metrics; the base multiplier scales the core metrics and shade index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadModifier {
    pub base_multiplier: f64,
    #[serde(default)]
    pub category_multipliers: BTreeMap<ThematicCategory, f64>,
    #[serde(default)]
    pub thematic_bonus: Option<f64>,
}

impl SpreadModifier {
    pub fn category_multiplier(&self, category: ThematicCategory) -> f64 {
        self.category_multipliers
            .get(&category)
            .copied()
            .unwrap_or(1.0)
    }

    pub fn apply(&self, score: &ReadingScore) -> Result<ReadingScore, ValidationError> {
        score.validate()?;
        let bonus = self.thematic_bonus.unwrap_or(0.0);

        Ok(ReadingScore {
            core_metrics: score
                .core_metrics
                .map(|v| scale_score(v, self.base_multiplier, 0.0)),
            extended_metrics: score.extended_metrics.map_categories(|category, v| {
                scale_score(v, self.category_multiplier(category), bonus)
            }),
            shade_index: score.shade_index.scaled(self.base_multiplier),
        })
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigurationError> {
        let invalid = |value: f64| !value.is_finite() || value < 0.0;

        if invalid(self.base_multiplier) {
            return Err(ConfigurationError::InvalidMultiplier {
                owner: format!("spread '{name}'"),
                value: self.base_multiplier,
            });
        }
        for (category, multiplier) in &self.category_multipliers {
            if invalid(*multiplier) {
                return Err(ConfigurationError::InvalidMultiplier {
                    owner: format!("spread '{name}' category {category}"),
                    value: *multiplier,
                });
            }
        }
        if let Some(bonus) = self.thematic_bonus {
            if !bonus.is_finite() {
                return Err(ConfigurationError::InvalidMultiplier {
                    owner: format!("spread '{name}' thematic bonus"),
                    value: bonus,
                });
            }
        }
        Ok(())
    }
}

/// Spread names match exactly, with no trimming or case folding.
pub fn spread_modifier(spread_type: &str) -> Result<&'static SpreadModifier, ConfigurationError> {
    settings()
        .spreads
        .get(spread_type)
        .ok_or_else(|| ConfigurationError::UnknownSpread(spread_type.to_string()))
}

pub fn apply_spread_modifiers(
    score: &ReadingScore,
    spread_type: &str,
) -> Result<ReadingScore, EngineError> {
    Ok(spread_modifier(spread_type)?.apply(score)?)
}
