use chrono::NaiveDate;
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::debug;

use super::metrics::{core_metric_breakdown, MetricCheck};
use super::payload::InterpretationPayload;
use super::score::{
    calculate_extended_bonus, calculate_weighted_score, evaluate_reading_quality,
    get_score_classification, QualityVerdict, ReadingScore, ScoreClassification, WeightedScore,
};
use super::seasonal::{calculate_seasonal_bonus, SeasonalBonus};
use super::shade::{
    calculate_shade_level, shade_breakdown, ShadeComponentFeedback, ShadeLevelDetails,
};
use super::spread::apply_spread_modifiers;
use crate::error::EngineError;

/// Which scores the rubric judges: the spread-adjusted ones, or the raw ones
/// with adjustments kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum ModifierStage {
    #[default]
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingEvaluation {
    pub spread_type: String,
    pub stage: ModifierStage,
    pub raw_scores: ReadingScore,
    pub modified_scores: ReadingScore,
    pub shade: ShadeLevelDetails,
    pub shade_breakdown: Vec<ShadeComponentFeedback>,
    pub core_checks: Vec<MetricCheck>,
    pub verdict: QualityVerdict,
    pub weighted: WeightedScore,
    pub classification: ScoreClassification,
    pub extended_bonus: WeightedScore,
    pub seasonal: SeasonalBonus,
}

impl ReadingEvaluation {
    pub fn passes(&self) -> bool {
        self.verdict.is_passing
    }

    /// Scores the rubric was applied to.
    pub fn judged_scores(&self) -> &ReadingScore {
        match self.stage {
            ModifierStage::Before => &self.modified_scores,
            ModifierStage::After => &self.raw_scores,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReadingEvaluator {
    pub stage: ModifierStage,
}

impl ReadingEvaluator {
    pub fn new(stage: ModifierStage) -> Self {
        Self { stage }
    }

    pub fn evaluate(
        &self,
        payload: &InterpretationPayload,
        spread_type: &str,
        today: NaiveDate,
    ) -> Result<ReadingEvaluation, EngineError> {
        payload.validate()?;

        let raw = payload.scores;
        let modified = apply_spread_modifiers(&raw, spread_type)?;
        let judged = match self.stage {
            ModifierStage::Before => &modified,
            ModifierStage::After => &raw,
        };

        let verdict = evaluate_reading_quality(judged)?;
        let weighted = calculate_weighted_score(&modified.core_metrics)?;
        let classification = get_score_classification(weighted.percent());
        let seasonal = calculate_seasonal_bonus(
            weighted.percent().round() as u32,
            &modified.extended_metrics.categories(),
            today,
        );

        debug!(
            spread = spread_type,
            stage = %self.stage,
            level = verdict.shade_level,
            passing = verdict.is_passing,
            "evaluated reading"
        );

        Ok(ReadingEvaluation {
            spread_type: spread_type.to_string(),
            stage: self.stage,
            raw_scores: raw,
            modified_scores: modified,
            shade: calculate_shade_level(&judged.shade_index)?,
            shade_breakdown: shade_breakdown(&judged.shade_index)?,
            core_checks: core_metric_breakdown(&judged.core_metrics)?,
            verdict,
            weighted,
            classification,
            extended_bonus: calculate_extended_bonus(&modified.extended_metrics)?,
            seasonal,
        })
    }
}
