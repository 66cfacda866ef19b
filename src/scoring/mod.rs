pub mod evaluator;
pub mod metrics;
pub mod patterns;
pub mod payload;
pub mod score;
pub mod seasonal;
pub mod shade;
pub mod spread;

pub use evaluator::{ModifierStage, ReadingEvaluation, ReadingEvaluator};
pub use metrics::{
    core_metric_breakdown, validate_core_metrics, CoreMetric, CoreMetrics, ExtendedMetrics,
    MetricCheck, ThematicCategory,
};
pub use patterns::{
    analyze_reading_patterns, DrawnCard, Interpretation, Reading, UserPatternTracking,
};
pub use payload::{parse_interpretation, parse_readings, InterpretationPayload};
pub use score::{
    calculate_extended_bonus, calculate_weighted_score, evaluate_reading_quality,
    get_score_classification, Achievement, QualityVerdict, ReadingScore, ScoreClassification,
    WeightedScore,
};
pub use seasonal::{calculate_seasonal_bonus, parse_date, MonthDay, SeasonalBonus, SeasonalEvent};
pub use shade::{
    calculate_shade_level, has_required_undertones, is_shade_level_passing, shade_breakdown,
    ShadeComponent, ShadeIndex, ShadeLevelDetails, ShadeTier, UndertoneStrength,
};
pub use spread::{apply_spread_modifiers, SpreadModifier};

#[cfg(test)]
mod tests {
    use super::*;

    fn index(values: [u8; 5]) -> ShadeIndex {
        ShadeIndex {
            plausible_deniability: values[0],
            guilt_trip_intensity: values[1],
            emotional_manipulation: values[2],
            backhanded_compliments: values[3],
            strategic_vagueness: values[4],
        }
    }

    #[test]
    fn test_shade_and_core_rubrics_are_independent() {
        let score = ReadingScore {
            core_metrics: CoreMetrics::uniform(80),
            extended_metrics: ExtendedMetrics::default(),
            shade_index: index([35, 40, 35, 38, 32]),
        };
        assert_eq!(validate_core_metrics(&score.core_metrics), Ok(true));
        assert_eq!(has_required_undertones(&score.shade_index), Ok(true));
        assert_eq!(is_shade_level_passing(&score.shade_index), Ok(false));
        assert!(!evaluate_reading_quality(&score).unwrap().is_passing);
    }

    #[test]
    fn test_full_flow_from_json() {
        let payload = parse_interpretation(
            r#"{"text": "Lovely. Truly.", "scores": {
                "coreMetrics": {"subtlety": 92, "relatability": 88, "wisdom": 81, "creative": 90, "humor": 97},
                "extendedMetrics": {"snark": 90, "culturalResonance": 70, "metaphorMastery": 80, "quotability": 91},
                "shadeIndex": {"plausibleDeniability": 96, "guiltTripIntensity": 80,
                    "emotionalManipulation": 82, "backhandedCompliments": 90, "strategicVagueness": 88}}}"#,
        )
        .unwrap();
        let evaluation = ReadingEvaluator::default()
            .evaluate(&payload, "classic", parse_date("2024-01-10").unwrap())
            .unwrap();

        assert!(evaluation.passes());
        assert_eq!(evaluation.shade.level, 8);
        assert_eq!(
            evaluation.verdict.achievements,
            vec![
                Achievement::LevelSeven,
                Achievement::DeniabilityPro,
                Achievement::ComedyGold,
                Achievement::InstantClassic,
            ]
        );
        assert_eq!(
            evaluation.seasonal.active_events,
            vec!["Mercury Retrograde", "Awards Season"]
        );
    }
}
