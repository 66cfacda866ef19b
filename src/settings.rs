use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

use crate::error::ConfigurationError;
use crate::scoring::metrics::{ThematicCategory, MAX_SCORE};
use crate::scoring::seasonal::{MonthDay, SeasonalEvent};
use crate::scoring::shade::{MAX_LEVEL, MIN_LEVEL};
use crate::scoring::spread::SpreadModifier;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub thresholds: Thresholds,
    pub weights: Weights,
    pub achievements: Achievements,
    pub patterns: Patterns,
    pub spreads: BTreeMap<String, SpreadModifier>,
    pub seasonal_events: Vec<SeasonalEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    pub core_metric_min: u8,
    pub shade_passing_level: u8,
    pub undertone_level: u8,
    pub guilt_trip_boost: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weights {
    pub core: CoreWeights,
    pub extended: BTreeMap<ThematicCategory, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreWeights {
    pub subtlety: f64,
    pub relatability: f64,
    pub wisdom: f64,
    pub creative: f64,
    pub humor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievements {
    pub cosmic_level: u8,
    pub deniability_pro: u8,
    pub comedy_gold: u8,
    pub instant_classic: u8,
    pub flawless_delivery: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patterns {
    pub theme_frequency: f64,
    pub growth_scale: f64,
    pub variety_weight: f64,
    pub spread_ratio_weight: f64,
    pub card_deviation_weight: f64,
}

const fn month_day(month: u32, day: u32) -> MonthDay {
    MonthDay::literal(month, day)
}

impl Default for Settings {
    fn default() -> Self {
        use ThematicCategory::*;

        Self {
            thresholds: Thresholds {
                core_metric_min: 80,
                shade_passing_level: 7,
                undertone_level: 3,
                guilt_trip_boost: 60,
            },
            weights: Weights {
                core: CoreWeights {
                    subtlety: 1.3,
                    relatability: 1.2,
                    wisdom: 1.0,
                    creative: 1.5,
                    humor: 2.0,
                },
                extended: BTreeMap::from([
                    (Snark, 1.4),
                    (CulturalResonance, 1.2),
                    (MetaphorMastery, 1.1),
                    (Quotability, 1.0),
                ]),
            },
            achievements: Achievements {
                cosmic_level: 10,
                deniability_pro: 95,
                comedy_gold: 95,
                instant_classic: 90,
                flawless_delivery: 95,
            },
            patterns: Patterns {
                theme_frequency: 0.3,
                growth_scale: 10.0,
                variety_weight: 20.0,
                spread_ratio_weight: 10.0,
                card_deviation_weight: 10.0,
            },
            spreads: BTreeMap::from([
                (
                    "classic".to_string(),
                    SpreadModifier {
                        base_multiplier: 1.0,
                        category_multipliers: BTreeMap::from([
                            (Snark, 1.4),
                            (CulturalResonance, 1.0),
                            (MetaphorMastery, 1.1),
                        ]),
                        thematic_bonus: None,
                    },
                ),
                (
                    "single-card".to_string(),
                    SpreadModifier {
                        base_multiplier: 0.95,
                        category_multipliers: BTreeMap::from([(Quotability, 1.3)]),
                        thematic_bonus: None,
                    },
                ),
                (
                    "three-card".to_string(),
                    SpreadModifier {
                        base_multiplier: 1.05,
                        category_multipliers: BTreeMap::from([
                            (Snark, 1.2),
                            (MetaphorMastery, 1.2),
                        ]),
                        thematic_bonus: None,
                    },
                ),
                (
                    "celtic-cross".to_string(),
                    SpreadModifier {
                        base_multiplier: 1.1,
                        category_multipliers: BTreeMap::from([
                            (Snark, 1.2),
                            (CulturalResonance, 1.3),
                            (MetaphorMastery, 1.5),
                            (Quotability, 1.1),
                        ]),
                        thematic_bonus: Some(5.0),
                    },
                ),
            ]),
            seasonal_events: vec![
                SeasonalEvent {
                    name: "Mercury Retrograde".to_string(),
                    start: month_day(12, 29),
                    end: month_day(1, 18),
                    score_multiplier: 1.3,
                    categories: vec![Snark, MetaphorMastery],
                },
                SeasonalEvent {
                    name: "Awards Season".to_string(),
                    start: month_day(1, 5),
                    end: month_day(3, 10),
                    score_multiplier: 1.2,
                    categories: vec![CulturalResonance, Quotability],
                },
                SeasonalEvent {
                    name: "Valentine's Week".to_string(),
                    start: month_day(2, 8),
                    end: month_day(2, 14),
                    score_multiplier: 1.25,
                    categories: vec![Snark, Quotability],
                },
                SeasonalEvent {
                    name: "Tax Season".to_string(),
                    start: month_day(3, 15),
                    end: month_day(4, 15),
                    score_multiplier: 1.1,
                    categories: vec![Snark],
                },
                SeasonalEvent {
                    name: "Spooky Season".to_string(),
                    start: month_day(10, 1),
                    end: month_day(10, 31),
                    score_multiplier: 1.25,
                    categories: vec![MetaphorMastery, CulturalResonance],
                },
                SeasonalEvent {
                    name: "Family Holiday Gauntlet".to_string(),
                    start: month_day(11, 20),
                    end: month_day(12, 28),
                    score_multiplier: 1.35,
                    categories: vec![Snark, CulturalResonance],
                },
            ],
        }
    }
}

impl Settings {
    /// Settings every scoring call reads. The built-in defaults, unless a
    /// caller installed others first; never touches the filesystem.
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(Settings::default)
    }

    /// Fixes the process-wide settings. Fails if scoring already ran or
    /// something else installed settings first.
    pub fn install(settings: Settings) -> Result<&'static Settings, ConfigurationError> {
        settings.validate()?;
        SETTINGS
            .set(settings)
            .map_err(|_| ConfigurationError::SettingsAlreadyInstalled)?;
        Ok(Self::load())
    }

    /// Reads `settings.default.ron` then `settings.ron` from `dir` and
    /// installs the result. Missing files fall back to the defaults.
    pub fn init_from_files(dir: &Path) -> Result<&'static Settings, ConfigurationError> {
        Self::install(Self::from_dir(dir)?)
    }

    pub fn from_dir(dir: &Path) -> Result<Settings, ConfigurationError> {
        let default_path = dir.join("settings.default.ron");
        let override_path = dir.join("settings.ron");

        let mut settings = Self::read_file(&default_path)?.unwrap_or_default();

        if let Some(overrides) = Self::read_file(&override_path)? {
            info!("using overrides from {}", override_path.display());
            settings = overrides;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn read_file(path: &Path) -> Result<Option<Settings>, ConfigurationError> {
        if !path.exists() {
            return Ok(None);
        }
        let file_error = |reason: String| ConfigurationError::SettingsFile {
            path: path.display().to_string(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        ron::from_str(&content)
            .map(Some)
            .map_err(|e| file_error(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let t = &self.thresholds;
        check_score("thresholds.core_metric_min", t.core_metric_min)?;
        check_score("thresholds.guilt_trip_boost", t.guilt_trip_boost)?;
        check_level("thresholds.shade_passing_level", t.shade_passing_level)?;
        check_level("thresholds.undertone_level", t.undertone_level)?;

        let a = &self.achievements;
        check_level("achievements.cosmic_level", a.cosmic_level)?;
        check_score("achievements.deniability_pro", a.deniability_pro)?;
        check_score("achievements.comedy_gold", a.comedy_gold)?;
        check_score("achievements.instant_classic", a.instant_classic)?;
        check_score("achievements.flawless_delivery", a.flawless_delivery)?;

        let w = &self.weights.core;
        check_weight("weights.core.subtlety", w.subtlety)?;
        check_weight("weights.core.relatability", w.relatability)?;
        check_weight("weights.core.wisdom", w.wisdom)?;
        check_weight("weights.core.creative", w.creative)?;
        check_weight("weights.core.humor", w.humor)?;
        for (category, weight) in &self.weights.extended {
            check_weight(&format!("weights.extended.{category}"), *weight)?;
        }

        let p = &self.patterns;
        if !(0.0..=1.0).contains(&p.theme_frequency) {
            return Err(invalid(
                "patterns.theme_frequency",
                format!("must be within 0-1 (got {})", p.theme_frequency),
            ));
        }
        check_weight("patterns.growth_scale", p.growth_scale)?;
        check_weight("patterns.variety_weight", p.variety_weight)?;
        check_weight("patterns.spread_ratio_weight", p.spread_ratio_weight)?;
        check_weight("patterns.card_deviation_weight", p.card_deviation_weight)?;

        for (name, spread) in &self.spreads {
            spread.validate(name)?;
        }
        for event in &self.seasonal_events {
            event.validate()?;
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> ConfigurationError {
    ConfigurationError::InvalidSetting {
        field: field.to_string(),
        reason,
    }
}

fn check_score(field: &str, value: u8) -> Result<(), ConfigurationError> {
    if value > MAX_SCORE {
        return Err(invalid(field, format!("must be within 0-100 (got {value})")));
    }
    Ok(())
}

fn check_level(field: &str, value: u8) -> Result<(), ConfigurationError> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&value) {
        return Err(invalid(field, format!("must be within 1-10 (got {value})")));
    }
    Ok(())
}

fn check_weight(field: &str, value: f64) -> Result<(), ConfigurationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            field,
            format!("must be a finite non-negative number (got {value})"),
        ));
    }
    Ok(())
}

pub fn settings() -> &'static Settings {
    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::metrics::{validate_core_metrics, CoreMetrics};

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_default_weights_max() {
        let w = &Settings::default().weights.core;
        let total = w.subtlety + w.relatability + w.wisdom + w.creative + w.humor;
        assert!((total - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_ron_round_trip_keeps_calendar() {
        let original = Settings::default();
        let text = ron::to_string(&original).expect("serialize settings");
        let parsed: Settings = ron::from_str(&text).expect("parse settings");
        assert_eq!(parsed.seasonal_events, original.seasonal_events);
        assert_eq!(parsed.spreads, original.spreads);
    }

    fn strict_ron() -> String {
        let mut strict = Settings::default();
        strict.thresholds.core_metric_min = 90;
        ron::to_string(&strict).expect("serialize settings")
    }

    #[test]
    fn test_scoring_ignores_stray_settings_file() {
        struct Cleanup;
        impl Drop for Cleanup {
            fn drop(&mut self) {
                let _ = fs::remove_file("settings.ron");
            }
        }

        fs::write("settings.ron", strict_ron()).expect("write stray settings");
        let _cleanup = Cleanup;

        assert_eq!(settings().thresholds.core_metric_min, 80);
        assert_eq!(validate_core_metrics(&CoreMetrics::uniform(80)), Ok(true));
    }

    #[test]
    fn test_install_after_first_use_is_rejected() {
        settings();
        assert_eq!(
            Settings::install(Settings::default()).unwrap_err(),
            ConfigurationError::SettingsAlreadyInstalled
        );
    }

    #[test]
    fn test_from_dir_reads_override() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert_eq!(
            Settings::from_dir(dir.path()).unwrap().thresholds.core_metric_min,
            80
        );

        fs::write(dir.path().join("settings.ron"), strict_ron()).unwrap();
        let loaded = Settings::from_dir(dir.path()).unwrap();
        assert_eq!(loaded.thresholds.core_metric_min, 90);
    }

    #[test]
    fn test_from_dir_reports_unparseable_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("settings.default.ron"), "(thresholds: oops").unwrap();
        assert!(matches!(
            Settings::from_dir(dir.path()),
            Err(ConfigurationError::SettingsFile { .. })
        ));
    }

    #[test]
    fn test_from_dir_rejects_out_of_bounds_values() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut bad = Settings::default();
        bad.thresholds.core_metric_min = 120;
        fs::write(dir.path().join("settings.ron"), ron::to_string(&bad).unwrap()).unwrap();
        assert!(matches!(
            Settings::from_dir(dir.path()),
            Err(ConfigurationError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_threshold_bounds() {
        let mut s = Settings::default();
        s.thresholds.core_metric_min = 101;
        assert_eq!(
            s.validate().unwrap_err().to_string(),
            "Invalid setting thresholds.core_metric_min: must be within 0-100 (got 101)"
        );

        let mut s = Settings::default();
        s.thresholds.shade_passing_level = 0;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.thresholds.undertone_level = 11;
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.patterns.theme_frequency = 1.5;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_weights_must_be_finite_and_non_negative() {
        let mut s = Settings::default();
        s.weights.core.humor = -2.0;
        assert!(matches!(
            s.validate(),
            Err(ConfigurationError::InvalidSetting { .. })
        ));

        let mut s = Settings::default();
        s.weights.extended.insert(ThematicCategory::Snark, f64::NAN);
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.patterns.growth_scale = f64::INFINITY;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_default_calendar_days_are_real() {
        for event in &Settings::default().seasonal_events {
            assert!(event.start.is_valid() && event.end.is_valid(), "{}", event.name);
        }
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let mut s = Settings::default();
        if let Some(classic) = s.spreads.get_mut("classic") {
            classic.base_multiplier = -1.0;
        }
        assert!(matches!(
            s.validate(),
            Err(ConfigurationError::InvalidMultiplier { .. })
        ));
    }
}
