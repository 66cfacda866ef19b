use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use super::metrics::{check_range, scale_score};
use crate::error::ValidationError;
use crate::settings::settings;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;

const HIGH_COMPONENT_SCORE: u8 = 80;
const MEDIUM_COMPONENT_SCORE: u8 = 50;

/// Five-part passive-aggression vector reported by the interpretation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadeIndex {
    pub plausible_deniability: u8,
    pub guilt_trip_intensity: u8,
    pub emotional_manipulation: u8,
    pub backhanded_compliments: u8,
    pub strategic_vagueness: u8,
}

impl ShadeIndex {
    pub fn uniform(value: u8) -> Self {
        Self {
            plausible_deniability: value,
            guilt_trip_intensity: value,
            emotional_manipulation: value,
            backhanded_compliments: value,
            strategic_vagueness: value,
        }
    }

    pub fn get(&self, component: ShadeComponent) -> u8 {
        match component {
            ShadeComponent::PlausibleDeniability => self.plausible_deniability,
            ShadeComponent::GuiltTripIntensity => self.guilt_trip_intensity,
            ShadeComponent::EmotionalManipulation => self.emotional_manipulation,
            ShadeComponent::BackhandedCompliments => self.backhanded_compliments,
            ShadeComponent::StrategicVagueness => self.strategic_vagueness,
        }
    }

    pub fn average(&self) -> f64 {
        let total: u32 = ShadeComponent::iter().map(|c| self.get(c) as u32).sum();
        total as f64 / 5.0
    }

    pub(crate) fn scaled(&self, multiplier: f64) -> Self {
        Self {
            plausible_deniability: scale_score(self.plausible_deniability, multiplier, 0.0),
            guilt_trip_intensity: scale_score(self.guilt_trip_intensity, multiplier, 0.0),
            emotional_manipulation: scale_score(self.emotional_manipulation, multiplier, 0.0),
            backhanded_compliments: scale_score(self.backhanded_compliments, multiplier, 0.0),
            strategic_vagueness: scale_score(self.strategic_vagueness, multiplier, 0.0),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for component in ShadeComponent::iter() {
            check_range(component.into(), self.get(component))?;
        }
        Ok(())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr, Serialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ShadeComponent {
    #[strum(serialize = "plausibleDeniability")]
    PlausibleDeniability,
    #[strum(serialize = "guiltTripIntensity")]
    GuiltTripIntensity,
    #[strum(serialize = "emotionalManipulation")]
    EmotionalManipulation,
    #[strum(serialize = "backhandedCompliments")]
    BackhandedCompliments,
    #[strum(serialize = "strategicVagueness")]
    StrategicVagueness,
}

impl ShadeComponent {
    pub fn feedback(&self, score: u8) -> &'static str {
        let tier = if score >= HIGH_COMPONENT_SCORE {
            0
        } else if score >= MEDIUM_COMPONENT_SCORE {
            1
        } else {
            2
        };
        let table: [&'static str; 3] = match self {
            Self::PlausibleDeniability => [
                "Impeccable deniability. Nobody could ever prove a thing.",
                "Mostly deniable, though a sharp reader might catch on.",
                "Far too direct. The intent is showing.",
            ],
            Self::GuiltTripIntensity => [
                "A guilt trip with first-class upgrades.",
                "A respectable guilt trip, economy seating.",
                "Barely a guilt errand.",
            ],
            Self::EmotionalManipulation => [
                "Masterful emotional choreography.",
                "Some strings are being pulled, gently.",
                "The puppet strings are slack.",
            ],
            Self::BackhandedCompliments => [
                "Compliments so backhanded they loop back around.",
                "A few well-placed 'for someone like you' moments.",
                "The compliments are suspiciously sincere.",
            ],
            Self::StrategicVagueness => [
                "Perfectly, infuriatingly vague.",
                "Vague enough to be interesting.",
                "Alarmingly specific. Add more 'we'll see'.",
            ],
        };
        table[tier]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum UndertoneStrength {
    None,
    Subtle,
    Moderate,
    Strong,
    Devastating,
}

impl UndertoneStrength {
    pub fn color_class(&self) -> &'static str {
        match self {
            Self::None => "shade-none",
            Self::Subtle => "shade-subtle",
            Self::Moderate => "shade-moderate",
            Self::Strong => "shade-strong",
            Self::Devastating => "shade-devastating",
        }
    }
}

/// The ten Shade Level tiers, one per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
pub enum ShadeTier {
    #[strum(to_string = "Sweet Summer Child")]
    SweetSummerChild,
    #[strum(to_string = "The Raised Eyebrow")]
    RaisedEyebrow,
    #[strum(to_string = "The Pointed Pause")]
    PointedPause,
    #[strum(to_string = "The Extended Pointed Pause")]
    ExtendedPointedPause,
    #[strum(to_string = "The Loaded 'Interesting'")]
    LoadedInteresting,
    #[strum(to_string = "Per My Last Email")]
    PerMyLastEmail,
    #[strum(to_string = "Bless Your Heart")]
    BlessYourHeart,
    #[strum(to_string = "The Compliment Sandwich")]
    ComplimentSandwich,
    #[strum(to_string = "The Velvet Dagger")]
    VelvetDagger,
    #[strum(to_string = "The Silent Treatment Supreme")]
    SilentTreatmentSupreme,
}

impl ShadeTier {
    pub fn from_level(level: u8) -> Self {
        match level {
            ..=1 => Self::SweetSummerChild,
            2 => Self::RaisedEyebrow,
            3 => Self::PointedPause,
            4 => Self::ExtendedPointedPause,
            5 => Self::LoadedInteresting,
            6 => Self::PerMyLastEmail,
            7 => Self::BlessYourHeart,
            8 => Self::ComplimentSandwich,
            9 => Self::VelvetDagger,
            10.. => Self::SilentTreatmentSupreme,
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Self::SweetSummerChild => 1,
            Self::RaisedEyebrow => 2,
            Self::PointedPause => 3,
            Self::ExtendedPointedPause => 4,
            Self::LoadedInteresting => 5,
            Self::PerMyLastEmail => 6,
            Self::BlessYourHeart => 7,
            Self::ComplimentSandwich => 8,
            Self::VelvetDagger => 9,
            Self::SilentTreatmentSupreme => 10,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SweetSummerChild => "No detectable shade. Suspiciously sincere.",
            Self::RaisedEyebrow => "A flicker of judgement, easily missed.",
            Self::PointedPause => "Clear undertones. The silence says plenty.",
            Self::ExtendedPointedPause => "The pause lingers just long enough to sting.",
            Self::LoadedInteresting => "Every 'interesting' is doing heavy lifting.",
            Self::PerMyLastEmail => "Professional courtesy with a serrated edge.",
            Self::BlessYourHeart => "Warmth on the surface, frost underneath.",
            Self::ComplimentSandwich => "Praise, critique, praise, and the critique wins.",
            Self::VelvetDagger => "So gentle you thank it for the wound.",
            Self::SilentTreatmentSupreme => "The cosmos itself takes notes.",
        }
    }

    pub fn feedback(&self) -> &'static str {
        match self {
            Self::SweetSummerChild => "Try implying something. Anything.",
            Self::RaisedEyebrow => "Lean into the subtext a little more.",
            Self::PointedPause => "Undertones present. Now sharpen them.",
            Self::ExtendedPointedPause => "Good restraint. Add a backhanded compliment.",
            Self::LoadedInteresting => "Halfway to mastery. Commit to the side-eye.",
            Self::PerMyLastEmail => "Almost there. One more plausible denial.",
            Self::BlessYourHeart => "Passing shade. The rubric is satisfied.",
            Self::ComplimentSandwich => "Expert layering of sweetness and spite.",
            Self::VelvetDagger => "Devastating and deniable. Well done.",
            Self::SilentTreatmentSupreme => "Nothing left to teach.",
        }
    }

    pub fn undertone_strength(&self) -> UndertoneStrength {
        match self.level() {
            ..=2 => UndertoneStrength::None,
            3..=4 => UndertoneStrength::Subtle,
            5..=6 => UndertoneStrength::Moderate,
            7..=8 => UndertoneStrength::Strong,
            _ => UndertoneStrength::Devastating,
        }
    }
}

/// Display view of a Shade Level, recomputed from the index on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadeLevelDetails {
    pub level: u8,
    pub tier: ShadeTier,
    pub title: String,
    pub description: String,
    pub feedback: String,
    pub undertone_strength: UndertoneStrength,
    pub color_class: String,
}

impl ShadeLevelDetails {
    pub fn label(&self) -> String {
        format!("Level {}", self.level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadeComponentFeedback {
    pub component: ShadeComponent,
    pub score: u8,
    pub feedback: String,
}

fn level_of(index: &ShadeIndex) -> u8 {
    let base = ((index.average() / 10.0).floor() as u8).clamp(MIN_LEVEL, MAX_LEVEL);

    if base == 3 && index.guilt_trip_intensity >= settings().thresholds.guilt_trip_boost {
        4
    } else {
        base
    }
}

pub fn shade_level(index: &ShadeIndex) -> Result<u8, ValidationError> {
    index.validate()?;
    Ok(level_of(index))
}

pub fn calculate_shade_level(index: &ShadeIndex) -> Result<ShadeLevelDetails, ValidationError> {
    let level = shade_level(index)?;
    let tier = ShadeTier::from_level(level);
    let undertone_strength = tier.undertone_strength();

    Ok(ShadeLevelDetails {
        level,
        tier,
        title: tier.to_string(),
        description: tier.description().to_string(),
        feedback: tier.feedback().to_string(),
        undertone_strength,
        color_class: undertone_strength.color_class().to_string(),
    })
}

pub fn is_shade_level_passing(index: &ShadeIndex) -> Result<bool, ValidationError> {
    Ok(shade_level(index)? >= settings().thresholds.shade_passing_level)
}

pub fn has_required_undertones(index: &ShadeIndex) -> Result<bool, ValidationError> {
    Ok(shade_level(index)? >= settings().thresholds.undertone_level)
}

pub fn shade_breakdown(
    index: &ShadeIndex,
) -> Result<Vec<ShadeComponentFeedback>, ValidationError> {
    index.validate()?;
    Ok(ShadeComponent::iter()
        .map(|component| {
            let score = index.get(component);
            ShadeComponentFeedback {
                component,
                score,
                feedback: component.feedback(score).to_string(),
            }
        })
        .collect())
}
