use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::metrics::ThematicCategory;
use crate::error::{ConfigurationError, ValidationError};
use crate::settings::settings;

static MONTH_DAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})-(\d{2})$").unwrap());

/// Calendar day without a year, ordered the same way as its `MM-DD` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Result<Self, ValidationError> {
        // 2000 is a leap year, so 02-29 is accepted
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(ValidationError::InvalidMonthDay(format!(
                "{month:02}-{day:02}"
            )));
        }
        Ok(Self { month, day })
    }

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidMonthDay(value.to_string());
        let caps = MONTH_DAY_PATTERN.captures(value.trim()).ok_or_else(invalid)?;
        let month = caps[1].parse().map_err(|_| invalid())?;
        let day = caps[2].parse().map_err(|_| invalid())?;
        Self::new(month, day).map_err(|_| invalid())
    }

    /// Unchecked, for the built-in calendar. `SeasonalEvent::validate`
    /// catches a bad literal.
    pub(crate) const fn literal(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    pub fn is_valid(&self) -> bool {
        NaiveDate::from_ymd_opt(2000, self.month, self.day).is_some()
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl TryFrom<String> for MonthDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MonthDay> for String {
    fn from(value: MonthDay) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalEvent {
    pub name: String,
    pub start: MonthDay,
    pub end: MonthDay,
    pub score_multiplier: f64,
    pub categories: Vec<ThematicCategory>,
}

impl SeasonalEvent {
    pub fn wraps_year(&self) -> bool {
        self.start > self.end
    }

    pub fn is_active(&self, today: NaiveDate) -> bool {
        let today = MonthDay::of(today);
        if self.wraps_year() {
            today >= self.start || today <= self.end
        } else {
            self.start <= today && today <= self.end
        }
    }

    pub fn applies_to(&self, categories: &[ThematicCategory]) -> bool {
        self.categories.iter().any(|c| categories.contains(c))
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (bound, day) in [("start", self.start), ("end", self.end)] {
            if !day.is_valid() {
                return Err(ConfigurationError::InvalidSetting {
                    field: format!("seasonal event '{}' {bound}", self.name),
                    reason: format!("{day} is not a calendar day"),
                });
            }
        }
        if !self.score_multiplier.is_finite() || self.score_multiplier < 0.0 {
            return Err(ConfigurationError::InvalidMultiplier {
                owner: format!("seasonal event '{}'", self.name),
                value: self.score_multiplier,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalBonus {
    pub modified_score: u32,
    pub active_events: Vec<String>,
    pub bonus_points: i64,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

pub fn active_events(events: &[SeasonalEvent], today: NaiveDate) -> Vec<&SeasonalEvent> {
    events.iter().filter(|e| e.is_active(today)).collect()
}

/// Only the strongest matching multiplier applies; events never stack.
pub fn seasonal_bonus_with(
    events: &[SeasonalEvent],
    base_score: u32,
    categories: &[ThematicCategory],
    today: NaiveDate,
) -> SeasonalBonus {
    let matching: Vec<&SeasonalEvent> = active_events(events, today)
        .into_iter()
        .filter(|e| e.applies_to(categories))
        .collect();

    let max_multiplier = matching
        .iter()
        .map(|e| e.score_multiplier)
        .fold(None, |best: Option<f64>, m| Some(best.map_or(m, |b| b.max(m))));

    let modified_score = match max_multiplier {
        Some(multiplier) => (base_score as f64 * multiplier).round().max(0.0) as u32,
        None => base_score,
    };

    SeasonalBonus {
        modified_score,
        active_events: matching.iter().map(|e| e.name.clone()).collect(),
        bonus_points: modified_score as i64 - base_score as i64,
    }
}

pub fn calculate_seasonal_bonus(
    base_score: u32,
    categories: &[ThematicCategory],
    today: NaiveDate,
) -> SeasonalBonus {
    seasonal_bonus_with(&settings().seasonal_events, base_score, categories, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ThematicCategory::*;

    fn date(value: &str) -> NaiveDate {
        parse_date(value).unwrap()
    }

    fn event(
        start: &str,
        end: &str,
        multiplier: f64,
        categories: Vec<ThematicCategory>,
    ) -> SeasonalEvent {
        SeasonalEvent {
            name: format!("{start}..{end}"),
            start: MonthDay::parse(start).unwrap(),
            end: MonthDay::parse(end).unwrap(),
            score_multiplier: multiplier,
            categories,
        }
    }

    #[test]
    fn test_year_wrapping_event() {
        let retrograde = event("12-29", "01-18", 1.3, vec![Snark]);
        assert!(retrograde.wraps_year());
        assert!(retrograde.is_active(date("2024-12-30")));
        assert!(retrograde.is_active(date("2024-01-05")));
        assert!(retrograde.is_active(date("2024-12-29")));
        assert!(retrograde.is_active(date("2024-01-18")));
        assert!(!retrograde.is_active(date("2024-06-01")));
        assert!(!retrograde.is_active(date("2024-01-19")));
    }

    #[test]
    fn test_plain_range_inclusive() {
        let spooky = event("10-01", "10-31", 1.25, vec![Snark]);
        assert!(!spooky.wraps_year());
        assert!(spooky.is_active(date("2023-10-01")));
        assert!(spooky.is_active(date("2023-10-31")));
        assert!(!spooky.is_active(date("2023-11-01")));
        assert!(!spooky.is_active(date("2023-09-30")));
    }

    #[test]
    fn test_default_calendar_takes_max_multiplier() {
        let bonus = calculate_seasonal_bonus(100, &[Snark, CulturalResonance], date("2024-01-10"));
        assert_eq!(bonus.modified_score, 130);
        assert_eq!(bonus.bonus_points, 30);
        assert_eq!(
            bonus.active_events,
            vec!["Mercury Retrograde".to_string(), "Awards Season".to_string()]
        );
    }

    #[test]
    fn test_no_matching_category() {
        let events = vec![event("01-01", "12-31", 2.0, vec![Quotability])];
        let bonus = seasonal_bonus_with(&events, 77, &[Snark], date("2024-05-05"));
        assert_eq!(bonus.modified_score, 77);
        assert_eq!(bonus.bonus_points, 0);
        assert!(bonus.active_events.is_empty());
    }

    #[test]
    fn test_multiplier_below_one_is_negative_bonus() {
        let events = vec![event("05-01", "05-31", 0.5, vec![Snark])];
        let bonus = seasonal_bonus_with(&events, 81, &[Snark], date("2024-05-05"));
        assert_eq!(bonus.modified_score, 41);
        assert_eq!(bonus.bonus_points, -40);
    }

    #[test]
    fn test_month_day_parsing() {
        assert_eq!(MonthDay::parse("02-29").unwrap().to_string(), "02-29");
        assert!(MonthDay::parse("02-30").is_err());
        assert!(MonthDay::parse("13-01").is_err());
        assert!(MonthDay::parse("1-5").is_err());
        assert_eq!(
            MonthDay::parse("tomorrow"),
            Err(ValidationError::InvalidMonthDay("tomorrow".into()))
        );
    }

    #[test]
    fn test_leap_day_matches_only_itself() {
        let leap = event("02-29", "02-29", 1.5, vec![Snark]);
        assert!(leap.is_active(date("2024-02-29")));
        assert!(!leap.is_active(date("2023-02-28")));
        assert!(!leap.is_active(date("2023-03-01")));
    }

    #[test]
    fn test_event_with_impossible_day_rejected() {
        let mut broken = event("02-01", "02-10", 1.1, vec![Snark]);
        broken.end = MonthDay::literal(2, 31);
        assert!(matches!(
            broken.validate(),
            Err(ConfigurationError::InvalidSetting { .. })
        ));
        assert!(event("02-01", "02-29", 1.1, vec![Snark]).validate().is_ok());
    }

    #[test]
    fn test_invalid_date() {
        assert_eq!(
            parse_date("2024-13-01"),
            Err(ValidationError::InvalidDate("2024-13-01".into()))
        );
    }
}
