use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoEnumIterator;

use super::metrics::{CoreMetric, ThematicCategory, MAX_SCORE};
use super::patterns::Reading;
use super::score::ReadingScore;
use super::shade::ShadeComponent;
use crate::error::ValidationError;

/// Resolved output of the interpretation model: prose plus raw scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretationPayload {
    pub text: String,
    pub scores: ReadingScore,
}

impl InterpretationPayload {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.scores.validate()
    }
}

fn malformed(err: serde_json::Error) -> ValidationError {
    ValidationError::Malformed(err.to_string())
}

fn check_score_value(field: &'static str, value: &Value) -> Result<(), ValidationError> {
    match value.as_i64() {
        Some(n) if (0..=MAX_SCORE as i64).contains(&n) => Ok(()),
        Some(n) => Err(ValidationError::OutOfRange { field, value: n }),
        None => Err(ValidationError::NotAScore {
            field,
            value: value.to_string(),
        }),
    }
}

fn check_section(
    scores: &Value,
    section: &str,
    fields: impl Iterator<Item = (&'static str, bool)>,
) -> Result<(), ValidationError> {
    let Some(section) = scores.get(section) else {
        return Ok(());
    };
    for (field, optional) in fields {
        match section.get(field) {
            None => {}
            Some(Value::Null) if optional => {}
            Some(value) => check_score_value(field, value)?,
        }
    }
    Ok(())
}

/// Checks every score the JSON carries before it is narrowed to `u8`, so
/// negative, fractional or oversized values are reported by field name.
/// Missing fields are left to deserialization.
fn check_raw_scores(scores: &Value) -> Result<(), ValidationError> {
    check_section(
        scores,
        "coreMetrics",
        CoreMetric::iter().map(|m| (<&str>::from(m), false)),
    )?;
    check_section(
        scores,
        "extendedMetrics",
        ThematicCategory::iter().map(|c| (<&str>::from(c), c == ThematicCategory::Quotability)),
    )?;
    check_section(
        scores,
        "shadeIndex",
        ShadeComponent::iter().map(|c| (<&str>::from(c), false)),
    )
}

pub fn parse_interpretation(json: &str) -> Result<InterpretationPayload, ValidationError> {
    let raw: Value = serde_json::from_str(json).map_err(malformed)?;
    if let Some(scores) = raw.get("scores") {
        check_raw_scores(scores)?;
    }
    let payload: InterpretationPayload = serde_json::from_value(raw).map_err(malformed)?;
    payload.validate()?;
    Ok(payload)
}

pub fn parse_readings(json: &str) -> Result<Vec<Reading>, ValidationError> {
    let raw: Value = serde_json::from_str(json).map_err(malformed)?;
    if let Some(items) = raw.as_array() {
        for scores in items.iter().filter_map(|r| r.pointer("/interpretation/scores")) {
            check_raw_scores(scores)?;
        }
    }
    let readings: Vec<Reading> = serde_json::from_value(raw).map_err(malformed)?;
    for reading in &readings {
        reading.interpretation.scores.validate()?;
        reading.timestamp()?;
    }
    Ok(readings)
}
