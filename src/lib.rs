//! Deterministic scoring engine for AI-generated tarot readings: Shade Level
//! grading, core metric rubric, spread and seasonal modifiers, and history
//! pattern analysis.

pub mod error;
pub mod scoring;
pub mod settings;
pub mod utils;

pub use error::{ConfigurationError, EngineError, ValidationError};
