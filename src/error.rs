//! Error types for artifact loading and per-request scoring

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while loading model artifacts at startup
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact {path} is not valid JSON for this format: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("inconsistent artifact: {0}")]
    Inconsistent(String),
}

/// Customer input outside its vocabulary or numeric bounds
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid {field} value '{value}', expected one of: {allowed}")]
    UnknownCategory {
        field: &'static str,
        value: String,
        allowed: String,
    },

    #[error("{field} = {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("malformed customer record: {0}")]
    Malformed(String),
}

/// Preprocessing rejected the assembled feature row
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("column '{column}' has unknown category '{value}'")]
    UnknownCategory { column: String, value: String },

    #[error("column '{0}' is missing from the input row")]
    MissingColumn(String),

    #[error("column '{column}' expects a {expected} value")]
    TypeMismatch {
        column: String,
        expected: &'static str,
    },

    #[error("column '{column}' is not finite ({value})")]
    NotFinite { column: String, value: f64 },
}

/// The classifier call failed or produced an unusable output
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("feature shape mismatch: model expects {expected} columns, got {actual}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("classifier returned no predictions")]
    EmptyOutput,

    #[error("classifier returned {0} class columns, expected 2")]
    ClassCount(usize),

    #[error("classifier returned an invalid probability: {0}")]
    InvalidProbability(f64),
}

/// Any failure that aborts a single scoring request
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}
