//! Scoring a single customer against the loaded artifacts

use crate::artifacts::ModelArtifacts;
use crate::customer::CustomerRecord;
use crate::error::{InferenceError, ScoringError};
use crate::features::{assemble_row, derive_features, DerivedFeatures, FeatureRow};
use crate::risk::{classify, revenue_at_risk, RevenueAtRisk, RiskSegment};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one scoring request
#[derive(Debug, Clone, Serialize)]
pub struct ScoredResult {
    pub churn_probability: f64,
    pub segment: RiskSegment,
    pub strategy: &'static str,
    pub revenue_at_risk: RevenueAtRisk,
    pub derived_features: DerivedFeatures,
    pub scored_at: DateTime<Utc>,
}

/// Score one customer end to end
///
/// # Arguments
/// * `artifacts` - Loaded classifier and preprocessor
/// * `record` - Raw customer attributes
///
/// # Returns
/// * `ScoredResult` with probability, segment, strategy and revenue at risk
pub fn score_customer(
    artifacts: &ModelArtifacts,
    record: &CustomerRecord,
) -> Result<ScoredResult, ScoringError> {
    record.validate()?;

    let derived = derive_features(record);
    tracing::debug!(?derived, "derived features");

    let row = assemble_row(record, &derived);
    let probability = churn_probability(artifacts, &row)?;

    let segment = classify(probability);
    let revenue = revenue_at_risk(record.monthly_charges, probability);
    tracing::info!(probability, segment = %segment, "customer scored");

    Ok(ScoredResult {
        churn_probability: probability,
        segment,
        strategy: segment.strategy(),
        revenue_at_risk: revenue,
        derived_features: derived,
        scored_at: Utc::now(),
    })
}

/// Positive-class probability for an assembled row
pub fn churn_probability(
    artifacts: &ModelArtifacts,
    row: &FeatureRow,
) -> Result<f64, ScoringError> {
    let processed = artifacts.preprocessor().transform(row)?;
    tracing::debug!(shape = ?processed.shape(), "row preprocessed");

    let proba = artifacts.classifier().predict_proba(&processed)?;
    if proba.nrows() == 0 {
        return Err(InferenceError::EmptyOutput.into());
    }
    if proba.ncols() != 2 {
        return Err(InferenceError::ClassCount(proba.ncols()).into());
    }

    let probability = proba[[0, 1]];
    if !(0.0..=1.0).contains(&probability) {
        return Err(InferenceError::InvalidProbability(probability).into());
    }
    Ok(probability)
}
