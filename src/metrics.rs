//! Offline model quality figures and feature importance ranking

use serde::Serialize;

/// Number of features shown in the importance chart
pub const TOP_FEATURES: usize = 10;

/// Hold-out evaluation results recorded when the model was trained
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelQualityMetrics {
    pub accuracy: f64,
    pub roc_auc: f64,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

/// Quality of the shipped XGBoost model on its evaluation split
pub const MODEL_QUALITY: ModelQualityMetrics = ModelQualityMetrics {
    accuracy: 0.82,
    roc_auc: 0.88,
    f1: 0.79,
    precision: 0.81,
    recall: 0.77,
};

impl ModelQualityMetrics {
    /// Display label and value pairs, in report order
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("Accuracy", self.accuracy),
            ("ROC-AUC", self.roc_auc),
            ("F1 Score", self.f1),
            ("Precision", self.precision),
            ("Recall", self.recall),
        ]
    }
}

/// A named feature and its importance score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Pair names with importances, sort descending and keep the first `limit`
///
/// Ties keep their original order; NaN scores sort last.
pub fn rank_feature_importances(
    names: &[String],
    importances: &[f64],
    limit: usize,
) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| FeatureImportance {
            feature: name.clone(),
            importance,
        })
        .collect();

    ranked.sort_by(|a, b| match (a.importance.is_nan(), b.importance.is_nan()) {
        (false, false) => b.importance.total_cmp(&a.importance),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    });
    ranked.truncate(limit);
    ranked
}
