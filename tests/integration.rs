//! Integration tests for ChurnForge

use churnforge::customer::{AddOn, Contract, InternetService, MultipleLines, PaymentMethod, YesNo};
use churnforge::{
    rank_feature_importances, score_customer, CustomerRecord, LoadError, ModelArtifacts,
    RiskSegment, ScoringError, TransformError, TOP_FEATURES,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn artifact(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("artifacts")
        .join(name)
}

fn load_sample_artifacts() -> ModelArtifacts {
    ModelArtifacts::load(artifact("xgb_model.json"), artifact("preprocessor.json")).unwrap()
}

/// Write a JSON artifact to a temporary file
fn write_artifact(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", json).unwrap();
    file
}

#[test]
fn test_sample_artifacts_load() {
    let artifacts = load_sample_artifacts();

    let names = artifacts.preprocessor().feature_names_out();
    assert_eq!(names.len(), 51);
    assert_eq!(names[0], "num__SeniorCitizen");
    assert_eq!(names[42], "cat__Contract_Month-to-month");
    assert_eq!(names[50], "cat__PaymentMethod_Mailed check");
    assert_eq!(artifacts.classifier().feature_importances().len(), 51);
}

#[test]
fn test_end_to_end_default_customer() {
    let artifacts = load_sample_artifacts();
    let result = score_customer(&artifacts, &CustomerRecord::default()).unwrap();

    assert!((result.churn_probability - 0.4085).abs() < 1e-3);
    assert_eq!(result.segment, RiskSegment::Moderate);
    assert_eq!(
        result.revenue_at_risk.monthly,
        70.0 * result.churn_probability
    );
    assert_eq!(
        result.revenue_at_risk.annual,
        result.revenue_at_risk.monthly * 12.0
    );
}

#[test]
fn test_segments_follow_customer_profile() {
    let artifacts = load_sample_artifacts();

    let loyal = CustomerRecord {
        contract: Contract::TwoYear,
        tenure: 70,
        payment_method: PaymentMethod::BankTransfer,
        monthly_charges: 50.0,
        total_charges: 3500.0,
        ..CustomerRecord::default()
    };
    let loyal_result = score_customer(&artifacts, &loyal).unwrap();
    assert_eq!(loyal_result.segment, RiskSegment::Low);

    let risky_json = std::fs::read_to_string(artifact("customer.json")).unwrap();
    let risky = CustomerRecord::from_json_str(&risky_json).unwrap();
    let risky_result = score_customer(&artifacts, &risky).unwrap();
    assert_eq!(risky_result.segment, RiskSegment::Critical);
    assert!(risky_result.churn_probability > loyal_result.churn_probability);
    assert!(risky_result.strategy.contains("senior relationship manager"));
}

#[test]
fn test_no_services_customer_features() {
    let artifacts = load_sample_artifacts();
    let record = CustomerRecord {
        tenure: 12,
        monthly_charges: 70.0,
        payment_method: PaymentMethod::ElectronicCheck,
        phone_service: YesNo::No,
        multiple_lines: MultipleLines::No,
        internet_service: InternetService::No,
        online_security: AddOn::No,
        online_backup: AddOn::No,
        device_protection: AddOn::No,
        tech_support: AddOn::No,
        streaming_tv: AddOn::No,
        streaming_movies: AddOn::No,
        ..CustomerRecord::default()
    };

    let result = score_customer(&artifacts, &record).unwrap();
    let derived = result.derived_features;
    assert_eq!(derived.frequency, 0);
    assert_eq!(derived.payment_reliability_score, 0);
    assert!((derived.tenure_ratio - 12.0 / 72.0).abs() < 1e-12);
    assert!((0.0..=1.0).contains(&result.churn_probability));
}

#[test]
fn test_feature_importance_ranking() {
    let artifacts = load_sample_artifacts();
    let names = artifacts.preprocessor().feature_names_out();
    let top = rank_feature_importances(
        &names,
        artifacts.classifier().feature_importances(),
        TOP_FEATURES,
    );

    assert_eq!(top.len(), 10);
    assert_eq!(top[0].feature, "cat__Contract_Month-to-month");
    assert_eq!(top[1].feature, "num__tenure");
    assert!(top.windows(2).all(|w| w[0].importance >= w[1].importance));

    let total: f64 = artifacts.classifier().feature_importances().iter().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_scored_result_serializes() {
    let artifacts = load_sample_artifacts();
    let result = score_customer(&artifacts, &CustomerRecord::default()).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["segment"], "Moderate Risk");
    assert!(json["revenue_at_risk"]["annual"].is_number());
    assert_eq!(json["derived_features"]["frequency"], 8);
    assert!(json["scored_at"].is_string());
}

#[test]
fn test_width_mismatch_is_startup_error() {
    let model = write_artifact(
        r#"{"num_features": 2, "trees": [{"nodes": [{"leaf": 0.1}]}]}"#,
    );
    let preprocessor = write_artifact(
        r#"{"transformers": [{"kind": "passthrough", "name": "rest", "columns": ["tenure"]}]}"#,
    );

    let err = ModelArtifacts::load(model.path(), preprocessor.path()).unwrap_err();
    assert!(matches!(err, LoadError::Inconsistent(_)));
}

#[test]
fn test_missing_artifact_is_startup_error() {
    let err = ModelArtifacts::load("/nonexistent/xgb_model.json", artifact("preprocessor.json"))
        .unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn test_unknown_category_fails_request() {
    // Encoder fitted without the "Fiber optic" category
    let preprocessor = write_artifact(
        r#"{"transformers": [
            {"kind": "one_hot_encoder", "name": "cat", "columns": ["InternetService"],
             "categories": [["DSL", "No"]]}
        ]}"#,
    );
    let model = write_artifact(
        r#"{"num_features": 2, "trees": [{"nodes": [{"leaf": 0.0}]}]}"#,
    );
    let artifacts = ModelArtifacts::load(model.path(), preprocessor.path()).unwrap();

    let record = CustomerRecord {
        internet_service: InternetService::FiberOptic,
        ..CustomerRecord::default()
    };
    let err = score_customer(&artifacts, &record).unwrap_err();
    assert!(matches!(
        err,
        ScoringError::Transform(TransformError::UnknownCategory { .. })
    ));

    // The artifacts stay usable for the next request
    assert!(score_customer(&artifacts, &CustomerRecord::default()).is_ok());
}
