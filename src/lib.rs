//! ChurnForge: customer churn risk scoring on top of an exported gradient-boosting model
//!
//! This library derives RFM-style features from a customer's attributes, runs them
//! through a fitted preprocessor and classifier, and turns the churn probability
//! into a risk segment, a retention strategy and an estimate of revenue at risk.

pub mod artifacts;
pub mod cli;
pub mod customer;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod preprocess;
pub mod risk;
pub mod scoring;
pub mod viz;

// Re-export public items for easier access
pub use artifacts::{ChurnClassifier, FeatureTransformer, ModelArtifacts};
pub use cli::Args;
pub use customer::CustomerRecord;
pub use error::{InferenceError, LoadError, ScoringError, TransformError, ValidationError};
pub use features::{derive_features, DerivedFeatures};
pub use metrics::{rank_feature_importances, FeatureImportance, MODEL_QUALITY, TOP_FEATURES};
pub use risk::{classify, revenue_at_risk, RevenueAtRisk, RiskSegment};
pub use scoring::{score_customer, ScoredResult};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
