//! Derived RFM-style features and assembly of the model input row

use crate::customer::{CustomerRecord, PaymentMethod, MAX_TENURE};
use serde::Serialize;

/// Service values counted as an active subscription
const ACTIVE_SERVICE_VALUES: [&str; 3] = ["Yes", "DSL", "Fiber optic"];

/// Column order of the 25-field row the preprocessor was fitted on
pub const INPUT_COLUMNS: [&str; 25] = [
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
    "MonthlyCharges",
    "TotalCharges",
    "Recency",
    "Frequency",
    "Monetary",
    "Tenure_Ratio",
    "Service_Bundle_Score",
    "Payment_Reliability_Score",
];

/// Features computed from a customer record for a single scoring request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub recency: u32,
    pub frequency: u32,
    pub monetary: f64,
    pub tenure_ratio: f64,
    pub service_bundle_score: u32,
    pub payment_reliability_score: u8,
}

/// Derive the engineered features from raw attributes
///
/// Frequency counts service fields whose label is exactly one of
/// "Yes", "DSL" or "Fiber optic"; every other label counts as absent.
pub fn derive_features(record: &CustomerRecord) -> DerivedFeatures {
    let frequency = record
        .service_values()
        .iter()
        .filter(|value| ACTIVE_SERVICE_VALUES.contains(*value))
        .count() as u32;

    DerivedFeatures {
        recency: record.tenure,
        frequency,
        monetary: record.monthly_charges,
        tenure_ratio: f64::from(record.tenure) / f64::from(MAX_TENURE),
        service_bundle_score: frequency,
        payment_reliability_score: payment_reliability(record.payment_method),
    }
}

/// 1 for automatic bank or card payments, 0 otherwise
pub fn payment_reliability(method: PaymentMethod) -> u8 {
    match method {
        PaymentMethod::BankTransfer | PaymentMethod::CreditCard => 1,
        PaymentMethod::ElectronicCheck | PaymentMethod::MailedCheck => 0,
    }
}

/// A single cell of the model input row
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Category(&'static str),
    Number(f64),
}

/// One named input row (raw attributes followed by derived features)
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    cells: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRow {
    pub fn new(cells: Vec<(&'static str, FeatureValue)>) -> Self {
        Self { cells }
    }

    /// Look up a cell by column name
    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.cells
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cells.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Assemble the 25-column row in [`INPUT_COLUMNS`] order
pub fn assemble_row(record: &CustomerRecord, derived: &DerivedFeatures) -> FeatureRow {
    use FeatureValue::{Category, Number};

    let values = [
        Category(record.gender.as_str()),
        Number(f64::from(record.senior_citizen)),
        Category(record.partner.as_str()),
        Category(record.dependents.as_str()),
        Number(f64::from(record.tenure)),
        Category(record.phone_service.as_str()),
        Category(record.multiple_lines.as_str()),
        Category(record.internet_service.as_str()),
        Category(record.online_security.as_str()),
        Category(record.online_backup.as_str()),
        Category(record.device_protection.as_str()),
        Category(record.tech_support.as_str()),
        Category(record.streaming_tv.as_str()),
        Category(record.streaming_movies.as_str()),
        Category(record.contract.as_str()),
        Category(record.paperless_billing.as_str()),
        Category(record.payment_method.as_str()),
        Number(record.monthly_charges),
        Number(record.total_charges),
        Number(f64::from(derived.recency)),
        Number(f64::from(derived.frequency)),
        Number(derived.monetary),
        Number(derived.tenure_ratio),
        Number(f64::from(derived.service_bundle_score)),
        Number(f64::from(derived.payment_reliability_score)),
    ];

    FeatureRow::new(INPUT_COLUMNS.iter().copied().zip(values).collect())
}
