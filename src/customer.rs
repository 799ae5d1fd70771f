//! Customer attributes with their fixed vocabularies and numeric bounds

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Maximum tenure (months) observed in the training data
pub const MAX_TENURE: u32 = 72;

/// Upper bound accepted for monthly charges
pub const MAX_MONTHLY_CHARGES: f64 = 200.0;

/// Upper bound accepted for total charges
pub const MAX_TOTAL_CHARGES: f64 = 10_000.0;

/// Declares an enumerated attribute whose serialized form is its vocabulary label.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value, in form order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Vocabulary label exactly as the preprocessor was trained on it
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ValidationError::UnknownCategory {
                        field: $field,
                        value: s.to_string(),
                        allowed: Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

vocabulary! {
    Gender, "gender" {
        Male => "Male",
        Female => "Female",
    }
}

vocabulary! {
    /// Two-valued flag used by partner, dependents, phone service and billing
    YesNo, "Yes/No" {
        Yes => "Yes",
        No => "No",
    }
}

vocabulary! {
    MultipleLines, "MultipleLines" {
        No => "No",
        Yes => "Yes",
        NoPhoneService => "No phone service",
    }
}

vocabulary! {
    InternetService, "InternetService" {
        Dsl => "DSL",
        FiberOptic => "Fiber optic",
        No => "No",
    }
}

vocabulary! {
    /// Internet add-on (security, backup, protection, support, streaming)
    AddOn, "internet add-on" {
        Yes => "Yes",
        No => "No",
        NoInternetService => "No internet service",
    }
}

vocabulary! {
    Contract, "Contract" {
        MonthToMonth => "Month-to-month",
        OneYear => "One year",
        TwoYear => "Two year",
    }
}

vocabulary! {
    PaymentMethod, "PaymentMethod" {
        ElectronicCheck => "Electronic check",
        MailedCheck => "Mailed check",
        BankTransfer => "Bank transfer (automatic)",
        CreditCard => "Credit card (automatic)",
    }
}

/// Raw customer attributes, keyed by the column names the model was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "gender")]
    pub gender: Gender,
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: u8,
    #[serde(rename = "Partner")]
    pub partner: YesNo,
    #[serde(rename = "Dependents")]
    pub dependents: YesNo,
    #[serde(rename = "tenure")]
    pub tenure: u32,
    #[serde(rename = "PhoneService")]
    pub phone_service: YesNo,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines: MultipleLines,
    #[serde(rename = "InternetService")]
    pub internet_service: InternetService,
    #[serde(rename = "OnlineSecurity")]
    pub online_security: AddOn,
    #[serde(rename = "OnlineBackup")]
    pub online_backup: AddOn,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: AddOn,
    #[serde(rename = "TechSupport")]
    pub tech_support: AddOn,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: AddOn,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: AddOn,
    #[serde(rename = "Contract")]
    pub contract: Contract,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: YesNo,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
}

impl Default for CustomerRecord {
    /// Initial selection of the input panel
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            senior_citizen: 0,
            partner: YesNo::Yes,
            dependents: YesNo::Yes,
            tenure: 12,
            phone_service: YesNo::Yes,
            multiple_lines: MultipleLines::No,
            internet_service: InternetService::Dsl,
            online_security: AddOn::Yes,
            online_backup: AddOn::Yes,
            device_protection: AddOn::Yes,
            tech_support: AddOn::Yes,
            streaming_tv: AddOn::Yes,
            streaming_movies: AddOn::Yes,
            contract: Contract::MonthToMonth,
            paperless_billing: YesNo::Yes,
            payment_method: PaymentMethod::ElectronicCheck,
            monthly_charges: 70.0,
            total_charges: 1000.0,
        }
    }
}

impl CustomerRecord {
    /// Check the numeric attributes; enumerated ones are enforced by their types
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.senior_citizen > 1 {
            return Err(ValidationError::UnknownCategory {
                field: "SeniorCitizen",
                value: self.senior_citizen.to_string(),
                allowed: "0, 1".to_string(),
            });
        }

        if self.tenure > MAX_TENURE {
            return Err(ValidationError::OutOfRange {
                field: "tenure",
                value: f64::from(self.tenure),
                min: 0.0,
                max: f64::from(MAX_TENURE),
            });
        }

        check_amount("MonthlyCharges", self.monthly_charges, MAX_MONTHLY_CHARGES)?;
        check_amount("TotalCharges", self.total_charges, MAX_TOTAL_CHARGES)?;

        Ok(())
    }

    /// The nine service columns in model order, as their vocabulary labels
    pub fn service_values(&self) -> [&'static str; 9] {
        [
            self.phone_service.as_str(),
            self.multiple_lines.as_str(),
            self.internet_service.as_str(),
            self.online_security.as_str(),
            self.online_backup.as_str(),
            self.device_protection.as_str(),
            self.tech_support.as_str(),
            self.streaming_tv.as_str(),
            self.streaming_movies.as_str(),
        ]
    }

    /// Parse and validate a record from JSON keyed by column name
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        let record: CustomerRecord =
            serde_json::from_str(json).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    /// Load a customer profile from a JSON file
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read customer file {}: {}", path.display(), e))?;
        Ok(Self::from_json_str(&json)?)
    }
}

fn check_amount(field: &'static str, value: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field, value });
    }
    if !(0.0..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: 0.0,
            max,
        });
    }
    Ok(())
}
