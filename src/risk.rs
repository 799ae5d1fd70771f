//! Risk segmentation and revenue-at-risk estimation

use serde::Serialize;
use std::fmt;

/// Probability above which a customer is Critical Risk
pub const CRITICAL_THRESHOLD: f64 = 0.75;
/// Probability above which a customer is High Risk
pub const HIGH_THRESHOLD: f64 = 0.5;
/// Probability above which a customer is Moderate Risk
pub const MODERATE_THRESHOLD: f64 = 0.3;

/// Months used to annualize the monthly revenue at risk
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Ordinal churn risk bucket, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskSegment {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Critical Risk")]
    Critical,
}

impl RiskSegment {
    pub fn label(self) -> &'static str {
        match self {
            RiskSegment::Low => "Low Risk",
            RiskSegment::Moderate => "Moderate Risk",
            RiskSegment::High => "High Risk",
            RiskSegment::Critical => "Critical Risk",
        }
    }

    /// Recommended retention action for the segment
    pub fn strategy(self) -> &'static str {
        match self {
            RiskSegment::Critical => {
                "Immediate retention discount + senior relationship manager intervention."
            }
            RiskSegment::High => "Personalized loyalty discount + proactive customer outreach.",
            RiskSegment::Moderate => {
                "Targeted engagement campaign and service upgrade recommendation."
            }
            RiskSegment::Low => "Maintain engagement via rewards and upsell premium bundles.",
        }
    }
}

impl fmt::Display for RiskSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a churn probability to its segment
///
/// Thresholds are strict and checked highest first, so 0.75 is High,
/// 0.5 is Moderate and 0.3 is Low. Values above 1 land in Critical;
/// negative values and NaN land in Low.
pub fn classify(probability: f64) -> RiskSegment {
    if probability > CRITICAL_THRESHOLD {
        RiskSegment::Critical
    } else if probability > HIGH_THRESHOLD {
        RiskSegment::High
    } else if probability > MODERATE_THRESHOLD {
        RiskSegment::Moderate
    } else {
        RiskSegment::Low
    }
}

/// Expected revenue loss attributable to churn
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueAtRisk {
    pub monthly: f64,
    pub annual: f64,
}

/// Revenue at risk for a monthly charge and churn probability, unrounded
pub fn revenue_at_risk(monthly_charges: f64, probability: f64) -> RevenueAtRisk {
    let monthly = monthly_charges * probability;
    RevenueAtRisk {
        monthly,
        annual: monthly * MONTHS_PER_YEAR,
    }
}
