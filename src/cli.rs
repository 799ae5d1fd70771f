//! Command-line interface definitions and argument parsing

use crate::customer::{
    AddOn, Contract, CustomerRecord, Gender, InternetService, MultipleLines, PaymentMethod, YesNo,
};
use clap::Parser;

/// Score a customer's churn risk with an exported gradient-boosting model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the exported classifier (JSON)
    #[arg(long, env = "CHURNFORGE_MODEL", default_value = "xgb_model.json")]
    pub model: String,

    /// Path to the exported preprocessor (JSON)
    #[arg(long, env = "CHURNFORGE_PREPROCESSOR", default_value = "preprocessor.json")]
    pub preprocessor: String,

    /// Read the customer from a JSON file keyed by column name instead of the flags below
    #[arg(short, long)]
    pub customer: Option<String>,

    #[arg(long, default_value = "Male")]
    pub gender: Gender,

    /// 1 if the customer is a senior citizen
    #[arg(long, default_value = "0")]
    pub senior_citizen: u8,

    #[arg(long, default_value = "Yes")]
    pub partner: YesNo,

    #[arg(long, default_value = "Yes")]
    pub dependents: YesNo,

    /// Tenure in months (0-72)
    #[arg(long, default_value = "12")]
    pub tenure: u32,

    #[arg(long, default_value = "Yes")]
    pub phone_service: YesNo,

    /// No, Yes or "No phone service"
    #[arg(long, default_value = "No")]
    pub multiple_lines: MultipleLines,

    /// DSL, "Fiber optic" or No
    #[arg(long, default_value = "DSL")]
    pub internet_service: InternetService,

    #[arg(long, default_value = "Yes")]
    pub online_security: AddOn,

    #[arg(long, default_value = "Yes")]
    pub online_backup: AddOn,

    #[arg(long, default_value = "Yes")]
    pub device_protection: AddOn,

    #[arg(long, default_value = "Yes")]
    pub tech_support: AddOn,

    #[arg(long, default_value = "Yes")]
    pub streaming_tv: AddOn,

    #[arg(long, default_value = "Yes")]
    pub streaming_movies: AddOn,

    /// Month-to-month, "One year" or "Two year"
    #[arg(long, default_value = "Month-to-month")]
    pub contract: Contract,

    #[arg(long, default_value = "Yes")]
    pub paperless_billing: YesNo,

    /// "Electronic check", "Mailed check", "Bank transfer (automatic)" or "Credit card (automatic)"
    #[arg(long, default_value = "Electronic check")]
    pub payment_method: PaymentMethod,

    /// Monthly charges (0-200)
    #[arg(long, default_value = "70.0")]
    pub monthly_charges: f64,

    /// Total charges (0-10000)
    #[arg(long, default_value = "1000.0")]
    pub total_charges: f64,

    /// Output path for the feature importance chart
    #[arg(short, long, default_value = "feature_importance.png")]
    pub output: String,

    /// Print the scored result as JSON instead of the report
    #[arg(long)]
    pub json: bool,

    /// Skip model metrics and the feature importance chart
    #[arg(long)]
    pub skip_analytics: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the validated customer record from `--customer` or the attribute flags
    pub fn customer_record(&self) -> crate::Result<CustomerRecord> {
        if let Some(ref path) = self.customer {
            return CustomerRecord::load(path);
        }

        let record = CustomerRecord {
            gender: self.gender,
            senior_citizen: self.senior_citizen,
            partner: self.partner,
            dependents: self.dependents,
            tenure: self.tenure,
            phone_service: self.phone_service,
            multiple_lines: self.multiple_lines,
            internet_service: self.internet_service,
            online_security: self.online_security,
            online_backup: self.online_backup,
            device_protection: self.device_protection,
            tech_support: self.tech_support,
            streaming_tv: self.streaming_tv,
            streaming_movies: self.streaming_movies,
            contract: self.contract,
            paperless_billing: self.paperless_billing,
            payment_method: self.payment_method,
            monthly_charges: self.monthly_charges,
            total_charges: self.total_charges,
        };
        record.validate()?;
        Ok(record)
    }
}
