//! Report rendering and the feature importance chart using Plotters

use crate::metrics::{FeatureImportance, ModelQualityMetrics};
use crate::scoring::ScoredResult;
use plotters::prelude::*;

/// Width of the text progress bar for the churn probability
const PROGRESS_WIDTH: usize = 40;

const BAR_COLOR: RGBColor = RGBColor(221, 36, 118);

/// Probability as a percentage with two decimals, e.g. `75.00%`
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Currency amount with two decimals, e.g. `$50.00`
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Text progress bar filled in proportion to `fraction` (clamped to [0, 1])
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    let filled = (fraction * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Print the overview banner
pub fn print_overview() {
    println!("=== Enterprise Customer Churn Intelligence ===");
    println!("Strategic Retention & Revenue Risk Analytics\n");
    println!("Primary model:   XGBoost");
    println!("Target variable: Customer Churn");
    println!(
        "Churn probability is predicted from engineered RFM features, service usage,\n\
         tenure and payment behaviour; revenue exposure and a retention\n\
         recommendation are derived from it."
    );
}

/// Print the executive risk report for one scored customer
pub fn print_risk_report(result: &ScoredResult) {
    println!("\n=== Executive Risk Intelligence ===");
    println!("Risk segment:       {}", result.segment);
    println!(
        "Churn probability:  {}",
        format_probability(result.churn_probability)
    );
    println!(
        "                    {}",
        progress_bar(result.churn_probability, PROGRESS_WIDTH)
    );

    println!("\n=== Financial Risk Exposure ===");
    println!(
        "Monthly revenue at risk: {}",
        format_currency(result.revenue_at_risk.monthly)
    );
    println!(
        "Annual revenue at risk:  {}",
        format_currency(result.revenue_at_risk.annual)
    );

    println!("\n=== Retention Recommendation ===");
    println!("{}", result.strategy);
}

/// Print the offline quality metrics
pub fn print_model_metrics(metrics: &ModelQualityMetrics) {
    println!("\n=== Model Performance Metrics ===");
    for (label, value) in metrics.entries() {
        println!("  {:<10} {:.2}", label, value);
    }
}

/// Print the ranked feature importance table
pub fn print_feature_importances(features: &[FeatureImportance]) {
    println!("\n=== Feature Importance (top {}) ===", features.len());
    println!("  Rank | Importance | Feature");
    println!("  -----|------------|--------");
    for (rank, item) in features.iter().enumerate() {
        println!("  {:4} | {:10.4} | {}", rank + 1, item.importance, item.feature);
    }
}

/// Render a horizontal bar chart with the most important feature on top
pub fn create_feature_importance_chart(
    features: &[FeatureImportance],
    output_path: &str,
) -> crate::Result<()> {
    if features.is_empty() {
        anyhow::bail!("No feature importances to plot");
    }

    let n = features.len();
    let max_importance = features
        .iter()
        .map(|f| f.importance)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let x_max = if max_importance > 0.0 {
        max_importance * 1.1
    } else {
        1.0
    };

    let root = BitMapBackend::new(output_path, (900, 520)).into_drawing_area();
    root.fill(&WHITE)?;

    // Segment 0 is the bottom row, so rank r is drawn at n - 1 - r
    let label_for = |segment: &SegmentValue<usize>| match segment {
        SegmentValue::CenterOf(y) | SegmentValue::Exact(y) if *y < n => {
            features[n - 1 - *y].feature.clone()
        }
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption("Top Feature Importances", ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(300)
        .build_cartesian_2d(0f64..x_max, (0..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Importance")
        .y_labels(n)
        .y_label_formatter(&label_for)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(features.iter().enumerate().map(|(rank, item)| {
        let y = n - 1 - rank;
        let width = if item.importance.is_finite() {
            item.importance.max(0.0)
        } else {
            0.0
        };
        let mut bar = Rectangle::new(
            [(0.0, SegmentValue::Exact(y)), (width, SegmentValue::Exact(y + 1))],
            BAR_COLOR.filled(),
        );
        bar.set_margin(4, 4, 0, 0);
        bar
    }))?;

    root.present()?;
    tracing::info!(path = output_path, features = n, "feature importance chart saved");

    Ok(())
}
