//! ChurnForge: churn risk scoring CLI
//!
//! Loads the model artifacts once, scores the customer described on the command
//! line, and prints the risk report followed by the model analytics.

use anyhow::{Context, Result};
use churnforge::{
    rank_feature_importances, score_customer, viz, Args, ModelArtifacts, MODEL_QUALITY,
    TOP_FEATURES,
};
use clap::Parser;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_logging(args.verbose);

    let start_time = Instant::now();

    if args.verbose {
        println!("Loading classifier from: {}", args.model);
        println!("Loading preprocessor from: {}", args.preprocessor);
    }
    let artifacts = ModelArtifacts::load(&args.model, &args.preprocessor)
        .context("failed to load model artifacts")?;

    if args.json {
        let record = args.customer_record()?;
        let result = score_customer(&artifacts, &record)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    viz::print_overview();
    run_prediction_mode(&args, &artifacts)?;

    if !args.skip_analytics {
        run_analytics_mode(&args, &artifacts)?;
    }

    if args.verbose {
        println!(
            "\nTotal processing time: {:.3}s",
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "churnforge=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Score the customer and print the executive report
fn run_prediction_mode(args: &Args, artifacts: &ModelArtifacts) -> Result<()> {
    let record = args.customer_record()?;

    let scoring_start = Instant::now();
    let result = score_customer(artifacts, &record).context("churn risk analysis failed")?;

    viz::print_risk_report(&result);
    if args.verbose {
        let derived = &result.derived_features;
        println!("\nDerived features:");
        println!(
            "  Recency={} Frequency={} Monetary={:.2} Tenure_Ratio={:.4}",
            derived.recency, derived.frequency, derived.monetary, derived.tenure_ratio
        );
        println!(
            "  Service_Bundle_Score={} Payment_Reliability_Score={}",
            derived.service_bundle_score, derived.payment_reliability_score
        );
        println!(
            "  Scoring time: {:.3}ms",
            scoring_start.elapsed().as_secs_f64() * 1000.0
        );
    }

    Ok(())
}

/// Print model quality metrics and render the feature importance chart
fn run_analytics_mode(args: &Args, artifacts: &ModelArtifacts) -> Result<()> {
    viz::print_model_metrics(&MODEL_QUALITY);

    let names = artifacts.preprocessor().feature_names_out();
    let importances = artifacts.classifier().feature_importances();
    let top = rank_feature_importances(&names, importances, TOP_FEATURES);

    viz::print_feature_importances(&top);
    viz::create_feature_importance_chart(&top, &args.output)?;
    println!("\nFeature importance chart saved to: {}", args.output);

    Ok(())
}
