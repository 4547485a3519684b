//! Governance Classifier - Main Entry Point
//!
//! Trains the governance model, evaluates it on the test data, then reloads
//! the saved model and scores a few sample records.

use anyhow::{Context, Result};
use governance_classifier::{
    config::{AppConfig, LogFormat, LoggingConfig},
    Evaluator, GovernancePrediction, GovernanceRecord, Predictor, Trainer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("governance_classifier={}", logging.level)))
        .context("Invalid log level")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    info!("Starting Governance Classifier");
    info!(
        seed = config.training.seed,
        normalize = config.pipeline.normalize_features,
        tenant_features = config.pipeline.include_tenant_features,
        "Configuration loaded"
    );

    // Train
    let trainer = Trainer::new(&config);
    let artifact = trainer
        .train_and_save(config.train_data_path(), config.model_path())
        .context("Training failed")?;

    // Evaluate the in-memory model on held-out data
    let metrics = Evaluator::new(&artifact.pipeline, &artifact.schema)
        .evaluate_file(config.test_data_path())
        .context("Evaluation failed")?;
    metrics.print_summary();

    // Predict with the reloaded model, as a separate process would
    let predictor = Predictor::load(config.model_path()).context("Failed to reload model")?;

    let batch = [
        GovernanceRecord::with_signals("", [1.0; 6]),
        GovernanceRecord::with_signals("", [0.0; 6]),
        GovernanceRecord::with_signals("", [2.0; 6]),
    ];
    for prediction in predictor.predict_batch(&batch) {
        report("Model multiple prediction test", &prediction);
    }

    let mut engine = predictor.create_engine();
    let single = engine.predict(&GovernanceRecord::with_signals("", [1.0; 6]));
    report("Model single prediction test", &single);

    info!("Governance Classifier finished");
    Ok(())
}

fn report(title: &str, prediction: &GovernancePrediction) {
    info!("*************************************************");
    info!("*       {}", title);
    info!("*------------------------------------------------");
    info!("*       Score:          {:.2}", prediction.score);
    info!("*       Probability:    {:.2}", prediction.probability);
    info!("*       PredictedLabel: {}", prediction.predicted_label);
    info!("*------------------------------------------------");
}
