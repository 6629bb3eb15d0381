// Evaluate test batches from a raw table
//
// Reads an optional JSON request (priorities / matrix / method) from stdin,
// scores the batches in DATA_PATH and prints the response envelope to stdout.
// Usage: echo '{"priorities": {...}}' | DATA_PATH=batches.csv cargo run --bin evaluate_batches

use anyhow::{Context, Result};
use comm_effectiveness_rust::{
    handle_request, EffectivenessScorer, EvaluationConfig, IndicatorSchema, JsonFileSink, JsonFormatter,
    RawBatchTable, ResultSink, ServiceResponse,
};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the response
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comm_effectiveness_rust=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Configuration from environment variables
    let data_path = std::env::var("DATA_PATH").unwrap_or_else(|_| "data/raw_batches.csv".to_string());
    let config_path = std::env::var("CONFIG_PATH").ok().map(PathBuf::from);
    let output_path = std::env::var("OUTPUT_PATH").ok().map(PathBuf::from);

    tracing::info!("Configuration:");
    tracing::info!("  DATA_PATH: {}", data_path);
    tracing::info!("  CONFIG_PATH: {:?}", config_path);
    tracing::info!("  OUTPUT_PATH: {:?}", output_path);

    let config = match &config_path {
        Some(path) => EvaluationConfig::load(path)?,
        None => EvaluationConfig::default(),
    };

    let schema = IndicatorSchema::default();
    let table = RawBatchTable::load(&PathBuf::from(&data_path), &schema)
        .with_context(|| format!("Failed to load raw batches from {}", data_path))?;
    tracing::info!("Loaded {} batches", table.len());

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read request from stdin")?;

    let scorer = EffectivenessScorer::new(schema, config);
    let response = handle_request(&scorer, &table, &input);

    if let (Some(path), ServiceResponse::Success(success)) = (&output_path, &response) {
        if let Err(e) = JsonFileSink::new(path).store(&success.result) {
            tracing::warn!("Failed to store evaluation result: {:#}", e);
        }
    }

    println!("{}", JsonFormatter::format(&response)?);

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
