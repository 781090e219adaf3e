use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "skycast-train",
    version,
    about = "Train the SkyCast weather code classifier"
)]
pub struct Cli {
    /// Labelled daily weather CSV
    #[arg(long, default_value = "Weather_Dataset.csv")]
    pub dataset: PathBuf,

    /// Where to write the fitted model
    #[arg(long, default_value = "models/random_forest_model_weather.json")]
    pub model_out: PathBuf,

    /// Where to write the held-out confusion matrix
    #[arg(long, default_value = "confusion_matrix.json")]
    pub confusion_matrix_out: PathBuf,

    /// Seed for the split, the folds and every tree
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Cross-validation folds per grid candidate
    #[arg(long, default_value_t = 3)]
    pub folds: usize,

    /// Grid search worker threads (defaults to all cores)
    #[arg(long)]
    pub jobs: Option<usize>,
}
