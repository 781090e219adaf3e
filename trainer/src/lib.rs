//! Offline training pipeline for the SkyCast weather code classifier.
//!
//! Loads the labelled CSV, holds out a test split, grid-searches random
//! forest hyperparameters with stratified cross-validation, reports on the
//! held-out rows and writes the model and confusion matrix the server reads.

pub mod cli;
pub mod dataset;
pub mod grid;
pub mod report;

use std::path::PathBuf;

use anyhow::Context;
use shared::{ClassWeight, RandomForestParams};

pub use cli::Cli;
pub use dataset::{Dataset, DatasetError};
pub use grid::{cross_val_score, stratified_folds, GridSearch, GridSearchResult, ParamGrid};
pub use report::{accuracy, ClassificationReport, ConfusionMatrix, FeatureImportanceTable};

#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub dataset: PathBuf,
    pub model_out: PathBuf,
    pub confusion_matrix_out: PathBuf,
    pub seed: u64,
    pub test_size: f64,
    pub folds: usize,
    pub jobs: Option<usize>,
    pub grid: ParamGrid,
}

impl From<Cli> for TrainOptions {
    fn from(cli: Cli) -> Self {
        Self {
            dataset: cli.dataset,
            model_out: cli.model_out,
            confusion_matrix_out: cli.confusion_matrix_out,
            seed: cli.seed,
            test_size: cli.test_size,
            folds: cli.folds,
            jobs: cli.jobs,
            grid: ParamGrid::default(),
        }
    }
}

/// What a training run produced
#[derive(Debug)]
pub struct TrainingSummary {
    pub best_params: RandomForestParams,
    pub cv_accuracy: f64,
    pub test_accuracy: f64,
    pub report: ClassificationReport,
    pub confusion_matrix: ConfusionMatrix,
    pub importances: FeatureImportanceTable,
}

pub fn run(options: &TrainOptions) -> anyhow::Result<TrainingSummary> {
    let dataset = Dataset::from_path(&options.dataset)
        .with_context(|| format!("loading {}", options.dataset.display()))?;
    tracing::info!(
        rows = dataset.len(),
        dropped = dataset.dropped_rows,
        "Loaded {}",
        options.dataset.display()
    );

    let (train, test) = dataset.train_test_split(options.test_size, options.seed)?;
    tracing::info!(train = train.len(), test = test.len(), "Split dataset");

    let base = RandomForestParams::default()
        .class_weight(ClassWeight::Balanced)
        .seed(options.seed);
    let search = GridSearch::new(options.grid.clone(), options.folds)
        .jobs(options.jobs)
        .fit(&base, &train.features, &train.labels)
        .context("grid search failed")?;
    let best = search.best().clone();
    let model = search.best_estimator;

    let predicted = model.predict_batch(&test.features)?;
    let report = ClassificationReport::new(&test.labels, &predicted);
    let confusion_matrix = ConfusionMatrix::new(&test.labels, &predicted);
    let importances = FeatureImportanceTable::new(&model.feature_importances());

    println!("Random Forest Accuracy: {}", report.accuracy);
    println!("Classification Report:");
    println!("{}", report);
    println!("Feature Importance:");
    println!("{}", importances);

    model
        .save(&options.model_out)
        .with_context(|| format!("writing {}", options.model_out.display()))?;
    confusion_matrix
        .save(&options.confusion_matrix_out)
        .with_context(|| format!("writing {}", options.confusion_matrix_out.display()))?;
    tracing::info!(
        model = %options.model_out.display(),
        confusion_matrix = %options.confusion_matrix_out.display(),
        "Saved training artifacts"
    );

    Ok(TrainingSummary {
        best_params: best.params,
        cv_accuracy: best.mean_accuracy,
        test_accuracy: report.accuracy,
        report,
        confusion_matrix,
        importances,
    })
}
