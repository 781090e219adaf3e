use clap::Parser;
use skycast_train::{run, Cli, TrainOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skycast_train=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = TrainOptions::from(Cli::parse());
    let summary = run(&options)?;

    tracing::info!(
        n_estimators = summary.best_params.n_estimators,
        max_depth = ?summary.best_params.max_depth,
        min_samples_split = summary.best_params.min_samples_split,
        min_samples_leaf = summary.best_params.min_samples_leaf,
        cv_accuracy = summary.cv_accuracy,
        test_accuracy = summary.test_accuracy,
        "Training finished"
    );
    Ok(())
}
