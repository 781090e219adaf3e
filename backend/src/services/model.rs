//! Trained model access: the classifier seam, feature importances and the
//! confusion matrix written by the trainer

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use shared::{FeatureImportance, FeatureVector, ForestError, RandomForest, N_FEATURES};

use crate::error::{AppError, AppResult};

/// What the service needs from a trained classifier
pub trait WeatherClassifier: Send + Sync {
    /// Weather code for one feature vector in the fixed feature order
    fn predict(&self, features: &FeatureVector) -> Result<i32, ForestError>;

    /// Importance per feature, in the fixed feature order
    fn feature_importances(&self) -> FeatureVector;

    /// Number of fitted estimators, reported by the health endpoint
    fn n_estimators(&self) -> usize;
}

impl WeatherClassifier for RandomForest {
    fn predict(&self, features: &FeatureVector) -> Result<i32, ForestError> {
        RandomForest::predict(self, features)
    }

    fn feature_importances(&self) -> FeatureVector {
        let mut weights = [0.0; N_FEATURES];
        for (slot, value) in weights.iter_mut().zip(RandomForest::feature_importances(self)) {
            *slot = value;
        }
        weights
    }

    fn n_estimators(&self) -> usize {
        self.n_trees()
    }
}

/// Load the trainer's forest and check it was fitted on the service's features
pub fn load_classifier(path: impl AsRef<Path>) -> anyhow::Result<Arc<dyn WeatherClassifier>> {
    let path = path.as_ref();
    let forest = RandomForest::load(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;

    if forest.n_features() != N_FEATURES {
        anyhow::bail!(
            "Model at {} expects {} features, the service provides {}",
            path.display(),
            forest.n_features(),
            N_FEATURES
        );
    }

    tracing::info!(
        trees = forest.n_trees(),
        classes = ?forest.classes(),
        "Loaded random forest from {}",
        path.display()
    );
    Ok(Arc::new(forest))
}

/// Read-only views of the trained model
pub struct ModelService {
    classifier: Arc<dyn WeatherClassifier>,
    confusion_matrix_path: PathBuf,
}

impl ModelService {
    pub fn new(
        classifier: Arc<dyn WeatherClassifier>,
        confusion_matrix_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            classifier,
            confusion_matrix_path: confusion_matrix_path.into(),
        }
    }

    pub fn feature_importance(&self) -> FeatureImportance {
        FeatureImportance::from(self.classifier.feature_importances())
    }

    /// Contents of the confusion matrix file, parsed but otherwise untouched
    pub async fn confusion_matrix(&self) -> AppResult<serde_json::Value> {
        let path = &self.confusion_matrix_path;
        let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
            AppError::ConfusionMatrix(format!("{}: {}", path.display(), err))
        })?;

        serde_json::from_str(&raw)
            .map_err(|err| AppError::ConfusionMatrix(format!("{}: {}", path.display(), err)))
    }
}
