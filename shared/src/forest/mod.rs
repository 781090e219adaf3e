//! Random-forest classifier
//!
//! Bags `linfa-trees` CART trees. Each tree is fit on a bootstrap sample and a
//! random subset of the feature columns, with class weights carried as sample
//! weights. The fitted model serializes to JSON so the trainer can hand it to
//! the prediction service.

mod error;

pub use error::ForestError;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_trees::{DecisionTree, DecisionTreeParams, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Number of feature columns each tree is fit on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    #[default]
    Sqrt,
    Log2,
    All,
    Count(usize),
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let count = match self {
            MaxFeatures::Sqrt => n.sqrt() as usize,
            MaxFeatures::Log2 => n.log2() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(count) => count,
        };
        count.clamp(1, n_features.max(1))
    }
}

/// Per-class sample weighting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    #[default]
    Uniform,
    /// `n_samples / (n_classes * class_count)`, so rare codes weigh as much as common ones
    Balanced,
}

/// Hyperparameters for fitting a [`RandomForest`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RandomForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub class_weight: ClassWeight,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            class_weight: ClassWeight::Uniform,
            bootstrap: true,
            seed: 0,
        }
    }
}

impl RandomForestParams {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            ..Self::default()
        }
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    pub fn min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn class_weight(mut self, class_weight: ClassWeight) -> Self {
        self.class_weight = class_weight;
        self
    }

    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), ForestError> {
        if self.n_estimators == 0 {
            return Err(ForestError::InvalidParameter(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidParameter(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForestError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.max_features == MaxFeatures::Count(0) {
            return Err(ForestError::InvalidParameter(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Fit a forest on `x` (one row per sample) and integer labels `y`
    pub fn fit(&self, x: &[Vec<f64>], y: &[i32]) -> Result<RandomForest, ForestError> {
        self.validate()?;
        if x.is_empty() {
            return Err(ForestError::EmptyTrainingSet);
        }
        if x.len() != y.len() {
            return Err(ForestError::LabelCountMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }
        let n_features = x[0].len();
        if n_features == 0 {
            return Err(ForestError::FeatureCountMismatch {
                expected: 1,
                found: 0,
            });
        }
        for row in x {
            check_sample(row, n_features)?;
        }

        let classes: Vec<i32> = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let encoded: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();
        let class_weights = self.class_weights(&encoded, classes.len());

        let records = to_records(x, n_features)?;
        let width = self.max_features.resolve(n_features);
        let tree_params: DecisionTreeParams<f64, usize> = DecisionTree::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(self.max_depth)
            .min_weight_split(self.min_samples_split as f32)
            .min_weight_leaf(self.min_samples_leaf as f32);

        let mut master = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let mut rng = StdRng::seed_from_u64(master.gen());
            let rows: Vec<usize> = if self.bootstrap {
                (0..x.len()).map(|_| rng.gen_range(0..x.len())).collect()
            } else {
                (0..x.len()).collect()
            };
            let mut features = rand::seq::index::sample(&mut rng, n_features, width).into_vec();
            features.sort_unstable();

            let targets: Array1<usize> = rows.iter().map(|&row| encoded[row]).collect();
            let weights: Array1<f32> = rows
                .iter()
                .map(|&row| class_weights[encoded[row]] as f32)
                .collect();
            let dataset = DatasetBase::new(
                records.select(Axis(0), &rows).select(Axis(1), &features),
                targets,
            )
            .with_weights(weights);

            let tree = tree_params
                .fit(&dataset)
                .map_err(|err| ForestError::Fit(err.to_string()))?;
            let importances = spread_importances(&tree.feature_importance(), &features, n_features);
            trees.push(BaggedTree {
                features,
                importances,
                tree,
            });
        }

        Ok(RandomForest {
            params: self.clone(),
            classes,
            n_features,
            trees,
        })
    }

    fn class_weights(&self, encoded: &[usize], n_classes: usize) -> Vec<f64> {
        match self.class_weight {
            ClassWeight::Uniform => vec![1.0; n_classes],
            ClassWeight::Balanced => {
                let mut counts = vec![0usize; n_classes];
                for &class in encoded {
                    counts[class] += 1;
                }
                let n = encoded.len() as f64;
                counts
                    .iter()
                    .map(|&count| n / (n_classes as f64 * count as f64))
                    .collect()
            }
        }
    }
}

/// One bagged tree and the feature columns it was fit on
#[derive(Serialize, Deserialize)]
struct BaggedTree {
    features: Vec<usize>,
    /// Impurity-decrease importances over all forest features
    importances: Vec<f64>,
    tree: DecisionTree<f64, usize>,
}

/// A fitted random forest
#[derive(Serialize, Deserialize)]
pub struct RandomForest {
    params: RandomForestParams,
    classes: Vec<i32>,
    n_features: usize,
    trees: Vec<BaggedTree>,
}

impl std::fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomForest")
            .field("params", &self.params)
            .field("classes", &self.classes)
            .field("n_features", &self.n_features)
            .field("n_trees", &self.trees.len())
            .finish()
    }
}

impl RandomForest {
    pub fn params(&self) -> &RandomForestParams {
        &self.params
    }

    /// Class labels in ascending order; probability vectors use this indexing
    pub fn classes(&self) -> &[i32] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Deepest node level across all trees; a lone root is depth 0
    pub fn max_tree_depth(&self) -> usize {
        self.trees
            .iter()
            .flat_map(|bagged| bagged.tree.iter_nodes().map(|node| node.depth()))
            .max()
            .unwrap_or(0)
    }

    /// Share of trees voting for each class
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::NotFitted);
        }
        check_sample(sample, self.n_features)?;

        let records = Array1::from(sample.to_vec()).insert_axis(Axis(0));
        let votes = self.votes(&records);
        Ok(votes.row(0).iter().copied().collect())
    }

    /// Label with the most tree votes; ties resolve to the smallest label
    pub fn predict(&self, sample: &[f64]) -> Result<i32, ForestError> {
        let proba = self.predict_proba(sample)?;
        Ok(self.classes[argmax(proba.iter().copied())])
    }

    pub fn predict_batch(&self, x: &[Vec<f64>]) -> Result<Vec<i32>, ForestError> {
        if self.trees.is_empty() {
            return Err(ForestError::NotFitted);
        }
        for sample in x {
            check_sample(sample, self.n_features)?;
        }
        if x.is_empty() {
            return Ok(Vec::new());
        }

        let votes = self.votes(&to_records(x, self.n_features)?);
        Ok(votes
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(row.iter().copied())])
            .collect())
    }

    /// Mean decrease in impurity per feature, summing to 1.0
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut importances = vec![0.0; self.n_features];
        for bagged in &self.trees {
            for (acc, value) in importances.iter_mut().zip(&bagged.importances) {
                *acc += value;
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|value| *value /= total);
        }
        importances
    }

    /// Write the model as JSON, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ForestError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a model written by [`RandomForest::save`], rejecting trees that
    /// could not be evaluated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ForestError> {
        let reader = BufReader::new(File::open(path)?);
        let forest: Self = serde_json::from_reader(reader)?;
        forest.check_structure()?;
        Ok(forest)
    }

    fn check_structure(&self) -> Result<(), ForestError> {
        if self.trees.is_empty() || self.classes.is_empty() {
            return Err(ForestError::NotFitted);
        }
        if self.n_features == 0 {
            return Err(ForestError::CorruptModel("no features".to_string()));
        }

        for (idx, bagged) in self.trees.iter().enumerate() {
            let corrupt = |reason: &str| ForestError::CorruptModel(format!("tree {}: {}", idx, reason));

            let distinct: BTreeSet<usize> = bagged.features.iter().copied().collect();
            if bagged.features.is_empty()
                || distinct.len() != bagged.features.len()
                || bagged.features.iter().any(|&f| f >= self.n_features)
            {
                return Err(corrupt("invalid feature columns"));
            }
            if bagged.importances.len() != self.n_features
                || bagged.importances.iter().any(|v| !v.is_finite())
            {
                return Err(corrupt("invalid importances"));
            }

            for node in bagged.tree.iter_nodes() {
                if node.is_leaf() {
                    match node.prediction() {
                        Some(class) if class < self.classes.len() => {}
                        _ => return Err(corrupt("leaf predicts an unknown class")),
                    }
                } else {
                    let (feature, threshold, _) = node.split();
                    if feature >= bagged.features.len() || !threshold.is_finite() {
                        return Err(corrupt("split on an unknown feature"));
                    }
                    if node.children().iter().any(|child| child.is_none()) {
                        return Err(corrupt("split node is missing a child"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Per-row vote shares, one column per class
    fn votes(&self, records: &Array2<f64>) -> Array2<f64> {
        let mut votes = Array2::<f64>::zeros((records.nrows(), self.classes.len()));
        for bagged in &self.trees {
            let columns = records.select(Axis(1), &bagged.features);
            let predicted: Array1<usize> = bagged.tree.predict(&columns);
            for (row, &class) in predicted.iter().enumerate() {
                if class < self.classes.len() {
                    votes[[row, class]] += 1.0;
                }
            }
        }
        votes /= self.trees.len() as f64;
        votes
    }
}

fn argmax(values: impl Iterator<Item = f64>) -> usize {
    let mut best = (0, f64::NEG_INFINITY);
    for (idx, value) in values.enumerate() {
        if value > best.1 {
            best = (idx, value);
        }
    }
    best.0
}

fn to_records(x: &[Vec<f64>], n_features: usize) -> Result<Array2<f64>, ForestError> {
    let flat: Vec<f64> = x.iter().flatten().copied().collect();
    Array2::from_shape_vec((x.len(), n_features), flat)
        .map_err(|err| ForestError::InvalidParameter(err.to_string()))
}

/// Map one tree's importances over its feature subset back onto every feature.
/// A tree that never split reports NaN and contributes nothing.
fn spread_importances(local: &[f64], features: &[usize], n_features: usize) -> Vec<f64> {
    let mut importances = vec![0.0; n_features];
    if local.iter().all(|value| value.is_finite()) {
        for (&feature, &value) in features.iter().zip(local) {
            importances[feature] = value;
        }
    }
    importances
}

fn check_sample(sample: &[f64], n_features: usize) -> Result<(), ForestError> {
    if sample.len() != n_features {
        return Err(ForestError::FeatureCountMismatch {
            expected: n_features,
            found: sample.len(),
        });
    }
    if let Some(index) = sample.iter().position(|v| !v.is_finite()) {
        return Err(ForestError::NonFiniteFeature { index });
    }
    Ok(())
}
