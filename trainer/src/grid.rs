//! Exhaustive hyperparameter search scored by stratified k-fold accuracy

use anyhow::Context;
use rayon::prelude::*;
use shared::{ForestError, RandomForest, RandomForestParams};

use crate::report::accuracy;

/// Hyperparameter values to try; every combination is one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
    pub min_samples_leaf: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![100, 200, 300],
            max_depth: vec![Some(10), Some(20), Some(30)],
            min_samples_split: vec![2, 5, 10],
            min_samples_leaf: vec![1, 2, 4],
        }
    }
}

impl ParamGrid {
    pub fn len(&self) -> usize {
        self.n_estimators.len()
            * self.max_depth.len()
            * self.min_samples_split.len()
            * self.min_samples_leaf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination applied on top of `base`, `n_estimators` varying fastest
    pub fn candidates(&self, base: &RandomForestParams) -> Vec<RandomForestParams> {
        let mut candidates = Vec::with_capacity(self.len());
        for &max_depth in &self.max_depth {
            for &min_samples_leaf in &self.min_samples_leaf {
                for &min_samples_split in &self.min_samples_split {
                    for &n_estimators in &self.n_estimators {
                        candidates.push(RandomForestParams {
                            n_estimators,
                            max_depth,
                            min_samples_split,
                            min_samples_leaf,
                            ..base.clone()
                        });
                    }
                }
            }
        }
        candidates
    }
}

/// Split sample indices into `k` test folds, spreading every class evenly.
/// Members of each class are dealt to folds in their original order.
pub fn stratified_folds(labels: &[i32], k: usize) -> Result<Vec<Vec<usize>>, ForestError> {
    if k < 2 || k > labels.len() {
        return Err(ForestError::InvalidParameter(format!(
            "cannot make {} folds from {} samples",
            k,
            labels.len()
        )));
    }

    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by_key(|&i| labels[i]);

    let mut folds = vec![Vec::new(); k];
    for (position, &i) in order.iter().enumerate() {
        folds[position % k].push(i);
    }
    for fold in &mut folds {
        fold.sort_unstable();
    }
    Ok(folds)
}

/// Mean held-out accuracy of `params` across `folds`
pub fn cross_val_score(
    params: &RandomForestParams,
    x: &[Vec<f64>],
    y: &[i32],
    folds: &[Vec<usize>],
) -> Result<f64, ForestError> {
    let mut in_test = vec![false; y.len()];
    let mut total = 0.0;

    for fold in folds {
        in_test.iter_mut().for_each(|flag| *flag = false);
        for &i in fold {
            in_test[i] = true;
        }

        let (mut train_x, mut train_y) = (Vec::new(), Vec::new());
        for i in (0..y.len()).filter(|&i| !in_test[i]) {
            train_x.push(x[i].clone());
            train_y.push(y[i]);
        }
        let test_x: Vec<Vec<f64>> = fold.iter().map(|&i| x[i].clone()).collect();
        let test_y: Vec<i32> = fold.iter().map(|&i| y[i]).collect();

        let model = params.fit(&train_x, &train_y)?;
        total += accuracy(&test_y, &model.predict_batch(&test_x)?);
    }

    Ok(total / folds.len() as f64)
}

/// Cross-validated score of one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub params: RandomForestParams,
    pub mean_accuracy: f64,
}

#[derive(Debug)]
pub struct GridSearchResult {
    pub scores: Vec<CandidateScore>,
    pub best_index: usize,
    /// Best candidate refit on all of the search data
    pub best_estimator: RandomForest,
}

impl GridSearchResult {
    pub fn best(&self) -> &CandidateScore {
        &self.scores[self.best_index]
    }
}

pub struct GridSearch {
    grid: ParamGrid,
    folds: usize,
    jobs: usize,
}

impl GridSearch {
    pub fn new(grid: ParamGrid, folds: usize) -> Self {
        Self {
            grid,
            folds,
            jobs: default_jobs(),
        }
    }

    /// Worker threads; `None` uses every available core
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs.unwrap_or_else(default_jobs).max(1);
        self
    }

    /// Score every candidate, then refit the best one (ties go to the earliest)
    pub fn fit(
        &self,
        base: &RandomForestParams,
        x: &[Vec<f64>],
        y: &[i32],
    ) -> anyhow::Result<GridSearchResult> {
        let candidates = self.grid.candidates(base);
        if candidates.is_empty() {
            anyhow::bail!("parameter grid is empty");
        }
        let folds = stratified_folds(y, self.folds)?;

        tracing::info!(
            "Fitting {} folds for each of {} candidates, totalling {} fits",
            folds.len(),
            candidates.len(),
            folds.len() * candidates.len()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .context("building grid search thread pool")?;
        let accuracies = pool.install(|| {
            candidates
                .par_iter()
                .enumerate()
                .map(|(idx, params)| -> Result<f64, ForestError> {
                    let score = cross_val_score(params, x, y, &folds)?;
                    tracing::debug!(
                        n_estimators = params.n_estimators,
                        max_depth = ?params.max_depth,
                        min_samples_split = params.min_samples_split,
                        min_samples_leaf = params.min_samples_leaf,
                        "[CV {}/{}] accuracy={:.3}",
                        idx + 1,
                        candidates.len(),
                        score
                    );
                    Ok(score)
                })
                .collect::<Result<Vec<f64>, ForestError>>()
        })?;

        let scores: Vec<CandidateScore> = candidates
            .into_iter()
            .zip(accuracies)
            .map(|(params, mean_accuracy)| CandidateScore {
                params,
                mean_accuracy,
            })
            .collect();

        let mut best_index = 0;
        for (idx, candidate) in scores.iter().enumerate() {
            if candidate.mean_accuracy > scores[best_index].mean_accuracy {
                best_index = idx;
            }
        }

        let best = &scores[best_index];
        tracing::info!(
            n_estimators = best.params.n_estimators,
            max_depth = ?best.params.max_depth,
            min_samples_split = best.params.min_samples_split,
            min_samples_leaf = best.params.min_samples_leaf,
            "Best cross-validated accuracy {:.4}",
            best.mean_accuracy
        );
        let best_estimator = best.params.fit(x, y)?;

        Ok(GridSearchResult {
            scores,
            best_index,
            best_estimator,
        })
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
