//! Evaluation metrics and their printable forms

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::Serialize;
use shared::FEATURE_NAMES;

/// Fraction of predictions equal to the truth; 0 for empty input
pub fn accuracy(truth: &[i32], predicted: &[i32]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / truth.len() as f64
}

fn observed_labels(truth: &[i32], predicted: &[i32]) -> Vec<i32> {
    truth
        .iter()
        .chain(predicted)
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Rows are true labels, columns predicted labels, both in ascending order.
/// Written as `{"labels": [...], "matrix": [[...]]}` for the confusion matrix endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<i32>,
    pub matrix: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    pub fn new(truth: &[i32], predicted: &[i32]) -> Self {
        let labels = observed_labels(truth, predicted);
        let mut matrix = vec![vec![0; labels.len()]; labels.len()];
        for (t, p) in truth.iter().zip(predicted) {
            // Both come from `labels`, so the searches cannot miss
            if let (Ok(row), Ok(col)) = (labels.binary_search(t), labels.binary_search(p)) {
                matrix[row][col] += 1;
            }
        }
        Self { labels, matrix }
    }

    pub fn count(&self, truth: i32, predicted: i32) -> u64 {
        match (
            self.labels.binary_search(&truth),
            self.labels.binary_search(&predicted),
        ) {
            (Ok(row), Ok(col)) => self.matrix[row][col],
            _ => 0,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class precision, recall and F1 plus macro and weighted averages.
/// Undefined ratios (no predictions or no support) count as 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<(i32, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn new(truth: &[i32], predicted: &[i32]) -> Self {
        let confusion = ConfusionMatrix::new(truth, predicted);
        let n = confusion.labels.len();

        let classes: Vec<(i32, ClassMetrics)> = (0..n)
            .map(|i| {
                let true_positive = confusion.matrix[i][i] as f64;
                let support: u64 = confusion.matrix[i].iter().sum();
                let predicted_count: u64 = confusion.matrix.iter().map(|row| row[i]).sum();

                let precision = ratio(true_positive, predicted_count as f64);
                let recall = ratio(true_positive, support as f64);
                let f1_score = ratio(2.0 * precision * recall, precision + recall);
                (
                    confusion.labels[i],
                    ClassMetrics {
                        precision,
                        recall,
                        f1_score,
                        support: support as usize,
                    },
                )
            })
            .collect();

        let total = truth.len();
        let average = |weight: &dyn Fn(&ClassMetrics) -> f64, norm: f64| ClassMetrics {
            precision: ratio(classes.iter().map(|(_, m)| m.precision * weight(m)).sum(), norm),
            recall: ratio(classes.iter().map(|(_, m)| m.recall * weight(m)).sum(), norm),
            f1_score: ratio(classes.iter().map(|(_, m)| m.f1_score * weight(m)).sum(), norm),
            support: total,
        };
        let macro_avg = average(&|_: &ClassMetrics| 1.0, n as f64);
        let weighted_avg = average(&|m: &ClassMetrics| m.support as f64, total as f64);

        Self {
            accuracy: accuracy(truth, predicted),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn class(&self, label: i32) -> Option<&ClassMetrics> {
        self.classes
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, metrics)| metrics)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        name, m.precision, m.recall, m.f1_score, m.support
    )
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, metrics) in &self.classes {
            write_row(f, &label.to_string(), metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

/// Feature importances listed in model feature order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportanceTable {
    pub rows: Vec<(&'static str, f64)>,
}

impl FeatureImportanceTable {
    pub fn new(importances: &[f64]) -> Self {
        let rows = FEATURE_NAMES
            .iter()
            .copied()
            .zip(importances.iter().copied())
            .collect();
        Self { rows }
    }
}

impl fmt::Display for FeatureImportanceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<28} {:>10}", "Feature", "Importance")?;
        for (name, value) in &self.rows {
            writeln!(f, "{:<28} {:>10.6}", name, value)?;
        }
        Ok(())
    }
}
