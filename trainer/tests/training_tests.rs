use std::io::Cursor;
use std::path::PathBuf;

use proptest::prelude::*;
use shared::RandomForest;
use skycast_train::{
    run, stratified_folds, ClassificationReport, ConfusionMatrix, Dataset, DatasetError,
    GridSearch, ParamGrid, TrainOptions,
};

const HEADER: &str = "time,weathercode,temperature_2m_mean,apparent_temperature_mean,windspeed_10m_max,precipitation_sum\n";

/// Three weather codes separable on temperature and precipitation
fn synthetic_csv(per_class: usize) -> String {
    let mut csv = String::from(HEADER);
    for i in 0..per_class {
        let jitter = (i % 10) as f64 * 0.3;
        csv.push_str(&format!(
            "2023-01-{:02},0,{},{},{},0.0\n",
            i % 28 + 1,
            25.0 + jitter,
            27.0 + jitter,
            8.0 + jitter
        ));
        csv.push_str(&format!(
            "2023-02-{:02},3,{},{},{},0.0\n",
            i % 28 + 1,
            10.0 + jitter,
            8.0 + jitter,
            12.0 + jitter
        ));
        csv.push_str(&format!(
            "2023-03-{:02},61,{},{},{},{}\n",
            i % 28 + 1,
            16.0 + jitter,
            15.0 + jitter,
            20.0 + jitter,
            10.0 + jitter
        ));
    }
    csv
}

fn small_grid() -> ParamGrid {
    ParamGrid {
        n_estimators: vec![5],
        max_depth: vec![Some(3), None],
        min_samples_split: vec![2],
        min_samples_leaf: vec![1],
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("skycast-train-{}-{}", std::process::id(), name))
}

#[test]
fn test_load_drops_incomplete_rows() {
    let csv = format!(
        "{}{}{}{}",
        HEADER,
        "2023-01-01,3,10.5,9.0,14.2,0.0\n",
        "2023-01-02,61,,9.0,14.2,3.1\n",
        "2023-01-03,61.0,8.0,NaN,20.0,6.4\n2023-01-04,2,12.0,11.0,9.5,0.0\n"
    );
    let dataset = Dataset::from_reader(Cursor::new(csv)).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.dropped_rows, 2);
    assert_eq!(dataset.labels, vec![3, 2]);
    assert_eq!(dataset.features[0], vec![10.5, 9.0, 14.2, 0.0]);
}

#[test]
fn test_load_drops_rows_with_na_markers() {
    let csv = format!(
        "{}{}{}{}{}",
        HEADER,
        "2023-01-01,3,10.5,9.0,14.2,0.0\n",
        "2023-01-02,61,NULL,9.0,14.2,3.1\n",
        "2023-01-03,61,8.0,N/A,20.0,6.4\n",
        "2023-01-04,#N/A,12.0,11.0,9.5,0.0\n"
    );
    let dataset = Dataset::from_reader(Cursor::new(csv)).unwrap();

    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.dropped_rows, 3);
    assert_eq!(dataset.labels, vec![3]);
}

#[test]
fn test_load_reorders_columns() {
    let csv = "precipitation_sum,windspeed_10m_max,weathercode,apparent_temperature_mean,temperature_2m_mean\n\
               1.5,20.0,51,7.0,9.0\n";
    let dataset = Dataset::from_reader(Cursor::new(csv)).unwrap();

    assert_eq!(dataset.features[0], vec![9.0, 7.0, 20.0, 1.5]);
    assert_eq!(dataset.labels[0], 51);
}

#[test]
fn test_load_missing_column() {
    let csv = "weathercode,temperature_2m_mean\n1,2.0\n";
    let err = Dataset::from_reader(Cursor::new(csv)).unwrap_err();
    assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "apparent_temperature_mean"));
}

#[test]
fn test_load_rejects_text_in_feature() {
    let csv = format!("{}2023-01-01,3,warm,9.0,14.2,0.0\n", HEADER);
    let err = Dataset::from_reader(Cursor::new(csv)).unwrap_err();
    assert!(matches!(err, DatasetError::InvalidValue { ref column, .. } if column == "temperature_2m_mean"));
}

#[test]
fn test_load_all_rows_dropped() {
    let csv = format!("{}2023-01-01,3,,,,\n", HEADER);
    assert!(matches!(
        Dataset::from_reader(Cursor::new(csv)),
        Err(DatasetError::Empty)
    ));
}

#[test]
fn test_missing_file() {
    let err = Dataset::from_path(temp_path("does-not-exist.csv")).unwrap_err();
    assert!(matches!(err, DatasetError::Io(_)));
}

#[test]
fn test_split_sizes_and_determinism() {
    let dataset = Dataset::from_reader(Cursor::new(synthetic_csv(10))).unwrap();
    let (train, test) = dataset.train_test_split(0.2, 42).unwrap();

    assert_eq!(test.len(), 6);
    assert_eq!(train.len(), 24);

    let (train_again, test_again) = dataset.train_test_split(0.2, 42).unwrap();
    assert_eq!(train, train_again);
    assert_eq!(test, test_again);
}

#[test]
fn test_split_rejects_bad_fraction() {
    let dataset = Dataset::from_reader(Cursor::new(synthetic_csv(2))).unwrap();
    assert!(dataset.train_test_split(0.0, 1).is_err());
    assert!(dataset.train_test_split(1.0, 1).is_err());
    assert!(dataset.train_test_split(f64::NAN, 1).is_err());
}

#[test]
fn test_grid_search_picks_a_candidate_and_refits() {
    let dataset = Dataset::from_reader(Cursor::new(synthetic_csv(12))).unwrap();
    let base = shared::RandomForestParams::default().seed(7);

    let result = GridSearch::new(small_grid(), 3)
        .jobs(Some(2))
        .fit(&base, &dataset.features, &dataset.labels)
        .unwrap();

    assert_eq!(result.scores.len(), 2);
    assert!(result.best().mean_accuracy > 0.9);
    assert_eq!(
        result.best_estimator.n_trees(),
        result.best().params.n_estimators
    );
    assert!(result
        .scores
        .iter()
        .all(|s| s.mean_accuracy <= result.best().mean_accuracy));
}

#[test]
fn test_grid_search_is_independent_of_jobs() {
    let dataset = Dataset::from_reader(Cursor::new(synthetic_csv(6))).unwrap();
    let base = shared::RandomForestParams::default().seed(3);

    let serial = GridSearch::new(small_grid(), 3)
        .jobs(Some(1))
        .fit(&base, &dataset.features, &dataset.labels)
        .unwrap();
    let parallel = GridSearch::new(small_grid(), 3)
        .jobs(Some(4))
        .fit(&base, &dataset.features, &dataset.labels)
        .unwrap();

    assert_eq!(serial.scores, parallel.scores);
    assert_eq!(serial.best_index, parallel.best_index);
}

#[test]
fn test_classification_report_metrics() {
    let truth = [0, 0, 0, 3, 3, 61];
    let predicted = [0, 0, 3, 3, 3, 0];
    let report = ClassificationReport::new(&truth, &predicted);

    let clear = report.class(0).unwrap();
    assert!((clear.precision - 2.0 / 3.0).abs() < 1e-12);
    assert!((clear.recall - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(clear.support, 3);

    let rain = report.class(61).unwrap();
    assert_eq!(rain.precision, 0.0);
    assert_eq!(rain.recall, 0.0);
    assert_eq!(rain.f1_score, 0.0);

    assert!((report.accuracy - 4.0 / 6.0).abs() < 1e-12);
    assert_eq!(report.macro_avg.support, 6);

    let text = report.to_string();
    assert!(text.contains("precision"));
    assert!(text.contains("weighted avg"));
}

#[test]
fn test_confusion_matrix_counts() {
    let cm = ConfusionMatrix::new(&[0, 0, 3, 61], &[0, 3, 3, 61]);

    assert_eq!(cm.labels, vec![0, 3, 61]);
    assert_eq!(cm.matrix, vec![vec![1, 1, 0], vec![0, 1, 0], vec![0, 0, 1]]);
}

#[test]
fn test_end_to_end_run_writes_artifacts() {
    let dataset_path = temp_path("weather.csv");
    let model_out = temp_path("out/model.json");
    let matrix_out = temp_path("out/confusion_matrix.json");
    std::fs::write(&dataset_path, synthetic_csv(15)).unwrap();

    let options = TrainOptions {
        dataset: dataset_path.clone(),
        model_out: model_out.clone(),
        confusion_matrix_out: matrix_out.clone(),
        seed: 42,
        test_size: 0.2,
        folds: 3,
        jobs: Some(2),
        grid: small_grid(),
    };
    let summary = run(&options).unwrap();

    assert!(summary.test_accuracy >= 0.9);
    assert_eq!(summary.best_params.seed, 42);
    assert_eq!(summary.importances.rows.len(), 4);

    let model = RandomForest::load(&model_out).unwrap();
    assert_eq!(model.n_features(), 4);
    assert_eq!(model.classes(), &[0, 3, 61]);

    let matrix: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&matrix_out).unwrap()).unwrap();
    let total: u64 = matrix["matrix"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|row| row.as_array().unwrap().iter())
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(total, 9);

    let _ = std::fs::remove_file(dataset_path);
    let _ = std::fs::remove_dir_all(temp_path("out"));
}

proptest! {
    #[test]
    fn prop_folds_cover_every_index_once(
        labels in prop::collection::vec(0i32..5, 6..80),
        k in 2usize..6,
    ) {
        let folds = stratified_folds(&labels, k).unwrap();
        prop_assert_eq!(folds.len(), k);

        let mut seen: Vec<usize> = folds.iter().flatten().copied().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..labels.len()).collect::<Vec<_>>());

        // Per-class counts differ by at most one between folds
        for class in 0..5 {
            let counts: Vec<usize> = folds
                .iter()
                .map(|f| f.iter().filter(|&&i| labels[i] == class).count())
                .collect();
            let max = counts.iter().max().copied().unwrap_or(0);
            let min = counts.iter().min().copied().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }
    }
}
