use approx::assert_abs_diff_eq;
use ferroclass::datasets::{make_blobs, make_energy_consumption};
use ferroclass::model_selection::{stratified_k_fold_split, ACCURACY, F1_SCORE};
use ferroclass::prelude::*;

#[test]
fn stratified_folds_keep_class_balance() {
    let y: Vec<Label> = (0..100).map(|i| (i % 2) as Label).collect();
    let folds = stratified_k_fold_split(&y, 5, 42).unwrap();
    assert_eq!(folds.len(), 5);

    let mut seen: Vec<usize> = Vec::new();
    for fold in &folds {
        let ones = fold.validation.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(fold.validation.len(), 20);
        assert_eq!(ones, 10);
        assert!(fold.train.iter().all(|i| !fold.validation.contains(i)));
        seen.extend(&fold.validation);
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..100).collect::<Vec<_>>());
}

#[test]
fn scaled_pipeline_under_cross_validation() {
    let (x, y) = make_blobs(120, &[vec![-3.0, 0.0, 0.0], vec![3.0, 0.0, 0.0]], 1.0, 9).unwrap();
    let mut pipe = Pipeline::with_scaler(GaussianNB::<f64>::multivariate());
    let summary = evaluate(&mut pipe, &x, &y, 5).unwrap();
    assert_eq!(summary.n_folds(), 5);
    assert!(summary.mean(ACCURACY) > 0.95);
    assert!(summary.mean(F1_SCORE) > 0.95);
    assert!(summary.model.starts_with("Naive Bayes"));
}

#[test]
fn parallel_evaluation_on_binarized_energy_data() {
    let (x, target) = make_energy_consumption(150, 4, 42).unwrap();
    let y = binarize(&target, None).unwrap();
    let ones = y.iter().filter(|&&l| l == 1).count();
    assert!(ones >= 70 && ones <= 75);

    let cv = CrossValidator::new(CrossValidationConfig {
        n_folds: 3,
        ..CrossValidationConfig::default()
    });
    let factory = || KNNClassifier::<f64>::new(5, DistanceMetric::Euclidean).map(Pipeline::<f64>::with_scaler);
    let parallel = cv.evaluate_parallel(factory, &x, &y).unwrap();
    let sequential = cv.evaluate(&mut factory().unwrap(), &x, &y).unwrap();
    let (a, b) = (parallel.get(ACCURACY).unwrap(), sequential.get(ACCURACY).unwrap());
    assert_eq!(a.values, b.values);
    assert_abs_diff_eq!(a.mean, b.mean);
    assert!(a.mean > 0.6);
}
