use crate::split::{k_fold_split, leave_one_out_split, stratified_k_fold_split, Fold};
use crate::summary::{EvaluationSummary, FoldScores};

use ferroclass_core::validation::check_xy;
use ferroclass_core::{Classifier, Float, Label, MlResult, Tensor};
use ferroclass_metrics::{accuracy, f1, precision, Average};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Cross-validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossValidationConfig {
    pub n_folds: usize,
    pub seed: u64,
    /// Preserve class ratios in every fold.
    pub stratified: bool,
    /// Shuffle before plain K-fold; stratified folds are always shuffled.
    pub shuffle: bool,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        CrossValidationConfig {
            n_folds: 5,
            seed: 42,
            stratified: true,
            shuffle: true,
        }
    }
}

/// Pooled scores of a leave-one-out run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaveOneOutScores {
    pub accuracy: f64,
    pub precision: f64,
    pub f1_score: f64,
    /// Held-out prediction for every sample, in sample order.
    pub predictions: Vec<Label>,
}

/// Runs K-fold evaluation of classifiers.
#[derive(Debug, Clone, Default)]
pub struct CrossValidator {
    pub config: CrossValidationConfig,
}

/// Fit on the training rows and score the validation rows of one fold.
fn score_fold<T: Float, C: Classifier<T> + ?Sized>(
    classifier: &mut C,
    x: &Tensor<T>,
    y: &[Label],
    fold: &Fold,
) -> MlResult<FoldScores> {
    let x_train = x.select_rows(&fold.train)?;
    let y_train: Vec<Label> = fold.train.iter().map(|&i| y[i]).collect();
    let x_val = x.select_rows(&fold.validation)?;
    let y_val: Vec<Label> = fold.validation.iter().map(|&i| y[i]).collect();

    let start = Instant::now();
    classifier.fit(&x_train, &y_train)?;
    let train_time = start.elapsed().as_secs_f64();

    let start = Instant::now();
    let y_pred = classifier.predict(&x_val)?;
    let test_time = start.elapsed().as_secs_f64();

    let scores = FoldScores {
        fold: fold.index,
        accuracy: accuracy(&y_val, &y_pred)?,
        precision: precision(&y_val, &y_pred, Average::Macro, 0.0)?,
        f1_score: f1(&y_val, &y_pred, Average::Macro, 0.0)?,
        train_time,
        test_time,
    };
    info!(
        "{} fold {}: train {} / validation {} samples, accuracy {:.4}, f1 {:.4}",
        classifier.name(),
        fold.index + 1,
        fold.train.len(),
        fold.validation.len(),
        scores.accuracy,
        scores.f1_score
    );
    Ok(scores)
}

impl CrossValidator {
    pub fn new(config: CrossValidationConfig) -> Self {
        CrossValidator { config }
    }

    /// Stratified validator with `n_folds` folds and the default seed.
    pub fn stratified(n_folds: usize) -> Self {
        CrossValidator::new(CrossValidationConfig {
            n_folds,
            ..CrossValidationConfig::default()
        })
    }

    /// Fold partition this validator uses for `y`.
    pub fn split(&self, y: &[Label]) -> MlResult<Vec<Fold>> {
        let c = &self.config;
        if c.stratified {
            stratified_k_fold_split(y, c.n_folds, c.seed)
        } else {
            k_fold_split(y.len(), c.n_folds, c.shuffle, c.seed)
        }
    }

    /// Evaluate one classifier instance, refitting it on every fold.
    /// The first error aborts the run.
    pub fn evaluate<T, C>(&self, classifier: &mut C, x: &Tensor<T>, y: &[Label]) -> MlResult<EvaluationSummary>
    where
        T: Float,
        C: Classifier<T> + ?Sized,
    {
        check_xy(x, y)?;
        let folds = self.split(y)?;
        let scores = folds
            .iter()
            .map(|fold| score_fold(classifier, x, y, fold))
            .collect::<MlResult<Vec<_>>>()?;
        Ok(EvaluationSummary::from_folds(classifier.name(), &scores))
    }

    /// Same as [`evaluate`](Self::evaluate) with folds run on the rayon
    /// pool, each on a fresh classifier from `factory`. Results stay in
    /// fold order.
    pub fn evaluate_parallel<T, C, F>(&self, factory: F, x: &Tensor<T>, y: &[Label]) -> MlResult<EvaluationSummary>
    where
        T: Float,
        C: Classifier<T> + Send,
        F: Fn() -> MlResult<C> + Sync,
    {
        check_xy(x, y)?;
        let folds = self.split(y)?;
        let results = folds
            .par_iter()
            .map(|fold| {
                let mut classifier = factory()?;
                let scores = score_fold(&mut classifier, x, y, fold)?;
                Ok((classifier.name(), scores))
            })
            .collect::<MlResult<Vec<_>>>()?;
        let (names, scores): (Vec<String>, Vec<FoldScores>) = results.into_iter().unzip();
        let name = names.into_iter().next().unwrap_or_default();
        Ok(EvaluationSummary::from_folds(name, &scores))
    }

    /// Leave-one-out: one fit per sample, scored on the pooled predictions.
    pub fn leave_one_out<T, C>(&self, classifier: &mut C, x: &Tensor<T>, y: &[Label]) -> MlResult<LeaveOneOutScores>
    where
        T: Float,
        C: Classifier<T> + ?Sized,
    {
        let (n, _) = check_xy(x, y)?;
        let mut predictions = Vec::with_capacity(n);
        for fold in leave_one_out_split(n)? {
            let x_train = x.select_rows(&fold.train)?;
            let y_train: Vec<Label> = fold.train.iter().map(|&i| y[i]).collect();
            classifier.fit(&x_train, &y_train)?;
            let pred = classifier.predict(&x.select_rows(&fold.validation)?)?;
            predictions.extend(pred);
        }
        Ok(LeaveOneOutScores {
            accuracy: accuracy(y, &predictions)?,
            precision: precision(y, &predictions, Average::Macro, 0.0)?,
            f1_score: f1(y, &predictions, Average::Macro, 0.0)?,
            predictions,
        })
    }
}

/// Stratified `n_folds` evaluation with the default seed.
pub fn evaluate<T, C>(classifier: &mut C, x: &Tensor<T>, y: &[Label], n_folds: usize) -> MlResult<EvaluationSummary>
where
    T: Float,
    C: Classifier<T> + ?Sized,
{
    CrossValidator::stratified(n_folds).evaluate(classifier, x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{ACCURACY, F1_SCORE, PRECISION, TEST_TIME, TRAIN_TIME};
    use ferroclass_core::MlError;
    use ferroclass_neighbors::{DistanceMetric, KNNClassifier};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn data() -> (Tensor<f64>, Vec<Label>) {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let offset = if i % 2 == 0 { 0.0 } else { 10.0 };
            rows.push(vec![offset + (i as f64) * 0.1, offset - (i as f64) * 0.05]);
            y.push((i % 2) as Label);
        }
        (Tensor::from_vec2d(&rows).unwrap(), y)
    }

    /// Always fails on fit.
    struct Broken;

    impl Classifier<f64> for Broken {
        fn fit(&mut self, _: &Tensor<f64>, _: &[Label]) -> MlResult<()> {
            Err(MlError::InvalidParameter("broken".into()))
        }
        fn predict(&self, _: &Tensor<f64>) -> MlResult<Vec<Label>> {
            Ok(Vec::new())
        }
        fn predict_proba(&self, _: &Tensor<f64>) -> MlResult<Tensor<f64>> {
            Ok(Tensor::zeros(vec![0, 0]))
        }
        fn classes(&self) -> &[Label] {
            &[]
        }
        fn name(&self) -> String {
            "broken".into()
        }
    }

    #[test]
    fn test_evaluate_reports_every_metric() {
        let (x, y) = data();
        let mut knn = KNNClassifier::<f64>::new(3, DistanceMetric::Euclidean).unwrap();
        let summary = evaluate(&mut knn, &x, &y, 5).unwrap();
        for key in [ACCURACY, PRECISION, F1_SCORE, TRAIN_TIME, TEST_TIME] {
            assert_eq!(summary.get(key).unwrap().values.len(), 5, "{}", key);
        }
        assert_eq!(summary.mean(ACCURACY), 1.0);
        assert_eq!(summary.get(ACCURACY).unwrap().std, 0.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (x, y) = data();
        let cv = CrossValidator::new(CrossValidationConfig {
            n_folds: 4,
            stratified: false,
            ..CrossValidationConfig::default()
        });
        let mut knn = KNNClassifier::<f64>::new(1, DistanceMetric::Manhattan).unwrap();
        let seq = cv.evaluate(&mut knn, &x, &y).unwrap();
        let par = cv
            .evaluate_parallel(|| KNNClassifier::<f64>::new(1, DistanceMetric::Manhattan), &x, &y)
            .unwrap();
        for key in [ACCURACY, PRECISION, F1_SCORE] {
            assert_eq!(seq.get(key).unwrap().values, par.get(key).unwrap().values);
        }
        assert_eq!(seq.model, par.model);
    }

    #[test]
    fn test_errors_abort_the_run() {
        let (x, y) = data();
        assert_eq!(
            evaluate(&mut Broken, &x, &y, 5).unwrap_err(),
            MlError::InvalidParameter("broken".into())
        );
        let mut knn = KNNClassifier::<f64>::new(3, DistanceMetric::Euclidean).unwrap();
        assert!(evaluate(&mut knn, &x, &y[..10], 5).is_err());
    }

    #[test]
    fn test_parallel_errors_abort_the_run() {
        let (x, y) = data();
        let err = CrossValidator::default()
            .evaluate_parallel(|| Ok(Broken), &x, &y)
            .unwrap_err();
        assert_eq!(err, MlError::InvalidParameter("broken".into()));
    }

    #[test]
    fn test_parallel_builds_one_classifier_per_fold() {
        let (x, y) = data();
        let built = AtomicUsize::new(0);
        let summary = CrossValidator::stratified(4)
            .evaluate_parallel(
                || {
                    built.fetch_add(1, Ordering::SeqCst);
                    KNNClassifier::<f64>::new(3, DistanceMetric::Euclidean)
                },
                &x,
                &y,
            )
            .unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 4);
        assert_eq!(summary.n_folds(), 4);
        assert_eq!(summary.model, KNNClassifier::<f64>::new(3, DistanceMetric::Euclidean).unwrap().name());
    }

    #[test]
    fn test_leave_one_out() {
        let (x, y) = data();
        let mut knn = KNNClassifier::<f64>::new(1, DistanceMetric::Euclidean).unwrap();
        let loo = CrossValidator::default().leave_one_out(&mut knn, &x, &y).unwrap();
        assert_eq!(loo.predictions.len(), 20);
        assert_eq!(loo.accuracy, 1.0);
        assert_eq!(loo.f1_score, 1.0);
    }
}
