use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const ACCURACY: &str = "accuracy";
pub const PRECISION: &str = "precision";
pub const F1_SCORE: &str = "f1_score";
pub const TRAIN_TIME: &str = "train_time";
pub const TEST_TIME: &str = "test_time";

/// Mean and population standard deviation of one metric over the folds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std: f64,
    pub values: Vec<f64>,
}

impl MetricSummary {
    pub fn from_values(values: Vec<f64>) -> Self {
        if values.is_empty() {
            return MetricSummary {
                mean: 0.0,
                std: 0.0,
                values,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        MetricSummary {
            mean,
            std: var.sqrt(),
            values,
        }
    }
}

/// Scores of one evaluated fold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldScores {
    pub fold: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub f1_score: f64,
    /// Seconds spent in `fit`.
    pub train_time: f64,
    /// Seconds spent in `predict`.
    pub test_time: f64,
}

/// Per-metric summaries of a cross-validation run, keyed by metric name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub model: String,
    pub metrics: BTreeMap<String, MetricSummary>,
}

impl EvaluationSummary {
    /// Aggregate fold scores, which must already be in fold order.
    pub fn from_folds(model: String, folds: &[FoldScores]) -> Self {
        let column = |f: fn(&FoldScores) -> f64| {
            MetricSummary::from_values(folds.iter().map(f).collect())
        };
        let mut metrics = BTreeMap::new();
        metrics.insert(ACCURACY.to_string(), column(|s| s.accuracy));
        metrics.insert(PRECISION.to_string(), column(|s| s.precision));
        metrics.insert(F1_SCORE.to_string(), column(|s| s.f1_score));
        metrics.insert(TRAIN_TIME.to_string(), column(|s| s.train_time));
        metrics.insert(TEST_TIME.to_string(), column(|s| s.test_time));
        EvaluationSummary { model, metrics }
    }

    pub fn get(&self, metric: &str) -> Option<&MetricSummary> {
        self.metrics.get(metric)
    }

    /// Mean of `metric`, or NaN when it was not recorded.
    pub fn mean(&self, metric: &str) -> f64 {
        self.get(metric).map_or(f64::NAN, |m| m.mean)
    }

    pub fn n_folds(&self) -> usize {
        self.get(ACCURACY).map_or(0, |m| m.values.len())
    }
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} folds)", self.model, self.n_folds())?;
        for name in [ACCURACY, PRECISION, F1_SCORE, TRAIN_TIME, TEST_TIME] {
            if let Some(m) = self.get(name) {
                writeln!(f, "  {:<12} {:.4} ± {:.4}", name, m.mean, m.std)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_std() {
        let m = MetricSummary::from_values(vec![1.0, 3.0]);
        assert_eq!(m.mean, 2.0);
        assert_eq!(m.std, 1.0);
    }

    #[test]
    fn test_summary_keys() {
        let folds = vec![
            FoldScores { fold: 0, accuracy: 1.0, precision: 1.0, f1_score: 1.0, train_time: 0.1, test_time: 0.2 },
            FoldScores { fold: 1, accuracy: 0.5, precision: 0.5, f1_score: 0.5, train_time: 0.3, test_time: 0.2 },
        ];
        let s = EvaluationSummary::from_folds("m".into(), &folds);
        assert_eq!(s.metrics.len(), 5);
        assert_eq!(s.n_folds(), 2);
        assert!((s.mean(ACCURACY) - 0.75).abs() < 1e-12);
        assert_eq!(s.get(TEST_TIME).unwrap().std, 0.0);
        assert!(s.mean("roc_auc").is_nan());
        assert!(s.to_string().contains("accuracy"));
    }
}
