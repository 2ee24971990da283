use ferroclass_core::validation::{check_features, check_xy};
use ferroclass_core::{
    Classifier, ClassIndex, Float, Label, MlError, MlResult, Tensor,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Distance metric for KNN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceMetric {
    Euclidean,
    Manhattan,
    /// `(Σ|a−b|^p)^(1/p)`, `p > 0`.
    Minkowski(f64),
}

impl DistanceMetric {
    /// Parse a metric name; `p` is only read for `"minkowski"`.
    pub fn parse(name: &str, p: f64) -> MlResult<Self> {
        let metric = match name.to_ascii_lowercase().as_str() {
            "euclidean" => DistanceMetric::Euclidean,
            "manhattan" => DistanceMetric::Manhattan,
            "minkowski" => DistanceMetric::Minkowski(p),
            _ => return Err(MlError::UnsupportedDistanceMetric(name.to_string())),
        };
        metric.validate()?;
        Ok(metric)
    }

    fn validate(&self) -> MlResult<()> {
        match self {
            DistanceMetric::Minkowski(p) if !(*p > 0.0) => Err(MlError::InvalidParameter(
                format!("Minkowski p must be positive, got {}", p),
            )),
            _ => Ok(()),
        }
    }

    pub fn distance<T: Float>(&self, a: &[T], b: &[T]) -> T {
        match *self {
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b)
                .map(|(&x, &y)| (x - y) * (x - y))
                .sum::<T>()
                .sqrt(),
            DistanceMetric::Manhattan => a.iter().zip(b).map(|(&x, &y)| (x - y).abs()).sum(),
            DistanceMetric::Minkowski(p) => {
                let p = T::from_f64(p);
                a.iter()
                    .zip(b)
                    .map(|(&x, &y)| (x - y).abs().powf(p))
                    .sum::<T>()
                    .powf(T::ONE / p)
            }
        }
    }
}

/// Serializable KNN hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnConfig {
    pub k: usize,
    pub metric: String,
    /// Exponent for the Minkowski metric.
    pub p: f64,
}

impl Default for KnnConfig {
    fn default() -> Self {
        KnnConfig {
            k: 5,
            metric: "euclidean".to_string(),
            p: 2.0,
        }
    }
}

/// K-Nearest Neighbors Classifier.
///
/// Lazy learner: `fit` only stores a copy of the training data, and every
/// prediction scans all of it, costing `O(n_train × n_query × d)`. Training
/// time is therefore near zero while inference dominates, which matters when
/// comparing timings against eager models.
#[derive(Debug, Clone)]
pub struct KNNClassifier<T: Float> {
    pub k: usize,
    pub metric: DistanceMetric,
    x_train: Option<Tensor<T>>,
    y_train: Vec<Label>,
    classes: ClassIndex,
}

impl<T: Float> KNNClassifier<T> {
    pub fn new(k: usize, metric: DistanceMetric) -> MlResult<Self> {
        if k == 0 {
            return Err(MlError::InvalidParameter("k must be at least 1".into()));
        }
        metric.validate()?;
        Ok(KNNClassifier {
            k,
            metric,
            x_train: None,
            y_train: Vec::new(),
            classes: ClassIndex::default(),
        })
    }

    pub fn from_config(config: &KnnConfig) -> MlResult<Self> {
        Self::new(config.k, DistanceMetric::parse(&config.metric, config.p)?)
    }

    fn train(&self) -> MlResult<&Tensor<T>> {
        self.x_train.as_ref().ok_or(MlError::NotFitted("KNNClassifier"))
    }

    /// Training-row indices of the `k` nearest neighbours of `query`,
    /// nearest first. Equal distances keep training order.
    pub fn kneighbors(&self, query: &[T]) -> MlResult<Vec<usize>> {
        let train = self.train()?;
        let mut dists: Vec<(T, usize)> = train
            .rows()
            .enumerate()
            .map(|(j, row)| (self.metric.distance(query, row), j))
            .collect();
        dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        dists.truncate(self.k);
        Ok(dists.into_iter().map(|(_, j)| j).collect())
    }

    /// Vote count per class column plus the winning column. Ties go to the
    /// class reached first while walking neighbours nearest-first.
    fn vote(&self, query: &[T]) -> MlResult<(Vec<usize>, usize)> {
        let neighbours = self.kneighbors(query)?;
        let mut votes = vec![0usize; self.classes.len()];
        let mut first_seen = vec![usize::MAX; self.classes.len()];
        for (rank, &j) in neighbours.iter().enumerate() {
            let c = self.classes.index_of(self.y_train[j])?;
            votes[c] += 1;
            first_seen[c] = first_seen[c].min(rank);
        }
        let best = (0..votes.len())
            .max_by(|&a, &b| votes[a].cmp(&votes[b]).then(first_seen[b].cmp(&first_seen[a])))
            .unwrap_or(0);
        Ok((votes, best))
    }
}

impl<T: Float> Classifier<T> for KNNClassifier<T> {
    fn fit(&mut self, x: &Tensor<T>, y: &[Label]) -> MlResult<()> {
        let (n, d) = check_xy(x, y)?;
        self.x_train = Some(x.clone());
        self.y_train = y.to_vec();
        self.classes = ClassIndex::from_labels(y);
        debug!(
            "KNN stored {} samples x {} features, {} classes",
            n,
            d,
            self.classes.len()
        );
        Ok(())
    }

    fn predict(&self, x: &Tensor<T>) -> MlResult<Vec<Label>> {
        let train = self.train()?;
        check_features(x, train.dims2()?.1)?;
        x.rows()
            .map(|q| {
                let (_, best) = self.vote(q)?;
                self.classes.label_at(best)
            })
            .collect()
    }

    fn predict_proba(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        let train = self.train()?;
        let (n_train, d) = train.dims2()?;
        let n = check_features(x, d)?;
        let denom = T::from_usize(self.k.min(n_train));
        let mut data = Vec::with_capacity(n * self.classes.len());
        for q in x.rows() {
            let (votes, _) = self.vote(q)?;
            data.extend(votes.into_iter().map(|v| T::from_usize(v) / denom));
        }
        Tensor::new(data, vec![n, self.classes.len()])
    }

    fn classes(&self) -> &[Label] {
        self.classes.labels()
    }

    fn name(&self) -> String {
        let metric = match self.metric {
            DistanceMetric::Euclidean => "euclidean".to_string(),
            DistanceMetric::Manhattan => "manhattan".to_string(),
            DistanceMetric::Minkowski(p) => format!("minkowski, p={}", p),
        };
        format!("KNN (k={}, {})", self.k, metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clusters() -> (Tensor<f64>, Vec<Label>) {
        let x = Tensor::from_vec2d(&[
            vec![0.0, 0.0], vec![0.5, 0.5], vec![1.0, 1.0],
            vec![5.0, 5.0], vec![5.5, 5.5], vec![6.0, 6.0],
        ])
        .unwrap();
        (x, vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn test_knn_classifier() {
        let (x, y) = clusters();
        let mut knn = KNNClassifier::new(3, DistanceMetric::Euclidean).unwrap();
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_k1_recovers_training_labels() {
        let (x, _) = clusters();
        let y = vec![4, 9, 4, 9, 2, 4];
        for metric in [
            DistanceMetric::Euclidean,
            DistanceMetric::Manhattan,
            DistanceMetric::Minkowski(3.0),
        ] {
            let mut knn = KNNClassifier::new(1, metric).unwrap();
            knn.fit(&x, &y).unwrap();
            assert_eq!(knn.predict(&x).unwrap(), y);
        }
    }

    #[test]
    fn test_distances() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        assert!((DistanceMetric::Euclidean.distance(&a, &b) - 5.0f64).abs() < 1e-12);
        assert!((DistanceMetric::Manhattan.distance(&a, &b) - 7.0f64).abs() < 1e-12);
        let m2: f64 = DistanceMetric::Minkowski(2.0).distance(&a, &b);
        assert!((m2 - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_vote_tie_goes_to_nearest_class() {
        // Query at 0: neighbours in order 1.0 (label 7), 2.0 (label 3).
        let x = Tensor::from_vec2d(&[vec![2.0], vec![1.0]]).unwrap();
        let mut knn = KNNClassifier::new(2, DistanceMetric::Euclidean).unwrap();
        knn.fit(&x, &[3, 7]).unwrap();
        let q = Tensor::from_vec2d(&[vec![0.0]]).unwrap();
        assert_eq!(knn.predict(&q).unwrap(), vec![7]);
    }

    #[test]
    fn test_predict_proba() {
        let (x, y) = clusters();
        let mut knn = KNNClassifier::new(3, DistanceMetric::Euclidean).unwrap();
        knn.fit(&x, &y).unwrap();
        let q = Tensor::from_vec2d(&[vec![0.2, 0.2], vec![4.0, 4.0]]).unwrap();
        let proba = knn.predict_proba(&q).unwrap();
        assert_eq!(proba.shape_vec(), vec![2, 2]);
        assert!((proba.get(&[0, 0]).unwrap() - 1.0).abs() < 1e-12);
        for row in proba.rows() {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }

        // k larger than the training set divides by n_train.
        let mut big = KNNClassifier::new(10, DistanceMetric::Manhattan).unwrap();
        big.fit(&x, &y).unwrap();
        let proba = big.predict_proba(&q).unwrap();
        assert!((proba.get(&[0, 0]).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_configuration_errors() {
        assert!(matches!(
            KNNClassifier::<f64>::new(0, DistanceMetric::Euclidean),
            Err(MlError::InvalidParameter(_))
        ));
        let cfg = KnnConfig {
            metric: "cosine".into(),
            ..KnnConfig::default()
        };
        assert_eq!(
            KNNClassifier::<f64>::from_config(&cfg).unwrap_err(),
            MlError::UnsupportedDistanceMetric("cosine".into())
        );
        assert!(DistanceMetric::parse("minkowski", 0.0).is_err());
    }

    #[test]
    fn test_shape_and_state_errors() {
        let (x, y) = clusters();
        let knn = KNNClassifier::<f64>::new(3, DistanceMetric::Euclidean).unwrap();
        assert_eq!(knn.predict(&x).unwrap_err(), MlError::NotFitted("KNNClassifier"));

        let mut knn = knn;
        knn.fit(&x, &y).unwrap();
        let wrong: Tensor<f64> = Tensor::zeros(vec![1, 3]);
        assert!(matches!(knn.predict(&wrong), Err(MlError::ShapeMismatch { .. })));
        assert!(knn.fit(&x, &y[..5]).is_err());
    }
}
