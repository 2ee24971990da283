use ferroclass_core::validation::{check_features, check_xy};
use ferroclass_core::{
    argmax, dot, Classifier, ClassIndex, Float, Label, MlError, MlResult, Tensor,
};
use ferroclass_linalg::{inv, slogdet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Added to every per-feature standard deviation.
const STD_EPS: f64 = 1e-10;
/// Ridge added to the covariance diagonal.
const COV_RIDGE: f64 = 1e-6;

/// Which likelihood model Gaussian NB uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NaiveBayesVariant {
    /// Independent per-feature normals.
    Univariate,
    /// One full-covariance normal per class.
    Multivariate,
}

impl FromStr for NaiveBayesVariant {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "univariate" => Ok(NaiveBayesVariant::Univariate),
            "multivariate" => Ok(NaiveBayesVariant::Multivariate),
            _ => Err(MlError::UnsupportedVariant(s.to_string())),
        }
    }
}

impl fmt::Display for NaiveBayesVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NaiveBayesVariant::Univariate => "univariate",
            NaiveBayesVariant::Multivariate => "multivariate",
        })
    }
}

/// Serializable Naive Bayes hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaiveBayesConfig {
    pub variant: String,
}

impl Default for NaiveBayesConfig {
    fn default() -> Self {
        NaiveBayesConfig {
            variant: "multivariate".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum Covariance<T: Float> {
    Full { inverse: Tensor<T>, log_det: T },
    /// Used when the regularized covariance could not be inverted.
    Diagonal { std: Vec<T> },
}

#[derive(Debug, Clone)]
struct ClassStats<T: Float> {
    log_prior: T,
    mean: Vec<T>,
    std: Vec<T>,
    covariance: Option<Covariance<T>>,
}

/// `ln N(x; μ, σ²)` for a scalar.
#[inline]
fn log_normal<T: Float>(x: T, mean: T, std: T) -> T {
    let z = (x - mean) / std;
    -(T::TWO * T::PI).ln() * T::HALF - std.ln() - z * z * T::HALF
}

fn log_normal_diag<T: Float>(x: &[T], mean: &[T], std: &[T]) -> T {
    x.iter()
        .zip(mean)
        .zip(std)
        .map(|((&v, &m), &s)| log_normal(v, m, s))
        .sum()
}

/// Sample covariance (n−1 denominator, n for a single sample) plus `ridge·I`.
fn covariance<T: Float>(rows: &[&[T]], mean: &[T], ridge: T) -> MlResult<Tensor<T>> {
    let d = mean.len();
    let denom = T::from_usize(rows.len().saturating_sub(1).max(1));
    let mut cov = vec![T::ZERO; d * d];
    for row in rows {
        for i in 0..d {
            let di = row[i] - mean[i];
            for j in i..d {
                cov[i * d + j] += di * (row[j] - mean[j]);
            }
        }
    }
    for i in 0..d {
        for j in i..d {
            let v = cov[i * d + j] / denom;
            cov[i * d + j] = v;
            cov[j * d + i] = v;
        }
        cov[i * d + i] += ridge;
    }
    Tensor::new(cov, vec![d, d])
}

fn full_or_diagonal<T: Float>(cov: &Tensor<T>, label: Label) -> MlResult<Covariance<T>> {
    let d = cov.dims2()?.0;
    let (sign, log_det) = slogdet(cov)?;
    let inverse = if sign > T::ZERO { inv(cov).ok() } else { None };
    match inverse {
        Some(inverse) => Ok(Covariance::Full { inverse, log_det }),
        None => {
            warn!(
                "covariance of class {} is singular; using independent features for it",
                label
            );
            let eps = T::from_f64(STD_EPS);
            let std = (0..d).map(|i| cov.data()[i * d + i].sqrt() + eps).collect();
            Ok(Covariance::Diagonal { std })
        }
    }
}

/// Gaussian Naive Bayes classifier.
///
/// The univariate variant treats features as independent normals. The
/// multivariate variant fits a full covariance per class; its inverse and
/// log-determinant are computed once in `fit`.
#[derive(Debug, Clone)]
pub struct GaussianNB<T: Float> {
    pub variant: NaiveBayesVariant,
    stats: Vec<ClassStats<T>>,
    classes: ClassIndex,
    n_features: usize,
}

impl<T: Float> GaussianNB<T> {
    pub fn new(variant: NaiveBayesVariant) -> Self {
        GaussianNB {
            variant,
            stats: Vec::new(),
            classes: ClassIndex::default(),
            n_features: 0,
        }
    }

    pub fn univariate() -> Self {
        Self::new(NaiveBayesVariant::Univariate)
    }

    pub fn multivariate() -> Self {
        Self::new(NaiveBayesVariant::Multivariate)
    }

    pub fn from_config(config: &NaiveBayesConfig) -> MlResult<Self> {
        Ok(Self::new(config.variant.parse()?))
    }

    pub fn class_priors(&self) -> Vec<T> {
        self.stats.iter().map(|s| s.log_prior.exp()).collect()
    }

    pub fn class_means(&self) -> Vec<&[T]> {
        self.stats.iter().map(|s| s.mean.as_slice()).collect()
    }

    /// Classes whose covariance fell back to the diagonal approximation.
    pub fn fallback_classes(&self) -> Vec<Label> {
        self.stats
            .iter()
            .zip(self.classes.labels())
            .filter(|(s, _)| matches!(s.covariance, Some(Covariance::Diagonal { .. })))
            .map(|(_, &l)| l)
            .collect()
    }

    fn log_likelihood(&self, stats: &ClassStats<T>, x: &[T]) -> T {
        match &stats.covariance {
            None => log_normal_diag(x, &stats.mean, &stats.std),
            Some(Covariance::Diagonal { std }) => log_normal_diag(x, &stats.mean, std),
            Some(Covariance::Full { inverse, log_det }) => {
                let d = stats.mean.len();
                let diff: Vec<T> = x.iter().zip(&stats.mean).map(|(&a, &m)| a - m).collect();
                let mahalanobis: T = inverse
                    .rows()
                    .zip(&diff)
                    .map(|(row, &di)| di * dot(row, &diff))
                    .sum();
                -T::HALF * (T::from_usize(d) * (T::TWO * T::PI).ln() + *log_det + mahalanobis)
            }
        }
    }

    /// Unnormalized log-posterior `ln P(c) + ln p(x | c)`, `[n_samples, n_classes]`.
    pub fn predict_log_posterior(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        if self.stats.is_empty() {
            return Err(MlError::NotFitted("GaussianNB"));
        }
        let n = check_features(x, self.n_features)?;
        let mut data = Vec::with_capacity(n * self.stats.len());
        for row in x.rows() {
            data.extend(
                self.stats
                    .iter()
                    .map(|s| s.log_prior + self.log_likelihood(s, row)),
            );
        }
        Tensor::new(data, vec![n, self.stats.len()])
    }
}

impl<T: Float> Classifier<T> for GaussianNB<T> {
    fn fit(&mut self, x: &Tensor<T>, y: &[Label]) -> MlResult<()> {
        let (n, d) = check_xy(x, y)?;
        let classes = ClassIndex::from_labels(y);
        let eps = T::from_f64(STD_EPS);
        let ridge = T::from_f64(COV_RIDGE);

        let mut stats = Vec::with_capacity(classes.len());
        for &label in classes.labels() {
            let rows: Vec<&[T]> = x
                .rows()
                .zip(y)
                .filter(|(_, &l)| l == label)
                .map(|(r, _)| r)
                .collect();
            let count = T::from_usize(rows.len());

            let mut mean = vec![T::ZERO; d];
            for row in &rows {
                for (m, &v) in mean.iter_mut().zip(row.iter()) {
                    *m += v;
                }
            }
            mean.iter_mut().for_each(|m| *m /= count);

            let mut var = vec![T::ZERO; d];
            for row in &rows {
                for ((s, &v), &m) in var.iter_mut().zip(row.iter()).zip(&mean) {
                    *s += (v - m) * (v - m);
                }
            }
            let std = var.into_iter().map(|s| (s / count).sqrt() + eps).collect();

            let covariance = match self.variant {
                NaiveBayesVariant::Univariate => None,
                NaiveBayesVariant::Multivariate => {
                    let cov = covariance(&rows, &mean, ridge)?;
                    Some(full_or_diagonal(&cov, label)?)
                }
            };

            stats.push(ClassStats {
                log_prior: (count / T::from_usize(n)).ln(),
                mean,
                std,
                covariance,
            });
        }

        debug!(
            "GaussianNB ({}) fitted {} classes on {} features",
            self.variant,
            classes.len(),
            d
        );
        self.stats = stats;
        self.classes = classes;
        self.n_features = d;
        Ok(())
    }

    fn predict(&self, x: &Tensor<T>) -> MlResult<Vec<Label>> {
        let log_post = self.predict_log_posterior(x)?;
        let best: Vec<usize> = log_post.rows().map(argmax).collect();
        self.classes.decode(&best)
    }

    /// Posterior normalized with the log-sum-exp trick.
    fn predict_proba(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        self.predict_log_posterior(x)?.softmax_rows()
    }

    fn classes(&self) -> &[Label] {
        self.classes.labels()
    }

    fn name(&self) -> String {
        match self.variant {
            NaiveBayesVariant::Univariate => "Naive Bayes (univariate)".to_string(),
            NaiveBayesVariant::Multivariate => "Naive Bayes (multivariate)".to_string(),
        }
    }
}
