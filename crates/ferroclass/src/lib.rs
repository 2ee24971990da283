//! # ferroclass
//!
//! Classical supervised classifiers written from scratch in Rust, with the
//! preprocessing, metrics and cross-validation needed to compare them.
//!
//! ## Modules
//!
//! - **core**: `Tensor`, the `Classifier`/`Transformer` traits, `MlError`
//! - **linalg**: LU decomposition, log-determinant, inverse
//! - **preprocessing**: StandardScaler, MinMaxScaler, binarize, LabelEncoder
//! - **metrics**: accuracy, precision, recall, F1, confusion matrix
//! - **neighbors**: KNN with Euclidean/Manhattan/Minkowski distance
//! - **linear**: Perceptron and one-vs-rest multiclass Perceptron
//! - **nn**: MLP trained with mini-batch backpropagation
//! - **naive_bayes**: Gaussian NB, univariate and multivariate
//! - **model_selection**: K-fold splitters and cross-validated evaluation
//! - **datasets**: seeded synthetic generators
//! - **pipeline**: transformers chained in front of a classifier

/// Tensor, traits and errors.
pub use ferroclass_core as core;

/// Linear algebra operations.
pub use ferroclass_linalg as linalg;

/// Data preprocessing.
pub use ferroclass_preprocessing as preprocessing;

/// Evaluation metrics.
pub use ferroclass_metrics as metrics;

/// Nearest neighbors.
pub use ferroclass_neighbors as neighbors;

/// Perceptron models.
pub use ferroclass_linear as linear;

/// Multi-layer perceptron.
pub use ferroclass_nn as nn;

/// Naive Bayes classifiers.
pub use ferroclass_naive_bayes as naive_bayes;

/// Fold splitting and cross-validation.
pub use ferroclass_model_selection as model_selection;

/// Synthetic datasets.
pub use ferroclass_datasets as datasets;

/// Pipeline API.
pub use ferroclass_pipeline as pipeline;

/// The types most programs need.
pub mod prelude {
    pub use ferroclass_core::{Classifier, Float, Label, MlError, MlResult, Tensor, Transformer};
    pub use ferroclass_linear::{MultiClassPerceptron, Perceptron};
    pub use ferroclass_metrics::{accuracy, f1, precision, recall, Average};
    pub use ferroclass_model_selection::{evaluate, CrossValidationConfig, CrossValidator, EvaluationSummary};
    pub use ferroclass_naive_bayes::{GaussianNB, NaiveBayesVariant};
    pub use ferroclass_neighbors::{DistanceMetric, KNNClassifier};
    pub use ferroclass_nn::{Activation, MLPClassifier, MlpConfig};
    pub use ferroclass_pipeline::Pipeline;
    pub use ferroclass_preprocessing::{binarize, StandardScaler};
}
