use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use ferroclass::core::MlResult;
use ferroclass::linear::{MultiClassPerceptron, Perceptron, PerceptronConfig};
use ferroclass::model_selection::CrossValidationConfig;
use ferroclass::naive_bayes::{GaussianNB, NaiveBayesConfig};
use ferroclass::neighbors::{KNNClassifier, KnnConfig};
use ferroclass::nn::{MLPClassifier, MlpConfig};
use ferroclass::pipeline::Pipeline;

/// One model to evaluate, tagged by `"model"` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelSpec {
    Knn(KnnConfig),
    Perceptron(PerceptronConfig),
    MulticlassPerceptron(PerceptronConfig),
    Mlp(MlpConfig),
    NaiveBayes(NaiveBayesConfig),
}

impl ModelSpec {
    /// Fresh, unfitted model behind a `StandardScaler`.
    pub fn build(&self) -> MlResult<Pipeline<f64>> {
        Ok(match self {
            ModelSpec::Knn(c) => Pipeline::with_scaler(KNNClassifier::<f64>::from_config(c)?),
            ModelSpec::Perceptron(c) => Pipeline::with_scaler(Perceptron::<f64>::from_config(c)?),
            ModelSpec::MulticlassPerceptron(c) => {
                Pipeline::with_scaler(MultiClassPerceptron::<f64>::from_config(c)?)
            }
            ModelSpec::Mlp(c) => Pipeline::with_scaler(MLPClassifier::<f64>::from_config(c)?),
            ModelSpec::NaiveBayes(c) => Pipeline::with_scaler(GaussianNB::<f64>::from_config(c)?),
        })
    }
}

fn default_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec::Knn(KnnConfig {
            k: 5,
            metric: "euclidean".into(),
            ..KnnConfig::default()
        }),
        ModelSpec::Knn(KnnConfig {
            k: 5,
            metric: "manhattan".into(),
            ..KnnConfig::default()
        }),
        ModelSpec::MulticlassPerceptron(PerceptronConfig::default()),
        ModelSpec::Mlp(MlpConfig {
            hidden_sizes: vec![32, 16],
            ..MlpConfig::default()
        }),
        ModelSpec::NaiveBayes(NaiveBayesConfig {
            variant: "univariate".into(),
        }),
        ModelSpec::NaiveBayes(NaiveBayesConfig {
            variant: "multivariate".into(),
        }),
    ]
}

/// Settings of a `compare` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub n_samples: usize,
    pub n_features: usize,
    pub seed: u64,
    /// Run folds on the rayon pool.
    pub parallel: bool,
    pub cross_validation: CrossValidationConfig,
    pub models: Vec<ModelSpec>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            n_samples: 1000,
            n_features: 5,
            seed: 42,
            parallel: false,
            cross_validation: CrossValidationConfig::default(),
            models: default_models(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid experiment configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("In config file {:?}", path))
    }

    /// Config file (or defaults) with command-line overrides applied.
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<std::path::PathBuf>("config") {
            Some(path) => {
                log::info!("Using config: {:?}", path);
                Self::load(path)?
            }
            None => ExperimentConfig::default(),
        };

        if let Some(&n) = matches.get_one::<usize>("samples") {
            config.n_samples = n;
        }
        if let Some(&n) = matches.get_one::<usize>("features") {
            config.n_features = n;
        }
        if let Some(&k) = matches.get_one::<usize>("folds") {
            config.cross_validation.n_folds = k;
        }
        if let Some(&seed) = matches.get_one::<u64>("seed") {
            config.seed = seed;
            config.cross_validation.seed = seed;
        }
        if matches.get_flag("parallel") {
            config.parallel = true;
        }
        if config.models.is_empty() {
            anyhow::bail!("No models configured");
        }
        Ok(config)
    }
}
