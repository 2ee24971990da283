use ferroclass_core::validation::{check_features, check_xy};
use ferroclass_core::{
    argmax, dot, Classifier, ClassIndex, Float, Label, MlError, MlResult, Tensor,
};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Standard deviation of the initial weight draws.
const INIT_SCALE: f64 = 0.01;

/// Serializable perceptron hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptronConfig {
    pub learning_rate: f64,
    pub n_epochs: usize,
    pub seed: u64,
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        PerceptronConfig {
            learning_rate: 0.01,
            n_epochs: 100,
            seed: 42,
        }
    }
}

impl PerceptronConfig {
    fn validate(&self) -> MlResult<()> {
        if !(self.learning_rate > 0.0) {
            return Err(MlError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// One linear decision boundary `w·x + b`.
#[derive(Debug, Clone)]
pub struct BinaryModel<T: Float> {
    pub weights: Vec<T>,
    pub bias: T,
    /// Misclassified samples in each completed epoch.
    pub errors_per_epoch: Vec<usize>,
}

impl<T: Float> BinaryModel<T> {
    #[inline]
    pub fn score(&self, x: &[T]) -> T {
        dot(&self.weights, x) + self.bias
    }

    /// Step activation: positive when the score is `>= 0`.
    #[inline]
    pub fn fires(&self, x: &[T]) -> bool {
        self.score(x) >= T::ZERO
    }
}

/// Rosenblatt learning rule on pre-binarized targets.
///
/// Samples are visited in their original order every epoch and training
/// stops after the first epoch without mistakes.
pub fn train_binary<T: Float>(
    x: &Tensor<T>,
    targets: &[bool],
    config: &PerceptronConfig,
) -> MlResult<BinaryModel<T>> {
    config.validate()?;
    let (n, d) = x.dims2()?;
    if targets.len() != n {
        return Err(MlError::ShapeMismatch {
            expected: vec![n],
            got: vec![targets.len()],
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut model = BinaryModel {
        weights: Tensor::<T>::random_normal(vec![d], INIT_SCALE, &mut rng).into_data(),
        bias: T::ZERO,
        errors_per_epoch: Vec::new(),
    };
    let lr = T::from_f64(config.learning_rate);

    for epoch in 0..config.n_epochs {
        let mut errors = 0;
        for (row, &target) in x.rows().zip(targets) {
            let predicted = model.fires(row);
            if predicted == target {
                continue;
            }
            errors += 1;
            // (y − ŷ) is +1 or −1 here.
            let step = if target { lr } else { -lr };
            for (w, &xi) in model.weights.iter_mut().zip(row) {
                *w += step * xi;
            }
            model.bias += step;
        }
        model.errors_per_epoch.push(errors);
        trace!("perceptron epoch {}: {} mistakes", epoch + 1, errors);
        if errors == 0 {
            debug!("perceptron converged after {} epochs", epoch + 1);
            break;
        }
    }

    Ok(model)
}

/// Binary perceptron. Requires exactly two distinct labels; the smaller
/// one is the negative class.
#[derive(Debug, Clone)]
pub struct Perceptron<T: Float> {
    pub config: PerceptronConfig,
    model: Option<BinaryModel<T>>,
    classes: ClassIndex,
}

impl<T: Float> Perceptron<T> {
    pub fn new(learning_rate: f64, n_epochs: usize) -> MlResult<Self> {
        Self::from_config(&PerceptronConfig {
            learning_rate,
            n_epochs,
            ..PerceptronConfig::default()
        })
    }

    pub fn from_config(config: &PerceptronConfig) -> MlResult<Self> {
        config.validate()?;
        Ok(Perceptron {
            config: config.clone(),
            model: None,
            classes: ClassIndex::default(),
        })
    }

    fn model(&self) -> MlResult<&BinaryModel<T>> {
        self.model.as_ref().ok_or(MlError::NotFitted("Perceptron"))
    }

    pub fn errors_per_epoch(&self) -> &[usize] {
        self.model.as_ref().map_or(&[][..], |m| m.errors_per_epoch.as_slice())
    }

    /// Raw score `w·x + b` per row.
    pub fn decision_function(&self, x: &Tensor<T>) -> MlResult<Vec<T>> {
        let model = self.model()?;
        check_features(x, model.weights.len())?;
        Ok(x.rows().map(|r| model.score(r)).collect())
    }
}

impl<T: Float> Classifier<T> for Perceptron<T> {
    fn fit(&mut self, x: &Tensor<T>, y: &[Label]) -> MlResult<()> {
        check_xy(x, y)?;
        let classes = ClassIndex::from_labels(y);
        if classes.len() != 2 {
            return Err(MlError::UnsupportedCardinality {
                expected: 2,
                got: classes.len(),
            });
        }
        let positive = classes.labels()[1];
        let targets: Vec<bool> = y.iter().map(|&l| l == positive).collect();
        self.model = Some(train_binary(x, &targets, &self.config)?);
        self.classes = classes;
        Ok(())
    }

    fn predict(&self, x: &Tensor<T>) -> MlResult<Vec<Label>> {
        self.decision_function(x)?
            .into_iter()
            .map(|s| self.classes.label_at(usize::from(s >= T::ZERO)))
            .collect()
    }

    /// One-hot of the hard decision.
    fn predict_proba(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        let scores = self.decision_function(x)?;
        let n = scores.len();
        let mut data = vec![T::ZERO; n * 2];
        for (i, s) in scores.into_iter().enumerate() {
            data[i * 2 + usize::from(s >= T::ZERO)] = T::ONE;
        }
        Tensor::new(data, vec![n, 2])
    }

    fn classes(&self) -> &[Label] {
        self.classes.labels()
    }

    fn name(&self) -> String {
        "Perceptron".to_string()
    }
}

/// One-vs-rest perceptron: one binary boundary per class, prediction by
/// the largest raw score.
#[derive(Debug, Clone)]
pub struct MultiClassPerceptron<T: Float> {
    pub config: PerceptronConfig,
    models: Vec<BinaryModel<T>>,
    classes: ClassIndex,
}

impl<T: Float> MultiClassPerceptron<T> {
    pub fn new(learning_rate: f64, n_epochs: usize) -> MlResult<Self> {
        Self::from_config(&PerceptronConfig {
            learning_rate,
            n_epochs,
            ..PerceptronConfig::default()
        })
    }

    pub fn from_config(config: &PerceptronConfig) -> MlResult<Self> {
        config.validate()?;
        Ok(MultiClassPerceptron {
            config: config.clone(),
            models: Vec::new(),
            classes: ClassIndex::default(),
        })
    }

    /// Per-class models in ascending label order.
    pub fn models(&self) -> &[BinaryModel<T>] {
        &self.models
    }

    /// Raw scores, `[n_samples, n_classes]`.
    pub fn decision_function(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        let d = self
            .models
            .first()
            .map(|m| m.weights.len())
            .ok_or(MlError::NotFitted("MultiClassPerceptron"))?;
        let n = check_features(x, d)?;
        let mut data = Vec::with_capacity(n * self.models.len());
        for row in x.rows() {
            data.extend(self.models.iter().map(|m| m.score(row)));
        }
        Tensor::new(data, vec![n, self.models.len()])
    }

    fn decide(&self, x: &Tensor<T>) -> MlResult<Vec<usize>> {
        let scores = self.decision_function(x)?;
        Ok(scores.rows().map(argmax).collect())
    }
}

impl<T: Float> Classifier<T> for MultiClassPerceptron<T> {
    fn fit(&mut self, x: &Tensor<T>, y: &[Label]) -> MlResult<()> {
        check_xy(x, y)?;
        let classes = ClassIndex::from_labels(y);
        if classes.len() < 2 {
            return Err(MlError::UnsupportedCardinality {
                expected: 2,
                got: classes.len(),
            });
        }
        let mut models = Vec::with_capacity(classes.len());
        for &class in classes.labels() {
            let targets: Vec<bool> = y.iter().map(|&l| l == class).collect();
            let model = train_binary(x, &targets, &self.config)?;
            debug!(
                "one-vs-rest model for class {} trained for {} epochs",
                class,
                model.errors_per_epoch.len()
            );
            models.push(model);
        }
        self.models = models;
        self.classes = classes;
        Ok(())
    }

    fn predict(&self, x: &Tensor<T>) -> MlResult<Vec<Label>> {
        self.classes.decode(&self.decide(x)?)
    }

    /// One-hot of the hard decision.
    fn predict_proba(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        let winners = self.decide(x)?;
        let k = self.classes.len();
        let mut data = vec![T::ZERO; winners.len() * k];
        for (i, c) in winners.iter().enumerate() {
            data[i * k + c] = T::ONE;
        }
        Tensor::new(data, vec![winners.len(), k])
    }

    fn classes(&self) -> &[Label] {
        self.classes.labels()
    }

    fn name(&self) -> String {
        "Multi-Class Perceptron".to_string()
    }
}
