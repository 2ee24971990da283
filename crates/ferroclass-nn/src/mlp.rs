use crate::activation::Activation;
use crate::layers::Linear;

use ferroclass_core::validation::{check_features, check_xy};
use ferroclass_core::{Classifier, ClassIndex, Float, Label, MlError, MlResult, Tensor};
use ferroclass_preprocessing::one_hot_encode;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Added to probabilities inside the cross-entropy logarithm.
const LOG_EPS: f64 = 1e-8;

/// Serializable MLP hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpConfig {
    pub hidden_sizes: Vec<usize>,
    /// Expected number of classes; replaced by the observed count at fit time.
    pub output_size: usize,
    pub learning_rate: f64,
    pub n_epochs: usize,
    pub activation: String,
    pub batch_size: usize,
    pub seed: u64,
}

impl Default for MlpConfig {
    fn default() -> Self {
        MlpConfig {
            hidden_sizes: vec![64],
            output_size: 2,
            learning_rate: 0.01,
            n_epochs: 100,
            activation: "relu".to_string(),
            batch_size: 32,
            seed: 42,
        }
    }
}

/// Values kept from a forward pass for backpropagation.
struct ForwardCache<T: Float> {
    /// Layer inputs; `activations[0]` is the batch, the last entry the softmax output.
    activations: Vec<Tensor<T>>,
    /// Pre-activations per layer.
    z_values: Vec<Tensor<T>>,
}

/// Feed-forward network trained with mini-batch gradient descent on
/// softmax cross-entropy.
///
/// Layer widths are `[n_features, hidden_sizes..., n_classes]`; all of
/// them are (re)initialized on every `fit` from a generator seeded with
/// `config.seed`, which then also drives the per-epoch shuffles.
#[derive(Debug, Clone)]
pub struct MLPClassifier<T: Float> {
    pub config: MlpConfig,
    pub activation: Activation,
    layers: Vec<Linear<T>>,
    classes: ClassIndex,
    /// Mean batch loss of every epoch of the last fit.
    pub loss_history: Vec<f64>,
}

impl<T: Float> MLPClassifier<T> {
    pub fn from_config(config: &MlpConfig) -> MlResult<Self> {
        let activation: Activation = config.activation.parse()?;
        if config.batch_size == 0 {
            return Err(MlError::InvalidParameter("batch_size must be at least 1".into()));
        }
        if config.hidden_sizes.contains(&0) {
            return Err(MlError::InvalidParameter(format!(
                "hidden layer widths must be positive, got {:?}",
                config.hidden_sizes
            )));
        }
        if !(config.learning_rate > 0.0) {
            return Err(MlError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                config.learning_rate
            )));
        }
        Ok(MLPClassifier {
            config: config.clone(),
            activation,
            layers: Vec::new(),
            classes: ClassIndex::default(),
            loss_history: Vec::new(),
        })
    }

    /// Layer widths of the fitted network, input first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.layers.iter().map(|l| l.in_features).collect();
        if let Some(last) = self.layers.last() {
            sizes.push(last.out_features);
        }
        sizes
    }

    fn init_layers(&mut self, n_features: usize, n_classes: usize, rng: &mut StdRng) {
        let mut sizes = Vec::with_capacity(self.config.hidden_sizes.len() + 2);
        sizes.push(n_features);
        sizes.extend_from_slice(&self.config.hidden_sizes);
        sizes.push(n_classes);
        self.layers = sizes
            .windows(2)
            .map(|w| Linear::new(w[0], w[1], rng))
            .collect();
    }

    fn forward(&self, x: &Tensor<T>) -> MlResult<ForwardCache<T>> {
        let n_layers = self.layers.len();
        let mut activations = Vec::with_capacity(n_layers + 1);
        let mut z_values = Vec::with_capacity(n_layers);
        activations.push(x.clone());

        for (i, layer) in self.layers.iter().enumerate() {
            let z = layer.forward(&activations[i])?;
            let a = if i + 1 < n_layers {
                let act = self.activation;
                z.apply(|v| act.apply(v))
            } else {
                z.softmax_rows()?
            };
            z_values.push(z);
            activations.push(a);
        }

        Ok(ForwardCache {
            activations,
            z_values,
        })
    }

    /// Weight and bias gradients per layer, from output delta `softmax − one_hot`.
    fn backward(
        &self,
        cache: &ForwardCache<T>,
        one_hot: &Tensor<T>,
    ) -> MlResult<Vec<(Tensor<T>, Vec<T>)>> {
        let n_layers = self.layers.len();
        let m = T::from_usize(one_hot.dims2()?.0);
        let mut grads = Vec::with_capacity(n_layers);

        let mut delta = cache.activations[n_layers].sub(one_hot)?;
        for i in (0..n_layers).rev() {
            let grad_w = cache.activations[i].t()?.matmul(&delta)?.mul_scalar(T::ONE / m);
            let grad_b: Vec<T> = delta.sum_axis0()?.into_iter().map(|g| g / m).collect();
            if i > 0 {
                let act = self.activation;
                let deriv = cache.z_values[i - 1].apply(|z| act.derivative(z));
                delta = delta.matmul(&self.layers[i].weight.t()?)?.mul(&deriv)?;
            }
            grads.push((grad_w, grad_b));
        }
        grads.reverse();
        Ok(grads)
    }

    fn check_fitted(&self, x: &Tensor<T>) -> MlResult<()> {
        let first = self.layers.first().ok_or(MlError::NotFitted("MLPClassifier"))?;
        check_features(x, first.in_features)?;
        Ok(())
    }
}

/// `−mean(Σ y·ln(p + ε))` over the rows of a batch.
fn cross_entropy<T: Float>(proba: &Tensor<T>, targets: &[usize]) -> MlResult<f64> {
    let mut total = 0.0;
    for (i, &t) in targets.iter().enumerate() {
        total -= (proba.get(&[i, t])?.to_f64() + LOG_EPS).ln();
    }
    Ok(total / targets.len() as f64)
}

impl<T: Float> Classifier<T> for MLPClassifier<T> {
    fn fit(&mut self, x: &Tensor<T>, y: &[Label]) -> MlResult<()> {
        let (n, d) = check_xy(x, y)?;
        let classes = ClassIndex::from_labels(y);
        let targets = classes.encode(y)?;
        let n_classes = classes.len();

        if n_classes != self.config.output_size {
            warn!(
                "MLP configured for {} outputs but data has {} classes; resizing output layer",
                self.config.output_size, n_classes
            );
            self.config.output_size = n_classes;
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.init_layers(d, n_classes, &mut rng);
        self.classes = classes;
        self.loss_history.clear();
        debug!("MLP layer sizes {:?}", self.layer_sizes());

        let lr = T::from_f64(self.config.learning_rate);
        let mut order: Vec<usize> = (0..n).collect();

        for epoch in 0..self.config.n_epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;
            let mut n_batches = 0usize;

            for batch in order.chunks(self.config.batch_size) {
                let xb = x.select_rows(batch)?;
                let tb: Vec<usize> = batch.iter().map(|&i| targets[i]).collect();
                let yb = one_hot_encode(&tb, n_classes)?;

                let cache = self.forward(&xb)?;
                let grads = self.backward(&cache, &yb)?;
                for (layer, (gw, gb)) in self.layers.iter_mut().zip(&grads) {
                    layer.update(gw, gb, lr)?;
                }

                epoch_loss += cross_entropy(&cache.activations[self.layers.len()], &tb)?;
                n_batches += 1;
            }

            let avg = epoch_loss / n_batches as f64;
            self.loss_history.push(avg);
            debug!("MLP epoch {}: loss {:.6}", epoch + 1, avg);
        }
        Ok(())
    }

    fn predict(&self, x: &Tensor<T>) -> MlResult<Vec<Label>> {
        let proba = self.predict_proba(x)?;
        self.classes.decode(&proba.argmax_rows()?)
    }

    fn predict_proba(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        self.check_fitted(x)?;
        let mut cache = self.forward(x)?;
        cache
            .activations
            .pop()
            .ok_or(MlError::NotFitted("MLPClassifier"))
    }

    fn classes(&self) -> &[Label] {
        self.classes.labels()
    }

    fn name(&self) -> String {
        format!("MLP {:?} ({})", self.config.hidden_sizes, self.activation)
    }
}
