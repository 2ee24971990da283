use crate::dtype::Float;
use crate::error::MlResult;
use crate::labels::Label;
use crate::tensor::Tensor;

/// Supervised classifier over a `[n_samples, n_features]` matrix.
///
/// `fit` discards any previously learned state. Columns of
/// `predict_proba` follow `classes()`, which is ascending by label.
pub trait Classifier<T: Float> {
    fn fit(&mut self, x: &Tensor<T>, y: &[Label]) -> MlResult<()>;

    fn predict(&self, x: &Tensor<T>) -> MlResult<Vec<Label>>;

    /// `[n_samples, n_classes]`, each row summing to 1.
    fn predict_proba(&self, x: &Tensor<T>) -> MlResult<Tensor<T>>;

    /// Labels seen during the last `fit`; empty before.
    fn classes(&self) -> &[Label];

    fn name(&self) -> String;
}

impl<T: Float, C: Classifier<T> + ?Sized> Classifier<T> for Box<C> {
    fn fit(&mut self, x: &Tensor<T>, y: &[Label]) -> MlResult<()> {
        (**self).fit(x, y)
    }

    fn predict(&self, x: &Tensor<T>) -> MlResult<Vec<Label>> {
        (**self).predict(x)
    }

    fn predict_proba(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        (**self).predict_proba(x)
    }

    fn classes(&self) -> &[Label] {
        (**self).classes()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// Unsupervised feature transform (scalers).
pub trait Transformer<T: Float> {
    fn fit(&mut self, x: &Tensor<T>) -> MlResult<()>;

    fn transform(&self, x: &Tensor<T>) -> MlResult<Tensor<T>>;

    fn fit_transform(&mut self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        self.fit(x)?;
        self.transform(x)
    }

    fn inverse_transform(&self, x: &Tensor<T>) -> MlResult<Tensor<T>>;
}
