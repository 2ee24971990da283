use ferroclass_core::{Classifier, Float, Label, MlResult, Tensor, Transformer};
use ferroclass_preprocessing::StandardScaler;

/// Boxed transformer step; `Send` so pipelines can cross rayon workers.
pub type BoxedTransformer<T> = Box<dyn Transformer<T> + Send>;

/// Chain of transformers followed by a classifier.
///
/// `fit` fits every transformer on the rows it is given and nothing else,
/// so evaluating a pipeline under cross-validation keeps scaling
/// statistics inside each training fold.
pub struct Pipeline<T: Float> {
    steps: Vec<BoxedTransformer<T>>,
    classifier: Box<dyn Classifier<T> + Send>,
}

impl<T: Float> Pipeline<T> {
    pub fn new<C: Classifier<T> + Send + 'static>(classifier: C) -> Self {
        Pipeline {
            steps: Vec::new(),
            classifier: Box::new(classifier),
        }
    }

    /// `StandardScaler` followed by `classifier`.
    pub fn with_scaler<C: Classifier<T> + Send + 'static>(classifier: C) -> Self {
        Pipeline::new(classifier).add_transformer(StandardScaler::<T>::new())
    }

    /// Append a transformer step, applied after the existing ones.
    pub fn add_transformer<S: Transformer<T> + Send + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn n_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn classifier(&self) -> &dyn Classifier<T> {
        self.classifier.as_ref()
    }

    /// Run `x` through the fitted transformers.
    pub fn transform(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        let mut current = x.clone();
        for step in &self.steps {
            current = step.transform(&current)?;
        }
        Ok(current)
    }
}

impl<T: Float> Classifier<T> for Pipeline<T> {
    fn fit(&mut self, x: &Tensor<T>, y: &[Label]) -> MlResult<()> {
        let mut current = x.clone();
        for step in &mut self.steps {
            current = step.fit_transform(&current)?;
        }
        self.classifier.fit(&current, y)
    }

    fn predict(&self, x: &Tensor<T>) -> MlResult<Vec<Label>> {
        self.classifier.predict(&self.transform(x)?)
    }

    fn predict_proba(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        self.classifier.predict_proba(&self.transform(x)?)
    }

    fn classes(&self) -> &[Label] {
        self.classifier.classes()
    }

    fn name(&self) -> String {
        self.classifier.name()
    }
}
