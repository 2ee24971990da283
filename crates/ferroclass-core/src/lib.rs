pub mod dtype;
pub mod error;
pub mod estimator;
pub mod labels;
pub mod shape;
pub mod tensor;
pub mod validation;

pub use dtype::Float;
pub use error::{MlError, MlResult};
pub use estimator::{Classifier, Transformer};
pub use labels::{unique_labels, ClassIndex, Label};
pub use shape::Shape;
pub use tensor::{argmax, dot, Tensor};
