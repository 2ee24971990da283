use thiserror::Error;

/// Error taxonomy shared by every ferroclass crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MlError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("{0} must be fitted before use")]
    NotFitted(&'static str),

    #[error("Label {0} was not seen during fit")]
    UnknownLabel(i64),

    #[error("Singular matrix: cannot invert or decompose")]
    SingularMatrix,

    #[error("Unsupported distance metric '{0}' (expected euclidean, manhattan or minkowski)")]
    UnsupportedDistanceMetric(String),

    #[error("Unsupported averaging mode '{0}' (expected binary, macro, micro or weighted)")]
    UnsupportedAveraging(String),

    #[error("Unsupported activation '{0}' (expected relu, sigmoid or tanh)")]
    UnsupportedActivation(String),

    #[error("Unsupported naive Bayes variant '{0}' (expected univariate or multivariate)")]
    UnsupportedVariant(String),

    #[error("Unsupported class cardinality: expected {expected} distinct labels, got {got}")]
    UnsupportedCardinality { expected: usize, got: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type MlResult<T> = Result<T, MlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = MlError::UnsupportedDistanceMetric("cosine".into());
        assert!(err.to_string().contains("cosine"));

        let err = MlError::UnsupportedCardinality { expected: 2, got: 3 };
        assert_eq!(
            err.to_string(),
            "Unsupported class cardinality: expected 2 distinct labels, got 3"
        );
    }
}
