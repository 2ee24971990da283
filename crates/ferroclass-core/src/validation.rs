//! Input checks shared by every estimator.

use crate::dtype::Float;
use crate::error::{MlError, MlResult};
use crate::labels::Label;
use crate::tensor::Tensor;

/// Validate a training pair: non-empty 2-D matrix, one label per row.
/// Returns `(n_samples, n_features)`.
pub fn check_xy<T: Float>(x: &Tensor<T>, y: &[Label]) -> MlResult<(usize, usize)> {
    let (n, d) = x.dims2()?;
    if n == 0 {
        return Err(MlError::EmptyDataset("training matrix has no rows".into()));
    }
    if d == 0 {
        return Err(MlError::EmptyDataset("training matrix has no features".into()));
    }
    if y.len() != n {
        return Err(MlError::ShapeMismatch {
            expected: vec![n],
            got: vec![y.len()],
        });
    }
    Ok((n, d))
}

/// Validate a query matrix against the feature count seen during fit.
/// Returns the number of query rows.
pub fn check_features<T: Float>(x: &Tensor<T>, n_features: usize) -> MlResult<usize> {
    let (n, d) = x.dims2()?;
    if d != n_features {
        return Err(MlError::ShapeMismatch {
            expected: vec![n, n_features],
            got: vec![n, d],
        });
    }
    Ok(n)
}

/// Validate two aligned, non-empty sequences.
pub fn check_same_len<A, B>(a: &[A], b: &[B]) -> MlResult<usize> {
    if a.is_empty() {
        return Err(MlError::EmptyDataset("no samples to score".into()));
    }
    if a.len() != b.len() {
        return Err(MlError::ShapeMismatch {
            expected: vec![a.len()],
            got: vec![b.len()],
        });
    }
    Ok(a.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_xy() {
        let x: Tensor<f64> = Tensor::zeros(vec![3, 2]);
        assert_eq!(check_xy(&x, &[0, 1, 0]).unwrap(), (3, 2));
        assert!(check_xy(&x, &[0, 1]).is_err());
        let empty: Tensor<f64> = Tensor::zeros(vec![0, 2]);
        assert!(matches!(check_xy(&empty, &[]), Err(MlError::EmptyDataset(_))));
    }

    #[test]
    fn test_check_features() {
        let x: Tensor<f64> = Tensor::zeros(vec![4, 3]);
        assert_eq!(check_features(&x, 3).unwrap(), 4);
        assert!(matches!(
            check_features(&x, 2),
            Err(MlError::ShapeMismatch { .. })
        ));
    }
}
