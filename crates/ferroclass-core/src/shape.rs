use crate::error::{MlError, MlResult};
use serde::{Deserialize, Serialize};

/// Dimensions of a tensor, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Size along `axis`.
    pub fn dim(&self, axis: usize) -> MlResult<usize> {
        self.dims.get(axis).copied().ok_or_else(|| {
            MlError::DimensionMismatch(format!(
                "axis {} requested from a shape of rank {}",
                axis,
                self.ndim()
            ))
        })
    }

    /// Total number of elements; a rank-0 shape holds one.
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.dims.clone()
    }

    /// Row-major strides.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1usize; self.dims.len()];
        for i in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Shape with the last two axes swapped.
    pub fn transposed(&self) -> MlResult<Shape> {
        if self.ndim() < 2 {
            return Err(MlError::DimensionMismatch(
                "cannot transpose a shape with fewer than 2 dimensions".to_string(),
            ));
        }
        let mut dims = self.dims.clone();
        let n = dims.len();
        dims.swap(n - 2, n - 1);
        Ok(Shape::new(dims))
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_basics() {
        let s = Shape::new(vec![3, 4]);
        assert_eq!(s.ndim(), 2);
        assert_eq!(s.numel(), 12);
        assert_eq!(s.dim(1).unwrap(), 4);
        assert!(s.dim(2).is_err());
    }

    #[test]
    fn test_strides() {
        assert_eq!(Shape::new(vec![3, 4, 5]).strides(), vec![20, 5, 1]);
        assert_eq!(Shape::new(vec![7]).strides(), vec![1]);
    }

    #[test]
    fn test_transpose_and_display() {
        let s = Shape::new(vec![3, 4]).transposed().unwrap();
        assert_eq!(s.dims(), &[4, 3]);
        assert_eq!(s.to_string(), "(4, 3)");
        assert!(Shape::new(vec![3]).transposed().is_err());
    }
}
