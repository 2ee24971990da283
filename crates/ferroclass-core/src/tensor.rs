use crate::dtype::Float;
use crate::error::{MlError, MlResult};
use crate::shape::Shape;

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense row-major tensor. Classifiers treat a rank-2 tensor as a
/// `[n_samples, n_features]` feature matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Tensor<T: Float> {
    data: Vec<T>,
    shape: Shape,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Float> Tensor<T> {
    /// Create a tensor from flat data and a shape.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> MlResult<Self> {
        let s = Shape::new(shape);
        if data.len() != s.numel() {
            return Err(MlError::ShapeMismatch {
                expected: s.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Tensor { data, shape: s })
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        Self::full(shape, T::ZERO)
    }

    pub fn full(shape: Vec<usize>, value: T) -> Self {
        let s = Shape::new(shape);
        Tensor {
            data: vec![value; s.numel()],
            shape: s,
        }
    }

    /// 1-D tensor copied from a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Tensor {
            data: data.to_vec(),
            shape: Shape::new(vec![data.len()]),
        }
    }

    /// Matrix from a list of equally long rows.
    pub fn from_vec2d(rows: &[Vec<T>]) -> MlResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(MlError::ShapeMismatch {
                expected: vec![cols],
                got: vec![bad.len()],
            });
        }
        let flat: Vec<T> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Tensor::new(flat, vec![rows.len(), cols])
    }

    /// Uniform samples in `[low, high)` drawn from the caller's generator.
    pub fn random_uniform<R: Rng + ?Sized>(
        shape: Vec<usize>,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Self {
        let s = Shape::new(shape);
        let data = (0..s.numel())
            .map(|_| T::from_f64(low + (high - low) * rng.gen::<f64>()))
            .collect();
        Tensor { data, shape: s }
    }

    /// Normal samples `N(0, std²)` via Box-Muller, drawn from the caller's generator.
    pub fn random_normal<R: Rng + ?Sized>(shape: Vec<usize>, std: f64, rng: &mut R) -> Self {
        let s = Shape::new(shape);
        let n = s.numel();
        let mut data = Vec::with_capacity(n + 1);
        while data.len() < n {
            let u1: f64 = rng.gen::<f64>().max(1e-12);
            let u2: f64 = rng.gen::<f64>();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f64::consts::PI * u2;
            data.push(T::from_f64(std * r * theta.cos()));
            data.push(T::from_f64(std * r * theta.sin()));
        }
        data.truncate(n);
        Tensor { data, shape: s }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_vec(&self) -> Vec<usize> {
        self.shape.to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// `(rows, cols)` of a rank-2 tensor.
    pub fn dims2(&self) -> MlResult<(usize, usize)> {
        match self.shape.dims() {
            [r, c] => Ok((*r, *c)),
            dims => Err(MlError::DimensionMismatch(format!(
                "expected a 2-D matrix, got shape {:?}",
                dims
            ))),
        }
    }

    fn offset(&self, indices: &[usize]) -> MlResult<usize> {
        if indices.len() != self.ndim() {
            return Err(MlError::DimensionMismatch(format!(
                "expected {} indices, got {}",
                self.ndim(),
                indices.len()
            )));
        }
        let strides = self.shape.strides();
        let mut offset = 0;
        for (axis, (&idx, &size)) in indices.iter().zip(self.shape.dims()).enumerate() {
            if idx >= size {
                return Err(MlError::IndexOutOfBounds {
                    index: idx,
                    axis,
                    size,
                });
            }
            offset += idx * strides[axis];
        }
        Ok(offset)
    }

    pub fn get(&self, indices: &[usize]) -> MlResult<T> {
        self.offset(indices).map(|o| self.data[o])
    }

    pub fn set(&mut self, indices: &[usize], value: T) -> MlResult<()> {
        let o = self.offset(indices)?;
        self.data[o] = value;
        Ok(())
    }

    /// Borrow row `i` of a matrix.
    pub fn row(&self, i: usize) -> MlResult<&[T]> {
        let (rows, cols) = self.dims2()?;
        if i >= rows {
            return Err(MlError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: rows,
            });
        }
        Ok(&self.data[i * cols..(i + 1) * cols])
    }

    /// Iterate over the rows of a matrix.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        let cols = self.shape.dims().last().copied().unwrap_or(1).max(1);
        self.data.chunks_exact(cols)
    }

    /// Gather the given rows, in order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> MlResult<Tensor<T>> {
        let (_, cols) = self.dims2()?;
        let mut data = Vec::with_capacity(indices.len() * cols);
        for &i in indices {
            data.extend_from_slice(self.row(i)?);
        }
        Tensor::new(data, vec![indices.len(), cols])
    }

    // ─── Linear algebra ─────────────────────────────────────────────────────

    /// Matrix transpose.
    pub fn t(&self) -> MlResult<Tensor<T>> {
        let (rows, cols) = self.dims2()?;
        let mut data = vec![T::ZERO; self.numel()];
        for i in 0..rows {
            for j in 0..cols {
                data[j * rows + i] = self.data[i * cols + j];
            }
        }
        Ok(Tensor {
            data,
            shape: self.shape.transposed()?,
        })
    }

    /// Matrix product `[m, k] x [k, n] -> [m, n]`.
    pub fn matmul(&self, other: &Tensor<T>) -> MlResult<Tensor<T>> {
        let (m, k) = self.dims2()?;
        let (k2, n) = other.dims2()?;
        if k != k2 {
            return Err(MlError::ShapeMismatch {
                expected: vec![k, n],
                got: vec![k2, n],
            });
        }
        let mut out = vec![T::ZERO; m * n];
        for i in 0..m {
            let out_row = &mut out[i * n..(i + 1) * n];
            for p in 0..k {
                let a = self.data[i * k + p];
                if a == T::ZERO {
                    continue;
                }
                let b_row = &other.data[p * n..(p + 1) * n];
                for (o, &b) in out_row.iter_mut().zip(b_row) {
                    *o += a * b;
                }
            }
        }
        Tensor::new(out, vec![m, n])
    }

    /// Add `row` to every row of the matrix.
    pub fn add_row_vector(&self, row: &[T]) -> MlResult<Tensor<T>> {
        let (_, cols) = self.dims2()?;
        if row.len() != cols {
            return Err(MlError::ShapeMismatch {
                expected: vec![cols],
                got: vec![row.len()],
            });
        }
        let data = self
            .rows()
            .flat_map(|r| r.iter().zip(row).map(|(&a, &b)| a + b))
            .collect();
        Ok(Tensor {
            data,
            shape: self.shape.clone(),
        })
    }

    fn zip_with<F: Fn(T, T) -> T>(&self, other: &Tensor<T>, op: F) -> MlResult<Tensor<T>> {
        if self.shape != other.shape {
            return Err(MlError::ShapeMismatch {
                expected: self.shape_vec(),
                got: other.shape_vec(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| op(a, b))
            .collect();
        Ok(Tensor {
            data,
            shape: self.shape.clone(),
        })
    }

    pub fn sub(&self, other: &Tensor<T>) -> MlResult<Tensor<T>> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    pub fn mul(&self, other: &Tensor<T>) -> MlResult<Tensor<T>> {
        self.zip_with(other, |a, b| a * b)
    }

    pub fn apply<F: Fn(T) -> T>(&self, f: F) -> Tensor<T> {
        Tensor {
            data: self.data.iter().map(|&x| f(x)).collect(),
            shape: self.shape.clone(),
        }
    }

    pub fn mul_scalar(&self, s: T) -> Tensor<T> {
        self.apply(|x| x * s)
    }

    // ─── Column reductions ──────────────────────────────────────────────────

    /// Per-column sums of a matrix.
    pub fn sum_axis0(&self) -> MlResult<Vec<T>> {
        let (_, cols) = self.dims2()?;
        let mut sums = vec![T::ZERO; cols];
        for row in self.rows() {
            for (s, &v) in sums.iter_mut().zip(row) {
                *s += v;
            }
        }
        Ok(sums)
    }

    /// Per-column means of a matrix.
    pub fn mean_axis0(&self) -> MlResult<Vec<T>> {
        let (rows, _) = self.dims2()?;
        if rows == 0 {
            return Err(MlError::EmptyDataset("mean of a matrix with no rows".into()));
        }
        let n = T::from_usize(rows);
        Ok(self.sum_axis0()?.into_iter().map(|s| s / n).collect())
    }

    /// Per-column population standard deviations (divisor `n`).
    pub fn std_axis0(&self) -> MlResult<Vec<T>> {
        let mean = self.mean_axis0()?;
        let (rows, _) = self.dims2()?;
        let mut acc = vec![T::ZERO; mean.len()];
        for row in self.rows() {
            for ((a, &v), &m) in acc.iter_mut().zip(row).zip(&mean) {
                let d = v - m;
                *a += d * d;
            }
        }
        let n = T::from_usize(rows);
        Ok(acc.into_iter().map(|a| (a / n).sqrt()).collect())
    }

    // ─── Row-wise operations ────────────────────────────────────────────────

    /// Index of the largest value in each row; the first maximum wins.
    pub fn argmax_rows(&self) -> MlResult<Vec<usize>> {
        self.dims2()?;
        Ok(self.rows().map(argmax).collect())
    }

    /// Row-wise softmax, shifted by the row maximum before exponentiating.
    pub fn softmax_rows(&self) -> MlResult<Tensor<T>> {
        self.dims2()?;
        let mut data = Vec::with_capacity(self.numel());
        for row in self.rows() {
            let max = row.iter().copied().fold(T::NEG_INFINITY, T::max);
            let exps: Vec<T> = row.iter().map(|&v| (v - max).exp()).collect();
            let total: T = exps.iter().copied().sum();
            data.extend(exps.into_iter().map(|e| e / total));
        }
        Ok(Tensor {
            data,
            shape: self.shape.clone(),
        })
    }
}

/// Inner product of two equally long slices.
#[inline]
pub fn dot<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}

/// Index of the largest value; the first maximum wins. Returns 0 for an empty slice.
pub fn argmax<T: Float>(values: &[T]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

impl<T: Float> PartialEq for Tensor<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.data == other.data
    }
}

impl<T: Float> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dims2() {
            Ok((_, cols)) if cols > 0 => {
                writeln!(f, "Tensor{} [", self.shape)?;
                for row in self.rows() {
                    let cells: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
                    writeln!(f, "  [{}],", cells.join(", "))?;
                }
                write!(f, "]")
            }
            _ => {
                let cells: Vec<String> = self.data.iter().map(|v| format!("{:.4}", v)).collect();
                write!(f, "Tensor{} [{}]", self.shape, cells.join(", "))
            }
        }
    }
}
