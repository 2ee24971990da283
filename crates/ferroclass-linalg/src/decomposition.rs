use ferroclass_core::{Float, MlError, MlResult, Tensor};

/// LU decomposition result: P * A = L * U
pub struct LuDecomposition<T: Float> {
    pub l: Tensor<T>,
    pub u: Tensor<T>,
    /// `pivot[i]` is the row of A that ended up in row i.
    pub pivot: Vec<usize>,
    /// +1 for an even number of row swaps, -1 for odd.
    pub parity: T,
}

fn square_dim<T: Float>(a: &Tensor<T>, op: &str) -> MlResult<usize> {
    let (n, m) = a.dims2()?;
    if n != m {
        return Err(MlError::DimensionMismatch(format!(
            "{} requires a square matrix, got {}x{}",
            op, n, m
        )));
    }
    Ok(n)
}

/// LU decomposition with partial pivoting.
pub fn lu<T: Float>(a: &Tensor<T>) -> MlResult<LuDecomposition<T>> {
    let n = square_dim(a, "LU")?;

    let mut u = a.data().to_vec();
    let mut l = vec![T::ZERO; n * n];
    let mut pivot: Vec<usize> = (0..n).collect();
    let mut parity = T::ONE;

    for k in 0..n {
        // Find pivot
        let mut max_val = u[k * n + k].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let v = u[i * n + k].abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }

        if max_val < T::EPSILON {
            return Err(MlError::SingularMatrix);
        }

        if max_row != k {
            pivot.swap(k, max_row);
            parity = -parity;
            for j in 0..n {
                u.swap(k * n + j, max_row * n + j);
            }
            // Swap L rows for already computed columns
            for j in 0..k {
                l.swap(k * n + j, max_row * n + j);
            }
        }

        l[k * n + k] = T::ONE;

        for i in (k + 1)..n {
            let factor = u[i * n + k] / u[k * n + k];
            l[i * n + k] = factor;
            for j in k..n {
                let delta = factor * u[k * n + j];
                u[i * n + j] -= delta;
            }
        }
    }

    Ok(LuDecomposition {
        l: Tensor::new(l, vec![n, n])?,
        u: Tensor::new(u, vec![n, n])?,
        pivot,
        parity,
    })
}

impl<T: Float> LuDecomposition<T> {
    fn n(&self) -> usize {
        self.pivot.len()
    }

    fn diag(&self) -> impl Iterator<Item = T> + '_ {
        let n = self.n();
        (0..n).map(move |i| self.u.data()[i * n + i])
    }

    /// Solve `A x = b` for one right-hand side.
    pub fn solve_vec(&self, b: &[T]) -> MlResult<Vec<T>> {
        let n = self.n();
        if b.len() != n {
            return Err(MlError::ShapeMismatch {
                expected: vec![n],
                got: vec![b.len()],
            });
        }
        let l = self.l.data();
        let u = self.u.data();

        // Forward substitution: L * y = P * b
        let mut y = vec![T::ZERO; n];
        for i in 0..n {
            let mut sum = T::ZERO;
            for j in 0..i {
                sum += l[i * n + j] * y[j];
            }
            y[i] = b[self.pivot[i]] - sum;
        }

        // Back substitution: U * x = y
        let mut x = vec![T::ZERO; n];
        for i in (0..n).rev() {
            let mut sum = T::ZERO;
            for j in (i + 1)..n {
                sum += u[i * n + j] * x[j];
            }
            x[i] = (y[i] - sum) / u[i * n + i];
        }
        Ok(x)
    }
}

/// Sign and natural log of |det(A)|. A singular matrix yields
/// `(0, -inf)` instead of an error.
pub fn slogdet<T: Float>(a: &Tensor<T>) -> MlResult<(T, T)> {
    let decomp = match lu(a) {
        Ok(d) => d,
        Err(MlError::SingularMatrix) => return Ok((T::ZERO, T::NEG_INFINITY)),
        Err(e) => return Err(e),
    };
    let mut sign = decomp.parity;
    let mut logdet = T::ZERO;
    for d in decomp.diag() {
        if d < T::ZERO {
            sign = -sign;
        }
        logdet += d.abs().ln();
    }
    Ok((sign, logdet))
}

/// Determinant of a square matrix using LU decomposition.
pub fn det<T: Float>(a: &Tensor<T>) -> MlResult<T> {
    match lu(a) {
        Ok(decomp) => Ok(decomp.diag().fold(decomp.parity, |acc, d| acc * d)),
        Err(MlError::SingularMatrix) => Ok(T::ZERO),
        Err(e) => Err(e),
    }
}

/// Matrix inverse using LU decomposition.
pub fn inv<T: Float>(a: &Tensor<T>) -> MlResult<Tensor<T>> {
    let decomp = lu(a)?;
    let n = decomp.n();
    let mut out = vec![T::ZERO; n * n];
    let mut e = vec![T::ZERO; n];

    for col in 0..n {
        e.iter_mut().for_each(|v| *v = T::ZERO);
        e[col] = T::ONE;
        let x = decomp.solve_vec(&e)?;
        for (i, v) in x.into_iter().enumerate() {
            out[i * n + col] = v;
        }
    }

    Tensor::new(out, vec![n, n])
}
