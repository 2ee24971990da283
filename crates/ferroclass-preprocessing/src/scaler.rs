use ferroclass_core::{Float, MlError, MlResult, Tensor, Transformer};
use log::debug;
use serde::{Deserialize, Serialize};

/// Added to every denominator so constant columns scale to zero.
const SCALE_EPS: f64 = 1e-8;

fn fitted_width<T: Float>(
    x: &Tensor<T>,
    stats: Option<&Vec<T>>,
    who: &'static str,
) -> MlResult<usize> {
    let width = stats.map(Vec::len).ok_or(MlError::NotFitted(who))?;
    let (rows, cols) = x.dims2()?;
    if cols != width {
        return Err(MlError::ShapeMismatch {
            expected: vec![rows, width],
            got: vec![rows, cols],
        });
    }
    Ok(width)
}

fn map_columns<T: Float, F: Fn(usize, T) -> T>(x: &Tensor<T>, f: F) -> MlResult<Tensor<T>> {
    let (_, cols) = x.dims2()?;
    let cols = cols.max(1);
    let data = x
        .data()
        .iter()
        .enumerate()
        .map(|(i, &v)| f(i % cols, v))
        .collect();
    Tensor::new(data, x.shape_vec())
}

/// Standardize features by removing the mean and scaling to unit variance.
///
/// Uses the population standard deviation; `transform` computes
/// `(x - mean) / (std + 1e-8)` and `inverse_transform` undoes it exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct StandardScaler<T: Float> {
    pub mean: Option<Vec<T>>,
    pub std: Option<Vec<T>>,
}

impl<T: Float> StandardScaler<T> {
    pub fn new() -> Self {
        StandardScaler {
            mean: None,
            std: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }

    fn stats(&self) -> MlResult<(&[T], &[T])> {
        match (&self.mean, &self.std) {
            (Some(m), Some(s)) => Ok((m, s)),
            _ => Err(MlError::NotFitted("StandardScaler")),
        }
    }
}

impl<T: Float> Transformer<T> for StandardScaler<T> {
    /// Compute mean and std from training data (`[samples, features]`).
    fn fit(&mut self, x: &Tensor<T>) -> MlResult<()> {
        let mean = x.mean_axis0()?;
        let std = x.std_axis0()?;
        debug!("StandardScaler fitted on {} features", mean.len());
        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    fn transform(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        fitted_width(x, self.mean.as_ref(), "StandardScaler")?;
        let (mean, std) = self.stats()?;
        let eps = T::from_f64(SCALE_EPS);
        map_columns(x, |j, v| (v - mean[j]) / (std[j] + eps))
    }

    fn inverse_transform(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        fitted_width(x, self.mean.as_ref(), "StandardScaler")?;
        let (mean, std) = self.stats()?;
        let eps = T::from_f64(SCALE_EPS);
        map_columns(x, |j, v| v * (std[j] + eps) + mean[j])
    }
}

/// Scale each feature into `feature_range` (default `[0, 1]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct MinMaxScaler<T: Float> {
    pub feature_range: (T, T),
    pub min: Option<Vec<T>>,
    pub max: Option<Vec<T>>,
}

impl<T: Float> Default for MinMaxScaler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> MinMaxScaler<T> {
    pub fn new() -> Self {
        MinMaxScaler {
            feature_range: (T::ZERO, T::ONE),
            min: None,
            max: None,
        }
    }

    pub fn with_range(low: T, high: T) -> MlResult<Self> {
        if low >= high {
            return Err(MlError::InvalidParameter(format!(
                "feature_range lower bound {} must be below upper bound {}",
                low, high
            )));
        }
        Ok(MinMaxScaler {
            feature_range: (low, high),
            ..Self::new()
        })
    }

    fn stats(&self) -> MlResult<(&[T], &[T])> {
        match (&self.min, &self.max) {
            (Some(lo), Some(hi)) => Ok((lo, hi)),
            _ => Err(MlError::NotFitted("MinMaxScaler")),
        }
    }
}

impl<T: Float> Transformer<T> for MinMaxScaler<T> {
    fn fit(&mut self, x: &Tensor<T>) -> MlResult<()> {
        let (rows, cols) = x.dims2()?;
        if rows == 0 {
            return Err(MlError::EmptyDataset("MinMaxScaler fit on no rows".into()));
        }

        let mut min_vals = vec![T::INFINITY; cols];
        let mut max_vals = vec![T::NEG_INFINITY; cols];
        for row in x.rows() {
            for (j, &v) in row.iter().enumerate() {
                min_vals[j] = min_vals[j].min(v);
                max_vals[j] = max_vals[j].max(v);
            }
        }

        self.min = Some(min_vals);
        self.max = Some(max_vals);
        Ok(())
    }

    fn transform(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        fitted_width(x, self.min.as_ref(), "MinMaxScaler")?;
        let (lo, hi) = self.stats()?;
        let (a, b) = self.feature_range;
        let eps = T::from_f64(SCALE_EPS);
        map_columns(x, |j, v| (v - lo[j]) / (hi[j] - lo[j] + eps) * (b - a) + a)
    }

    fn inverse_transform(&self, x: &Tensor<T>) -> MlResult<Tensor<T>> {
        fitted_width(x, self.min.as_ref(), "MinMaxScaler")?;
        let (lo, hi) = self.stats()?;
        let (a, b) = self.feature_range;
        let eps = T::from_f64(SCALE_EPS);
        map_columns(x, |j, v| (v - a) / (b - a) * (hi[j] - lo[j] + eps) + lo[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tensor<f64> {
        Tensor::from_vec2d(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_standard_scaler() {
        let mut scaler = StandardScaler::new();
        let transformed = scaler.fit_transform(&sample()).unwrap();

        // Mean should be ~0, std ~1
        let mean = transformed.mean_axis0().unwrap();
        let std = transformed.std_axis0().unwrap();
        for j in 0..2 {
            assert!(mean[j].abs() < 1e-10);
            assert!((std[j] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_standard_scaler_inverse() {
        let x = sample();
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();
        let back = scaler.inverse_transform(&scaled).unwrap();
        for (a, b) in back.data().iter().zip(x.data()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_standard_scaler_constant_column() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[vec![7.0], vec![7.0]]).unwrap();
        let out = StandardScaler::new().fit_transform(&x).unwrap();
        assert!(out.data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_standard_scaler_errors() {
        let scaler: StandardScaler<f64> = StandardScaler::new();
        assert_eq!(
            scaler.transform(&sample()).unwrap_err(),
            MlError::NotFitted("StandardScaler")
        );

        let mut scaler = StandardScaler::new();
        scaler.fit(&sample()).unwrap();
        let wide: Tensor<f64> = Tensor::zeros(vec![2, 3]);
        assert!(matches!(
            scaler.transform(&wide),
            Err(MlError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_minmax_scaler() {
        let x: Tensor<f64> =
            Tensor::from_vec2d(&[vec![1.0, 10.0], vec![5.0, 20.0], vec![3.0, 30.0]]).unwrap();

        let mut scaler = MinMaxScaler::new();
        let transformed = scaler.fit_transform(&x).unwrap();
        for j in 0..2 {
            let col: Vec<f64> = transformed.rows().map(|r| r[j]).collect();
            let min = col.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = col.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!(min.abs() < 1e-6);
            assert!((max - 1.0).abs() < 1e-6);
        }

        let back = scaler.inverse_transform(&transformed).unwrap();
        for (a, b) in back.data().iter().zip(x.data()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_minmax_custom_range() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[vec![0.0], vec![10.0]]).unwrap();
        let mut scaler = MinMaxScaler::with_range(-1.0, 1.0).unwrap();
        let out = scaler.fit_transform(&x).unwrap();
        assert!((out.data()[0] + 1.0).abs() < 1e-6);
        assert!((out.data()[1] - 1.0).abs() < 1e-6);
        assert!(MinMaxScaler::<f64>::with_range(1.0, 1.0).is_err());
    }
}
