use ferroclass_core::{Float, MlResult, Tensor};
use rand::Rng;

/// Fully connected (dense) layer: `y = xW + b`.
#[derive(Debug, Clone)]
pub struct Linear<T: Float> {
    /// `[in_features, out_features]`
    pub weight: Tensor<T>,
    pub bias: Vec<T>,
    pub in_features: usize,
    pub out_features: usize,
}

impl<T: Float> Linear<T> {
    /// Create a new linear layer with Xavier-uniform initialization and
    /// zero bias.
    pub fn new<R: Rng + ?Sized>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        let scale = (6.0 / (in_features + out_features) as f64).sqrt();
        Linear {
            weight: Tensor::random_uniform(vec![in_features, out_features], -scale, scale, rng),
            bias: vec![T::ZERO; out_features],
            in_features,
            out_features,
        }
    }

    pub fn forward(&self, input: &Tensor<T>) -> MlResult<Tensor<T>> {
        input.matmul(&self.weight)?.add_row_vector(&self.bias)
    }

    /// Gradient-descent step.
    pub fn update(&mut self, grad_w: &Tensor<T>, grad_b: &[T], lr: T) -> MlResult<()> {
        self.weight = self.weight.sub(&grad_w.mul_scalar(lr))?;
        for (b, &g) in self.bias.iter_mut().zip(grad_b) {
            *b -= lr * g;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_xavier_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let layer: Linear<f64> = Linear::new(4, 2, &mut rng);
        let limit = (6.0f64 / 6.0).sqrt();
        assert_eq!(layer.weight.shape_vec(), vec![4, 2]);
        assert!(layer.weight.data().iter().all(|w| w.abs() <= limit));
        assert!(layer.bias.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_forward() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut layer: Linear<f64> = Linear::new(2, 1, &mut rng);
        layer.weight = Tensor::new(vec![1.0, 2.0], vec![2, 1]).unwrap();
        layer.bias = vec![0.5];
        let x = Tensor::from_vec2d(&[vec![1.0, 1.0], vec![2.0, 0.0]]).unwrap();
        let y = layer.forward(&x).unwrap();
        assert_eq!(y.data(), &[3.5, 2.5]);
    }
}
