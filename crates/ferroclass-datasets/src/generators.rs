use ferroclass_core::{Label, MlError, MlResult, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One standard normal draw (Box-Muller).
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-10);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Gaussian blobs around the given centers. Samples are split evenly
/// across centers with the remainder going to the first ones; class `c`
/// is the index of its center.
pub fn make_blobs(
    n_samples: usize,
    centers: &[Vec<f64>],
    cluster_std: f64,
    seed: u64,
) -> MlResult<(Tensor<f64>, Vec<Label>)> {
    let n_features = match centers.first() {
        Some(c) if !c.is_empty() => c.len(),
        _ => return Err(MlError::EmptyDataset("make_blobs needs at least one center".into())),
    };
    if let Some(bad) = centers.iter().find(|c| c.len() != n_features) {
        return Err(MlError::ShapeMismatch {
            expected: vec![n_features],
            got: vec![bad.len()],
        });
    }
    if n_samples == 0 {
        return Err(MlError::EmptyDataset("make_blobs with n_samples = 0".into()));
    }
    if !(cluster_std >= 0.0) {
        return Err(MlError::InvalidParameter(format!(
            "cluster_std must be non-negative, got {}",
            cluster_std
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let base = n_samples / centers.len();
    let extra = n_samples % centers.len();
    let mut features = Vec::with_capacity(n_samples * n_features);
    let mut labels = Vec::with_capacity(n_samples);

    for (c, center) in centers.iter().enumerate() {
        let count = base + usize::from(c < extra);
        for _ in 0..count {
            for &mu in center {
                features.push(mu + cluster_std * standard_normal(&mut rng));
            }
            labels.push(c as Label);
        }
    }

    Ok((Tensor::new(features, vec![n_samples, n_features])?, labels))
}

/// The four-point XOR truth table.
pub fn make_xor() -> MlResult<(Tensor<f64>, Vec<Label>)> {
    let x = Tensor::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0], vec![4, 2])?;
    Ok((x, vec![0, 1, 1, 0]))
}

/// Appliance-energy-like regression data.
///
/// Columns 0..3 are temperature in [15, 30], humidity in [20, 80] and
/// lighting in [0, 100]; any further columns are standard normal noise.
/// The target is `0.3 t + 0.2 h + 0.5 l + N(0, 5)` rescaled to [50, 150].
pub fn make_energy_consumption(
    n_samples: usize,
    n_features: usize,
    seed: u64,
) -> MlResult<(Tensor<f64>, Vec<f64>)> {
    if n_samples == 0 {
        return Err(MlError::EmptyDataset("make_energy_consumption with n_samples = 0".into()));
    }
    if n_features < 3 {
        return Err(MlError::InvalidParameter(format!(
            "make_energy_consumption needs at least 3 features, got {}",
            n_features
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples * n_features);
    let mut raw = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let temperature = rng.gen_range(15.0..30.0);
        let humidity = rng.gen_range(20.0..80.0);
        let lights = rng.gen_range(0.0..100.0);
        features.extend_from_slice(&[temperature, humidity, lights]);
        for _ in 3..n_features {
            features.push(standard_normal(&mut rng));
        }
        let noise = 5.0 * standard_normal(&mut rng);
        raw.push(0.3 * temperature + 0.2 * humidity + 0.5 * lights + noise);
    }

    let lo = raw.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    let y = raw
        .iter()
        .map(|&v| if span > 0.0 { 50.0 + 100.0 * (v - lo) / span } else { 100.0 })
        .collect();

    Ok((Tensor::new(features, vec![n_samples, n_features])?, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_blobs() {
        let centers = vec![vec![-5.0, -5.0], vec![5.0, 5.0], vec![5.0, -5.0]];
        let (x, y) = make_blobs(100, &centers, 0.5, 7).unwrap();
        assert_eq!(x.shape_vec(), vec![100, 2]);
        assert_eq!(y.iter().filter(|&&l| l == 0).count(), 34);
        assert_eq!(y.iter().filter(|&&l| l == 2).count(), 33);
        let first = x.row(0).unwrap();
        assert!((first[0] + 5.0).abs() < 3.0);
    }

    #[test]
    fn test_make_blobs_is_seeded() {
        let centers = vec![vec![0.0], vec![1.0]];
        let (a, _) = make_blobs(10, &centers, 1.0, 1).unwrap();
        let (b, _) = make_blobs(10, &centers, 1.0, 1).unwrap();
        let (c, _) = make_blobs(10, &centers, 1.0, 2).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_make_blobs_rejects_ragged_centers() {
        assert!(make_blobs(10, &[vec![0.0], vec![1.0, 2.0]], 1.0, 0).is_err());
        assert!(make_blobs(10, &[], 1.0, 0).is_err());
    }

    #[test]
    fn test_make_xor() {
        let (x, y) = make_xor().unwrap();
        assert_eq!(x.shape_vec(), vec![4, 2]);
        assert_eq!(x.row(2).unwrap(), &[1.0, 0.0]);
        assert_eq!(y, vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_energy_ranges() {
        let (x, y) = make_energy_consumption(200, 5, 42).unwrap();
        assert_eq!(x.shape_vec(), vec![200, 5]);
        assert_eq!(y.len(), 200);
        assert!(y.iter().all(|&v| (50.0..=150.0).contains(&v)));
        for row in x.rows() {
            assert!((15.0..30.0).contains(&row[0]));
            assert!((20.0..80.0).contains(&row[1]));
            assert!((0.0..100.0).contains(&row[2]));
        }
        assert!(make_energy_consumption(10, 2, 42).is_err());
    }
}
