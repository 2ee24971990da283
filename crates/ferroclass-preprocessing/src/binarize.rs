use ferroclass_core::{Float, Label, MlError, MlResult};

/// Median of a non-empty slice; the mean of the two middle values for
/// even lengths.
pub fn median<T: Float>(values: &[T]) -> MlResult<T> {
    if values.is_empty() {
        return Err(MlError::EmptyDataset("median of an empty slice".into()));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(T::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) * T::HALF)
    } else {
        Ok(sorted[mid])
    }
}

/// Turn a continuous target into binary labels: 1 where `y > threshold`,
/// 0 otherwise. The threshold defaults to the median of `y`.
pub fn binarize<T: Float>(y: &[T], threshold: Option<T>) -> MlResult<Vec<Label>> {
    let threshold = match threshold {
        Some(t) => t,
        None => median(y)?,
    };
    Ok(y.iter().map(|&v| Label::from(v > threshold)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
        assert!(median::<f64>(&[]).is_err());
    }

    #[test]
    fn test_binarize_at_median() {
        let y = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(binarize(&y, None).unwrap(), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_binarize_threshold_is_strict() {
        let y = [1.0, 2.0, 2.0, 3.0];
        assert_eq!(binarize(&y, Some(2.0)).unwrap(), vec![0, 0, 0, 1]);
    }
}
