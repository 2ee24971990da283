use ferroclass_core::{ClassIndex, Float, Label, MlError, MlResult, Tensor};

/// Encode labels as contiguous ids `0..n_classes` in ascending label order.
#[derive(Debug, Clone, Default)]
pub struct LabelEncoder {
    classes: ClassIndex,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, labels: &[Label]) {
        self.classes = ClassIndex::from_labels(labels);
    }

    /// Fails with `UnknownLabel` for labels not seen during fit.
    pub fn transform(&self, labels: &[Label]) -> MlResult<Vec<Label>> {
        if self.classes.is_empty() {
            return Err(MlError::NotFitted("LabelEncoder"));
        }
        Ok(self
            .classes
            .encode(labels)?
            .into_iter()
            .map(|i| i as Label)
            .collect())
    }

    pub fn fit_transform(&mut self, labels: &[Label]) -> MlResult<Vec<Label>> {
        self.fit(labels);
        self.transform(labels)
    }

    /// Map encoded ids back to the original labels.
    pub fn inverse_transform(&self, encoded: &[Label]) -> MlResult<Vec<Label>> {
        encoded
            .iter()
            .map(|&id| {
                usize::try_from(id)
                    .ok()
                    .and_then(|i| self.classes.label_at(i).ok())
                    .ok_or(MlError::UnknownLabel(id))
            })
            .collect()
    }

    pub fn classes(&self) -> &[Label] {
        self.classes.labels()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

/// One-hot encode class indices into a `[n, n_classes]` matrix.
pub fn one_hot_encode<T: Float>(indices: &[usize], n_classes: usize) -> MlResult<Tensor<T>> {
    let n = indices.len();
    let mut data = vec![T::ZERO; n * n_classes];
    for (i, &cls) in indices.iter().enumerate() {
        if cls >= n_classes {
            return Err(MlError::IndexOutOfBounds {
                index: cls,
                axis: 1,
                size: n_classes,
            });
        }
        data[i * n_classes + cls] = T::ONE;
    }
    Tensor::new(data, vec![n, n_classes])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_encoder_round_trip() {
        let mut enc = LabelEncoder::new();
        let labels = vec![10, -3, 10, 7];
        let encoded = enc.fit_transform(&labels).unwrap();
        assert_eq!(enc.classes(), &[-3, 7, 10]);
        assert_eq!(enc.n_classes(), 3);
        assert_eq!(encoded, vec![2, 0, 2, 1]);
        assert_eq!(enc.inverse_transform(&encoded).unwrap(), labels);
    }

    #[test]
    fn test_label_encoder_errors() {
        let mut enc = LabelEncoder::new();
        assert_eq!(enc.transform(&[1]), Err(MlError::NotFitted("LabelEncoder")));
        enc.fit(&[10, -3, 7]);
        assert_eq!(enc.transform(&[4]), Err(MlError::UnknownLabel(4)));
        assert_eq!(enc.inverse_transform(&[3]), Err(MlError::UnknownLabel(3)));
        assert_eq!(enc.inverse_transform(&[-1]), Err(MlError::UnknownLabel(-1)));
    }

    #[test]
    fn test_one_hot() {
        let oh: Tensor<f64> = one_hot_encode(&[0, 1, 2, 1], 3).unwrap();
        assert_eq!(oh.shape_vec(), vec![4, 3]);
        assert_eq!(oh.get(&[0, 0]).unwrap(), 1.0);
        assert_eq!(oh.get(&[1, 1]).unwrap(), 1.0);
        assert_eq!(oh.get(&[2, 2]).unwrap(), 1.0);
        assert_eq!(oh.get(&[3, 1]).unwrap(), 1.0);
        assert_eq!(oh.sum_axis0().unwrap(), vec![1.0, 2.0, 1.0]);
        assert!(one_hot_encode::<f64>(&[3], 3).is_err());
    }
}
