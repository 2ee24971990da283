use crate::error::{MlError, MlResult};
use serde::{Deserialize, Serialize};

/// Integer class id.
pub type Label = i64;

/// Sorted distinct labels in ascending order.
pub fn unique_labels(y: &[Label]) -> Vec<Label> {
    let mut labels = y.to_vec();
    labels.sort_unstable();
    labels.dedup();
    labels
}

/// Ascending set of class labels seen during fit, mapping each label to
/// its column in probability matrices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassIndex {
    labels: Vec<Label>,
}

impl ClassIndex {
    pub fn from_labels(y: &[Label]) -> Self {
        ClassIndex {
            labels: unique_labels(y),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Column of `label`, or `UnknownLabel`.
    pub fn index_of(&self, label: Label) -> MlResult<usize> {
        self.labels
            .binary_search(&label)
            .map_err(|_| MlError::UnknownLabel(label))
    }

    /// Label stored at column `idx`.
    pub fn label_at(&self, idx: usize) -> MlResult<Label> {
        self.labels
            .get(idx)
            .copied()
            .ok_or(MlError::IndexOutOfBounds {
                index: idx,
                axis: 0,
                size: self.labels.len(),
            })
    }

    /// Map every label to its column index.
    pub fn encode(&self, y: &[Label]) -> MlResult<Vec<usize>> {
        y.iter().map(|&l| self.index_of(l)).collect()
    }

    /// Map column indices back to labels.
    pub fn decode(&self, indices: &[usize]) -> MlResult<Vec<Label>> {
        indices.iter().map(|&i| self.label_at(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_labels_sorted() {
        assert_eq!(unique_labels(&[3, 1, 3, -2, 1]), vec![-2, 1, 3]);
    }

    #[test]
    fn test_class_index_round_trip() {
        let idx = ClassIndex::from_labels(&[7, 2, 7, 5]);
        assert_eq!(idx.labels(), &[2, 5, 7]);
        let enc = idx.encode(&[7, 2, 5]).unwrap();
        assert_eq!(enc, vec![2, 0, 1]);
        assert_eq!(idx.decode(&enc).unwrap(), vec![7, 2, 5]);
        assert_eq!(idx.index_of(4), Err(MlError::UnknownLabel(4)));
        assert!(idx.label_at(3).is_err());
    }
}
