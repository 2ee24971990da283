use ferroclass_core::{unique_labels, Label, MlError, MlResult};
use log::warn;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// One train/validation partition of the sample indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub index: usize,
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

fn check_folds(n_samples: usize, n_folds: usize) -> MlResult<()> {
    if n_folds < 2 {
        return Err(MlError::InvalidParameter(format!(
            "n_folds must be at least 2, got {}",
            n_folds
        )));
    }
    if n_folds > n_samples {
        return Err(MlError::InvalidParameter(format!(
            "n_folds ({}) cannot exceed n_samples ({})",
            n_folds, n_samples
        )));
    }
    Ok(())
}

/// Cut `indices` into `n_chunks` contiguous pieces; the first
/// `len % n_chunks` pieces get one extra element.
fn chunks(indices: &[usize], n_chunks: usize) -> Vec<&[usize]> {
    let base = indices.len() / n_chunks;
    let remainder = indices.len() % n_chunks;
    let mut out = Vec::with_capacity(n_chunks);
    let mut current = 0;
    for i in 0..n_chunks {
        let size = if i < remainder { base + 1 } else { base };
        out.push(&indices[current..current + size]);
        current += size;
    }
    out
}

/// Plain K-fold over `0..n_samples`, optionally shuffled with `seed`.
pub fn k_fold_split(
    n_samples: usize,
    n_folds: usize,
    shuffle: bool,
    seed: u64,
) -> MlResult<Vec<Fold>> {
    check_folds(n_samples, n_folds)?;
    let mut indices: Vec<usize> = (0..n_samples).collect();
    if shuffle {
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    }

    let pieces = chunks(&indices, n_folds);
    Ok((0..n_folds)
        .map(|index| Fold {
            index,
            validation: pieces[index].to_vec(),
            train: pieces
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .flat_map(|(_, p)| p.iter().copied())
                .collect(),
        })
        .collect())
}

/// Stratified K-fold: every class is shuffled and cut into `n_folds`
/// chunks independently, so each validation fold keeps the class ratios.
///
/// Classes are visited in ascending label order and a single generator
/// seeded with `seed` shuffles them in turn.
pub fn stratified_k_fold_split(y: &[Label], n_folds: usize, seed: u64) -> MlResult<Vec<Fold>> {
    check_folds(y.len(), n_folds)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut per_class: Vec<Vec<usize>> = Vec::new();
    for class in unique_labels(y) {
        let mut idx: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        if idx.len() < n_folds {
            warn!(
                "class {} has {} samples, fewer than {} folds",
                class,
                idx.len(),
                n_folds
            );
        }
        idx.shuffle(&mut rng);
        per_class.push(idx);
    }
    let class_chunks: Vec<Vec<&[usize]>> =
        per_class.iter().map(|idx| chunks(idx, n_folds)).collect();

    let mut folds = Vec::with_capacity(n_folds);
    for index in 0..n_folds {
        let mut validation = Vec::new();
        let mut train = Vec::new();
        for pieces in &class_chunks {
            validation.extend_from_slice(pieces[index]);
            for (other, piece) in pieces.iter().enumerate() {
                if other != index {
                    train.extend_from_slice(piece);
                }
            }
        }
        if validation.is_empty() {
            return Err(MlError::InvalidParameter(format!(
                "fold {} has no validation samples; use fewer than {} folds",
                index, n_folds
            )));
        }
        folds.push(Fold {
            index,
            train,
            validation,
        });
    }
    Ok(folds)
}

/// One fold per sample, validating on that sample alone.
pub fn leave_one_out_split(n_samples: usize) -> MlResult<Vec<Fold>> {
    if n_samples < 2 {
        return Err(MlError::InvalidParameter(format!(
            "leave-one-out needs at least 2 samples, got {}",
            n_samples
        )));
    }
    Ok((0..n_samples)
        .map(|i| Fold {
            index: i,
            train: (0..n_samples).filter(|&j| j != i).collect(),
            validation: vec![i],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partition(folds: &[Fold], n: usize) {
        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.validation.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..n).collect::<Vec<_>>());
        for f in folds {
            assert_eq!(f.train.len() + f.validation.len(), n);
            assert!(f.train.iter().all(|i| !f.validation.contains(i)));
        }
    }

    #[test]
    fn test_k_fold_sizes_and_partition() {
        let folds = k_fold_split(10, 3, false, 0).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.validation.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        assert_eq!(folds[0].validation, vec![0, 1, 2, 3]);
        assert_partition(&folds, 10);

        let shuffled = k_fold_split(10, 3, true, 42).unwrap();
        assert_partition(&shuffled, 10);
        assert_eq!(shuffled, k_fold_split(10, 3, true, 42).unwrap());
    }

    #[test]
    fn test_stratified_balanced() {
        let y: Vec<Label> = (0..100).map(|i| if i < 50 { 0 } else { 1 }).collect();
        let folds = stratified_k_fold_split(&y, 5, 42).unwrap();
        assert_eq!(folds.len(), 5);
        for f in &folds {
            let zeros = f.validation.iter().filter(|&&i| y[i] == 0).count();
            let ones = f.validation.iter().filter(|&&i| y[i] == 1).count();
            assert_eq!((zeros, ones), (10, 10));
        }
        assert_partition(&folds, 100);
    }

    #[test]
    fn test_stratified_remainder_goes_first() {
        // 7 of class 0 and 3 of class 1 over 3 folds.
        let y: Vec<Label> = vec![0, 0, 0, 0, 0, 0, 0, 1, 1, 1];
        let folds = stratified_k_fold_split(&y, 3, 1).unwrap();
        let zeros: Vec<usize> = folds
            .iter()
            .map(|f| f.validation.iter().filter(|&&i| y[i] == 0).count())
            .collect();
        assert_eq!(zeros, vec![3, 2, 2]);
        assert_partition(&folds, 10);
    }

    #[test]
    fn test_stratified_is_seeded() {
        let y: Vec<Label> = (0..30).map(|i| i % 3).collect();
        let a = stratified_k_fold_split(&y, 5, 9).unwrap();
        let b = stratified_k_fold_split(&y, 5, 9).unwrap();
        let c = stratified_k_fold_split(&y, 5, 10).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_invalid_fold_counts() {
        assert!(k_fold_split(10, 1, false, 0).is_err());
        assert!(k_fold_split(3, 4, false, 0).is_err());
        assert!(stratified_k_fold_split(&[0, 1, 0], 5, 0).is_err());
        // Enough samples overall, but every class is smaller than the fold count.
        assert!(stratified_k_fold_split(&[0, 0, 1, 1], 4, 0).is_err());
    }

    #[test]
    fn test_leave_one_out() {
        let folds = leave_one_out_split(4).unwrap();
        assert_eq!(folds.len(), 4);
        assert_eq!(folds[2].validation, vec![2]);
        assert_eq!(folds[2].train, vec![0, 1, 3]);
        assert!(leave_one_out_split(1).is_err());
    }
}
