use ferroclass_core::validation::check_same_len;
use ferroclass_core::{unique_labels, Label, MlError, MlResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label treated as the positive class under `Average::Binary`.
pub const POSITIVE_LABEL: Label = 1;

/// How per-class precision/recall are combined into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Average {
    /// Scores of the positive label (1) only.
    Binary,
    /// Unweighted mean over classes.
    Macro,
    /// Global counts over all samples.
    Micro,
    /// Mean over classes weighted by true support.
    Weighted,
}

impl FromStr for Average {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(Average::Binary),
            "macro" => Ok(Average::Macro),
            "micro" => Ok(Average::Micro),
            "weighted" => Ok(Average::Weighted),
            _ => Err(MlError::UnsupportedAveraging(s.to_string())),
        }
    }
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Average::Binary => "binary",
            Average::Macro => "macro",
            Average::Micro => "micro",
            Average::Weighted => "weighted",
        };
        f.write_str(name)
    }
}

/// Counts indexed `[true class][predicted class]` over the sorted union
/// of labels seen in either vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub labels: Vec<Label>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn n_classes(&self) -> usize {
        self.labels.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Sum of the diagonal.
    pub fn correct(&self) -> usize {
        (0..self.n_classes()).map(|i| self.counts[i][i]).sum()
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.counts[class][class]
    }

    pub fn false_positives(&self, class: usize) -> usize {
        self.predicted(class) - self.true_positives(class)
    }

    pub fn false_negatives(&self, class: usize) -> usize {
        self.support(class) - self.true_positives(class)
    }

    /// Number of samples whose true label is `class`.
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Number of samples predicted as `class`.
    pub fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    /// Row/column index of `label`, if it occurred.
    pub fn position(&self, label: Label) -> Option<usize> {
        self.labels.binary_search(&label).ok()
    }

    pub fn precision_of(&self, class: usize, zero_division: f64) -> f64 {
        ratio(
            self.true_positives(class),
            self.predicted(class),
            zero_division,
        )
    }

    pub fn recall_of(&self, class: usize, zero_division: f64) -> f64 {
        ratio(self.true_positives(class), self.support(class), zero_division)
    }
}

fn ratio(num: usize, den: usize, zero_division: f64) -> f64 {
    if den == 0 {
        zero_division
    } else {
        num as f64 / den as f64
    }
}

/// Build the confusion matrix for two aligned label vectors.
pub fn confusion_matrix(y_true: &[Label], y_pred: &[Label]) -> MlResult<ConfusionMatrix> {
    check_same_len(y_true, y_pred)?;
    let mut all = y_true.to_vec();
    all.extend_from_slice(y_pred);
    let labels = unique_labels(&all);
    let n = labels.len();
    let mut counts = vec![vec![0usize; n]; n];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        let ti = labels.binary_search(&t).map_err(|_| MlError::UnknownLabel(t))?;
        let pi = labels.binary_search(&p).map_err(|_| MlError::UnknownLabel(p))?;
        counts[ti][pi] += 1;
    }
    Ok(ConfusionMatrix { labels, counts })
}

/// Fraction of correct predictions.
pub fn accuracy(y_true: &[Label], y_pred: &[Label]) -> MlResult<f64> {
    let n = check_same_len(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / n as f64)
}

#[derive(Clone, Copy)]
enum Score {
    Precision,
    Recall,
}

fn averaged(
    cm: &ConfusionMatrix,
    score: Score,
    average: Average,
    zero_division: f64,
) -> MlResult<f64> {
    let per_class = |c: usize| match score {
        Score::Precision => cm.precision_of(c, zero_division),
        Score::Recall => cm.recall_of(c, zero_division),
    };
    let n = cm.n_classes();

    match average {
        Average::Binary => {
            if n > 2 {
                return Err(MlError::UnsupportedCardinality { expected: 2, got: n });
            }
            // Negative is whatever other label occurs.
            Ok(match cm.position(POSITIVE_LABEL) {
                Some(pos) => per_class(pos),
                None => zero_division,
            })
        }
        Average::Macro => Ok((0..n).map(per_class).sum::<f64>() / n as f64),
        // With single-label predictions both global ratios reduce to correct / total.
        Average::Micro => Ok(ratio(cm.correct(), cm.total(), zero_division)),
        Average::Weighted => {
            let weighted: f64 = (0..n).map(|c| per_class(c) * cm.support(c) as f64).sum();
            Ok(weighted / cm.total() as f64)
        }
    }
}

/// Precision `TP / (TP + FP)` under the given averaging.
pub fn precision(
    y_true: &[Label],
    y_pred: &[Label],
    average: Average,
    zero_division: f64,
) -> MlResult<f64> {
    let cm = confusion_matrix(y_true, y_pred)?;
    averaged(&cm, Score::Precision, average, zero_division)
}

/// Recall `TP / (TP + FN)` under the given averaging.
pub fn recall(
    y_true: &[Label],
    y_pred: &[Label],
    average: Average,
    zero_division: f64,
) -> MlResult<f64> {
    let cm = confusion_matrix(y_true, y_pred)?;
    averaged(&cm, Score::Recall, average, zero_division)
}

/// Harmonic mean of the averaged precision and recall.
///
/// This is not the mean of per-class F1 values; for `Macro` and
/// `Weighted` the two generally differ.
pub fn f1(y_true: &[Label], y_pred: &[Label], average: Average, zero_division: f64) -> MlResult<f64> {
    let cm = confusion_matrix(y_true, y_pred)?;
    let p = averaged(&cm, Score::Precision, average, zero_division)?;
    let r = averaged(&cm, Score::Recall, average, zero_division)?;
    Ok(harmonic(p, r, zero_division))
}

pub(crate) fn harmonic(p: f64, r: f64, zero_division: f64) -> f64 {
    if p + r == 0.0 {
        zero_division
    } else {
        2.0 * p * r / (p + r)
    }
}
