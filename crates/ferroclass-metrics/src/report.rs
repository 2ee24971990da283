use crate::classification::{accuracy, confusion_matrix, f1, harmonic, Average};
use ferroclass_core::{Label, MlResult};
use std::fmt;

/// Per-class scores in a [`ClassificationReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision/recall/F1 plus global accuracy and macro F1.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassScores>,
    pub accuracy: f64,
    pub macro_f1: f64,
}

pub fn classification_report(y_true: &[Label], y_pred: &[Label]) -> MlResult<ClassificationReport> {
    let cm = confusion_matrix(y_true, y_pred)?;
    let classes = cm
        .labels
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            let precision = cm.precision_of(i, 0.0);
            let recall = cm.recall_of(i, 0.0);
            ClassScores {
                label,
                precision,
                recall,
                f1: harmonic(precision, recall, 0.0),
                support: cm.support(i),
            }
        })
        .collect();

    Ok(ClassificationReport {
        classes,
        accuracy: accuracy(y_true, y_pred)?,
        macro_f1: f1(y_true, y_pred, Average::Macro, 0.0)?,
    })
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "Classification Report")?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<12} {:<12} {:<12} {:<12} {:<8}",
            "Class", "Precision", "Recall", "F1-Score", "Support"
        )?;
        writeln!(f, "{}", "-".repeat(60))?;
        for c in &self.classes {
            writeln!(
                f,
                "{:<12} {:<12.4} {:<12.4} {:<12.4} {:<8}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f, "{}", rule)?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        write!(f, "Macro F1-Score: {:.4}", self.macro_f1)
    }
}
