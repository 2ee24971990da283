use anyhow::{Context, Result};
use log::info;

use ferroclass::core::Label;
use ferroclass::datasets::make_energy_consumption;
use ferroclass::model_selection::{CrossValidator, EvaluationSummary, ACCURACY, F1_SCORE};
use ferroclass::preprocessing::{binarize, median};

use crate::config::ExperimentConfig;

/// Generate the dataset, evaluate every configured model and return the
/// summaries in configuration order.
pub fn run_comparison(config: &ExperimentConfig) -> Result<Vec<EvaluationSummary>> {
    let (x, target) = make_energy_consumption(config.n_samples, config.n_features, config.seed)
        .context("Failed to generate dataset")?;
    let threshold = median(&target)?;
    let y: Vec<Label> = binarize(&target, Some(threshold))?;
    let positives = y.iter().filter(|&&l| l == 1).count();
    info!(
        "Dataset: {} samples, {} features, {} high / {} low consumption (threshold {:.2})",
        config.n_samples,
        config.n_features,
        positives,
        y.len() - positives,
        threshold
    );

    let cv = CrossValidator::new(config.cross_validation.clone());
    let mut summaries = Vec::with_capacity(config.models.len());
    for spec in &config.models {
        let result = if config.parallel {
            cv.evaluate_parallel(|| spec.build(), &x, &y)
        } else {
            let mut model = spec.build()?;
            cv.evaluate(&mut model, &x, &y)
        };
        let summary = result.with_context(|| format!("Evaluation failed for {:?}", spec))?;
        println!("{}", summary);
        summaries.push(summary);
    }
    Ok(summaries)
}

/// Final table, best mean accuracy first.
pub fn print_ranking(summaries: &[EvaluationSummary]) {
    let mut ranked: Vec<&EvaluationSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| b.mean(ACCURACY).total_cmp(&a.mean(ACCURACY)));
    println!("{:<36} {:>18} {:>18}", "model", "accuracy", "f1_score");
    for s in ranked {
        let acc = s.get(ACCURACY);
        let f1 = s.get(F1_SCORE);
        println!(
            "{:<36} {:>9.4} ± {:<6.4} {:>9.4} ± {:<6.4}",
            s.model,
            acc.map_or(f64::NAN, |m| m.mean),
            acc.map_or(f64::NAN, |m| m.std),
            f1.map_or(f64::NAN, |m| m.mean),
            f1.map_or(f64::NAN, |m| m.std),
        );
    }
}
