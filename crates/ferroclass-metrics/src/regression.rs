use ferroclass_core::validation::check_same_len;
use ferroclass_core::{Float, MlResult};

/// Mean Squared Error.
pub fn mean_squared_error<T: Float>(y_true: &[T], y_pred: &[T]) -> MlResult<f64> {
    let n = check_same_len(y_true, y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| {
            let d = (t - p).to_f64();
            d * d
        })
        .sum();
    Ok(sum / n as f64)
}

/// Mean Absolute Error.
pub fn mean_absolute_error<T: Float>(y_true: &[T], y_pred: &[T]) -> MlResult<f64> {
    let n = check_same_len(y_true, y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| (t - p).to_f64().abs())
        .sum();
    Ok(sum / n as f64)
}

/// R² (coefficient of determination); 0 when `y_true` is constant.
pub fn r2_score<T: Float>(y_true: &[T], y_pred: &[T]) -> MlResult<f64> {
    let n = check_same_len(y_true, y_pred)? as f64;
    let mean_true: f64 = y_true.iter().map(|v| v.to_f64()).sum::<f64>() / n;

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| {
            let d = t.to_f64() - p.to_f64();
            d * d
        })
        .sum();
    let ss_tot: f64 = y_true
        .iter()
        .map(|&t| {
            let d = t.to_f64() - mean_true;
            d * d
        })
        .sum();

    if ss_tot == 0.0 {
        return Ok(0.0);
    }
    Ok(1.0 - ss_res / ss_tot)
}
