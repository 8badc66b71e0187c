//! Statistical utility functions.

/// Calculate the mean of a slice.
///
/// Returns `0.0` for an empty slice so callers never see NaN.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (denominator n).
///
/// Returns `0.0` for fewer than one value.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    (ss / values.len() as f64).sqrt()
}

/// Pearson correlation coefficient of two equally long slices.
///
/// Returns `None` when the slices differ in length, are shorter than two
/// values, or either has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut raw_xx = 0.0;
    let mut raw_yy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
        raw_xx += a * a;
        raw_yy += b * b;
    }

    let n = x.len();
    if negligible_spread(sxx, raw_xx, n) || negligible_spread(syy, raw_yy, n) {
        return None;
    }
    let r = sxy / (sxx * syy).sqrt();
    Some(r.clamp(-1.0, 1.0))
}

/// Whether a centered sum of squares is rounding noise relative to the raw
/// sum of squares of the same `n` values.
///
/// The check scales with the data, so series measured in tiny units keep
/// their spread.
pub(crate) fn negligible_spread(centered: f64, raw: f64, n: usize) -> bool {
    let tol = 8.0 * n as f64 * f64::EPSILON;
    centered <= tol * tol * raw
}

/// Drop values further than `sigmas` standard deviations from the mean.
///
/// The input is returned unchanged when it has zero spread or when the filter
/// would remove every value.
pub fn filter_outliers(values: &[f64], sigmas: f64) -> Vec<f64> {
    let m = mean(values);
    let sd = population_std(values);
    if sd <= 0.0 {
        return values.to_vec();
    }
    let kept: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| (v - m).abs() <= sigmas * sd)
        .collect();
    if kept.is_empty() {
        values.to_vec()
    } else {
        kept
    }
}
