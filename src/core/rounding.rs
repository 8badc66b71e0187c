//! Finalization of raw projections: clamping, rounding and zero forecasts.

use super::Forecast;

/// Round a value to `precision` decimals (half away from zero).
pub fn round_to(value: f64, precision: u32) -> f64 {
    if precision == 0 {
        return value.round();
    }
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Clamp a raw projection to a finite, non-negative value.
///
/// NaN and infinities map to zero.
pub fn clamp_non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Clamp every value to `>= 0` and round to `precision` decimals.
pub fn finalize(raw: &[f64], precision: u32) -> Vec<f64> {
    raw.iter()
        .map(|&v| {
            let r = round_to(clamp_non_negative(v), precision);
            // -0.0 would serialize oddly; normalize it.
            if r == 0.0 {
                0.0
            } else {
                r
            }
        })
        .collect()
}

/// Build a finalized forecast from raw projections.
pub fn finalized_forecast(raw: &[f64], precision: u32, method: &str) -> Forecast {
    Forecast::new(finalize(raw, precision), precision, method)
}

/// A flat all-zero forecast of length `horizon`.
pub fn zero_forecast(horizon: usize, precision: u32, method: &str) -> Forecast {
    Forecast::new(vec![0.0; horizon], precision, method)
}

/// A flat forecast repeating the arithmetic mean of `history`.
pub fn mean_forecast(history: &[f64], horizon: usize, precision: u32, method: &str) -> Forecast {
    let mean = if history.is_empty() {
        0.0
    } else {
        history.iter().sum::<f64>() / history.len() as f64
    };
    finalized_forecast(&vec![mean; horizon], precision, method)
}
