//! Seasonal-index forecasting that works for any history length.

use crate::utils::{mean, trend_slope};

/// Trend damping used by the naive method.
pub const NAIVE_DAMPING: f64 = 0.9;

/// Multiplicative seasonal index for every position `0..period`.
///
/// Each index is the mean of the observations on that position divided by the
/// overall mean. Positions without observations, or a zero overall mean,
/// give `1.0`.
pub fn seasonal_indices(history: &[f64], period: usize) -> Vec<f64> {
    let overall = mean(history);
    if history.is_empty() || overall == 0.0 {
        return vec![1.0; period];
    }

    (0..period)
        .map(|pos| {
            let on_position: Vec<f64> = history.iter().skip(pos).step_by(period).copied().collect();
            if on_position.is_empty() {
                1.0
            } else {
                mean(&on_position) / overall
            }
        })
        .collect()
}

/// Raw naive seasonal projections.
///
/// `base * index[(n + i) mod period] + trend * (i + 1) * 0.9^i`, where the
/// base is the mean of the last cycle (or of everything when shorter) and the
/// trend is the OLS slope over the whole history (0 below three points).
pub fn project(history: &[f64], horizon: usize, period: usize) -> Vec<f64> {
    let n = history.len();
    let indices = seasonal_indices(history, period);
    let trend = if n >= 3 { trend_slope(history) } else { 0.0 };
    let base = if n >= period {
        mean(&history[n - period..])
    } else {
        mean(history)
    };

    (0..horizon)
        .map(|i| {
            let seasonal = indices[(n + i) % period];
            base * seasonal + trend * (i + 1) as f64 * NAIVE_DAMPING.powi(i as i32)
        })
        .collect()
}
