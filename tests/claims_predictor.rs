//! Integration tests for claims prediction from reclamation history.

use std::sync::Arc;

use approx::assert_relative_eq;
use claims_forecast::config::ForecastConfig;
use claims_forecast::correlation::NormalApproximation;
use claims_forecast::models::claims::FitQuality;
use claims_forecast::models::seasonal::NaiveOnlyBackend;
use claims_forecast::models::{ClaimsPredictor, ForecastStrategy};

/// Two years of reclamations with claims following two months later.
fn history() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let rec: Vec<f64> = (0..24)
        .map(|i| {
            let i = i as f64;
            (30.0 + 10.0 * (0.9 * i).sin() + 4.0 * (2.3 * i).cos()).round()
        })
        .collect();
    let mut sums = vec![60.0, 60.0];
    sums.extend(rec[..22].iter().map(|r| 2.0 * r));
    let counts: Vec<f64> = sums.iter().map(|s| s / 20.0).collect();
    (rec, counts, sums)
}

#[test]
fn synthetic_lag_slope_and_fit() {
    let (rec, counts, sums) = history();
    let mut predictor = ClaimsPredictor::new(rec, counts, sums);
    let c = *predictor.fit().coefficients().unwrap();
    assert_eq!(c.lag_months, 2);
    assert_relative_eq!(c.regression_slope, 2.0, epsilon = 1e-9);
    assert_relative_eq!(c.r_squared, 1.0, epsilon = 1e-9);
    assert_relative_eq!(c.residual_std, 0.0, epsilon = 1e-7);
    assert_relative_eq!(c.conversion_rate, 0.1, epsilon = 1e-9);
    assert_relative_eq!(c.avg_claim_amount, 20.0, epsilon = 1e-9);
}

#[test]
fn fit_twice_is_identical() {
    let (rec, counts, sums) = history();
    let mut predictor = ClaimsPredictor::new(rec, counts, sums);
    let first = *predictor.fit().coefficients().unwrap();
    let second = *predictor.fit().coefficients().unwrap();
    assert_eq!(first, second);
}

#[test]
fn predictions_follow_the_fitted_line() {
    let (rec, counts, sums) = history();
    let mut predictor = ClaimsPredictor::new(rec, counts, sums);
    let out = predictor.predict(&[25.0, 40.0, 0.0]);
    assert_eq!(out.len(), 3);
    assert_eq!(
        out.iter().map(|p| p.period_index).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_relative_eq!(out[0].predicted_sum, 50.0, epsilon = 1e-6);
    assert_relative_eq!(out[1].predicted_sum, 80.0, epsilon = 1e-6);
    assert_relative_eq!(out[1].expected_claims_count, 4.0, epsilon = 1e-9);
    assert_eq!(out[2].base_reclamations, 0.0);
    for p in &out {
        assert!(p.confidence_lower <= p.predicted_sum);
        assert!(p.predicted_sum <= p.confidence_upper);
    }
}

#[test]
fn strategy_forecast_uses_stored_history() {
    let (rec, counts, sums) = history();
    let predictor = ClaimsPredictor::new(rec, counts, sums);
    let a = predictor.forecast(&[], 6, 2).unwrap();
    let b = predictor.forecast(&[999.0; 40], 6, 2).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.horizon(), 6);
    assert!(a.values().iter().all(|v| *v >= 0.0));
    assert!(!predictor.is_fitted());
}

#[test]
fn strategy_forecast_matches_forecast_claims() {
    let (rec, counts, sums) = history();
    let predictor = ClaimsPredictor::new(rec, counts, sums);
    let sums: Vec<f64> = predictor
        .forecast_claims(4)
        .unwrap()
        .iter()
        .map(|p| p.predicted_sum)
        .collect();
    let fc = predictor.forecast(&[], 4, 2).unwrap();
    assert_eq!(fc.values(), sums.as_slice());
}

#[test]
fn naive_backend_still_forecasts() {
    let (rec, counts, sums) = history();
    let predictor = ClaimsPredictor::new(rec, counts, sums)
        .with_seasonal_backend(Arc::new(NaiveOnlyBackend))
        .with_significance_test(Arc::new(NormalApproximation));
    let fc = predictor.forecast(&[], 12, 0).unwrap();
    assert_eq!(fc.horizon(), 12);
    assert!(fc.is_integral());
}

#[test]
fn length_one_history_does_not_crash() {
    let mut predictor = ClaimsPredictor::new(vec![3.0], vec![1.0], vec![150.0]);
    let out = predictor.predict(&[5.0]);
    assert_eq!(out.len(), 1);
    assert!(out[0].predicted_sum >= 0.0);

    let predictor = ClaimsPredictor::new(vec![3.0], vec![1.0], vec![150.0]);
    let fc = predictor.forecast(&[], 3, 0).unwrap();
    assert_eq!(fc.horizon(), 3);
    assert!(fc.values().iter().all(|v| *v >= 0.0));
}

#[test]
fn mismatched_lengths_use_the_overlap() {
    let (rec, counts, sums) = history();
    let mut predictor = ClaimsPredictor::new(rec, counts[..20].to_vec(), sums[..18].to_vec());
    let analysis = predictor.fit().get_full_analysis();
    assert_eq!(analysis.history_months, 18);
    assert_eq!(analysis.coefficients.lag_months, 2);
}

#[test]
fn full_analysis_reports_quality() {
    let (rec, counts, sums) = history();
    let predictor = ClaimsPredictor::new(rec, counts, sums).with_confidence_level(0.99);
    let analysis = predictor.get_full_analysis();
    assert_eq!(analysis.fit_quality, FitQuality::Excellent);
    assert_eq!(analysis.z_score, 2.576);
    assert_eq!(analysis.correlation.optimal.optimal_lag, 2);
    assert_eq!(analysis.correlation.interpretation, "strong positive relationship");
    assert!(analysis.coefficients.formula.starts_with("claim_sum = 2.0000"));
}

#[test]
fn outlier_amounts_are_filtered() {
    let rec = vec![10.0; 30];
    let counts = vec![2.0; 30];
    let mut sums = vec![200.0; 30];
    sums[7] = 20_000.0;
    let mut predictor = ClaimsPredictor::new(rec, counts, sums).with_fixed_lag(0);
    let c = *predictor.fit().coefficients().unwrap();
    assert_relative_eq!(c.avg_claim_amount, 100.0, epsilon = 1e-9);
    assert_relative_eq!(c.avg_claim_std, 0.0, epsilon = 1e-9);
}

#[test]
fn config_builds_a_fixed_lag_predictor() {
    let (rec, counts, sums) = history();
    let mut predictor = ForecastConfig::default()
        .with_fixed_lag(1)
        .build_predictor(rec, counts, sums)
        .unwrap();
    assert_eq!(predictor.fit().coefficients().unwrap().lag_months, 1);
}
