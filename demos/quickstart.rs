//! Forecast reclamations and the claims they lead to.
//!
//! Run with `cargo run --example quickstart`.

use claims_forecast::prelude::*;

fn main() -> Result<()> {
    let reclamations: Vec<f64> = (0..30)
        .map(|i| {
            let season = (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
            (40.0 + 0.5 * i as f64 + 8.0 * season).round()
        })
        .collect();
    let mut claim_sums = vec![6_000.0, 6_000.0];
    claim_sums.extend(reclamations[..28].iter().map(|r| 150.0 * r));
    let claim_counts: Vec<f64> = claim_sums.iter().map(|s| (s / 1_200.0).round()).collect();

    let config = ForecastConfig::default().with_horizon(6);
    for kind in [
        StrategyKind::Statistical,
        StrategyKind::MachineLearning,
        StrategyKind::Seasonal,
    ] {
        let strategy = config.clone().with_strategy(kind).build_strategy()?;
        let forecast = strategy.forecast(&reclamations, config.horizon, config.precision)?;
        println!("{:<28} {:?}", forecast.method(), forecast.to_counts());
    }

    let mut predictor = config.build_predictor(reclamations, claim_counts, claim_sums)?;
    predictor.fit();
    let summary = predictor.get_coefficients();
    println!(
        "\nlag {} months, conversion {}%, {}",
        summary.lag_months, summary.conversion_rate_percent, summary.formula
    );

    for p in predictor.forecast_claims(config.horizon)? {
        println!(
            "month +{}: {:>10.2} [{:.2}, {:.2}] from {} reclamations",
            p.period_index,
            p.predicted_sum,
            p.confidence_lower,
            p.confidence_upper,
            p.base_reclamations
        );
    }

    let analysis = predictor.get_full_analysis();
    println!("\nfit quality: {}", analysis.fit_quality);
    println!("{}", analysis.correlation.interpretation);
    Ok(())
}
