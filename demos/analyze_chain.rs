//! Example: Analysing a NIFTY option chain
//!
//! Builds a synthetic chain around spot, runs the full analysis and prints
//! levels, aggregates and the ranked opportunities.
//!
//! Run with: cargo run --example analyze_chain

use chain_analytics::prelude::*;
use chrono::{Duration, Utc};

fn main() -> AnalyticsResult<()> {
    let now = Utc::now();
    let spot = 22_450.0;
    let expiry = Expiry::from_datetime(now + Duration::days(9));
    let pricer = BlackScholes::default();
    let time = 9.0 / 365.0;

    // Smile: higher vol away from the money, puts richer than calls
    let rows = (0..21)
        .map(|i| {
            let strike = 21_950.0 + 50.0 * i as f64;
            let distance = (strike - spot) / spot;
            let vol = 0.13 + 0.9 * distance * distance - 0.05 * distance;
            let oi_bump = |centre: f64| (200_000.0 * (-((strike - centre) / 150.0).powi(2)).exp()) as u64;

            let call = pricer
                .price(spot, strike, vol, time, OptionType::Call)
                .map(|p| Quote::new((p * 1.04 * 20.0).round() / 20.0, 20_000 + oi_bump(22_700.0), 50_000));
            let put = pricer
                .price(spot, strike, vol * 1.05, time, OptionType::Put)
                .map(|p| Quote::new((p * 20.0).round() / 20.0, 25_000 + oi_bump(22_200.0), 60_000));
            StrikeRow::new(strike, call, put)
        })
        .collect();
    let snapshot = ChainSnapshot::new(Underlying::new("NSE:NIFTY50-INDEX", spot), expiry, rows)?;

    // Two months of closes with ~12% annualised vol
    let closes = CloseSeries::from_oldest_first(
        (0..45)
            .map(|i| 21_800.0 * (1.0 + 0.0075 * ((i as f64) * 1.7).sin()) * (1.0 + 0.0006 * i as f64))
            .collect(),
    );

    let analyzer = ChainAnalyzer::new(AnalyticsConfig::default())?;
    let analysis = analyzer.analyze(&snapshot, &closes, Some(13.8), now);

    println!("=== {} ===\n", analysis.underlying.symbol);
    println!("Spot:            {:.2}", analysis.spot());
    println!("ATM strike:      {:?}", analysis.atm_strike);
    println!("ATM IV:          {:.2}%", analysis.reference_volatility.value() * 100.0);
    println!("Historical vol:  {:.2}%", analysis.historical_volatility.value() * 100.0);
    println!("Skew signal:     {}", analysis.volatility_skew.signal);
    println!("PCR:             {:?}", analysis.put_call_ratio);
    println!("Max pain:        {:?}", analysis.max_pain_strike);
    println!("Sentiment:       {:?}", analysis.sentiment.overall());
    println!("Support:         {:?}", analysis.support_resistance.support);
    println!("Resistance:      {:?}", analysis.support_resistance.resistance);

    println!("\n=== Opportunities ===\n");
    for opp in analysis.opportunities.all() {
        println!(
            "{:>9.2} {:<4} {:<4} market {:>8.2} theo {:>8.2} ({:+.1}%)",
            opp.strike,
            opp.option_type,
            opp.action,
            opp.market_price,
            opp.theoretical_price,
            opp.percent_difference
        );
    }

    println!("\n=== ATM Scenarios (call) ===\n");
    if let Some(atm) = analysis.atm_strike {
        let scenarios = ScenarioAnalyzer::default().analyze(
            OptionType::Call,
            spot,
            atm,
            analysis.days_to_expiry,
            analysis.reference_volatility.value(),
            None,
        );
        for s in scenarios.unwrap_or_default() {
            println!("{:<28} {:>9.2}  P&L {:>+8.2}", s.name, s.price, s.pnl);
        }
    }

    Ok(())
}
