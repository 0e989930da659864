//! Example: Pricing a NIFTY option with Black-Scholes and the hybrid blender
//!
//! Run with: cargo run --example basic_pricing

use chain_analytics::prelude::*;

fn main() {
    // Option parameters
    let spot = 18000.0;
    let strike = 18000.0;
    let days = 30.0;
    let time = days / 365.0;
    let rate = 0.065; // 6.5% risk-free rate
    let vol = 0.20; // 20% volatility

    println!("=== Black-Scholes Pricing ===\n");
    println!("Spot:     {:.2}", spot);
    println!("Strike:   {:.2}", strike);
    println!("Time:     {:.4} years ({:.0} days)", time, days);
    println!("Rate:     {:.1}%", rate * 100.0);
    println!("Vol:      {:.1}%\n", vol * 100.0);

    let (Some(call_price), Some(put_price)) = (
        bs_price(spot, strike, rate, vol, time, OptionType::Call),
        bs_price(spot, strike, rate, vol, time, OptionType::Put),
    ) else {
        println!("Inputs could not be priced");
        return;
    };
    println!("Call Price: {:.4}", call_price);
    println!("Put Price:  {:.4}", put_price);

    // C - P = S - K*e^(-rT)
    let parity_lhs = call_price - put_price;
    let parity_rhs = spot - strike * (-rate * time).exp();
    println!("\nPut-Call Parity Check:");
    println!("  C - P = {:.4}", parity_lhs);
    println!("  S - K*e^(-rT) = {:.4}", parity_rhs);
    println!("  Difference: {:.6}", (parity_lhs - parity_rhs).abs());

    println!("\n=== Greeks (Call) ===\n");
    if let Some(greeks) = bs_greeks(spot, strike, rate, vol, time, OptionType::Call) {
        println!("Delta:  {:.4}", greeks.delta);
        println!("Gamma:  {:.6}", greeks.gamma);
        println!("Theta:  {:.4} per day", greeks.theta);
        println!("Vega:   {:.4} per vol point", greeks.vega);
        println!("Rho:    {:.4} per rate point", greeks.rho);
    }

    println!("\n=== Implied Volatility ===\n");
    let market_price = call_price + 25.0;
    match implied_volatility(market_price, spot, strike, rate, time, OptionType::Call) {
        Some(iv) => println!(
            "Market price {:.2} implies vol: {:.2}% ({} iterations)",
            market_price,
            iv.value * 100.0,
            iv.iterations
        ),
        None => println!("Could not solve for IV"),
    }

    println!("\n=== Hybrid Price ===\n");
    let pricer = HybridPricer::default();
    let input = PricingInput {
        option_type: OptionType::Call,
        spot,
        strike,
        time,
        days_to_expiry: days,
        market_price: Some(market_price),
    };
    let market = MarketConditions::new(14.5, Some(1.1));
    if let Some(result) = pricer.price(&input, Estimate::Market(vol), &market) {
        println!(
            "Weights:      BS {:.0}% / Heston {:.0}%",
            result.weights.black_scholes * 100.0,
            result.weights.heston * 100.0
        );
        println!("BS price:     {:.2}", result.black_scholes_price);
        println!("Heston price: {:.2}", result.heston_price);
        println!("Correction:   {:+.2}% ({})", result.correction * 100.0, pricer.correction_name());
        println!("Theoretical:  {:.2}", result.theoretical_price);
        if let Some(pct) = result.price_difference_pct {
            println!("Market vs theoretical: {:+.2}%", pct);
        }
    }
}
