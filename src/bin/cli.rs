//! Chain Analytics CLI
//!
//! Command-line interface for analysing saved option-chain payloads and
//! pricing single options.

use std::fs;
use std::path::PathBuf;

use chain_analytics::prelude::*;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Option chain analytics: theoretical values, volatility skew and signals.
#[derive(Parser)]
#[command(name = "chain-analytics")]
#[command(version)]
#[command(about = "Option chain pricing, volatility and signal analytics")]
struct Cli {
    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a saved Fyers option-chain response
    Analyze {
        /// Option-chain JSON
        #[arg(short, long)]
        chain: PathBuf,

        /// Daily history JSON (candles)
        #[arg(short = 'H', long)]
        history: Option<PathBuf>,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Built-in preset, ignored when --config is given
        #[arg(short, long, value_enum, default_value = "default")]
        preset: Preset,

        /// Volatility index override
        #[arg(long)]
        vix: Option<f64>,

        /// Opportunities to list per side
        #[arg(short = 'n', long, default_value = "5")]
        top: usize,
    },

    /// Price a single option
    Price {
        #[arg(long)]
        spot: f64,

        #[arg(long)]
        strike: f64,

        /// Calendar days to expiry
        #[arg(long)]
        days: f64,

        /// Annualised volatility (0.2 = 20%)
        #[arg(long, default_value = "0.2")]
        vol: f64,

        #[arg(long, default_value = "0.065")]
        rate: f64,

        #[arg(short = 't', long = "type", value_enum, default_value = "call")]
        side: Side,

        /// Market price to invert for implied volatility
        #[arg(long)]
        market: Option<f64>,

        /// Also run the scenario set
        #[arg(long)]
        scenarios: bool,
    },

    /// Print a configuration as TOML
    Config {
        #[arg(short, long, value_enum, default_value = "default")]
        preset: Preset,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Default,
    Conservative,
    Aggressive,
}

impl Preset {
    fn config(self) -> AnalyticsConfig {
        match self {
            Preset::Default => AnalyticsConfig::default(),
            Preset::Conservative => AnalyticsConfig::conservative(),
            Preset::Aggressive => AnalyticsConfig::aggressive(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Call,
    Put,
}

impl From<Side> for OptionType {
    fn from(side: Side) -> Self {
        match side {
            Side::Call => OptionType::Call,
            Side::Put => OptionType::Put,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> AnalyticsResult<()> {
    match cli.command {
        Commands::Analyze {
            chain,
            history,
            config,
            preset,
            vix,
            top,
        } => {
            let config = match config {
                Some(path) => AnalyticsConfig::from_toml_file(path)?,
                None => preset.config(),
            };
            let parsed = parse_option_chain(&fs::read_to_string(&chain)?, None)?;
            let closes = match history {
                Some(path) => parse_history(&fs::read_to_string(path)?)?,
                None => CloseSeries::default(),
            };
            info!(chain = %chain.display(), closes = closes.len(), "loaded inputs");

            let analyzer = ChainAnalyzer::new(config)?;
            let analysis = analyzer.analyze(
                &parsed.snapshot,
                &closes,
                vix.or(parsed.volatility_index),
                Utc::now(),
            );

            match cli.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
                OutputFormat::Text => print_analysis(&analysis, top),
            }
        }

        Commands::Price {
            spot,
            strike,
            days,
            vol,
            rate,
            side,
            market,
            scenarios,
        } => {
            let option_type = OptionType::from(side);
            let pricing = PricingConfig {
                risk_free_rate: rate,
                ..PricingConfig::default()
            };
            let pricer = BlackScholes::from_config(&pricing);
            let time = days / pricing.days_per_year;

            let (Some(price), Some(greeks)) = (
                pricer.price(spot, strike, vol, time, option_type),
                pricer.greeks(spot, strike, vol, time, option_type),
            ) else {
                return Err(AnalyticsError::invalid_input(
                    "spot, strike and vol must be positive and finite",
                ));
            };
            let implied = market.and_then(|m| pricer.implied_volatility(m, spot, strike, time, option_type));
            let scenario_set = if scenarios {
                ScenarioAnalyzer::from_config(&pricing).analyze(option_type, spot, strike, days, vol, None)
            } else {
                None
            };

            match cli.output {
                OutputFormat::Json => {
                    let report = serde_json::json!({
                        "option_type": option_type,
                        "price": price,
                        "greeks": greeks,
                        "implied_volatility": implied,
                        "scenarios": scenario_set,
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Text => {
                    println!("{} {} @ spot {:.2}, {:.0}d, vol {:.1}%", option_type, strike, spot, days, vol * 100.0);
                    println!("  Price: {:.2}", price);
                    println!("  Delta: {:.4}", greeks.delta);
                    println!("  Gamma: {:.6}", greeks.gamma);
                    println!("  Theta: {:.4} /day", greeks.theta);
                    println!("  Vega:  {:.4} /vol pt", greeks.vega);
                    println!("  Rho:   {:.4} /rate pt", greeks.rho);
                    if let Some(m) = market {
                        match implied {
                            Some(iv) => println!(
                                "  IV at {:.2}: {:.2}%{}",
                                m,
                                iv.value * 100.0,
                                if iv.converged { "" } else { " (not converged)" }
                            ),
                            None => println!("  IV at {:.2}: not solvable", m),
                        }
                    }
                    if let Some(set) = scenario_set {
                        println!("\nScenarios:");
                        for s in set {
                            println!(
                                "  {:<28} spot {:>10.2}  {:>3.0}d  vol {:>5.1}%  price {:>9.2}  P&L {:>+9.2}",
                                s.name,
                                s.spot,
                                s.days_to_expiry,
                                s.volatility * 100.0,
                                s.price,
                                s.pnl
                            );
                        }
                    }
                }
            }
        }

        Commands::Config { preset } => {
            print!("{}", preset.config().to_toml_string()?);
        }
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", decimals, v))
}

fn print_analysis(analysis: &ChainAnalysis, top: usize) {
    println!(
        "{}  spot {:.2} ({:+.2}%)  expiry {}  {:.1} days",
        analysis.underlying.symbol,
        analysis.spot(),
        analysis.underlying.ltp_change_pct,
        analysis.expiry.label,
        analysis.days_to_expiry
    );
    println!("==========================================================");

    let estimated = |e: &Estimate| if e.is_fallback() { " (estimated)" } else { "" };
    println!(
        "ATM strike:      {}",
        fmt_opt(analysis.atm_strike, 2)
    );
    println!(
        "ATM IV:          {:.2}%{}",
        analysis.reference_volatility.value() * 100.0,
        estimated(&analysis.reference_volatility)
    );
    println!(
        "Historical vol:  {:.2}%{}",
        analysis.historical_volatility.value() * 100.0,
        estimated(&analysis.historical_volatility)
    );
    println!(
        "Skew:            {} ratio {}  {}",
        analysis.volatility_skew.signal,
        fmt_opt(analysis.volatility_skew.skew_ratio, 2),
        analysis.volatility_skew.interpretation
    );
    println!("Volatility index: {:.2}", analysis.market.volatility_index);
    println!("PCR (OI):        {}", fmt_opt(analysis.put_call_ratio, 2));
    println!("PCR (volume):    {}", fmt_opt(analysis.volume_metrics.volume_pcr, 2));
    println!("Max pain:        {}", fmt_opt(analysis.max_pain_strike, 2));
    if let Some(p) = analysis.parity {
        println!(
            "ATM parity:      {:+.2} ({:+.2}%)",
            p.deviation, p.deviation_pct
        );
    }
    println!("Sentiment:       {:?}", analysis.sentiment.overall());

    let levels = |v: &[f64]| v.iter().map(|l| format!("{:.2}", l)).collect::<Vec<_>>().join(", ");
    println!("\nSupport:    {}", levels(&analysis.support_resistance.support));
    println!("Resistance: {}", levels(&analysis.support_resistance.resistance));

    for (title, list) in [
        ("Call opportunities", &analysis.opportunities.calls),
        ("Put opportunities", &analysis.opportunities.puts),
    ] {
        println!("\n{}:", title);
        if list.is_empty() {
            println!("  none");
        }
        for opp in list.iter().take(top) {
            println!(
                "  {:>10.2}  {:<4}  market {:>9.2}  theo {:>9.2}  {:>+7.1}%{}",
                opp.strike,
                opp.action,
                opp.market_price,
                opp.theoretical_price,
                opp.percent_difference,
                if opp.estimated { "  *" } else { "" }
            );
        }
    }
}
