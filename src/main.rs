use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use signalbot::feed::{load_candles_json, InMemoryDataProvider, MarketScenario, SyntheticDataGenerator};
use signalbot::informative::resample;
use signalbot::models::{IndicatorFrame, Trade};
use signalbot::risk::{LeverageRequest, StoplossRequest, VolatilitySnapshot};
use signalbot::{RsiMacdAtrStrategy, StrategyConfig, Strategy};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "signalbot",
    about = "RSI/MACD/ATR signal engine with dynamic stoploss and leverage"
)]
struct Cli {
    /// Strategy config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute indicators and entry/exit signals for a candle series.
    Signals {
        /// JSON file with an array of candles. Synthetic data is used when omitted.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Synthetic market scenario.
        #[arg(long, value_enum, default_value = "capitulation")]
        scenario: MarketScenario,

        /// Number of synthetic candles.
        #[arg(long, default_value_t = 500)]
        candles: usize,

        /// Seed for synthetic data.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Pair the candles belong to.
        #[arg(long, default_value = "BTC/USDT:USDT")]
        pair: String,

        /// Print every record, not only entries.
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Print the annotated frame as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Stoploss for a given trade profit.
    Stoploss {
        /// Current profit fraction (0.05 = +5%).
        #[arg(long, allow_hyphen_values = true, required_unless_present = "rate")]
        profit: Option<f64>,

        /// Current rate; the profit is taken from the open rate.
        #[arg(long, conflicts_with = "profit")]
        rate: Option<f64>,

        /// Open rate, to also print the trailing stop price.
        #[arg(long)]
        open_rate: Option<f64>,

        /// Highest rate since entry (defaults to the open rate).
        #[arg(long)]
        max_rate: Option<f64>,
    },
    /// Leverage for the given volatility.
    Leverage {
        #[arg(long)]
        latest_atr: Option<f64>,

        #[arg(long)]
        mean_atr: Option<f64>,
    },
    /// Minimal ROI target after a holding time.
    Roi {
        /// Minutes since entry.
        #[arg(long)]
        minutes: u32,

        /// Current profit fraction.
        #[arg(long, allow_hyphen_values = true, required_unless_present = "rate")]
        profit: Option<f64>,

        /// Current rate; the profit is taken from the open rate.
        #[arg(long, conflicts_with = "profit")]
        rate: Option<f64>,

        #[arg(long, default_value_t = 1.0)]
        open_rate: f64,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = StrategyConfig::load(cli.config.as_deref()).context("Failed to load strategy config")?;

    match cli.command {
        Commands::Signals {
            input,
            scenario,
            candles,
            seed,
            pair,
            all,
            json,
        } => run_signals(config, input.as_deref(), scenario, candles, seed, &pair, all, json),
        Commands::Stoploss {
            profit,
            rate,
            open_rate,
            max_rate,
        } => run_stoploss(config, profit, rate, open_rate, max_rate),
        Commands::Leverage {
            latest_atr,
            mean_atr,
        } => run_leverage(config, latest_atr, mean_atr),
        Commands::Roi {
            minutes,
            profit,
            rate,
            open_rate,
        } => run_roi(&config, minutes, profit, rate, open_rate),
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("signalbot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[allow(clippy::too_many_arguments)]
fn run_signals(
    config: StrategyConfig,
    input: Option<&Path>,
    scenario: MarketScenario,
    num_candles: usize,
    seed: u64,
    pair: &str,
    all: bool,
    json: bool,
) -> Result<()> {
    let timeframe = config.timeframe;
    let candles = match input {
        Some(path) => load_candles_json(path)
            .with_context(|| format!("Failed to read candles from {}", path.display()))?,
        None => {
            tracing::info!(
                "Generating {} synthetic {} candles ({:?}, seed {})",
                num_candles,
                timeframe,
                scenario,
                seed
            );
            SyntheticDataGenerator::new(seed)
                .with_pair(pair)
                .generate(scenario, num_candles, timeframe)
        }
    };

    let provider = InMemoryDataProvider::new(candles.len().max(1));
    provider.add_to_whitelist(pair).map_err(anyhow::Error::msg)?;
    provider
        .extend(
            config.informative_timeframe,
            resample(&candles, config.informative_timeframe),
        )
        .map_err(anyhow::Error::msg)?;

    let strategy = RsiMacdAtrStrategy::new(config, Arc::new(provider))?;
    let frame = strategy.analyze(&candles, pair)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&frame)?);
        return Ok(());
    }

    print_frame(&strategy, &frame, all);
    Ok(())
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

fn print_frame(strategy: &RsiMacdAtrStrategy, frame: &IndicatorFrame, all: bool) {
    println!(
        "\n{} | {} {} | {} candles (startup {})\n",
        strategy.name(),
        frame.pair,
        frame.timeframe,
        frame.len(),
        strategy.startup_candle_count()
    );
    println!(
        "{:<20} {:>12} {:>7} {:>7} {:>10} {:>10} {:>6} {:>6} {:>6}",
        "Time", "Close", "RSI", "RSI-inf", "MACD-hist", "ATR", "Enter", "Exit", "Action"
    );
    println!("{}", "─".repeat(92));

    for record in frame.iter().filter(|r| all || r.enter_long) {
        let histogram = match (record.macd, record.macd_signal) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        };
        println!(
            "{:<20} {:>12.4} {:>7} {:>7} {:>10} {:>10} {:>6} {:>6} {:>6}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.close,
            fmt_opt(record.rsi, 1),
            fmt_opt(record.rsi_informative, 1),
            fmt_opt(histogram, 4),
            fmt_opt(record.atr, 4),
            record.enter_long,
            record.exit_long,
            format!("{:?}", record.signal().action())
        );
    }

    let entries = frame.iter().filter(|r| r.enter_long).count();
    let exits = frame.iter().filter(|r| r.exit_long).count();
    let volatility = VolatilitySnapshot::from_frame(frame);
    let leverage = strategy.leverage(
        &LeverageRequest::new(frame.pair.clone(), Utc::now(), frame.last().map_or(0.0, |r| r.close))
            .with_volatility(volatility),
    );

    println!("\n📊 Summary:");
    println!("   Entry signals: {}", entries);
    println!("   Exit signals:  {}", exits);
    println!(
        "   Latest ATR {} vs mean {} -> leverage {}x",
        fmt_opt(volatility.latest_atr, 4),
        fmt_opt(volatility.mean_atr, 4),
        leverage
    );
}

/// Profit and current rate of `trade`, from an explicit profit or from a rate
fn trade_position(trade: &Trade, profit: Option<f64>, rate: Option<f64>) -> Result<(f64, f64)> {
    match (profit, rate) {
        (Some(profit), _) => Ok((profit, trade.open_rate * (1.0 + profit))),
        (None, Some(rate)) => Ok((trade.profit_ratio(rate), rate)),
        (None, None) => anyhow::bail!("either --profit or --rate is required"),
    }
}

fn run_stoploss(
    config: StrategyConfig,
    profit: Option<f64>,
    rate: Option<f64>,
    open_rate: Option<f64>,
    max_rate: Option<f64>,
) -> Result<()> {
    let provider = Arc::new(InMemoryDataProvider::new(1));
    let strategy = RsiMacdAtrStrategy::new(config, provider)?;

    let open = open_rate.unwrap_or(1.0);
    let mut trade = Trade::new("BTC/USDT:USDT", open, 1.0, Utc::now());
    let (profit, current_rate) = trade_position(&trade, profit, rate)?;
    trade.max_rate = max_rate.unwrap_or(open).max(open).max(current_rate);

    let stoploss = strategy.custom_stoploss(&StoplossRequest {
        pair: &trade.pair,
        trade: &trade,
        current_time: Utc::now(),
        current_rate,
        current_profit: profit,
        after_fill: false,
    });
    println!("Stoploss at {:+.2}% profit: {:.2}%", profit * 100.0, stoploss * 100.0);

    if open_rate.is_some() {
        let config = strategy.config();
        let stop = config.trailing_stop.stop_rate_for(&trade, config.stoploss);
        println!(
            "Trailing stop (open {:.4}, high {:.4}): {:.4}",
            trade.open_rate, trade.max_rate, stop
        );
    }

    Ok(())
}

fn run_leverage(config: StrategyConfig, latest_atr: Option<f64>, mean_atr: Option<f64>) -> Result<()> {
    let provider = Arc::new(InMemoryDataProvider::new(1));
    let strategy = RsiMacdAtrStrategy::new(config, provider)?;

    let request = LeverageRequest::new("BTC/USDT:USDT", Utc::now(), 0.0).with_volatility(VolatilitySnapshot {
        latest_atr,
        mean_atr,
    });
    println!("Leverage: {}x", strategy.leverage(&request));

    Ok(())
}

fn run_roi(config: &StrategyConfig, minutes: u32, profit: Option<f64>, rate: Option<f64>, open_rate: f64) -> Result<()> {
    let now = Utc::now();
    let trade = Trade::new("BTC/USDT:USDT", open_rate, 1.0, now - Duration::minutes(minutes as i64));
    let (profit, _) = trade_position(&trade, profit, rate)?;
    let held = trade.minutes_open(now);
    let roi = &config.minimal_roi;

    println!("Minimal ROI:");
    for (after, target) in roi.entries() {
        println!("   after {:>4}m: {:.2}%", after, target * 100.0);
    }

    match roi.target_for(held) {
        Some(target) => println!(
            "ROI target after {}m: {:.2}% (profit {:.2}% -> exit: {})",
            held,
            target * 100.0,
            profit * 100.0,
            roi.should_exit(held, profit)
        ),
        None => println!("No ROI target in effect after {}m", held),
    }
    Ok(())
}
