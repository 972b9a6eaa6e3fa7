//! Sweep every predefined withdrawal strategy over the same historical series
//!
//! Usage: cargo run --release --bin compare_strategies -- --duration 30

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use retirement_cycles::{
    history::{loader::load_series, DEFAULT_SERIES_PATH},
    predefined_strategies, HistoricalSeries, HistoricalSweepAggregator, PortfolioConfig,
    SweepConfig,
};
use retirement_cycles::simulation::SweepSummary;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(about = "Compare predefined withdrawal strategies across historical cycles")]
struct Args {
    #[arg(long, default_value = DEFAULT_SERIES_PATH)]
    data: PathBuf,

    #[arg(long, default_value_t = 30)]
    duration: u32,

    #[arg(long, default_value_t = 1_000_000.0)]
    initial_balance: f64,

    #[arg(long, default_value_t = 60.0)]
    stock_allocation: f64,

    #[arg(long, default_value = "strategy_comparison.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading historical series from {}...", args.data.display());
    let records = load_series(&args.data)
        .with_context(|| format!("loading {}", args.data.display()))?;
    let series = HistoricalSeries::new(records)?;
    println!("Loaded {} years in {:?}", series.len(), start.elapsed());

    let portfolio = PortfolioConfig::new(
        args.initial_balance,
        args.stock_allocation,
        100.0 - args.stock_allocation,
    );
    portfolio.validate()?;

    let strategies = predefined_strategies();
    println!("Running {} strategies ({}-year cycles)...", strategies.len(), args.duration);
    let sweep_start = Instant::now();

    // Strategies fan out here; each sweep runs serially inside its task
    let results: Vec<(&'static str, SweepSummary)> = strategies
        .par_iter()
        .map(|strategy| -> retirement_cycles::Result<(&'static str, SweepSummary)> {
            let aggregator = HistoricalSweepAggregator::new(
                portfolio.clone(),
                strategy.policy.clone(),
                SweepConfig { parallel: false },
            );
            let result = aggregator.run_sweep(&series, args.duration)?;
            Ok((strategy.name, result.summary()))
        })
        .collect::<retirement_cycles::Result<_>>()?;

    println!("Completed in {:?}\n", sweep_start.elapsed());

    println!("{:<26} {:>8} {:>10} {:>16} {:>16} {:>16}",
        "Strategy", "Cycles", "Success%", "Median", "Worst", "Best");
    println!("{}", "-".repeat(97));
    for (name, summary) in &results {
        println!("{:<26} {:>8} {:>10.1} {:>16.2} {:>16.2} {:>16.2}",
            name,
            summary.total_cycles,
            summary.success_rate_pct,
            summary.median_ending_balance,
            summary.worst_case_balance,
            summary.best_case_balance,
        );
    }

    let mut file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writeln!(file, "Strategy,Cycles,Successful,Failed,SuccessRate,MedianEnding,WorstCase,BestCase,EarliestDepletion")?;
    for (name, summary) in &results {
        writeln!(file, "{},{},{},{},{:.4},{:.2},{:.2},{:.2},{}",
            name,
            summary.total_cycles,
            summary.successful_cycles,
            summary.failed_cycles,
            summary.success_rate_pct,
            summary.median_ending_balance,
            summary.worst_case_balance,
            summary.best_case_balance,
            summary.earliest_depletion_year.map(|y| y.to_string()).unwrap_or_default(),
        )?;
    }

    println!("\nResults written to: {}", args.output.display());
    Ok(())
}
