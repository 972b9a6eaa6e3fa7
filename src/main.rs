//! Retirement Cycles CLI
//!
//! Command-line interface for replaying a portfolio through historical cycles

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use retirement_cycles::{
    history::DEFAULT_SERIES_PATH, predefined_strategies, CsvSource, CycleResult, PortfolioConfig,
    SimulationParams, SimulationRunner, SimulationType, SweepConfig, SweepResult,
    WithdrawalPolicy,
};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Preset {
    ConstantDollar,
    Percentage,
    Variable,
    Guardrails,
}

impl Preset {
    fn policy(self) -> Result<WithdrawalPolicy> {
        let name = match self {
            Preset::ConstantDollar => "Constant Dollar",
            Preset::Percentage => "Percentage of Portfolio",
            Preset::Variable => "Variable Spending",
            Preset::Guardrails => "Guardrails",
        };
        predefined_strategies()
            .into_iter()
            .find(|s| s.name == name)
            .map(|s| s.policy)
            .with_context(|| format!("no predefined strategy named {}", name))
    }
}

#[derive(Debug, Parser)]
#[command(name = "retirement_cycles", about = "Replay a retirement portfolio through historical market cycles")]
struct Cli {
    /// Historical series CSV (Year,EquityNominal,BondNominal,InflationRate)
    #[arg(long, default_value = DEFAULT_SERIES_PATH)]
    data: PathBuf,

    #[arg(long, default_value_t = 1_000_000.0)]
    initial_balance: f64,

    /// Equity weight in percent
    #[arg(long, default_value_t = 60.0)]
    stock_allocation: f64,

    /// Bond weight in percent; defaults to the remainder of the stock weight
    #[arg(long)]
    bond_allocation: Option<f64>,

    /// Cycle length in years
    #[arg(long, default_value_t = 30)]
    duration: u32,

    /// Run one cycle from this year instead of sweeping every start year
    #[arg(long)]
    start_year: Option<i32>,

    #[arg(long, value_enum, default_value_t = Preset::ConstantDollar)]
    preset: Preset,

    /// Withdrawal policy as JSON, overriding --preset
    #[arg(long)]
    policy_json: Option<String>,

    /// Write one row per cycle (or per year for a single cycle) to this CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the full result as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Run the sweep on one thread
    #[arg(long)]
    serial: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    generated_at: String,
    request: &'a SimulationParams,
    result: &'a SweepResult,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("Retirement Cycles v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    let withdrawal_strategy = match &cli.policy_json {
        Some(json) => WithdrawalPolicy::from_json(json).context("parsing --policy-json")?,
        None => cli.preset.policy()?,
    };

    let params = SimulationParams {
        portfolio: PortfolioConfig::new(
            cli.initial_balance,
            cli.stock_allocation,
            cli.bond_allocation.unwrap_or(100.0 - cli.stock_allocation),
        ),
        withdrawal_strategy,
        duration: cli.duration,
        simulation_type: match cli.start_year {
            Some(start_year) => SimulationType::Single { start_year },
            None => SimulationType::HistoricalCycles,
        },
    };

    println!("Portfolio: ${:.2} ({:.0}/{:.0} stocks/bonds)",
        params.portfolio.initial_balance,
        params.portfolio.stock_allocation,
        params.portfolio.bond_allocation);
    println!("Withdrawal: {}", serde_json::to_string(&params.withdrawal_strategy)?);
    println!("Data: {}", cli.data.display());
    println!();

    let runner = SimulationRunner::with_config(
        CsvSource::new(&cli.data),
        SweepConfig { parallel: !cli.serial },
    );
    let result = runner.run(&params).context("simulation failed")?;

    match params.simulation_type {
        SimulationType::Single { .. } => print_cycle(&result.cycles[0]),
        SimulationType::HistoricalCycles => print_sweep(&result),
    }

    if let Some(path) = &cli.csv {
        match params.simulation_type {
            SimulationType::Single { .. } => write_cycle_csv(path, &result.cycles[0])?,
            SimulationType::HistoricalCycles => write_sweep_csv(path, &result)?,
        }
        println!("\nCSV written to: {}", path.display());
    }

    if let Some(path) = &cli.json {
        let report = Report {
            generated_at: Utc::now().to_rfc3339(),
            request: &params,
            result: &result,
        };
        let file = File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report)?;
        println!("JSON written to: {}", path.display());
    }

    Ok(())
}

fn print_cycle(cycle: &CycleResult) {
    println!("Cycle from {} ({} years simulated):", cycle.start_year, cycle.years_simulated());
    println!("{:>6} {:>16} {:>14} {:>9} {:>9} {:>9} {:>16}",
        "Year", "Start", "Withdrawal", "Stock%", "Bond%", "Infl%", "End");
    println!("{}", "-".repeat(85));

    for row in &cycle.yearly_results {
        println!("{:>6} {:>16.2} {:>14.2} {:>9.2} {:>9.2} {:>9.2} {:>16.2}",
            row.year,
            row.starting_balance,
            row.withdrawal,
            row.stock_return_pct,
            row.bond_return_pct,
            row.inflation_rate_pct,
            row.ending_balance,
        );
    }

    println!("\nSummary:");
    println!("  Outcome: {}", if cycle.success { "sustained" } else { "depleted" });
    if let Some(year) = cycle.depletion_year() {
        println!("  Depleted in: {}", year);
    }
    println!("  Final Balance: ${:.2}", cycle.final_balance);
    println!("  Total Withdrawn: ${:.2}", cycle.total_withdrawn());
    println!("  Lowest Balance: ${:.2}", cycle.lowest_balance);
    println!("  Highest Balance: ${:.2}", cycle.highest_balance);
    println!("  Average Return: {:.2}%", cycle.average_return * 100.0);
}

fn print_sweep(result: &SweepResult) {
    println!("{:>6} {:>10} {:>16} {:>16} {:>10}",
        "Start", "Outcome", "Final", "Lowest", "AvgRet%");
    println!("{}", "-".repeat(62));

    for cycle in &result.cycles {
        println!("{:>6} {:>10} {:>16.2} {:>16.2} {:>10.2}",
            cycle.start_year,
            if cycle.success { "ok" } else { "depleted" },
            cycle.final_balance,
            cycle.lowest_balance,
            cycle.average_return * 100.0,
        );
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Cycles: {} ({} sustained, {} depleted)",
        summary.total_cycles, summary.successful_cycles, summary.failed_cycles);
    println!("  Success Rate: {:.1}%", summary.success_rate_pct);
    println!("  Median Ending Balance: ${:.2}", summary.median_ending_balance);
    println!("  Worst Case: ${:.2}", summary.worst_case_balance);
    println!("  Best Case: ${:.2}", summary.best_case_balance);
    if let Some(year) = summary.earliest_depletion_year {
        println!("  Earliest Depletion: {}", year);
    }
}

fn write_cycle_csv(path: &Path, cycle: &CycleResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in &cycle.yearly_results {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_sweep_csv(path: &Path, result: &SweepResult) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "StartYear,Success,FinalBalance,LowestBalance,HighestBalance,AverageReturn,YearsSimulated,TotalWithdrawn")?;
    for cycle in &result.cycles {
        writeln!(file, "{},{},{:.8},{:.8},{:.8},{:.8},{},{:.8}",
            cycle.start_year,
            cycle.success,
            cycle.final_balance,
            cycle.lowest_balance,
            cycle.highest_balance,
            cycle.average_return,
            cycle.years_simulated(),
            cycle.total_withdrawn(),
        )?;
    }
    Ok(())
}
