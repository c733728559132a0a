//! Sweep monthly budgets and compare snowball against avalanche
//!
//! Usage: compare_strategies [DEBTS_CSV] [--json]
//! Budgets run from the total minimum payment upward. Accepts config via
//! environment variables:
//!   SWEEP_STEP   budget increment (default 50)
//!   SWEEP_STEPS  number of budgets (default 20)
//! plus the FINCALC_* calculator overrides.

use anyhow::{Context, Result};
use fincalc::debt::loader::{load_debts, DEFAULT_DEBTS_PATH};
use fincalc::scenario::SweepRow;
use fincalc::{ScenarioRunner, Strategy};
use serde::Serialize;
use std::env;
use std::time::Instant;

const OUTPUT_PATH: &str = "strategy_sweep.csv";

#[derive(Serialize)]
struct SweepResponse {
    debt_count: usize,
    total_balance: f64,
    total_minimum_payment: f64,
    rows: Vec<SweepRow>,
    execution_time_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let json_output = args.iter().any(|a| a == "--json");
    let path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(String::as_str)
        .unwrap_or(DEFAULT_DEBTS_PATH);

    let start = Instant::now();
    let debts = load_debts(path).with_context(|| format!("loading debts from {}", path))?;
    if !json_output {
        println!("Loaded {} debts from {} in {:?}", debts.len(), path, start.elapsed());
    }

    let step: f64 = env_or("SWEEP_STEP", 50.0);
    let steps: u32 = env_or("SWEEP_STEPS", 20);
    let floor = debts.total_minimum_payment();
    let budgets: Vec<f64> = (0..steps).map(|i| floor + step * f64::from(i)).collect();

    let runner = ScenarioRunner::from_env();
    let rows = runner.strategy_sweep(debts.as_slice(), &budgets)?;

    if json_output {
        let response = SweepResponse {
            debt_count: debts.len(),
            total_balance: debts.total_balance(),
            total_minimum_payment: floor,
            rows,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    let mut writer = csv::Writer::from_path(OUTPUT_PATH).with_context(|| format!("creating {}", OUTPUT_PATH))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Output written to {}", OUTPUT_PATH);

    println!("\n{:>10} {:>10} {:>14} {:>10} {:>14}", "Budget", "Snowball", "Interest", "Avalanche", "Interest");
    println!("{}", "-".repeat(62));
    for pair in rows.chunks(2) {
        let (snowball, avalanche) = match pair {
            [a, b] if a.strategy == Strategy::Snowball => (a, b),
            [a, b] => (b, a),
            _ => continue,
        };
        println!(
            "{:>10.2} {:>10} {:>14.2} {:>10} {:>14.2}",
            snowball.monthly_budget,
            snowball.total_months,
            snowball.total_interest,
            avalanche.total_months,
            avalanche.total_interest
        );
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
