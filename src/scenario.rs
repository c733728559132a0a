//! Scenario runner for batch calculations
//!
//! Holds one configuration and fans independent runs (payoff budgets, loan
//! rates, incomes) out across the rayon thread pool. Each run is a pure
//! function of its inputs, so results come back in input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CalculatorConfig;
use crate::debt::{Debt, PayoffPlan, Strategy, StrategyComparison};
use crate::error::CalcResult;
use crate::loan::{AmortizationResult, LoanTerms};
use crate::tax::{TaxBreakdown, TaxEngine};

/// Snowball against avalanche at one budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub monthly_budget: f64,
    pub comparison: StrategyComparison,
}

/// One row of a strategy sweep, flattened for CSV output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRow {
    pub monthly_budget: f64,
    pub strategy: Strategy,
    pub total_months: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    pub status: String,
    pub budget_shortfall: f64,
}

impl From<&PayoffPlan> for SweepRow {
    fn from(plan: &PayoffPlan) -> Self {
        Self {
            monthly_budget: plan.monthly_budget,
            strategy: plan.strategy,
            total_months: plan.total_months,
            total_interest: plan.total_interest,
            total_paid: plan.total_paid,
            status: format!("{:?}", plan.status),
            budget_shortfall: plan.budget_shortfall,
        }
    }
}

/// Batch runner sharing one configuration
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: CalculatorConfig,
}

impl ScenarioRunner {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    /// Runner configured from `FINCALC_*` environment variables
    pub fn from_env() -> Self {
        Self::new(CalculatorConfig::from_env())
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Simulate one strategy at each budget
    pub fn run_budgets(&self, debts: &[Debt], budgets: &[f64], strategy: Strategy) -> CalcResult<Vec<PayoffPlan>> {
        let engine = self.config.payoff_engine();
        budgets
            .par_iter()
            .map(|&budget| engine.simulate(debts, budget, strategy))
            .collect()
    }

    /// Compare both strategies at each budget
    pub fn compare_budgets(&self, debts: &[Debt], budgets: &[f64]) -> CalcResult<Vec<BudgetComparison>> {
        let engine = self.config.payoff_engine();
        let results: CalcResult<Vec<BudgetComparison>> = budgets
            .par_iter()
            .map(|&budget| {
                engine.compare(debts, budget).map(|comparison| BudgetComparison {
                    monthly_budget: budget,
                    comparison,
                })
            })
            .collect();
        if let Ok(rows) = &results {
            log::info!("compared strategies at {} budgets for {} debts", rows.len(), debts.len());
        }
        results
    }

    /// Flat rows for every budget and strategy
    pub fn strategy_sweep(&self, debts: &[Debt], budgets: &[f64]) -> CalcResult<Vec<SweepRow>> {
        let comparisons = self.compare_budgets(debts, budgets)?;
        Ok(comparisons
            .iter()
            .flat_map(|c| Strategy::ALL.map(|s| SweepRow::from(c.comparison.plan(s))))
            .collect())
    }

    /// Amortize the same loan at each rate
    pub fn rate_sweep(&self, base: &LoanTerms, rates: &[f64]) -> CalcResult<Vec<AmortizationResult>> {
        let engine = self.config.amortization_engine();
        rates
            .par_iter()
            .map(|&rate| {
                let terms = LoanTerms {
                    annual_rate: rate,
                    ..base.clone()
                };
                engine.amortize(&terms)
            })
            .collect()
    }

    /// Tax breakdown at each income using one bracket table
    pub fn tax_sweep(&self, incomes: &[f64]) -> CalcResult<Vec<TaxBreakdown>> {
        let engine: TaxEngine = self.config.tax_engine()?;
        incomes.par_iter().map(|&income| engine.compute_tax(income)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::PayoffConfig;

    fn debts() -> Vec<Debt> {
        vec![
            Debt::new("card", "Card", 5_000.0, 20.0, 100.0),
            Debt::new("car", "Car", 3_000.0, 10.0, 100.0),
        ]
    }

    #[test]
    fn test_higher_budget_pays_off_sooner() {
        let runner = ScenarioRunner::default();
        let plans = runner
            .run_budgets(&debts(), &[250.0, 300.0, 500.0], Strategy::Avalanche)
            .unwrap();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[1].monthly_budget, 300.0);
        assert!(plans[2].total_months < plans[1].total_months);
        assert!(plans[1].total_months < plans[0].total_months);
        assert!(plans[2].total_interest < plans[0].total_interest);
    }

    #[test]
    fn test_sweep_rows() {
        let runner = ScenarioRunner::default();
        let rows = runner.strategy_sweep(&debts(), &[300.0, 400.0]).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].strategy, Strategy::Snowball);
        assert_eq!(rows[1].strategy, Strategy::Avalanche);
        assert_eq!(rows[2].monthly_budget, 400.0);
        assert!(rows[1].total_interest <= rows[0].total_interest);
    }

    #[test]
    fn test_config_month_cap_applies() {
        let config = CalculatorConfig {
            payoff: PayoffConfig { month_cap: 6 },
            ..Default::default()
        };
        let plans = ScenarioRunner::new(config)
            .run_budgets(&debts(), &[300.0], Strategy::Snowball)
            .unwrap();
        assert_eq!(plans[0].total_months, 6);
    }

    #[test]
    fn test_rate_sweep() {
        let base = LoanTerms::new(200_000.0, 0.0, 30);
        let results = ScenarioRunner::default().rate_sweep(&base, &[0.0, 5.5, 7.0]).unwrap();
        assert_eq!(results[0].total_interest, 0.0);
        assert!(results[2].monthly_payment > results[1].monthly_payment);
    }

    #[test]
    fn test_invalid_budget_fails_batch() {
        let runner = ScenarioRunner::default();
        assert!(runner.run_budgets(&debts(), &[300.0, -5.0], Strategy::Snowball).is_err());
    }

    #[test]
    fn test_tax_sweep() {
        let results = ScenarioRunner::default().tax_sweep(&[0.0, 50_000.0, 250_000.0]).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[2].federal_tax > results[1].federal_tax);
    }
}
