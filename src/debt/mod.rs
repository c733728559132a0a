//! Debt ledger, payoff strategies, consolidation and debt-to-income

mod ledger;
mod payoff;
mod consolidation;
mod ratio;
pub mod loader;

pub use ledger::{Debt, DebtId, DebtList};
pub use payoff::{
    simulate_payoff, DebtMonth, DebtPayoffEngine, DebtProgress, PayoffConfig, PayoffMonth, PayoffPlan,
    Strategy, StrategyComparison,
};
pub use consolidation::{consolidation, ConsolidationComparison, PlanPoint, RepaymentPlan};
pub use ratio::{debt_to_income, DebtPayment, DebtToIncome, IncomeFrequency, IncomeSource, RiskLevel};
