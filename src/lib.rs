//! fincalc - Financial calculator engines
//!
//! This library provides:
//! - Loan amortization with lazy, bounded payment schedules
//! - Progressive tax brackets, payroll taxes and paycheck calculators
//! - Compound growth projections and savings goal calculators
//! - Multi-debt snowball/avalanche payoff simulation
//! - Mortgage, rent-vs-buy and rental ROI engines
//! - Asset allocation, portfolio risk and stock return metrics
//! - Batch scenario runs across budgets, rates and incomes

pub mod error;
pub mod config;
pub mod loan;
pub mod tax;
pub mod growth;
pub mod debt;
pub mod real_estate;
pub mod portfolio;
pub mod scenario;

// Re-export commonly used types
pub use error::{CalcError, CalcResult};
pub use config::CalculatorConfig;
pub use loan::{amortize, AmortizationEngine, AmortizationResult, LoanTerms, PayoffStatus, ScheduleIter};
pub use tax::{compute_tax, BracketTable, TaxBreakdown, TaxEngine};
pub use growth::{CompoundGrowthEngine, CompoundingFrequency, ContributionSchedule, GrowthResult};
pub use debt::{Debt, DebtId, DebtList, DebtPayoffEngine, PayoffPlan, Strategy};
pub use scenario::ScenarioRunner;
