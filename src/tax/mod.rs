//! Progressive income tax, payroll taxes and paycheck calculators

mod brackets;
mod payroll;
mod engine;
mod income;
pub mod loader;

pub use brackets::{BracketSlice, BracketTable, BracketTax, TaxBracket};
pub use payroll::{self_employment_tax, BusinessExpense, PayrollTaxes, SelfEmploymentTax, SOCIAL_SECURITY_WAGE_BASE_2024};
pub use engine::{compute_tax, TaxBreakdown, TaxEngine};
pub use income::{
    net_income, salary_breakdown, withholding, Deduction, DeductionFrequency, DeductionKind,
    NetIncomeBreakdown, PayFrequency, SalaryBreakdown, SalaryFrequency, WithholdingAllowance,
    WithholdingBreakdown,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CalcResult;

/// Tax inputs that vary by year or jurisdiction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    /// Bracket CSV; the built-in 2024 federal table when unset
    pub brackets_path: Option<PathBuf>,
    pub payroll: PayrollTaxes,
}

impl TaxEngine {
    /// Build an engine from config, loading the bracket table if a path is set
    pub fn from_config(config: &TaxConfig) -> CalcResult<Self> {
        let table = match &config.brackets_path {
            Some(path) => loader::load_brackets(path)?,
            None => BracketTable::federal_2024(),
        };
        Ok(Self::new(table, config.payroll.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_from_config() {
        let config = TaxConfig {
            brackets_path: Some(PathBuf::from(loader::DEFAULT_BRACKETS_PATH)),
            ..Default::default()
        };
        let engine = TaxEngine::from_config(&config).unwrap();
        assert_eq!(engine.table(), &BracketTable::federal_2024());
    }

    #[test]
    fn test_missing_bracket_file() {
        let config = TaxConfig {
            brackets_path: Some(PathBuf::from("data/tax/does_not_exist.csv")),
            ..Default::default()
        };
        assert!(TaxEngine::from_config(&config).is_err());
    }
}
