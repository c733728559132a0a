//! Income tax engine: bracket table plus payroll taxes

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, CalcResult};
use super::brackets::{BracketSlice, BracketTable};
use super::payroll::PayrollTaxes;

/// Full tax breakdown for one annual income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub gross_income: f64,
    pub federal_tax: f64,
    pub social_security: f64,
    pub medicare: f64,
    pub total_tax: f64,
    pub net_income: f64,
    /// Federal tax as a percent of income; never above `marginal_rate`
    pub effective_rate: f64,
    /// All taxes, payroll included, as a percent of income
    pub effective_total_rate: f64,
    pub marginal_rate: f64,
    pub brackets: Vec<BracketSlice>,
}

/// Progressive income tax calculator
#[derive(Debug, Clone, Default)]
pub struct TaxEngine {
    table: BracketTable,
    payroll: PayrollTaxes,
}

impl TaxEngine {
    pub fn new(table: BracketTable, payroll: PayrollTaxes) -> Self {
        Self { table, payroll }
    }

    pub fn table(&self) -> &BracketTable {
        &self.table
    }

    pub fn payroll(&self) -> &PayrollTaxes {
        &self.payroll
    }

    /// Bracket tax first, then the flat payroll taxes as a separate additive step
    pub fn compute_tax(&self, income: f64) -> CalcResult<TaxBreakdown> {
        ensure_finite("income", income)?;

        let federal = self.table.tax_on(income);
        let social_security = self.payroll.social_security(income);
        let medicare = self.payroll.medicare(income);
        let total_tax = federal.tax + social_security + medicare;

        let (effective_rate, effective_total_rate) = if income > 0.0 {
            (federal.tax / income * 100.0, total_tax / income * 100.0)
        } else {
            (0.0, 0.0)
        };

        Ok(TaxBreakdown {
            gross_income: income,
            federal_tax: federal.tax,
            social_security,
            medicare,
            total_tax,
            net_income: income - total_tax,
            effective_rate,
            effective_total_rate,
            marginal_rate: federal.marginal_rate,
            brackets: federal.slices,
        })
    }
}

/// Tax under the 2024 federal table and FICA rates
pub fn compute_tax(income: f64) -> CalcResult<TaxBreakdown> {
    TaxEngine::default().compute_tax(income)
}
