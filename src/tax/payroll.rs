//! Flat-rate payroll taxes (Social Security and Medicare) and self-employment tax

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, CalcResult};

/// Social Security wage base for 2024
pub const SOCIAL_SECURITY_WAGE_BASE_2024: f64 = 168_600.0;

/// Flat payroll tax rates; Social Security is capped at a wage base, Medicare is not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollTaxes {
    /// Percent
    pub social_security_rate: f64,
    /// Percent
    pub medicare_rate: f64,
    pub social_security_wage_base: f64,
}

impl PayrollTaxes {
    /// Employee share of FICA, 2024
    pub fn fica_2024() -> Self {
        Self {
            social_security_rate: 6.2,
            medicare_rate: 1.45,
            social_security_wage_base: SOCIAL_SECURITY_WAGE_BASE_2024,
        }
    }

    /// Employee plus employer share, as paid by the self-employed
    pub fn self_employed(&self) -> Self {
        Self {
            social_security_rate: self.social_security_rate * 2.0,
            medicare_rate: self.medicare_rate * 2.0,
            social_security_wage_base: self.social_security_wage_base,
        }
    }

    pub fn social_security(&self, wages: f64) -> f64 {
        wages.max(0.0).min(self.social_security_wage_base) * self.social_security_rate / 100.0
    }

    pub fn medicare(&self, wages: f64) -> f64 {
        wages.max(0.0) * self.medicare_rate / 100.0
    }
}

impl Default for PayrollTaxes {
    fn default() -> Self {
        Self::fica_2024()
    }
}

/// Named business expense deducted from self-employment income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessExpense {
    pub id: String,
    pub name: String,
    pub amount: f64,
}

/// Self-employment tax breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfEmploymentTax {
    pub gross_income: f64,
    pub total_expenses: f64,
    pub net_earnings: f64,
    pub social_security_tax: f64,
    pub medicare_tax: f64,
    pub total_se_tax: f64,
    /// Half of the SE tax is deductible from income
    pub tax_deduction: f64,
    /// Percent of net earnings
    pub effective_rate: f64,
    pub quarterly_payment: f64,
}

/// Self-employment tax on income less business expenses
///
/// `payroll` holds the employee-side rates; they are doubled here.
pub fn self_employment_tax(
    income: f64,
    expenses: &[BusinessExpense],
    payroll: &PayrollTaxes,
) -> CalcResult<SelfEmploymentTax> {
    ensure_finite("income", income)?;
    for expense in expenses {
        ensure_non_negative("expense", expense.amount)?;
    }

    let rates = payroll.self_employed();
    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
    let net_earnings = (income - total_expenses).max(0.0);

    let social_security_tax = rates.social_security(net_earnings);
    let medicare_tax = rates.medicare(net_earnings);
    let total_se_tax = social_security_tax + medicare_tax;

    let effective_rate = if net_earnings > 0.0 {
        total_se_tax / net_earnings * 100.0
    } else {
        0.0
    };

    Ok(SelfEmploymentTax {
        gross_income: income,
        total_expenses,
        net_earnings,
        social_security_tax,
        medicare_tax,
        total_se_tax,
        tax_deduction: total_se_tax * 0.5,
        effective_rate,
        quarterly_payment: total_se_tax / 4.0,
    })
}
