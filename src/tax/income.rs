//! Paycheck calculators: salary conversion, net income and withholding

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, CalcResult};
use super::engine::TaxEngine;

const WORK_WEEKS_PER_YEAR: f64 = 52.0;
const WORK_DAYS_PER_YEAR: f64 = WORK_WEEKS_PER_YEAR * 5.0;

/// How often a salary amount is quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryFrequency {
    Hourly,
    Weekly,
    Biweekly,
    Monthly,
    Annual,
}

/// Pay period for paychecks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Annual,
}

impl PayFrequency {
    pub fn periods_per_year(&self) -> f64 {
        match self {
            PayFrequency::Weekly => 52.0,
            PayFrequency::Biweekly => 26.0,
            PayFrequency::Monthly => 12.0,
            PayFrequency::Annual => 1.0,
        }
    }
}

/// The same salary expressed at every common frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub annual: f64,
    pub monthly: f64,
    pub biweekly: f64,
    pub weekly: f64,
    pub hourly: f64,
    pub daily_average: f64,
}

pub fn salary_breakdown(
    amount: f64,
    frequency: SalaryFrequency,
    hours_per_week: f64,
) -> CalcResult<SalaryBreakdown> {
    ensure_non_negative("amount", amount)?;
    ensure_positive("hours_per_week", hours_per_week)?;

    let hours_per_year = WORK_WEEKS_PER_YEAR * hours_per_week;
    let annual = match frequency {
        SalaryFrequency::Hourly => amount * hours_per_year,
        SalaryFrequency::Weekly => amount * WORK_WEEKS_PER_YEAR,
        SalaryFrequency::Biweekly => amount * (WORK_WEEKS_PER_YEAR / 2.0),
        SalaryFrequency::Monthly => amount * 12.0,
        SalaryFrequency::Annual => amount,
    };

    Ok(SalaryBreakdown {
        annual,
        monthly: annual / 12.0,
        biweekly: annual / (WORK_WEEKS_PER_YEAR / 2.0),
        weekly: annual / WORK_WEEKS_PER_YEAR,
        hourly: annual / hours_per_year,
        daily_average: annual / WORK_DAYS_PER_YEAR,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeductionFrequency {
    PerPaycheck,
    Monthly,
    Annual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeductionKind {
    Pretax,
    Posttax,
}

/// Payroll deduction (401k, insurance, garnishment, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub frequency: DeductionFrequency,
    pub kind: DeductionKind,
}

impl Deduction {
    fn annual_amount(&self, pay: PayFrequency) -> f64 {
        let periods = match self.frequency {
            DeductionFrequency::PerPaycheck => pay.periods_per_year(),
            DeductionFrequency::Monthly => 12.0,
            DeductionFrequency::Annual => 1.0,
        };
        self.amount * periods
    }
}

/// Per-paycheck net income breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetIncomeBreakdown {
    pub gross_income: f64,
    pub pretax_deductions: f64,
    pub taxable_income: f64,
    pub federal_tax: f64,
    pub social_security: f64,
    pub medicare: f64,
    pub posttax_deductions: f64,
    pub net_income: f64,
    pub annual_net: f64,
    /// Percent of taxable income
    pub effective_tax_rate: f64,
}

/// Take-home pay per period after taxes and deductions
///
/// `salary` is the amount per pay period.
pub fn net_income(
    engine: &TaxEngine,
    salary: f64,
    frequency: PayFrequency,
    deductions: &[Deduction],
) -> CalcResult<NetIncomeBreakdown> {
    ensure_non_negative("salary", salary)?;
    for d in deductions {
        ensure_non_negative("deduction", d.amount)?;
    }

    let periods = frequency.periods_per_year();
    let annual_salary = salary * periods;

    let annual_for = |kind: DeductionKind| -> f64 {
        deductions
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.annual_amount(frequency))
            .sum()
    };
    let pretax = annual_for(DeductionKind::Pretax);
    let posttax = annual_for(DeductionKind::Posttax);

    let taxable = (annual_salary - pretax).max(0.0);
    let taxes = engine.compute_tax(taxable)?;
    let annual_net = taxable - taxes.total_tax - posttax;

    let effective_tax_rate = if taxable > 0.0 {
        taxes.total_tax / taxable * 100.0
    } else {
        0.0
    };

    Ok(NetIncomeBreakdown {
        gross_income: salary,
        pretax_deductions: pretax / periods,
        taxable_income: taxable / periods,
        federal_tax: taxes.federal_tax / periods,
        social_security: taxes.social_security / periods,
        medicare: taxes.medicare / periods,
        posttax_deductions: posttax / periods,
        net_income: annual_net / periods,
        annual_net,
        effective_tax_rate,
    })
}

/// Annual amount exempt from withholding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithholdingAllowance {
    pub id: String,
    pub name: String,
    pub amount: f64,
}

/// Per-paycheck withholding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithholdingBreakdown {
    pub gross_pay: f64,
    pub federal_withholding: f64,
    pub social_security: f64,
    pub medicare: f64,
    pub total_withholding: f64,
    pub net_pay: f64,
    pub annual_withholding: f64,
    pub annual_net: f64,
}

/// Withholding per paycheck from annualized tax less allowances
pub fn withholding(
    engine: &TaxEngine,
    salary: f64,
    frequency: PayFrequency,
    allowances: &[WithholdingAllowance],
    additional_withholding: f64,
) -> CalcResult<WithholdingBreakdown> {
    ensure_non_negative("salary", salary)?;
    ensure_finite("additional_withholding", additional_withholding)?;
    for allowance in allowances {
        ensure_non_negative("allowance", allowance.amount)?;
    }

    let periods = frequency.periods_per_year();
    let annual_salary = salary * periods;
    let allowance_total: f64 = allowances.iter().map(|a| a.amount).sum();
    let taxable = (annual_salary - allowance_total).max(0.0);

    let annual = engine.compute_tax(taxable)?;
    let federal_withholding = annual.federal_tax / periods + additional_withholding;
    let social_security = annual.social_security / periods;
    let medicare = annual.medicare / periods;
    let total_withholding = federal_withholding + social_security + medicare;

    Ok(WithholdingBreakdown {
        gross_pay: salary,
        federal_withholding,
        social_security,
        medicare,
        total_withholding,
        net_pay: salary - total_withholding,
        annual_withholding: total_withholding * periods,
        annual_net: annual_salary - total_withholding * periods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hourly_salary() {
        let result = salary_breakdown(25.0, SalaryFrequency::Hourly, 40.0).unwrap();
        assert_abs_diff_eq!(result.annual, 52_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.weekly, 1_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.biweekly, 2_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.daily_average, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_annual_to_hourly() {
        let result = salary_breakdown(104_000.0, SalaryFrequency::Annual, 40.0).unwrap();
        assert_abs_diff_eq!(result.hourly, 50.0, epsilon = 1e-9);
        assert!(salary_breakdown(1.0, SalaryFrequency::Annual, 0.0).is_err());
    }

    #[test]
    fn test_net_income_with_deductions() {
        let engine = TaxEngine::default();
        let deductions = vec![
            Deduction {
                id: "401k".into(),
                name: "401(k)".into(),
                amount: 500.0,
                frequency: DeductionFrequency::Monthly,
                kind: DeductionKind::Pretax,
            },
            Deduction {
                id: "union".into(),
                name: "Union dues".into(),
                amount: 600.0,
                frequency: DeductionFrequency::Annual,
                kind: DeductionKind::Posttax,
            },
        ];
        let result = net_income(&engine, 5_000.0, PayFrequency::Monthly, &deductions).unwrap();
        assert_abs_diff_eq!(result.pretax_deductions, 500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.taxable_income, 4_500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.posttax_deductions, 50.0, epsilon = 1e-9);

        let annual = engine.compute_tax(54_000.0).unwrap();
        assert_abs_diff_eq!(result.annual_net, 54_000.0 - annual.total_tax - 600.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.net_income * 12.0, result.annual_net, epsilon = 1e-6);
    }

    #[test]
    fn test_withholding_biweekly() {
        let engine = TaxEngine::default();
        let allowances = vec![WithholdingAllowance {
            id: "std".into(),
            name: "Standard".into(),
            amount: 14_600.0,
        }];
        let result = withholding(&engine, 3_000.0, PayFrequency::Biweekly, &allowances, 25.0).unwrap();

        let annual = engine.compute_tax(78_000.0 - 14_600.0).unwrap();
        assert_abs_diff_eq!(result.federal_withholding, annual.federal_tax / 26.0 + 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            result.net_pay,
            3_000.0 - result.total_withholding,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(result.annual_withholding, result.total_withholding * 26.0, epsilon = 1e-9);
    }

    #[test]
    fn test_allowances_above_salary() {
        let engine = TaxEngine::default();
        let allowances = vec![WithholdingAllowance {
            id: "big".into(),
            name: "Large allowance".into(),
            amount: 1_000_000.0,
        }];
        let result = withholding(&engine, 1_000.0, PayFrequency::Monthly, &allowances, 0.0).unwrap();
        assert_eq!(result.total_withholding, 0.0);
        assert_eq!(result.net_pay, 1_000.0);
    }

    #[test]
    fn test_invalid_allowance_rejected() {
        let engine = TaxEngine::default();
        for amount in [-500.0, f64::NAN, f64::INFINITY] {
            let allowances = vec![WithholdingAllowance {
                id: "bad".into(),
                name: "Bad allowance".into(),
                amount,
            }];
            let err = withholding(&engine, 3_000.0, PayFrequency::Monthly, &allowances, 0.0).unwrap_err();
            assert!(matches!(err, CalcError::InvalidInput { field: "allowance", .. }));
        }
    }
}
