//! Debt-to-income ratio and lending risk band

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, CalcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeFrequency {
    Monthly,
    Annual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub name: String,
    pub amount: f64,
    pub frequency: IncomeFrequency,
}

impl IncomeSource {
    pub fn monthly(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            frequency: IncomeFrequency::Monthly,
        }
    }

    pub fn annual(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            frequency: IncomeFrequency::Annual,
        }
    }

    pub fn monthly_amount(&self) -> f64 {
        match self.frequency {
            IncomeFrequency::Monthly => self.amount,
            IncomeFrequency::Annual => self.amount / 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayment {
    pub name: String,
    pub payment: f64,
}

impl DebtPayment {
    pub fn new(name: impl Into<String>, payment: f64) -> Self {
        Self {
            name: name.into(),
            payment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Band for a ratio in percent: <=28 low, <=36 moderate, <=43 high
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio <= 28.0 {
            RiskLevel::Low
        } else if ratio <= 36.0 {
            RiskLevel::Moderate
        } else if ratio <= 43.0 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtToIncome {
    pub monthly_income: f64,
    pub monthly_debt: f64,
    /// Percent of gross monthly income
    pub ratio: f64,
    pub risk_level: RiskLevel,
}

/// Monthly debt payments as a percentage of monthly gross income
///
/// With no income, any debt is rated very high and the ratio is infinite;
/// no income and no debt is a ratio of zero.
pub fn debt_to_income(incomes: &[IncomeSource], debts: &[DebtPayment]) -> CalcResult<DebtToIncome> {
    for income in incomes {
        ensure_non_negative("income", income.amount)?;
    }
    for debt in debts {
        ensure_non_negative("payment", debt.payment)?;
    }

    let monthly_income: f64 = incomes.iter().map(IncomeSource::monthly_amount).sum();
    let monthly_debt: f64 = debts.iter().map(|d| d.payment).sum();

    let ratio = if monthly_income > 0.0 {
        monthly_debt / monthly_income * 100.0
    } else if monthly_debt > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    Ok(DebtToIncome {
        monthly_income,
        monthly_debt,
        ratio,
        risk_level: RiskLevel::from_ratio(ratio),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mixed_frequencies() {
        let incomes = vec![
            IncomeSource::annual("Salary", 72_000.0),
            IncomeSource::monthly("Side work", 1_000.0),
        ];
        let debts = vec![DebtPayment::new("Mortgage", 1_800.0), DebtPayment::new("Car", 400.0)];
        let dti = debt_to_income(&incomes, &debts).unwrap();

        assert_abs_diff_eq!(dti.monthly_income, 7_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(dti.ratio, 2_200.0 / 7_000.0 * 100.0, epsilon = 1e-9);
        assert_eq!(dti.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(RiskLevel::from_ratio(28.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_ratio(28.01), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_ratio(36.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_ratio(43.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_ratio(43.5), RiskLevel::VeryHigh);
    }

    #[test]
    fn test_zero_income() {
        let dti = debt_to_income(&[], &[DebtPayment::new("Card", 50.0)]).unwrap();
        assert!(dti.ratio.is_infinite());
        assert_eq!(dti.risk_level, RiskLevel::VeryHigh);

        let dti = debt_to_income(&[], &[]).unwrap();
        assert_eq!(dti.ratio, 0.0);
        assert_eq!(dti.risk_level, RiskLevel::Low);
    }
}
