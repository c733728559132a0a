//! Contribution-based compound growth projection

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, CalcError, CalcResult};
use super::savings::SavingsConfig;

/// How often interest compounds (and contributions land)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundingFrequency {
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl CompoundingFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Annually => 1,
        }
    }
}

/// Deposits made into a growing balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionSchedule {
    /// Deposited at the start of every compounding period
    pub periodic_contribution: f64,
    /// Percent increase applied to the contribution at each year boundary
    #[serde(default)]
    pub annual_increase_rate: f64,
    #[serde(default)]
    pub frequency: CompoundingFrequency,
}

impl ContributionSchedule {
    pub fn none(frequency: CompoundingFrequency) -> Self {
        Self {
            periodic_contribution: 0.0,
            annual_increase_rate: 0.0,
            frequency,
        }
    }

    /// A monthly deposit spread evenly over the compounding periods
    pub fn from_monthly(monthly_contribution: f64, frequency: CompoundingFrequency) -> Self {
        Self {
            periodic_contribution: monthly_contribution * 12.0 / frequency.periods_per_year() as f64,
            annual_increase_rate: 0.0,
            frequency,
        }
    }

    pub fn escalating(mut self, annual_increase_rate: f64) -> Self {
        self.annual_increase_rate = annual_increase_rate;
        self
    }
}

/// Immutable projection inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthInputs {
    pub principal: f64,
    pub contributions: ContributionSchedule,
    /// Annual rate in percent
    pub annual_rate: f64,
    pub years: u32,
}

impl GrowthInputs {
    fn validate(&self) -> CalcResult<()> {
        ensure_non_negative("principal", self.principal)?;
        ensure_non_negative("periodic_contribution", self.contributions.periodic_contribution)?;
        if !self.contributions.annual_increase_rate.is_finite() {
            return Err(CalcError::invalid("annual_increase_rate", "must be a finite number"));
        }
        if !self.annual_rate.is_finite() || self.annual_rate <= -100.0 {
            return Err(CalcError::invalid("annual_rate", "must be a finite rate above -100%"));
        }
        Ok(())
    }
}

/// One compounding period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub period: u32,
    pub contribution: f64,
    pub interest: f64,
    pub balance: f64,
    pub total_contributions: f64,
}

/// End-of-year balance split into contributions and growth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthYear {
    pub year: u32,
    pub balance: f64,
    pub contributions: f64,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthResult {
    pub final_balance: f64,
    /// Includes the starting principal
    pub total_contributions: f64,
    pub total_interest: f64,
    pub schedule: Vec<GrowthPoint>,
    pub yearly: Vec<GrowthYear>,
}

/// Compound growth engine
///
/// Each period: `balance = (balance + contribution) * (1 + annual_rate / periods_per_year)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundGrowthEngine;

impl CompoundGrowthEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn project(&self, inputs: &GrowthInputs) -> CalcResult<GrowthResult> {
        inputs.validate()?;

        let per_year = inputs.contributions.frequency.periods_per_year();
        let periodic_rate = inputs.annual_rate / 100.0 / per_year as f64;
        let escalation = 1.0 + inputs.contributions.annual_increase_rate / 100.0;
        let total_periods = inputs.years * per_year;

        let mut balance = inputs.principal;
        let mut total_contributions = inputs.principal;
        let mut contribution = inputs.contributions.periodic_contribution;
        let mut schedule = Vec::with_capacity(total_periods as usize);
        let mut yearly = Vec::with_capacity(inputs.years as usize);

        for period in 1..=total_periods {
            if period > 1 && (period - 1) % per_year == 0 {
                contribution *= escalation;
            }

            let funded = balance + contribution;
            let interest = funded * periodic_rate;
            balance = funded + interest;
            total_contributions += contribution;

            schedule.push(GrowthPoint {
                period,
                contribution,
                interest,
                balance,
                total_contributions,
            });

            if period % per_year == 0 {
                yearly.push(GrowthYear {
                    year: period / per_year,
                    balance,
                    contributions: total_contributions,
                    interest: balance - total_contributions,
                });
            }
        }

        log::debug!(
            "projected {:.2} over {}y at {}%: final {:.2}",
            inputs.principal,
            inputs.years,
            inputs.annual_rate,
            balance
        );

        Ok(GrowthResult {
            final_balance: balance,
            total_contributions,
            total_interest: balance - total_contributions,
            schedule,
            yearly,
        })
    }
}

/// Compound interest with a monthly deposit folded into each compounding period
pub fn compound_interest(
    principal: f64,
    monthly_contribution: f64,
    annual_rate_pct: f64,
    years: u32,
    frequency: CompoundingFrequency,
) -> CalcResult<GrowthResult> {
    CompoundGrowthEngine.project(&GrowthInputs {
        principal,
        contributions: ContributionSchedule::from_monthly(monthly_contribution, frequency),
        annual_rate: annual_rate_pct,
        years,
    })
}

/// Monthly investing with the deposit raised by a percentage each year
pub fn investment_growth(
    initial_balance: f64,
    monthly_contribution: f64,
    annual_return_pct: f64,
    years: u32,
    annual_contribution_increase_pct: f64,
) -> CalcResult<GrowthResult> {
    CompoundGrowthEngine.project(&GrowthInputs {
        principal: initial_balance,
        contributions: ContributionSchedule::from_monthly(monthly_contribution, CompoundingFrequency::Monthly)
            .escalating(annual_contribution_increase_pct),
        annual_rate: annual_return_pct,
        years,
    })
}

/// Value of `amount` in today's money after `years` of inflation
pub fn inflation_adjusted(amount: f64, inflation_rate_pct: f64, years: u32) -> f64 {
    amount / (1.0 + inflation_rate_pct / 100.0).powi(years as i32)
}

/// Projected balance next to its value in today's money
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureValue {
    pub growth: GrowthResult,
    /// Annual inflation in percent
    pub inflation_rate: f64,
    pub inflation_adjusted_value: f64,
}

/// Project `inputs` and deflate the final balance at the configured inflation rate
pub fn future_value(inputs: &GrowthInputs, config: &SavingsConfig) -> CalcResult<FutureValue> {
    let inflation_rate = ensure_finite("inflation_rate", config.inflation_rate)?;
    if inflation_rate <= -100.0 {
        return Err(CalcError::invalid("inflation_rate", "must be above -100%"));
    }
    let growth = CompoundGrowthEngine.project(inputs)?;
    let inflation_adjusted_value = inflation_adjusted(growth.final_balance, inflation_rate, inputs.years);
    Ok(FutureValue {
        growth,
        inflation_rate,
        inflation_adjusted_value,
    })
}

/// Doubling-time estimate next to the monthly-compounded path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOf72 {
    /// `72 / rate`
    pub years_to_double: f64,
    /// Doubling time under monthly compounding
    pub exact_years: f64,
    pub doubled_amount: f64,
    /// (year, balance) at each full year until the estimate is reached
    pub schedule: Vec<(u32, f64)>,
}

pub fn rule_of_72(principal: f64, annual_rate_pct: f64) -> CalcResult<RuleOf72> {
    ensure_non_negative("principal", principal)?;
    ensure_positive("annual_rate", annual_rate_pct)?;

    let years_to_double = 72.0 / annual_rate_pct;
    let monthly_rate = annual_rate_pct / 12.0 / 100.0;
    let exact_years = 2f64.ln() / (1.0 + monthly_rate).ln() / 12.0;
    let doubled_amount = principal * 2.0;

    let month_limit = (years_to_double * 12.0).ceil() as u32;
    let mut schedule = Vec::new();
    let mut balance = principal;
    let mut month = 0;
    while balance < doubled_amount && month < month_limit {
        month += 1;
        balance *= 1.0 + monthly_rate;
        if month % 12 == 0 {
            schedule.push((month / 12, balance));
        }
    }

    Ok(RuleOf72 {
        years_to_double,
        exact_years,
        doubled_amount,
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    #[test]
    fn test_no_contribution_is_simple_compounding() {
        let result = compound_interest(10_000.0, 0.0, 6.0, 10, CompoundingFrequency::Monthly).unwrap();
        let expected = 10_000.0 * (1.0f64 + 0.005).powi(120);
        assert_relative_eq!(result.final_balance, expected, max_relative = 1e-12);
        assert_abs_diff_eq!(result.total_contributions, 10_000.0);
    }

    #[test]
    fn test_future_value_deflates_at_configured_rate() {
        let inputs = GrowthInputs {
            principal: 10_000.0,
            contributions: ContributionSchedule::none(CompoundingFrequency::Annually),
            annual_rate: 7.0,
            years: 10,
        };
        let fv = future_value(&inputs, &SavingsConfig::default()).unwrap();
        assert_abs_diff_eq!(fv.growth.final_balance, 19_671.51, epsilon = 0.01);
        assert_eq!(fv.inflation_rate, 2.0);
        assert_abs_diff_eq!(fv.inflation_adjusted_value, 16_137.49, epsilon = 0.01);

        let flat = SavingsConfig { inflation_rate: 0.0, ..Default::default() };
        let fv = future_value(&inputs, &flat).unwrap();
        assert_eq!(fv.inflation_adjusted_value, fv.growth.final_balance);

        let broken = SavingsConfig { inflation_rate: -100.0, ..Default::default() };
        assert!(future_value(&inputs, &broken).is_err());
    }

    #[test]
    fn test_quarterly_contribution_scaling() {
        let result = compound_interest(0.0, 100.0, 0.0, 1, CompoundingFrequency::Quarterly).unwrap();
        assert_eq!(result.schedule.len(), 4);
        assert_abs_diff_eq!(result.schedule[0].contribution, 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.final_balance, 1_200.0, epsilon = 1e-9);
        assert_eq!(result.total_interest, 0.0);
    }

    #[test]
    fn test_annuity_due_growth() {
        // Deposits at the start of each period earn that period's interest
        let result = compound_interest(0.0, 100.0, 12.0, 1, CompoundingFrequency::Monthly).unwrap();
        let r: f64 = 0.01;
        let expected = 100.0 * ((1.0 + r).powi(12) - 1.0) / r * (1.0 + r);
        assert_relative_eq!(result.final_balance, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_escalation_at_year_boundary() {
        let result = investment_growth(0.0, 100.0, 0.0, 2, 10.0).unwrap();
        assert_abs_diff_eq!(result.schedule[11].contribution, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.schedule[12].contribution, 110.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.final_balance, 1_200.0 + 1_320.0, epsilon = 1e-9);
        assert_eq!(result.yearly.len(), 2);
    }

    #[test]
    fn test_yearly_interest_split() {
        let result = compound_interest(1_000.0, 50.0, 5.0, 3, CompoundingFrequency::Annually).unwrap();
        let last = result.yearly.last().unwrap();
        assert_abs_diff_eq!(last.contributions, 1_000.0 + 3.0 * 600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(last.interest, result.total_interest, epsilon = 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let a = investment_growth(5_000.0, 250.0, 7.0, 20, 3.0).unwrap();
        let b = investment_growth(5_000.0, 250.0, 7.0, 20, 3.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(compound_interest(-1.0, 0.0, 5.0, 1, CompoundingFrequency::Monthly).is_err());
        assert!(compound_interest(1.0, -5.0, 5.0, 1, CompoundingFrequency::Monthly).is_err());
        assert!(compound_interest(1.0, 0.0, f64::NAN, 1, CompoundingFrequency::Monthly).is_err());
    }

    #[test]
    fn test_inflation_adjustment() {
        assert_abs_diff_eq!(inflation_adjusted(1_020.0, 2.0, 1), 1_000.0, epsilon = 1e-9);
        assert_eq!(inflation_adjusted(500.0, 2.0, 0), 500.0);
    }

    #[test]
    fn test_rule_of_72() {
        let result = rule_of_72(1_000.0, 8.0).unwrap();
        assert_abs_diff_eq!(result.years_to_double, 9.0);
        assert!((result.exact_years - 8.69).abs() < 0.01);
        assert_eq!(result.schedule.len(), 8);
        assert!(rule_of_72(1_000.0, 0.0).is_err());
    }

    proptest! {
        #[test]
        fn zero_contribution_matches_closed_form(
            principal in 0.0f64..1_000_000.0,
            rate in 0.0f64..20.0,
            years in 0u32..40,
        ) {
            let result = compound_interest(principal, 0.0, rate, years, CompoundingFrequency::Annually).unwrap();
            let expected = principal * (1.0 + rate / 100.0).powi(years as i32);
            prop_assert!((result.final_balance - expected).abs() <= expected.abs() * 1e-9 + 1e-9);
        }
    }
}
