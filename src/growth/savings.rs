//! Savings targets: goal timing, college funding and emergency reserves

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, CalcError, CalcResult};

/// Configuration for open-ended savings simulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingsConfig {
    /// Goal searches stop after this many months
    pub month_cap: u32,
    /// Annual inflation in percent, for real-value conversions
    pub inflation_rate: f64,
}

impl Default for SavingsConfig {
    fn default() -> Self {
        Self {
            month_cap: 600,
            inflation_rate: 2.0,
        }
    }
}

/// Outcome of a time-to-goal search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    Reached,
    /// Still short of the goal at the month cap
    CapReached,
    /// Balance cannot grow (no contribution and no return)
    Unreachable,
}

/// Balance at a month offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub month: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub months: u32,
    pub years: u32,
    pub remaining_months: u32,
    pub final_balance: f64,
    /// Starting savings plus every deposit made
    pub total_contributions: f64,
    pub status: GoalStatus,
    /// Balance every third month, for charting
    pub quarterly: Vec<BalancePoint>,
}

/// Month-end deposit after interest: `balance * (1 + r) + contribution`
fn month_end(balance: f64, monthly_rate: f64, contribution: f64) -> f64 {
    balance * (1.0 + monthly_rate) + contribution
}

/// Months of saving needed to reach `target`
pub fn savings_goal(
    config: &SavingsConfig,
    target: f64,
    current_savings: f64,
    monthly_contribution: f64,
    annual_return_pct: f64,
) -> CalcResult<SavingsGoal> {
    ensure_non_negative("target", target)?;
    ensure_non_negative("current_savings", current_savings)?;
    ensure_non_negative("monthly_contribution", monthly_contribution)?;
    ensure_non_negative("annual_return", annual_return_pct)?;

    let monthly_rate = annual_return_pct / 12.0 / 100.0;
    let mut balance = current_savings;
    let mut months = 0;
    let mut quarterly = vec![BalancePoint { month: 0, balance }];

    let status = loop {
        if balance >= target {
            break GoalStatus::Reached;
        }
        if months >= config.month_cap {
            log::warn!("savings goal of {target:.2} not reached within {} months", config.month_cap);
            break GoalStatus::CapReached;
        }
        let next = month_end(balance, monthly_rate, monthly_contribution);
        if next <= balance {
            break GoalStatus::Unreachable;
        }
        balance = next;
        months += 1;
        if months % 3 == 0 {
            quarterly.push(BalancePoint { month: months, balance });
        }
    };

    Ok(SavingsGoal {
        months,
        years: months / 12,
        remaining_months: months % 12,
        final_balance: balance,
        total_contributions: current_savings + monthly_contribution * months as f64,
        status,
        quarterly,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeSavings {
    pub total_cost: f64,
    pub projected_savings: f64,
    pub shortfall: f64,
    /// Extra monthly deposit that would close the shortfall
    pub additional_monthly_needed: f64,
    pub quarterly: Vec<BalancePoint>,
}

/// Project savings to the first year of college and compare with the total cost
pub fn college_savings(
    years_until_college: u32,
    yearly_cost: f64,
    years_of_college: u32,
    current_savings: f64,
    monthly_contribution: f64,
    annual_return_pct: f64,
) -> CalcResult<CollegeSavings> {
    ensure_non_negative("yearly_cost", yearly_cost)?;
    ensure_non_negative("current_savings", current_savings)?;
    ensure_non_negative("monthly_contribution", monthly_contribution)?;
    ensure_non_negative("annual_return", annual_return_pct)?;

    let monthly_rate = annual_return_pct / 12.0 / 100.0;
    let total_months = years_until_college * 12;

    let mut balance = current_savings;
    let mut quarterly = vec![BalancePoint { month: 0, balance }];
    for month in 1..=total_months {
        balance = month_end(balance, monthly_rate, monthly_contribution);
        if month % 3 == 0 {
            quarterly.push(BalancePoint { month, balance });
        }
    }

    let total_cost = yearly_cost * years_of_college as f64;
    let shortfall = (total_cost - balance).max(0.0);

    // Future value of one dollar deposited monthly over the horizon
    let deposit_factor = if total_months == 0 {
        0.0
    } else if monthly_rate == 0.0 {
        total_months as f64
    } else {
        ((1.0 + monthly_rate).powi(total_months as i32) - 1.0) / monthly_rate
    };
    let additional_monthly_needed = if shortfall > 0.0 && deposit_factor > 0.0 {
        shortfall / deposit_factor
    } else {
        0.0
    };

    Ok(CollegeSavings {
        total_cost,
        projected_savings: balance,
        shortfall,
        additional_monthly_needed,
        quarterly,
    })
}

/// Progress toward a cash reserve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveFund {
    pub target: f64,
    pub remaining: f64,
    /// `None` when the target is unmet and nothing is being contributed
    pub months_to_goal: Option<u32>,
    /// Percent of the target already saved, capped at 100
    pub progress: f64,
}

fn reserve_fund(target: f64, current_savings: f64, monthly_contribution: f64) -> ReserveFund {
    let remaining = (target - current_savings).max(0.0);
    let months_to_goal = if remaining <= 0.0 {
        Some(0)
    } else if monthly_contribution > 0.0 {
        Some((remaining / monthly_contribution).ceil() as u32)
    } else {
        None
    };
    let progress = if target > 0.0 {
        (current_savings / target * 100.0).min(100.0)
    } else {
        100.0
    };

    ReserveFund {
        target,
        remaining,
        months_to_goal,
        progress,
    }
}

/// Emergency fund sized as a number of months of expenses
pub fn emergency_fund(
    monthly_expenses: f64,
    months_of_coverage: u32,
    current_savings: f64,
    monthly_contribution: f64,
) -> CalcResult<ReserveFund> {
    ensure_non_negative("monthly_expenses", monthly_expenses)?;
    ensure_non_negative("current_savings", current_savings)?;
    ensure_non_negative("monthly_contribution", monthly_contribution)?;

    Ok(reserve_fund(
        monthly_expenses * months_of_coverage as f64,
        current_savings,
        monthly_contribution,
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainyDayFund {
    /// Months of expenses recommended for the risk level
    pub coverage_months: u32,
    pub monthly_surplus: f64,
    pub fund: ReserveFund,
}

/// Months of expenses to hold for an income risk level from 1 (stable) to 5 (volatile)
pub fn rainy_day_multiplier(risk_level: u8) -> CalcResult<u32> {
    match risk_level {
        1 => Ok(1),
        2 => Ok(2),
        3 => Ok(3),
        4 => Ok(4),
        5 => Ok(6),
        other => Err(CalcError::invalid("risk_level", format!("{other} is not between 1 and 5"))),
    }
}

pub fn rainy_day_fund(
    monthly_income: f64,
    monthly_expenses: f64,
    risk_level: u8,
    current_savings: f64,
    monthly_contribution: f64,
) -> CalcResult<RainyDayFund> {
    ensure_non_negative("monthly_income", monthly_income)?;
    ensure_non_negative("monthly_expenses", monthly_expenses)?;
    ensure_non_negative("current_savings", current_savings)?;
    ensure_non_negative("monthly_contribution", monthly_contribution)?;

    let coverage_months = rainy_day_multiplier(risk_level)?;
    Ok(RainyDayFund {
        coverage_months,
        monthly_surplus: monthly_income - monthly_expenses,
        fund: reserve_fund(
            monthly_expenses * coverage_months as f64,
            current_savings,
            monthly_contribution,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_goal_without_interest() {
        let result = savings_goal(&SavingsConfig::default(), 10_000.0, 1_000.0, 200.0, 0.0).unwrap();
        assert_eq!(result.status, GoalStatus::Reached);
        assert_eq!(result.months, 45);
        assert_eq!(result.years, 3);
        assert_eq!(result.remaining_months, 9);
        assert_abs_diff_eq!(result.total_contributions, 10_000.0, epsilon = 1e-9);
        assert_eq!(result.quarterly.last().unwrap().month, 45);
    }

    #[test]
    fn test_interest_shortens_goal() {
        let config = SavingsConfig::default();
        let flat = savings_goal(&config, 10_000.0, 1_000.0, 200.0, 0.0).unwrap();
        let growing = savings_goal(&config, 10_000.0, 1_000.0, 200.0, 7.0).unwrap();
        assert!(growing.months < flat.months);
    }

    #[test]
    fn test_goal_already_met() {
        let result = savings_goal(&SavingsConfig::default(), 500.0, 1_000.0, 0.0, 0.0).unwrap();
        assert_eq!(result.months, 0);
        assert_eq!(result.status, GoalStatus::Reached);
    }

    #[test]
    fn test_goal_unreachable() {
        let result = savings_goal(&SavingsConfig::default(), 500.0, 100.0, 0.0, 0.0).unwrap();
        assert_eq!(result.status, GoalStatus::Unreachable);
    }

    #[test]
    fn test_goal_cap() {
        let config = SavingsConfig {
            month_cap: 12,
            ..Default::default()
        };
        let result = savings_goal(&config, 1_000_000.0, 0.0, 10.0, 0.0).unwrap();
        assert_eq!(result.status, GoalStatus::CapReached);
        assert_eq!(result.months, 12);
    }

    #[test]
    fn test_college_shortfall() {
        let result = college_savings(10, 25_000.0, 4, 5_000.0, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(result.total_cost, 100_000.0);
        assert_abs_diff_eq!(result.projected_savings, 5_000.0);
        assert_abs_diff_eq!(result.shortfall, 95_000.0);
        assert_abs_diff_eq!(result.additional_monthly_needed, 95_000.0 / 120.0, epsilon = 1e-9);
        assert_eq!(result.quarterly.len(), 41);
    }

    #[test]
    fn test_college_fully_funded() {
        let result = college_savings(18, 10_000.0, 4, 10_000.0, 500.0, 6.0).unwrap();
        assert_eq!(result.shortfall, 0.0);
        assert_eq!(result.additional_monthly_needed, 0.0);
        assert!(result.projected_savings > 40_000.0);
    }

    #[test]
    fn test_emergency_fund() {
        let result = emergency_fund(3_000.0, 6, 4_000.0, 500.0).unwrap();
        assert_abs_diff_eq!(result.target, 18_000.0);
        assert_abs_diff_eq!(result.remaining, 14_000.0);
        assert_eq!(result.months_to_goal, Some(28));
        assert_abs_diff_eq!(result.progress, 4_000.0 / 18_000.0 * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_emergency_fund_without_contribution() {
        let result = emergency_fund(3_000.0, 3, 0.0, 0.0).unwrap();
        assert_eq!(result.months_to_goal, None);
    }

    #[test]
    fn test_rainy_day_levels() {
        let result = rainy_day_fund(5_000.0, 3_500.0, 5, 2_000.0, 300.0).unwrap();
        assert_eq!(result.coverage_months, 6);
        assert_abs_diff_eq!(result.fund.target, 21_000.0);
        assert_abs_diff_eq!(result.monthly_surplus, 1_500.0);
        assert_eq!(result.fund.months_to_goal, Some(64));
        assert!(rainy_day_fund(5_000.0, 3_500.0, 0, 0.0, 0.0).is_err());
    }
}
