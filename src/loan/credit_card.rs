//! Fixed-payment payoff of a revolving balance

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, CalcResult};
use super::schedule::{AmortizationPoint, PayoffStatus, ScheduleIter};

/// Default month ceiling for open-ended payoffs (50 years)
pub const DEFAULT_PAYOFF_MONTH_CAP: u32 = 600;

/// Result of paying a balance down at a fixed monthly amount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedPaymentPayoff {
    pub months: u32,
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub remaining_balance: f64,
    pub status: PayoffStatus,
    pub schedule: Vec<AmortizationPoint>,
}

impl FixedPaymentPayoff {
    /// Every sixth month, the sampling used for payoff charts
    pub fn semiannual_points(&self) -> impl Iterator<Item = &AmortizationPoint> {
        self.schedule.iter().filter(|p| p.period % 6 == 0)
    }
}

/// Pay off `balance` at `annual_rate_pct` with a fixed monthly payment
pub fn credit_card_payoff(
    balance: f64,
    annual_rate_pct: f64,
    monthly_payment: f64,
    month_cap: u32,
) -> CalcResult<FixedPaymentPayoff> {
    ensure_non_negative("balance", balance)?;
    ensure_non_negative("annual_rate", annual_rate_pct)?;
    ensure_non_negative("monthly_payment", monthly_payment)?;

    let mut iter = ScheduleIter::fixed_payment(balance, annual_rate_pct, monthly_payment, month_cap);
    let schedule: Vec<AmortizationPoint> = iter.by_ref().collect();
    let status = iter.status().unwrap_or(PayoffStatus::CapReached);

    Ok(FixedPaymentPayoff {
        months: schedule.len() as u32,
        monthly_payment,
        total_interest: schedule.last().map(|p| p.cumulative_interest).unwrap_or(0.0),
        remaining_balance: iter.balance(),
        status,
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_typical_card() {
        let result = credit_card_payoff(5_000.0, 18.0, 200.0, DEFAULT_PAYOFF_MONTH_CAP).unwrap();
        assert_eq!(result.status, PayoffStatus::PaidOff);
        assert_eq!(result.months, 32);
        assert!(result.total_interest > 1_200.0 && result.total_interest < 1_400.0);
        assert_abs_diff_eq!(result.remaining_balance, 0.0);
    }

    #[test]
    fn test_payment_below_interest() {
        let result = credit_card_payoff(10_000.0, 24.0, 150.0, DEFAULT_PAYOFF_MONTH_CAP).unwrap();
        assert_eq!(result.status, PayoffStatus::InsufficientPayment);
        assert_eq!(result.months, 0);
        assert_eq!(result.remaining_balance, 10_000.0);
    }

    #[test]
    fn test_semiannual_sampling() {
        let result = credit_card_payoff(1_200.0, 0.0, 50.0, DEFAULT_PAYOFF_MONTH_CAP).unwrap();
        let periods: Vec<u32> = result.semiannual_points().map(|p| p.period).collect();
        assert_eq!(periods, vec![6, 12, 18, 24]);
    }
}
