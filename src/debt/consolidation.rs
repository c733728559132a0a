//! Comparison of paying debts separately versus one consolidation loan

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, CalcResult};
use crate::loan::{AmortizationEngine, LoanTerms, PayoffStatus, ScheduleIter, DEFAULT_PAYOFF_MONTH_CAP};
use super::ledger::Debt;

/// Month-end balance across the plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanPoint {
    pub month: u32,
    pub balance: f64,
}

/// Cost of one way of repaying the debts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentPlan {
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_payment: f64,
    pub months: u32,
    pub status: PayoffStatus,
    pub schedule: Vec<PlanPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationComparison {
    pub total_balance: f64,
    pub current: RepaymentPlan,
    pub consolidated: RepaymentPlan,
    /// Current total cost minus consolidated total cost; `None` unless both
    /// plans clear their balance, since a plan that never ends has no total cost
    pub savings: Option<f64>,
    /// Current monthly payment minus consolidated payment
    pub monthly_difference: f64,
}

/// Each debt on its own minimum payment versus a single amortized loan
///
/// The current plan runs every debt independently at its `minimum_payment`.
/// A debt whose minimum never covers its interest leaves the current plan
/// unfinished, and no savings figure is reported.
pub fn consolidation(debts: &[Debt], consolidation_rate: f64, term_years: u32) -> CalcResult<ConsolidationComparison> {
    ensure_non_negative("consolidation_rate", consolidation_rate)?;
    for debt in debts {
        debt.validate()?;
    }

    let total_balance: f64 = debts.iter().map(|d| d.balance).sum();
    let current = current_plan(debts);

    let terms = LoanTerms::new(total_balance, consolidation_rate, term_years);
    let loan = AmortizationEngine::default().amortize(&terms)?;
    let consolidated = RepaymentPlan {
        monthly_payment: loan.monthly_payment,
        total_interest: loan.total_interest,
        total_payment: total_balance + loan.total_interest,
        months: loan.periods_used,
        status: loan.status,
        schedule: loan
            .schedule
            .iter()
            .map(|p| PlanPoint {
                month: p.period,
                balance: p.remaining_balance,
            })
            .collect(),
    };

    Ok(ConsolidationComparison {
        total_balance,
        savings: (current.status.is_paid_off() && consolidated.status.is_paid_off())
            .then(|| current.total_payment - consolidated.total_payment),
        monthly_difference: current.monthly_payment - consolidated.monthly_payment,
        current,
        consolidated,
    })
}

fn current_plan(debts: &[Debt]) -> RepaymentPlan {
    let total_balance: f64 = debts.iter().map(|d| d.balance).sum();
    let mut balances: Vec<f64> = Vec::new();
    let mut total_interest = 0.0;
    let mut status = PayoffStatus::PaidOff;
    let mut stalled = Vec::new();

    for debt in debts {
        let mut iter = ScheduleIter::fixed_payment(
            debt.balance,
            debt.rate,
            debt.minimum_payment,
            DEFAULT_PAYOFF_MONTH_CAP,
        );
        for point in iter.by_ref() {
            let idx = point.period as usize - 1;
            if balances.len() <= idx {
                balances.resize(idx + 1, 0.0);
            }
            balances[idx] += point.remaining_balance;
            total_interest += point.interest;
        }
        if let Some(other) = iter.status().filter(|s| !s.is_paid_off()) {
            stalled.push((iter.periods_elapsed() as usize, iter.balance()));
            if status == PayoffStatus::PaidOff {
                status = other;
            }
        }
    }

    // An unpaid balance stays on the books for the rest of the plan
    for (from, left) in stalled {
        for balance in balances.iter_mut().skip(from) {
            *balance += left;
        }
    }

    RepaymentPlan {
        monthly_payment: debts.iter().map(|d| d.minimum_payment).sum(),
        total_interest,
        total_payment: total_balance + total_interest,
        months: balances.len() as u32,
        status,
        schedule: balances
            .into_iter()
            .enumerate()
            .map(|(i, balance)| PlanPoint {
                month: i as u32 + 1,
                balance,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn cards() -> Vec<Debt> {
        vec![
            Debt::new("a", "Card A", 5_000.0, 22.0, 150.0),
            Debt::new("b", "Card B", 3_000.0, 18.0, 90.0),
        ]
    }

    #[test]
    fn test_lower_rate_saves() {
        let cmp = consolidation(&cards(), 9.0, 5).unwrap();
        assert_eq!(cmp.total_balance, 8_000.0);
        assert_eq!(cmp.current.monthly_payment, 240.0);
        assert_eq!(cmp.current.status, PayoffStatus::PaidOff);
        assert_eq!(cmp.current.months, 52);
        assert_eq!(cmp.consolidated.months, 60);
        let savings = cmp.savings.unwrap();
        assert_abs_diff_eq!(savings, 2024.20, epsilon = 0.01);
        assert_abs_diff_eq!(
            savings,
            cmp.current.total_interest - cmp.consolidated.total_interest,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_current_schedule_ends_at_zero() {
        let cmp = consolidation(&cards(), 9.0, 5).unwrap();
        let last = cmp.current.schedule.last().unwrap();
        assert_eq!(last.month, cmp.current.months);
        assert_eq!(last.balance, 0.0);
        assert!(cmp.current.schedule[0].balance < 8_000.0);
    }

    #[test]
    fn test_minimum_below_interest() {
        let debts = vec![Debt::new("a", "Card", 10_000.0, 24.0, 150.0)];
        let cmp = consolidation(&debts, 9.0, 5).unwrap();
        assert_eq!(cmp.current.status, PayoffStatus::InsufficientPayment);
        assert_eq!(cmp.current.months, 0);
        assert_eq!(cmp.consolidated.status, PayoffStatus::PaidOff);
        assert_abs_diff_eq!(cmp.consolidated.total_interest, 2455.01, epsilon = 0.01);
        assert_eq!(cmp.savings, None);
        assert_abs_diff_eq!(cmp.monthly_difference, 150.0 - cmp.consolidated.monthly_payment, epsilon = 1e-9);
    }

    #[test]
    fn test_one_stalled_debt_withholds_savings() {
        let debts = vec![
            Debt::new("a", "Card A", 5_000.0, 22.0, 150.0),
            Debt::new("b", "Card B", 10_000.0, 24.0, 150.0),
        ];
        let cmp = consolidation(&debts, 9.0, 5).unwrap();
        assert_eq!(cmp.current.status, PayoffStatus::InsufficientPayment);
        assert_eq!(cmp.savings, None);
        // Card B's balance is carried for every month Card A is still paying
        assert!(cmp.current.schedule.iter().all(|p| p.balance >= 10_000.0));
    }
}
