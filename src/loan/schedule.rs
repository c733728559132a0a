//! Period-by-period schedule generation for amortizing balances
//!
//! `ScheduleIter` is the shared kernel behind loan amortization, fixed-payment
//! payoff (credit cards, existing loans) and the mortgage composites. It is a
//! finite iterator: it always ends, and once it has ended `status()` reports why.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Balances at or below this are treated as paid off
pub const BALANCE_EPSILON: f64 = 1e-6;

/// Why a schedule stopped producing periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoffStatus {
    /// Balance reached zero
    PaidOff,
    /// Period cap hit while the balance was still shrinking
    CapReached,
    /// A period's payment did not exceed its interest, so the balance can never fall
    InsufficientPayment,
}

impl PayoffStatus {
    pub fn is_paid_off(&self) -> bool {
        matches!(self, PayoffStatus::PaidOff)
    }
}

/// One period of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationPoint {
    /// Period number (1-indexed)
    pub period: u32,
    /// Total paid this period (interest + principal)
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub remaining_balance: f64,
    pub cumulative_interest: f64,
    /// Payment date, when the loan has a first payment date
    pub date: Option<NaiveDate>,
}

/// End-of-year view of a schedule, used for charting and year-keyed joins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySnapshot {
    /// Year number (1-indexed); a partial final year rounds up
    pub year: u32,
    pub balance: f64,
    pub cumulative_interest: f64,
    pub principal_paid: f64,
}

/// Lazy, bounded schedule of periodic payments against a balance
///
/// Each period accrues interest on the opening balance first, then applies
/// the remainder of the payment to principal. Cloning the iterator (or calling
/// `restart`) yields an independent sequence from the same starting point.
#[derive(Debug, Clone)]
pub struct ScheduleIter {
    opening_balance: f64,
    periodic_rate: f64,
    payment: f64,
    max_periods: u32,
    first_payment: Option<NaiveDate>,

    period: u32,
    balance: f64,
    cumulative_interest: f64,
    status: Option<PayoffStatus>,
}

impl ScheduleIter {
    /// Create a schedule for `balance` repaid at `payment` per period
    pub fn new(balance: f64, periodic_rate: f64, payment: f64, max_periods: u32) -> Self {
        Self {
            opening_balance: balance,
            periodic_rate,
            payment,
            max_periods,
            first_payment: None,
            period: 0,
            balance,
            cumulative_interest: 0.0,
            status: None,
        }
    }

    /// Fixed monthly payment against an annual percentage rate
    pub fn fixed_payment(balance: f64, annual_rate_pct: f64, payment: f64, max_periods: u32) -> Self {
        Self::new(balance, annual_rate_pct / 12.0 / 100.0, payment, max_periods)
    }

    /// Date each period, starting from the first payment date
    pub fn with_first_payment(mut self, date: Option<NaiveDate>) -> Self {
        self.first_payment = date;
        self
    }

    /// Fresh iterator over the same schedule
    pub fn restart(&self) -> Self {
        Self::new(self.opening_balance, self.periodic_rate, self.payment, self.max_periods)
            .with_first_payment(self.first_payment)
    }

    /// Terminal status, available once the iterator is exhausted
    pub fn status(&self) -> Option<PayoffStatus> {
        self.status
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn periods_elapsed(&self) -> u32 {
        self.period
    }

    pub fn payment(&self) -> f64 {
        self.payment
    }

    fn finish(&mut self, status: PayoffStatus) -> Option<AmortizationPoint> {
        match status {
            PayoffStatus::PaidOff => {}
            PayoffStatus::CapReached => log::warn!(
                "schedule stopped at {} period cap with {:.2} outstanding",
                self.max_periods,
                self.balance
            ),
            PayoffStatus::InsufficientPayment => log::warn!(
                "payment {:.2} does not cover interest on {:.2} after {} periods",
                self.payment,
                self.balance,
                self.period
            ),
        }
        self.status = Some(status);
        None
    }
}

impl Iterator for ScheduleIter {
    type Item = AmortizationPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.status.is_some() {
            return None;
        }
        if self.balance <= BALANCE_EPSILON {
            self.balance = 0.0;
            return self.finish(PayoffStatus::PaidOff);
        }
        if self.period >= self.max_periods {
            return self.finish(PayoffStatus::CapReached);
        }

        let interest = self.balance * self.periodic_rate;
        if self.payment <= interest {
            return self.finish(PayoffStatus::InsufficientPayment);
        }

        let principal = (self.payment - interest).min(self.balance);
        self.balance -= principal;
        if self.balance <= BALANCE_EPSILON {
            self.balance = 0.0;
        }
        self.cumulative_interest += interest;
        self.period += 1;

        let date = self
            .first_payment
            .and_then(|d| d.checked_add_months(Months::new(self.period - 1)));

        Some(AmortizationPoint {
            period: self.period,
            payment: interest + principal,
            interest,
            principal,
            remaining_balance: self.balance,
            cumulative_interest: self.cumulative_interest,
            date,
        })
    }
}

/// Collapse a monthly schedule into end-of-year snapshots
///
/// Every 12th period is kept, plus the final period when it ends mid-year.
pub fn yearly_snapshots(points: &[AmortizationPoint], opening_balance: f64) -> Vec<YearlySnapshot> {
    let mut snapshots: Vec<YearlySnapshot> = points
        .iter()
        .filter(|p| p.period % 12 == 0)
        .map(|p| snapshot(p, opening_balance))
        .collect();

    if let Some(last) = points.last() {
        if last.period % 12 != 0 {
            snapshots.push(snapshot(last, opening_balance));
        }
    }

    snapshots
}

fn snapshot(point: &AmortizationPoint, opening_balance: f64) -> YearlySnapshot {
    YearlySnapshot {
        year: point.period.div_ceil(12),
        balance: point.remaining_balance,
        cumulative_interest: point.cumulative_interest,
        principal_paid: opening_balance - point.remaining_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_rate_schedule() {
        let points: Vec<_> = ScheduleIter::new(1200.0, 0.0, 100.0, 100).collect();
        assert_eq!(points.len(), 12);
        assert!(points.iter().all(|p| p.interest == 0.0));
        assert_eq!(points.last().unwrap().remaining_balance, 0.0);
    }

    #[test]
    fn test_status_reported_after_exhaustion() {
        let mut iter = ScheduleIter::new(1000.0, 0.01, 500.0, 100);
        assert_eq!(iter.status(), None);
        let count = iter.by_ref().count();
        assert_eq!(count, 3);
        assert_eq!(iter.status(), Some(PayoffStatus::PaidOff));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_insufficient_payment_stops_immediately() {
        // 1% monthly interest on 10k is 100; paying exactly 100 never reduces it
        let mut iter = ScheduleIter::new(10_000.0, 0.01, 100.0, 600);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.status(), Some(PayoffStatus::InsufficientPayment));
        assert_eq!(iter.balance(), 10_000.0);
    }

    #[test]
    fn test_cap_reached() {
        let mut iter = ScheduleIter::new(10_000.0, 0.0, 100.0, 10);
        assert_eq!(iter.by_ref().count(), 10);
        assert_eq!(iter.status(), Some(PayoffStatus::CapReached));
        assert_abs_diff_eq!(iter.balance(), 9_000.0);
    }

    #[test]
    fn test_restart_is_independent() {
        let mut iter = ScheduleIter::new(1000.0, 0.005, 100.0, 50);
        let first: Vec<_> = iter.by_ref().take(3).collect();
        let replay: Vec<_> = iter.restart().take(3).collect();
        assert_eq!(first, replay);
    }

    #[test]
    fn test_balance_never_increases() {
        let points: Vec<_> = ScheduleIter::fixed_payment(5000.0, 24.0, 150.0, 600).collect();
        let mut prior = 5000.0;
        for p in &points {
            assert!(p.remaining_balance <= prior);
            assert!(p.remaining_balance >= 0.0);
            prior = p.remaining_balance;
        }
    }

    #[test]
    fn test_dates_advance_monthly() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let points: Vec<_> = ScheduleIter::new(300.0, 0.0, 100.0, 10)
            .with_first_payment(Some(start))
            .collect();
        assert_eq!(points[0].date, Some(start));
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(points[2].date, NaiveDate::from_ymd_opt(2024, 3, 31));
    }

    #[test]
    fn test_yearly_snapshots_include_partial_year() {
        let points: Vec<_> = ScheduleIter::new(1800.0, 0.0, 100.0, 100).collect();
        let years = yearly_snapshots(&points, 1800.0);
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 1);
        assert_abs_diff_eq!(years[0].balance, 600.0);
        assert_eq!(years[1].year, 2);
        assert_abs_diff_eq!(years[1].principal_paid, 1800.0);
    }
}
