//! Loan amortization engine: annuity payment plus period-by-period schedule

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, CalcError, CalcResult};
use super::schedule::{yearly_snapshots, AmortizationPoint, PayoffStatus, ScheduleIter, YearlySnapshot};

/// Default multiple of the nominal term allowed before a schedule is cut off
pub const DEFAULT_CAP_FACTOR: f64 = 1.5;

/// Immutable loan inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: f64,
    /// Annual interest rate in percent (5.5 = 5.5%)
    pub annual_rate: f64,
    pub term_years: u32,
    /// Added to the scheduled payment every month; may be negative
    #[serde(default)]
    pub extra_payment: f64,
    #[serde(default)]
    pub first_payment_date: Option<NaiveDate>,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate: f64, term_years: u32) -> Self {
        Self {
            principal,
            annual_rate,
            term_years,
            extra_payment: 0.0,
            first_payment_date: None,
        }
    }

    pub fn with_extra_payment(mut self, extra_payment: f64) -> Self {
        self.extra_payment = extra_payment;
        self
    }

    pub fn starting(mut self, first_payment_date: NaiveDate) -> Self {
        self.first_payment_date = Some(first_payment_date);
        self
    }

    /// Number of scheduled monthly payments
    pub fn term_months(&self) -> u32 {
        self.term_years * 12
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0 / 100.0
    }

    pub fn validate(&self) -> CalcResult<()> {
        ensure_non_negative("principal", self.principal)?;
        ensure_non_negative("annual_rate", self.annual_rate)?;
        ensure_finite("extra_payment", self.extra_payment)?;
        if self.term_years == 0 {
            return Err(CalcError::invalid("term_years", "term must be at least one year"));
        }
        Ok(())
    }
}

/// Configuration for amortization runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmortizationConfig {
    /// Schedules stop after `ceil(term_months * cap_factor)` periods
    pub cap_factor: f64,
}

impl Default for AmortizationConfig {
    fn default() -> Self {
        Self {
            cap_factor: DEFAULT_CAP_FACTOR,
        }
    }
}

/// Standard annuity payment `P*r(1+r)^n / ((1+r)^n - 1)` at a monthly rate
///
/// A zero rate reduces to `P/n`.
pub fn annuity_payment(principal: f64, annual_rate_pct: f64, periods: u32) -> f64 {
    if periods == 0 {
        return principal;
    }
    let r = annual_rate_pct / 12.0 / 100.0;
    if r == 0.0 {
        return principal / periods as f64;
    }
    let growth = (1.0 + r).powi(periods as i32);
    principal * r * growth / (growth - 1.0)
}

/// Present value of `periods` monthly payments, the inverse of `annuity_payment`
pub fn annuity_present_value(payment: f64, annual_rate_pct: f64, periods: u32) -> f64 {
    let r = annual_rate_pct / 12.0 / 100.0;
    if r == 0.0 {
        return payment * periods as f64;
    }
    payment * (1.0 - (1.0 + r).powi(-(periods as i32))) / r
}

/// Complete amortization output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub principal: f64,
    /// Scheduled payment, excluding any extra payment
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_paid: f64,
    pub periods_used: u32,
    pub status: PayoffStatus,
    pub schedule: Vec<AmortizationPoint>,
    pub yearly: Vec<YearlySnapshot>,
}

impl AmortizationResult {
    /// Balance after the last period run
    pub fn final_balance(&self) -> f64 {
        self.schedule
            .last()
            .map(|p| p.remaining_balance)
            .unwrap_or(self.principal)
    }

    /// Outstanding balance at the end of `year`, keyed by year number
    ///
    /// Year 0 is the original principal. Years past the end of the schedule
    /// carry the final balance (zero once paid off).
    pub fn balance_at_year(&self, year: u32) -> f64 {
        if year == 0 {
            return self.principal;
        }
        match self.yearly.iter().find(|s| s.year == year) {
            Some(snapshot) => snapshot.balance,
            None => match self.yearly.last() {
                Some(last) if year > last.year => last.balance,
                _ => self.final_balance(),
            },
        }
    }

    /// Interest paid through the end of `year`
    pub fn interest_through_year(&self, year: u32) -> f64 {
        let last_period = year * 12;
        self.schedule
            .iter()
            .take_while(|p| p.period <= last_period)
            .last()
            .map(|p| p.cumulative_interest)
            .unwrap_or(0.0)
    }

    /// Total paid during periods `12 * (year - 1) + 1 ..= 12 * year`
    pub fn payments_in_year(&self, year: u32) -> f64 {
        if year == 0 {
            return 0.0;
        }
        let first = (year - 1) * 12 + 1;
        let last = year * 12;
        self.schedule
            .iter()
            .filter(|p| p.period >= first && p.period <= last)
            .map(|p| p.payment)
            .sum()
    }
}

/// Amortization engine
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: AmortizationConfig,
}

impl AmortizationEngine {
    pub fn new(config: AmortizationConfig) -> Self {
        Self { config }
    }

    /// Period cap for a loan term
    pub fn max_periods(&self, terms: &LoanTerms) -> u32 {
        let factor = self.config.cap_factor.max(1.0);
        (terms.term_months() as f64 * factor).ceil() as u32
    }

    /// Lazy schedule for the loan, including any extra payment
    pub fn schedule(&self, terms: &LoanTerms) -> CalcResult<ScheduleIter> {
        terms.validate()?;
        let payment = annuity_payment(terms.principal, terms.annual_rate, terms.term_months());
        Ok(ScheduleIter::new(
            terms.principal,
            terms.monthly_rate(),
            payment + terms.extra_payment,
            self.max_periods(terms),
        )
        .with_first_payment(terms.first_payment_date))
    }

    /// Run the full schedule and summarize it
    pub fn amortize(&self, terms: &LoanTerms) -> CalcResult<AmortizationResult> {
        let monthly_payment = annuity_payment(terms.principal, terms.annual_rate, terms.term_months());
        let mut iter = self.schedule(terms)?;
        let schedule: Vec<AmortizationPoint> = iter.by_ref().collect();
        let status = iter.status().unwrap_or(PayoffStatus::CapReached);

        let total_interest = schedule.last().map(|p| p.cumulative_interest).unwrap_or(0.0);
        let total_paid: f64 = schedule.iter().map(|p| p.payment).sum();
        let yearly = yearly_snapshots(&schedule, terms.principal);

        log::debug!(
            "amortized {:.2} at {}% over {}y: payment {:.2}, {} periods, {:?}",
            terms.principal,
            terms.annual_rate,
            terms.term_years,
            monthly_payment,
            schedule.len(),
            status
        );

        Ok(AmortizationResult {
            principal: terms.principal,
            monthly_payment,
            total_interest,
            total_paid,
            periods_used: schedule.len() as u32,
            status,
            schedule,
            yearly,
        })
    }
}

/// Amortize with the default configuration
pub fn amortize(
    principal: f64,
    annual_rate_pct: f64,
    term_years: u32,
    extra_payment: f64,
) -> CalcResult<AmortizationResult> {
    let terms = LoanTerms::new(principal, annual_rate_pct, term_years).with_extra_payment(extra_payment);
    AmortizationEngine::default().amortize(&terms)
}
