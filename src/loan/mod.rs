//! Loan amortization and fixed-payment payoff schedules

mod schedule;
mod amortization;
mod credit_card;

pub use schedule::{AmortizationPoint, PayoffStatus, ScheduleIter, YearlySnapshot, yearly_snapshots, BALANCE_EPSILON};
pub use amortization::{
    AmortizationEngine, AmortizationConfig, AmortizationResult, LoanTerms,
    amortize, annuity_payment, annuity_present_value, DEFAULT_CAP_FACTOR,
};
pub use credit_card::{credit_card_payoff, FixedPaymentPayoff, DEFAULT_PAYOFF_MONTH_CAP};
