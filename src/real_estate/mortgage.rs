//! Mortgage payment (PITI), affordability and refinance comparisons

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::loan::{
    annuity_present_value, yearly_snapshots, AmortizationEngine, AmortizationPoint, AmortizationResult,
    LoanTerms, PayoffStatus, ScheduleIter, YearlySnapshot,
};

/// Share of the maximum housing payment assumed to service the loan
pub const LOAN_SHARE_OF_PAYMENT: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageInputs {
    pub home_price: f64,
    pub down_payment: f64,
    /// Annual rate in percent
    pub annual_rate: f64,
    pub term_years: u32,
    pub annual_property_tax: f64,
    pub annual_insurance: f64,
    pub annual_pmi: f64,
}

impl MortgageInputs {
    pub fn new(home_price: f64, down_payment: f64, annual_rate: f64, term_years: u32) -> Self {
        Self {
            home_price,
            down_payment,
            annual_rate,
            term_years,
            annual_property_tax: 0.0,
            annual_insurance: 0.0,
            annual_pmi: 0.0,
        }
    }

    pub fn with_escrow(mut self, annual_property_tax: f64, annual_insurance: f64, annual_pmi: f64) -> Self {
        self.annual_property_tax = annual_property_tax;
        self.annual_insurance = annual_insurance;
        self.annual_pmi = annual_pmi;
        self
    }

    pub fn loan_amount(&self) -> f64 {
        self.home_price - self.down_payment
    }

    pub fn validate(&self) -> CalcResult<()> {
        ensure_positive("home_price", self.home_price)?;
        ensure_non_negative("down_payment", self.down_payment)?;
        if self.down_payment > self.home_price {
            return Err(CalcError::invalid("down_payment", "exceeds the home price"));
        }
        ensure_non_negative("annual_property_tax", self.annual_property_tax)?;
        ensure_non_negative("annual_insurance", self.annual_insurance)?;
        ensure_non_negative("annual_pmi", self.annual_pmi)?;
        Ok(())
    }
}

/// Monthly PITI payment and loan summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageBreakdown {
    pub loan_amount: f64,
    pub monthly_principal_and_interest: f64,
    pub monthly_tax: f64,
    pub monthly_insurance: f64,
    pub monthly_pmi: f64,
    pub monthly_total: f64,
    pub total_interest: f64,
    /// Loan amount plus total interest
    pub total_cost: f64,
    /// Loan-to-value in percent
    pub loan_to_value: f64,
    pub down_payment_percent: f64,
    pub amortization: AmortizationResult,
}

impl MortgageBreakdown {
    pub fn yearly(&self) -> &[YearlySnapshot] {
        &self.amortization.yearly
    }

    /// Mortgage balance at the end of `year`; year 0 is the loan amount
    pub fn balance_at_year(&self, year: u32) -> f64 {
        self.amortization.balance_at_year(year)
    }
}

pub fn mortgage(inputs: &MortgageInputs) -> CalcResult<MortgageBreakdown> {
    mortgage_with(&AmortizationEngine::default(), inputs)
}

/// PITI breakdown using a specific amortization engine
pub fn mortgage_with(engine: &AmortizationEngine, inputs: &MortgageInputs) -> CalcResult<MortgageBreakdown> {
    inputs.validate()?;
    let loan_amount = inputs.loan_amount();
    let amortization = engine.amortize(&LoanTerms::new(loan_amount, inputs.annual_rate, inputs.term_years))?;

    let monthly_tax = inputs.annual_property_tax / 12.0;
    let monthly_insurance = inputs.annual_insurance / 12.0;
    let monthly_pmi = inputs.annual_pmi / 12.0;
    let monthly_principal_and_interest = amortization.monthly_payment;

    Ok(MortgageBreakdown {
        loan_amount,
        monthly_principal_and_interest,
        monthly_tax,
        monthly_insurance,
        monthly_pmi,
        monthly_total: monthly_principal_and_interest + monthly_tax + monthly_insurance + monthly_pmi,
        total_interest: amortization.total_interest,
        total_cost: loan_amount + amortization.total_interest,
        loan_to_value: loan_amount / inputs.home_price * 100.0,
        down_payment_percent: inputs.down_payment / inputs.home_price * 100.0,
        amortization,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityInputs {
    pub monthly_income: f64,
    pub monthly_debts: f64,
    pub down_payment: f64,
    pub annual_rate: f64,
    /// Percent of home value per year
    pub property_tax_rate: f64,
    /// Percent of home value per year
    pub insurance_rate: f64,
    pub term_years: u32,
    /// Back-end ratio as a fraction (0.43)
    pub max_dti: f64,
    /// Front-end ratio as a fraction (0.28)
    pub max_pti: f64,
}

impl AffordabilityInputs {
    pub fn new(monthly_income: f64, monthly_debts: f64, down_payment: f64, annual_rate: f64) -> Self {
        Self {
            monthly_income,
            monthly_debts,
            down_payment,
            annual_rate,
            property_tax_rate: 0.0,
            insurance_rate: 0.0,
            term_years: 30,
            max_dti: 0.43,
            max_pti: 0.28,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affordability {
    pub max_home_price: f64,
    pub max_loan_amount: f64,
    pub down_payment_percent: f64,
    pub monthly_payment: f64,
    pub monthly_principal_and_interest: f64,
    pub monthly_property_tax: f64,
    pub monthly_insurance: f64,
    pub total_monthly_debt: f64,
    pub debt_to_income_ratio: f64,
    pub payment_to_income_ratio: f64,
}

/// Largest home price the income supports under DTI and PTI limits
pub fn affordability(inputs: &AffordabilityInputs) -> CalcResult<Affordability> {
    ensure_positive("monthly_income", inputs.monthly_income)?;
    ensure_non_negative("monthly_debts", inputs.monthly_debts)?;
    ensure_non_negative("down_payment", inputs.down_payment)?;
    ensure_non_negative("annual_rate", inputs.annual_rate)?;
    ensure_non_negative("property_tax_rate", inputs.property_tax_rate)?;
    ensure_non_negative("insurance_rate", inputs.insurance_rate)?;
    for (field, ratio) in [("max_dti", inputs.max_dti), ("max_pti", inputs.max_pti)] {
        if ensure_non_negative(field, ratio)? > 1.0 {
            return Err(CalcError::invalid(field, "is a fraction of income and cannot exceed 1"));
        }
    }
    if inputs.term_years == 0 {
        return Err(CalcError::invalid("term_years", "must be at least 1"));
    }

    let by_dti = inputs.monthly_income * inputs.max_dti - inputs.monthly_debts;
    let by_pti = inputs.monthly_income * inputs.max_pti;
    let max_payment = by_dti.min(by_pti);
    if max_payment <= 0.0 {
        log::warn!(
            "existing debts {:.2} leave no room for a mortgage payment",
            inputs.monthly_debts
        );
    }

    let loan_payment = max_payment.max(0.0) * LOAN_SHARE_OF_PAYMENT;
    let max_loan_amount = annuity_present_value(loan_payment, inputs.annual_rate, inputs.term_years * 12);
    let max_home_price = max_loan_amount + inputs.down_payment;

    if max_home_price <= 0.0 {
        return Ok(Affordability {
            max_home_price: 0.0,
            max_loan_amount: 0.0,
            down_payment_percent: 0.0,
            monthly_payment: 0.0,
            monthly_principal_and_interest: 0.0,
            monthly_property_tax: 0.0,
            monthly_insurance: 0.0,
            total_monthly_debt: inputs.monthly_debts,
            debt_to_income_ratio: inputs.monthly_debts / inputs.monthly_income * 100.0,
            payment_to_income_ratio: 0.0,
        });
    }

    let breakdown = mortgage(
        &MortgageInputs::new(max_home_price, inputs.down_payment, inputs.annual_rate, inputs.term_years).with_escrow(
            max_home_price * inputs.property_tax_rate / 100.0,
            max_home_price * inputs.insurance_rate / 100.0,
            0.0,
        ),
    )?;
    let total_monthly_debt = inputs.monthly_debts + breakdown.monthly_total;

    Ok(Affordability {
        max_home_price,
        max_loan_amount,
        down_payment_percent: inputs.down_payment / max_home_price * 100.0,
        monthly_payment: breakdown.monthly_total,
        monthly_principal_and_interest: breakdown.monthly_principal_and_interest,
        monthly_property_tax: breakdown.monthly_tax,
        monthly_insurance: breakdown.monthly_insurance,
        total_monthly_debt,
        debt_to_income_ratio: total_monthly_debt / inputs.monthly_income * 100.0,
        payment_to_income_ratio: breakdown.monthly_total / inputs.monthly_income * 100.0,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceInputs {
    pub current_balance: f64,
    pub current_rate: f64,
    pub current_payment: f64,
    pub remaining_years: u32,
    pub new_rate: f64,
    pub new_term_years: u32,
    pub closing_costs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceComparison {
    pub current_payment: f64,
    pub current_total_interest: f64,
    /// Payments still due on the current loan, plus any balance left at term end
    pub current_total_cost: f64,
    pub current_status: PayoffStatus,
    pub current_yearly: Vec<YearlySnapshot>,
    pub new_payment: f64,
    pub new_total_interest: f64,
    /// New loan payments plus closing costs
    pub new_total_cost: f64,
    pub new_yearly: Vec<YearlySnapshot>,
    pub lifetime_savings: f64,
    pub monthly_difference: f64,
    /// Months of payment savings needed to recover closing costs
    pub breakeven_months: Option<u32>,
}

/// Keep the current loan or refinance the remaining balance
pub fn refinance(inputs: &RefinanceInputs) -> CalcResult<RefinanceComparison> {
    ensure_non_negative("current_balance", inputs.current_balance)?;
    ensure_non_negative("current_rate", inputs.current_rate)?;
    ensure_non_negative("current_payment", inputs.current_payment)?;
    ensure_non_negative("new_rate", inputs.new_rate)?;
    ensure_non_negative("closing_costs", inputs.closing_costs)?;
    if inputs.remaining_years == 0 {
        return Err(CalcError::invalid("remaining_years", "must be at least 1"));
    }

    let mut current = ScheduleIter::fixed_payment(
        inputs.current_balance,
        inputs.current_rate,
        inputs.current_payment,
        inputs.remaining_years * 12,
    );
    let current_schedule: Vec<AmortizationPoint> = current.by_ref().collect();
    let current_status = current.status().unwrap_or(PayoffStatus::CapReached);
    let current_total_interest = current_schedule.last().map(|p| p.cumulative_interest).unwrap_or(0.0);
    let current_paid: f64 = current_schedule.iter().map(|p| p.payment).sum();
    let current_total_cost = current_paid + current.balance();

    let new_loan = AmortizationEngine::default().amortize(&LoanTerms::new(
        inputs.current_balance,
        inputs.new_rate,
        inputs.new_term_years,
    ))?;
    let new_total_cost = new_loan.total_paid + inputs.closing_costs;
    let monthly_difference = inputs.current_payment - new_loan.monthly_payment;

    let breakeven_months = if monthly_difference > 0.0 {
        Some((inputs.closing_costs / monthly_difference).ceil() as u32)
    } else {
        None
    };

    Ok(RefinanceComparison {
        current_payment: inputs.current_payment,
        current_total_interest,
        current_total_cost,
        current_status,
        current_yearly: yearly_snapshots(&current_schedule, inputs.current_balance),
        new_payment: new_loan.monthly_payment,
        new_total_interest: new_loan.total_interest,
        new_total_cost,
        new_yearly: new_loan.yearly,
        lifetime_savings: current_total_cost - new_total_cost,
        monthly_difference,
        breakeven_months,
    })
}
