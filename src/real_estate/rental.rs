//! Rental property cash flow, ROI and IRR over a holding period

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};
use crate::loan::{AmortizationEngine, AmortizationResult, LoanTerms};
use super::irr::irr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalInputs {
    pub purchase_price: f64,
    pub down_payment: f64,
    pub closing_costs: f64,
    pub repair_costs: f64,
    pub monthly_rent: f64,
    pub other_monthly_income: f64,
    /// Percent of purchase price per year
    pub property_tax_rate: f64,
    pub insurance_rate: f64,
    pub maintenance_rate: f64,
    /// Percent of rent lost to vacancy
    pub vacancy_rate: f64,
    /// Percent of gross income paid for management
    pub management_rate: f64,
    pub mortgage_rate: f64,
    pub mortgage_years: u32,
    pub annual_appreciation: f64,
    pub holding_period: u32,
}

impl RentalInputs {
    pub fn new(purchase_price: f64, down_payment: f64, monthly_rent: f64, mortgage_rate: f64) -> Self {
        Self {
            purchase_price,
            down_payment,
            closing_costs: 0.0,
            repair_costs: 0.0,
            monthly_rent,
            other_monthly_income: 0.0,
            property_tax_rate: 0.0,
            insurance_rate: 0.0,
            maintenance_rate: 0.0,
            vacancy_rate: 0.0,
            management_rate: 0.0,
            mortgage_rate,
            mortgage_years: 30,
            annual_appreciation: 3.0,
            holding_period: 10,
        }
    }

    pub fn total_investment(&self) -> f64 {
        self.down_payment + self.closing_costs + self.repair_costs
    }

    fn validate(&self) -> CalcResult<()> {
        ensure_positive("purchase_price", self.purchase_price)?;
        ensure_non_negative("down_payment", self.down_payment)?;
        if self.down_payment > self.purchase_price {
            return Err(CalcError::invalid("down_payment", "exceeds the purchase price"));
        }
        for (field, value) in [
            ("closing_costs", self.closing_costs),
            ("repair_costs", self.repair_costs),
            ("monthly_rent", self.monthly_rent),
            ("other_monthly_income", self.other_monthly_income),
            ("property_tax_rate", self.property_tax_rate),
            ("insurance_rate", self.insurance_rate),
            ("maintenance_rate", self.maintenance_rate),
            ("vacancy_rate", self.vacancy_rate),
            ("management_rate", self.management_rate),
            ("mortgage_rate", self.mortgage_rate),
        ] {
            ensure_non_negative(field, value)?;
        }
        if self.annual_appreciation <= -100.0 {
            return Err(CalcError::invalid("annual_appreciation", "must be above -100%"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpenses {
    pub mortgage: f64,
    pub property_tax: f64,
    pub insurance: f64,
    pub maintenance: f64,
    pub vacancy: f64,
    pub management: f64,
}

impl MonthlyExpenses {
    pub fn total(&self) -> f64 {
        self.mortgage + self.operating()
    }

    /// Everything except debt service
    pub fn operating(&self) -> f64 {
        self.property_tax + self.insurance + self.maintenance + self.vacancy + self.management
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentalYear {
    pub year: u32,
    pub property_value: f64,
    pub loan_balance: f64,
    pub equity: f64,
    pub cumulative_income: f64,
    pub cumulative_expenses: f64,
    pub cumulative_profit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalRoi {
    pub gross_monthly_income: f64,
    pub expenses: MonthlyExpenses,
    pub total_monthly_expenses: f64,
    /// First-year monthly cash flow
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,
    pub total_investment: f64,
    pub schedule: Vec<RentalYear>,
    pub total_profit: f64,
    /// Equity at the end of the hold less the cash invested
    pub equity_gain: f64,
    pub total_return: f64,
    /// Percent; `None` when nothing was invested
    pub cash_on_cash_return: Option<f64>,
    pub total_roi: Option<f64>,
    /// `None` when nothing was invested or the holding period is zero
    pub average_annual_roi: Option<f64>,
    /// Annual IRR as a decimal, selling at final equity
    pub irr: Option<f64>,
}

/// Project a leveraged rental over its holding period
///
/// Loan balances come from the amortization schedule keyed by year, so a
/// holding period longer than the mortgage stops paying debt service once the
/// loan is retired.
pub fn rental_roi(inputs: &RentalInputs) -> CalcResult<RentalRoi> {
    inputs.validate()?;

    let loan_amount = inputs.purchase_price - inputs.down_payment;
    let loan = AmortizationEngine::default().amortize(&LoanTerms::new(
        loan_amount,
        inputs.mortgage_rate,
        inputs.mortgage_years,
    ))?;

    let gross_monthly_income = inputs.monthly_rent + inputs.other_monthly_income;
    let expenses = MonthlyExpenses {
        mortgage: loan.monthly_payment,
        property_tax: inputs.purchase_price * inputs.property_tax_rate / 100.0 / 12.0,
        insurance: inputs.purchase_price * inputs.insurance_rate / 100.0 / 12.0,
        maintenance: inputs.purchase_price * inputs.maintenance_rate / 100.0 / 12.0,
        vacancy: inputs.monthly_rent * inputs.vacancy_rate / 100.0,
        management: gross_monthly_income * inputs.management_rate / 100.0,
    };
    let total_monthly_expenses = expenses.total();
    let monthly_cash_flow = gross_monthly_income - total_monthly_expenses;
    let annual_cash_flow = monthly_cash_flow * 12.0;
    let total_investment = inputs.total_investment();

    let (schedule, yearly_cash) = project_years(inputs, &loan, gross_monthly_income, &expenses);

    let last = schedule
        .last()
        .copied()
        .ok_or_else(|| CalcError::invalid("holding_period", "produced no projection"))?;
    let total_profit = last.cumulative_profit;
    let equity_gain = last.equity - total_investment;
    let total_return = total_profit + equity_gain;

    let (cash_on_cash_return, total_roi) = if total_investment > 0.0 {
        (
            Some(annual_cash_flow / total_investment * 100.0),
            Some(total_return / total_investment * 100.0),
        )
    } else {
        log::warn!("rental has no cash invested; ROI figures are undefined");
        (None, None)
    };
    let average_annual_roi = match (total_roi, inputs.holding_period) {
        (Some(roi), years) if years > 0 => Some(roi / years as f64),
        _ => None,
    };

    // Sale at final equity lands in the last year of the hold
    let annual_irr = if inputs.holding_period > 0 {
        let mut cashflows = Vec::with_capacity(yearly_cash.len() + 1);
        cashflows.push(-total_investment);
        cashflows.extend(yearly_cash);
        if let Some(final_year) = cashflows.last_mut() {
            *final_year += last.equity;
        }
        irr(&cashflows, 1)
    } else {
        None
    };

    Ok(RentalRoi {
        gross_monthly_income,
        expenses,
        total_monthly_expenses,
        monthly_cash_flow,
        annual_cash_flow,
        total_investment,
        schedule,
        total_profit,
        equity_gain,
        total_return,
        cash_on_cash_return,
        total_roi,
        average_annual_roi,
        irr: annual_irr,
    })
}

fn project_years(
    inputs: &RentalInputs,
    loan: &AmortizationResult,
    gross_monthly_income: f64,
    expenses: &MonthlyExpenses,
) -> (Vec<RentalYear>, Vec<f64>) {
    let mut schedule = Vec::with_capacity(inputs.holding_period as usize + 1);
    let mut yearly_cash = Vec::with_capacity(inputs.holding_period as usize);
    let mut property_value = inputs.purchase_price;
    let mut cumulative_income = 0.0;
    let mut cumulative_expenses = 0.0;

    for year in 0..=inputs.holding_period {
        if year > 0 {
            property_value *= 1.0 + inputs.annual_appreciation / 100.0;
            let income = gross_monthly_income * 12.0;
            let spent = expenses.operating() * 12.0 + loan.payments_in_year(year);
            cumulative_income += income;
            cumulative_expenses += spent;
            yearly_cash.push(income - spent);
        }

        let loan_balance = loan.balance_at_year(year);
        schedule.push(RentalYear {
            year,
            property_value,
            loan_balance,
            equity: property_value - loan_balance,
            cumulative_income,
            cumulative_expenses,
            cumulative_profit: cumulative_income - cumulative_expenses,
        });
    }

    (schedule, yearly_cash)
}
