//! Year-by-year comparison of buying a home against renting

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, CalcError, CalcResult};
use super::mortgage::{mortgage, MortgageInputs};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentVsBuyInputs {
    pub home_price: f64,
    pub down_payment: f64,
    pub annual_rate: f64,
    pub term_years: u32,
    /// Percent of purchase price per year
    pub property_tax_rate: f64,
    pub insurance_rate: f64,
    pub maintenance_rate: f64,
    pub monthly_rent: f64,
    /// Annual rent escalation in percent
    pub rent_increase: f64,
    /// Annual appreciation in percent
    pub home_appreciation: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyYear {
    pub year: u32,
    pub home_value: f64,
    pub mortgage_balance: f64,
    pub equity: f64,
    pub cumulative_maintenance: f64,
    /// Down payment, mortgage payments, escrow and maintenance to date
    pub cumulative_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentYear {
    pub year: u32,
    pub monthly_rent: f64,
    pub cumulative_rent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentVsBuy {
    pub buy: Vec<BuyYear>,
    pub rent: Vec<RentYear>,
    /// PITI payment while the mortgage is outstanding
    pub monthly_mortgage: f64,
    pub monthly_maintenance: f64,
    pub total_buyer_cost: f64,
    pub total_renter_cost: f64,
    pub final_home_value: f64,
    pub final_equity: f64,
    /// Buyer cost less appreciation
    pub net_buyer_cost: f64,
}

impl RentVsBuy {
    /// Positive when buying came out cheaper than renting
    pub fn buying_advantage(&self) -> f64 {
        self.total_renter_cost - self.net_buyer_cost
    }
}

/// Compare owning against renting over `years`
///
/// Year `y` rows hold values at the end of that year; row 0 is the purchase.
/// Rent paid in year `y` is the starting rent escalated `y - 1` times.
pub fn rent_vs_buy(inputs: &RentVsBuyInputs) -> CalcResult<RentVsBuy> {
    ensure_non_negative("maintenance_rate", inputs.maintenance_rate)?;
    ensure_non_negative("property_tax_rate", inputs.property_tax_rate)?;
    ensure_non_negative("insurance_rate", inputs.insurance_rate)?;
    ensure_non_negative("monthly_rent", inputs.monthly_rent)?;
    if inputs.rent_increase <= -100.0 {
        return Err(CalcError::invalid("rent_increase", "must be above -100%"));
    }
    if inputs.home_appreciation <= -100.0 {
        return Err(CalcError::invalid("home_appreciation", "must be above -100%"));
    }

    let annual_tax = inputs.home_price * inputs.property_tax_rate / 100.0;
    let annual_insurance = inputs.home_price * inputs.insurance_rate / 100.0;
    let annual_maintenance = inputs.home_price * inputs.maintenance_rate / 100.0;

    let loan = mortgage(
        &MortgageInputs::new(inputs.home_price, inputs.down_payment, inputs.annual_rate, inputs.term_years)
            .with_escrow(annual_tax, annual_insurance, 0.0),
    )?;

    let mut buy = Vec::with_capacity(inputs.years as usize + 1);
    let mut rent = Vec::with_capacity(inputs.years as usize + 1);

    let mut home_value = inputs.home_price;
    let mut monthly_rent = inputs.monthly_rent;
    let mut cumulative_rent = 0.0;
    let mut cumulative_maintenance = 0.0;
    let mut cumulative_cost = inputs.down_payment;

    for year in 0..=inputs.years {
        if year > 0 {
            if year > 1 {
                monthly_rent *= 1.0 + inputs.rent_increase / 100.0;
            }
            cumulative_rent += monthly_rent * 12.0;
            home_value *= 1.0 + inputs.home_appreciation / 100.0;
            cumulative_maintenance += annual_maintenance;
            cumulative_cost += loan.amortization.payments_in_year(year)
                + annual_tax
                + annual_insurance
                + annual_maintenance;
        }

        let mortgage_balance = loan.balance_at_year(year);
        buy.push(BuyYear {
            year,
            home_value,
            mortgage_balance,
            equity: home_value - mortgage_balance,
            cumulative_maintenance,
            cumulative_cost,
        });
        rent.push(RentYear {
            year,
            monthly_rent,
            cumulative_rent,
        });
    }

    let final_equity = home_value - loan.balance_at_year(inputs.years);
    log::debug!(
        "rent vs buy over {}y: buyer {:.2}, renter {:.2}",
        inputs.years,
        cumulative_cost,
        cumulative_rent
    );

    Ok(RentVsBuy {
        buy,
        rent,
        monthly_mortgage: loan.monthly_total,
        monthly_maintenance: annual_maintenance / 12.0,
        total_buyer_cost: cumulative_cost,
        total_renter_cost: cumulative_rent,
        final_home_value: home_value,
        final_equity,
        net_buyer_cost: cumulative_cost - (home_value - inputs.home_price),
    })
}
