//! Mortgage, rent-vs-buy and rental property engines built on loan amortization

mod irr;
mod mortgage;
mod rent_vs_buy;
mod rental;

pub use irr::{irr, npv};
pub use mortgage::{
    affordability, mortgage, mortgage_with, refinance, Affordability, AffordabilityInputs, MortgageBreakdown,
    MortgageInputs, RefinanceComparison, RefinanceInputs, LOAN_SHARE_OF_PAYMENT,
};
pub use rent_vs_buy::{rent_vs_buy, BuyYear, RentVsBuy, RentVsBuyInputs, RentYear};
pub use rental::{rental_roi, MonthlyExpenses, RentalInputs, RentalRoi, RentalYear};
