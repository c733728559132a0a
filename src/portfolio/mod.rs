//! Asset allocation, portfolio risk and stock return calculators

mod allocation;
mod risk;
mod returns;

pub use allocation::{
    asset_allocation, AllocationPlan, AssetClass, AssetRebalance, TradeAction, ALLOCATION_TOLERANCE,
};
pub use risk::{portfolio_risk, PortfolioRisk, PositionRisk, StockPosition};
pub use returns::{
    dividend_yield, stock_return, DividendPayment, DividendProjection, DividendYear, HoldingYear, StockHolding,
    StockReturn,
};
