//! Stock total return and dividend yield projections

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, CalcError, CalcResult};

/// Per-share dividend paid in a given year of the holding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendPayment {
    pub year: u32,
    pub per_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHolding {
    pub shares: f64,
    pub purchase_price: f64,
    pub current_price: f64,
    pub holding_years: u32,
    pub dividends: Vec<DividendPayment>,
    /// Buy more shares at the current price with each dividend
    pub reinvest_dividends: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldingYear {
    pub year: u32,
    pub shares: f64,
    pub cumulative_dividends: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReturn {
    pub initial_investment: f64,
    pub current_value: f64,
    pub total_shares: f64,
    pub total_dividends: f64,
    pub reinvested: f64,
    pub total_return: f64,
    pub percent_return: f64,
    /// Compound annual return in percent; equals `percent_return` for holdings under a year
    pub annualized_return: f64,
    pub price_appreciation: f64,
    pub schedule: Vec<HoldingYear>,
}

/// Total return of a stock position including dividends
///
/// Dividends are paid on the shares held at the start of their year. Cash
/// dividends count toward the return; reinvested ones show up as extra shares.
pub fn stock_return(holding: &StockHolding) -> CalcResult<StockReturn> {
    ensure_positive("shares", holding.shares)?;
    ensure_positive("purchase_price", holding.purchase_price)?;
    ensure_non_negative("current_price", holding.current_price)?;
    for dividend in &holding.dividends {
        ensure_non_negative("dividend", dividend.per_share)?;
        if dividend.year > holding.holding_years {
            return Err(CalcError::invalid(
                "dividend",
                format!("year {} is past the {} year holding", dividend.year, holding.holding_years),
            ));
        }
    }
    if holding.reinvest_dividends && holding.current_price <= 0.0 && !holding.dividends.is_empty() {
        return Err(CalcError::invalid("current_price", "reinvesting needs a positive price"));
    }

    let initial_investment = holding.shares * holding.purchase_price;
    let mut shares = holding.shares;
    let mut cumulative_dividends = 0.0;
    let mut reinvested = 0.0;
    let mut schedule = Vec::with_capacity(holding.holding_years as usize + 1);

    for year in 0..=holding.holding_years {
        let per_share: f64 = holding
            .dividends
            .iter()
            .filter(|d| d.year == year)
            .map(|d| d.per_share)
            .sum();
        let paid = per_share * shares;
        cumulative_dividends += paid;
        if holding.reinvest_dividends && paid > 0.0 {
            shares += paid / holding.current_price;
            reinvested += paid;
        }
        schedule.push(HoldingYear {
            year,
            shares,
            cumulative_dividends,
            value: shares * holding.current_price,
        });
    }

    let current_value = shares * holding.current_price;
    let cash_dividends = if holding.reinvest_dividends { 0.0 } else { cumulative_dividends };
    let total_return = current_value - initial_investment + cash_dividends;
    let percent_return = total_return / initial_investment * 100.0;
    let annualized_return = if holding.holding_years > 0 {
        ((1.0 + total_return / initial_investment).powf(1.0 / holding.holding_years as f64) - 1.0) * 100.0
    } else {
        percent_return
    };

    Ok(StockReturn {
        initial_investment,
        current_value,
        total_shares: shares,
        total_dividends: cumulative_dividends,
        reinvested,
        total_return,
        percent_return,
        annualized_return,
        price_appreciation: (holding.current_price - holding.purchase_price) / holding.purchase_price * 100.0,
        schedule,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendYear {
    pub year: u32,
    pub dividend: f64,
    /// Percent of the share price
    pub yield_pct: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendProjection {
    pub current_yield: f64,
    pub final_yield: f64,
    pub total_dividends: f64,
    pub schedule: Vec<DividendYear>,
}

/// Grow an annual dividend for `years` and track its yield on today's price
pub fn dividend_yield(share_price: f64, annual_dividend: f64, growth_rate: f64, years: u32) -> CalcResult<DividendProjection> {
    ensure_positive("share_price", share_price)?;
    ensure_non_negative("annual_dividend", annual_dividend)?;
    if growth_rate <= -100.0 {
        return Err(CalcError::invalid("growth_rate", "must be above -100%"));
    }

    let mut dividend = annual_dividend;
    let mut cumulative = 0.0;
    let mut schedule = Vec::with_capacity(years as usize + 1);
    for year in 0..=years {
        if year > 0 {
            dividend *= 1.0 + growth_rate / 100.0;
            cumulative += dividend;
        }
        schedule.push(DividendYear {
            year,
            dividend,
            yield_pct: dividend / share_price * 100.0,
            cumulative,
        });
    }

    Ok(DividendProjection {
        current_yield: annual_dividend / share_price * 100.0,
        final_yield: dividend / share_price * 100.0,
        total_dividends: cumulative,
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn holding(reinvest: bool) -> StockHolding {
        StockHolding {
            shares: 100.0,
            purchase_price: 50.0,
            current_price: 60.0,
            holding_years: 2,
            dividends: vec![
                DividendPayment { year: 1, per_share: 2.0 },
                DividendPayment { year: 2, per_share: 2.0 },
            ],
            reinvest_dividends: reinvest,
        }
    }

    #[test]
    fn test_cash_dividends() {
        let result = stock_return(&holding(false)).unwrap();
        assert_eq!(result.initial_investment, 5_000.0);
        assert_eq!(result.current_value, 6_000.0);
        assert_abs_diff_eq!(result.total_dividends, 400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.total_return, 1_400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.percent_return, 28.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.annualized_return, (1.28f64.sqrt() - 1.0) * 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.price_appreciation, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reinvested_dividends() {
        let result = stock_return(&holding(true)).unwrap();
        // 200 buys 3.333 shares, then 2.00 on 103.333 shares
        let after_first = 100.0 + 200.0 / 60.0;
        let second = 2.0 * after_first;
        assert_abs_diff_eq!(result.total_shares, after_first + second / 60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.reinvested, 200.0 + second, epsilon = 1e-9);
        assert_abs_diff_eq!(result.total_return, result.current_value - 5_000.0, epsilon = 1e-9);
        assert_eq!(result.schedule.len(), 3);
    }

    #[test]
    fn test_dividend_after_holding_rejected() {
        let mut h = holding(false);
        h.holding_years = 1;
        assert!(stock_return(&h).is_err());
    }

    #[test]
    fn test_dividend_growth() {
        let result = dividend_yield(100.0, 3.0, 5.0, 2).unwrap();
        assert_abs_diff_eq!(result.current_yield, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.final_yield, 3.0 * 1.05 * 1.05, epsilon = 1e-9);
        assert_abs_diff_eq!(result.total_dividends, 3.15 + 3.3075, epsilon = 1e-9);
        assert_eq!(result.schedule[0].cumulative, 0.0);
    }
}
