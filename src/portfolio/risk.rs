//! Value-weighted beta, volatility and concentration of a stock portfolio

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, CalcError, CalcResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPosition {
    pub symbol: String,
    pub value: f64,
    pub beta: f64,
    /// Annual volatility in percent
    pub volatility: f64,
}

impl StockPosition {
    pub fn new(symbol: impl Into<String>, value: f64, beta: f64, volatility: f64) -> Self {
        Self {
            symbol: symbol.into(),
            value,
            beta,
            volatility,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRisk {
    pub symbol: String,
    pub value: f64,
    /// Percent of portfolio value
    pub weight: f64,
    /// Weight (as a fraction) times beta
    pub beta_contribution: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRisk {
    pub total_value: f64,
    pub beta: f64,
    pub volatility: f64,
    /// Percent of value held in the three largest positions
    pub top3_concentration: f64,
    pub positions: Vec<PositionRisk>,
}

/// Weighted risk figures; fails on an empty or zero-value portfolio
pub fn portfolio_risk(positions: &[StockPosition]) -> CalcResult<PortfolioRisk> {
    for position in positions {
        ensure_non_negative("value", position.value)?;
        ensure_finite("beta", position.beta)?;
        ensure_non_negative("volatility", position.volatility)?;
    }

    let total_value: f64 = positions.iter().map(|p| p.value).sum();
    if positions.is_empty() || total_value <= 0.0 {
        return Err(CalcError::EmptyPortfolio);
    }

    let weights: Vec<f64> = positions.iter().map(|p| p.value / total_value).collect();
    let beta: f64 = positions.iter().zip(&weights).map(|(p, w)| p.beta * w).sum();
    let volatility: f64 = positions.iter().zip(&weights).map(|(p, w)| p.volatility * w).sum();

    let mut sorted = weights.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let top3_concentration = sorted.iter().take(3).sum::<f64>() * 100.0;

    Ok(PortfolioRisk {
        total_value,
        beta,
        volatility,
        top3_concentration,
        positions: positions
            .iter()
            .zip(&weights)
            .map(|(p, &w)| PositionRisk {
                symbol: p.symbol.clone(),
                value: p.value,
                weight: w * 100.0,
                beta_contribution: w * p.beta,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn holdings() -> Vec<StockPosition> {
        vec![
            StockPosition::new("AAA", 40_000.0, 1.2, 25.0),
            StockPosition::new("BBB", 30_000.0, 0.8, 18.0),
            StockPosition::new("CCC", 20_000.0, 1.0, 20.0),
            StockPosition::new("DDD", 10_000.0, 1.5, 35.0),
        ]
    }

    #[test]
    fn test_weighted_beta() {
        let risk = portfolio_risk(&holdings()).unwrap();
        assert_eq!(risk.total_value, 100_000.0);
        assert_abs_diff_eq!(risk.beta, 0.4 * 1.2 + 0.3 * 0.8 + 0.2 * 1.0 + 0.1 * 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(risk.volatility, 10.0 + 5.4 + 4.0 + 3.5, epsilon = 1e-9);
        assert_abs_diff_eq!(risk.top3_concentration, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(risk.positions[0].weight, 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_contributions_sum_to_beta() {
        let risk = portfolio_risk(&holdings()).unwrap();
        let sum: f64 = risk.positions.iter().map(|p| p.beta_contribution).sum();
        assert_abs_diff_eq!(sum, risk.beta, epsilon = 1e-12);
    }

    #[test]
    fn test_small_portfolio_fully_concentrated() {
        let risk = portfolio_risk(&holdings()[..2]).unwrap();
        assert_abs_diff_eq!(risk.top3_concentration, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_portfolio() {
        assert!(matches!(portfolio_risk(&[]), Err(CalcError::EmptyPortfolio)));
        let zero = vec![StockPosition::new("ZZZ", 0.0, 1.0, 10.0)];
        assert!(matches!(portfolio_risk(&zero), Err(CalcError::EmptyPortfolio)));
    }
}
