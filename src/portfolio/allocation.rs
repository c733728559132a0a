//! Target allocation and rebalancing trades

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, AllocationSide, CalcError, CalcResult};

/// Allowed distance of an allocation total from 100%
pub const ALLOCATION_TOLERANCE: f64 = 0.1;

/// Trades smaller than a cent are left alone
const HOLD_THRESHOLD: f64 = 0.005;

/// One asset class with its current and target share of the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetClass {
    pub name: String,
    /// Expected annual return in percent
    pub expected_return: f64,
    /// Annual volatility in percent
    pub volatility: f64,
    pub current_allocation: f64,
    pub target_allocation: f64,
}

impl AssetClass {
    pub fn new(name: impl Into<String>, current_allocation: f64, target_allocation: f64) -> Self {
        Self {
            name: name.into(),
            expected_return: 0.0,
            volatility: 0.0,
            current_allocation,
            target_allocation,
        }
    }

    pub fn with_risk(mut self, expected_return: f64, volatility: f64) -> Self {
        self.expected_return = expected_return;
        self.volatility = volatility;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRebalance {
    pub name: String,
    pub current_value: f64,
    pub target_value: f64,
    /// Target minus current
    pub difference: f64,
    pub action: TradeAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub total_value: f64,
    pub assets: Vec<AssetRebalance>,
    /// Target-weighted expected return in percent
    pub expected_return: f64,
    /// Target-weighted volatility in percent
    pub volatility: f64,
    /// Value that has to move between assets
    pub rebalance_amount: f64,
}

fn check_total(side: AllocationSide, total: f64) -> CalcResult<()> {
    if (total - 100.0).abs() > ALLOCATION_TOLERANCE {
        return Err(CalcError::InvalidAllocation { side, total });
    }
    Ok(())
}

/// Trades that move `total_value` from the current to the target allocation
pub fn asset_allocation(assets: &[AssetClass], total_value: f64) -> CalcResult<AllocationPlan> {
    ensure_non_negative("total_value", total_value)?;
    for asset in assets {
        ensure_non_negative("current_allocation", asset.current_allocation)?;
        ensure_non_negative("target_allocation", asset.target_allocation)?;
        ensure_finite("expected_return", asset.expected_return)?;
        ensure_non_negative("volatility", asset.volatility)?;
    }

    check_total(AllocationSide::Current, assets.iter().map(|a| a.current_allocation).sum())?;
    check_total(AllocationSide::Target, assets.iter().map(|a| a.target_allocation).sum())?;

    let rebalanced: Vec<AssetRebalance> = assets
        .iter()
        .map(|asset| {
            let current_value = asset.current_allocation / 100.0 * total_value;
            let target_value = asset.target_allocation / 100.0 * total_value;
            let difference = target_value - current_value;
            let action = if difference > HOLD_THRESHOLD {
                TradeAction::Buy
            } else if difference < -HOLD_THRESHOLD {
                TradeAction::Sell
            } else {
                TradeAction::Hold
            };
            AssetRebalance {
                name: asset.name.clone(),
                current_value,
                target_value,
                difference,
                action,
            }
        })
        .collect();

    let rebalance_amount = rebalanced.iter().map(|a| a.difference.abs()).sum::<f64>() / 2.0;

    Ok(AllocationPlan {
        total_value,
        expected_return: assets.iter().map(|a| a.target_allocation / 100.0 * a.expected_return).sum(),
        volatility: assets.iter().map(|a| a.target_allocation / 100.0 * a.volatility).sum(),
        rebalance_amount,
        assets: rebalanced,
    })
}
