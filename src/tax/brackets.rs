//! Progressive tax bracket tables

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// One marginal-rate band; `max = None` marks the unbounded top bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Marginal rate in percent
    pub rate: f64,
    pub min: f64,
    pub max: Option<f64>,
}

impl TaxBracket {
    pub const fn new(rate: f64, min: f64, max: Option<f64>) -> Self {
        Self { rate, min, max }
    }

    /// Whether `income` falls at or below this bracket's ceiling
    pub fn contains_top_of(&self, income: f64) -> bool {
        self.max.map_or(true, |max| income <= max)
    }
}

/// Income taxed within a single bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub rate: f64,
    pub amount: f64,
    pub tax: f64,
}

/// Federal income tax from walking a bracket table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTax {
    pub tax: f64,
    /// Rate of the highest bracket that taxed any income
    pub marginal_rate: f64,
    pub slices: Vec<BracketSlice>,
}

/// Validated, ordered bracket table
///
/// Brackets start at zero, are contiguous and ascending, rates never
/// decrease, and only the last bracket is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TaxBracket>", into = "Vec<TaxBracket>")]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    pub fn new(brackets: Vec<TaxBracket>) -> CalcResult<Self> {
        let first = brackets
            .first()
            .ok_or_else(|| CalcError::InvalidBracketTable("table has no brackets".into()))?;
        if first.min != 0.0 {
            return Err(CalcError::InvalidBracketTable(format!(
                "first bracket must start at 0, starts at {}",
                first.min
            )));
        }

        let last_idx = brackets.len() - 1;
        for (i, bracket) in brackets.iter().enumerate() {
            if !bracket.rate.is_finite() || !(0.0..=100.0).contains(&bracket.rate) {
                return Err(CalcError::InvalidBracketTable(format!(
                    "bracket {} has rate {} outside 0-100",
                    i + 1,
                    bracket.rate
                )));
            }

            match (bracket.max, i == last_idx) {
                (None, true) => {}
                (Some(_), true) => {
                    return Err(CalcError::InvalidBracketTable(
                        "last bracket must be unbounded".into(),
                    ))
                }
                (None, false) => {
                    return Err(CalcError::InvalidBracketTable(format!(
                        "bracket {} is unbounded but is not the last",
                        i + 1
                    )))
                }
                (Some(max), false) => {
                    if !(max > bracket.min) {
                        return Err(CalcError::InvalidBracketTable(format!(
                            "bracket {} has max {} not above min {}",
                            i + 1,
                            max,
                            bracket.min
                        )));
                    }
                    let next = &brackets[i + 1];
                    if next.min != max {
                        return Err(CalcError::InvalidBracketTable(format!(
                            "bracket {} starts at {} but bracket {} ends at {}",
                            i + 2,
                            next.min,
                            i + 1,
                            max
                        )));
                    }
                    if next.rate < bracket.rate {
                        return Err(CalcError::InvalidBracketTable(format!(
                            "bracket {} rate {} is below the preceding {}",
                            i + 2,
                            next.rate,
                            bracket.rate
                        )));
                    }
                }
            }
        }

        Ok(Self { brackets })
    }

    /// 2024 U.S. federal brackets, single filer
    pub fn federal_2024() -> Self {
        Self {
            brackets: vec![
                TaxBracket::new(10.0, 0.0, Some(11_600.0)),
                TaxBracket::new(12.0, 11_600.0, Some(47_150.0)),
                TaxBracket::new(22.0, 47_150.0, Some(100_525.0)),
                TaxBracket::new(24.0, 100_525.0, Some(191_950.0)),
                TaxBracket::new(32.0, 191_950.0, Some(243_725.0)),
                TaxBracket::new(35.0, 243_725.0, Some(609_350.0)),
                TaxBracket::new(37.0, 609_350.0, None),
            ],
        }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Walk the table, taxing each slice of income at its bracket rate
    pub fn tax_on(&self, income: f64) -> BracketTax {
        let mut result = BracketTax {
            tax: 0.0,
            marginal_rate: 0.0,
            slices: Vec::new(),
        };
        if income <= 0.0 {
            return result;
        }

        for bracket in &self.brackets {
            let upper = bracket.max.map_or(income, |max| income.min(max));
            let taxable = upper - bracket.min;

            if taxable > 0.0 {
                let tax = taxable * bracket.rate / 100.0;
                result.tax += tax;
                result.marginal_rate = bracket.rate;
                result.slices.push(BracketSlice {
                    rate: bracket.rate,
                    amount: taxable,
                    tax,
                });
            }

            if bracket.contains_top_of(income) {
                break;
            }
        }

        result
    }
}

impl TryFrom<Vec<TaxBracket>> for BracketTable {
    type Error = CalcError;

    fn try_from(brackets: Vec<TaxBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<BracketTable> for Vec<TaxBracket> {
    fn from(table: BracketTable) -> Self {
        table.brackets
    }
}

impl Default for BracketTable {
    fn default() -> Self {
        Self::federal_2024()
    }
}
