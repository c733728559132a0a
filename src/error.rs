//! Error types for the calculator engines
//!
//! Non-convergent simulations are not errors; they are reported through
//! the `PayoffStatus` carried by each result.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for calculator operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Which side of an allocation failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationSide {
    Current,
    Target,
}

impl std::fmt::Display for AllocationSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationSide::Current => write!(f, "current"),
            AllocationSide::Target => write!(f, "target"),
        }
    }
}

/// Main error type for calculator operations
#[derive(Error, Debug)]
pub enum CalcError {
    /// A numeric input is NaN, infinite or outside its allowed range
    #[error("invalid input '{field}': {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Bracket table is unordered, overlapping or has a gap
    #[error("invalid tax bracket table: {0}")]
    InvalidBracketTable(String),

    /// Allocation percentages do not sum to 100
    #[error("{side} allocations must sum to 100% (got {total:.2}%)")]
    InvalidAllocation { side: AllocationSide, total: f64 },

    /// Portfolio has no positions or no value
    #[error("portfolio is empty or has zero total value")]
    EmptyPortfolio,

    /// Debt id already present in the list
    #[error("duplicate debt id '{0}'")]
    DuplicateDebt(String),

    /// Debt id not present in the list
    #[error("unknown debt id '{0}'")]
    UnknownDebt(String),

    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CalcError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject NaN/infinite values and anything below zero
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> CalcResult<f64> {
    if !value.is_finite() {
        return Err(CalcError::invalid(field, format!("{value} is not a finite number")));
    }
    if value < 0.0 {
        return Err(CalcError::invalid(field, format!("{value} must not be negative")));
    }
    Ok(value)
}

/// Reject NaN/infinite values only
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> CalcResult<f64> {
    if !value.is_finite() {
        return Err(CalcError::invalid(field, format!("{value} is not a finite number")));
    }
    Ok(value)
}

/// Require a finite value strictly above zero
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> CalcResult<f64> {
    ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(CalcError::invalid(field, format!("{value} must be greater than zero")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_message() {
        let err = CalcError::InvalidAllocation {
            side: AllocationSide::Target,
            total: 95.0,
        };
        assert_eq!(err.to_string(), "target allocations must sum to 100% (got 95.00%)");
    }

    #[test]
    fn test_input_guards() {
        assert!(ensure_non_negative("rate", 0.0).is_ok());
        assert!(ensure_non_negative("rate", -1.0).is_err());
        assert!(ensure_non_negative("rate", f64::NAN).is_err());
        assert!(ensure_positive("years", 0.0).is_err());
        assert!(ensure_finite("extra", -50.0).is_ok());
        assert!(ensure_finite("extra", f64::INFINITY).is_err());
    }
}
