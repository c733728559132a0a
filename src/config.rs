//! Calculator configuration: defaults, environment overrides and JSON files
//!
//! Every engine takes its own section at construction. Environment variables
//! override individual values:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FINCALC_PAYOFF_MONTH_CAP` | `payoff.month_cap` |
//! | `FINCALC_AMORTIZATION_CAP_FACTOR` | `amortization.cap_factor` |
//! | `FINCALC_SAVINGS_MONTH_CAP` | `savings.month_cap` |
//! | `FINCALC_INFLATION_RATE` | `savings.inflation_rate` |
//! | `FINCALC_BRACKETS_PATH` | `tax.brackets_path` |
//! | `FINCALC_SS_WAGE_BASE` | `tax.payroll.social_security_wage_base` |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::debt::{DebtPayoffEngine, PayoffConfig};
use crate::error::{CalcError, CalcResult};
use crate::growth::{future_value, FutureValue, GrowthInputs, SavingsConfig};
use crate::loan::{AmortizationConfig, AmortizationEngine};
use crate::tax::{TaxConfig, TaxEngine};

pub const ENV_PAYOFF_MONTH_CAP: &str = "FINCALC_PAYOFF_MONTH_CAP";
pub const ENV_AMORTIZATION_CAP_FACTOR: &str = "FINCALC_AMORTIZATION_CAP_FACTOR";
pub const ENV_SAVINGS_MONTH_CAP: &str = "FINCALC_SAVINGS_MONTH_CAP";
pub const ENV_INFLATION_RATE: &str = "FINCALC_INFLATION_RATE";
pub const ENV_BRACKETS_PATH: &str = "FINCALC_BRACKETS_PATH";
pub const ENV_SS_WAGE_BASE: &str = "FINCALC_SS_WAGE_BASE";

/// Configuration for all calculator engines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub amortization: AmortizationConfig,
    pub payoff: PayoffConfig,
    pub savings: SavingsConfig,
    pub tax: TaxConfig,
}

impl CalculatorConfig {
    /// Defaults with any `FINCALC_*` environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Load from a JSON file; missing sections keep their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> CalcResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CalcError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text)?;
        log::debug!("loaded calculator config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from `lookup`; unparsable values are ignored with a warning
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cap) = parse_var(&lookup, ENV_PAYOFF_MONTH_CAP) {
            self.payoff.month_cap = cap;
        }
        if let Some(factor) = parse_var(&lookup, ENV_AMORTIZATION_CAP_FACTOR) {
            self.amortization.cap_factor = factor;
        }
        if let Some(cap) = parse_var(&lookup, ENV_SAVINGS_MONTH_CAP) {
            self.savings.month_cap = cap;
        }
        if let Some(rate) = parse_var(&lookup, ENV_INFLATION_RATE) {
            self.savings.inflation_rate = rate;
        }
        if let Some(path) = lookup(ENV_BRACKETS_PATH).filter(|p| !p.is_empty()) {
            self.tax.brackets_path = Some(PathBuf::from(path));
        }
        if let Some(base) = parse_var(&lookup, ENV_SS_WAGE_BASE) {
            self.tax.payroll.social_security_wage_base = base;
        }
        self
    }

    pub fn amortization_engine(&self) -> AmortizationEngine {
        AmortizationEngine::new(self.amortization.clone())
    }

    pub fn payoff_engine(&self) -> DebtPayoffEngine {
        DebtPayoffEngine::new(self.payoff)
    }

    /// Growth projection deflated at `savings.inflation_rate`
    pub fn future_value(&self, inputs: &GrowthInputs) -> CalcResult<FutureValue> {
        future_value(inputs, &self.savings)
    }

    /// Tax engine, loading the bracket file if one is configured
    pub fn tax_engine(&self) -> CalcResult<TaxEngine> {
        TaxEngine::from_config(&self.tax)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CalculatorConfig::default();
        assert_eq!(config.payoff.month_cap, 600);
        assert_eq!(config.amortization.cap_factor, 1.5);
        assert_eq!(config.savings.month_cap, 600);
        assert_eq!(config.tax.brackets_path, None);
    }

    #[test]
    fn test_overrides() {
        let config = CalculatorConfig::default().with_overrides(lookup(&[
            (ENV_PAYOFF_MONTH_CAP, "360"),
            (ENV_AMORTIZATION_CAP_FACTOR, "2.0"),
            (ENV_INFLATION_RATE, " 3.5 "),
            (ENV_BRACKETS_PATH, "data/tax/federal_2024.csv"),
            (ENV_SS_WAGE_BASE, "176100"),
        ]));
        assert_eq!(config.payoff.month_cap, 360);
        assert_eq!(config.amortization.cap_factor, 2.0);
        assert_eq!(config.savings.inflation_rate, 3.5);
        assert_eq!(config.savings.month_cap, 600);
        assert_eq!(config.tax.brackets_path, Some(PathBuf::from("data/tax/federal_2024.csv")));
        assert_eq!(config.tax.payroll.social_security_wage_base, 176_100.0);
        assert!(config.tax_engine().is_ok());
    }

    #[test]
    fn test_inflation_override_reaches_future_value() {
        use crate::growth::{CompoundingFrequency, ContributionSchedule};

        let inputs = GrowthInputs {
            principal: 10_000.0,
            contributions: ContributionSchedule::none(CompoundingFrequency::Annually),
            annual_rate: 7.0,
            years: 10,
        };
        let config = CalculatorConfig::default().with_overrides(lookup(&[(ENV_INFLATION_RATE, "3.5")]));
        let fv = config.future_value(&inputs).unwrap();
        assert_eq!(fv.inflation_rate, 3.5);
        assert!((fv.inflation_adjusted_value - 13_945.51).abs() < 0.01);

        let default_fv = CalculatorConfig::default().future_value(&inputs).unwrap();
        assert!(default_fv.inflation_adjusted_value > fv.inflation_adjusted_value);
    }

    #[test]
    fn test_bad_override_ignored() {
        let config = CalculatorConfig::default().with_overrides(lookup(&[(ENV_PAYOFF_MONTH_CAP, "forever")]));
        assert_eq!(config.payoff.month_cap, 600);
    }

    #[test]
    fn test_partial_json() {
        let config: CalculatorConfig = serde_json::from_str(r#"{"payoff": {"month_cap": 120}}"#).unwrap();
        assert_eq!(config.payoff.month_cap, 120);
        assert_eq!(config.amortization, AmortizationConfig::default());
    }

    #[test]
    fn test_missing_json_file() {
        let err = CalculatorConfig::from_json_path("does/not/exist.json").unwrap_err();
        assert!(matches!(err, CalcError::ReadFile { .. }));
    }
}
