//! Debt records held in an ordered, id-keyed collection

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ensure_non_negative, CalcError, CalcResult};

/// Stable identifier for a debt
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebtId(String);

impl DebtId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DebtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DebtId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One debt to be repaid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: DebtId,
    pub name: String,
    pub balance: f64,
    /// Annual rate in percent
    pub rate: f64,
    pub minimum_payment: f64,
}

impl Debt {
    pub fn new(id: impl Into<String>, name: impl Into<String>, balance: f64, rate: f64, minimum_payment: f64) -> Self {
        Self {
            id: DebtId::new(id),
            name: name.into(),
            balance,
            rate,
            minimum_payment,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        ensure_non_negative("balance", self.balance)?;
        ensure_non_negative("rate", self.rate)?;
        ensure_non_negative("minimum_payment", self.minimum_payment)?;
        Ok(())
    }

    pub fn monthly_rate(&self) -> f64 {
        self.rate / 12.0 / 100.0
    }
}

/// Ordered collection of debts with unique ids
///
/// Updates never mutate in place; each returns a new list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Debt>", into = "Vec<Debt>")]
pub struct DebtList {
    debts: Vec<Debt>,
}

impl DebtList {
    pub fn new(debts: Vec<Debt>) -> CalcResult<Self> {
        let mut list = Self::default();
        for debt in debts {
            list = list.with_added(debt)?;
        }
        Ok(list)
    }

    pub fn with_added(&self, debt: Debt) -> CalcResult<Self> {
        debt.validate()?;
        if self.get(&debt.id).is_some() {
            return Err(CalcError::DuplicateDebt(debt.id.to_string()));
        }
        let mut debts = self.debts.clone();
        debts.push(debt);
        Ok(Self { debts })
    }

    /// Replace the debt with `debt.id`, keeping its position
    pub fn with_updated(&self, debt: Debt) -> CalcResult<Self> {
        debt.validate()?;
        let idx = self.position(&debt.id)?;
        let mut debts = self.debts.clone();
        debts[idx] = debt;
        Ok(Self { debts })
    }

    pub fn without(&self, id: &DebtId) -> CalcResult<Self> {
        let idx = self.position(id)?;
        let mut debts = self.debts.clone();
        debts.remove(idx);
        Ok(Self { debts })
    }

    pub fn get(&self, id: &DebtId) -> Option<&Debt> {
        self.debts.iter().find(|d| &d.id == id)
    }

    fn position(&self, id: &DebtId) -> CalcResult<usize> {
        self.debts
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| CalcError::UnknownDebt(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Debt> {
        self.debts.iter()
    }

    pub fn as_slice(&self) -> &[Debt] {
        &self.debts
    }

    pub fn len(&self) -> usize {
        self.debts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }

    pub fn total_balance(&self) -> f64 {
        self.debts.iter().map(|d| d.balance).sum()
    }

    pub fn total_minimum_payment(&self) -> f64 {
        self.debts.iter().map(|d| d.minimum_payment).sum()
    }
}

impl TryFrom<Vec<Debt>> for DebtList {
    type Error = CalcError;

    fn try_from(debts: Vec<Debt>) -> Result<Self, Self::Error> {
        Self::new(debts)
    }
}

impl From<DebtList> for Vec<Debt> {
    fn from(list: DebtList) -> Self {
        list.debts
    }
}
