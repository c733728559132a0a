//! Monthly budget: income and expense categories, surplus and category shares
//!
//! Budget CSV files carry `id,name,kind,amount` columns, `kind` being
//! `income` or `expense`.

use csv::Reader;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ensure_non_negative, CalcError, CalcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

/// One budget category with its monthly amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub id: String,
    pub name: String,
    pub kind: CategoryKind,
    pub amount: f64,
}

impl BudgetLine {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: CategoryKind, amount: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            amount,
        }
    }

    /// Standard categories, all at zero
    pub fn defaults() -> Vec<BudgetLine> {
        use CategoryKind::{Expense, Income};
        [
            ("salary", "Salary", Income),
            ("investments", "Investment Income", Income),
            ("other-income", "Other Income", Income),
            ("housing", "Housing", Expense),
            ("transportation", "Transportation", Expense),
            ("food", "Food & Dining", Expense),
            ("utilities", "Utilities", Expense),
            ("healthcare", "Healthcare", Expense),
        ]
        .into_iter()
        .map(|(id, name, kind)| BudgetLine::new(id, name, kind, 0.0))
        .collect()
    }
}

/// Set the amount of the line with `id`
pub fn set_amount(lines: &mut [BudgetLine], id: &str, amount: f64) -> CalcResult<()> {
    let line = lines
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or_else(|| CalcError::invalid("category", format!("unknown budget category '{id}'")))?;
    line.amount = ensure_non_negative("amount", amount)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub id: String,
    pub name: String,
    pub kind: CategoryKind,
    pub amount: f64,
    /// Percent of its side's total; `None` when that total is zero
    pub share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    /// Income minus expenses; negative for a deficit
    pub surplus: f64,
    /// Surplus as a percent of income; `None` without income
    pub savings_rate: Option<f64>,
    pub categories: Vec<CategoryShare>,
}

impl BudgetSummary {
    pub fn is_deficit(&self) -> bool {
        self.surplus < 0.0
    }

    pub fn of_kind(&self, kind: CategoryKind) -> impl Iterator<Item = &CategoryShare> {
        self.categories.iter().filter(move |c| c.kind == kind)
    }
}

/// Totals, surplus and per-category shares for one month
pub fn budget_plan(lines: &[BudgetLine]) -> CalcResult<BudgetSummary> {
    let mut seen = HashSet::new();
    for line in lines {
        ensure_non_negative("amount", line.amount)?;
        if !seen.insert(line.id.as_str()) {
            return Err(CalcError::invalid("category", format!("duplicate budget category '{}'", line.id)));
        }
    }

    let total = |kind: CategoryKind| -> f64 { lines.iter().filter(|l| l.kind == kind).map(|l| l.amount).sum() };
    let total_income = total(CategoryKind::Income);
    let total_expenses = total(CategoryKind::Expense);
    let surplus = total_income - total_expenses;

    let categories = lines
        .iter()
        .map(|line| {
            let side = match line.kind {
                CategoryKind::Income => total_income,
                CategoryKind::Expense => total_expenses,
            };
            CategoryShare {
                id: line.id.clone(),
                name: line.name.clone(),
                kind: line.kind,
                amount: line.amount,
                share: (side > 0.0).then(|| line.amount / side * 100.0),
            }
        })
        .collect();

    if surplus < 0.0 {
        log::debug!("budget runs a deficit of {:.2}", -surplus);
    }

    Ok(BudgetSummary {
        total_income,
        total_expenses,
        surplus,
        savings_rate: (total_income > 0.0).then(|| surplus / total_income * 100.0),
        categories,
    })
}

/// Load budget lines from a CSV file
pub fn load_budget<P: AsRef<Path>>(path: P) -> CalcResult<Vec<BudgetLine>> {
    let path = path.as_ref();
    log::debug!("loading budget from {}", path.display());
    read_budget(Reader::from_path(path)?)
}

pub fn load_budget_from_reader<R: std::io::Read>(reader: R) -> CalcResult<Vec<BudgetLine>> {
    read_budget(Reader::from_reader(reader))
}

fn read_budget<R: std::io::Read>(mut reader: Reader<R>) -> CalcResult<Vec<BudgetLine>> {
    let lines = reader.deserialize().collect::<Result<Vec<BudgetLine>, _>>()?;
    log::info!("loaded {} budget categories", lines.len());
    Ok(lines)
}
