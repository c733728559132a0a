//! CSV-based debt list loader
//!
//! Expects `id,name,balance,rate,minimum_payment` columns.

use csv::Reader;
use std::path::Path;

use crate::error::CalcResult;
use super::ledger::{Debt, DebtList};

/// Sample debts shipped with the crate
pub const DEFAULT_DEBTS_PATH: &str = "data/debts/sample_debts.csv";

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: String,
    name: String,
    balance: f64,
    rate: f64,
    minimum_payment: f64,
}

impl From<CsvRow> for Debt {
    fn from(row: CsvRow) -> Self {
        Debt::new(row.id, row.name, row.balance, row.rate, row.minimum_payment)
    }
}

/// Load debts from a CSV file, rejecting duplicate ids
pub fn load_debts<P: AsRef<Path>>(path: P) -> CalcResult<DebtList> {
    let path = path.as_ref();
    log::debug!("loading debts from {}", path.display());
    read_debts(Reader::from_path(path)?)
}

pub fn load_debts_from_reader<R: std::io::Read>(reader: R) -> CalcResult<DebtList> {
    read_debts(Reader::from_reader(reader))
}

fn read_debts<R: std::io::Read>(mut reader: Reader<R>) -> CalcResult<DebtList> {
    let mut list = DebtList::default();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        list = list.with_added(Debt::from(row))?;
    }
    log::info!("loaded {} debts totalling {:.2}", list.len(), list.total_balance());
    Ok(list)
}
