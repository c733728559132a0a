//! CSV-based bracket table loader
//!
//! Expects `rate,min,max` columns with an empty `max` on the top bracket.

use csv::Reader;
use std::path::Path;

use crate::error::CalcResult;
use super::brackets::{BracketTable, TaxBracket};

/// Default bracket table shipped with the crate
pub const DEFAULT_BRACKETS_PATH: &str = "data/tax/federal_2024.csv";

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    rate: f64,
    min: f64,
    #[serde(default)]
    max: Option<f64>,
}

impl From<CsvRow> for TaxBracket {
    fn from(row: CsvRow) -> Self {
        TaxBracket::new(row.rate, row.min, row.max)
    }
}

/// Load and validate a bracket table from a CSV file
pub fn load_brackets<P: AsRef<Path>>(path: P) -> CalcResult<BracketTable> {
    let path = path.as_ref();
    log::debug!("loading tax brackets from {}", path.display());
    let reader = Reader::from_path(path)?;
    read_brackets(reader)
}

/// Load a bracket table from any reader
pub fn load_brackets_from_reader<R: std::io::Read>(reader: R) -> CalcResult<BracketTable> {
    read_brackets(Reader::from_reader(reader))
}

fn read_brackets<R: std::io::Read>(mut reader: Reader<R>) -> CalcResult<BracketTable> {
    let mut brackets = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        brackets.push(TaxBracket::from(row));
    }
    BracketTable::new(brackets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;

    #[test]
    fn test_load_default_brackets() {
        let table = load_brackets(DEFAULT_BRACKETS_PATH).expect("failed to load brackets");
        assert_eq!(table, BracketTable::federal_2024());
    }

    #[test]
    fn test_load_from_reader() {
        let data = "rate,min,max\n10,0,20000\n25,20000,\n";
        let table = load_brackets_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.brackets().len(), 2);
        assert_eq!(table.brackets()[1].max, None);
    }

    #[test]
    fn test_invalid_table_reported() {
        let data = "rate,min,max\n10,0,20000\n25,30000,\n";
        let err = load_brackets_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, CalcError::InvalidBracketTable(_)));
    }

    #[test]
    fn test_malformed_number() {
        let data = "rate,min,max\nten,0,\n";
        assert!(matches!(
            load_brackets_from_reader(data.as_bytes()),
            Err(CalcError::Csv(_))
        ));
    }
}
