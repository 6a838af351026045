//! Tabular payloads - CSV text parsed into named columns and rows of JSON cells

use crate::error::{LandingError, Result};
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::Read;

/// Cell texts read as missing values
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Ordered rows × named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn from_csv_str(csv_text: &str) -> Result<Self> {
        Self::from_csv_reader(csv_text.as_bytes())
    }

    /// Parse CSV with a header row. Short rows are padded with nulls.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns = dedupe_headers(rdr.headers()?.iter().map(|h| h.trim().to_string()));

        if columns.is_empty() {
            return Err(LandingError::Csv(csv::Error::from(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "CSV input has no header row",
            ))));
        }

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let row = (0..columns.len())
                .map(|idx| coerce_cell(record.get(idx).unwrap_or("")))
                .collect();
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One JSON object per row, keys in column order
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                for (header, cell) in self.columns.iter().zip(row.iter()) {
                    obj.insert(header.clone(), cell.clone());
                }
                Value::Object(obj)
            })
            .collect()
    }
}

/// Repeated headers get a `.1`, `.2`, ... suffix so no column is lost
fn dedupe_headers(headers: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for header in headers {
        let mut name = header.clone();
        let mut n = 1;
        while !seen.insert(name.clone()) {
            name = format!("{}.{}", header, n);
            n += 1;
        }
        columns.push(name);
    }
    columns
}

fn coerce_cell(s: &str) -> Value {
    let trimmed = s.trim();
    if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
        return Value::Null;
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }

    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }

    Value::String(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_csv_coerces_cells() {
        let table = Table::from_csv_str("Id,Price,Name,Active\n1,9.5,Widget,true\n2,,Gadget,FALSE\n").unwrap();
        assert_eq!(table.columns(), ["Id", "Price", "Name", "Active"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0], vec![json!(1), json!(9.5), json!("Widget"), json!(true)]);
        assert_eq!(table.rows()[1], vec![json!(2), json!(null), json!("Gadget"), json!(false)]);
    }

    #[test]
    fn test_missing_value_tokens_are_null() {
        let table = Table::from_csv_str("Id,Price,Note\n1,NULL,N/A\n2,nan,None\n3,NA,#N/A\n4,5,Nano\n").unwrap();
        assert_eq!(table.rows()[0], vec![json!(1), json!(null), json!(null)]);
        assert_eq!(table.rows()[1], vec![json!(2), json!(null), json!(null)]);
        assert_eq!(table.rows()[2], vec![json!(3), json!(null), json!(null)]);
        assert_eq!(table.rows()[3], vec![json!(4), json!(5), json!("Nano")]);
    }

    #[test]
    fn test_duplicate_headers_are_suffixed() {
        let table = Table::from_csv_str("a,b,a,a\n1,2,3,4\n").unwrap();
        assert_eq!(table.columns(), ["a", "b", "a.1", "a.2"]);
        assert_eq!(table.to_records()[0], json!({"a": 1, "b": 2, "a.1": 3, "a.2": 4}));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::from_csv_str("a,b,c\n1\n").unwrap();
        assert_eq!(table.rows()[0], vec![json!(1), json!(null), json!(null)]);
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let table = Table::from_csv_str("a,b\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(Table::from_csv_str("").is_err());
    }

    #[test]
    fn test_to_records_keeps_column_order() {
        let table = Table::from_csv_str("zeta,alpha\n1,2\n").unwrap();
        let records = table.to_records();
        assert_eq!(records.len(), 1);
        assert_eq!(serde_json::to_string(&records[0]).unwrap(), r#"{"zeta":1,"alpha":2}"#);
    }
}
