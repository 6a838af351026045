//! Bind values for dynamically built statements

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// A value bound to one placeholder of an insert statement.
///
/// PostgreSQL receives every value as text and casts it to the column's catalog type,
/// so the same value works for any column discovered at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(Value),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Convert one tabular cell
    pub fn from_json_cell(cell: &Value) -> Self {
        match cell {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Int(i)
                } else if n.is_u64() {
                    SqlValue::Text(n.to_string())
                } else {
                    n.as_f64()
                        .map(SqlValue::Float)
                        .unwrap_or_else(|| SqlValue::Text(n.to_string()))
                }
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Json(cell.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn to_sql_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Bool(b) => Some(b.to_string()),
            SqlValue::Int(i) => Some(i.to_string()),
            SqlValue::Float(f) => Some(f.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Json(v) => Some(v.to_string()),
            SqlValue::Timestamp(ts) => Some(ts.to_rfc3339_opts(SecondsFormat::Micros, true)),
        }
    }
}
