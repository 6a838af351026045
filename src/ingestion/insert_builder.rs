//! Conditional insert construction.
//!
//! Metadata columns are only referenced when the destination declares them, so the
//! builder collects (column, value) pairs against a [`TableSchema`] and renders the
//! final statement once.

use crate::db::{ColumnInfo, InsertStatement, SqlValue, TableName};
use crate::ingestion::schema_inspector::TableSchema;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Document,
    Fixed(SqlValue),
}

pub struct InsertBuilder<'a> {
    table: TableName,
    schema: &'a TableSchema,
    columns: Vec<ColumnInfo>,
    slots: Vec<Slot>,
}

impl<'a> InsertBuilder<'a> {
    pub fn new(table: TableName, schema: &'a TableSchema) -> Self {
        Self {
            table,
            schema,
            columns: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Column receiving each record. Always referenced, declared or not.
    pub fn document(mut self, column: &str) -> Self {
        let info = self
            .schema
            .column(column)
            .cloned()
            .unwrap_or_else(|| ColumnInfo::untyped(column));
        self.columns.push(info);
        self.slots.push(Slot::Document);
        self
    }

    /// Same value for every row, if the table declares `column`
    pub fn value_if_present(mut self, column: &str, value: SqlValue) -> Self {
        if let Some(info) = self.schema.column(column) {
            self.columns.push(info.clone());
            self.slots.push(Slot::Fixed(value));
        }
        self
    }

    /// Like [`InsertBuilder::value_if_present`], skipped when no value was supplied
    pub fn optional(self, column: &str, value: Option<SqlValue>) -> Self {
        match value {
            Some(value) => self.value_if_present(column, value),
            None => self,
        }
    }

    pub fn build(self) -> RowTemplate {
        RowTemplate {
            statement: InsertStatement::new(self.table, self.columns),
            slots: self.slots,
        }
    }
}

/// A rendered insert plus the recipe for each row's values
#[derive(Debug, Clone, PartialEq)]
pub struct RowTemplate {
    statement: InsertStatement,
    slots: Vec<Slot>,
}

impl RowTemplate {
    pub fn statement(&self) -> &InsertStatement {
        &self.statement
    }

    pub fn row(&self, document: &Value) -> Vec<SqlValue> {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Document => SqlValue::Json(document.clone()),
                Slot::Fixed(value) => value.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(columns: &[&str]) -> TableSchema {
        TableSchema::new(columns.iter().map(|c| ColumnInfo::untyped(*c)).collect())
    }

    #[test]
    fn test_absent_columns_are_not_referenced() {
        let schema = schema(&["raw_data", "loaded_at"]);
        let template = InsertBuilder::new(TableName::parse("lnd_items"), &schema)
            .document("raw_data")
            .value_if_present("loaded_at", SqlValue::Int(1))
            .optional("api_endpoint", Some(SqlValue::Text("https://api.example/items".into())))
            .value_if_present("request_timestamp", SqlValue::Int(2))
            .build();

        let sql = template.statement().render(1);
        assert_eq!(sql, r#"INSERT INTO "lnd_items" ("raw_data", "loaded_at") VALUES ($1, $2)"#);
        assert!(!sql.contains("api_endpoint"));
        assert!(!sql.contains("request_timestamp"));
    }

    #[test]
    fn test_optional_without_value_is_skipped() {
        let schema = schema(&["raw_data", "file_name"]);
        let template = InsertBuilder::new(TableName::parse("lnd_items"), &schema)
            .document("raw_data")
            .optional("file_name", None)
            .build();
        assert_eq!(template.statement().column_names(), vec!["raw_data"]);
    }

    #[test]
    fn test_row_follows_column_order() {
        let schema = schema(&["response_status", "raw_data"]);
        let template = InsertBuilder::new(TableName::parse("lnd_items"), &schema)
            .document("raw_data")
            .optional("response_status", Some(SqlValue::Int(200)))
            .build();

        let row = template.row(&json!({"id": 7}));
        assert_eq!(row, vec![SqlValue::Json(json!({"id": 7})), SqlValue::Int(200)]);
    }

    #[test]
    fn test_document_column_uses_catalog_type() {
        let schema = TableSchema::new(vec![ColumnInfo::new("raw_data", Some("jsonb"))]);
        let template = InsertBuilder::new(TableName::parse("t"), &schema)
            .document("raw_data")
            .build();
        assert_eq!(template.statement().columns()[0].udt_name.as_deref(), Some("jsonb"));
    }
}
