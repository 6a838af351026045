//! Destination table names (`schema.table` or `table`)

use std::fmt;

/// A possibly schema-qualified table name, split on the first `.`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    schema: Option<String>,
    name: String,
}

impl TableName {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((schema, name)) => Self {
                schema: Some(schema.to_string()),
                name: name.to_string(),
            },
            None => Self {
                schema: None,
                name: raw.to_string(),
            },
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quoted identifier usable in generated SQL
    pub fn quoted(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&self.name)),
            None => quote_ident(&self.name),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<&str> for TableName {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qualified_name() {
        let table = TableName::parse("landing.lnd_items");
        assert_eq!(table.schema(), Some("landing"));
        assert_eq!(table.name(), "lnd_items");
        assert_eq!(table.to_string(), "landing.lnd_items");
    }

    #[test]
    fn test_parse_splits_on_first_dot_only() {
        let table = TableName::parse("a.b.c");
        assert_eq!(table.schema(), Some("a"));
        assert_eq!(table.name(), "b.c");
    }

    #[test]
    fn test_quoted() {
        assert_eq!(TableName::parse("lnd_items").quoted(), "\"lnd_items\"");
        assert_eq!(
            TableName::parse("landing.lnd_items").quoted(),
            "\"landing\".\"lnd_items\""
        );
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
