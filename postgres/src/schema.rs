use std::fmt;
use std::str::FromStr;

use pg_escape::quote_identifier;
use thiserror::Error;

/// Errors raised when parsing a dotted table name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableNameError {
    #[error("table name cannot be empty")]
    Empty,
    #[error("table name `{0}` contains an empty part")]
    EmptyPart(String),
    #[error("table name `{0}` has more than three parts")]
    TooManyParts(String),
}

/// A possibly catalog-qualified table name: `[catalog.][schema.]name`.
///
/// Catalog-qualified names address tables the same way across the dataframe engine and
/// Postgres, where the catalog must match the connected database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
}

impl TableName {
    pub fn new(catalog: Option<String>, schema: Option<String>, name: String) -> TableName {
        Self {
            catalog,
            schema,
            name,
        }
    }

    /// Returns the name with every part quoted only where Postgres requires it.
    pub fn as_quoted_identifier(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(catalog) = &self.catalog {
            parts.push(quote_identifier(catalog));
        }
        if let Some(schema) = &self.schema {
            parts.push(quote_identifier(schema));
        }
        parts.push(quote_identifier(&self.name));

        parts.join(".")
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(catalog) = &self.catalog {
            write!(f, "{catalog}.")?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        f.write_str(&self.name)
    }
}

impl FromStr for TableName {
    type Err = TableNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TableNameError::Empty);
        }

        let parts: Vec<&str> = s.split('.').map(str::trim).collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(TableNameError::EmptyPart(s.to_string()));
        }

        let owned = |part: &str| part.to_string();
        match parts.as_slice() {
            [name] => Ok(TableName::new(None, None, owned(name))),
            [schema, name] => Ok(TableName::new(None, Some(owned(schema)), owned(name))),
            [catalog, schema, name] => Ok(TableName::new(
                Some(owned(catalog)),
                Some(owned(schema)),
                owned(name),
            )),
            _ => Err(TableNameError::TooManyParts(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_qualified_name() {
        let table: TableName = "cdl_tp_dev.internal_tp.tp_run_lock_plc".parse().unwrap();

        assert_eq!(table.catalog.as_deref(), Some("cdl_tp_dev"));
        assert_eq!(table.schema.as_deref(), Some("internal_tp"));
        assert_eq!(table.name, "tp_run_lock_plc");
        assert_eq!(
            table.as_quoted_identifier(),
            "cdl_tp_dev.internal_tp.tp_run_lock_plc"
        );
    }

    #[test]
    fn quotes_parts_that_need_it() {
        let table = TableName::new(None, Some("Ref Data".to_string()), "users".to_string());

        assert_eq!(table.as_quoted_identifier(), "\"Ref Data\".users");
        assert_eq!(table.to_string(), "Ref Data.users");
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!("".parse::<TableName>(), Err(TableNameError::Empty));
        assert_eq!(
            "a..b".parse::<TableName>(),
            Err(TableNameError::EmptyPart("a..b".to_string()))
        );
        assert_eq!(
            "a.b.c.d".parse::<TableName>(),
            Err(TableNameError::TooManyParts("a.b.c.d".to_string()))
        );
    }
}
