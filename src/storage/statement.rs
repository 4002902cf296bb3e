//! Insert statement builder
//!
//! Records describe themselves as named column values; the builder turns a
//! column list and a table name into a positional INSERT and reorders each
//! record's values to match it.

use crate::storage::{StorageError, StorageResult};
use rusqlite::types::Value;
use std::collections::HashMap;

/// A row-shaped value with a fixed set of named columns
pub trait SqlRecord {
    /// Column names, in the order the record prefers to bind them
    fn columns() -> &'static [&'static str];

    /// The record's values keyed by column name
    fn to_sql_map(&self) -> HashMap<&'static str, Value>;
}

/// Positional INSERT for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    table: String,
    columns: Vec<String>,
    sql: String,
}

impl InsertStatement {
    /// Builds `INSERT INTO table (c1, c2, ..) VALUES (?1, ?2, ..)`
    ///
    /// # Example
    ///
    /// ```
    /// use evenflow::storage::InsertStatement;
    ///
    /// let insert = InsertStatement::new(&["url", "source"], "article");
    /// assert_eq!(insert.sql(), "INSERT INTO article (url, source) VALUES (?1, ?2)");
    /// ```
    pub fn new<S: AsRef<str>>(columns: &[S], table: &str) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );

        Self {
            table: table.to_string(),
            columns,
            sql,
        }
    }

    /// Builds the insert for every column a record type declares
    pub fn for_record<R: SqlRecord>(table: &str) -> Self {
        Self::new(R::columns(), table)
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The insert followed by `RETURNING column`
    pub fn returning(&self, column: &str) -> String {
        format!("{} RETURNING {}", self.sql, column)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Orders a record's values to match this statement's placeholders
    ///
    /// Fails if the record has no value for one of the statement's columns;
    /// extra values the statement does not use are ignored.
    pub fn order_args<R: SqlRecord>(&self, record: &R) -> StorageResult<Vec<Value>> {
        let mut values = record.to_sql_map();
        self.columns
            .iter()
            .map(|column| {
                values
                    .remove(column.as_str())
                    .ok_or_else(|| StorageError::MissingColumn {
                        table: self.table.clone(),
                        column: column.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        left: i64,
        right: &'static str,
    }

    impl SqlRecord for Pair {
        fn columns() -> &'static [&'static str] {
            &["left", "right"]
        }

        fn to_sql_map(&self) -> HashMap<&'static str, Value> {
            HashMap::from([
                ("left", Value::Integer(self.left)),
                ("right", Value::Text(self.right.to_string())),
            ])
        }
    }

    #[test]
    fn test_sql_shape() {
        let insert = InsertStatement::for_record::<Pair>("pairs");
        assert_eq!(insert.sql(), "INSERT INTO pairs (left, right) VALUES (?1, ?2)");
        assert_eq!(
            insert.returning("left"),
            "INSERT INTO pairs (left, right) VALUES (?1, ?2) RETURNING left"
        );
        assert_eq!(insert.table(), "pairs");
    }

    #[test]
    fn test_order_args_follows_statement_order() {
        let pair = Pair {
            left: 7,
            right: "r",
        };
        let reversed = InsertStatement::new(&["right", "left"], "pairs");
        assert_eq!(
            reversed.order_args(&pair).unwrap(),
            vec![Value::Text("r".to_string()), Value::Integer(7)]
        );

        let subset = InsertStatement::new(&["left"], "pairs");
        assert_eq!(subset.order_args(&pair).unwrap(), vec![Value::Integer(7)]);
    }

    #[test]
    fn test_order_args_missing_column() {
        let pair = Pair {
            left: 7,
            right: "r",
        };
        let insert = InsertStatement::new(&["left", "middle"], "pairs");
        match insert.order_args(&pair) {
            Err(StorageError::MissingColumn { table, column }) => {
                assert_eq!(table, "pairs");
                assert_eq!(column, "middle");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }
}
