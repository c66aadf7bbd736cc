//! Column/value rows for inserts and updates.

use crate::value::{SqlValue, ToSqlValue};

/// An ordered column → value mapping.
///
/// Setting a column twice keeps its first position and the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of a column.
    #[must_use]
    pub fn set<V: ToSqlValue>(mut self, column: impl Into<String>, value: V) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets the value of a column in place.
    pub fn insert<V: ToSqlValue>(&mut self, column: impl Into<String>, value: V) {
        let column = column.into();
        let value = value.to_sql_value();
        match self.values.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((column, value)),
        }
    }

    /// Gets the value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Column names, in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(c, _)| c.as_str())
    }

    /// Column/value pairs, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no column.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether both rows set exactly the same columns, in any order.
    #[must_use]
    pub fn same_columns(&self, other: &Row) -> bool {
        self.len() == other.len() && self.columns().all(|c| other.get(c).is_some())
    }

    pub(crate) fn into_pairs(self) -> Vec<(String, SqlValue)> {
        self.values
    }
}

impl<S: Into<String>, V: ToSqlValue> FromIterator<(S, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// Data of an insert: one row or several rows sharing their columns.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertData {
    /// One row.
    Single(Row),
    /// Several rows inserted by one statement.
    Multi(Vec<Row>),
}

impl From<Row> for InsertData {
    fn from(row: Row) -> Self {
        Self::Single(row)
    }
}

impl From<Vec<Row>> for InsertData {
    fn from(rows: Vec<Row>) -> Self {
        Self::Multi(rows)
    }
}
