//! Foreign key definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Referential action for ON DELETE / ON UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No clause is emitted; the database default applies.
    #[default]
    Default,
    /// Restrict deletion/update.
    Restrict,
    /// No action.
    NoAction,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action, `None` for the default.
    #[must_use]
    pub fn as_sql(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Restrict => Some("RESTRICT"),
            Self::NoAction => Some("NO ACTION"),
            Self::Cascade => Some("CASCADE"),
            Self::SetNull => Some("SET NULL"),
        }
    }
}

impl fmt::Display for ForeignKeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql().unwrap_or(""))
    }
}

impl FromStr for ForeignKeyAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" => Ok(Self::Default),
            "RESTRICT" => Ok(Self::Restrict),
            "NO ACTION" => Ok(Self::NoAction),
            "CASCADE" => Ok(Self::Cascade),
            "SET NULL" => Ok(Self::SetNull),
            _ => Err(Error::InvalidValue {
                kind: "Foreign key action",
                value: s.to_string(),
                expected: "\"\", RESTRICT, NO ACTION, CASCADE, SET NULL",
            }),
        }
    }
}

/// A foreign key from local columns to columns of another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    columns: Vec<String>,
    referenced_table: String,
    referenced_columns: Vec<String>,
    #[serde(default)]
    on_delete: ForeignKeyAction,
    #[serde(default)]
    on_update: ForeignKeyAction,
}

impl ForeignKey {
    /// Creates a foreign key.
    ///
    /// Fails when either column list is empty or the lists differ in length.
    pub fn new(
        columns: Vec<String>,
        referenced_table: impl Into<String>,
        referenced_columns: Vec<String>,
        on_delete: ForeignKeyAction,
        on_update: ForeignKeyAction,
    ) -> Result<Self> {
        if columns.is_empty() || referenced_columns.is_empty() {
            return Err(Error::EmptyColumnList("Foreign key"));
        }
        if columns.len() != referenced_columns.len() {
            return Err(Error::ForeignKeyArity {
                referenced: referenced_columns.len(),
                columns,
            });
        }
        Ok(Self {
            columns,
            referenced_table: referenced_table.into(),
            referenced_columns,
            on_delete,
            on_update,
        })
    }

    /// Derives the name of a foreign key from its local columns.
    #[must_use]
    pub fn derive_name<S: AsRef<str>>(columns: &[S]) -> String {
        let joined: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
        joined.join("_")
    }

    /// Name derived from the local columns.
    #[must_use]
    pub fn name(&self) -> String {
        Self::derive_name(&self.columns)
    }

    /// Constraint name as emitted in DDL: `<table>_<name>`.
    #[must_use]
    pub fn constraint_name(&self, table: &str) -> String {
        format!("{}_{}", table, self.name())
    }

    /// Local columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Referenced table.
    #[must_use]
    pub fn referenced_table(&self) -> &str {
        &self.referenced_table
    }

    /// Referenced columns.
    #[must_use]
    pub fn referenced_columns(&self) -> &[String] {
        &self.referenced_columns
    }

    /// ON DELETE action.
    #[must_use]
    pub fn on_delete(&self) -> ForeignKeyAction {
        self.on_delete
    }

    /// ON UPDATE action.
    #[must_use]
    pub fn on_update(&self) -> ForeignKeyAction {
        self.on_update
    }
}
