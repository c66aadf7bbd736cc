//! Index definitions.

use serde::{Deserialize, Serialize};

/// Kind of index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Plain, non-unique index.
    #[default]
    Normal,
    /// Unique index.
    Unique,
    /// Full-text index (MySQL).
    Fulltext,
}

/// Index method hint. Dialects that cannot honour it ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMethod {
    /// Let the database choose.
    #[default]
    Default,
    /// B-tree.
    Btree,
    /// Hash.
    Hash,
}

impl IndexMethod {
    /// SQL keyword for the method, `None` for the database default.
    #[must_use]
    pub fn as_sql(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Btree => Some("BTREE"),
            Self::Hash => Some("HASH"),
        }
    }
}

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    name: String,
    columns: Vec<String>,
    #[serde(default)]
    kind: IndexKind,
    #[serde(default)]
    method: IndexMethod,
}

impl Index {
    /// Creates an index.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        kind: IndexKind,
        method: IndexMethod,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            kind,
            method,
        }
    }

    /// Derives the name used when none is given: `idx_<table>_<col1>_<col2>…`.
    #[must_use]
    pub fn derive_name<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
        let joined: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
        format!("idx_{}_{}", table, joined.join("_"))
    }

    /// Index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indexed columns, in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index kind.
    #[must_use]
    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    /// Index method hint.
    #[must_use]
    pub fn method(&self) -> IndexMethod {
        self.method
    }

    /// Returns a copy of this index under another name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}
