//! Resolved table snapshot.

use serde::{Deserialize, Serialize};

use super::{Column, ForeignKey, Index};

/// What a table looks like: the terminal projection of a create or copy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Primary key column(s), in order.
    #[serde(default)]
    pub primary: Vec<String>,
    /// Column definitions, in declaration order.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Index definitions.
    #[serde(default)]
    pub indexes: Vec<Index>,
    /// Foreign key definitions.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Default character set.
    #[serde(default)]
    pub charset: Option<String>,
    /// Default collation.
    #[serde(default)]
    pub collation: Option<String>,
    /// Table comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl Table {
    /// Creates an empty table snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the primary key columns.
    pub fn set_primary(&mut self, columns: Vec<String>) {
        self.primary = columns;
    }

    /// Adds a column, replacing any column of the same name in place.
    pub fn add_column(&mut self, column: Column) {
        match self.columns.iter_mut().find(|c| c.name() == column.name()) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// Adds an index.
    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// Adds a foreign key.
    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        self.foreign_keys.push(foreign_key);
    }

    /// Gets a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Gets an index by name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name() == name)
    }

    /// Gets a foreign key by its derived name.
    #[must_use]
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.name() == name)
    }

    /// Returns a copy of this table under another name.
    ///
    /// Index names derived from the old table name are derived again from
    /// the new one, so the copy does not collide with the original indexes.
    #[must_use]
    pub fn renamed(&self, new_name: &str) -> Self {
        let old_prefix = format!("idx_{}_", self.name);
        let indexes = self
            .indexes
            .iter()
            .map(|index| {
                if index.name() == Index::derive_name(&self.name, index.columns()) {
                    index.renamed(Index::derive_name(new_name, index.columns()))
                } else if let Some(rest) = index.name().strip_prefix(&old_prefix) {
                    index.renamed(format!("idx_{new_name}_{rest}"))
                } else {
                    index.clone()
                }
            })
            .collect();
        Self {
            name: new_name.to_string(),
            indexes,
            ..self.clone()
        }
    }
}
