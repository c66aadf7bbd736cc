//! The mutable change-descriptor consumed by the query builders.
//!
//! A [`MigrationTable`] is built per desired change, mutated through chained
//! calls, translated once by a [`QueryBuilder`](crate::query::QueryBuilder)
//! and discarded.
//!
//! ```rust
//! use rivet_core::schema::{ColumnSettings, ColumnType, IndexKind, IndexMethod, MigrationTable};
//!
//! let table = MigrationTable::new("posts")
//!     .add_column("title", ColumnType::String, ColumnSettings::new().length(200))
//!     .add_index(&["title"], IndexKind::Unique, IndexMethod::Default, None)
//!     .unwrap()
//!     .create();
//!
//! assert_eq!(table.primary_columns(), ["id"]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    Column, ColumnSettings, ColumnType, ForeignKey, ForeignKeyAction, Index, IndexKind,
    IndexMethod, Table,
};
use crate::error::{Error, Result};

/// What to copy when copying a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyMode {
    /// Create the new table only.
    #[default]
    OnlyStructure,
    /// Copy rows into an existing table.
    OnlyData,
    /// Create the new table and copy rows into it.
    StructureAndData,
}

impl CopyMode {
    /// Canonical name of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnlyStructure => "only_structure",
            Self::OnlyData => "only_data",
            Self::StructureAndData => "structure_and_data",
        }
    }

    /// Whether the new table has to be created.
    #[must_use]
    pub fn copies_structure(self) -> bool {
        matches!(self, Self::OnlyStructure | Self::StructureAndData)
    }

    /// Whether rows have to be copied.
    #[must_use]
    pub fn copies_data(self) -> bool {
        matches!(self, Self::OnlyData | Self::StructureAndData)
    }
}

impl fmt::Display for CopyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CopyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "only_structure" => Ok(Self::OnlyStructure),
            "only_data" => Ok(Self::OnlyData),
            "structure_and_data" => Ok(Self::StructureAndData),
            _ => Err(Error::InvalidValue {
                kind: "Copy type",
                value: s.to_string(),
                expected: "only_structure, only_data, structure_and_data",
            }),
        }
    }
}

/// The single action a change-descriptor performs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableAction {
    /// Create the table.
    Create,
    /// Alter the existing table.
    #[default]
    Alter,
    /// Rename the table.
    Rename {
        /// New table name.
        new_name: String,
    },
    /// Drop the table.
    Drop,
    /// Copy the table.
    Copy {
        /// Name of the copy.
        new_name: String,
        /// What to copy.
        mode: CopyMode,
    },
}

/// Primary key declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryKey {
    /// The table has no primary key.
    None,
    /// Synthesize an autoincrement integer column named `id`.
    #[default]
    Auto,
    /// Reuse an existing column.
    Column(String),
    /// Reuse existing columns.
    Columns(Vec<String>),
    /// Add the given column and make it the primary key.
    Definition(Column),
    /// Add the given columns and make them the primary key.
    Definitions(Vec<Column>),
}

impl PrimaryKey {
    /// The column synthesized by [`PrimaryKey::Auto`].
    #[must_use]
    pub fn auto_column() -> Column {
        Column::with_settings(
            "id",
            ColumnType::Integer,
            ColumnSettings::new().autoincrement(),
        )
    }
}

impl From<bool> for PrimaryKey {
    fn from(value: bool) -> Self {
        if value {
            Self::Auto
        } else {
            Self::None
        }
    }
}

impl From<&str> for PrimaryKey {
    fn from(value: &str) -> Self {
        Self::Column(value.to_string())
    }
}

impl From<Vec<&str>> for PrimaryKey {
    fn from(value: Vec<&str>) -> Self {
        Self::Columns(value.into_iter().map(String::from).collect())
    }
}

impl From<Column> for PrimaryKey {
    fn from(value: Column) -> Self {
        Self::Definition(value)
    }
}

impl From<Vec<Column>> for PrimaryKey {
    fn from(value: Vec<Column>) -> Self {
        Self::Definitions(value)
    }
}

/// A pending schema change on one table.
///
/// Deserializing a descriptor whose action is `create` resolves its pending
/// primary key the way [`create`](Self::create) does, unless the file lists
/// `primary_columns` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MigrationTableData")]
pub struct MigrationTable {
    name: String,
    action: TableAction,
    pending_primary: PrimaryKey,
    charset: Option<String>,
    collation: Option<String>,
    comment: Option<String>,
    columns: Vec<Column>,
    primary_columns: Vec<String>,
    indexes: Vec<Index>,
    foreign_keys: Vec<ForeignKey>,
    columns_to_drop: Vec<String>,
    indexes_to_drop: Vec<String>,
    foreign_keys_to_drop: Vec<String>,
    columns_to_change: Vec<(String, Column)>,
    drop_primary_key: bool,
}

/// Serialized form of [`MigrationTable`], with defaults for hand-written files.
#[derive(Deserialize)]
struct MigrationTableData {
    name: String,
    #[serde(default)]
    action: TableAction,
    #[serde(default = "default_pending_primary")]
    pending_primary: PrimaryKey,
    #[serde(default)]
    charset: Option<String>,
    #[serde(default)]
    collation: Option<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    primary_columns: Vec<String>,
    #[serde(default)]
    indexes: Vec<Index>,
    #[serde(default)]
    foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    columns_to_drop: Vec<String>,
    #[serde(default)]
    indexes_to_drop: Vec<String>,
    #[serde(default)]
    foreign_keys_to_drop: Vec<String>,
    #[serde(default)]
    columns_to_change: Vec<(String, Column)>,
    #[serde(default)]
    drop_primary_key: bool,
}

fn default_pending_primary() -> PrimaryKey {
    PrimaryKey::Auto
}

impl From<MigrationTableData> for MigrationTable {
    fn from(data: MigrationTableData) -> Self {
        let table = Self {
            name: data.name,
            action: data.action,
            pending_primary: data.pending_primary,
            charset: data.charset,
            collation: data.collation,
            comment: data.comment,
            columns: data.columns,
            primary_columns: data.primary_columns,
            indexes: data.indexes,
            foreign_keys: data.foreign_keys,
            columns_to_drop: data.columns_to_drop,
            indexes_to_drop: data.indexes_to_drop,
            foreign_keys_to_drop: data.foreign_keys_to_drop,
            columns_to_change: data.columns_to_change,
            drop_primary_key: data.drop_primary_key,
        };
        if table.action == TableAction::Create && table.primary_columns.is_empty() {
            table.create()
        } else {
            table
        }
    }
}

impl MigrationTable {
    /// Creates a change-descriptor whose primary key, if the table gets
    /// created, is an autoincrement integer `id`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_primary(name, PrimaryKey::Auto)
    }

    /// Creates a change-descriptor with an explicit primary key declaration,
    /// resolved when [`create`](Self::create) is called.
    #[must_use]
    pub fn with_primary(name: impl Into<String>, primary: impl Into<PrimaryKey>) -> Self {
        Self {
            name: name.into(),
            action: TableAction::Alter,
            pending_primary: primary.into(),
            charset: None,
            collation: None,
            comment: None,
            columns: Vec::new(),
            primary_columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            columns_to_drop: Vec::new(),
            indexes_to_drop: Vec::new(),
            foreign_keys_to_drop: Vec::new(),
            columns_to_change: Vec::new(),
            drop_primary_key: false,
        }
    }

    // Columns

    /// Adds a column. A column of the same name is overwritten in place.
    #[must_use]
    pub fn add_column(
        mut self,
        name: impl Into<String>,
        column_type: ColumnType,
        settings: ColumnSettings,
    ) -> Self {
        self.put_column(Column::with_settings(name, column_type, settings));
        self
    }

    /// Replaces column `old_name` with a new definition.
    ///
    /// When `old_name` was added in this same change set, the addition is
    /// replaced in place; otherwise the change targets the persisted table.
    #[must_use]
    pub fn change_column(
        mut self,
        old_name: &str,
        new_name: impl Into<String>,
        column_type: ColumnType,
        settings: ColumnSettings,
    ) -> Self {
        let column = Column::with_settings(new_name, column_type, settings);
        if let Some(existing) = self.columns.iter_mut().find(|c| c.name() == old_name) {
            *existing = column;
            return self;
        }
        match self
            .columns_to_change
            .iter_mut()
            .find(|(old, _)| old == old_name)
        {
            Some((_, existing)) => *existing = column,
            None => self.columns_to_change.push((old_name.to_string(), column)),
        }
        self
    }

    /// Drops a column.
    #[must_use]
    pub fn drop_column(mut self, name: impl Into<String>) -> Self {
        self.columns_to_drop.push(name.into());
        self
    }

    // Primary key

    /// Adds primary key column(s).
    ///
    /// New primary columns are placed ahead of the ones declared earlier, and
    /// column definitions are placed ahead of the other columns.
    #[must_use]
    pub fn add_primary(mut self, primary: impl Into<PrimaryKey>) -> Self {
        match primary.into() {
            PrimaryKey::None => {}
            PrimaryKey::Auto => self.prepend_primary_column(PrimaryKey::auto_column()),
            PrimaryKey::Column(name) => self.prepend_primary_name(name),
            PrimaryKey::Columns(names) => {
                for name in names.into_iter().rev() {
                    self.prepend_primary_name(name);
                }
            }
            PrimaryKey::Definition(column) => self.prepend_primary_column(column),
            PrimaryKey::Definitions(columns) => {
                for column in columns.into_iter().rev() {
                    self.prepend_primary_column(column);
                }
            }
        }
        self
    }

    /// Drops the primary key.
    #[must_use]
    pub fn drop_primary_key(mut self) -> Self {
        self.drop_primary_key = true;
        self
    }

    // Indexes

    /// Adds an index. Without a name, the name is derived as
    /// `idx_<table>_<columns>`.
    ///
    /// An index of the same name declared earlier is replaced in place.
    /// Fails when `columns` is empty.
    pub fn add_index(
        mut self,
        columns: &[&str],
        kind: IndexKind,
        method: IndexMethod,
        name: Option<&str>,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::EmptyColumnList("Index"));
        }
        let name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => Index::derive_name(&self.name, columns),
        };
        let columns = columns.iter().map(|c| (*c).to_string()).collect();
        let index = Index::new(name, columns, kind, method);
        match self.indexes.iter_mut().find(|i| i.name() == index.name()) {
            Some(existing) => *existing = index,
            None => self.indexes.push(index),
        }
        Ok(self)
    }

    /// Drops the index whose name is derived from `columns`.
    ///
    /// Fails when `columns` is empty.
    pub fn drop_index(self, columns: &[&str]) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::EmptyColumnList("Index"));
        }
        let name = Index::derive_name(&self.name, columns);
        Ok(self.drop_index_by_name(name))
    }

    /// Drops an index by name.
    #[must_use]
    pub fn drop_index_by_name(mut self, name: impl Into<String>) -> Self {
        self.indexes_to_drop.push(name.into());
        self
    }

    // Foreign keys

    /// Adds a foreign key.
    ///
    /// Fails when a column list is empty or the two lists differ in length.
    pub fn add_foreign_key(
        mut self,
        columns: &[&str],
        referenced_table: &str,
        referenced_columns: &[&str],
        on_delete: ForeignKeyAction,
        on_update: ForeignKeyAction,
    ) -> Result<Self> {
        let foreign_key = ForeignKey::new(
            columns.iter().map(|c| (*c).to_string()).collect(),
            referenced_table,
            referenced_columns.iter().map(|c| (*c).to_string()).collect(),
            on_delete,
            on_update,
        )?;
        self.foreign_keys.push(foreign_key);
        Ok(self)
    }

    /// Drops the foreign key whose name is derived from `columns`.
    #[must_use]
    pub fn drop_foreign_key(mut self, columns: &[&str]) -> Self {
        self.foreign_keys_to_drop
            .push(ForeignKey::derive_name(columns));
        self
    }

    // Table options

    /// Sets the default character set.
    #[must_use]
    pub fn set_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the default collation.
    #[must_use]
    pub fn set_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the table comment.
    #[must_use]
    pub fn set_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Removes the table comment.
    #[must_use]
    pub fn unset_comment(self) -> Self {
        self.set_comment("")
    }

    // Actions

    /// Marks the table for creation and resolves the pending primary key.
    #[must_use]
    pub fn create(mut self) -> Self {
        self.action = TableAction::Create;
        let primary = std::mem::replace(&mut self.pending_primary, PrimaryKey::None);
        self.add_primary(primary)
    }

    /// Marks the table for alteration (the default action).
    #[must_use]
    pub fn save(mut self) -> Self {
        self.action = TableAction::Alter;
        self
    }

    /// Marks the table for dropping.
    #[must_use]
    pub fn drop(mut self) -> Self {
        self.action = TableAction::Drop;
        self
    }

    /// Marks the table for renaming.
    #[must_use]
    pub fn rename(mut self, new_name: impl Into<String>) -> Self {
        self.action = TableAction::Rename {
            new_name: new_name.into(),
        };
        self
    }

    /// Marks the table for copying.
    #[must_use]
    pub fn copy(mut self, new_name: impl Into<String>, mode: CopyMode) -> Self {
        self.action = TableAction::Copy {
            new_name: new_name.into(),
            mode,
        };
        self
    }

    /// Marks the table for copying, parsing the copy mode from its name.
    ///
    /// Fails on an unknown mode before anything is recorded.
    pub fn copy_as(self, new_name: impl Into<String>, mode: &str) -> Result<Self> {
        let mode = mode.parse::<CopyMode>()?;
        Ok(self.copy(new_name, mode))
    }

    // Accessors

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active action.
    #[must_use]
    pub fn action(&self) -> &TableAction {
        &self.action
    }

    /// New name of a rename or copy.
    #[must_use]
    pub fn new_name(&self) -> Option<&str> {
        match &self.action {
            TableAction::Rename { new_name } | TableAction::Copy { new_name, .. } => {
                Some(new_name)
            }
            _ => None,
        }
    }

    /// Copy mode of a copy.
    #[must_use]
    pub fn copy_mode(&self) -> Option<CopyMode> {
        match &self.action {
            TableAction::Copy { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    /// Columns to add, in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Gets a column to add by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Primary key columns.
    #[must_use]
    pub fn primary_columns(&self) -> &[String] {
        &self.primary_columns
    }

    /// Indexes to add.
    #[must_use]
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Foreign keys to add.
    #[must_use]
    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Columns to drop.
    #[must_use]
    pub fn columns_to_drop(&self) -> &[String] {
        &self.columns_to_drop
    }

    /// Index names to drop.
    #[must_use]
    pub fn indexes_to_drop(&self) -> &[String] {
        &self.indexes_to_drop
    }

    /// Foreign key names to drop.
    #[must_use]
    pub fn foreign_keys_to_drop(&self) -> &[String] {
        &self.foreign_keys_to_drop
    }

    /// Column replacements keyed by the old column name.
    #[must_use]
    pub fn columns_to_change(&self) -> &[(String, Column)] {
        &self.columns_to_change
    }

    /// Whether the primary key is dropped.
    #[must_use]
    pub fn has_primary_key_to_drop(&self) -> bool {
        self.drop_primary_key
    }

    /// Default character set.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Default collation.
    #[must_use]
    pub fn collation(&self) -> Option<&str> {
        self.collation.as_deref()
    }

    /// Table comment; `Some("")` removes the comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Whether an alter would change anything.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.columns.is_empty()
            || !self.primary_columns.is_empty()
            || !self.indexes.is_empty()
            || !self.foreign_keys.is_empty()
            || !self.columns_to_drop.is_empty()
            || !self.indexes_to_drop.is_empty()
            || !self.foreign_keys_to_drop.is_empty()
            || !self.columns_to_change.is_empty()
            || self.drop_primary_key
            || self.charset.is_some()
            || self.collation.is_some()
            || self.comment.is_some()
    }

    /// Projects the declared structure into a [`Table`] snapshot.
    #[must_use]
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(self.name.clone());
        table.charset = self.charset.clone();
        table.collation = self.collation.clone();
        table.comment = self.comment.clone();
        if !self.primary_columns.is_empty() {
            table.set_primary(self.primary_columns.clone());
        }
        for column in &self.columns {
            table.add_column(column.clone());
        }
        for index in &self.indexes {
            table.add_index(index.clone());
        }
        for foreign_key in &self.foreign_keys {
            table.add_foreign_key(foreign_key.clone());
        }
        table
    }

    fn put_column(&mut self, column: Column) {
        match self.columns.iter_mut().find(|c| c.name() == column.name()) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    fn prepend_primary_name(&mut self, name: String) {
        self.primary_columns.retain(|c| *c != name);
        self.primary_columns.insert(0, name);
    }

    fn prepend_primary_column(&mut self, column: Column) {
        let name = column.name().to_string();
        self.columns.retain(|c| c.name() != name);
        self.columns.insert(0, column);
        self.prepend_primary_name(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DefaultValue;

    #[test]
    fn test_default_action_is_alter() {
        let table = MigrationTable::new("users");
        assert_eq!(table.action(), &TableAction::Alter);
        assert!(table.primary_columns().is_empty());
        assert!(!table.has_changes());
    }

    #[test]
    fn test_last_action_wins() {
        let table = MigrationTable::new("users").drop().create();
        assert_eq!(table.action(), &TableAction::Create);
        assert_eq!(table.new_name(), None);

        let table = MigrationTable::new("users").rename("people").drop();
        assert_eq!(table.action(), &TableAction::Drop);
        assert_eq!(table.new_name(), None);

        let table = MigrationTable::new("users")
            .copy("users_copy", CopyMode::OnlyData)
            .rename("people");
        assert_eq!(table.new_name(), Some("people"));
        assert_eq!(table.copy_mode(), None);
    }

    #[test]
    fn test_create_resolves_auto_primary() {
        let table = MigrationTable::new("users")
            .add_column("name", ColumnType::String, ColumnSettings::new())
            .create();

        assert_eq!(table.primary_columns(), ["id"]);
        let names: Vec<&str> = table.columns().iter().map(Column::name).collect();
        assert_eq!(names, ["id", "name"]);
        let id = table.column("id").unwrap();
        assert_eq!(id.column_type(), ColumnType::Integer);
        assert!(id.is_autoincrement());
        assert!(!id.allows_null());
    }

    #[test]
    fn test_create_without_primary() {
        let table = MigrationTable::with_primary("pivot", false)
            .add_column("a", ColumnType::Integer, ColumnSettings::new())
            .create();
        assert!(table.primary_columns().is_empty());
        assert_eq!(table.columns().len(), 1);
    }

    #[test]
    fn test_create_with_existing_column_names() {
        let table = MigrationTable::with_primary("pivot", vec!["a", "b"])
            .add_column("a", ColumnType::Integer, ColumnSettings::new())
            .add_column("b", ColumnType::Integer, ColumnSettings::new())
            .create();
        assert_eq!(table.primary_columns(), ["a", "b"]);
        let names: Vec<&str> = table.columns().iter().map(Column::name).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_create_with_column_definitions() {
        let table = MigrationTable::with_primary(
            "sessions",
            vec![
                Column::new("user_id", ColumnType::Integer),
                Column::new("token", ColumnType::String),
            ],
        )
        .add_column("data", ColumnType::Text, ColumnSettings::new())
        .create();

        assert_eq!(table.primary_columns(), ["user_id", "token"]);
        let names: Vec<&str> = table.columns().iter().map(Column::name).collect();
        assert_eq!(names, ["user_id", "token", "data"]);
    }

    #[test]
    fn test_later_primary_calls_take_priority() {
        let table = MigrationTable::with_primary("t", false)
            .add_primary("b")
            .add_primary(vec!["x", "y"])
            .add_primary("b");
        assert_eq!(table.primary_columns(), ["b", "x", "y"]);
    }

    #[test]
    fn test_add_column_overwrites() {
        let table = MigrationTable::new("users")
            .add_column("a", ColumnType::Integer, ColumnSettings::new())
            .add_column("b", ColumnType::Integer, ColumnSettings::new())
            .add_column("a", ColumnType::Text, ColumnSettings::new().nullable());
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.columns()[0].column_type(), ColumnType::Text);
        assert!(table.columns()[0].allows_null());
    }

    #[test]
    fn test_change_column_of_added_column() {
        let table = MigrationTable::new("users")
            .add_column("title", ColumnType::String, ColumnSettings::new())
            .add_column("body", ColumnType::Text, ColumnSettings::new())
            .change_column("title", "headline", ColumnType::Text, ColumnSettings::new());

        let names: Vec<&str> = table.columns().iter().map(Column::name).collect();
        assert_eq!(names, ["headline", "body"]);
        assert!(table.columns_to_change().is_empty());
    }

    #[test]
    fn test_change_column_of_persisted_column() {
        let table = MigrationTable::new("users")
            .change_column("title", "headline", ColumnType::Text, ColumnSettings::new())
            .change_column(
                "title",
                "heading",
                ColumnType::String,
                ColumnSettings::new().default_value(DefaultValue::String(String::new())),
            );

        assert!(table.columns().is_empty());
        assert_eq!(table.columns_to_change().len(), 1);
        let (old, column) = &table.columns_to_change()[0];
        assert_eq!(old, "title");
        assert_eq!(column.name(), "heading");
    }

    #[test]
    fn test_derived_names() {
        let table = MigrationTable::new("posts")
            .add_index(&["user_id", "slug"], IndexKind::Unique, IndexMethod::Default, None)
            .unwrap()
            .add_index(&["title"], IndexKind::Normal, IndexMethod::Hash, Some("by_title"))
            .unwrap()
            .drop_index(&["created_at"])
            .unwrap()
            .drop_index_by_name("legacy")
            .drop_foreign_key(&["user_id"])
            .drop_foreign_key(&["blog_id", "author_id"]);

        assert_eq!(table.indexes()[0].name(), "idx_posts_user_id_slug");
        assert_eq!(table.indexes()[1].name(), "by_title");
        assert_eq!(table.indexes_to_drop(), ["idx_posts_created_at", "legacy"]);
        assert_eq!(table.foreign_keys_to_drop(), ["user_id", "blog_id_author_id"]);
    }

    #[test]
    fn test_add_foreign_key_validates() {
        let err = MigrationTable::new("posts")
            .add_foreign_key(
                &["user_id"],
                "users",
                &["id", "tenant_id"],
                ForeignKeyAction::Cascade,
                ForeignKeyAction::Default,
            )
            .unwrap_err();
        assert!(matches!(err, Error::ForeignKeyArity { .. }));
    }

    #[test]
    fn test_copy_mode_parsing() {
        let table = MigrationTable::new("users")
            .copy_as("users_copy", "structure_and_data")
            .unwrap();
        assert_eq!(table.copy_mode(), Some(CopyMode::StructureAndData));
        assert_eq!(table.new_name(), Some("users_copy"));

        let err = MigrationTable::new("users")
            .copy_as("users_copy", "everything")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { kind: "Copy type", .. }));
    }

    #[test]
    fn test_unset_comment() {
        let table = MigrationTable::new("users").set_comment("People").unset_comment();
        assert_eq!(table.comment(), Some(""));
        assert!(table.has_changes());
    }

    #[test]
    fn test_to_table_round_trip() {
        let table = MigrationTable::new("posts")
            .add_column("user_id", ColumnType::Integer, ColumnSettings::new())
            .add_column("title", ColumnType::String, ColumnSettings::new().length(100))
            .add_index(&["title"], IndexKind::Unique, IndexMethod::Default, None)
            .unwrap()
            .add_foreign_key(
                &["user_id"],
                "users",
                &["id"],
                ForeignKeyAction::Cascade,
                ForeignKeyAction::Default,
            )
            .unwrap()
            .set_charset("utf8mb4")
            .set_comment("Blog posts")
            .create();

        let snapshot = table.to_table();
        assert_eq!(snapshot.name, "posts");
        assert_eq!(snapshot.primary, vec!["id"]);
        assert_eq!(snapshot.columns, table.columns());
        assert_eq!(snapshot.indexes, table.indexes());
        assert_eq!(snapshot.foreign_keys, table.foreign_keys());
        assert_eq!(snapshot.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(snapshot.comment.as_deref(), Some("Blog posts"));
    }

    #[test]
    fn test_json_round_trip() {
        let table = MigrationTable::new("users")
            .add_column("email", ColumnType::String, ColumnSettings::new())
            .copy("users_copy", CopyMode::StructureAndData);
        let json = serde_json::to_string(&table).unwrap();
        let back: MigrationTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_minimal_json() {
        let table: MigrationTable = serde_json::from_str(
            r#"{"name": "users", "action": {"type": "rename", "new_name": "people"}}"#,
        )
        .unwrap();
        assert_eq!(table.new_name(), Some("people"));
        assert!(!table.has_changes());
    }

    #[test]
    fn test_add_index_replaces_same_name() {
        let table = MigrationTable::new("posts")
            .add_index(&["title"], IndexKind::Normal, IndexMethod::Default, None)
            .unwrap()
            .add_index(&["slug"], IndexKind::Normal, IndexMethod::Default, None)
            .unwrap()
            .add_index(&["title"], IndexKind::Unique, IndexMethod::Default, None)
            .unwrap();

        let names: Vec<&str> = table.indexes().iter().map(Index::name).collect();
        assert_eq!(names, ["idx_posts_title", "idx_posts_slug"]);
        assert_eq!(table.indexes()[0].kind(), IndexKind::Unique);

        let table = table
            .add_index(&["body"], IndexKind::Normal, IndexMethod::Default, Some("idx_posts_slug"))
            .unwrap();
        assert_eq!(table.indexes().len(), 2);
        assert_eq!(table.indexes()[1].columns(), ["body"]);
    }

    #[test]
    fn test_index_requires_columns() {
        let err = MigrationTable::new("posts")
            .add_index(&[], IndexKind::Normal, IndexMethod::Default, Some("empty"))
            .unwrap_err();
        assert_eq!(err, Error::EmptyColumnList("Index"));

        let err = MigrationTable::new("posts").drop_index(&[]).unwrap_err();
        assert_eq!(err, Error::EmptyColumnList("Index"));
    }

    #[test]
    fn test_json_create_resolves_primary() {
        let table: MigrationTable = serde_json::from_str(
            r#"{"name": "tags", "action": {"type": "create"},
                "columns": [{"name": "label", "type": "string"}]}"#,
        )
        .unwrap();
        assert_eq!(table.primary_columns(), ["id"]);
        let names: Vec<&str> = table.columns().iter().map(Column::name).collect();
        assert_eq!(names, ["id", "label"]);
        assert!(table.column("id").unwrap().is_autoincrement());
    }

    #[test]
    fn test_json_create_keeps_listed_primary() {
        let table: MigrationTable = serde_json::from_str(
            r#"{"name": "pivot", "action": {"type": "create"},
                "columns": [{"name": "a", "type": "integer"}, {"name": "b", "type": "integer"}],
                "primary_columns": ["a", "b"]}"#,
        )
        .unwrap();
        assert_eq!(table.primary_columns(), ["a", "b"]);
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn test_json_replay_of_created_table() {
        let table = MigrationTable::new("users")
            .add_column("email", ColumnType::String, ColumnSettings::new())
            .create();
        let json = serde_json::to_string(&table).unwrap();
        let back: MigrationTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
