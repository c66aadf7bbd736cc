//! DDL generation from change-descriptors.
//!
//! [`QueryBuilder::build`] turns a [`MigrationTable`] into the ordered list of
//! statements that apply it. Statements are single line and carry no trailing
//! semicolon.
//!
//! ```rust
//! use rivet_core::dialect::Dialect;
//! use rivet_core::schema::{ColumnSettings, ColumnType, MigrationTable};
//!
//! let table = MigrationTable::new("users")
//!     .add_column("email", ColumnType::String, ColumnSettings::new())
//!     .create();
//!
//! let queries = Dialect::Sqlite.query_builder().build(&table).unwrap();
//! assert_eq!(
//!     queries,
//!     ["CREATE TABLE \"users\" (\"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \"email\" TEXT NOT NULL)"]
//! );
//! ```

use crate::dialect::SqlDialect;
use crate::error::{Error, Result};
use crate::schema::{
    Column, CopyMode, DefaultValue, ForeignKey, MigrationTable, Table, TableAction,
};

/// Translates change-descriptors into dialect DDL.
///
/// Alter statements are emitted in a fixed order: drop foreign keys, drop
/// indexes, drop primary key, drop columns, add columns, change columns, add
/// primary key, add indexes, add foreign keys, table options. Each step
/// returns the statements of its category, possibly none.
pub trait QueryBuilder: SqlDialect {
    /// Builds the statements for the descriptor's action.
    fn build(&self, table: &MigrationTable) -> Result<Vec<String>> {
        match table.action() {
            TableAction::Create => self.create_table(table),
            TableAction::Alter => self.alter_table(table),
            TableAction::Rename { new_name } => Ok(vec![self.rename_table(table.name(), new_name)]),
            TableAction::Drop => Ok(vec![self.drop_table(table.name())]),
            TableAction::Copy { new_name, mode } => self.copy_table(table, new_name, *mode),
        }
    }

    /// Builds the statements creating the descriptor's table.
    fn create_table(&self, table: &MigrationTable) -> Result<Vec<String>> {
        self.create_from_table(&table.to_table())
    }

    /// Builds the statements creating a resolved table.
    fn create_from_table(&self, table: &Table) -> Result<Vec<String>>;

    /// Builds the statements altering the descriptor's table.
    fn alter_table(&self, table: &MigrationTable) -> Result<Vec<String>> {
        let mut queries = Vec::new();
        queries.extend(self.drop_foreign_keys(table)?);
        queries.extend(self.drop_indexes(table)?);
        queries.extend(self.drop_primary_key(table)?);
        queries.extend(self.drop_columns(table)?);
        queries.extend(self.add_columns(table)?);
        queries.extend(self.change_columns(table)?);
        queries.extend(self.add_primary_key(table)?);
        queries.extend(self.add_indexes(table)?);
        queries.extend(self.add_foreign_keys(table)?);
        queries.extend(self.table_options(table)?);
        Ok(queries)
    }

    /// Drops the foreign keys listed in `table`.
    fn drop_foreign_keys(&self, table: &MigrationTable) -> Result<Vec<String>>;

    /// Drops the indexes listed in `table`.
    fn drop_indexes(&self, table: &MigrationTable) -> Result<Vec<String>>;

    /// Drops the primary key when requested.
    fn drop_primary_key(&self, table: &MigrationTable) -> Result<Vec<String>>;

    /// Drops the columns listed in `table`.
    fn drop_columns(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(self.alter_clauses(
            table.name(),
            table
                .columns_to_drop()
                .iter()
                .map(|c| format!("DROP COLUMN {}", self.escape_identifier(c)))
                .collect(),
        ))
    }

    /// Adds the columns declared in `table`.
    fn add_columns(&self, table: &MigrationTable) -> Result<Vec<String>>;

    /// Applies the column replacements declared in `table`.
    fn change_columns(&self, table: &MigrationTable) -> Result<Vec<String>>;

    /// Adds the primary key declared in `table`.
    fn add_primary_key(&self, table: &MigrationTable) -> Result<Vec<String>>;

    /// Adds the indexes declared in `table`.
    fn add_indexes(&self, table: &MigrationTable) -> Result<Vec<String>>;

    /// Adds the foreign keys declared in `table`.
    fn add_foreign_keys(&self, table: &MigrationTable) -> Result<Vec<String>>;

    /// Applies charset, collation and comment changes.
    fn table_options(&self, table: &MigrationTable) -> Result<Vec<String>>;

    /// Builds the rename statement.
    fn rename_table(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.escape_identifier(old_name),
            self.escape_identifier(new_name)
        )
    }

    /// Builds the drop statement.
    fn drop_table(&self, name: &str) -> String {
        format!("DROP TABLE {}", self.escape_identifier(name))
    }

    /// Builds the statements copying `table` to `new_name`.
    ///
    /// A descriptor without columns copies the structure of the existing
    /// table; otherwise the declared structure is created under the new name.
    fn copy_table(
        &self,
        table: &MigrationTable,
        new_name: &str,
        mode: CopyMode,
    ) -> Result<Vec<String>> {
        let mut queries = Vec::new();
        if mode.copies_structure() {
            if table.columns().is_empty() {
                queries.push(self.clone_structure(table.name(), new_name));
            } else {
                queries.extend(self.create_from_table(&table.to_table().renamed(new_name))?);
            }
        }
        if mode.copies_data() {
            queries.push(format!(
                "INSERT INTO {} SELECT * FROM {}",
                self.escape_identifier(new_name),
                self.escape_identifier(table.name())
            ));
        }
        Ok(queries)
    }

    /// Builds the statement creating `new_name` with the structure of the
    /// existing table `old_name`.
    fn clone_structure(&self, old_name: &str, new_name: &str) -> String;

    /// Renders a boolean default.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    /// Renders a column default.
    fn default_value(&self, default: &DefaultValue) -> String {
        match default {
            DefaultValue::Null => "NULL".to_string(),
            DefaultValue::Boolean(b) => self.boolean_literal(*b).to_string(),
            DefaultValue::Integer(i) => i.to_string(),
            DefaultValue::Float(f) => f.to_string(),
            DefaultValue::String(s) => self.quote_string(s),
            DefaultValue::Expression(expr) => expr.clone(),
        }
    }

    /// Escapes and joins a list of column names.
    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.escape_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders a `CONSTRAINT … FOREIGN KEY … REFERENCES …` clause.
    fn foreign_key_definition(&self, table: &str, foreign_key: &ForeignKey) -> String {
        let mut sql = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.escape_identifier(&foreign_key.constraint_name(table)),
            self.column_list(foreign_key.columns()),
            self.escape_identifier(foreign_key.referenced_table()),
            self.column_list(foreign_key.referenced_columns())
        );
        if let Some(action) = foreign_key.on_delete().as_sql() {
            sql.push_str(" ON DELETE ");
            sql.push_str(action);
        }
        if let Some(action) = foreign_key.on_update().as_sql() {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action);
        }
        sql
    }

    /// Joins clauses into one `ALTER TABLE` statement, or none when there
    /// is no clause.
    fn alter_clauses(&self, table: &str, clauses: Vec<String>) -> Vec<String> {
        if clauses.is_empty() {
            return Vec::new();
        }
        vec![format!(
            "ALTER TABLE {} {}",
            self.escape_identifier(table),
            clauses.join(", ")
        )]
    }

    /// Error for an operation this dialect cannot express.
    fn unsupported(&self, operation: &str) -> Error {
        Error::Unsupported {
            dialect: self.kind(),
            operation: operation.to_string(),
        }
    }
}

/// Checks that a table to create has at least one column and that every
/// enum or set column lists its values.
pub(crate) fn validate_columns(columns: &[Column]) -> Result<()> {
    if columns.is_empty() {
        return Err(Error::EmptyColumnList("Table"));
    }
    columns.iter().try_for_each(Column::validate)
}

/// Returns whether the primary key contains a column added by `table`.
pub(crate) fn primary_uses_added_column(table: &MigrationTable) -> bool {
    table
        .primary_columns()
        .iter()
        .any(|name| table.column(name).is_some())
}
