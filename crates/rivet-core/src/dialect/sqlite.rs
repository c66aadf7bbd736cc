//! SQLite dialect.

use super::{bool_to_int, Dialect, SqlDialect};
use crate::error::Result;
use crate::query::{validate_columns, QueryBuilder};
use crate::schema::{Column, ColumnType, Index, IndexKind, MigrationTable, Table};
use crate::value::SqlValue;

/// SQLite dialect.
///
/// Types map to SQLite affinities. SQLite cannot alter constraints or
/// redefine columns in place, so those operations are rejected instead of
/// being emulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn column_type(&self, column: &Column) -> String {
        match column.column_type() {
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::Boolean => "INTEGER".to_string(),
            ColumnType::Decimal => "NUMERIC".to_string(),
            ColumnType::Float | ColumnType::Double => "REAL".to_string(),
            ColumnType::Binary | ColumnType::Blob => "BLOB".to_string(),
            ColumnType::Enum => {
                let values = column
                    .settings()
                    .values
                    .iter()
                    .map(|v| self.quote_string(v))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "TEXT CHECK ({} IN ({values}))",
                    self.escape_identifier(column.name())
                )
            }
            // Dates, times, JSON, UUIDs and sets are stored as text.
            _ => "TEXT".to_string(),
        }
    }

    /// `inline_primary` marks the single auto-increment primary column,
    /// which SQLite requires to be declared inline.
    fn column_definition(&self, column: &Column, inline_primary: bool) -> Result<String> {
        column.validate()?;
        if column.is_autoincrement() && !inline_primary {
            return Err(self.unsupported(&format!(
                "autoincrement on column '{}' outside a single-column integer primary key",
                column.name()
            )));
        }
        let mut sql = format!(
            "{} {}",
            self.escape_identifier(column.name()),
            self.column_type(column)
        );
        if !column.allows_null() {
            sql.push_str(" NOT NULL");
        }
        if inline_primary {
            sql.push_str(" PRIMARY KEY AUTOINCREMENT");
        }
        if let Some(default) = &column.settings().default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.default_value(default));
        }
        Ok(sql)
    }

    fn create_index(&self, table: &str, index: &Index) -> Result<String> {
        if index.kind() == IndexKind::Fulltext {
            return Err(self.unsupported(&format!("fulltext index '{}'", index.name())));
        }
        let unique = if index.kind() == IndexKind::Unique {
            "UNIQUE "
        } else {
            ""
        };
        Ok(format!(
            "CREATE {unique}INDEX {} ON {} ({})",
            self.escape_identifier(index.name()),
            self.escape_identifier(table),
            self.column_list(index.columns())
        ))
    }

    fn inline_primary<'a>(&self, table: &'a Table) -> Option<&'a Column> {
        match table.primary.as_slice() {
            [name] => table
                .column(name)
                .filter(|c| c.is_autoincrement() && c.column_type().is_integer()),
            _ => None,
        }
    }
}

impl SqlDialect for SqliteDialect {
    fn kind(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn coerce_value(&self, value: SqlValue) -> SqlValue {
        bool_to_int(value)
    }
}

impl QueryBuilder for SqliteDialect {
    fn create_from_table(&self, table: &Table) -> Result<Vec<String>> {
        validate_columns(&table.columns)?;
        let inline_primary = self.inline_primary(table).map(Column::name);

        let mut definitions = table
            .columns
            .iter()
            .map(|c| self.column_definition(c, Some(c.name()) == inline_primary))
            .collect::<Result<Vec<_>>>()?;
        if inline_primary.is_none() && !table.primary.is_empty() {
            definitions.push(format!(
                "PRIMARY KEY ({})",
                self.column_list(&table.primary)
            ));
        }
        definitions.extend(
            table
                .foreign_keys
                .iter()
                .map(|fk| self.foreign_key_definition(&table.name, fk)),
        );

        let mut queries = vec![format!(
            "CREATE TABLE {} ({})",
            self.escape_identifier(&table.name),
            definitions.join(", ")
        )];
        for index in &table.indexes {
            queries.push(self.create_index(&table.name, index)?);
        }
        Ok(queries)
    }

    fn drop_foreign_keys(&self, table: &MigrationTable) -> Result<Vec<String>> {
        match table.foreign_keys_to_drop().first() {
            Some(name) => Err(self.unsupported(&format!("drop foreign key '{name}'"))),
            None => Ok(Vec::new()),
        }
    }

    fn drop_indexes(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(table
            .indexes_to_drop()
            .iter()
            .map(|name| format!("DROP INDEX {}", self.escape_identifier(name)))
            .collect())
    }

    fn drop_primary_key(&self, table: &MigrationTable) -> Result<Vec<String>> {
        if table.has_primary_key_to_drop() {
            return Err(self.unsupported("drop primary key"));
        }
        Ok(Vec::new())
    }

    fn drop_columns(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(table
            .columns_to_drop()
            .iter()
            .map(|name| {
                format!(
                    "ALTER TABLE {} DROP COLUMN {}",
                    self.escape_identifier(table.name()),
                    self.escape_identifier(name)
                )
            })
            .collect())
    }

    fn add_columns(&self, table: &MigrationTable) -> Result<Vec<String>> {
        table
            .columns()
            .iter()
            .map(|column| {
                Ok(format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    self.escape_identifier(table.name()),
                    self.column_definition(column, false)?
                ))
            })
            .collect()
    }

    fn change_columns(&self, table: &MigrationTable) -> Result<Vec<String>> {
        match table.columns_to_change().first() {
            Some((old, _)) => Err(self.unsupported(&format!("change column '{old}'"))),
            None => Ok(Vec::new()),
        }
    }

    fn add_primary_key(&self, table: &MigrationTable) -> Result<Vec<String>> {
        if table.primary_columns().is_empty() {
            return Ok(Vec::new());
        }
        Err(self.unsupported("add primary key"))
    }

    fn add_indexes(&self, table: &MigrationTable) -> Result<Vec<String>> {
        table
            .indexes()
            .iter()
            .map(|index| self.create_index(table.name(), index))
            .collect()
    }

    fn add_foreign_keys(&self, table: &MigrationTable) -> Result<Vec<String>> {
        match table.foreign_keys().first() {
            Some(fk) => Err(self.unsupported(&format!("add foreign key '{}'", fk.name()))),
            None => Ok(Vec::new()),
        }
    }

    fn table_options(&self, _table: &MigrationTable) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn clone_structure(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "CREATE TABLE {} AS SELECT * FROM {} WHERE 0",
            self.escape_identifier(new_name),
            self.escape_identifier(old_name)
        )
    }
}
