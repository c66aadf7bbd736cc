//! PostgreSQL dialect.

use super::{Dialect, SqlDialect};
use crate::error::Result;
use crate::query::{validate_columns, QueryBuilder};
use crate::schema::{Column, ColumnType, Index, IndexKind, MigrationTable, Table};

/// PostgreSQL dialect.
///
/// Enum and set columns are backed by a `<table>__<column>` enum type created
/// ahead of the table. A type of that name left over from an earlier table is
/// dropped first, and dropping a column also drops its type. Dropping a whole
/// table leaves its types in place, since the descriptor does not know its
/// columns. Auto-increment columns use the `SERIAL` family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn enum_type_name(table: &str, column: &str) -> String {
        format!("{table}__{column}")
    }

    fn column_type(&self, table: &str, column: &Column, serial: bool) -> String {
        let settings = column.settings();
        let sized = |name: &str| format!("{name}({})", settings.length.unwrap_or(255));

        if serial && column.is_autoincrement() {
            match column.column_type() {
                ColumnType::TinyInteger | ColumnType::SmallInteger => {
                    return "SMALLSERIAL".to_string()
                }
                ColumnType::Integer => return "SERIAL".to_string(),
                ColumnType::BigInteger => return "BIGSERIAL".to_string(),
                _ => {}
            }
        }

        match column.column_type() {
            ColumnType::TinyInteger | ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Decimal => format!(
                "NUMERIC({},{})",
                settings.length.unwrap_or(10),
                settings.decimals.unwrap_or(0)
            ),
            ColumnType::Float => "REAL".to_string(),
            ColumnType::Double => "DOUBLE PRECISION".to_string(),
            ColumnType::Char => sized("CHAR"),
            ColumnType::String => sized("VARCHAR"),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Uuid => "UUID".to_string(),
            ColumnType::Binary | ColumnType::Blob => "BYTEA".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime | ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Enum => {
                self.escape_identifier(&Self::enum_type_name(table, column.name()))
            }
            ColumnType::Set => format!(
                "{}[]",
                self.escape_identifier(&Self::enum_type_name(table, column.name()))
            ),
        }
    }

    fn column_definition(&self, table: &str, column: &Column) -> Result<String> {
        column.validate()?;
        if column.is_autoincrement() && !column.column_type().is_integer() {
            return Err(self.unsupported(&format!(
                "autoincrement on {} column '{}'",
                column.column_type(),
                column.name()
            )));
        }
        let mut sql = format!(
            "{} {}",
            self.escape_identifier(column.name()),
            self.column_type(table, column, true)
        );
        if !column.allows_null() {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &column.settings().default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.default_value(default));
        }
        Ok(sql)
    }

    fn drop_enum_type(&self, table: &str, column: &str) -> String {
        format!(
            "DROP TYPE IF EXISTS {}",
            self.escape_identifier(&Self::enum_type_name(table, column))
        )
    }

    fn enum_types(&self, table: &str, columns: &[Column]) -> Vec<String> {
        let mut queries = Vec::new();
        for column in columns.iter().filter(|c| c.column_type().has_values()) {
            let values = column
                .settings()
                .values
                .iter()
                .map(|v| self.quote_string(v))
                .collect::<Vec<_>>()
                .join(", ");
            queries.push(self.drop_enum_type(table, column.name()));
            queries.push(format!(
                "CREATE TYPE {} AS ENUM ({values})",
                self.escape_identifier(&Self::enum_type_name(table, column.name()))
            ));
        }
        queries
    }

    fn create_index(&self, table: &str, index: &Index) -> Result<String> {
        if index.kind() == IndexKind::Fulltext {
            return Err(self.unsupported(&format!("fulltext index '{}'", index.name())));
        }
        let mut sql = String::from("CREATE ");
        if index.kind() == IndexKind::Unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        sql.push_str(&self.escape_identifier(index.name()));
        sql.push_str(" ON ");
        sql.push_str(&self.escape_identifier(table));
        if let Some(method) = index.method().as_sql() {
            sql.push_str(" USING ");
            sql.push_str(method);
        }
        sql.push_str(" (");
        sql.push_str(&self.column_list(index.columns()));
        sql.push(')');
        Ok(sql)
    }

    fn primary_key_constraint(&self, table: &str, columns: &[String]) -> String {
        format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            self.escape_identifier(&format!("{table}_pkey")),
            self.column_list(columns)
        )
    }

    fn comment_literal(&self, comment: &str) -> String {
        if comment.is_empty() {
            "NULL".to_string()
        } else {
            self.quote_string(comment)
        }
    }

    fn column_comments(&self, table: &str, columns: &[Column]) -> Vec<String> {
        columns
            .iter()
            .filter_map(|c| {
                c.settings().comment.as_ref().map(|comment| {
                    format!(
                        "COMMENT ON COLUMN {}.{} IS {}",
                        self.escape_identifier(table),
                        self.escape_identifier(c.name()),
                        self.comment_literal(comment)
                    )
                })
            })
            .collect()
    }

    fn table_comment(&self, table: &str, comment: &str) -> String {
        format!(
            "COMMENT ON TABLE {} IS {}",
            self.escape_identifier(table),
            self.comment_literal(comment)
        )
    }
}

impl SqlDialect for PostgresDialect {
    fn kind(&self) -> Dialect {
        Dialect::Postgres
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn supports_last_insert_id(&self) -> bool {
        false
    }
}

impl QueryBuilder for PostgresDialect {
    fn create_from_table(&self, table: &Table) -> Result<Vec<String>> {
        validate_columns(&table.columns)?;
        let mut queries = self.enum_types(&table.name, &table.columns);

        let mut definitions = table
            .columns
            .iter()
            .map(|c| self.column_definition(&table.name, c))
            .collect::<Result<Vec<_>>>()?;
        if !table.primary.is_empty() {
            definitions.push(self.primary_key_constraint(&table.name, &table.primary));
        }
        definitions.extend(
            table
                .foreign_keys
                .iter()
                .map(|fk| self.foreign_key_definition(&table.name, fk)),
        );
        queries.push(format!(
            "CREATE TABLE {} ({})",
            self.escape_identifier(&table.name),
            definitions.join(", ")
        ));

        for index in &table.indexes {
            queries.push(self.create_index(&table.name, index)?);
        }
        if let Some(comment) = table.comment.as_deref().filter(|c| !c.is_empty()) {
            queries.push(self.table_comment(&table.name, comment));
        }
        queries.extend(self.column_comments(&table.name, &table.columns));
        Ok(queries)
    }

    fn drop_foreign_keys(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(self.alter_clauses(
            table.name(),
            table
                .foreign_keys_to_drop()
                .iter()
                .map(|name| {
                    let constraint = format!("{}_{}", table.name(), name);
                    format!("DROP CONSTRAINT {}", self.escape_identifier(&constraint))
                })
                .collect(),
        ))
    }

    fn drop_indexes(&self, table: &MigrationTable) -> Result<Vec<String>> {
        if table.indexes_to_drop().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![format!(
            "DROP INDEX {}",
            self.column_list(table.indexes_to_drop())
        )])
    }

    fn drop_primary_key(&self, table: &MigrationTable) -> Result<Vec<String>> {
        if !table.has_primary_key_to_drop() {
            return Ok(Vec::new());
        }
        let constraint = format!("{}_pkey", table.name());
        Ok(self.alter_clauses(
            table.name(),
            vec![format!(
                "DROP CONSTRAINT {}",
                self.escape_identifier(&constraint)
            )],
        ))
    }

    fn drop_columns(&self, table: &MigrationTable) -> Result<Vec<String>> {
        let mut queries = self.alter_clauses(
            table.name(),
            table
                .columns_to_drop()
                .iter()
                .map(|c| format!("DROP COLUMN {}", self.escape_identifier(c)))
                .collect(),
        );
        queries.extend(
            table
                .columns_to_drop()
                .iter()
                .map(|c| self.drop_enum_type(table.name(), c)),
        );
        Ok(queries)
    }

    fn add_columns(&self, table: &MigrationTable) -> Result<Vec<String>> {
        let mut queries = self.enum_types(table.name(), table.columns());
        let clauses = table
            .columns()
            .iter()
            .map(|c| Ok(format!("ADD COLUMN {}", self.column_definition(table.name(), c)?)))
            .collect::<Result<Vec<_>>>()?;
        queries.extend(self.alter_clauses(table.name(), clauses));
        queries.extend(self.column_comments(table.name(), table.columns()));
        Ok(queries)
    }

    fn change_columns(&self, table: &MigrationTable) -> Result<Vec<String>> {
        let mut queries = Vec::new();
        for (old, column) in table.columns_to_change() {
            if column.column_type().has_values() {
                return Err(self.unsupported(&format!(
                    "change column '{old}' to {}",
                    column.column_type()
                )));
            }
            if old != column.name() {
                queries.push(format!(
                    "ALTER TABLE {} RENAME COLUMN {} TO {}",
                    self.escape_identifier(table.name()),
                    self.escape_identifier(old),
                    self.escape_identifier(column.name())
                ));
            }

            let name = self.escape_identifier(column.name());
            let column_type = self.column_type(table.name(), column, false);
            let mut clauses = vec![format!(
                "ALTER COLUMN {name} TYPE {column_type} USING {name}::{column_type}"
            )];
            clauses.push(if column.allows_null() {
                format!("ALTER COLUMN {name} DROP NOT NULL")
            } else {
                format!("ALTER COLUMN {name} SET NOT NULL")
            });
            clauses.push(match &column.settings().default {
                Some(default) => {
                    format!("ALTER COLUMN {name} SET DEFAULT {}", self.default_value(default))
                }
                None => format!("ALTER COLUMN {name} DROP DEFAULT"),
            });
            queries.extend(self.alter_clauses(table.name(), clauses));
            queries.extend(self.column_comments(table.name(), std::slice::from_ref(column)));
        }
        Ok(queries)
    }

    fn add_primary_key(&self, table: &MigrationTable) -> Result<Vec<String>> {
        if table.primary_columns().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.alter_clauses(
            table.name(),
            vec![format!(
                "ADD {}",
                self.primary_key_constraint(table.name(), table.primary_columns())
            )],
        ))
    }

    fn add_indexes(&self, table: &MigrationTable) -> Result<Vec<String>> {
        table
            .indexes()
            .iter()
            .map(|index| self.create_index(table.name(), index))
            .collect()
    }

    fn add_foreign_keys(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(self.alter_clauses(
            table.name(),
            table
                .foreign_keys()
                .iter()
                .map(|fk| format!("ADD {}", self.foreign_key_definition(table.name(), fk)))
                .collect(),
        ))
    }

    fn table_options(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(table
            .comment()
            .map(|comment| self.table_comment(table.name(), comment))
            .into_iter()
            .collect())
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    fn clone_structure(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "CREATE TABLE {} (LIKE {} INCLUDING ALL)",
            self.escape_identifier(new_name),
            self.escape_identifier(old_name)
        )
    }
}
