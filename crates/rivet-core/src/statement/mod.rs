//! Parameterized DML building.
//!
//! [`StatementBuilder`] turns CRUD intents into a [`Statement`]: SQL text with
//! named placeholders (`:name`), the same text with the driver's placeholders
//! (`?` or `$n`), and the bind values in placeholder order. Identifiers are
//! escaped and values are always bound, never written into the SQL. Only raw
//! WHERE text and [`Fields::Raw`] are copied as given.
//!
//! ```rust
//! use rivet_core::dialect::Dialect;
//! use rivet_core::statement::{Conditions, Row, StatementBuilder};
//!
//! let builder = StatementBuilder::new(Dialect::Mysql.hooks());
//! let statement = builder
//!     .update(
//!         "users",
//!         Row::new().set("email", "a@b.com"),
//!         Conditions::new().eq("id", 5),
//!         None,
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     statement.sql(),
//!     "UPDATE `users` SET `email` = :email WHERE `id` = :where_id"
//! );
//! assert_eq!(statement.driver_sql(), "UPDATE `users` SET `email` = ? WHERE `id` = ?");
//! ```

mod condition;
mod fetch;
mod row;
mod writer;

pub use condition::{ConditionValue, Conditions};
pub use fetch::{FetchOptions, Fields, Orders};
pub use row::{InsertData, Row};

use crate::dialect::SqlDialect;
use crate::error::{Error, Result};
use crate::value::SqlValue;
use writer::SqlWriter;

/// A named bind value.
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    /// Placeholder name, without the leading colon.
    pub name: String,
    /// Value, already coerced for the dialect.
    pub value: SqlValue,
}

/// A parameterized statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    driver_sql: String,
    binds: Vec<Bind>,
}

impl Statement {
    /// SQL with named placeholders.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// SQL with the driver's placeholders.
    #[must_use]
    pub fn driver_sql(&self) -> &str {
        &self.driver_sql
    }

    /// Bind values, in placeholder order.
    #[must_use]
    pub fn binds(&self) -> &[Bind] {
        &self.binds
    }

    /// Gets a bind value by placeholder name.
    #[must_use]
    pub fn bind(&self, name: &str) -> Option<&SqlValue> {
        self.binds.iter().find(|b| b.name == name).map(|b| &b.value)
    }

    /// Bind values without their names, in placeholder order.
    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.binds.iter().map(|b| &b.value)
    }
}

/// Builds parameterized DML for one dialect.
#[derive(Clone, Copy)]
pub struct StatementBuilder<'d> {
    dialect: &'d dyn SqlDialect,
}

impl<'d> StatementBuilder<'d> {
    /// Creates a statement builder using the given dialect hooks.
    #[must_use]
    pub fn new(dialect: &'d dyn SqlDialect) -> Self {
        Self { dialect }
    }

    /// Builds `INSERT INTO table (cols) VALUES (…)[, (…)]`.
    ///
    /// A single row binds each value as `:col`; row `i` of a multi-row insert
    /// binds as `:item_<i>_<col>`. Every row of a multi-row insert must set the
    /// same columns as the first one.
    pub fn insert(&self, table: &str, data: impl Into<InsertData>) -> Result<Statement> {
        let rows = match data.into() {
            InsertData::Single(row) => vec![(String::new(), row)],
            InsertData::Multi(rows) => rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| (format!("item_{i}_"), row))
                .collect(),
        };
        let columns: Vec<String> = match rows.first() {
            Some((_, first)) if !first.is_empty() => first.columns().map(String::from).collect(),
            _ => return Err(Error::EmptyInsert(table.to_string())),
        };
        let first = &rows[0].1;
        if let Some(row) = rows.iter().position(|(_, r)| !first.same_columns(r)) {
            return Err(Error::InsertColumnMismatch {
                table: table.to_string(),
                row,
            });
        }

        let mut writer = SqlWriter::new(self.dialect);
        writer.push("INSERT INTO ");
        writer.push_identifier(table);
        writer.push(" (");
        writer.push_identifiers(&columns);
        writer.push(") VALUES ");
        for (i, (prefix, row)) in rows.iter().enumerate() {
            if i > 0 {
                writer.push(", ");
            }
            writer.push("(");
            for (j, column) in columns.iter().enumerate() {
                if j > 0 {
                    writer.push(", ");
                }
                let value = row.get(column).cloned().unwrap_or(SqlValue::Null);
                writer.push_bind(&format!("{prefix}{column}"), value)?;
            }
            writer.push(")");
        }
        Ok(writer.finish())
    }

    /// Builds `UPDATE table SET col = :col, … [WHERE …]`.
    pub fn update(
        &self,
        table: &str,
        data: Row,
        conditions: Conditions,
        raw_where: Option<&str>,
    ) -> Result<Statement> {
        if data.is_empty() {
            return Err(Error::EmptyUpdate(table.to_string()));
        }
        let mut writer = SqlWriter::new(self.dialect);
        writer.push("UPDATE ");
        writer.push_identifier(table);
        writer.push(" SET ");
        for (i, (column, value)) in data.into_pairs().into_iter().enumerate() {
            if i > 0 {
                writer.push(", ");
            }
            writer.push_identifier(&column);
            writer.push(" = ");
            writer.push_bind(&column, value)?;
        }
        write_where(&mut writer, conditions, raw_where)?;
        Ok(writer.finish())
    }

    /// Builds `DELETE FROM table [WHERE …]`.
    pub fn delete(
        &self,
        table: &str,
        conditions: Conditions,
        raw_where: Option<&str>,
    ) -> Result<Statement> {
        let mut writer = SqlWriter::new(self.dialect);
        writer.push("DELETE FROM ");
        writer.push_identifier(table);
        write_where(&mut writer, conditions, raw_where)?;
        Ok(writer.finish())
    }

    /// Builds a select of at most one row.
    pub fn fetch(&self, table: &str, options: FetchOptions) -> Result<Statement> {
        self.fetch_all(table, FetchOptions {
            limit: Some(1),
            ..options
        })
    }

    /// Builds `SELECT fields FROM table [WHERE] [GROUP BY] [ORDER BY] [LIMIT]`.
    pub fn fetch_all(&self, table: &str, options: FetchOptions) -> Result<Statement> {
        let mut writer = SqlWriter::new(self.dialect);
        writer.push("SELECT ");
        match &options.fields {
            Fields::All => writer.push("*"),
            Fields::Columns(columns) => writer.push_identifiers(columns),
            Fields::Raw(fields) => writer.push(fields),
        }
        writer.push(" FROM ");
        writer.push_identifier(table);
        write_where(&mut writer, options.conditions, None)?;
        if !options.groups.is_empty() {
            writer.push(" GROUP BY ");
            writer.push_identifiers(&options.groups);
        }
        if !options.orders.is_empty() {
            writer.push(" ORDER BY ");
            for (i, (column, direction)) in options.orders.resolve().into_iter().enumerate() {
                if i > 0 {
                    writer.push(", ");
                }
                writer.push_identifier(column);
                writer.push(" ");
                writer.push(direction);
            }
        }
        if let Some(limit) = options.limit.filter(|l| *l > 0) {
            writer.push(&format!(" LIMIT {limit}"));
        }
        Ok(writer.finish())
    }

    /// Wraps custom SELECT text. Anything not starting with `SELECT` is
    /// rejected.
    pub fn select_raw(&self, sql: &str) -> Result<Statement> {
        let is_select = sql
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("select"))
            && sql[6..].starts_with(char::is_whitespace);
        if !is_select {
            return Err(Error::NotASelect);
        }
        let mut writer = SqlWriter::new(self.dialect);
        writer.push(sql);
        Ok(writer.finish())
    }
}

fn write_where(
    writer: &mut SqlWriter<'_>,
    conditions: Conditions,
    raw_where: Option<&str>,
) -> Result<()> {
    let raw_where = raw_where.map(str::trim).filter(|w| !w.is_empty());
    if conditions.is_empty() {
        if let Some(raw) = raw_where {
            writer.push(" WHERE ");
            writer.push(raw);
        }
        return Ok(());
    }

    writer.push(" WHERE ");
    for (i, (column, value)) in conditions.iter().enumerate() {
        if i > 0 {
            writer.push(" AND ");
        }
        writer.push_identifier(column);
        match value {
            ConditionValue::Single(SqlValue::Null) => writer.push(" IS NULL"),
            ConditionValue::Single(value) => {
                writer.push(" = ");
                writer.push_bind(&format!("where_{column}"), value.clone())?;
            }
            ConditionValue::List(values) if values.is_empty() => {
                return Err(Error::EmptyInList(column.to_string()));
            }
            ConditionValue::List(values) => {
                writer.push(" IN (");
                for (j, value) in values.iter().enumerate() {
                    if j > 0 {
                        writer.push(", ");
                    }
                    writer.push_bind(&format!("where_{j}_{column}"), value.clone())?;
                }
                writer.push(")");
            }
        }
    }
    if let Some(raw) = raw_where {
        writer.push(" AND (");
        writer.push(raw);
        writer.push(")");
    }
    Ok(())
}
