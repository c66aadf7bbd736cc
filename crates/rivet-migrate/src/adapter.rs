//! Database adapter.
//!
//! Runs generated DDL and parameterized statements over one sqlx
//! [`AnyConnection`]. Every call takes `&mut self` and awaits its round-trip
//! before returning, so an adapter serves one caller at a time.

use rivet_core::query::QueryBuilder;
use rivet_core::schema::MigrationTable;
use rivet_core::statement::{
    Conditions, FetchOptions, InsertData, Row, Statement, StatementBuilder,
};
use rivet_core::value::DATETIME_FORMAT;
use rivet_core::{Dialect, SqlValue};
use sqlx::any::{AnyArguments, AnyQueryResult, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyConnection, Column as _, Connection, Row as _, ValueRef as _};
use tracing::{debug, info, warn};

use crate::config::EnvironmentConfig;
use crate::error::{MigrateError, Result};

/// A fetched row: column names and values in select order.
pub type Record = Row;

/// A live connection plus the dialect it speaks.
pub struct Adapter {
    conn: AnyConnection,
    dialect: Dialect,
    charset: String,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("dialect", &self.dialect)
            .field("charset", &self.charset)
            .finish_non_exhaustive()
    }
}

impl Adapter {
    /// Opens a connection described by `config`.
    pub async fn connect(config: &EnvironmentConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let url = config.url()?;
        debug!(dialect = %config.adapter, "Connecting to database");
        let conn = AnyConnection::connect(&url)
            .await
            .map_err(|e| MigrateError::Connection(e.to_string()))?;

        Ok(Self {
            conn,
            dialect: config.adapter,
            charset: config.charset.clone(),
        })
    }

    /// Opens a connection from a URL; the dialect comes from its scheme.
    pub async fn connect_url(url: &str) -> Result<Self> {
        Self::connect(&EnvironmentConfig::from_url(url)?).await
    }

    /// Dialect of the connected server.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Connection charset.
    #[must_use]
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// Query builder for this dialect, using the connection charset as the
    /// default table charset.
    #[must_use]
    pub fn query_builder(&self) -> Box<dyn QueryBuilder> {
        self.dialect.query_builder_with_charset(Some(self.charset.as_str()))
    }

    /// Statement builder for this dialect.
    #[must_use]
    pub fn statements(&self) -> StatementBuilder<'static> {
        StatementBuilder::new(self.dialect.hooks())
    }

    /// Checks that the server still answers.
    pub async fn ping(&mut self) -> Result<()> {
        self.conn
            .ping()
            .await
            .map_err(|e| MigrateError::Connection(e.to_string()))
    }

    /// Closes the connection.
    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| MigrateError::Connection(e.to_string()))
    }

    /// Runs a statement and returns the number of affected rows.
    pub async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        Ok(self.run(statement).await?.rows_affected())
    }

    /// Runs SQL text without parameters, such as DDL.
    pub async fn execute_sql(&mut self, sql: &str) -> Result<u64> {
        debug!(sql = %sql, "Executing SQL");
        let result = sqlx::raw_sql(sql)
            .execute(&mut self.conn)
            .await
            .map_err(|e| MigrateError::from_driver(e, Some(sql)))?;
        Ok(result.rows_affected())
    }

    /// Inserts one or more rows.
    ///
    /// Returns the generated id of the last row, or `None` when the driver
    /// does not report one (PostgreSQL).
    pub async fn insert(
        &mut self,
        table: &str,
        data: impl Into<InsertData>,
    ) -> Result<Option<i64>> {
        let statement = self.statements().insert(table, data)?;
        let result = self.run(&statement).await?;
        if self.dialect.hooks().supports_last_insert_id() {
            Ok(result.last_insert_id())
        } else {
            Ok(None)
        }
    }

    /// Updates rows matching `conditions` and, when given, the raw `where_sql`
    /// fragment. Returns the number of affected rows.
    pub async fn update(
        &mut self,
        table: &str,
        data: Row,
        conditions: Conditions,
        where_sql: Option<&str>,
    ) -> Result<u64> {
        let statement = self.statements().update(table, data, conditions, where_sql)?;
        self.execute(&statement).await
    }

    /// Deletes rows matching `conditions` and `where_sql`.
    pub async fn delete(
        &mut self,
        table: &str,
        conditions: Conditions,
        where_sql: Option<&str>,
    ) -> Result<u64> {
        let statement = self.statements().delete(table, conditions, where_sql)?;
        self.execute(&statement).await
    }

    /// Runs custom SELECT text.
    pub async fn select(&mut self, sql: &str) -> Result<Vec<Record>> {
        let statement = self.statements().select_raw(sql)?;
        self.fetch_records(&statement).await
    }

    /// Fetches the first matching row.
    pub async fn fetch(
        &mut self,
        table: &str,
        options: FetchOptions,
    ) -> Result<Option<Record>> {
        let statement = self.statements().fetch(table, options)?;
        Ok(self.fetch_records(&statement).await?.into_iter().next())
    }

    /// Fetches every matching row.
    pub async fn fetch_all(&mut self, table: &str, options: FetchOptions) -> Result<Vec<Record>> {
        let statement = self.statements().fetch_all(table, options)?;
        self.fetch_records(&statement).await
    }

    /// Opens a transaction.
    pub async fn start_transaction(&mut self) -> Result<()> {
        self.execute_sql("BEGIN").await.map(drop)
    }

    /// Commits the open transaction.
    pub async fn commit(&mut self) -> Result<()> {
        self.execute_sql("COMMIT").await.map(drop)
    }

    /// Rolls back the open transaction.
    pub async fn rollback(&mut self) -> Result<()> {
        self.execute_sql("ROLLBACK").await.map(drop)
    }

    /// Generates the DDL for a change without running it.
    pub fn sql_for(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(self.query_builder().build(table)?)
    }

    /// Applies a change inside a transaction.
    ///
    /// The first failing statement rolls the transaction back and its error
    /// is returned. MySQL commits DDL implicitly, so statements that ran
    /// before the failure stay applied there.
    pub async fn apply(&mut self, table: &MigrationTable) -> Result<usize> {
        let queries = self.sql_for(table)?;
        if queries.is_empty() {
            info!(table = %table.name(), "Nothing to apply");
            return Ok(0);
        }

        info!(
            table = %table.name(),
            action = ?table.action(),
            statements = queries.len(),
            "Applying table change"
        );

        self.start_transaction().await?;
        for sql in &queries {
            if let Err(err) = self.execute_sql(sql).await {
                warn!(table = %table.name(), error = %err, "Rolling back table change");
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                return Err(err);
            }
        }
        self.commit().await?;

        info!(table = %table.name(), "Table change applied successfully");
        Ok(queries.len())
    }

    async fn run(&mut self, statement: &Statement) -> Result<AnyQueryResult> {
        debug!(sql = %statement.sql(), "Executing SQL");
        bind_all(sqlx::query(statement.driver_sql()), statement)
            .execute(&mut self.conn)
            .await
            .map_err(|e| MigrateError::from_driver(e, Some(statement.sql())))
    }

    async fn fetch_records(&mut self, statement: &Statement) -> Result<Vec<Record>> {
        debug!(sql = %statement.sql(), "Executing SQL");
        let rows = bind_all(sqlx::query(statement.driver_sql()), statement)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| MigrateError::from_driver(e, Some(statement.sql())))?;

        rows.iter()
            .map(|row| {
                decode_row(row).map_err(|e| MigrateError::from_driver(e, Some(statement.sql())))
            })
            .collect()
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    statement: &Statement,
) -> Query<'q, Any, AnyArguments<'q>> {
    for value in statement.values() {
        query = match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Blob(b) => query.bind(b.clone()),
            SqlValue::DateTime(dt) => query.bind(dt.format(DATETIME_FORMAT).to_string()),
        };
    }
    query
}

fn decode_row(row: &AnyRow) -> std::result::Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for (index, column) in row.columns().iter().enumerate() {
        record.insert(column.name(), decode_value(row, index)?);
    }
    Ok(record)
}

fn decode_value(row: &AnyRow, index: usize) -> std::result::Result<SqlValue, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(SqlValue::Null);
    }
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Ok(SqlValue::Int(v));
    }
    if let Ok(v) = row.try_get::<i32, _>(index) {
        return Ok(SqlValue::Int(v.into()));
    }
    if let Ok(v) = row.try_get::<i16, _>(index) {
        return Ok(SqlValue::Int(v.into()));
    }
    if let Ok(v) = row.try_get::<f64, _>(index) {
        return Ok(SqlValue::Float(v));
    }
    if let Ok(v) = row.try_get::<f32, _>(index) {
        return Ok(SqlValue::Float(v.into()));
    }
    if let Ok(v) = row.try_get::<bool, _>(index) {
        return Ok(SqlValue::Bool(v));
    }
    if let Ok(v) = row.try_get::<String, _>(index) {
        return Ok(SqlValue::Text(v));
    }
    row.try_get::<Vec<u8>, _>(index).map(SqlValue::Blob)
}
