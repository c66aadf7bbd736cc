//! SQL dialect support.
//!
//! MySQL, PostgreSQL and SQLite differ in identifier quoting, placeholder
//! style, boolean handling and DDL syntax. [`SqlDialect`] holds the small set
//! of hooks the statement builder needs; the DDL side lives in
//! [`QueryBuilder`](crate::query::QueryBuilder), implemented by the same
//! dialect types.

mod mysql;
mod postgres;
mod sqlite;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::error::{Error, Result};
use crate::query::QueryBuilder;
use crate::value::SqlValue;

static MYSQL: MysqlDialect = MysqlDialect::new();
static POSTGRES: PostgresDialect = PostgresDialect::new();
static SQLITE: SqliteDialect = SqliteDialect::new();

/// The supported database dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL / MariaDB.
    Mysql,
    /// PostgreSQL.
    #[serde(alias = "pgsql", alias = "postgresql")]
    Postgres,
    /// SQLite 3.35 or newer.
    Sqlite,
}

impl Dialect {
    /// Canonical name of the dialect.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Statement builder hooks of this dialect.
    #[must_use]
    pub fn hooks(self) -> &'static dyn SqlDialect {
        match self {
            Self::Mysql => &MYSQL,
            Self::Postgres => &POSTGRES,
            Self::Sqlite => &SQLITE,
        }
    }

    /// DDL builder of this dialect.
    #[must_use]
    pub fn query_builder(self) -> Box<dyn QueryBuilder> {
        self.query_builder_with_charset(None)
    }

    /// DDL builder of this dialect using `charset` for tables that do not
    /// set their own. Only MySQL emits a table charset.
    #[must_use]
    pub fn query_builder_with_charset(self, charset: Option<&str>) -> Box<dyn QueryBuilder> {
        match self {
            Self::Mysql => Box::new(match charset {
                Some(charset) => MysqlDialect::with_charset(charset),
                None => MysqlDialect::new(),
            }),
            Self::Postgres => Box::new(PostgresDialect::new()),
            Self::Sqlite => Box::new(SqliteDialect::new()),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::Mysql),
            "postgres" | "pgsql" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(Error::InvalidValue {
                kind: "Adapter",
                value: s.to_string(),
                expected: "mysql, pgsql, sqlite",
            }),
        }
    }
}

/// Dialect hooks shared by the statement builder and the query builders.
pub trait SqlDialect: Send + Sync {
    /// Which dialect this is.
    fn kind(&self) -> Dialect;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier, doubling embedded quote characters.
    fn escape_identifier(&self, name: &str) -> String {
        let q = self.identifier_quote();
        let mut escaped = String::with_capacity(name.len() + 2);
        escaped.push(q);
        for ch in name.chars() {
            if ch == q {
                escaped.push(q);
            }
            escaped.push(ch);
        }
        escaped.push(q);
        escaped
    }

    /// Renders a string literal for DDL (defaults, comments, enum values).
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Converts a value right before it is bound.
    fn coerce_value(&self, value: SqlValue) -> SqlValue {
        value
    }

    /// Driver placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String {
        let _ = index;
        "?".to_string()
    }

    /// Whether the driver reports the id generated by the last insert.
    fn supports_last_insert_id(&self) -> bool {
        true
    }
}

/// Turns booleans into 0/1 for databases without a native boolean.
pub(crate) fn bool_to_int(value: SqlValue) -> SqlValue {
    match value {
        SqlValue::Bool(b) => SqlValue::Int(i64::from(b)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!("mysql".parse::<Dialect>(), Ok(Dialect::Mysql));
        assert_eq!("pgsql".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert_eq!("PostgreSQL".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert_eq!("sqlite".parse::<Dialect>(), Ok(Dialect::Sqlite));

        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Adapter \"oracle\" is not allowed. Use one of: mysql, pgsql, sqlite"
        );
    }

    #[test]
    fn test_escape_identifier() {
        assert_eq!(Dialect::Mysql.hooks().escape_identifier("users"), "`users`");
        assert_eq!(Dialect::Mysql.hooks().escape_identifier("we`ird"), "`we``ird`");
        assert_eq!(Dialect::Postgres.hooks().escape_identifier("users"), "\"users\"");
        assert_eq!(Dialect::Sqlite.hooks().escape_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::Mysql.hooks().placeholder(3), "?");
        assert_eq!(Dialect::Sqlite.hooks().placeholder(1), "?");
        assert_eq!(Dialect::Postgres.hooks().placeholder(3), "$3");
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(
            Dialect::Mysql.hooks().coerce_value(SqlValue::Bool(true)),
            SqlValue::Int(1)
        );
        assert_eq!(
            Dialect::Sqlite.hooks().coerce_value(SqlValue::Bool(false)),
            SqlValue::Int(0)
        );
        assert_eq!(
            Dialect::Postgres.hooks().coerce_value(SqlValue::Bool(true)),
            SqlValue::Bool(true)
        );
    }

    #[test]
    fn test_serde_aliases() {
        let d: Dialect = serde_json::from_str("\"pgsql\"").unwrap();
        assert_eq!(d, Dialect::Postgres);
        assert_eq!(serde_json::to_string(&Dialect::Sqlite).unwrap(), "\"sqlite\"");
    }
}
