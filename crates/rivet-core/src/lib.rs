//! # rivet-core
//!
//! Schema-change model and SQL generation for MySQL, PostgreSQL and SQLite.
//!
//! This crate provides:
//! - A change-descriptor, [`MigrationTable`], describing what happens to one
//!   table: create, alter, rename, drop or copy
//! - Dialect query builders turning a descriptor into ordered DDL
//! - A parameterized statement builder for inserts, updates, deletes and
//!   selects
//!
//! Nothing here performs I/O; `rivet-migrate` executes the generated SQL.
//!
//! ## Schema changes
//!
//! ```rust
//! use rivet_core::dialect::Dialect;
//! use rivet_core::schema::{ColumnSettings, ColumnType, ForeignKeyAction, MigrationTable};
//!
//! let table = MigrationTable::new("comments")
//!     .add_column("post_id", ColumnType::Integer, ColumnSettings::new())
//!     .add_column("body", ColumnType::Text, ColumnSettings::new())
//!     .add_foreign_key(
//!         &["post_id"],
//!         "posts",
//!         &["id"],
//!         ForeignKeyAction::Cascade,
//!         ForeignKeyAction::Default,
//!     )
//!     .unwrap()
//!     .create();
//!
//! let queries = Dialect::Postgres.query_builder().build(&table).unwrap();
//! assert_eq!(queries.len(), 1);
//! assert!(queries[0].starts_with("CREATE TABLE \"comments\""));
//! ```
//!
//! ## SQL injection prevention
//!
//! Values never appear inside generated SQL; they are bound:
//!
//! ```rust
//! use rivet_core::dialect::Dialect;
//! use rivet_core::statement::{Conditions, FetchOptions, StatementBuilder};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let statement = StatementBuilder::new(Dialect::Sqlite.hooks())
//!     .fetch_all("users", FetchOptions::new().filter(Conditions::new().eq("name", user_input)))
//!     .unwrap();
//!
//! assert_eq!(statement.driver_sql(), "SELECT * FROM \"users\" WHERE \"name\" = ?");
//! ```

pub mod dialect;
pub mod error;
pub mod query;
pub mod schema;
pub mod statement;
pub mod value;

pub use dialect::{Dialect, SqlDialect};
pub use error::{Error, Result};
pub use query::QueryBuilder;
pub use schema::{Column, ColumnSettings, ColumnType, MigrationTable, Table};
pub use statement::{Statement, StatementBuilder};
pub use value::{SqlValue, ToSqlValue};
