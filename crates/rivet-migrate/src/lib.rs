//! Runs rivet schema changes against a live database.
//!
//! `rivet-migrate` connects to MySQL, PostgreSQL or SQLite through sqlx,
//! applies the DDL that `rivet-core` generates, and runs parameterized
//! inserts, updates, deletes and selects.
//!
//! - **Config** - named environments read from a JSON file
//! - **Adapter** - one connection, statement execution and transactions
//!
//! # Example
//!
//! ```rust,no_run
//! use rivet_migrate::prelude::*;
//!
//! # async fn run() -> rivet_migrate::Result<()> {
//! let config = Config::from_file("rivet.json")?;
//! let mut adapter = Adapter::connect(config.environment(None)?).await?;
//!
//! let table = MigrationTable::new("posts")
//!     .add_column("title", ColumnType::String, ColumnSettings::new())
//!     .create();
//! adapter.apply(&table).await?;
//!
//! let id = adapter
//!     .insert("posts", Row::new().set("title", "Hello"))
//!     .await?;
//! # let _ = id;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod error;

pub use adapter::{Adapter, Record};
pub use config::{Config, EnvironmentConfig};
pub use error::{MigrateError, Result};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::adapter::{Adapter, Record};
    pub use crate::config::{Config, EnvironmentConfig};
    pub use crate::error::{MigrateError, Result};
    pub use rivet_core::schema::{ColumnSettings, ColumnType, MigrationTable};
    pub use rivet_core::statement::{Conditions, FetchOptions, Orders, Row};
    pub use rivet_core::{Dialect, QueryBuilder, SqlValue};
}
