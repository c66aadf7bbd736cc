//! Schema element model.
//!
//! [`Column`], [`Index`], [`ForeignKey`] and [`Table`] describe structure;
//! [`MigrationTable`] describes a pending change to one table.

mod column;
mod foreign_key;
mod index;
mod migration_table;
mod table;

pub use column::{Column, ColumnPosition, ColumnSettings, ColumnType, DefaultValue};
pub use foreign_key::{ForeignKey, ForeignKeyAction};
pub use index::{Index, IndexKind, IndexMethod};
pub use migration_table::{CopyMode, MigrationTable, PrimaryKey, TableAction};
pub use table::Table;
