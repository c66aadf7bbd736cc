#![allow(dead_code)]

use rivet_core::dialect::Dialect;
use rivet_core::schema::MigrationTable;

pub const ALL_DIALECTS: [Dialect; 3] = [Dialect::Mysql, Dialect::Postgres, Dialect::Sqlite];

pub fn build(dialect: Dialect, table: &MigrationTable) -> Vec<String> {
    dialect
        .query_builder()
        .build(table)
        .unwrap_or_else(|e| panic!("Failed to build for {dialect}: {e}\n{table:?}"))
}

/// Position of the first statement containing `needle`.
pub fn position_of(queries: &[String], needle: &str) -> usize {
    queries
        .iter()
        .position(|q| q.contains(needle))
        .unwrap_or_else(|| panic!("No statement contains {needle:?} in {queries:#?}"))
}
