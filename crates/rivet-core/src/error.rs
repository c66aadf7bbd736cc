//! Error types for schema building, DDL generation and statement building.

use crate::dialect::Dialect;

/// Errors raised by the schema model, the query builders and the statement
/// builder.
///
/// Every variant is raised at the call that violates the contract; nothing is
/// deferred to execution time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A string did not name a member of a closed enumeration.
    #[error("{kind} \"{value}\" is not allowed. Use one of: {expected}")]
    InvalidValue {
        /// What was being parsed (e.g. "Copy type").
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// The accepted values.
        expected: &'static str,
    },

    /// An index, foreign key or primary key was declared without columns.
    #[error("{0} requires at least one column")]
    EmptyColumnList(&'static str),

    /// Local and referenced foreign key columns differ in count.
    #[error(
        "Foreign key on ({}) references {} column(s) but declares {}",
        .columns.join(", "),
        .referenced,
        .columns.len()
    )]
    ForeignKeyArity {
        /// Local columns.
        columns: Vec<String>,
        /// Number of referenced columns.
        referenced: usize,
    },

    /// An enum or set column has no allowed values.
    #[error("Column '{0}' of type enum/set requires at least one value")]
    MissingEnumValues(String),

    /// The dialect cannot express the requested operation.
    #[error("Operation not supported by {dialect}: {operation}")]
    Unsupported {
        /// Dialect asked to perform the operation.
        dialect: Dialect,
        /// Human readable description of the operation.
        operation: String,
    },

    /// Raw text handed to `select` is not a SELECT statement.
    #[error("Only select query can be executed in select method")]
    NotASelect,

    /// Insert called without any row.
    #[error("Insert into '{0}' has no data")]
    EmptyInsert(String),

    /// Update called without any column to set.
    #[error("Update of '{0}' has no data")]
    EmptyUpdate(String),

    /// A row of a multi-row insert does not share the first row's columns.
    #[error("Row {row} of insert into '{table}' does not have the same columns as row 0")]
    InsertColumnMismatch {
        /// Target table.
        table: String,
        /// Zero-based index of the offending row.
        row: usize,
    },

    /// A list condition has no values.
    #[error("Condition on '{0}' has an empty value list")]
    EmptyInList(String),

    /// Two values of one statement would bind under the same placeholder name.
    #[error("Placeholder ':{0}' is used by more than one value")]
    DuplicateBindName(String),
}

/// Result type for rivet-core operations.
pub type Result<T> = std::result::Result<T, Error>;
