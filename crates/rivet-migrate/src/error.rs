//! Error types for executing schema changes.

/// Errors that can occur while talking to the database.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// The database rejected a statement.
    #[error(
        "SQLSTATE[{}]: {message}.{}",
        .code.as_deref().unwrap_or("HY000"),
        .query.as_ref().map(|q| format!(" Query {q} fails")).unwrap_or_default()
    )]
    QueryExecution {
        /// Driver error code, when the driver reports one.
        code: Option<String>,
        /// Driver error message.
        message: String,
        /// The failing statement.
        query: Option<String>,
    },

    /// The connection could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// SQL could not be built.
    #[error(transparent)]
    Core(#[from] rivet_core::Error),

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (reading configuration or change files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MigrateError {
    /// Maps a driver error raised by `query`.
    pub(crate) fn from_driver(error: sqlx::Error, query: Option<&str>) -> Self {
        let query = query.map(str::to_string);
        match error {
            sqlx::Error::Database(e) => Self::QueryExecution {
                code: e.code().map(|c| c.into_owned()),
                message: e.message().to_string(),
                query,
            },
            other => Self::QueryExecution {
                code: None,
                message: other.to_string(),
                query,
            },
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_execution_message() {
        let err = MigrateError::QueryExecution {
            code: Some("42S02".to_string()),
            message: "Table 'missing' doesn't exist".to_string(),
            query: Some("SELECT * FROM missing".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "SQLSTATE[42S02]: Table 'missing' doesn't exist. Query SELECT * FROM missing fails"
        );

        let err = MigrateError::QueryExecution {
            code: None,
            message: "pool timed out".to_string(),
            query: None,
        };
        assert_eq!(err.to_string(), "SQLSTATE[HY000]: pool timed out.");
    }

    #[test]
    fn test_core_errors_convert() {
        let err: MigrateError = rivet_core::Error::NotASelect.into();
        assert_eq!(
            err.to_string(),
            "Only select query can be executed in select method"
        );
    }
}
