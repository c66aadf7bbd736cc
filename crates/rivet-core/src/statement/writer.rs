//! Dual-form SQL writer.

use std::collections::HashSet;

use super::{Bind, Statement};
use crate::dialect::SqlDialect;
use crate::error::{Error, Result};
use crate::value::SqlValue;

/// Builds the named-placeholder SQL and the driver SQL of a statement at the
/// same time, collecting bind values in placeholder order.
pub(crate) struct SqlWriter<'d> {
    dialect: &'d dyn SqlDialect,
    named: String,
    driver: String,
    binds: Vec<Bind>,
    names: HashSet<String>,
}

impl<'d> SqlWriter<'d> {
    pub(crate) fn new(dialect: &'d dyn SqlDialect) -> Self {
        Self {
            dialect,
            named: String::new(),
            driver: String::new(),
            binds: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Pushes text to both forms.
    pub(crate) fn push(&mut self, s: &str) {
        self.named.push_str(s);
        self.driver.push_str(s);
    }

    /// Pushes an escaped identifier.
    pub(crate) fn push_identifier(&mut self, name: &str) {
        let escaped = self.dialect.escape_identifier(name);
        self.push(&escaped);
    }

    /// Pushes escaped identifiers separated by commas.
    pub(crate) fn push_identifiers<S: AsRef<str>>(&mut self, names: &[S]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push_identifier(name.as_ref());
        }
    }

    /// Pushes a placeholder named `name` and records its value.
    ///
    /// Date/time values are converted to text, then the dialect coerces the
    /// value. Fails if the sanitized name is already taken by an earlier bind.
    pub(crate) fn push_bind(&mut self, name: &str, value: SqlValue) -> Result<()> {
        let name = sanitize(name);
        if !self.names.insert(name.clone()) {
            return Err(Error::DuplicateBindName(name));
        }
        let placeholder = self.dialect.placeholder(self.binds.len() + 1);
        self.named.push(':');
        self.named.push_str(&name);
        self.driver.push_str(&placeholder);
        let value = self.dialect.coerce_value(value.normalize_datetime());
        self.binds.push(Bind { name, value });
        Ok(())
    }

    pub(crate) fn finish(self) -> Statement {
        Statement {
            sql: self.named,
            driver_sql: self.driver,
            binds: self.binds,
        }
    }
}

/// Replaces characters that cannot appear in a placeholder name.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn test_dual_output() {
        let mut writer = SqlWriter::new(Dialect::Postgres.hooks());
        writer.push("SELECT * FROM ");
        writer.push_identifier("users");
        writer.push(" WHERE ");
        writer.push_identifier("id");
        writer.push(" = ");
        writer.push_bind("where_id", SqlValue::Int(1)).unwrap();
        writer.push(" AND ");
        writer.push_identifier("name");
        writer.push(" = ");
        writer
            .push_bind("where_name", SqlValue::Text("a".to_string()))
            .unwrap();

        let statement = writer.finish();
        assert_eq!(
            statement.sql(),
            "SELECT * FROM \"users\" WHERE \"id\" = :where_id AND \"name\" = :where_name"
        );
        assert_eq!(
            statement.driver_sql(),
            "SELECT * FROM \"users\" WHERE \"id\" = $1 AND \"name\" = $2"
        );
        assert_eq!(statement.binds().len(), 2);
    }

    #[test]
    fn test_bind_names_stay_unique() {
        let mut writer = SqlWriter::new(Dialect::Mysql.hooks());
        writer.push_bind("a-b", SqlValue::Int(1)).unwrap();
        assert_eq!(
            writer.push_bind("a_b", SqlValue::Int(2)),
            Err(Error::DuplicateBindName("a_b".to_string()))
        );
        writer.push_bind("a_c", SqlValue::Int(3)).unwrap();

        let statement = writer.finish();
        assert_eq!(statement.driver_sql(), "??");
        assert_eq!(statement.binds().len(), 2);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("where_user-id"), "where_user_id");
        assert_eq!(sanitize("first name"), "first_name");
        assert_eq!(sanitize("plain_1"), "plain_1");
    }
}
