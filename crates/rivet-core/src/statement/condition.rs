//! Structured WHERE conditions.

use crate::value::{SqlValue, ToSqlValue};

/// Value side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    /// `col = value`, or `col IS NULL` for NULL.
    Single(SqlValue),
    /// `col IN (values…)`.
    List(Vec<SqlValue>),
}

/// Ordered column → value conditions, ANDed together.
///
/// ```rust
/// use rivet_core::statement::Conditions;
///
/// let conditions = Conditions::new()
///     .eq("account_id", 7)
///     .any("status", ["active", "pending"]);
/// assert_eq!(conditions.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    entries: Vec<(String, ConditionValue)>,
}

impl Conditions {
    /// Creates an empty condition set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `column` to equal `value`.
    #[must_use]
    pub fn eq<V: ToSqlValue>(self, column: impl Into<String>, value: V) -> Self {
        self.with(column.into(), ConditionValue::Single(value.to_sql_value()))
    }

    /// Requires `column` to equal one of `values`.
    #[must_use]
    pub fn any<I, V>(self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        let values = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        self.with(column.into(), ConditionValue::List(values))
    }

    /// Conditions, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionValue)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Number of conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is no condition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn with(mut self, column: String, value: ConditionValue) -> Self {
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((column, value)),
        }
        self
    }
}
