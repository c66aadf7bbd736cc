//! Options of fetch queries.

use super::Conditions;

/// Selected columns.
///
/// Column names are escaped. Expressions such as `COUNT(*)` or aliases need
/// [`Fields::Raw`], which is written as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Fields {
    /// `*`
    #[default]
    All,
    /// The listed columns, escaped.
    Columns(Vec<String>),
    /// A field list copied verbatim into the SQL. Never build it from
    /// untrusted input.
    Raw(String),
}

/// One ORDER BY entry as given by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OrderEntry {
    Pair(String, String),
    Column(String),
}

/// ORDER BY entries.
///
/// Entries are either `(column, direction)` pairs or plain column names.
/// A pair whose direction is neither `ASC` nor `DESC` (case-insensitive) is
/// read as a plain column: the direction text becomes the column name and
/// the order is ascending. This lets callers mix both shapes, at the cost of
/// silently accepting a mistyped direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Orders {
    entries: Vec<OrderEntry>,
}

impl Orders {
    /// Creates an empty ORDER BY list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `(column, direction)` pair.
    #[must_use]
    pub fn by(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.entries
            .push(OrderEntry::Pair(column.into(), direction.into()));
        self
    }

    /// Adds a column ordered ascending.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.entries.push(OrderEntry::Column(column.into()));
        self
    }

    /// Whether there is no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves entries into `(column, "ASC" | "DESC")`.
    #[must_use]
    pub fn resolve(&self) -> Vec<(&str, &'static str)> {
        self.entries
            .iter()
            .map(|entry| match entry {
                OrderEntry::Pair(column, direction) => {
                    match direction.to_ascii_uppercase().as_str() {
                        "ASC" => (column.as_str(), "ASC"),
                        "DESC" => (column.as_str(), "DESC"),
                        _ => (direction.as_str(), "ASC"),
                    }
                }
                OrderEntry::Column(column) => (column.as_str(), "ASC"),
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Orders {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |orders, column| orders.column(column))
    }
}

/// Everything a fetch needs besides the table name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptions {
    /// Selected columns.
    pub fields: Fields,
    /// WHERE conditions.
    pub conditions: Conditions,
    /// Row limit; `None` or `0` means no limit.
    pub limit: Option<u64>,
    /// ORDER BY entries.
    pub orders: Orders,
    /// GROUP BY columns.
    pub groups: Vec<String>,
}

impl FetchOptions {
    /// Selects every column of every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the given columns.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.fields = Fields::Columns(columns.iter().map(|c| (*c).to_string()).collect());
        self
    }

    /// Selects a raw field list, e.g. `"status, COUNT(*) AS total"`.
    #[must_use]
    pub fn raw_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Fields::Raw(fields.into());
        self
    }

    /// Sets the WHERE conditions.
    #[must_use]
    pub fn filter(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the ORDER BY entries.
    #[must_use]
    pub fn order(mut self, orders: Orders) -> Self {
        self.orders = orders;
        self
    }

    /// Sets the GROUP BY columns.
    #[must_use]
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.groups = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_pairs() {
        let orders = Orders::new().by("name", "desc").by("id", "asc");
        assert_eq!(orders.resolve(), [("name", "DESC"), ("id", "ASC")]);
    }

    #[test]
    fn test_resolve_plain_columns() {
        let orders: Orders = ["name"].into_iter().collect();
        assert_eq!(orders.resolve(), [("name", "ASC")]);
    }

    #[test]
    fn test_bad_direction_falls_back_to_column() {
        let orders = Orders::new().by("0", "created_at");
        assert_eq!(orders.resolve(), [("created_at", "ASC")]);
    }
}
