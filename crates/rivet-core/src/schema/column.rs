//! Column definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Logical column types understood by every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// 8-bit integer.
    TinyInteger,
    /// 16-bit integer.
    SmallInteger,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// Boolean.
    Boolean,
    /// Exact numeric with length (precision) and decimals (scale).
    Decimal,
    /// Single precision floating point.
    Float,
    /// Double precision floating point.
    Double,
    /// Fixed-length character string.
    Char,
    /// Variable-length character string.
    String,
    /// Unbounded text.
    Text,
    /// JSON document.
    Json,
    /// UUID.
    Uuid,
    /// Fixed-length binary string.
    Binary,
    /// Binary large object.
    Blob,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Date and time.
    DateTime,
    /// Timestamp.
    Timestamp,
    /// One value out of a fixed list.
    Enum,
    /// Any subset of a fixed list.
    Set,
}

impl ColumnType {
    /// Returns the canonical lowercase name of the type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TinyInteger => "tiny_integer",
            Self::SmallInteger => "small_integer",
            Self::Integer => "integer",
            Self::BigInteger => "big_integer",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Double => "double",
            Self::Char => "char",
            Self::String => "string",
            Self::Text => "text",
            Self::Json => "json",
            Self::Uuid => "uuid",
            Self::Binary => "binary",
            Self::Blob => "blob",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Enum => "enum",
            Self::Set => "set",
        }
    }

    /// Returns whether the type is one of the integer types.
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TinyInteger | Self::SmallInteger | Self::Integer | Self::BigInteger
        )
    }

    /// Returns whether the type carries an explicit list of values.
    #[must_use]
    pub fn has_values(self) -> bool {
        matches!(self, Self::Enum | Self::Set)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let ty = match s.to_ascii_lowercase().as_str() {
            "tiny_integer" | "tinyinteger" => Self::TinyInteger,
            "small_integer" | "smallinteger" => Self::SmallInteger,
            "integer" => Self::Integer,
            "big_integer" | "biginteger" => Self::BigInteger,
            "boolean" => Self::Boolean,
            "decimal" => Self::Decimal,
            "float" => Self::Float,
            "double" => Self::Double,
            "char" => Self::Char,
            "string" => Self::String,
            "text" => Self::Text,
            "json" => Self::Json,
            "uuid" => Self::Uuid,
            "binary" => Self::Binary,
            "blob" => Self::Blob,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            "timestamp" => Self::Timestamp,
            "enum" => Self::Enum,
            "set" => Self::Set,
            _ => {
                return Err(Error::InvalidValue {
                    kind: "Column type",
                    value: s.to_string(),
                    expected: "tiny_integer, small_integer, integer, big_integer, boolean, \
                               decimal, float, double, char, string, text, json, uuid, binary, \
                               blob, date, time, datetime, timestamp, enum, set",
                })
            }
        };
        Ok(ty)
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String literal default.
    String(String),
    /// Raw SQL expression (e.g., CURRENT_TIMESTAMP).
    Expression(String),
}

/// Where a new column lands relative to existing ones (MySQL only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPosition {
    /// Before every other column.
    First,
    /// Right after the named column.
    After(String),
}

/// Settings bag of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSettings {
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// Length (or precision for decimals).
    pub length: Option<u32>,
    /// Number of decimals (scale).
    pub decimals: Option<u32>,
    /// Whether numeric values are signed.
    pub signed: bool,
    /// Whether this column auto-increments.
    pub autoincrement: bool,
    /// Allowed values of enum and set columns.
    pub values: Vec<String>,
    /// Character set override.
    pub charset: Option<String>,
    /// Collation override.
    pub collation: Option<String>,
    /// Column comment.
    pub comment: Option<String>,
    /// Position of a newly added column.
    pub position: Option<ColumnPosition>,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            nullable: false,
            default: None,
            length: None,
            decimals: None,
            signed: true,
            autoincrement: false,
            values: Vec::new(),
            charset: None,
            collation: None,
            comment: None,
            position: None,
        }
    }
}

impl ColumnSettings {
    /// Creates the default settings: NOT NULL, signed, no default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows NULL values.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the length.
    #[must_use]
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets length and decimals at once.
    #[must_use]
    pub fn precision(mut self, length: u32, decimals: u32) -> Self {
        self.length = Some(length);
        self.decimals = Some(decimals);
        self
    }

    /// Marks numeric values as unsigned.
    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.signed = false;
        self
    }

    /// Sets the column to auto-increment.
    #[must_use]
    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self
    }

    /// Sets the allowed values of an enum or set column.
    #[must_use]
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the character set.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Overrides the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the column comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Places the column before every other column.
    #[must_use]
    pub fn first(mut self) -> Self {
        self.position = Some(ColumnPosition::First);
        self
    }

    /// Places the column right after `column`.
    #[must_use]
    pub fn after(mut self, column: impl Into<String>) -> Self {
        self.position = Some(ColumnPosition::After(column.into()));
        self
    }
}

/// A column: name, logical type and settings.
///
/// Columns are immutable; changing a column means replacing the whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
    #[serde(default)]
    settings: ColumnSettings,
}

impl Column {
    /// Creates a column with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::with_settings(name, column_type, ColumnSettings::default())
    }

    /// Creates a column with the given settings.
    #[must_use]
    pub fn with_settings(
        name: impl Into<String>,
        column_type: ColumnType,
        settings: ColumnSettings,
    ) -> Self {
        Self {
            name: name.into(),
            column_type,
            settings,
        }
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical type.
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Settings bag.
    #[must_use]
    pub fn settings(&self) -> &ColumnSettings {
        &self.settings
    }

    /// Whether the column allows NULL.
    #[must_use]
    pub fn allows_null(&self) -> bool {
        self.settings.nullable
    }

    /// Whether the column auto-increments.
    #[must_use]
    pub fn is_autoincrement(&self) -> bool {
        self.settings.autoincrement
    }

    /// Checks that enum and set columns list their values.
    pub fn validate(&self) -> Result<()> {
        if self.column_type.has_values() && self.settings.values.is_empty() {
            return Err(Error::MissingEnumValues(self.name.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let col = Column::new("title", ColumnType::String);
        assert_eq!(col.name(), "title");
        assert_eq!(col.column_type(), ColumnType::String);
        assert!(!col.allows_null());
        assert!(col.settings().signed);
        assert!(!col.is_autoincrement());
        assert_eq!(col.settings().default, None);
    }

    #[test]
    fn test_settings_builder() {
        let settings = ColumnSettings::new()
            .nullable()
            .precision(10, 2)
            .unsigned()
            .default_value(DefaultValue::Float(1.5))
            .comment("price")
            .after("title");
        assert!(settings.nullable);
        assert_eq!(settings.length, Some(10));
        assert_eq!(settings.decimals, Some(2));
        assert!(!settings.signed);
        assert_eq!(settings.comment.as_deref(), Some("price"));
        assert_eq!(
            settings.position,
            Some(ColumnPosition::After("title".to_string()))
        );
    }

    #[test]
    fn test_enum_requires_values() {
        let col = Column::new("status", ColumnType::Enum);
        assert_eq!(
            col.validate(),
            Err(Error::MissingEnumValues("status".to_string()))
        );

        let col = Column::with_settings(
            "status",
            ColumnType::Enum,
            ColumnSettings::new().values(["new", "done"]),
        );
        assert!(col.validate().is_ok());
    }

    #[test]
    fn test_column_type_from_str() {
        assert_eq!("biginteger".parse::<ColumnType>(), Ok(ColumnType::BigInteger));
        assert_eq!("DateTime".parse::<ColumnType>(), Ok(ColumnType::DateTime));
        assert!(matches!(
            "money".parse::<ColumnType>(),
            Err(Error::InvalidValue { kind: "Column type", .. })
        ));
    }

    #[test]
    fn test_column_deserializes_with_partial_settings() {
        let col: Column = serde_json::from_str(
            r#"{"name": "email", "type": "string", "settings": {"length": 190, "nullable": true}}"#,
        )
        .unwrap();
        assert_eq!(col.name(), "email");
        assert_eq!(col.settings().length, Some(190));
        assert!(col.allows_null());
        assert!(col.settings().signed);
    }
}
