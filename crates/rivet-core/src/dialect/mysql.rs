//! MySQL dialect.

use super::{bool_to_int, Dialect, SqlDialect};
use crate::error::Result;
use crate::query::{primary_uses_added_column, validate_columns, QueryBuilder};
use crate::schema::{
    Column, ColumnPosition, ColumnType, Index, IndexKind, MigrationTable, Table,
};
use crate::value::SqlValue;

/// MySQL dialect.
///
/// Indexes and foreign keys are declared inside `CREATE TABLE`, and each
/// alter step is one multi-clause `ALTER TABLE` statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MysqlDialect {
    default_charset: Option<String>,
}

impl MysqlDialect {
    /// Creates a MySQL dialect without a default table charset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_charset: None,
        }
    }

    /// Creates a MySQL dialect emitting `charset` for tables that do not set
    /// their own.
    #[must_use]
    pub fn with_charset(charset: impl Into<String>) -> Self {
        Self {
            default_charset: Some(charset.into()),
        }
    }

    fn column_type(&self, column: &Column) -> String {
        let settings = column.settings();
        let sized = |name: &str, default: Option<u32>| match settings.length.or(default) {
            Some(length) => format!("{name}({length})"),
            None => name.to_string(),
        };
        let numeric = |name: &str| match (settings.length, settings.decimals) {
            (Some(length), Some(decimals)) => format!("{name}({length},{decimals})"),
            (Some(length), None) => format!("{name}({length})"),
            _ => name.to_string(),
        };
        let values = || {
            settings
                .values
                .iter()
                .map(|v| self.quote_string(v))
                .collect::<Vec<_>>()
                .join(",")
        };

        let mut sql = match column.column_type() {
            ColumnType::TinyInteger => sized("tinyint", None),
            ColumnType::SmallInteger => sized("smallint", None),
            ColumnType::Integer => sized("int", None),
            ColumnType::BigInteger => sized("bigint", None),
            ColumnType::Boolean => "tinyint(1)".to_string(),
            ColumnType::Decimal => format!(
                "decimal({},{})",
                settings.length.unwrap_or(10),
                settings.decimals.unwrap_or(0)
            ),
            ColumnType::Float => numeric("float"),
            ColumnType::Double => numeric("double"),
            ColumnType::Char => sized("char", Some(255)),
            ColumnType::String => sized("varchar", Some(255)),
            ColumnType::Text => "text".to_string(),
            ColumnType::Json => "json".to_string(),
            ColumnType::Uuid => "char(36)".to_string(),
            ColumnType::Binary => sized("binary", Some(255)),
            ColumnType::Blob => "blob".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::Time => "time".to_string(),
            ColumnType::DateTime => "datetime".to_string(),
            ColumnType::Timestamp => "timestamp".to_string(),
            ColumnType::Enum => format!("enum({})", values()),
            ColumnType::Set => format!("set({})", values()),
        };

        let is_numeric = column.column_type().is_integer()
            || matches!(
                column.column_type(),
                ColumnType::Decimal | ColumnType::Float | ColumnType::Double
            );
        if is_numeric && !settings.signed {
            sql.push_str(" unsigned");
        }
        sql
    }

    fn column_definition(&self, column: &Column) -> Result<String> {
        column.validate()?;
        let settings = column.settings();
        let mut sql = format!(
            "{} {}",
            self.escape_identifier(column.name()),
            self.column_type(column)
        );
        if let Some(charset) = &settings.charset {
            sql.push_str(" CHARACTER SET ");
            sql.push_str(charset);
        }
        if let Some(collation) = &settings.collation {
            sql.push_str(" COLLATE ");
            sql.push_str(collation);
        }
        if !column.allows_null() {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &settings.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.default_value(default));
        }
        if column.is_autoincrement() {
            sql.push_str(" AUTO_INCREMENT");
        }
        if let Some(comment) = &settings.comment {
            sql.push_str(" COMMENT ");
            sql.push_str(&self.quote_string(comment));
        }
        Ok(sql)
    }

    fn positioned_definition(&self, column: &Column) -> Result<String> {
        let mut sql = self.column_definition(column)?;
        match &column.settings().position {
            Some(ColumnPosition::First) => sql.push_str(" FIRST"),
            Some(ColumnPosition::After(other)) => {
                sql.push_str(" AFTER ");
                sql.push_str(&self.escape_identifier(other));
            }
            None => {}
        }
        Ok(sql)
    }

    fn index_definition(&self, index: &Index) -> String {
        let prefix = match index.kind() {
            IndexKind::Normal => "",
            IndexKind::Unique => "UNIQUE ",
            IndexKind::Fulltext => "FULLTEXT ",
        };
        let mut sql = format!(
            "{prefix}INDEX {} ({})",
            self.escape_identifier(index.name()),
            self.column_list(index.columns())
        );
        if index.kind() != IndexKind::Fulltext {
            if let Some(method) = index.method().as_sql() {
                sql.push_str(" USING ");
                sql.push_str(method);
            }
        }
        sql
    }

    fn primary_key_definition(&self, columns: &[String]) -> String {
        format!("PRIMARY KEY ({})", self.column_list(columns))
    }

    fn options(
        &self,
        charset: Option<&str>,
        collation: Option<&str>,
        comment: Option<&str>,
    ) -> Vec<String> {
        let mut options = Vec::new();
        if let Some(charset) = charset {
            options.push(format!("DEFAULT CHARACTER SET={charset}"));
        }
        if let Some(collation) = collation {
            options.push(format!("COLLATE={collation}"));
        }
        if let Some(comment) = comment {
            options.push(format!("COMMENT={}", self.quote_string(comment)));
        }
        options
    }
}

impl SqlDialect for MysqlDialect {
    fn kind(&self) -> Dialect {
        Dialect::Mysql
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn coerce_value(&self, value: SqlValue) -> SqlValue {
        bool_to_int(value)
    }
}

impl QueryBuilder for MysqlDialect {
    fn create_from_table(&self, table: &Table) -> Result<Vec<String>> {
        validate_columns(&table.columns)?;
        let mut definitions = table
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect::<Result<Vec<_>>>()?;
        if !table.primary.is_empty() {
            definitions.push(self.primary_key_definition(&table.primary));
        }
        definitions.extend(table.indexes.iter().map(|i| self.index_definition(i)));
        definitions.extend(
            table
                .foreign_keys
                .iter()
                .map(|fk| self.foreign_key_definition(&table.name, fk)),
        );

        let mut sql = format!(
            "CREATE TABLE {} ({})",
            self.escape_identifier(&table.name),
            definitions.join(", ")
        );
        let charset = table.charset.as_deref().or(self.default_charset.as_deref());
        let comment = table.comment.as_deref().filter(|c| !c.is_empty());
        for option in self.options(charset, table.collation.as_deref(), comment) {
            sql.push(' ');
            sql.push_str(&option);
        }
        Ok(vec![sql])
    }

    fn drop_foreign_keys(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(self.alter_clauses(
            table.name(),
            table
                .foreign_keys_to_drop()
                .iter()
                .map(|name| {
                    let constraint = format!("{}_{}", table.name(), name);
                    format!("DROP FOREIGN KEY {}", self.escape_identifier(&constraint))
                })
                .collect(),
        ))
    }

    fn drop_indexes(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(self.alter_clauses(
            table.name(),
            table
                .indexes_to_drop()
                .iter()
                .map(|name| format!("DROP INDEX {}", self.escape_identifier(name)))
                .collect(),
        ))
    }

    fn drop_primary_key(&self, table: &MigrationTable) -> Result<Vec<String>> {
        if !table.has_primary_key_to_drop() {
            return Ok(Vec::new());
        }
        Ok(self.alter_clauses(table.name(), vec!["DROP PRIMARY KEY".to_string()]))
    }

    fn add_columns(&self, table: &MigrationTable) -> Result<Vec<String>> {
        let mut clauses = table
            .columns()
            .iter()
            .map(|c| Ok(format!("ADD COLUMN {}", self.positioned_definition(c)?)))
            .collect::<Result<Vec<_>>>()?;
        // An auto-increment column must be a key as soon as it exists.
        if primary_uses_added_column(table) {
            clauses.push(format!(
                "ADD {}",
                self.primary_key_definition(table.primary_columns())
            ));
        }
        Ok(self.alter_clauses(table.name(), clauses))
    }

    fn change_columns(&self, table: &MigrationTable) -> Result<Vec<String>> {
        let clauses = table
            .columns_to_change()
            .iter()
            .map(|(old, column)| {
                Ok(format!(
                    "CHANGE COLUMN {} {}",
                    self.escape_identifier(old),
                    self.positioned_definition(column)?
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.alter_clauses(table.name(), clauses))
    }

    fn add_primary_key(&self, table: &MigrationTable) -> Result<Vec<String>> {
        if table.primary_columns().is_empty() || primary_uses_added_column(table) {
            return Ok(Vec::new());
        }
        Ok(self.alter_clauses(
            table.name(),
            vec![format!(
                "ADD {}",
                self.primary_key_definition(table.primary_columns())
            )],
        ))
    }

    fn add_indexes(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(self.alter_clauses(
            table.name(),
            table
                .indexes()
                .iter()
                .map(|i| format!("ADD {}", self.index_definition(i)))
                .collect(),
        ))
    }

    fn add_foreign_keys(&self, table: &MigrationTable) -> Result<Vec<String>> {
        Ok(self.alter_clauses(
            table.name(),
            table
                .foreign_keys()
                .iter()
                .map(|fk| format!("ADD {}", self.foreign_key_definition(table.name(), fk)))
                .collect(),
        ))
    }

    fn table_options(&self, table: &MigrationTable) -> Result<Vec<String>> {
        let options = self.options(table.charset(), table.collation(), table.comment());
        if options.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![format!(
            "ALTER TABLE {} {}",
            self.escape_identifier(table.name()),
            options.join(" ")
        )])
    }

    fn rename_table(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            self.escape_identifier(old_name),
            self.escape_identifier(new_name)
        )
    }

    fn clone_structure(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "CREATE TABLE {} LIKE {}",
            self.escape_identifier(new_name),
            self.escape_identifier(old_name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::{
        ColumnSettings, CopyMode, DefaultValue, ForeignKeyAction, IndexMethod,
    };

    fn build(table: &MigrationTable) -> Vec<String> {
        MysqlDialect::new().build(table).unwrap()
    }

    #[test]
    fn test_create_table() {
        let table = MigrationTable::new("posts")
            .add_column("title", ColumnType::String, ColumnSettings::new().length(100))
            .add_column(
                "published",
                ColumnType::Boolean,
                ColumnSettings::new().default_value(DefaultValue::Boolean(false)),
            )
            .add_column("user_id", ColumnType::Integer, ColumnSettings::new().unsigned())
            .add_index(&["title"], IndexKind::Unique, IndexMethod::Btree, None)
            .unwrap()
            .add_foreign_key(
                &["user_id"],
                "users",
                &["id"],
                ForeignKeyAction::Cascade,
                ForeignKeyAction::Default,
            )
            .unwrap()
            .set_comment("Blog posts")
            .create();

        assert_eq!(
            build(&table),
            [concat!(
                "CREATE TABLE `posts` (",
                "`id` int NOT NULL AUTO_INCREMENT, ",
                "`title` varchar(100) NOT NULL, ",
                "`published` tinyint(1) NOT NULL DEFAULT 0, ",
                "`user_id` int unsigned NOT NULL, ",
                "PRIMARY KEY (`id`), ",
                "UNIQUE INDEX `idx_posts_title` (`title`) USING BTREE, ",
                "CONSTRAINT `posts_user_id` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE CASCADE",
                ") COMMENT='Blog posts'"
            )]
        );
    }

    #[test]
    fn test_create_with_default_charset() {
        let table = MigrationTable::new("tags")
            .add_column("name", ColumnType::String, ColumnSettings::new())
            .create();
        let queries = MysqlDialect::with_charset("utf8mb4").build(&table).unwrap();
        assert!(queries[0].ends_with(") DEFAULT CHARACTER SET=utf8mb4"));

        let table = table.set_charset("latin1").set_collation("latin1_general_ci");
        let queries = MysqlDialect::with_charset("utf8mb4").build(&table).unwrap();
        assert!(queries[0].ends_with(") DEFAULT CHARACTER SET=latin1 COLLATE=latin1_general_ci"));
    }

    #[test]
    fn test_column_types() {
        let table = MigrationTable::with_primary("t", false)
            .add_column("a", ColumnType::Decimal, ColumnSettings::new().precision(8, 2))
            .add_column("b", ColumnType::Uuid, ColumnSettings::new())
            .add_column(
                "c",
                ColumnType::Enum,
                ColumnSettings::new().values(["new", "it's"]).nullable(),
            )
            .add_column(
                "d",
                ColumnType::Text,
                ColumnSettings::new().charset("utf8mb4").collation("utf8mb4_bin"),
            )
            .create();
        assert_eq!(
            build(&table),
            [concat!(
                "CREATE TABLE `t` (",
                "`a` decimal(8,2) NOT NULL, ",
                "`b` char(36) NOT NULL, ",
                "`c` enum('new','it''s'), ",
                "`d` text CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL)"
            )]
        );
    }

    #[test]
    fn test_alter_order() {
        let table = MigrationTable::new("posts")
            .add_foreign_key(
                &["author_id"],
                "authors",
                &["id"],
                ForeignKeyAction::Default,
                ForeignKeyAction::Default,
            )
            .unwrap()
            .add_index(&["author_id"], IndexKind::Normal, IndexMethod::Default, None)
            .unwrap()
            .add_column(
                "author_id",
                ColumnType::Integer,
                ColumnSettings::new().after("title"),
            )
            .change_column("body", "content", ColumnType::Text, ColumnSettings::new().nullable())
            .drop_column("legacy")
            .drop_index(&["legacy"])
            .unwrap()
            .drop_foreign_key(&["legacy"])
            .set_comment("");

        assert_eq!(
            build(&table),
            [
                "ALTER TABLE `posts` DROP FOREIGN KEY `posts_legacy`",
                "ALTER TABLE `posts` DROP INDEX `idx_posts_legacy`",
                "ALTER TABLE `posts` DROP COLUMN `legacy`",
                "ALTER TABLE `posts` ADD COLUMN `author_id` int NOT NULL AFTER `title`",
                "ALTER TABLE `posts` CHANGE COLUMN `body` `content` text",
                "ALTER TABLE `posts` ADD INDEX `idx_posts_author_id` (`author_id`)",
                "ALTER TABLE `posts` ADD CONSTRAINT `posts_author_id` FOREIGN KEY (`author_id`) REFERENCES `authors` (`id`)",
                "ALTER TABLE `posts` COMMENT=''",
            ]
        );
    }

    #[test]
    fn test_replace_primary_key() {
        let table = MigrationTable::new("pivot")
            .drop_primary_key()
            .add_primary(vec!["a", "b"]);
        assert_eq!(
            build(&table),
            [
                "ALTER TABLE `pivot` DROP PRIMARY KEY",
                "ALTER TABLE `pivot` ADD PRIMARY KEY (`a`, `b`)",
            ]
        );
    }

    #[test]
    fn test_add_auto_increment_primary_in_one_statement() {
        let table = MigrationTable::new("legacy").add_primary(true);
        assert_eq!(
            build(&table),
            ["ALTER TABLE `legacy` ADD COLUMN `id` int NOT NULL AUTO_INCREMENT, ADD PRIMARY KEY (`id`)"]
        );
    }

    #[test]
    fn test_empty_alter() {
        assert!(build(&MigrationTable::new("users")).is_empty());
    }

    #[test]
    fn test_rename_drop_copy() {
        assert_eq!(
            build(&MigrationTable::new("a").rename("b")),
            ["RENAME TABLE `a` TO `b`"]
        );
        assert_eq!(build(&MigrationTable::new("a").drop()), ["DROP TABLE `a`"]);
        assert_eq!(
            build(&MigrationTable::new("a").copy("b", CopyMode::StructureAndData)),
            [
                "CREATE TABLE `b` LIKE `a`",
                "INSERT INTO `b` SELECT * FROM `a`",
            ]
        );
        assert_eq!(
            build(&MigrationTable::new("a").copy("b", CopyMode::OnlyData)),
            ["INSERT INTO `b` SELECT * FROM `a`"]
        );
    }

    #[test]
    fn test_enum_without_values() {
        let table = MigrationTable::new("t")
            .add_column("status", ColumnType::Enum, ColumnSettings::new())
            .create();
        assert_eq!(
            MysqlDialect::new().build(&table),
            Err(Error::MissingEnumValues("status".to_string()))
        );
    }

    #[test]
    fn test_quote_string_escapes_backslash() {
        assert_eq!(MysqlDialect::new().quote_string(r"a\'b"), r"'a\\''b'");
    }
}
