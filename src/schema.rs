//! Target table introspection.
//!
//! The books table is read once per run with `PRAGMA table_info` and turned
//! into a [`TableSchema`]; everything downstream works from that value and the
//! [`InsertPlan`] it produces.

use std::fmt;

use log::debug;
use rusqlite::{Connection, ToSql};
use rustc_hash::FxHashSet;

use crate::error::{ImportError, Result};
use crate::models::TransformedRecord;

/// Double-quote an SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// One row of `PRAGMA table_info`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

/// How the `id` column gets its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdStrategy {
    /// Integer-typed id; SQLite assigns it.
    IntegerAutoincrement,
    /// Any other declared type; the importer writes a UUID v4.
    TextUuid,
    /// No `id` column.
    None,
}

impl IdStrategy {
    fn from_declared_type(declared_type: &str) -> Self {
        if declared_type.to_uppercase().contains("INT") {
            IdStrategy::IntegerAutoincrement
        } else {
            IdStrategy::TextUuid
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IdStrategy::IntegerAutoincrement => "INTEGER_AUTOINC",
            IdStrategy::TextUuid => "TEXT_UUID",
            IdStrategy::None => "none",
        };
        f.write_str(label)
    }
}

/// Columns the importer knows how to populate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BookColumn {
    Id,
    Title,
    Author,
    TitleNorm,
    AuthorNorm,
    Category,
    Tags,
    CreatedAt,
    UpdatedAt,
    SourceType,
}

impl BookColumn {
    /// Always inserted, in this order.
    pub const REQUIRED: [BookColumn; 6] = [
        BookColumn::Title,
        BookColumn::Author,
        BookColumn::TitleNorm,
        BookColumn::AuthorNorm,
        BookColumn::Category,
        BookColumn::Tags,
    ];

    /// Inserted when the table has them, after the required set.
    pub const OPTIONAL: [BookColumn; 3] = [
        BookColumn::CreatedAt,
        BookColumn::UpdatedAt,
        BookColumn::SourceType,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BookColumn::Id => "id",
            BookColumn::Title => "book_title",
            BookColumn::Author => "book_author",
            BookColumn::TitleNorm => "book_title_norm",
            BookColumn::AuthorNorm => "book_author_norm",
            BookColumn::Category => "trademe_categories",
            BookColumn::Tags => "shopify_tags",
            BookColumn::CreatedAt => "created_at",
            BookColumn::UpdatedAt => "updated_at",
            BookColumn::SourceType => "source_type",
        }
    }

    /// The record field bound for this column.
    pub fn value(self, record: &TransformedRecord) -> &dyn ToSql {
        match self {
            BookColumn::Id => &record.id,
            BookColumn::Title => &record.book_title,
            BookColumn::Author => &record.book_author,
            BookColumn::TitleNorm => &record.book_title_norm,
            BookColumn::AuthorNorm => &record.book_author_norm,
            BookColumn::Category => &record.trademe_categories,
            BookColumn::Tags => &record.shopify_tags,
            BookColumn::CreatedAt => &record.created_at,
            BookColumn::UpdatedAt => &record.updated_at,
            BookColumn::SourceType => &record.source_type,
        }
    }
}

/// Column layout of the target table, read once at the start of a run.
#[derive(Clone, Debug)]
pub struct TableSchema {
    table: String,
    columns: Vec<ColumnInfo>,
    names: FxHashSet<String>,
    id_strategy: IdStrategy,
}

impl TableSchema {
    /// Build a schema from already-known columns.
    pub fn from_columns(table: &str, columns: Vec<ColumnInfo>) -> Result<Self> {
        if columns.is_empty() {
            return Err(ImportError::Schema(format!("Table '{}' not found.", table)));
        }

        let id_strategy = columns
            .iter()
            .find(|c| c.name == "id")
            .map(|c| IdStrategy::from_declared_type(&c.declared_type))
            .unwrap_or(IdStrategy::None);
        let names = columns.iter().map(|c| c.name.clone()).collect();

        Ok(Self {
            table: table.to_string(),
            columns,
            names,
            id_strategy,
        })
    }

    /// Read the columns of `table` from the store.
    pub fn inspect(conn: &Connection, table: &str) -> Result<Self> {
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            let declared_type: Option<String> = row.get(2)?;
            columns.push(ColumnInfo {
                name: row.get(1)?,
                declared_type: declared_type.unwrap_or_default(),
            });
        }

        let schema = Self::from_columns(table, columns)?;
        debug!(
            "Table '{}' has {} columns, id strategy {}",
            schema.table,
            schema.columns.len(),
            schema.id_strategy
        );
        Ok(schema)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Ordered columns to populate: `id` (text-UUID only), the required set,
    /// then whichever optional columns exist.
    pub fn insert_plan(&self) -> Result<InsertPlan> {
        if let Some(missing) = BookColumn::REQUIRED.iter().find(|c| !self.has_column(c.name())) {
            return Err(ImportError::Schema(format!(
                "{} table missing required column: {}",
                self.table,
                missing.name()
            )));
        }

        let mut columns =
            Vec::with_capacity(1 + BookColumn::REQUIRED.len() + BookColumn::OPTIONAL.len());
        if self.id_strategy == IdStrategy::TextUuid {
            columns.push(BookColumn::Id);
        }
        columns.extend(BookColumn::REQUIRED);
        columns.extend(
            BookColumn::OPTIONAL
                .into_iter()
                .filter(|c| self.has_column(c.name())),
        );

        Ok(InsertPlan {
            table: self.table.clone(),
            id_strategy: self.id_strategy,
            columns,
        })
    }
}

/// Resolved insert layout for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertPlan {
    pub table: String,
    pub id_strategy: IdStrategy,
    pub columns: Vec<BookColumn>,
}

impl InsertPlan {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn insert_sql(&self) -> String {
        let cols: Vec<String> = self.columns.iter().map(|c| quote_ident(c.name())).collect();
        let placeholders: Vec<String> =
            (1..=self.columns.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.table),
            cols.join(", "),
            placeholders.join(", ")
        )
    }

    /// Bound parameters for `record`, in column order.
    pub fn params<'a>(&self, record: &'a TransformedRecord) -> Vec<&'a dyn ToSql> {
        self.columns.iter().map(|c| c.value(record)).collect()
    }
}
