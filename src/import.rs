//! Row import: transform CSV records and insert them in one transaction.
//!
//! A run is: resolve paths, read the CSV, open the store, inspect the table,
//! optionally delete earlier seed rows, insert the batch. The connection is a
//! local of [`run`] and is closed when it returns, on success or error.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rusqlite::{Connection, OpenFlags};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    BatchContext, SourceRecord, TransformedRecord, DEFAULT_TABLE, LEGACY_TITLE_PREFIX,
    SEED_SOURCE_TYPE,
};
use crate::normalize::{clean_title, normalize_text};
use crate::paths::resolve_inputs;
use crate::progress::{spinner, PhaseProgress, ProgressMode};
use crate::schema::{quote_ident, IdStrategy, InsertPlan, TableSchema};
use crate::source::read_source_records;
use crate::tags::repair_tags;

/// Inputs of one import run.
#[derive(Clone, Debug)]
pub struct ImportConfig {
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub table: String,
    /// Delete earlier seed rows before inserting.
    pub truncate: bool,
    pub progress: ProgressMode,
}

impl ImportConfig {
    pub fn new(csv_path: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            db_path: db_path.into(),
            table: DEFAULT_TABLE.to_string(),
            truncate: false,
            progress: ProgressMode::default(),
        }
    }
}

/// Counters from one insert batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub inserted: usize,
    pub tags_repaired: usize,
}

/// Summary of a completed run.
#[derive(Clone, Debug)]
pub struct ImportReport {
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub table: String,
    pub id_strategy: IdStrategy,
    pub rows_in_csv: usize,
    /// `Some` only when truncation was requested.
    pub deleted: Option<usize>,
    pub stats: ImportStats,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CSV file:       {}", self.csv_path.display())?;
        writeln!(f, "Database file:  {}", self.db_path.display())?;
        writeln!(f, "Table:          {}", self.table)?;
        writeln!(f, "id mode:        {}", self.id_strategy)?;
        writeln!(f, "Rows in CSV:    {}", self.rows_in_csv)?;
        if let Some(deleted) = self.deleted {
            writeln!(f, "Deleted rows:   {}", deleted)?;
        }
        writeln!(f, "Inserted rows:  {}", self.stats.inserted)?;
        writeln!(f, "Tags repaired:  {}", self.stats.tags_repaired)?;
        write!(f, "Title cleanup:  removed trailing [number] pattern")
    }
}

/// Clean, normalize and repair one source record.
pub fn transform_record(
    record: &SourceRecord,
    id_strategy: IdStrategy,
    ctx: &BatchContext,
) -> TransformedRecord {
    let title = clean_title(record.book_title.as_deref().unwrap_or(""));
    let author = record.book_author.as_deref().unwrap_or("").trim().to_string();
    let category = record.trademe_categories.as_deref().unwrap_or("").trim().to_string();
    let tags = repair_tags(record.shopify_tags.as_deref());
    let tags_repaired = tags.was_repaired();

    let id = match id_strategy {
        IdStrategy::TextUuid => Some(Uuid::new_v4().to_string()),
        IdStrategy::IntegerAutoincrement | IdStrategy::None => None,
    };

    TransformedRecord {
        id,
        book_title_norm: normalize_text(Some(title.as_str())),
        book_author_norm: normalize_text(Some(author.as_str())),
        book_title: title,
        book_author: author,
        trademe_categories: category,
        shopify_tags: tags.json().to_string(),
        created_at: ctx.now.clone(),
        updated_at: ctx.now.clone(),
        source_type: SEED_SOURCE_TYPE,
        tags_repaired,
    }
}

/// `LIKE` pattern matching titles that start with the literal legacy prefix.
fn legacy_prefix_pattern() -> String {
    let mut pattern = String::with_capacity(LEGACY_TITLE_PREFIX.len() * 2);
    for c in LEGACY_TITLE_PREFIX.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Delete rows from an earlier import, committed on its own.
///
/// Uses `source_type` when the table has it, otherwise the legacy title prefix.
/// Returns the number of rows deleted.
pub fn truncate_seed_rows(
    conn: &mut Connection,
    schema: &TableSchema,
    mode: ProgressMode,
) -> Result<usize> {
    let pb = spinner(mode, "Deleting previous taxonomy rows");
    let table = quote_ident(schema.table());

    let tx = conn.transaction()?;
    let deleted = if schema.has_column("source_type") {
        tx.execute(
            &format!("DELETE FROM {} WHERE source_type = ?1", table),
            [SEED_SOURCE_TYPE],
        )?
    } else {
        debug!("No source_type column; matching legacy title prefix");
        tx.execute(
            &format!("DELETE FROM {} WHERE book_title LIKE ?1 ESCAPE '\\'", table),
            [legacy_prefix_pattern()],
        )?
    };
    tx.commit()?;

    pb.finish_with_message(format!("Deleted {} previous taxonomy rows", deleted));
    info!("Deleted {} previous taxonomy rows from {}", deleted, schema.table());
    Ok(deleted)
}

/// Insert every record in one transaction.
///
/// All rows share `ctx.now`. Any failed insert returns the error and the
/// transaction rolls back, so either all rows land or none do.
pub fn import_rows(
    conn: &mut Connection,
    records: &[SourceRecord],
    plan: &InsertPlan,
    ctx: &BatchContext,
    mode: ProgressMode,
) -> Result<ImportStats> {
    let mut progress = PhaseProgress::new(mode, "Inserting rows", records.len() as u64);
    let sql = plan.insert_sql();
    debug!("Insert statement: {}", sql);

    let mut stats = ImportStats::default();
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(&sql)?;
        for record in records {
            let row = transform_record(record, plan.id_strategy, ctx);
            stmt.execute(plan.params(&row).as_slice())?;

            stats.inserted += 1;
            if row.tags_repaired {
                stats.tags_repaired += 1;
            }
            progress.inc();
        }
    }
    tx.commit()?;

    progress.finish(format!("Inserted {} rows", stats.inserted));
    Ok(stats)
}

fn open_store(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

/// Run a full import.
pub fn run(config: &ImportConfig) -> Result<ImportReport> {
    let (csv_path, db_path) = resolve_inputs(&config.csv_path, &config.db_path)?;

    let records = read_source_records(&csv_path)?;

    info!("Opening database: {}", db_path.display());
    let mut conn = open_store(&db_path)?;

    let schema = TableSchema::inspect(&conn, &config.table)?;
    debug!(
        "Columns of '{}': {:?}",
        schema.table(),
        schema.columns().iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
    );
    let plan = schema.insert_plan()?;
    info!(
        "Table '{}': id mode {}, inserting columns {:?}",
        plan.table,
        plan.id_strategy,
        plan.column_names()
    );

    let deleted = if config.truncate {
        Some(truncate_seed_rows(&mut conn, &schema, config.progress)?)
    } else {
        None
    };

    let ctx = BatchContext::capture();
    let stats = import_rows(&mut conn, &records, &plan, &ctx, config.progress)?;

    Ok(ImportReport {
        csv_path,
        db_path,
        table: plan.table,
        id_strategy: plan.id_strategy,
        rows_in_csv: records.len(),
        deleted,
        stats,
    })
}
