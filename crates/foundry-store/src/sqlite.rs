//! SQLite archive

use crate::{truncate_chars, StoreError, TITLE_MAX_CHARS};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use foundry_domain::{SeenIndex, SourceChunk, UseCaseCandidate, UseCaseResult, UseCaseSink};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

const SELECT_COLUMNS: &str =
    "SELECT title, problem, ai_solution, category, industry, note, source, date, source_chunk
     FROM use_cases";

/// SQLite-based archive of published use cases
///
/// The `source` column is unique, so each article URL is archived at most
/// once.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use foundry_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("foundry.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    /// Insert a use case
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` when the source URL is already archived.
    pub fn insert(&mut self, result: &UseCaseResult) -> Result<i64, StoreError> {
        let use_case = &result.use_case;
        let category = serde_json::to_string(&use_case.category_or_default())
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let industry = serde_json::to_string(&use_case.industry_or_default())
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;

        let inserted = self.conn.execute(
            "INSERT INTO use_cases
                (title, problem, ai_solution, category, industry, note, source, date, source_chunk, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                truncate_chars(&use_case.title, TITLE_MAX_CHARS),
                &use_case.problem,
                &use_case.ai_solution,
                category,
                industry,
                &use_case.note,
                &result.source,
                result.date.to_string(),
                i64::from(use_case.source_chunk),
                Utc::now().to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                debug!(id, source = %result.source, "Archived use case");
                Ok(id)
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate(result.source.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a record exists with exactly this source URL or exactly this title
    pub fn contains(&self, url: &str, title: &str) -> Result<bool, StoreError> {
        let title = truncate_chars(title.trim(), TITLE_MAX_CHARS);
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM use_cases WHERE source = ?1 OR (?2 != '' AND title = ?2) LIMIT 1",
                params![url, title],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Look up the record for an article URL
    pub fn get_by_source(&self, url: &str) -> Result<Option<UseCaseResult>, StoreError> {
        let sql = format!("{} WHERE source = ?1", SELECT_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![url], Self::row_to_result)
            .optional()?;
        Ok(row)
    }

    /// Most recent records first
    pub fn list(&self, limit: usize) -> Result<Vec<UseCaseResult>, StoreError> {
        let sql = format!("{} ORDER BY date DESC, id DESC LIMIT ?1", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let results = stmt
            .query_map(params![limit as i64], Self::row_to_result)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(results)
    }

    /// Number of archived records
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM use_cases", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn row_to_result(row: &Row<'_>) -> rusqlite::Result<UseCaseResult> {
        let category: String = row.get(3)?;
        let industry: String = row.get(4)?;
        let date: String = row.get(7)?;
        let source_chunk: i64 = row.get(8)?;

        let use_case = UseCaseCandidate {
            title: row.get(0)?,
            problem: row.get(1)?,
            ai_solution: row.get(2)?,
            category: parse_json_column(3, &category)?,
            industry: parse_json_column(4, &industry)?,
            note: row.get(5)?,
            source_chunk: SourceChunk::try_from(source_chunk)
                .map_err(|e| conversion_error(8, StoreError::InvalidData(e)))?,
        };

        Ok(UseCaseResult {
            use_case,
            source: row.get(6)?,
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| conversion_error(7, StoreError::InvalidData(e.to_string())))?,
        })
    }
}

fn parse_json_column(idx: usize, raw: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| conversion_error(idx, StoreError::InvalidData(e.to_string())))
}

fn conversion_error(idx: usize, err: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

#[async_trait]
impl UseCaseSink for SqliteStore {
    type Error = StoreError;

    async fn publish(&mut self, result: &UseCaseResult) -> Result<(), StoreError> {
        self.insert(result).map(|_| ())
    }
}

#[async_trait]
impl SeenIndex for SqliteStore {
    type Error = StoreError;

    async fn is_seen(&mut self, url: &str, title: &str) -> Result<bool, StoreError> {
        self.contains(url, title)
    }
}
