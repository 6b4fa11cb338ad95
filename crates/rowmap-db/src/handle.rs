//! The shared database handle and its storage primitives.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rowmap_types::{FieldValue, RowValues};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use thiserror::Error;

use crate::sql;

/// Runtime tunables for the SQLite connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// Busy timeout for the connection, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
        }
    }
}

/// Errors raised by the database handle.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database file could not be opened or configured.
    #[error("failed to open database at '{path}': {source}")]
    Open {
        /// The path that was opened.
        path: String,
        /// The underlying SQLite error.
        source: rusqlite::Error,
    },

    /// SQLite refused WAL journaling.
    #[error("failed to set WAL journal mode, got: {0}")]
    JournalMode(String),

    /// The handle has been closed.
    #[error("database handle is closed")]
    Closed,

    /// Closing the connection failed; the handle stays open.
    #[error("failed to close database: {0}")]
    Close(rusqlite::Error),

    /// A statement failed.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A single connection to an embedded SQLite database.
///
/// Every primitive locks the connection for its duration. Share the handle
/// between mappers with an `Arc`; mappers never close it.
#[derive(Debug)]
pub struct Database {
    path: String,
    conn: Mutex<Option<Connection>>,
}

impl Database {
    /// Opens (creating if needed) the database at `path`.
    ///
    /// Use `:memory:` for an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Open` if the file cannot be opened or the
    /// connection pragmas fail, and `DbError::JournalMode` if SQLite will
    /// not switch to WAL.
    pub fn open(path: &str, settings: DbRuntimeSettings) -> Result<Self, DbError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

        let open_err = |source: rusqlite::Error| DbError::Open {
            path: path.to_string(),
            source,
        };

        let conn = Connection::open_with_flags(path, flags).map_err(open_err)?;

        // In-memory databases report "memory", which is expected.
        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(open_err)?;
        if journal_mode != "wal" && journal_mode != "memory" {
            return Err(DbError::JournalMode(journal_mode));
        }

        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = {};",
            settings.busy_timeout_ms
        ))
        .map_err(open_err)?;

        tracing::info!(path, journal_mode = %journal_mode, "opened database");

        Ok(Self {
            path: path.to_string(),
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Opens a private in-memory database with default settings.
    ///
    /// # Errors
    ///
    /// See [`Database::open`].
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::open(":memory:", DbRuntimeSettings::default())
    }

    /// The path this handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the connection is still open.
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Closes the connection. Closing an already closed handle is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Close` if SQLite refuses to close; the handle then
    /// remains open.
    pub fn close(&self) -> Result<(), DbError> {
        let mut guard = self.lock();
        let Some(conn) = guard.take() else {
            return Ok(());
        };
        match conn.close() {
            Ok(()) => {
                tracing::info!(path = %self.path, "closed database");
                Ok(())
            }
            Err((conn, e)) => {
                *guard = Some(conn);
                Err(DbError::Close(e))
            }
        }
    }

    /// Executes one or more SQL statements, discarding any rows.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Closed` if the handle is closed, `DbError::Sqlite`
    /// if a statement fails.
    pub fn execute(&self, sql: &str) -> Result<(), DbError> {
        self.with_conn(|conn| conn.execute_batch(sql))
    }

    /// Returns the column names of `table` in declaration order.
    ///
    /// This is a zero-row query: it succeeds on an empty table and fails if
    /// the table does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Sqlite` if the table cannot be read.
    pub fn column_names(&self, table: &str) -> Result<Vec<String>, DbError> {
        let probe = sql::probe_statement(table);
        self.with_conn(|conn| {
            let stmt = conn.prepare(&probe)?;
            let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            Ok(names)
        })
    }

    /// Runs a query and returns every row as a column/value mapping.
    ///
    /// `NULL` columns are absent from the returned mappings.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Sqlite` if the query fails.
    pub fn query(&self, sql: &str, params: &[FieldValue]) -> Result<Vec<RowValues>, DbError> {
        let bound: Vec<rusqlite::types::Value> = params.iter().map(sql::to_sql).collect();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

            let mut rows = stmt.query(params_from_iter(bound))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = RowValues::new();
                for (i, name) in columns.iter().enumerate() {
                    if let Some(value) = sql::from_sql(row.get_ref(i)?) {
                        values.insert(name.clone(), value);
                    }
                }
                out.push(values);
            }
            Ok(out)
        })
    }

    /// Inserts one row into `table` and returns its row id.
    ///
    /// An empty mapping inserts a row of column defaults.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Sqlite` on failure, including constraint
    /// violations.
    pub fn insert(&self, table: &str, values: &RowValues) -> Result<i64, DbError> {
        let (stmt, params) = sql::insert_statement(table, values);
        self.with_conn(|conn| {
            conn.execute(&stmt, params_from_iter(params))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Sets `set` on every row of `table` matching all of `criteria` and
    /// returns the number of rows changed.
    ///
    /// An empty `set` changes nothing and returns 0 without touching the
    /// database. An empty `criteria` matches every row.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Sqlite` on failure.
    pub fn update(
        &self,
        table: &str,
        set: &RowValues,
        criteria: &RowValues,
    ) -> Result<usize, DbError> {
        if set.is_empty() {
            return Ok(0);
        }
        let (stmt, params) = sql::update_statement(table, set, criteria);
        self.with_conn(|conn| conn.execute(&stmt, params_from_iter(params)))
    }

    fn with_conn<R>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<R>,
    ) -> Result<R, DbError> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(DbError::Closed)?;
        Ok(f(conn)?)
    }

    // A panic while holding the lock cannot leave the connection in a state
    // later callers would misread, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_applies_settings() {
        let db = Database::open(
            ":memory:",
            DbRuntimeSettings {
                busy_timeout_ms: 2_500,
            },
        )
        .expect("should open in-memory db");

        let rows = db
            .query("PRAGMA busy_timeout;", &[])
            .expect("should query busy_timeout");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].values().next(),
            Some(&FieldValue::Integer(2_500)),
            "busy timeout should match settings"
        );

        let rows = db
            .query("PRAGMA foreign_keys;", &[])
            .expect("should query foreign_keys");
        assert_eq!(rows[0].values().next(), Some(&FieldValue::Integer(1)));
    }

    #[test]
    fn close_is_idempotent_and_blocks_primitives() {
        let db = Database::open_in_memory().expect("should open in-memory db");
        assert!(db.is_open());

        db.close().expect("first close should succeed");
        db.close().expect("second close should be a no-op");
        assert!(!db.is_open());

        let err = db.execute("SELECT 1").expect_err("closed handle should fail");
        assert!(matches!(err, DbError::Closed));
    }

    #[test]
    fn probe_reads_columns_of_empty_table() {
        let db = Database::open_in_memory().expect("should open in-memory db");
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, age TEXT);")
            .expect("should create table");

        let columns = db.column_names("t").expect("probe should succeed");
        assert_eq!(columns, vec!["id", "name", "age"]);
    }

    #[test]
    fn probe_fails_for_missing_table() {
        let db = Database::open_in_memory().expect("should open in-memory db");
        let err = db
            .column_names("missing")
            .expect_err("probe of missing table should fail");
        assert!(matches!(err, DbError::Sqlite(_)));
    }
}
