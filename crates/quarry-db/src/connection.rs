//! Database connections.
//!
//! The builder talks to the database through the [`Connection`] and
//! [`Statement`] traits. [`Database`] is the SQLite binding shipped with the
//! crate; `rusqlite::Connection` implements the traits directly as well.

use std::{path::Path, time::Duration};

use rusqlite::{types::Value, ToSql};
use tracing::{debug, trace};

use crate::{
    error::Result,
    model::{Model, ModelRegistry},
    query::Query,
    row::Row,
};

/// A prepared statement.
pub trait Statement {
    /// Runs the statement and returns the number of affected rows.
    fn execute(&mut self, params: &[Value]) -> Result<usize>;

    /// Runs the statement and returns its first row.
    fn fetch(&mut self, params: &[Value]) -> Result<Option<Row>>;

    /// Runs the statement and returns every row.
    fn fetch_all(&mut self, params: &[Value]) -> Result<Vec<Row>>;
}

/// A relational connection the builder can run statements on.
pub trait Connection {
    fn prepare<'a>(&'a self, sql: &str) -> Result<Box<dyn Statement + 'a>>;

    fn begin_transaction(&self) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;
}

struct SqliteStatement<'conn> {
    stmt: rusqlite::Statement<'conn>,
    columns: Vec<String>,
}

impl<'conn> SqliteStatement<'conn> {
    fn new(stmt: rusqlite::Statement<'conn>) -> Self {
        let columns = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        Self { stmt, columns }
    }
}

fn as_sql(params: &[Value]) -> Vec<&dyn ToSql> {
    params.iter().map(|v| v as &dyn ToSql).collect()
}

fn read_values(row: &rusqlite::Row<'_>, count: usize) -> rusqlite::Result<Vec<Value>> {
    (0..count).map(|idx| row.get::<_, Value>(idx)).collect()
}

impl Statement for SqliteStatement<'_> {
    fn execute(&mut self, params: &[Value]) -> Result<usize> {
        let params_ref = as_sql(params);

        // Statements producing rows are stepped to completion instead.
        if self.stmt.column_count() > 0 {
            let mut rows = self.stmt.query(params_ref.as_slice())?;
            while rows.next()?.is_some() {}
            return Ok(0);
        }

        Ok(self.stmt.execute(params_ref.as_slice())?)
    }

    fn fetch(&mut self, params: &[Value]) -> Result<Option<Row>> {
        let params_ref = as_sql(params);
        let count = self.columns.len();
        let mut rows = self.stmt.query(params_ref.as_slice())?;
        let values = match rows.next()? {
            Some(row) => read_values(row, count)?,
            None => return Ok(None),
        };
        Ok(Some(Row::new(self.columns.clone(), values)))
    }

    fn fetch_all(&mut self, params: &[Value]) -> Result<Vec<Row>> {
        let params_ref = as_sql(params);
        let count = self.columns.len();
        let mut raw = Vec::new();
        {
            let mut rows = self.stmt.query(params_ref.as_slice())?;
            while let Some(row) = rows.next()? {
                raw.push(read_values(row, count)?);
            }
        }
        Ok(raw
            .into_iter()
            .map(|values| Row::new(self.columns.clone(), values))
            .collect())
    }
}

impl Connection for rusqlite::Connection {
    fn prepare<'a>(&'a self, sql: &str) -> Result<Box<dyn Statement + 'a>> {
        let stmt = rusqlite::Connection::prepare(self, sql)?;
        Ok(Box::new(SqliteStatement::new(stmt)))
    }

    fn begin_transaction(&self) -> Result<()> {
        trace!("BEGIN");
        Ok(self.execute_batch("BEGIN")?)
    }

    fn commit(&self) -> Result<()> {
        trace!("COMMIT");
        Ok(self.execute_batch("COMMIT")?)
    }

    fn rollback(&self) -> Result<()> {
        trace!("ROLLBACK");
        Ok(self.execute_batch("ROLLBACK")?)
    }
}

/// A SQLite database.
///
/// # Example
///
/// ```
/// use quarry_db::Database;
///
/// let db = Database::open_in_memory().unwrap();
/// db.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
///     .unwrap();
///
/// db.table("users").insert([("name", "Alice")]).unwrap();
/// let total = db.table("users").count().unwrap();
/// assert_eq!(total, 1);
/// ```
pub struct Database {
    conn: rusqlite::Connection,
}

impl Database {
    /// Opens (or creates) the database file at `path` in WAL mode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening database at {}", path.display());
        let conn = rusqlite::Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: rusqlite::Connection::open_in_memory()?,
        })
    }

    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Sets how long a statement waits on a locked database before failing.
    pub fn set_busy_timeout(&self, timeout: Duration) -> Result<()> {
        Ok(self.conn.busy_timeout(timeout)?)
    }

    pub fn conn(&self) -> &rusqlite::Connection {
        &self.conn
    }

    /// Starts a builder on `table`.
    pub fn table(&self, table: &str) -> Query<'_> {
        Query::table(self, table)
    }

    /// Starts a builder on the table of `M`.
    pub fn model<M: Model>(&self) -> Result<Query<'_>> {
        Query::model::<M>(self)
    }

    /// Starts a builder on the table registered under `name`.
    pub fn model_named(&self, registry: &ModelRegistry, name: &str) -> Result<Query<'_>> {
        Query::model_named(self, registry, name)
    }

    /// Starts a builder holding a raw statement.
    pub fn raw(&self, sql: impl Into<String>, params: Vec<Value>) -> Query<'_> {
        Query::raw(self, sql, params)
    }

    /// Runs a batch of semicolon separated statements without parameters.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        debug!("executing batch: {}", sql);
        Ok(self.conn.execute_batch(sql)?)
    }

    /// Row id of the most recent successful insert.
    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Runs `f` inside a transaction.
    ///
    /// The transaction is committed when `f` returns `Ok` and rolled back
    /// when it returns `Err`.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.begin_transaction()?;
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                self.rollback()?;
                Err(err)
            }
        }
    }
}

impl Connection for Database {
    fn prepare<'a>(&'a self, sql: &str) -> Result<Box<dyn Statement + 'a>> {
        Connection::prepare(&self.conn, sql)
    }

    fn begin_transaction(&self) -> Result<()> {
        self.conn.begin_transaction()
    }

    fn commit(&self) -> Result<()> {
        Connection::commit(&self.conn)
    }

    fn rollback(&self) -> Result<()> {
        Connection::rollback(&self.conn)
    }
}
