use std::cell::{Cell, RefCell};

use rusqlite::types::Value;

use crate::{
    connection::{Connection, Statement},
    error::{DbError, Result},
    row::Row,
};

/// A connection that records every statement instead of running it.
///
/// `fetch` and `fetch_all` return the canned rows; `execute` returns the
/// canned affected-row count. A failing connection rejects every call with
/// [`DbError::Driver`].
#[derive(Default)]
pub struct RecordingConnection {
    executed: RefCell<Vec<(String, Vec<Value>)>>,
    transactions: RefCell<Vec<&'static str>>,
    rows: Vec<Row>,
    affected: Cell<usize>,
    failure: Option<String>,
}

impl RecordingConnection {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn with_affected(affected: usize) -> Self {
        let conn = Self::default();
        conn.affected.set(affected);
        conn
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(DbError::driver(message.clone())),
            None => Ok(()),
        }
    }

    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.executed.borrow().clone()
    }

    pub fn last(&self) -> Option<(String, Vec<Value>)> {
        self.executed.borrow().last().cloned()
    }

    pub fn transactions(&self) -> Vec<&'static str> {
        self.transactions.borrow().clone()
    }

    fn record(&self, sql: &str, params: &[Value]) {
        self.executed
            .borrow_mut()
            .push((sql.to_string(), params.to_vec()));
    }
}

struct RecordingStatement<'a> {
    conn: &'a RecordingConnection,
    sql: String,
}

impl Statement for RecordingStatement<'_> {
    fn execute(&mut self, params: &[Value]) -> Result<usize> {
        self.conn.record(&self.sql, params);
        Ok(self.conn.affected.get())
    }

    fn fetch(&mut self, params: &[Value]) -> Result<Option<Row>> {
        self.conn.record(&self.sql, params);
        Ok(self.conn.rows.first().cloned())
    }

    fn fetch_all(&mut self, params: &[Value]) -> Result<Vec<Row>> {
        self.conn.record(&self.sql, params);
        Ok(self.conn.rows.clone())
    }
}

impl Connection for RecordingConnection {
    fn prepare<'a>(&'a self, sql: &str) -> Result<Box<dyn Statement + 'a>> {
        self.check()?;
        Ok(Box::new(RecordingStatement {
            conn: self,
            sql: sql.to_string(),
        }))
    }

    fn begin_transaction(&self) -> Result<()> {
        self.check()?;
        self.transactions.borrow_mut().push("begin");
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.check()?;
        self.transactions.borrow_mut().push("commit");
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        self.check()?;
        self.transactions.borrow_mut().push("rollback");
        Ok(())
    }
}
