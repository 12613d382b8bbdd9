//! Statement execution, mutations, counting and pagination.

use rusqlite::types::Value;
use tracing::{debug, warn};

use crate::{
    binder::{interpolate, Bindings},
    error::{DbError, Result},
    paginate::{PageRequest, Paginated},
    query::builder::Query,
    row::{FromRow, Row},
    value::IntoValue,
};

impl<'c> Query<'c> {
    fn execute_statement(&self, sql: &str, params: &[Value]) -> Result<usize> {
        debug!("executing: {}", interpolate(sql, params));
        let mut stmt = self.conn.prepare(sql)?;
        stmt.execute(params)
    }

    /// Replaces the compiled statement with `sql` when given, then prepares
    /// and runs it.
    ///
    /// Without `sql` the current statement runs, with `params` if any are
    /// given or with its own parameters otherwise. Returns the number of
    /// affected rows.
    pub fn prepare(&mut self, sql: Option<&str>, params: Vec<Value>) -> Result<usize> {
        if let Some(sql) = sql {
            self.statement = sql.to_string();
            self.params = params;
            self.raw = Some((self.statement.clone(), self.params.clone()));
        } else if !params.is_empty() {
            self.params = params;
        }
        self.execute_statement(&self.statement, &self.params)
    }

    /// Stores a raw statement and its parameters for a later
    /// [`fetch`](Self::fetch), [`fetch_all`](Self::fetch_all) or
    /// [`prepare`](Self::prepare).
    ///
    /// [`count`](Self::count) and [`paginate`](Self::paginate) work on this
    /// text too. Any later fluent call re-renders the statement from the
    /// clause state and discards the raw text.
    pub fn query(mut self, sql: impl Into<String>, params: Vec<Value>) -> Self {
        self.statement = sql.into();
        self.params = params;
        self.raw = Some((self.statement.clone(), self.params.clone()));
        self
    }

    /// Runs the compiled statement and returns its first row.
    pub fn fetch(&self) -> Result<Option<Row>> {
        debug!("executing: {}", self.interpolated_sql());
        let mut stmt = self.conn.prepare(&self.statement)?;
        stmt.fetch(&self.params)
    }

    /// Runs the compiled statement and returns every row.
    pub fn fetch_all(&self) -> Result<Vec<Row>> {
        debug!("executing: {}", self.interpolated_sql());
        let mut stmt = self.conn.prepare(&self.statement)?;
        stmt.fetch_all(&self.params)
    }

    /// Runs the compiled statement and hydrates every row into `M`.
    ///
    /// # Errors
    ///
    /// [`DbError::ModelUndefined`] if the builder is not bound to a model.
    pub fn get<M: FromRow>(&self) -> Result<Vec<M>> {
        if self.model.is_none() {
            return Err(DbError::ModelUndefined);
        }
        self.fetch_all()?.iter().map(M::from_row).collect()
    }

    /// Inserts one row built from the ordered `data` pairs.
    ///
    /// Returns the number of inserted rows. The generated key is available
    /// from [`crate::Database::last_insert_id`].
    pub fn insert<I, K, V>(&mut self, data: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        let bindings = Bindings::from_pairs(data)?;
        if bindings.is_empty() {
            return Err(DbError::InvalidArgument(
                "insert requires at least one column".into(),
            ));
        }

        self.statement = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            bindings.column_list(),
            bindings.placeholders()
        );
        self.params = bindings.into_values();
        self.execute_statement(&self.statement, &self.params)
    }

    /// Updates the filtered rows with the ordered `data` pairs.
    ///
    /// # Errors
    ///
    /// [`DbError::UnfilteredMutation`] if no filter is set and
    /// [`all_rows`](Self::all_rows) was not called. Nothing is executed.
    pub fn update<I, K, V>(&mut self, data: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        let bindings = Bindings::from_pairs(data)?;
        if bindings.is_empty() {
            return Err(DbError::InvalidArgument(
                "update requires at least one column".into(),
            ));
        }

        let head = format!("UPDATE {} SET {}", self.table, bindings.set_list());
        self.params = bindings.into_values();
        self.run_mutation(head)
    }

    /// Deletes the filtered rows.
    ///
    /// # Errors
    ///
    /// [`DbError::UnfilteredMutation`] if no filter is set and
    /// [`all_rows`](Self::all_rows) was not called. Nothing is executed.
    pub fn delete(&mut self) -> Result<usize> {
        let head = format!("DELETE FROM {}", self.table);
        self.params = Vec::new();
        self.run_mutation(head)
    }

    fn run_mutation(&mut self, head: String) -> Result<usize> {
        let filter = &self.clauses.filter;

        if filter.is_empty() {
            if !self.all_rows {
                self.statement = format!("{head} WHERE ");
                warn!("refusing unfiltered statement: {}", self.statement);
                return Err(DbError::UnfilteredMutation {
                    statement: self.statement.clone(),
                });
            }
            self.statement = head;
        } else {
            self.statement = format!("{head} WHERE {}", filter.render());
            self.params.extend(filter.params());
        }

        self.execute_statement(&self.statement, &self.params)
    }

    /// The select that counting and pagination work on, with its parameters.
    ///
    /// A raw statement from [`query`](Self::query) is used as written.
    /// Otherwise the clause state is rendered, without `ORDER BY` unless
    /// `ordered` is set.
    fn select_source(&self, ordered: bool) -> (String, Vec<Value>) {
        if let Some((sql, params)) = &self.raw {
            let sql = sql.trim().trim_end_matches(';').trim_end();
            return (sql.to_string(), params.clone());
        }

        if ordered {
            return (self.clauses.render(&self.table), self.clauses.params());
        }
        let mut clauses = self.clauses.clone();
        clauses.order_by.clear();
        (clauses.render(&self.table), clauses.params())
    }

    /// The count statement for the current select.
    ///
    /// The select is wrapped as `SELECT COUNT(*) FROM (<select>)`, so the
    /// count matches the rows [`fetch_all`](Self::fetch_all) returns for any
    /// select list, `DISTINCT` and nullable columns included.
    pub fn count_sql(&self) -> String {
        let (select, _) = self.select_source(false);
        format!("SELECT COUNT(*) FROM ({select})")
    }

    /// Number of rows the current select would return.
    pub fn count(&self) -> Result<u64> {
        let (select, params) = self.select_source(false);
        let sql = format!("SELECT COUNT(*) FROM ({select})");
        debug!("executing: {}", interpolate(&sql, &params));

        let mut stmt = self.conn.prepare(&sql)?;
        let total = match stmt.fetch(&params)? {
            Some(row) => row.get_at::<i64>(0)?,
            None => 0,
        };
        Ok(u64::try_from(total).unwrap_or_default())
    }

    /// Fetches one page of the current select.
    ///
    /// The total is counted on the unlimited statement, then
    /// ` LIMIT <offset>,<per_page>` is appended and the page is fetched.
    /// A raw statement from [`query`](Self::query) is paginated as written.
    ///
    /// # Errors
    ///
    /// [`DbError::InvalidArgument`] if `per_page` is 0.
    pub fn paginate(
        &mut self,
        per_page: u32,
        request: PageRequest,
        include_meta: bool,
    ) -> Result<Paginated<Row>> {
        if per_page == 0 {
            return Err(DbError::InvalidArgument(
                "per_page must be greater than 0".into(),
            ));
        }

        let total = self.count()?;
        let offset = request.offset(per_page);
        let (select, params) = self.select_source(true);

        self.statement = format!("{select} LIMIT {offset},{per_page}");
        self.params = params;

        let rows = self.fetch_all()?;
        Ok(Paginated::new(
            rows,
            per_page,
            request.page(),
            total,
            include_meta,
        ))
    }

    /// Like [`paginate`](Self::paginate), hydrating rows into `M`.
    pub fn paginate_as<M: FromRow>(
        &mut self,
        per_page: u32,
        request: PageRequest,
        include_meta: bool,
    ) -> Result<Paginated<M>> {
        if self.model.is_none() {
            return Err(DbError::ModelUndefined);
        }
        self.paginate(per_page, request, include_meta)?
            .try_map(|row| M::from_row(&row))
    }

    pub fn begin_transaction(&self) -> Result<()> {
        self.conn.begin_transaction()
    }

    pub fn commit(&self) -> Result<()> {
        self.conn.commit()
    }

    pub fn roll_back(&self) -> Result<()> {
        self.conn.rollback()
    }
}
