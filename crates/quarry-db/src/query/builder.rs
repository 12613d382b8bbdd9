//! The fluent query builder.

use std::fmt;

use rusqlite::types::Value;
use tracing::trace;

use crate::{
    binder::{interpolate, Bindings},
    connection::Connection,
    error::Result,
    model::{Model, ModelDescriptor, ModelRegistry},
    query::clause::{Clauses, Connector, Filter, FilterGroup, JoinKind, Ordering, Selection},
};

/// A statement under construction, bound to one table and one connection.
///
/// Every fluent call updates the clause state and re-renders the compiled
/// statement, so [`Query::sql`] always reflects the calls made so far.
/// Clauses render in a fixed order (select list, table, join, join
/// condition, filter, ordering) whatever order the calls were made in.
///
/// # Example
///
/// ```
/// use quarry_db::{Database, JoinKind};
///
/// let db = Database::open_in_memory().unwrap();
/// let query = db
///     .table("users")
///     .select(["users.name", "orders.total"])
///     .where_([("users.active", 1)])
///     .unwrap()
///     .join("orders", JoinKind::Left)
///     .on("users.id=orders.user_id")
///     .order_by(("orders.total", "desc"));
///
/// assert_eq!(
///     query.sql(),
///     "SELECT users.name,orders.total FROM users LEFT JOIN orders \
///      ON users.id=orders.user_id WHERE (users.active=?) ORDER BY orders.total DESC"
/// );
/// ```
#[derive(Clone)]
pub struct Query<'c> {
    pub(crate) conn: &'c dyn Connection,
    pub(crate) table: String,
    pub(crate) model: Option<ModelDescriptor>,
    pub(crate) clauses: Clauses,
    pub(crate) statement: String,
    pub(crate) params: Vec<Value>,
    /// Statement and parameters stored by `query`, until the next fluent call.
    pub(crate) raw: Option<(String, Vec<Value>)>,
    pub(crate) all_rows: bool,
}

impl fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("table", &self.table)
            .field("model", &self.model)
            .field("statement", &self.statement)
            .field("params", &self.params)
            .field("raw", &self.raw.is_some())
            .field("all_rows", &self.all_rows)
            .finish_non_exhaustive()
    }
}

impl<'c> Query<'c> {
    /// Starts a builder on `table`.
    pub fn table(conn: &'c dyn Connection, table: impl Into<String>) -> Self {
        let mut query = Self {
            conn,
            table: table.into(),
            model: None,
            clauses: Clauses::default(),
            statement: String::new(),
            params: Vec::new(),
            raw: None,
            all_rows: false,
        };
        query.rebuild();
        query
    }

    /// Starts a builder holding a raw statement that is not bound to a table.
    ///
    /// Fetching, counting and paginating run on the raw text. Fluent calls
    /// discard it and render against an empty table name.
    pub fn raw(conn: &'c dyn Connection, sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self::table(conn, String::new()).query(sql, params)
    }

    /// Starts a builder on the table declared by `M`.
    pub fn model<M: Model>(conn: &'c dyn Connection) -> Result<Self> {
        let descriptor = ModelDescriptor::of::<M>()?;
        Ok(Self::from_descriptor(conn, descriptor))
    }

    /// Starts a builder on the table of the model registered as `name`.
    pub fn model_named(
        conn: &'c dyn Connection,
        registry: &ModelRegistry,
        name: &str,
    ) -> Result<Self> {
        let descriptor = registry.resolve(name)?.clone();
        Ok(Self::from_descriptor(conn, descriptor))
    }

    fn from_descriptor(conn: &'c dyn Connection, descriptor: ModelDescriptor) -> Self {
        let mut query = Self::table(conn, descriptor.table());
        query.model = Some(descriptor);
        query
    }

    /// Rebinds the builder to the table of `M`, keeping the clause state.
    pub fn set_model<M: Model>(mut self) -> Result<Self> {
        let descriptor = ModelDescriptor::of::<M>()?;
        self.table = descriptor.table().to_string();
        self.model = Some(descriptor);
        self.rebuild();
        Ok(self)
    }

    /// Sets the select list.
    pub fn select(mut self, columns: impl Into<Selection>) -> Self {
        self.clauses.select = columns.into().as_str().to_string();
        self.rebuild();
        self
    }

    /// Adds a filter group joined to earlier groups with `AND`.
    ///
    /// Column/value pairs are ANDed inside the group and their values bound
    /// as parameters. Raw text is inserted verbatim. An empty mapping leaves
    /// the filter untouched.
    ///
    /// # Errors
    ///
    /// [`crate::DbError::InvalidArgument`] if a key is not a column name.
    pub fn where_(self, conditions: impl Into<Filter>) -> Result<Self> {
        self.push_filter(Connector::And, conditions.into())
    }

    /// Adds a filter group joined to earlier groups with `OR`.
    ///
    /// Used on a builder without a filter, this renders `WHERE OR (...)`,
    /// which is not valid SQL.
    pub fn or_where(self, conditions: impl Into<Filter>) -> Result<Self> {
        self.push_filter(Connector::Or, conditions.into())
    }

    /// Adds a verbatim predicate joined with `AND`.
    pub fn where_raw(mut self, predicate: impl Into<String>) -> Self {
        self.push_group(Connector::And, FilterGroup::Raw(predicate.into()));
        self
    }

    /// Adds a verbatim predicate joined with `OR`.
    pub fn or_where_raw(mut self, predicate: impl Into<String>) -> Self {
        self.push_group(Connector::Or, FilterGroup::Raw(predicate.into()));
        self
    }

    fn push_filter(mut self, connector: Connector, filter: Filter) -> Result<Self> {
        let group = match filter {
            Filter::Pairs(pairs) => FilterGroup::Pairs(Bindings::from_pairs(pairs)?),
            Filter::Raw(sql) => FilterGroup::Raw(sql),
        };
        self.push_group(connector, group);
        Ok(self)
    }

    fn push_group(&mut self, connector: Connector, group: FilterGroup) {
        if !group.is_empty() {
            self.clauses.filter.push(connector, group);
        }
        self.rebuild();
    }

    /// Joins `table`. Only one join is kept; a later call replaces it.
    pub fn join(mut self, table: impl Into<String>, kind: impl Into<JoinKind>) -> Self {
        self.clauses.join = Some(format!("{} JOIN {}", kind.into().keyword(), table.into()));
        self.rebuild();
        self
    }

    /// Sets the join condition.
    ///
    /// Without a join this renders `FROM t ON ...`, which is not valid SQL.
    pub fn on(mut self, predicate: impl Into<String>) -> Self {
        self.clauses.on = Some(format!("ON {}", predicate.into()));
        self.rebuild();
        self
    }

    /// Appends an `ORDER BY` fragment.
    ///
    /// Every call adds its own fragment, so calling this twice renders two
    /// `ORDER BY` keywords. Pass all fields in one call instead.
    pub fn order_by(mut self, ordering: impl Into<Ordering>) -> Self {
        let ordering = ordering.into();
        if !ordering.is_empty() {
            self.clauses
                .order_by
                .push(format!(" ORDER BY {}", ordering.render()));
        }
        self.rebuild();
        self
    }

    /// Allows `update` and `delete` to run without a filter.
    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }

    /// The compiled statement, with `?` placeholders.
    pub fn sql(&self) -> &str {
        &self.statement
    }

    /// Parameters of the compiled statement, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// The compiled statement with parameters inlined as escaped literals.
    ///
    /// For display and logging only.
    pub fn interpolated_sql(&self) -> String {
        interpolate(&self.statement, &self.params)
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn model_descriptor(&self) -> Option<&ModelDescriptor> {
        self.model.as_ref()
    }

    pub fn clauses(&self) -> &Clauses {
        &self.clauses
    }

    pub(crate) fn rebuild(&mut self) {
        self.statement = self.clauses.render(&self.table);
        self.params = self.clauses.params();
        self.raw = None;
        trace!("rebuilt statement: {}", self.statement);
    }
}
