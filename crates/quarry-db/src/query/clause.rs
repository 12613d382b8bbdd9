//! Clause accumulation.
//!
//! [`Clauses`] holds the pieces of a SELECT under construction and renders them
//! in a fixed order: select list, table, join, join condition, filter, then the
//! ordering fragments.

use rusqlite::types::Value;

use crate::{binder::Bindings, value::IntoValue};

/// How a filter group attaches to the groups before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// One parenthesized predicate block contributed by a single where call.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterGroup {
    /// Column/value pairs joined with `AND`, values bound as parameters.
    Pairs(Bindings),
    /// A predicate inserted verbatim.
    Raw(String),
}

impl FilterGroup {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Pairs(bindings) => bindings.is_empty(),
            Self::Raw(sql) => sql.trim().is_empty(),
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::Pairs(bindings) => bindings.conjunction(),
            Self::Raw(sql) => sql.clone(),
        }
    }

    pub fn params(&self) -> &[Value] {
        match self {
            Self::Pairs(bindings) => bindings.values(),
            Self::Raw(_) => &[],
        }
    }
}

/// The accumulated filter expression: groups folded left to right in call order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpr {
    groups: Vec<(Connector, FilterGroup)>,
}

impl FilterExpr {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn push(&mut self, connector: Connector, group: FilterGroup) {
        self.groups.push((connector, group));
    }

    /// Renders `(a=?) AND (b=?) OR (c=?)`.
    ///
    /// A leading `OR` group keeps its keyword, so an expression started by
    /// `or_where` renders as `OR (c=?)`.
    pub fn render(&self) -> String {
        let mut sql = String::new();
        for (i, (connector, group)) in self.groups.iter().enumerate() {
            match (i, connector) {
                (0, Connector::And) => {}
                (0, Connector::Or) => sql.push_str("OR "),
                (_, connector) => {
                    sql.push(' ');
                    sql.push_str(connector.keyword());
                    sql.push(' ');
                }
            }
            sql.push('(');
            sql.push_str(&group.body());
            sql.push(')');
        }
        sql
    }

    pub fn params(&self) -> Vec<Value> {
        self.groups
            .iter()
            .flat_map(|(_, group)| group.params().iter().cloned())
            .collect()
    }
}

/// Join method, rendered as the keyword in front of `JOIN`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL OUTER",
        }
    }
}

impl From<&str> for JoinKind {
    /// Unknown methods fall back to an inner join.
    fn from(method: &str) -> Self {
        match method.trim().to_ascii_lowercase().as_str() {
            "left" => Self::Left,
            "right" => Self::Right,
            "full" => Self::Full,
            _ => Self::Inner,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl From<&str> for Direction {
    fn from(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

impl From<String> for Direction {
    fn from(direction: String) -> Self {
        Self::from(direction.as_str())
    }
}

/// An ordered list of `column direction` pairs for one `ORDER BY` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordering {
    fields: Vec<(String, Direction)>,
}

impl Ordering {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `name ASC, age DESC`
    pub fn render(&self) -> String {
        self.fields
            .iter()
            .map(|(field, direction)| format!("{} {}", field, direction.keyword()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<&str> for Ordering {
    fn from(field: &str) -> Self {
        Self {
            fields: vec![(field.to_string(), Direction::Asc)],
        }
    }
}

impl From<String> for Ordering {
    fn from(field: String) -> Self {
        Self {
            fields: vec![(field, Direction::Asc)],
        }
    }
}

impl<F: Into<String>, D: Into<Direction>> From<(F, D)> for Ordering {
    fn from((field, direction): (F, D)) -> Self {
        Self {
            fields: vec![(field.into(), direction.into())],
        }
    }
}

impl<F: Into<String>, D: Into<Direction>> From<Vec<(F, D)>> for Ordering {
    fn from(fields: Vec<(F, D)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(field, direction)| (field.into(), direction.into()))
                .collect(),
        }
    }
}

impl<F: Into<String>, D: Into<Direction>, const N: usize> From<[(F, D); N]> for Ordering {
    fn from(fields: [(F, D); N]) -> Self {
        Vec::from(fields).into()
    }
}

/// Argument of `select`: one expression such as `COUNT(id)`, or an ordered
/// list of columns joined with `,`. An empty list selects `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(String);

impl Selection {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_list<S: AsRef<str>>(columns: &[S]) -> Self {
        if columns.is_empty() {
            return Self("*".to_string());
        }
        Self(
            columns
                .iter()
                .map(|column| column.as_ref())
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

impl From<&str> for Selection {
    fn from(expr: &str) -> Self {
        Self(expr.to_string())
    }
}

impl From<String> for Selection {
    fn from(expr: String) -> Self {
        Self(expr)
    }
}

impl<S: AsRef<str>> From<&[S]> for Selection {
    fn from(columns: &[S]) -> Self {
        Self::from_list(columns)
    }
}

impl<S: AsRef<str>> From<Vec<S>> for Selection {
    fn from(columns: Vec<S>) -> Self {
        Self::from_list(&columns)
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for Selection {
    fn from(columns: [S; N]) -> Self {
        Self::from_list(&columns)
    }
}

/// Argument of the where family: a column/value mapping or a raw predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Pairs(Vec<(String, Value)>),
    Raw(String),
}

impl From<&str> for Filter {
    fn from(sql: &str) -> Self {
        Self::Raw(sql.to_string())
    }
}

impl From<String> for Filter {
    fn from(sql: String) -> Self {
        Self::Raw(sql)
    }
}

impl<K: Into<String>, V: IntoValue> From<Vec<(K, V)>> for Filter {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Self::Pairs(
            pairs
                .into_iter()
                .map(|(column, value)| (column.into(), value.into_value()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: IntoValue, const N: usize> From<[(K, V); N]> for Filter {
    fn from(pairs: [(K, V); N]) -> Self {
        Vec::from(pairs).into()
    }
}

/// The clause state of one builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Clauses {
    pub select: String,
    pub filter: FilterExpr,
    pub join: Option<String>,
    pub on: Option<String>,
    pub order_by: Vec<String>,
}

impl Default for Clauses {
    fn default() -> Self {
        Self {
            select: "*".to_string(),
            filter: FilterExpr::default(),
            join: None,
            on: None,
            order_by: Vec::new(),
        }
    }
}

impl Clauses {
    /// Renders the full SELECT for `table`.
    pub fn render(&self, table: &str) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.select, table);

        if let Some(join) = &self.join {
            sql.push(' ');
            sql.push_str(join);
        }

        if let Some(on) = &self.on {
            sql.push(' ');
            sql.push_str(on);
        }

        if !self.filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filter.render());
        }

        for fragment in &self.order_by {
            sql.push_str(fragment);
        }

        sql
    }

    /// Parameters bound by the rendered SELECT, in placeholder order.
    pub fn params(&self) -> Vec<Value> {
        self.filter.params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(p: &[(&str, i64)]) -> FilterGroup {
        FilterGroup::Pairs(Bindings::from_pairs(p.iter().copied()).unwrap())
    }

    #[test]
    fn test_filter_expr_folds_in_call_order() {
        let mut expr = FilterExpr::default();
        expr.push(Connector::And, pairs(&[("a", 1), ("b", 2)]));
        expr.push(Connector::Or, FilterGroup::Raw("c > 3".into()));
        expr.push(Connector::And, pairs(&[("d", 4)]));

        assert_eq!(expr.render(), "(a=? AND b=?) OR (c > 3) AND (d=?)");
        assert_eq!(
            expr.params(),
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(4)]
        );
    }

    #[test]
    fn test_leading_or_group_keeps_keyword() {
        let mut expr = FilterExpr::default();
        expr.push(Connector::Or, pairs(&[("b", 2)]));
        assert_eq!(expr.render(), "OR (b=?)");
    }

    #[test]
    fn test_join_kind_keywords() {
        assert_eq!(JoinKind::from("left").keyword(), "LEFT");
        assert_eq!(JoinKind::from("RIGHT").keyword(), "RIGHT");
        assert_eq!(JoinKind::from("full").keyword(), "FULL OUTER");
        assert_eq!(JoinKind::from("inner").keyword(), "INNER");
        assert_eq!(JoinKind::from("sideways").keyword(), "INNER");
        assert_eq!(JoinKind::default(), JoinKind::Inner);
    }

    #[test]
    fn test_ordering_render() {
        assert_eq!(Ordering::from("name").render(), "name ASC");
        assert_eq!(Ordering::from(("age", "desc")).render(), "age DESC");
        assert_eq!(
            Ordering::from([("a", "DESC"), ("b", "DESC"), ("c", "ASC")]).render(),
            "a DESC, b DESC, c ASC"
        );
    }

    #[test]
    fn test_render_clause_order() {
        let mut clauses = Clauses {
            select: "users.name".into(),
            join: Some("LEFT JOIN orders".into()),
            on: Some("ON users.id=orders.user_id".into()),
            order_by: vec![" ORDER BY users.name ASC".into()],
            ..Default::default()
        };
        clauses.filter.push(Connector::And, pairs(&[("users.id", 1)]));

        assert_eq!(
            clauses.render("users"),
            "SELECT users.name FROM users LEFT JOIN orders ON users.id=orders.user_id \
             WHERE (users.id=?) ORDER BY users.name ASC"
        );
    }

    #[test]
    fn test_selection_inputs() {
        assert_eq!(Selection::from("COUNT(id)").as_str(), "COUNT(id)");
        assert_eq!(Selection::from(["id", "name"]).as_str(), "id,name");
        assert_eq!(Selection::from(Vec::<String>::new()).as_str(), "*");
    }

    #[test]
    fn test_filter_from_inputs() {
        assert_eq!(Filter::from("a = 1"), Filter::Raw("a = 1".into()));
        assert_eq!(
            Filter::from([("id", 1)]),
            Filter::Pairs(vec![("id".into(), Value::Integer(1))])
        );
    }
}
