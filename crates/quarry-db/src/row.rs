//! Result rows and hydration.

use rusqlite::types::{FromSql, Value, ValueRef};
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{
    error::{DbError, Result},
    value::to_json,
};

/// One fetched record: column names paired with their values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Raw value of the first column called `name`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|column| column == name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Raw value at position `idx`.
    pub fn value_at(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Decodes the column called `name`.
    ///
    /// # Example
    ///
    /// ```
    /// use quarry_db::{Row, Value};
    ///
    /// let row = Row::new(vec!["id".into()], vec![Value::Integer(7)]);
    /// let id: i64 = row.get("id").unwrap();
    /// assert_eq!(id, 7);
    /// ```
    pub fn get<T: FromSql>(&self, name: &str) -> Result<T> {
        let value = self
            .value(name)
            .ok_or_else(|| DbError::MissingColumn(name.to_string()))?;
        decode(name, value)
    }

    /// Decodes the column at position `idx`.
    pub fn get_at<T: FromSql>(&self, idx: usize) -> Result<T> {
        let value = self
            .value_at(idx)
            .ok_or_else(|| DbError::MissingColumn(format!("#{idx}")))?;
        let name = self.columns.get(idx).map(String::as_str).unwrap_or_default();
        decode(name, value)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .iter()
            .map(|(column, value)| (column.to_string(), to_json(value)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

fn decode<T: FromSql>(column: &str, value: &Value) -> Result<T> {
    T::column_result(ValueRef::from(value)).map_err(|source| DbError::Decode {
        column: column.to_string(),
        source,
    })
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &to_json(value))?;
        }
        map.end()
    }
}

/// A type that can be hydrated from a [`Row`].
///
/// # Example
///
/// ```
/// use quarry_db::{FromRow, Row};
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &Row) -> quarry_db::Result<Self> {
///         Ok(User {
///             id: row.get("id")?,
///             name: row.get("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            vec!["id".into(), "name".into(), "score".into()],
            vec![
                Value::Integer(1),
                Value::Text("Alice".into()),
                Value::Null,
            ],
        )
    }

    #[test]
    fn test_get_by_name_and_index() {
        let row = row();
        assert_eq!(row.get::<i64>("id").unwrap(), 1);
        assert_eq!(row.get::<String>("name").unwrap(), "Alice");
        assert_eq!(row.get::<Option<f64>>("score").unwrap(), None);
        assert_eq!(row.get_at::<String>(1).unwrap(), "Alice");
    }

    #[test]
    fn test_missing_and_mistyped_columns() {
        let row = row();
        assert!(matches!(
            row.get::<i64>("email"),
            Err(DbError::MissingColumn(_))
        ));
        assert!(matches!(
            row.get::<i64>("name"),
            Err(DbError::Decode { .. })
        ));
    }

    #[test]
    fn test_short_row_reports_missing_column() {
        let row = Row {
            columns: vec!["id".into(), "name".into()],
            values: vec![Value::Integer(1)],
        };
        assert_eq!(row.value("name"), None);
        assert!(matches!(
            row.get::<String>("name"),
            Err(DbError::MissingColumn(_))
        ));
        assert_eq!(row.get::<i64>("id").unwrap(), 1);
    }

    #[test]
    fn test_serialize_keeps_column_order() {
        let json = serde_json::to_string(&row()).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"Alice","score":null}"#);
    }
}
