//! Parameter binding.
//!
//! Turns ordered column→value mappings into placeholder lists and ordered
//! parameter sequences, and renders statements with their parameters
//! interpolated as escaped literals for display.

use std::sync::LazyLock;

use regex::Regex;
use rusqlite::types::Value;

use crate::{
    error::{DbError, Result},
    value::IntoValue,
};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z_][A-Za-z0-9_]*\.)?(?:[A-Za-z_][A-Za-z0-9_]*|`[^`]+`)$")
        .expect("identifier pattern is valid")
});

/// Returns true if `name` can be used as a column or table identifier.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// An ordered set of column/value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Bindings {
    /// Builds bindings from `(column, value)` pairs, keeping their order.
    ///
    /// Every column must be an identifier; anything else is rejected rather
    /// than spliced into SQL text.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoValue,
    {
        let mut bindings = Self::default();
        for (column, value) in pairs {
            bindings.push(column.into(), value.into_value())?;
        }
        Ok(bindings)
    }

    pub fn push(&mut self, column: String, value: Value) -> Result<()> {
        if !is_identifier(&column) {
            return Err(DbError::InvalidArgument(format!(
                "'{column}' is not a valid column name"
            )));
        }
        self.columns.push(column);
        self.values.push(value);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// `k1,k2,k3`
    pub fn column_list(&self) -> String {
        self.columns.join(",")
    }

    /// `?,?,?` with one placeholder per column.
    pub fn placeholders(&self) -> String {
        placeholders(self.len())
    }

    /// `k1=?,k2=?` as used by `UPDATE ... SET`.
    pub fn set_list(&self) -> String {
        self.columns
            .iter()
            .map(|column| format!("{column}=?"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `k1=? AND k2=?` as used inside a filter group.
    pub fn conjunction(&self) -> String {
        self.columns
            .iter()
            .map(|column| format!("{column}=?"))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// Comma separated list of `count` positional placeholders.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

/// Escapes quote characters and backslashes by prefixing them with a backslash.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\'' | '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\0' => escaped.push_str("\\0"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders a value as an inline SQL literal.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => format!("\"{i}\""),
        Value::Real(r) => format!("\"{r}\""),
        Value::Text(s) => format!("\"{}\"", escape(s)),
        Value::Blob(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
            format!("X'{hex}'")
        }
    }
}

/// Replaces each `?` placeholder in `sql`, left to right, with the matching
/// parameter rendered as a literal.
///
/// Placeholders inside quoted strings or backtick identifiers are left alone.
/// Surplus placeholders stay as `?`.
pub fn interpolate(sql: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(sql.len() + params.len() * 4);
    let mut params = params.iter();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in sql.chars() {
        match quote {
            Some(q) => {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    out.push(c);
                }
                '?' => match params.next() {
                    Some(value) => out.push_str(&literal(value)),
                    None => out.push('?'),
                },
                _ => out.push(c),
            },
        }
    }

    out
}
