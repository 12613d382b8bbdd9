//! Conversion of Rust values into bound SQL parameters.
//!
//! Filter, insert and update inputs accept anything implementing [`IntoValue`],
//! so callers can write `[("name", "Bob"), ("age", 30)]`-style mappings without
//! building [`Value`]s by hand.

use rusqlite::types::{Null, Value};

/// A type that can be bound to a positional placeholder.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &Value {
    fn into_value(self) -> Value {
        self.clone()
    }
}

impl IntoValue for Null {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Text(self.clone())
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Integer(self as i64)
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Blob(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Real(self.into())
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

macro_rules! integer_into_value {
    ($($t:ty),*) => {
        $(
            impl IntoValue for $t {
                fn into_value(self) -> Value {
                    Value::Integer(self.into())
                }
            }
        )*
    };
}

integer_into_value!(i8, i16, i32, i64, u8, u16, u32);

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Null,
        }
    }
}

/// Parses a loosely typed literal, as typed on a command line, into a value.
///
/// `null` becomes NULL, integers and reals keep their numeric type and
/// everything else is text. Surrounding double quotes force text.
pub fn parse_literal(raw: &str) -> Value {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Value::Text(raw[1..raw.len() - 1].to_string());
    }
    if raw.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Integer(int);
    }
    if let Ok(real) = raw.parse::<f64>() {
        if real.is_finite() {
            return Value::Real(real);
        }
    }
    Value::Text(raw.to_string())
}

/// Converts a value into its JSON representation.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Real(r) => serde_json::Value::from(*r),
        Value::Text(s) => serde_json::Value::from(s.as_str()),
        Value::Blob(bytes) => serde_json::Value::from(bytes.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_value_conversions() {
        assert_eq!("Bob".into_value(), Value::Text("Bob".into()));
        assert_eq!(30.into_value(), Value::Integer(30));
        assert_eq!(true.into_value(), Value::Integer(1));
        assert_eq!(2.5f64.into_value(), Value::Real(2.5));
        assert_eq!(None::<i64>.into_value(), Value::Null);
        assert_eq!(Some("x").into_value(), Value::Text("x".into()));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("42"), Value::Integer(42));
        assert_eq!(parse_literal("-1.5"), Value::Real(-1.5));
        assert_eq!(parse_literal("NULL"), Value::Null);
        assert_eq!(parse_literal("Bob"), Value::Text("Bob".into()));
        assert_eq!(parse_literal("\"42\""), Value::Text("42".into()));
        assert_eq!(parse_literal("inf"), Value::Text("inf".into()));
    }

    #[test]
    fn test_to_json() {
        assert_eq!(to_json(&Value::Integer(7)), serde_json::json!(7));
        assert_eq!(to_json(&Value::Null), serde_json::Value::Null);
        assert_eq!(to_json(&Value::Text("a".into())), serde_json::json!("a"));
    }
}
