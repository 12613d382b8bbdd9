use std::{
    fmt::Display,
    sync::atomic::{AtomicBool, Ordering},
};

use nu_ansi_term::Color;
use quarry_db::{value::parse_literal, Value};
use serde::Serialize;

use crate::error::{CliError, CliResult};

static COLOR: AtomicBool = AtomicBool::new(true);

pub fn disable_color() {
    COLOR.store(false, Ordering::Relaxed);
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if COLOR.load(Ordering::Relaxed) {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Splits `column=value` and parses the value as a literal.
pub fn parse_pair(raw: &str) -> CliResult<(String, Value)> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), parse_literal(value)))
        }
        _ => Err(CliError::InvalidPair(raw.to_string())),
    }
}

pub fn parse_pairs(raw: &[String]) -> CliResult<Vec<(String, Value)>> {
    raw.iter().map(|pair| parse_pair(pair)).collect()
}

/// Splits `column` or `column:direction`.
pub fn parse_order(raw: &str) -> (String, String) {
    match raw.rsplit_once(':') {
        Some((column, direction)) => (column.to_string(), direction.to_string()),
        None => (raw.to_string(), "asc".to_string()),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("age=30").unwrap(),
            ("age".to_string(), Value::Integer(30))
        );
        assert_eq!(
            parse_pair("note=a=b").unwrap(),
            ("note".to_string(), Value::Text("a=b".into()))
        );
        assert_eq!(
            parse_pair("city=").unwrap(),
            ("city".to_string(), Value::Text(String::new()))
        );
        assert!(matches!(parse_pair("age"), Err(CliError::InvalidPair(_))));
        assert!(matches!(parse_pair("=3"), Err(CliError::InvalidPair(_))));
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order("name"), ("name".into(), "asc".into()));
        assert_eq!(parse_order("age:desc"), ("age".into(), "desc".into()));
    }

    #[test]
    fn test_colored_respects_flag() {
        disable_color();
        assert_eq!(Colored(Color::Red, "x").to_string(), "x");
    }
}
