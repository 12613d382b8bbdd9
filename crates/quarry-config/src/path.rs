//! Path resolution for configured locations.

use std::{env, iter::Peekable, path::PathBuf, str::Chars};

use crate::error::{ConfigError, Result};

/// Resolves a configured path.
///
/// A leading `~` expands to the home directory and `$VAR` or `${VAR}`
/// expand to environment variables. Relative results are joined onto the
/// current directory.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(ConfigError::EmptyPath);
    }

    let resolved = PathBuf::from(expand_variables(path)?);
    if resolved.is_absolute() {
        Ok(resolved)
    } else {
        Ok(env::current_dir()?.join(resolved))
    }
}

pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
}

pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

pub fn xdg_data_home() -> PathBuf {
    env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

fn expand_variables(path: &str) -> Result<String> {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let name = consume_until(&mut chars, '}')?;
                expand_env_var(&name, &mut result, path)?;
            }
            '$' => {
                let name = consume_var_name(&mut chars);
                if name.is_empty() {
                    result.push('$');
                } else {
                    expand_env_var(&name, &mut result, path)?;
                }
            }
            '~' if result.is_empty() => result.push_str(&home_dir().to_string_lossy()),
            _ => result.push(c),
        }
    }

    Ok(result)
}

fn consume_until(chars: &mut Peekable<Chars>, delimiter: char) -> Result<String> {
    let mut name = String::new();
    for c in chars.by_ref() {
        if c == delimiter {
            return Ok(name);
        }
        name.push(c);
    }
    Err(ConfigError::UnclosedVariable {
        input: format!("${{{name}"),
    })
}

fn consume_var_name(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    while let Some(c) = chars.next_if(|c| c.is_alphanumeric() || *c == '_') {
        name.push(c);
    }
    name
}

fn expand_env_var(name: &str, result: &mut String, original: &str) -> Result<()> {
    let value = match name {
        "HOME" => home_dir().to_string_lossy().into_owned(),
        "XDG_CONFIG_HOME" => xdg_config_home().to_string_lossy().into_owned(),
        "XDG_DATA_HOME" => xdg_data_home().to_string_lossy().into_owned(),
        _ => env::var(name).map_err(|_| ConfigError::MissingEnvVar {
            var: name.into(),
            input: original.into(),
        })?,
    };
    result.push_str(&value);
    Ok(())
}
