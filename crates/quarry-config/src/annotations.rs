use std::any::type_name;

use documented::{Documented, DocumentedFields};
use toml_edit::{Decor, Item, RawString, Table};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Appends each line of `docs` as a `#` comment to the prefix of `decor`.
///
/// An existing prefix is kept, separated from the new comments by an empty
/// comment line unless it already ends on a blank line.
pub fn append_docs_as_toml_comments(decor: &mut Decor, docs: &str) {
    let comments: String = docs
        .lines()
        .map(|line| {
            if line.is_empty() {
                "#\n".to_string()
            } else {
                format!("# {line}\n")
            }
        })
        .collect();

    let old_prefix = decor.prefix().and_then(RawString::as_str).unwrap_or("");
    let new_prefix = match old_prefix.lines().last() {
        None => comments,
        Some("") => format!("{old_prefix}{comments}"),
        Some(_) => format!("{old_prefix}#\n{comments}"),
    };
    decor.set_prefix(new_prefix);
}

/// Writes the field docs of `T` above the matching keys of `table`.
///
/// The container docs of `T` are added above the table itself unless it is
/// the document root.
pub fn annotate_toml_table<T>(table: &mut Table, is_root: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if !is_root {
        append_docs_as_toml_comments(table.decor_mut(), T::DOCS);
    }

    for (mut key, item) in table.iter_mut() {
        let name = key.get().to_string();
        let Ok(docs) = T::get_field_docs(&name) else {
            warn!(
                "Field '{}' has no documentation in '{}'",
                name,
                type_name::<T>()
            );
            continue;
        };

        match item {
            Item::None => return Err(ConfigError::UnexpectedTomlItem(name)),
            Item::Value(_) => append_docs_as_toml_comments(key.leaf_decor_mut(), docs),
            Item::Table(sub_table) => append_docs_as_toml_comments(sub_table.decor_mut(), docs),
            Item::ArrayOfTables(array) => {
                if let Some(first) = array.iter_mut().next() {
                    append_docs_as_toml_comments(first.decor_mut(), docs);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use toml_edit::Decor;

    use super::*;
    use crate::config::Config;

    fn prefix(decor: &Decor) -> String {
        decor
            .prefix()
            .and_then(|p| p.as_str())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_append_docs_multiline() {
        let mut decor = Decor::new("", "");
        append_docs_as_toml_comments(&mut decor, "Line 1\n\nLine 2");
        assert_eq!(prefix(&decor), "# Line 1\n#\n# Line 2\n");
    }

    #[test]
    fn test_append_docs_after_existing_prefix() {
        let mut decor = Decor::new("# existing\n", "");
        append_docs_as_toml_comments(&mut decor, "New");
        assert_eq!(prefix(&decor), "# existing\n#\n# New\n");
    }

    #[test]
    #[serial]
    fn test_annotated_document_has_field_docs() {
        let doc = Config::default_config().to_annotated_document().unwrap();
        let text = doc.to_string();
        assert!(text.contains("# Rows per page"));
        assert!(text.contains("per_page = 15"));
    }
}
