use quarry_db::{value::parse_literal, Database};
use serde_json::json;

use crate::{error::CliResult, utils::print_json};

/// Runs a raw statement, printing its rows with `fetch` or the affected
/// row count otherwise.
pub fn run_exec(db: &Database, sql: &str, params: &[String], fetch: bool) -> CliResult<()> {
    let params = params.iter().map(|raw| parse_literal(raw)).collect();
    let mut query = db.raw(sql, params);

    if fetch {
        let rows = query.fetch_all()?;
        return print_json(&rows);
    }

    let affected = query.prepare(None, Vec::new())?;
    print_json(&json!({ "affected": affected }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_statements() {
        let db = Database::open_in_memory().unwrap();
        run_exec(&db, "CREATE TABLE kv (k TEXT, v INTEGER)", &[], false).unwrap();
        run_exec(
            &db,
            "INSERT INTO kv (k, v) VALUES (?, ?)",
            &["a".into(), "1".into()],
            false,
        )
        .unwrap();
        run_exec(&db, "SELECT * FROM kv", &[], true).unwrap();

        let total = db.table("kv").where_([("v", 1)]).unwrap().count().unwrap();
        assert_eq!(total, 1);
    }
}
