use quarry_config::config::Config;
use quarry_db::{Database, Query};
use serde_json::json;
use tracing::info;

use crate::{
    cli::FilterArgs,
    error::CliResult,
    select::apply_filters,
    utils::{parse_pairs, print_json},
};

fn guarded<'c>(query: Query<'c>, all: bool, config: &Config) -> Query<'c> {
    if all || config.allow_unfiltered_mutations() {
        query.all_rows()
    } else {
        query
    }
}

pub fn run_insert(db: &Database, table: &str, set: &[String]) -> CliResult<()> {
    let data = parse_pairs(set)?;
    let affected = db.table(table).insert(data)?;
    let id = db.last_insert_id();
    info!("Inserted {} row(s) into {}", affected, table);
    print_json(&json!({ "affected": affected, "last_insert_id": id }))
}

pub fn run_update(
    db: &Database,
    config: &Config,
    table: &str,
    set: &[String],
    filter: &FilterArgs,
    all: bool,
) -> CliResult<()> {
    let data = parse_pairs(set)?;
    let query = apply_filters(db.table(table), filter)?;
    let affected = guarded(query, all, config).update(data)?;
    info!("Updated {} row(s) in {}", affected, table);
    print_json(&json!({ "affected": affected }))
}

pub fn run_delete(
    db: &Database,
    config: &Config,
    table: &str,
    filter: &FilterArgs,
    all: bool,
) -> CliResult<()> {
    let query = apply_filters(db.table(table), filter)?;
    let affected = guarded(query, all, config).delete()?;
    info!("Deleted {} row(s) from {}", affected, table);
    print_json(&json!({ "affected": affected }))
}

#[cfg(test)]
mod tests {
    use quarry_db::DbError;

    use super::*;
    use crate::error::CliError;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER);
             INSERT INTO users (name, age) VALUES ('a', 20), ('b', 30), ('c', 40);",
        )
        .unwrap();
        db
    }

    fn count(db: &Database) -> u64 {
        db.table("users").count().unwrap()
    }

    #[test]
    fn test_insert_from_flags() {
        let db = setup();
        run_insert(&db, "users", &["name=d".into(), "age=50".into()]).unwrap();
        assert_eq!(count(&db), 4);
        assert_eq!(db.last_insert_id(), 4);
    }

    #[test]
    fn test_delete_requires_filter_or_all() {
        let db = setup();
        let config = Config::default_config();

        let err = run_delete(&db, &config, "users", &FilterArgs::default(), false).unwrap_err();
        assert!(matches!(
            err,
            CliError::Db(DbError::UnfilteredMutation { .. })
        ));
        assert_eq!(count(&db), 3);

        let filter = FilterArgs {
            where_raw: vec!["age >= 30".into()],
            ..Default::default()
        };
        run_delete(&db, &config, "users", &filter, false).unwrap();
        assert_eq!(count(&db), 1);

        run_delete(&db, &config, "users", &FilterArgs::default(), true).unwrap();
        assert_eq!(count(&db), 0);
    }

    #[test]
    fn test_config_can_allow_unfiltered_update() {
        let db = setup();
        let config = Config {
            allow_unfiltered_mutations: Some(true),
            ..Config::default_config()
        };

        run_update(&db, &config, "users", &["age=1".into()], &FilterArgs::default(), false)
            .unwrap();
        let rows = db.table("users").where_([("age", 1)]).unwrap().count().unwrap();
        assert_eq!(rows, 3);
    }
}
