use quarry_config::config::Config;
use quarry_db::{value::to_json, Database, JoinKind, PageRequest, Query};
use serde_json::json;
use tracing::debug;

use crate::{
    cli::FilterArgs,
    error::CliResult,
    utils::{parse_order, parse_pairs, print_json},
};

pub struct SelectOptions {
    pub table: String,
    pub columns: Vec<String>,
    pub filter: FilterArgs,
    pub join: Option<String>,
    pub join_type: String,
    pub on: Option<String>,
    pub order_by: Vec<String>,
    pub page: Option<u32>,
    pub request: Option<String>,
    pub per_page: Option<u32>,
    pub first: bool,
    pub count: bool,
    pub explain: bool,
}

/// Applies the filter flags: `--where` pairs as one AND group, `--or-where`
/// pairs as one OR group, then each `--where-raw` predicate.
pub fn apply_filters<'c>(mut query: Query<'c>, filter: &FilterArgs) -> CliResult<Query<'c>> {
    query = query.where_(parse_pairs(&filter.where_)?)?;
    query = query.or_where(parse_pairs(&filter.or_where)?)?;
    for predicate in &filter.where_raw {
        query = query.where_raw(predicate.as_str());
    }
    Ok(query)
}

pub fn build_select<'c>(db: &'c Database, options: &SelectOptions) -> CliResult<Query<'c>> {
    let mut query = db.table(&options.table).select(options.columns.clone());
    query = apply_filters(query, &options.filter)?;

    if let Some(join) = &options.join {
        query = query.join(join.as_str(), JoinKind::from(options.join_type.as_str()));
    }
    if let Some(on) = &options.on {
        query = query.on(on.as_str());
    }
    if !options.order_by.is_empty() {
        let fields: Vec<(String, String)> =
            options.order_by.iter().map(|raw| parse_order(raw)).collect();
        query = query.order_by(fields);
    }

    Ok(query)
}

fn explain(query: &Query<'_>) -> serde_json::Value {
    json!({
        "sql": query.sql(),
        "params": query.params().iter().map(to_json).collect::<Vec<_>>(),
        "interpolated": query.interpolated_sql(),
    })
}

pub fn run_select(db: &Database, config: &Config, options: SelectOptions) -> CliResult<()> {
    let mut query = build_select(db, &options)?;

    if options.explain {
        return print_json(&explain(&query));
    }

    if options.count {
        let count = query.count()?;
        return print_json(&json!({ "count": count }));
    }

    if options.first {
        let row = query.fetch()?;
        return print_json(&row);
    }

    let paginate = options.page.is_some() || options.request.is_some() || options.per_page.is_some();
    if paginate {
        let request = match (&options.request, options.page) {
            (Some(raw), _) => PageRequest::from_query(raw),
            (None, Some(page)) => PageRequest::new(page),
            (None, None) => PageRequest::default(),
        };
        let per_page = options.per_page.unwrap_or_else(|| config.per_page());
        debug!("paginating page {} by {}", request.page(), per_page);

        let page = query.paginate(per_page, request, config.include_page_meta())?;
        return print_json(&page);
    }

    let rows = query.fetch_all()?;
    print_json(&rows)
}
