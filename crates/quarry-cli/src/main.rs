use std::{fs, path::PathBuf};

use clap::Parser;
use cli::{Args, Commands};
use error::CliResult;
use logging::setup_logging;
use quarry_config::{
    config::{config_path, Config},
    path::resolve_path,
};
use quarry_db::Database;
use select::{run_select, SelectOptions};
use tracing::debug;

mod cli;
mod config;
mod error;
mod exec;
mod logging;
mod mutate;
mod select;
mod utils;

fn open_database(args: &Args, config: &Config) -> CliResult<Database> {
    let path = match &args.db {
        Some(path) => resolve_path(path)?,
        None => config.get_db_path()?,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    debug!("using database {}", path.display());
    let db = Database::open(&path)?;
    db.set_busy_timeout(config.busy_timeout())?;
    Ok(db)
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        utils::disable_color();
    }

    let config_file: PathBuf = match &args.config {
        Some(path) => resolve_path(path)?,
        None => config_path(),
    };
    let config = Config::load(&config_file)?;

    if let Commands::Config { action } = args.command {
        return config::run_config(action, &config_file, &config);
    }

    let db = open_database(&args, &config)?;

    match args.command {
        Commands::Select {
            table,
            columns,
            filter,
            join,
            join_type,
            on,
            order_by,
            page,
            request,
            per_page,
            first,
            count,
            explain,
        } => run_select(
            &db,
            &config,
            SelectOptions {
                table,
                columns,
                filter,
                join,
                join_type,
                on,
                order_by,
                page,
                request,
                per_page,
                first,
                count,
                explain,
            },
        ),
        Commands::Insert { table, set } => mutate::run_insert(&db, &table, &set),
        Commands::Update {
            table,
            set,
            filter,
            all,
        } => mutate::run_update(&db, &config, &table, &set, &filter, all),
        Commands::Delete { table, filter, all } => {
            mutate::run_delete(&db, &config, &table, &filter, all)
        }
        Commands::Exec { sql, params, fetch } => exec::run_exec(&db, &sql, &params, fetch),
        Commands::Config { .. } => Ok(()),
    }
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
