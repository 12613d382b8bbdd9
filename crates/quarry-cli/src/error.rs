use miette::Diagnostic;
use quarry_config::error::ConfigError;
use quarry_db::DbError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid pair '{0}'")]
    #[diagnostic(
        code(quarry_cli::invalid_pair),
        help("Pass pairs as column=value, for example --where id=3")
    )]
    InvalidPair(String),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(quarry_cli::json))]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(quarry_cli::io))]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
