//! Error types for quarry-db.

use miette::Diagnostic;
use thiserror::Error;

/// Error type for building and executing statements.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(quarry_db::invalid_argument),
        help("Filter and insert keys must be column names such as `name`, `users.id` or `` `order` ``")
    )]
    InvalidArgument(String),

    #[error("Unknown model: {0}")]
    #[diagnostic(
        code(quarry_db::unknown_model),
        help("Register the model in the ModelRegistry before resolving it by name")
    )]
    UnknownModel(String),

    #[error("Model '{model}' declares an invalid table name '{table}'")]
    #[diagnostic(
        code(quarry_db::invalid_model),
        help("A model table must be a plain identifier, optionally schema-qualified")
    )]
    InvalidModel { model: String, table: String },

    #[error("No model is bound to this query")]
    #[diagnostic(
        code(quarry_db::model_undefined),
        help("Create the query with `model::<M>()` or call `set_model::<M>()` first")
    )]
    ModelUndefined,

    #[error("Refusing to run a statement that affects every row: {statement}")]
    #[diagnostic(
        code(quarry_db::unfiltered_mutation),
        help("Add a where clause, or call `all_rows()` to explicitly target the whole table")
    )]
    UnfilteredMutation { statement: String },

    #[error("Failed to decode column '{column}'")]
    #[diagnostic(code(quarry_db::decode))]
    Decode {
        column: String,
        #[source]
        source: rusqlite::types::FromSqlError,
    },

    #[error("Column '{0}' is not present in the row")]
    #[diagnostic(
        code(quarry_db::missing_column),
        help("Check the select list of the query")
    )]
    MissingColumn(String),

    #[error(transparent)]
    #[diagnostic(code(quarry_db::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    #[diagnostic(code(quarry_db::driver))]
    Driver(Box<dyn std::error::Error + Send + Sync>),
}

impl DbError {
    /// Wraps an error raised by a [`crate::Connection`] other than SQLite.
    pub fn driver<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Driver(err.into())
    }
}

/// Result type alias for quarry-db operations.
pub type Result<T> = std::result::Result<T, DbError>;
