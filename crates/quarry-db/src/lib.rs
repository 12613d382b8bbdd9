//! A fluent SQL statement builder with a SQLite execution layer.
//!
//! A [`Query`] accumulates a select list, filter groups, a join, and ordering
//! across chained calls, and re-renders one SQL statement with `?`
//! placeholders after each call. Execution methods bind the parameters and
//! run the statement on a [`Connection`].
//!
//! # Example
//!
//! ```
//! use quarry_db::{values, Database, PageRequest};
//!
//! let db = Database::open_in_memory().unwrap();
//! db.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")
//!     .unwrap();
//!
//! db.table("users")
//!     .insert(values! { "name" => "Alice", "age" => 30 })
//!     .unwrap();
//!
//! let adults = db
//!     .table("users")
//!     .where_raw("age >= 18")
//!     .order_by(("name", "asc"))
//!     .paginate(15, PageRequest::from_query("page=1"), true)
//!     .unwrap();
//!
//! assert_eq!(adults.total, 1);
//! ```

pub mod binder;
pub mod connection;
pub mod error;
pub mod macros;
pub mod model;
pub mod paginate;
pub mod query;
pub mod row;
pub mod value;

#[cfg(test)]
mod test_utils;

pub use connection::{Connection, Database, Statement};
pub use error::{DbError, Result};
pub use model::{Model, ModelDescriptor, ModelRegistry};
pub use paginate::{PageMeta, PageRequest, Paginated};
pub use query::{Direction, Filter, JoinKind, Ordering, Query, Selection};
pub use row::{FromRow, Row};
pub use rusqlite::types::Value;
pub use value::IntoValue;
