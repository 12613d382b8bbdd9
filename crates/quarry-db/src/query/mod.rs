//! Query building and execution.

pub mod builder;
pub mod clause;
mod execute;

pub use builder::Query;
pub use clause::{Direction, Filter, JoinKind, Ordering, Selection};
