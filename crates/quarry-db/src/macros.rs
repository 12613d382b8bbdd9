//! Macros for declaring models and value mappings.

/// Implements [`crate::Model`] for a type and declares its column names.
///
/// # Syntax
///
/// ```ignore
/// define_model!(
///     User {
///         table: "users",
///         columns: {
///             ID => "id",
///             NAME => "name"
///         }
///     }
/// );
/// ```
///
/// This expands to:
///
/// ```ignore
/// impl quarry_db::Model for User {
///     const TABLE: &'static str = "users";
/// }
///
/// impl User {
///     pub const ID: &'static str = "id";
///     pub const NAME: &'static str = "name";
/// }
/// ```
///
/// The type must also implement [`crate::FromRow`].
#[macro_export]
macro_rules! define_model {
    (
        $model:ident {
            table: $table:literal,
            columns: {
                $($col_name:ident => $db_col:literal),* $(,)?
            }
        }
    ) => {
        impl $crate::Model for $model {
            const TABLE: &'static str = $table;
        }

        #[allow(dead_code)]
        impl $model {
            $(
                pub const $col_name: &'static str = $db_col;
            )*
        }
    };
}

/// Builds an ordered `Vec<(String, Value)>` from `column => value` pairs.
///
/// Values of different types can be mixed, which plain arrays of tuples
/// cannot do.
///
/// ```
/// use quarry_db::{values, Value};
///
/// let data = values! { "name" => "Bob", "age" => 30 };
/// assert_eq!(data[1], ("age".to_string(), Value::Integer(30)));
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<(::std::string::String, $crate::Value)>::new()
    };
    ($($col:expr => $val:expr),+ $(,)?) => {
        ::std::vec![
            $((
                ::std::string::String::from($col),
                $crate::value::IntoValue::into_value($val),
            )),+
        ]
    };
}
