//! Model resolution.
//!
//! A model declares the table it lives in through [`Model::TABLE`]. Code that
//! only knows a model by name (configuration, command lines) resolves it
//! through a [`ModelRegistry`].

use std::collections::HashMap;

use crate::{
    binder::is_identifier,
    error::{DbError, Result},
    row::FromRow,
};

/// A type stored in a table.
///
/// Usually implemented with [`crate::define_model!`].
pub trait Model: FromRow {
    /// Table holding rows of this model.
    const TABLE: &'static str;

    /// Short name used for registry lookups and diagnostics.
    fn model_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Name and table of a model, detached from its Rust type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    name: String,
    table: String,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
        }
    }

    /// Descriptor of `M`, validated.
    pub fn of<M: Model>() -> Result<Self> {
        let descriptor = Self::new(M::model_name(), M::TABLE);
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn validate(&self) -> Result<()> {
        if is_identifier(&self.table) {
            Ok(())
        } else {
            Err(DbError::InvalidModel {
                model: self.name.clone(),
                table: self.table.clone(),
            })
        }
    }
}

/// Lookup of model descriptors by name. Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `M` under its [`Model::model_name`].
    pub fn register<M: Model>(&mut self) -> Result<&mut Self> {
        let descriptor = ModelDescriptor::of::<M>()?;
        self.insert(descriptor)
    }

    /// Registers a descriptor built at runtime.
    pub fn insert(&mut self, descriptor: ModelDescriptor) -> Result<&mut Self> {
        descriptor.validate()?;
        self.models
            .insert(descriptor.name.to_ascii_lowercase(), descriptor);
        Ok(self)
    }

    pub fn resolve(&self, name: &str) -> Result<&ModelDescriptor> {
        self.models
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| DbError::UnknownModel(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Registered model names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.values().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;

    struct User;

    impl FromRow for User {
        fn from_row(_: &Row) -> Result<Self> {
            Ok(User)
        }
    }

    impl Model for User {
        const TABLE: &'static str = "users";
    }

    struct Broken;

    impl FromRow for Broken {
        fn from_row(_: &Row) -> Result<Self> {
            Ok(Broken)
        }
    }

    impl Model for Broken {
        const TABLE: &'static str = "users; DROP TABLE users";
    }

    #[test]
    fn test_descriptor_of_model() {
        let descriptor = ModelDescriptor::of::<User>().unwrap();
        assert_eq!(descriptor.name(), "User");
        assert_eq!(descriptor.table(), "users");
    }

    #[test]
    fn test_invalid_table_is_rejected() {
        let err = ModelDescriptor::of::<Broken>().unwrap_err();
        assert!(matches!(err, DbError::InvalidModel { .. }));
    }

    #[test]
    fn test_registry_resolves_case_insensitively() {
        let mut registry = ModelRegistry::new();
        registry.register::<User>().unwrap();
        registry
            .insert(ModelDescriptor::new("Order", "orders"))
            .unwrap();

        assert_eq!(registry.resolve("user").unwrap().table(), "users");
        assert_eq!(registry.resolve("ORDER").unwrap().table(), "orders");
        assert_eq!(registry.names(), vec!["Order", "User"]);
        assert!(matches!(
            registry.resolve("invoice"),
            Err(DbError::UnknownModel(name)) if name == "invoice"
        ));
    }
}
