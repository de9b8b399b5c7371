//! Provider trait and the schema registry
//!
//! Schemas are checked once when registered and shared read-only afterwards.

use crate::context::Context;
use crate::data_source::DataSource;
use crate::error::{Result, TfplugError};
use crate::resource::Resource;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Prefix of every resource type name (e.g., "castai")
    fn type_name(&self) -> &str;

    /// Schema of the provider configuration block
    fn schema(&self) -> Arc<Schema>;

    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    fn resource_schemas(&self) -> &SchemaRegistry;

    fn data_source_schemas(&self) -> &SchemaRegistry;

    /// Fails with ProviderNotConfigured before configure succeeded
    async fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>>;

    async fn create_data_source(&self, name: &str) -> Result<Box<dyn DataSource>>;
}

pub struct ConfigureProviderRequest {
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// Immutable mapping from kind to schema
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema after checking its definition
    pub fn register(mut self, kind: &str, schema: Schema) -> Result<Self> {
        schema.check_definition().map_err(|e| {
            TfplugError::InvalidSchema(format!("{}: {}", kind, e))
        })?;
        if self.schemas.contains_key(kind) {
            return Err(TfplugError::InvalidSchema(format!(
                "{} registered twice",
                kind
            )));
        }
        self.schemas.insert(kind.to_string(), Arc::new(schema));
        Ok(self)
    }

    pub fn schema_for(&self, kind: &str) -> Result<Arc<Schema>> {
        self.schemas
            .get(kind)
            .cloned()
            .ok_or_else(|| TfplugError::ResourceNotFound(kind.to_string()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeBuilder, AttributeType, SchemaBuilder};

    fn schema(required_and_computed: bool) -> Schema {
        let mut attr = AttributeBuilder::new("name", AttributeType::String).required();
        if required_and_computed {
            attr = attr.computed();
        }
        SchemaBuilder::new().attribute(attr.build()).build()
    }

    #[test]
    fn registry_shares_schemas() {
        let registry = SchemaRegistry::new()
            .register("castai_node_template", schema(false))
            .unwrap();

        let a = registry.schema_for("castai_node_template").unwrap();
        let b = registry.schema_for("castai_node_template").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.kinds().collect::<Vec<_>>(), vec!["castai_node_template"]);
    }

    #[test]
    fn registry_rejects_invalid_definitions() {
        let err = SchemaRegistry::new()
            .register("castai_broken", schema(true))
            .unwrap_err();
        assert!(err.to_string().contains("castai_broken"));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.schema_for("castai_missing"),
            Err(TfplugError::ResourceNotFound(_))
        ));
    }
}
