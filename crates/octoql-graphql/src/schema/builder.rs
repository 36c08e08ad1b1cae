//! Schema assembly.
//!
//! [`SchemaSynthesizer`] turns an [`Inventory`] into an
//! `async_graphql::dynamic::Schema`: one output type per collection, the
//! `Node` interface, connection and condition types, and the query root.

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, Object, Scalar, Schema, SchemaBuilder, TypeRef};
use octoql_model::Inventory;
use tracing::debug;

use super::collection_type::CollectionOutputType;
use super::connection::{ConnectionScope, connection_field, page_info_object};
use super::node::{node_field, node_interface};
use super::output_types::JSON_SCALAR;
use crate::context::{BuildContext, FieldEntriesHook};
use crate::error::SchemaError;
use crate::fields::{FieldEntries, FieldEntry, FieldSource, merge_entries, resolver_fn};
use crate::naming::{self, is_valid_graphql_name};

/// Configuration for schema building.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,

    /// Name of the global identifier field.
    pub node_id_field_name: String,

    /// Whether to add `all<Collection>` connections to the query root.
    pub root_connections: bool,

    /// Whether skipped relation fields are logged at warn level.
    pub warn_on_skipped_relations: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
            node_id_field_name: "id".to_string(),
            root_connections: true,
            warn_on_skipped_relations: false,
        }
    }
}

/// Builds a GraphQL schema from a data model.
///
/// Collection output types are created on request and their fields are
/// computed lazily; [`finish`](Self::finish) forces every collection so that
/// configuration errors surface before any query runs.
///
/// # Example
///
/// ```ignore
/// let synthesizer = SchemaSynthesizer::new(inventory, SchemaBuilderConfig::default());
/// let person = synthesizer.collection_type("person")?;
/// let schema = synthesizer.finish()?;
/// ```
pub struct SchemaSynthesizer {
    inventory: Arc<Inventory>,
    ctx: BuildContext,
}

impl SchemaSynthesizer {
    /// Creates a new synthesizer.
    #[must_use]
    pub fn new(inventory: Inventory, config: SchemaBuilderConfig) -> Self {
        let inventory = Arc::new(inventory);
        Self {
            ctx: BuildContext::new(Arc::clone(&inventory), config),
            inventory,
        }
    }

    /// Installs the extension hook consulted for every collection type.
    #[must_use]
    pub fn with_field_entries_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CollectionOutputType, &BuildContext) -> Option<FieldEntries> + Send + Sync + 'static,
    {
        let hook: FieldEntriesHook = Arc::new(hook);
        self.ctx.set_hook(hook);
        self
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    /// The output type of a collection; repeated calls return the same type.
    pub fn collection_type(&self, name: &str) -> Result<Arc<CollectionOutputType>, SchemaError> {
        self.ctx.collection_type(name)
    }

    /// Builds the schema.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found in any collection type,
    /// or [`SchemaError::Build`] when async-graphql rejects the result.
    pub fn finish(self) -> Result<Schema, SchemaError> {
        let config = self.ctx.config().clone();
        if !is_valid_graphql_name(&config.node_id_field_name) {
            return Err(SchemaError::InvalidConfig(format!(
                "'{}' is not a valid identity field name",
                config.node_id_field_name
            )));
        }
        debug!(
            collections = self.inventory.collections().count(),
            relations = self.inventory.relations().len(),
            "Starting GraphQL schema build"
        );

        let mut collection_objects = Vec::new();
        for collection in self.inventory.collections() {
            let output = self.ctx.collection_type(&collection.name)?;
            collection_objects.push(output.to_object(&self.ctx)?);
        }
        let output_types = self.ctx.registry().collection_types();
        let node_types: Vec<_> = output_types.iter().filter(|t| t.is_node()).cloned().collect();

        let query = self.build_query_type(node_types.clone())?;

        let mut schema_builder = Schema::build("Query", None, None);
        schema_builder = register_scalars(schema_builder);
        if !node_types.is_empty() {
            schema_builder = schema_builder.register(node_interface(&config.node_id_field_name));
        }
        if self.ctx.registry().has_connections() {
            schema_builder = schema_builder.register(page_info_object());
        }
        for object in collection_objects {
            schema_builder = schema_builder.register(object);
        }
        let generated = self.ctx.registry().take_types();
        debug!(
            collection_types = output_types.len(),
            node_types = node_types.len(),
            generated_types = generated.len(),
            "Registering generated types"
        );
        for ty in generated {
            schema_builder = schema_builder.register(ty);
        }
        schema_builder = schema_builder.register(query);

        // Configure limits
        let mut schema_builder = schema_builder.limit_depth(config.max_depth);
        schema_builder = schema_builder.limit_complexity(config.max_complexity);

        // Enable/disable introspection
        if !config.introspection_enabled {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| SchemaError::Build(e.to_string()))?;

        debug!("GraphQL schema build complete");
        Ok(schema)
    }

    /// Builds the Query root type.
    fn build_query_type(
        &self,
        node_types: Vec<Arc<CollectionOutputType>>,
    ) -> Result<Object, SchemaError> {
        let mut fields = FieldEntries::new();

        let version = FieldEntry::new(
            "_version",
            TypeRef::named_nn(TypeRef::STRING),
            FieldSource::Root,
            resolver_fn(|_| {
                FieldFuture::new(async {
                    Ok(Some(Value::String(env!("CARGO_PKG_VERSION").to_string())))
                })
            }),
        )
        .with_description("API version");
        merge_entries("Query", &mut fields, [version], FieldSource::Root)?;

        if !node_types.is_empty() {
            let node = node_field(Arc::clone(&self.inventory), node_types);
            merge_entries("Query", &mut fields, [node], FieldSource::Root)?;
        }

        if self.ctx.config().root_connections {
            for collection in self.inventory.collections() {
                if !collection.supports_connections() {
                    continue;
                }
                let name = naming::field_name(&format!("all-{}", collection.name))?;
                let entry = connection_field(&self.ctx, &name, collection, ConnectionScope::All)?;
                merge_entries("Query", &mut fields, [entry], FieldSource::Root)?;
            }
        }

        debug!(fields = fields.len(), "Built Query type");
        let mut query = Object::new("Query").description("Query root");
        for entry in fields.values() {
            query = query.field(entry.to_field());
        }
        Ok(query)
    }
}

/// Registers custom scalar types.
fn register_scalars(builder: SchemaBuilder) -> SchemaBuilder {
    builder.register(Scalar::new(JSON_SCALAR).description("An arbitrary JSON value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builder_config_default() {
        let config = SchemaBuilderConfig::default();
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_complexity, 500);
        assert!(config.introspection_enabled);
        assert_eq!(config.node_id_field_name, "id");
        assert!(config.root_connections);
    }

    #[tokio::test]
    async fn test_empty_inventory_builds() {
        let synthesizer = SchemaSynthesizer::new(Inventory::new(), SchemaBuilderConfig::default());
        let schema = synthesizer.finish().unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("type Query"), "Schema should have Query type");
        assert!(sdl.contains("_version"), "Schema should have _version field on Query");
        assert!(!sdl.contains("interface Node"), "No identifiable collections");
    }

    #[tokio::test]
    async fn test_version_query() {
        let schema = SchemaSynthesizer::new(Inventory::new(), SchemaBuilderConfig::default())
            .finish()
            .unwrap();
        let response = schema.execute("{ _version }").await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let data = response.data.into_json().unwrap();
        assert_eq!(data["_version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_invalid_identity_name() {
        let config = SchemaBuilderConfig {
            node_id_field_name: "node id".into(),
            ..Default::default()
        };
        let err = SchemaSynthesizer::new(Inventory::new(), config)
            .finish()
            .err()
            .expect("schema build should fail");
        assert!(matches!(err, SchemaError::InvalidConfig(_)));
    }
}
