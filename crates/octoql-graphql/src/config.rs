//! GraphQL configuration.
//!
//! Configuration is read from the `[graphql]` section of a model definition
//! file.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! node_id_field_name = "id"
//! root_connections = true
//! ```

use serde::{Deserialize, Serialize};

use crate::naming::is_valid_graphql_name;

/// GraphQL schema configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    /// Name of the global identifier field on identifiable types.
    /// Default: "id"
    #[serde(default = "default_node_id_field_name")]
    pub node_id_field_name: String,

    /// Expose an `all<Collection>` connection on the query root for every
    /// paginated collection.
    /// Default: true
    #[serde(default = "default_root_connections")]
    pub root_connections: bool,

    /// Log a warning for every relation that cannot become a connection field.
    /// Default: false
    #[serde(default)]
    pub warn_on_skipped_relations: bool,
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

fn default_node_id_field_name() -> String {
    "id".to_string()
}

fn default_root_connections() -> bool {
    true
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
            node_id_field_name: default_node_id_field_name(),
            root_connections: default_root_connections(),
            warn_on_skipped_relations: false,
        }
    }
}

impl GraphQLConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("graphql.max_depth must be > 0".into());
        }
        if self.max_complexity == 0 {
            return Err("graphql.max_complexity must be > 0".into());
        }
        if !is_valid_graphql_name(&self.node_id_field_name) {
            return Err(format!(
                "graphql.node_id_field_name '{}' is not a valid GraphQL name",
                self.node_id_field_name
            ));
        }
        Ok(())
    }

    /// Converts this config to a SchemaBuilderConfig.
    #[must_use]
    pub fn to_schema_builder_config(&self) -> crate::SchemaBuilderConfig {
        crate::SchemaBuilderConfig {
            max_depth: self.max_depth,
            max_complexity: self.max_complexity,
            introspection_enabled: self.introspection,
            node_id_field_name: self.node_id_field_name.clone(),
            root_connections: self.root_connections,
            warn_on_skipped_relations: self.warn_on_skipped_relations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphQLConfig::default();
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_complexity, 500);
        assert!(config.introspection);
        assert_eq!(config.node_id_field_name, "id");
        assert!(config.root_connections);
        assert!(!config.warn_on_skipped_relations);
    }

    #[test]
    fn test_valid_config() {
        let config = GraphQLConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_max_depth() {
        let mut config = GraphQLConfig::default();
        config.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_max_complexity() {
        let mut config = GraphQLConfig::default();
        config.max_complexity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_node_id_field_name() {
        let mut config = GraphQLConfig::default();
        config.node_id_field_name = "node-id".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            max_depth = 20
            max_complexity = 1000
            introspection = false
            node_id_field_name = "nodeId"
            warn_on_skipped_relations = true
        "#;

        let config: GraphQLConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_depth, 20);
        assert_eq!(config.max_complexity, 1000);
        assert!(!config.introspection);
        assert_eq!(config.node_id_field_name, "nodeId");
        assert!(config.root_connections);
        assert!(config.warn_on_skipped_relations);
    }

    #[test]
    fn test_to_schema_builder_config() {
        let config = GraphQLConfig {
            introspection: false,
            root_connections: false,
            ..Default::default()
        };
        let builder = config.to_schema_builder_config();
        assert!(!builder.introspection_enabled);
        assert!(!builder.root_connections);
        assert_eq!(builder.node_id_field_name, "id");
    }
}
