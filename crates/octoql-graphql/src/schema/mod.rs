//! GraphQL schema synthesis.
//!
//! This module turns collections and relations into dynamic GraphQL types:
//!
//! - [`output_types`]: model value types to output types
//! - [`condition_types`]: `<Type>Condition` filter inputs
//! - [`connection`]: connection/edge types and connection fields
//! - [`relations`]: forward and reverse relation fields
//! - [`collection_type`]: the lazily computed output type of a collection
//! - [`node`]: the `Node` interface and root lookup
//! - [`builder`]: schema assembly

pub mod builder;
pub mod collection_type;
pub mod condition_types;
pub mod connection;
pub mod node;
pub mod output_types;
pub mod registry;
pub mod relations;

pub use builder::{SchemaBuilderConfig, SchemaSynthesizer};
pub use collection_type::CollectionOutputType;
pub use condition_types::{ConditionType, condition_type};
pub use connection::{ConnectionScope, ConnectionTypes, connection_field, connection_types};
pub use node::NODE_INTERFACE;
pub use output_types::{EnumMapping, OutputShape, ResolvedOutput, resolve_output};
pub use registry::TypeRegistry;
pub use relations::{forward_relation_fields, reverse_relation_fields};
