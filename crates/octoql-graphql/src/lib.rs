//! # octoql-graphql
//!
//! Synthesizes a GraphQL schema from an `octoql-model` [`Inventory`].
//!
//! Every collection becomes an object type with:
//!
//! - a global identifier field (when it has a primary key) and `Node`
//!   membership
//! - one field per model field
//! - fields contributed by an optional extension hook
//! - reverse relation fields resolving the referenced head value
//! - forward relation connections named `<tail>By<Relation>`
//!
//! Field lists are computed lazily so collections may reference each other
//! cyclically; [`SchemaSynthesizer::finish`] forces them all and reports
//! configuration errors before any query runs.
//!
//! ## Example
//!
//! ```ignore
//! use octoql_graphql::{GraphQLConfig, SchemaSynthesizer};
//!
//! let config = GraphQLConfig::default();
//! let schema = SchemaSynthesizer::new(inventory, config.to_schema_builder_config()).finish()?;
//! println!("{}", schema.sdl());
//! ```
//!
//! [`Inventory`]: octoql_model::Inventory

pub mod config;
pub mod context;
pub mod error;
pub mod fields;
pub mod naming;
pub mod node_id;
pub mod schema;

pub use config::GraphQLConfig;
pub use context::{BuildContext, FieldEntriesHook};
pub use error::{NodeIdError, SchemaError};
pub use fields::{ArgumentEntry, FieldEntries, FieldEntry, FieldSource, ResolverFn, merge_entries, resolver_fn};
pub use node_id::NodeId;
pub use schema::{CollectionOutputType, SchemaBuilderConfig, SchemaSynthesizer, TypeRegistry};
