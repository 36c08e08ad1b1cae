//! # octoql-model
//!
//! The language-neutral data model consumed by the octoql schema engine.
//!
//! - [`Collection`]: a named entity type with ordered fields, an optional
//!   primary key and an optional [`Paginator`]
//! - [`Relation`]: a named link from a head collection to a tail collection
//!   that can derive a tail [`Condition`] from a head value
//! - [`Inventory`]: the registry holding both, in registration order
//! - [`MemoryTable`]: an in-memory paginator/record reader
//! - [`ModelDefinition`]: TOML model definitions assembled into an inventory

pub mod collection;
pub mod condition;
pub mod definition;
pub mod error;
pub mod inventory;
pub mod memory;
pub mod paginator;
pub mod record;
pub mod relation;
pub mod value_type;

pub use collection::{Collection, CollectionKey, IsTypeOf, RecordReader};
pub use condition::Condition;
pub use definition::ModelDefinition;
pub use error::{ModelError, Result};
pub use inventory::Inventory;
pub use memory::MemoryTable;
pub use paginator::{Page, PageEntry, PageInfo, PageRequest, Paginator};
pub use record::Record;
pub use relation::{Relation, RelationKey, TailConditionFn};
pub use value_type::{Accessor, EnumType, Field, ObjectType, ScalarType, ValueType};
