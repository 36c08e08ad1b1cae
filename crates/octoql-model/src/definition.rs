//! Declarative model definitions.
//!
//! A [`ModelDefinition`] describes collections, composite types, enums and
//! relations in TOML and assembles them into an [`Inventory`] backed by
//! [`MemoryTable`]s seeded with the declared rows.
//!
//! # Example
//!
//! ```toml
//! [[collections]]
//! name = "person"
//! primary_key = ["row_id"]
//! fields = [
//!     { name = "row_id", type = "Int!" },
//!     { name = "name", type = "String" },
//! ]
//! rows = [{ row_id = 1, name = "Ada" }]
//!
//! [[relations]]
//! name = "author"
//! head = "person"
//! tail = "post"
//! head_fields = ["row_id"]
//! tail_fields = ["author_id"]
//! ```
//!
//! Field types use GraphQL-like expressions: `Int!` is non-null, `String` is
//! nullable, `[String!]!` is a non-null list of non-null strings. Names other
//! than the built-in scalars refer to declared enums or objects.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::collection::{Collection, CollectionKey};
use crate::error::{ModelError, Result};
use crate::inventory::Inventory;
use crate::memory::MemoryTable;
use crate::relation::{Relation, RelationKey};
use crate::value_type::{EnumType, Field, ObjectType, ScalarType, ValueType};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelDefinition {
    #[serde(default)]
    pub enums: Vec<EnumDefinition>,
    #[serde(default)]
    pub objects: Vec<ObjectDefinition>,
    #[serde(default)]
    pub collections: Vec<CollectionDefinition>,
    #[serde(default)]
    pub relations: Vec<RelationDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub primary_key: Option<Vec<String>>,
    #[serde(default = "default_paginated")]
    pub paginated: bool,
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
}

fn default_paginated() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationDefinition {
    pub name: String,
    pub head: String,
    pub tail: String,
    #[serde(default)]
    pub head_fields: Vec<String>,
    #[serde(default)]
    pub tail_fields: Vec<String>,
}

impl ModelDefinition {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Builds the inventory, seeding one in-memory table per collection.
    pub fn into_inventory(self) -> Result<Inventory> {
        let mut types = TypeResolver::new(&self.enums, &self.objects)?;
        let mut inventory = Inventory::new();

        for def in self.collections {
            let fields = def
                .fields
                .iter()
                .map(|f| types.field(f))
                .collect::<Result<Vec<_>>>()?;
            let mut object_type = ObjectType::new(def.name.clone(), fields)?;
            if let Some(description) = &def.description {
                object_type = object_type.with_description(description.clone());
            }

            let key_fields = def.primary_key.clone().unwrap_or_default();
            let table = Arc::new(MemoryTable::new(key_fields.clone()).with_rows(def.rows));

            let mut collection = Collection::new(def.name.clone(), Arc::new(object_type));
            if let Some(description) = def.description {
                collection = collection.with_description(description);
            }
            if def.primary_key.is_some() {
                collection = collection
                    .with_primary_key(CollectionKey::new(key_fields).with_reader(table.clone()));
            }
            if def.paginated {
                collection = collection.with_paginator(table);
            }
            inventory.add_collection(collection)?;
        }

        for def in self.relations {
            if def.head_fields.len() != def.tail_fields.len() {
                return Err(ModelError::definition(format!(
                    "relation '{}' pairs {} head fields with {} tail fields",
                    def.name,
                    def.head_fields.len(),
                    def.tail_fields.len()
                )));
            }
            let mut relation = Relation::new(def.name, def.head, def.tail);
            if !def.head_fields.is_empty() {
                relation = relation.with_key(RelationKey::new(def.head_fields, def.tail_fields));
            }
            inventory.add_relation(relation)?;
        }

        debug!(
            collections = inventory.collections().count(),
            relations = inventory.relations().len(),
            "Assembled inventory from definition"
        );
        Ok(inventory)
    }
}

/// Resolves type expressions against declared enums and objects.
struct TypeResolver<'a> {
    enums: HashMap<&'a str, Arc<EnumType>>,
    object_defs: HashMap<&'a str, &'a ObjectDefinition>,
    objects: HashMap<String, Arc<ObjectType>>,
}

impl<'a> TypeResolver<'a> {
    fn new(enums: &'a [EnumDefinition], objects: &'a [ObjectDefinition]) -> Result<Self> {
        let mut resolver = Self {
            enums: HashMap::new(),
            object_defs: HashMap::new(),
            objects: HashMap::new(),
        };
        for def in enums {
            let mut ty = EnumType::new(def.name.clone(), def.variants.clone());
            if let Some(description) = &def.description {
                ty = ty.with_description(description.clone());
            }
            if resolver.enums.insert(def.name.as_str(), Arc::new(ty)).is_some() {
                return Err(ModelError::definition(format!("enum '{}' declared twice", def.name)));
            }
        }
        for def in objects {
            if resolver.enums.contains_key(def.name.as_str())
                || resolver.object_defs.insert(def.name.as_str(), def).is_some()
            {
                return Err(ModelError::definition(format!("type '{}' declared twice", def.name)));
            }
        }
        let mut visiting = Vec::new();
        for def in objects {
            resolver.resolve_object(&def.name, &mut visiting)?;
        }
        Ok(resolver)
    }

    fn resolve_object(&mut self, name: &str, visiting: &mut Vec<String>) -> Result<Arc<ObjectType>> {
        if let Some(resolved) = self.objects.get(name) {
            return Ok(Arc::clone(resolved));
        }
        if visiting.iter().any(|v| v == name) {
            return Err(ModelError::definition(format!(
                "object types form a cycle: {} -> {}",
                visiting.join(" -> "),
                name
            )));
        }
        let def = *self
            .object_defs
            .get(name)
            .ok_or_else(|| ModelError::definition(format!("unknown type '{name}'")))?;

        visiting.push(name.to_string());
        let mut fields = Vec::with_capacity(def.fields.len());
        for field in &def.fields {
            let value_type = self.parse_mut(&field.type_expr, visiting)?;
            fields.push(field_from(field, value_type));
        }
        visiting.pop();

        let mut ty = ObjectType::new(def.name.clone(), fields)?;
        if let Some(description) = &def.description {
            ty = ty.with_description(description.clone());
        }
        let ty = Arc::new(ty);
        self.objects.insert(name.to_string(), Arc::clone(&ty));
        Ok(ty)
    }

    fn parse_mut(&mut self, expr: &str, visiting: &mut Vec<String>) -> Result<ValueType> {
        let parsed = parse_type_expr(expr)?;
        self.materialize(&parsed, visiting)
    }

    fn materialize(&mut self, expr: &TypeExpr, visiting: &mut Vec<String>) -> Result<ValueType> {
        let base = match &expr.base {
            TypeBase::Named(name) => {
                if let Some(scalar) = ScalarType::from_name(name) {
                    ValueType::Scalar(scalar)
                } else if let Some(e) = self.enums.get(name.as_str()) {
                    ValueType::Enum(Arc::clone(e))
                } else {
                    ValueType::Object(self.resolve_object(name, visiting)?)
                }
            }
            TypeBase::List(item) => ValueType::list(self.materialize(item, visiting)?),
        };
        Ok(if expr.non_null {
            base
        } else {
            ValueType::nullable(base)
        })
    }

    fn field(&mut self, def: &FieldDefinition) -> Result<Field> {
        let value_type = self.parse_mut(&def.type_expr, &mut Vec::new())?;
        Ok(field_from(def, value_type))
    }
}

fn field_from(def: &FieldDefinition, value_type: ValueType) -> Field {
    let field = Field::new(def.name.clone(), value_type);
    match &def.description {
        Some(description) => field.with_description(description.clone()),
        None => field,
    }
}

#[derive(Debug, PartialEq)]
struct TypeExpr {
    base: TypeBase,
    non_null: bool,
}

#[derive(Debug, PartialEq)]
enum TypeBase {
    Named(String),
    List(Box<TypeExpr>),
}

fn parse_type_expr(expr: &str) -> Result<TypeExpr> {
    let invalid = || ModelError::definition(format!("invalid type expression '{expr}'"));
    let (parsed, rest) = parse_partial(expr.trim()).ok_or_else(invalid)?;
    if rest.trim().is_empty() {
        Ok(parsed)
    } else {
        Err(invalid())
    }
}

fn parse_partial(input: &str) -> Option<(TypeExpr, &str)> {
    let input = input.trim_start();
    let (base, rest) = if let Some(inner) = input.strip_prefix('[') {
        let (item, rest) = parse_partial(inner)?;
        let rest = rest.trim_start().strip_prefix(']')?;
        (TypeBase::List(Box::new(item)), rest)
    } else {
        let end = input
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(input.len());
        if end == 0 {
            return None;
        }
        (TypeBase::Named(input[..end].to_string()), &input[end..])
    };
    let rest = rest.trim_start();
    match rest.strip_prefix('!') {
        Some(rest) => Some((TypeExpr { base, non_null: true }, rest)),
        None => Some((TypeExpr { base, non_null: false }, rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::paginator::PageRequest;
    use serde_json::json;
    use std::io::Write;

    const BLOG: &str = r#"
        [[enums]]
        name = "post_status"
        variants = ["draft", "published"]

        [[objects]]
        name = "address"
        fields = [{ name = "city", type = "String" }]

        [[collections]]
        name = "person"
        primary_key = ["row_id"]
        fields = [
            { name = "row_id", type = "Int!" },
            { name = "name", type = "String!" },
            { name = "address", type = "address" },
        ]
        rows = [{ row_id = 1, name = "Ada" }, { row_id = 2, name = "Grace" }]

        [[collections]]
        name = "post"
        fields = [
            { name = "title", type = "String!" },
            { name = "author_id", type = "Int" },
            { name = "status", type = "post_status!" },
            { name = "tags", type = "[String!]" },
        ]
        rows = [
            { title = "Engines", author_id = 1, status = "published" },
            { title = "Compilers", author_id = 2, status = "draft" },
        ]

        [[relations]]
        name = "author"
        head = "person"
        tail = "post"
        head_fields = ["row_id"]
        tail_fields = ["author_id"]
    "#;

    #[test]
    fn test_parse_type_expr() {
        assert_eq!(
            parse_type_expr("Int!").unwrap(),
            TypeExpr {
                base: TypeBase::Named("Int".into()),
                non_null: true
            }
        );
        let list = parse_type_expr(" [String!] ").unwrap();
        assert!(!list.non_null);
        assert!(matches!(list.base, TypeBase::List(ref item) if item.non_null));
        assert!(parse_type_expr("[Int").is_err());
        assert!(parse_type_expr("Int!!").is_err());
        assert!(parse_type_expr("").is_err());
    }

    #[test]
    fn test_into_inventory() {
        let inventory = ModelDefinition::from_toml_str(BLOG)
            .unwrap()
            .into_inventory()
            .unwrap();

        let person = inventory.collection("person").unwrap();
        assert!(person.primary_key.is_some());
        assert!(person.supports_connections());
        assert_eq!(
            person.object_type.field("address").unwrap().value_type.to_string(),
            "address"
        );

        let post = inventory.collection("post").unwrap();
        assert!(post.primary_key.is_none());
        assert_eq!(post.object_type.field("tags").unwrap().value_type.to_string(), "[String!]");
        assert_eq!(
            post.object_type.field("status").unwrap().value_type.to_string(),
            "post_status!"
        );

        let relation = &inventory.relations()[0];
        assert_eq!(relation.name, "author");
        assert!(relation.can_derive_tail_condition());
    }

    #[tokio::test]
    async fn test_seeded_rows_are_paginated() {
        let inventory = ModelDefinition::from_toml_str(BLOG)
            .unwrap()
            .into_inventory()
            .unwrap();
        let post = inventory.collection("post").unwrap();
        let page = post
            .paginator
            .as_ref()
            .unwrap()
            .read_page(&Condition::equal("author_id", json!(2)), &PageRequest::new())
            .await
            .unwrap();
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].record.data["title"], "Compilers");
    }

    #[test]
    fn test_object_cycle_rejected() {
        let source = r#"
            [[objects]]
            name = "a"
            fields = [{ name = "b", type = "b" }]

            [[objects]]
            name = "b"
            fields = [{ name = "a", type = "[a]" }]
        "#;
        let err = ModelDefinition::from_toml_str(source)
            .unwrap()
            .into_inventory()
            .unwrap_err();
        assert!(err.to_string().contains("cycle"), "{err}");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let source = r#"
            [[collections]]
            name = "person"
            fields = [{ name = "born", type = "Date" }]
        "#;
        let err = ModelDefinition::from_toml_str(source)
            .unwrap()
            .into_inventory()
            .unwrap_err();
        assert!(err.to_string().contains("unknown type 'Date'"), "{err}");
    }

    #[test]
    fn test_mismatched_relation_key() {
        let source = r#"
            [[collections]]
            name = "person"
            fields = [{ name = "row_id", type = "Int!" }]

            [[relations]]
            name = "friend"
            head = "person"
            tail = "person"
            head_fields = ["row_id"]
        "#;
        let err = ModelDefinition::from_toml_str(source)
            .unwrap()
            .into_inventory()
            .unwrap_err();
        assert!(matches!(err, ModelError::Definition(_)));
    }

    #[test]
    fn test_unpaginated_collection() {
        let source = r#"
            [[collections]]
            name = "audit"
            paginated = false
            fields = [{ name = "message", type = "String" }]
        "#;
        let inventory = ModelDefinition::from_toml_str(source)
            .unwrap()
            .into_inventory()
            .unwrap();
        assert!(!inventory.collection("audit").unwrap().supports_connections());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BLOG.as_bytes()).unwrap();
        let definition = ModelDefinition::from_path(file.path()).unwrap();
        assert_eq!(definition.collections.len(), 2);
        assert_eq!(definition.relations.len(), 1);
    }
}
