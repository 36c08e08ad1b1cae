//! Shared fixtures: a small blog model with people and their posts.

#![allow(dead_code)]

use std::sync::Arc;

use octoql_model::{
    Collection, CollectionKey, EnumType, Field, Inventory, MemoryTable, ObjectType, Relation,
    RelationKey, ScalarType, ValueType,
};
use serde_json::json;

pub fn int() -> ValueType {
    ValueType::Scalar(ScalarType::Int)
}

pub fn string() -> ValueType {
    ValueType::Scalar(ScalarType::String)
}

pub fn person() -> Collection {
    let ty = ObjectType::new(
        "person",
        vec![
            Field::new("row_id", int()),
            Field::new("name", string()).with_description("Display name"),
        ],
    )
    .unwrap();
    let table = Arc::new(MemoryTable::new(["row_id"]).with_rows([
        json!({"row_id": 1, "name": "Ada"}),
        json!({"row_id": 2, "name": "Grace"}),
    ]));
    Collection::new("person", Arc::new(ty))
        .with_description("A person who writes posts")
        .with_primary_key(CollectionKey::new(["row_id"]).with_reader(table.clone()))
        .with_paginator(table)
}

pub fn post_status() -> Arc<EnumType> {
    Arc::new(EnumType::new("post_status", ["draft", "published"]))
}

/// Posts have no primary key; `paginated` controls whether they expose a
/// paginator.
pub fn post(paginated: bool) -> Collection {
    let ty = ObjectType::new(
        "post",
        vec![
            Field::new("row_id", int()),
            Field::new("author_id", ValueType::nullable(int())),
            Field::new("title", string()),
            Field::new("status", ValueType::Enum(post_status())),
            Field::new("tags", ValueType::list(string())),
        ],
    )
    .unwrap();
    let collection = Collection::new("post", Arc::new(ty));
    if !paginated {
        return collection;
    }
    let table = Arc::new(MemoryTable::new(Vec::<String>::new()).with_rows([
        json!({"row_id": 10, "author_id": 1, "title": "Engines", "status": "published", "tags": ["math"]}),
        json!({"row_id": 11, "author_id": 1, "title": "Notes", "status": "draft", "tags": []}),
        json!({"row_id": 12, "author_id": 2, "title": "Compilers", "status": "published", "tags": ["cobol"]}),
        json!({"row_id": 13, "author_id": null, "title": "Anonymous", "status": "draft", "tags": []}),
    ]));
    collection.with_paginator(table)
}

pub fn relation(name: &str) -> Relation {
    Relation::new(name, "person", "post").with_key(RelationKey::new(["row_id"], ["author_id"]))
}

/// `person` and a paginated `post`, related by `author`.
pub fn blog_inventory() -> Inventory {
    blog_inventory_with(true, &["author"])
}

pub fn blog_inventory_with(paginated_posts: bool, relations: &[&str]) -> Inventory {
    let mut inventory = Inventory::new();
    inventory.add_collection(person()).unwrap();
    inventory.add_collection(post(paginated_posts)).unwrap();
    for name in relations {
        inventory.add_relation(relation(name)).unwrap();
    }
    inventory
}
