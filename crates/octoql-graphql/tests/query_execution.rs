//! Integration tests executing queries against synthesized schemas backed by
//! in-memory tables.

mod common;

use std::sync::Arc;

use async_graphql::dynamic::Schema;
use async_graphql::{Request, Variables};
use octoql_graphql::{NodeId, SchemaBuilderConfig, SchemaSynthesizer};
use octoql_model::{Collection, CollectionKey, Field, MemoryTable, ObjectType};
use serde_json::{Value, json};

use common::{blog_inventory, int, string};

fn blog_schema() -> Schema {
    SchemaSynthesizer::new(blog_inventory(), SchemaBuilderConfig::default())
        .finish()
        .unwrap()
}

async fn run(schema: &Schema, query: &str) -> Value {
    let response = schema.execute(query).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    response.data.into_json().unwrap()
}

async fn run_with(schema: &Schema, query: &str, variables: Value) -> Value {
    let request = Request::new(query).variables(Variables::from_json(variables));
    let response = schema.execute(request).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    response.data.into_json().unwrap()
}

fn titles(nodes: &Value) -> Vec<&str> {
    nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Connections
// =============================================================================

#[tokio::test]
async fn test_forward_connection_is_scoped_to_head() {
    let schema = blog_schema();
    let data = run(
        &schema,
        r#"{
            allPerson {
                nodes {
                    name
                    postByAuthor { totalCount nodes { title status } }
                }
            }
        }"#,
    )
    .await;

    let people = data["allPerson"]["nodes"].as_array().unwrap();
    assert_eq!(people[0]["name"], "Ada");
    assert_eq!(people[0]["postByAuthor"]["totalCount"], 2);
    assert_eq!(
        titles(&people[0]["postByAuthor"]["nodes"]),
        ["Engines", "Notes"]
    );
    assert_eq!(people[0]["postByAuthor"]["nodes"][0]["status"], "PUBLISHED");
    assert_eq!(people[1]["name"], "Grace");
    assert_eq!(titles(&people[1]["postByAuthor"]["nodes"]), ["Compilers"]);
}

#[tokio::test]
async fn test_condition_narrows_relation_scope() {
    let schema = blog_schema();
    let data = run(
        &schema,
        r#"{
            allPerson(first: 1) {
                nodes { postByAuthor(condition: { status: DRAFT }) { nodes { title } } }
            }
        }"#,
    )
    .await;
    assert_eq!(
        titles(&data["allPerson"]["nodes"][0]["postByAuthor"]["nodes"]),
        ["Notes"]
    );
}

#[tokio::test]
async fn test_empty_condition_is_neutral() {
    let schema = blog_schema();
    let without = run(
        &schema,
        "{ allPerson { nodes { postByAuthor { totalCount } } } }",
    )
    .await;
    let with_empty = run(
        &schema,
        "{ allPerson { nodes { postByAuthor(condition: {}) { totalCount } } } }",
    )
    .await;
    assert_eq!(without, with_empty);
}

#[tokio::test]
async fn test_root_connection_condition() {
    let schema = blog_schema();
    let data = run(
        &schema,
        "{ allPost(condition: { status: PUBLISHED }) { totalCount nodes { title } } }",
    )
    .await;
    assert_eq!(data["allPost"]["totalCount"], 2);
    assert_eq!(titles(&data["allPost"]["nodes"]), ["Engines", "Compilers"]);
}

#[tokio::test]
async fn test_cursor_pagination() {
    let schema = blog_schema();
    let first = run(
        &schema,
        "{ allPost(first: 2) { edges { cursor node { title } } pageInfo { hasNextPage endCursor } } }",
    )
    .await;
    let page = &first["allPost"];
    assert_eq!(page["edges"].as_array().unwrap().len(), 2);
    assert_eq!(page["edges"][0]["node"]["title"], "Engines");
    assert_eq!(page["pageInfo"]["hasNextPage"], true);

    let cursor = page["pageInfo"]["endCursor"].clone();
    let second = run_with(
        &schema,
        "query($after: String) { allPost(first: 2, after: $after) { nodes { title } pageInfo { hasNextPage hasPreviousPage } } }",
        json!({ "after": cursor }),
    )
    .await;
    assert_eq!(
        titles(&second["allPost"]["nodes"]),
        ["Compilers", "Anonymous"]
    );
    assert_eq!(second["allPost"]["pageInfo"]["hasNextPage"], false);
    assert_eq!(second["allPost"]["pageInfo"]["hasPreviousPage"], true);
}

#[tokio::test]
async fn test_negative_first_is_an_error() {
    let schema = blog_schema();
    let response = schema.execute("{ allPost(first: -1) { totalCount } }").await;
    assert_eq!(response.errors.len(), 1);
    assert!(
        response.errors[0].message.contains("must not be negative"),
        "{}",
        response.errors[0].message
    );
}

// =============================================================================
// Reverse relations and scalars
// =============================================================================

#[tokio::test]
async fn test_reverse_field_resolves_head() {
    let schema = blog_schema();
    let data = run(&schema, "{ allPost { nodes { title tags author { name } } } }").await;

    let posts = data["allPost"]["nodes"].as_array().unwrap();
    assert_eq!(posts[0]["author"]["name"], "Ada");
    assert_eq!(posts[0]["tags"], json!(["math"]));
    assert_eq!(posts[2]["author"]["name"], "Grace");
    assert_eq!(posts[3]["title"], "Anonymous");
    assert!(posts[3]["author"].is_null());
}

// =============================================================================
// Global identifiers
// =============================================================================

#[tokio::test]
async fn test_identity_field_encodes_primary_key() {
    let schema = blog_schema();
    let data = run(&schema, "{ allPerson { nodes { id rowId } } }").await;

    let ada = &data["allPerson"]["nodes"][0];
    let id = NodeId::decode(ada["id"].as_str().unwrap()).unwrap();
    assert_eq!(id.collection, "person");
    assert_eq!(id.key, vec![json!(1)]);
}

#[tokio::test]
async fn test_node_lookup_round_trip() {
    let schema = blog_schema();
    let id = NodeId::new("person", vec![json!(2)]).encode();

    let data = run_with(
        &schema,
        "query($id: ID!) { node(id: $id) { __typename id ... on Person { name } } }",
        json!({ "id": id }),
    )
    .await;
    assert_eq!(data["node"]["__typename"], "Person");
    assert_eq!(data["node"]["name"], "Grace");
    assert_eq!(data["node"]["id"], id);
}

/// A keyed collection shaped exactly like `person`, with no predicate.
fn member() -> Collection {
    let ty = ObjectType::new(
        "member",
        vec![Field::new("row_id", int()), Field::new("name", string())],
    )
    .unwrap();
    let table = Arc::new(MemoryTable::new(["row_id"]).with_rows([
        json!({"row_id": 2, "name": "Barbara"}),
    ]));
    Collection::new("member", Arc::new(ty))
        .with_primary_key(CollectionKey::new(["row_id"]).with_reader(table.clone()))
        .with_paginator(table)
}

#[tokio::test]
async fn test_node_lookup_resolves_collection_of_origin() {
    let mut inventory = blog_inventory();
    inventory.add_collection(member()).unwrap();
    let schema = SchemaSynthesizer::new(inventory, SchemaBuilderConfig::default())
        .finish()
        .unwrap();

    let query = "query($id: ID!) { node(id: $id) { __typename id ... on Member { name } } }";
    let member_id = NodeId::new("member", vec![json!(2)]).encode();
    let data = run_with(&schema, query, json!({ "id": member_id })).await;
    assert_eq!(data["node"]["__typename"], "Member");
    assert_eq!(data["node"]["name"], "Barbara");
    assert_eq!(data["node"]["id"], member_id);

    let person_id = NodeId::new("person", vec![json!(2)]).encode();
    let data = run_with(&schema, query, json!({ "id": person_id })).await;
    assert_eq!(data["node"]["__typename"], "Person");
}

#[tokio::test]
async fn test_node_lookup_missing_value() {
    let schema = blog_schema();
    let id = NodeId::new("person", vec![json!(99)]).encode();
    let data = run_with(
        &schema,
        "query($id: ID!) { node(id: $id) { id } }",
        json!({ "id": id }),
    )
    .await;
    assert!(data["node"].is_null());
}

#[tokio::test]
async fn test_node_lookup_malformed_identifier() {
    let schema = blog_schema();
    let response = schema.execute(r#"{ node(id: "%%%") { id } }"#).await;
    assert_eq!(response.errors.len(), 1);
    assert!(
        response.errors[0].message.contains("Malformed node identifier"),
        "{}",
        response.errors[0].message
    );
}

#[tokio::test]
async fn test_node_lookup_collection_without_key() {
    let schema = blog_schema();
    let id = NodeId::new("post", vec![json!(10)]).encode();
    let response = schema
        .execute(Request::new("query($id: ID!) { node(id: $id) { id } }").variables(
            Variables::from_json(json!({ "id": id })),
        ))
        .await;
    assert_eq!(response.errors.len(), 1);
}
