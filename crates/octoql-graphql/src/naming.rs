//! Deterministic formatting of raw model names into GraphQL names.
//!
//! Raw names are split into words at `_`, `-`, whitespace and lower-to-upper
//! case transitions. Types become PascalCase, fields camelCase and enum values
//! CONSTANT_CASE. Every result is checked against the GraphQL name grammar.

use crate::error::SchemaError;

/// Splits a raw name into lowercase words.
fn words(raw: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in raw.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Capitalizes the first character of a string.
pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

fn checked(raw: &str, name: String) -> Result<String, SchemaError> {
    if is_valid_graphql_name(&name) {
        Ok(name)
    } else {
        Err(SchemaError::InvalidName(raw.to_string()))
    }
}

/// PascalCase type name: `post_status` → `PostStatus`.
pub fn type_name(raw: &str) -> Result<String, SchemaError> {
    let name = words(raw).iter().map(|w| capitalize_first(w)).collect();
    checked(raw, name)
}

/// camelCase field name: `post-by-author` → `postByAuthor`.
pub fn field_name(raw: &str) -> Result<String, SchemaError> {
    let mut name = String::new();
    for (i, word) in words(raw).iter().enumerate() {
        if i == 0 {
            name.push_str(word);
        } else {
            name.push_str(&capitalize_first(word));
        }
    }
    checked(raw, name)
}

/// CONSTANT_CASE enum value: `in-review` → `IN_REVIEW`.
pub fn enum_value_name(raw: &str) -> Result<String, SchemaError> {
    let name = words(raw)
        .iter()
        .map(|w| w.to_uppercase())
        .collect::<Vec<_>>()
        .join("_");
    checked(raw, name)
}

/// Checks if a name is valid for GraphQL.
///
/// GraphQL names must match the pattern `[_a-zA-Z][_a-zA-Z0-9]*`. Names
/// starting with `__` are reserved for introspection.
pub fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    if name.starts_with("__") {
        return false;
    }

    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
