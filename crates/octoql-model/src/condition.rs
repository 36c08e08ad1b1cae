//! Composable predicates over collection values.

use serde_json::Value;

/// A predicate used to scope a collection query.
///
/// Conditions are produced intrinsically by relations or parsed from a
/// submitted filter payload, and combined with [`Condition::and`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Constant(bool),
    /// Property `field` equals `value`. A `null` value matches missing properties.
    Equal { field: String, value: Value },
    /// Property `field`, in string form, equals `value`. Identifiers stored
    /// as numbers or strings compare alike.
    IdEqual { field: String, value: String },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub const TRUE: Condition = Condition::Constant(true);

    pub fn equal(field: impl Into<String>, value: Value) -> Self {
        Self::Equal {
            field: field.into(),
            value,
        }
    }

    pub fn id_equal(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::IdEqual {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Logical AND; `Constant(true)` is the identity and nested ANDs are flattened.
    pub fn and(self, other: Condition) -> Condition {
        match (self, other) {
            (Self::Constant(true), c) | (c, Self::Constant(true)) => c,
            (Self::Constant(false), _) | (_, Self::Constant(false)) => Self::Constant(false),
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), c) => {
                left.push(c);
                Self::And(left)
            }
            (c, Self::And(mut right)) => {
                right.insert(0, c);
                Self::And(right)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Conjunction of all conditions; empty input yields `TRUE`.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Condition {
        conditions.into_iter().fold(Self::TRUE, Self::and)
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Self::Constant(true))
    }

    /// Evaluates this condition against a JSON object value.
    pub fn evaluate(&self, value: &Value) -> bool {
        match self {
            Self::Constant(b) => *b,
            Self::Equal { field, value: expected } => {
                let actual = value.get(field).unwrap_or(&Value::Null);
                values_equal(actual, expected)
            }
            Self::IdEqual { field, value: expected } => {
                id_string(value.get(field)).is_some_and(|actual| actual == *expected)
            }
            Self::And(conditions) => conditions.iter().all(|c| c.evaluate(value)),
            Self::Or(conditions) => conditions.iter().any(|c| c.evaluate(value)),
            Self::Not(inner) => !inner.evaluate(value),
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::TRUE
    }
}

// Numbers compare by value so that `1` and `1.0` match.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
