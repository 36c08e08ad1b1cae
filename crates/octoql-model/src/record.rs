use serde_json::Value;

/// A runtime value flowing through the schema.
///
/// `origin` names the collection a value was loaded from when it came through
/// a global identifier lookup. Values obtained any other way carry no origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub data: Value,
    pub origin: Option<String>,
}

impl Record {
    pub fn new(data: Value) -> Self {
        Self { data, origin: None }
    }

    pub fn with_origin(mut self, collection: impl Into<String>) -> Self {
        self.origin = Some(collection.into());
        self
    }
}

impl From<Value> for Record {
    fn from(data: Value) -> Self {
        Self::new(data)
    }
}
