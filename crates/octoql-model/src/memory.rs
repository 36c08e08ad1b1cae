//! In-memory table implementing [`Paginator`] and [`RecordReader`].
//!
//! Rows are kept in insertion order. Cursors encode the row's position within
//! the condition-filtered result as URL-safe base64 JSON.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::collection::RecordReader;
use crate::condition::Condition;
use crate::error::{ModelError, Result};
use crate::paginator::{Page, PageEntry, PageInfo, PageRequest, Paginator};
use crate::record::Record;

/// Cursor encoding/decoding utilities.
mod cursor {
    use base64::Engine;
    use serde::{Deserialize, Serialize};

    /// Cursor data encoded in the cursor string.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CursorData {
        /// Position in the filtered result set.
        pub offset: usize,
    }

    impl CursorData {
        pub fn new(offset: usize) -> Self {
            Self { offset }
        }

        /// Encode cursor data to a base64 string.
        pub fn encode(&self) -> String {
            let json = serde_json::to_string(self).unwrap_or_default();
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
        }

        /// Decode cursor data from a base64 string.
        pub fn decode(cursor: &str) -> Option<Self> {
            let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
                .decode(cursor)
                .ok()?;
            let json = String::from_utf8(bytes).ok()?;
            serde_json::from_str(&json).ok()
        }
    }
}

use cursor::CursorData;

/// Rows of one collection held in memory.
#[derive(Debug)]
pub struct MemoryTable {
    key_fields: Vec<String>,
    rows: RwLock<Vec<Value>>,
}

impl MemoryTable {
    pub fn new(key_fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            key_fields: key_fields.into_iter().map(Into::into).collect(),
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(self, rows: impl IntoIterator<Item = Value>) -> Self {
        let rows = rows.into_iter().collect();
        Self {
            rows: RwLock::new(rows),
            ..self
        }
    }

    pub async fn insert(&self, row: Value) {
        self.rows.write().await.push(row);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn decode_cursor(name: &str, cursor: Option<&String>) -> Result<Option<usize>> {
    cursor
        .map(|c| {
            CursorData::decode(c)
                .map(|data| data.offset)
                .ok_or_else(|| ModelError::InvalidCursor(format!("'{name}' cursor '{c}'")))
        })
        .transpose()
}

#[async_trait]
impl Paginator for MemoryTable {
    async fn read_page(&self, condition: &Condition, request: &PageRequest) -> Result<Page> {
        let rows = self.rows.read().await;
        let matching: Vec<&Value> = rows.iter().filter(|row| condition.evaluate(row)).collect();
        let total = matching.len();

        // Window bounded by after/before, then trimmed by first/last.
        let mut start = match decode_cursor("after", request.after.as_ref())? {
            Some(offset) => offset.saturating_add(1).min(total),
            None => 0,
        };
        let mut end = match decode_cursor("before", request.before.as_ref())? {
            Some(offset) => offset.min(total),
            None => total,
        };
        if end < start {
            end = start;
        }
        if let Some(first) = request.first {
            end = end.min(start.saturating_add(first));
        }
        if let Some(last) = request.last {
            start = start.max(end.saturating_sub(last));
        }

        let entries: Vec<PageEntry> = matching[start..end]
            .iter()
            .enumerate()
            .map(|(i, row)| PageEntry {
                cursor: CursorData::new(start + i).encode(),
                record: Record::new((*row).clone()),
            })
            .collect();

        let info = PageInfo {
            has_next_page: end < total,
            has_previous_page: start > 0,
            start_cursor: entries.first().map(|e| e.cursor.clone()),
            end_cursor: entries.last().map(|e| e.cursor.clone()),
        };

        debug!(
            total = total,
            returned = entries.len(),
            start = start,
            "Read in-memory page"
        );

        Ok(Page {
            entries,
            info,
            total_count: Some(total),
        })
    }
}

#[async_trait]
impl RecordReader for MemoryTable {
    async fn read(&self, key: &[Value]) -> Result<Option<Value>> {
        if key.len() != self.key_fields.len() {
            return Err(ModelError::KeyArity {
                expected: self.key_fields.len(),
                actual: key.len(),
            });
        }
        let condition = Condition::all(
            self.key_fields
                .iter()
                .zip(key)
                .map(|(field, value)| Condition::equal(field.clone(), value.clone())),
        );
        let rows = self.rows.read().await;
        let found = rows.iter().find(|row| condition.evaluate(row)).cloned();
        trace!(found = found.is_some(), "Read in-memory row by key");
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn posts() -> MemoryTable {
        MemoryTable::new(["row_id"]).with_rows((1..=5).map(|i| {
            json!({"row_id": i, "author_id": if i <= 3 { 1 } else { 2 }, "title": format!("Post {i}")})
        }))
    }

    fn titles(page: &Page) -> Vec<String> {
        page.entries
            .iter()
            .map(|e| e.record.data["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_cursor_encode_decode() {
        let encoded = CursorData::new(10).encode();
        assert_eq!(CursorData::decode(&encoded).unwrap().offset, 10);
        assert!(CursorData::decode("not-valid-base64!!!").is_none());
        assert!(CursorData::decode("").is_none());
    }

    #[test]
    fn test_condition_filters_rows() {
        let table = posts();
        let page = tokio_test::block_on(
            table.read_page(&Condition::equal("author_id", json!(1)), &PageRequest::new()),
        )
        .unwrap();
        assert_eq!(titles(&page), ["Post 1", "Post 2", "Post 3"]);
        assert_eq!(page.total_count, Some(3));
        assert!(!page.info.has_next_page);
        assert!(!page.info.has_previous_page);
    }

    #[tokio::test]
    async fn test_first_and_after() {
        let table = posts();
        let first = table
            .read_page(&Condition::TRUE, &PageRequest::new().with_first(2))
            .await
            .unwrap();
        assert_eq!(titles(&first), ["Post 1", "Post 2"]);
        assert!(first.info.has_next_page);

        let cursor = first.info.end_cursor.clone().unwrap();
        let second = table
            .read_page(&Condition::TRUE, &PageRequest::new().with_first(2).with_after(cursor))
            .await
            .unwrap();
        assert_eq!(titles(&second), ["Post 3", "Post 4"]);
        assert!(second.info.has_previous_page);
        assert!(second.info.has_next_page);
    }

    #[tokio::test]
    async fn test_last_and_before() {
        let table = posts();
        let tail = table
            .read_page(&Condition::TRUE, &PageRequest::new().with_last(2))
            .await
            .unwrap();
        assert_eq!(titles(&tail), ["Post 4", "Post 5"]);

        let cursor = tail.info.start_cursor.clone().unwrap();
        let before = table
            .read_page(&Condition::TRUE, &PageRequest::new().with_last(1).with_before(cursor))
            .await
            .unwrap();
        assert_eq!(titles(&before), ["Post 3"]);
    }

    #[tokio::test]
    async fn test_invalid_cursor() {
        let table = posts();
        let err = table
            .read_page(&Condition::TRUE, &PageRequest::new().with_after("garbage"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidCursor(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_cursor_yields_empty_page() {
        let table = posts();
        let cursor = CursorData::new(usize::MAX).encode();
        let page = table
            .read_page(
                &Condition::TRUE,
                &PageRequest::new().with_first(usize::MAX).with_after(cursor),
            )
            .await
            .unwrap();
        assert!(page.entries.is_empty());
        assert_eq!(page.total_count, Some(5));
        assert!(!page.info.has_next_page);
        assert!(page.info.has_previous_page);
    }

    #[tokio::test]
    async fn test_read_by_key() {
        let table = posts();
        let row = table.read(&[json!(4)]).await.unwrap().unwrap();
        assert_eq!(row["title"], "Post 4");
        assert!(table.read(&[json!(99)]).await.unwrap().is_none());
        assert!(table.read(&[]).await.is_err());
    }
}
