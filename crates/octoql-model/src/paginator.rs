//! Pagination capability consumed by connection fields.
//!
//! The schema layer never pages data itself: it hands a [`Condition`] and a
//! [`PageRequest`] to the collection's [`Paginator`] and exposes the returned
//! [`Page`]. Cursor format, ordering and page-size policy belong to the
//! implementation.

use async_trait::async_trait;

use crate::condition::Condition;
use crate::error::{ModelError, Result};
use crate::record::Record;

/// Relay-style page window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub first: Option<usize>,
    pub last: Option<usize>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_first(mut self, first: usize) -> Self {
        self.first = Some(first);
        self
    }

    pub fn with_last(mut self, last: usize) -> Self {
        self.last = Some(last);
        self
    }

    pub fn with_after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn with_before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Converts signed client-supplied limits, rejecting negative values.
    pub fn limit_from_i64(name: &str, value: Option<i64>) -> Result<Option<usize>> {
        match value {
            None => Ok(None),
            Some(n) if n < 0 => Err(ModelError::InvalidPageRequest(format!(
                "'{name}' must not be negative (got {n})"
            ))),
            Some(n) => usize::try_from(n)
                .map(Some)
                .map_err(|_| ModelError::InvalidPageRequest(format!("'{name}' is too large"))),
        }
    }
}

/// One value in a page plus the cursor pointing at it.
#[derive(Debug, Clone)]
pub struct PageEntry {
    pub cursor: String,
    pub record: Record,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub entries: Vec<PageEntry>,
    pub info: PageInfo,
    pub total_count: Option<usize>,
}

/// A collection capability that reads condition-scoped pages.
#[async_trait]
pub trait Paginator: Send + Sync {
    /// Whether connection fields may be built on top of this paginator.
    fn has_connection_support(&self) -> bool {
        true
    }

    /// Reads one page of values matching `condition`.
    async fn read_page(&self, condition: &Condition, request: &PageRequest) -> Result<Page>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_from_i64() {
        assert_eq!(PageRequest::limit_from_i64("first", None).unwrap(), None);
        assert_eq!(PageRequest::limit_from_i64("first", Some(5)).unwrap(), Some(5));
        assert!(matches!(
            PageRequest::limit_from_i64("last", Some(-1)),
            Err(ModelError::InvalidPageRequest(_))
        ));
    }

    #[test]
    fn test_builder() {
        let request = PageRequest::new().with_first(10).with_after("abc");
        assert_eq!(request.first, Some(10));
        assert_eq!(request.after.as_deref(), Some("abc"));
        assert!(request.last.is_none());
    }
}
