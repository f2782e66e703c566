//! Sequential page collection over cursor-based queries.
//!
//! The cursor is an opaque resume token threaded from one fetch into the
//! next as a plain value, keeping per-step error propagation explicit.
//! Pagination is strictly sequential: page N+1 needs page N's cursor, so
//! there is no concurrent fan-out.

use crate::error::Result;

/// One page of a paginated query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    /// A final page holding everything (no continuation).
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            has_next: false,
            cursor: None,
        }
    }
}

/// Walk every page, lazily keeping matching items.
///
/// Calls `fetch` with no cursor first, then with each returned cursor
/// while `has_next` holds. Order is preserved within and across pages.
///
/// # Errors
///
/// Any fetch error aborts immediately; no partial result is exposed.
pub fn collect_pages<T, F, K>(mut fetch: F, mut keep: K) -> Result<Vec<T>>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
    K: FnMut(&T) -> bool,
{
    let mut collected = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = fetch(cursor.as_deref())?;
        collected.extend(page.items.into_iter().filter(|item| keep(item)));
        if !page.has_next {
            return Ok(collected);
        }
        cursor = page.cursor;
    }
}
