//! Wire shape of paginated responses and the cursor echoed back on requests.
//!
//! The backend answers every list endpoint with
//!
//! ```json
//! { "metadata": { "start": "c1", "end": "c2", "total": 42 }, "data": [ ... ] }
//! ```
//!
//! `start`/`end` are opaque tokens. A missing or `null` `end` means there is
//! no further page.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, server-issued page boundary token.
///
/// Stored and replayed verbatim; never parsed or compared for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Page window bounds and the server's running total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub start: Cursor,
    #[serde(default)]
    pub end: Option<Cursor>,
    #[serde(default)]
    pub total: u64,
}

/// One page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub metadata: PageMetadata,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Whether the server signalled more pages after this one.
    pub fn has_more(&self) -> bool {
        self.metadata.end.is_some()
    }
}

/// Parameters for the next page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Cursor to resume from; `None` requests the first page.
    pub cursor: Option<Cursor>,
    pub limit: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self {
            cursor: None,
            limit,
        }
    }

    /// Query pairs for the request URL. The cursor travels as `start`.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string())];
        if let Some(cursor) = &self.cursor {
            pairs.push(("start", cursor.as_str().to_string()));
        }
        pairs
    }
}
