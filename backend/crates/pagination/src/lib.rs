//! Opaque cursor and page envelope primitives shared by list endpoints.
//!
//! Cursors wrap a serialisable key (for example `(created_at, id)`) as
//! URL-safe base64 JSON so clients treat them as opaque tokens. Page limits
//! are clamped to a configured ceiling before they reach persistence
//! adapters.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default number of items returned when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: usize = 20;
/// Largest page size any endpoint will honour.
pub const MAX_LIMIT: usize = 100;

/// Errors raised while decoding a client-supplied cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The token is not valid URL-safe base64.
    #[error("cursor is not valid base64")]
    Encoding,
    /// The decoded payload does not match the expected key shape.
    #[error("cursor payload is malformed")]
    Payload,
}

/// Opaque pagination cursor carrying the key of the last item on a page.
///
/// # Examples
/// ```
/// use pagination::Cursor;
///
/// let cursor = Cursor::new((42_u32, "b".to_owned()));
/// let token = cursor.encode().expect("encode");
/// let decoded: Cursor<(u32, String)> = Cursor::decode(&token).expect("decode");
/// assert_eq!(decoded.key(), &(42, "b".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap a key into a cursor.
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the wrapped key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Consume the cursor and return its key.
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode the cursor as an opaque URL-safe token.
    ///
    /// # Errors
    /// Returns [`CursorError::Payload`] when the key cannot be serialised.
    pub fn encode(&self) -> Result<String, CursorError> {
        let json = serde_json::to_vec(&self.key).map_err(|_| CursorError::Payload)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode a token produced by [`Cursor::encode`].
    ///
    /// # Errors
    /// Returns [`CursorError::Encoding`] for invalid base64 and
    /// [`CursorError::Payload`] when the JSON does not match `K`.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| CursorError::Encoding)?;
        let key = serde_json::from_slice(&bytes).map_err(|_| CursorError::Payload)?;
        Ok(Self { key })
    }
}

/// Validated page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit(usize);

impl PageLimit {
    /// Clamp a requested limit into `1..=MAX_LIMIT`, defaulting when absent.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageLimit, DEFAULT_LIMIT, MAX_LIMIT};
    ///
    /// assert_eq!(PageLimit::clamped(None).get(), DEFAULT_LIMIT);
    /// assert_eq!(PageLimit::clamped(Some(0)).get(), 1);
    /// assert_eq!(PageLimit::clamped(Some(10_000)).get(), MAX_LIMIT);
    /// ```
    pub fn clamped(requested: Option<usize>) -> Self {
        Self(requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT))
    }

    /// Return the page size.
    pub const fn get(self) -> usize {
        self.0
    }

    /// Number of rows adapters should fetch to detect a following page.
    pub const fn fetch_size(self) -> usize {
        self.0.saturating_add(1)
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

/// One page of results plus the cursor for the next page, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in the order returned by the adapter.
    pub items: Vec<T>,
    /// Opaque token for the following page; absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with [`PageLimit::fetch_size`].
    ///
    /// When the adapter returned more rows than the limit, the surplus row is
    /// dropped and `key_of` derives the cursor from the last kept item.
    ///
    /// # Errors
    /// Propagates [`CursorError`] when the cursor key cannot be encoded.
    pub fn from_rows<K, F>(mut rows: Vec<T>, limit: PageLimit, key_of: F) -> Result<Self, CursorError>
    where
        K: Serialize,
        F: Fn(&T) -> K,
    {
        let has_more = rows.len() > limit.get();
        rows.truncate(limit.get());
        let next_cursor = match (has_more, rows.last()) {
            (true, Some(last)) => Some(Cursor::new(key_of(last)).encode()?),
            _ => None,
        };
        Ok(Self {
            items: rows,
            next_cursor,
        })
    }

    /// Transform the page items while keeping the cursor.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cursor encoding and page assembly.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("!!!", CursorError::Encoding)]
    #[case("bm90LWpzb24", CursorError::Payload)]
    fn decode_rejects_malformed_tokens(#[case] token: &str, #[case] expected: CursorError) {
        let result = Cursor::<(u32, String)>::decode(token);
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    fn page_sets_cursor_only_when_more_rows_exist() {
        let limit = PageLimit::clamped(Some(2));
        let page = Page::from_rows(vec![1_u32, 2, 3], limit, |n| *n).expect("page");
        assert_eq!(page.items, vec![1, 2]);
        let token = page.next_cursor.expect("cursor present");
        let cursor: Cursor<u32> = Cursor::decode(&token).expect("decode");
        assert_eq!(cursor.into_key(), 2);

        let last = Page::from_rows(vec![1_u32, 2], limit, |n| *n).expect("page");
        assert!(last.next_cursor.is_none());
    }

    #[rstest]
    fn fetch_size_requests_one_extra_row() {
        assert_eq!(PageLimit::clamped(Some(5)).fetch_size(), 6);
    }
}
