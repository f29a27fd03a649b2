//! Cache-control policy for clinic data responses.

/// Patient and clinic data must never be served from a shared cache.
pub const PRIVATE_NO_STORE: &str = "private, no-store";

/// Build the cache-control header tuple applied to every API response.
pub const fn private_no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_STORE)
}
