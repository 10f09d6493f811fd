use crate::identifier::CustomerIdentifier;

pub const FEED_OBJECT_EXTENSION: &str = ".json";

/// Object key for one customer's feed result.
///
/// The key depends only on the raw identifier; feeds are told apart by their
/// destination bucket, never by key.
pub fn feed_object_key(base_prefix: &str, gdun: &CustomerIdentifier) -> String {
    let trimmed = base_prefix.trim_matches('/');
    if trimmed.is_empty() {
        format!("{gdun}{FEED_OBJECT_EXTENSION}")
    } else {
        format!("{trimmed}/{gdun}{FEED_OBJECT_EXTENSION}")
    }
}
