//! Key serializer: the externally-supplied capability expression-based
//! deletion depends on.

/// Converts a key to the string/byte forms expression-based deletion
/// matches against.
///
/// Deliberately not required by [`crate::InMemoryEngine::new`] — a store
/// with no registered serializer simply fails expression deletes with
/// [`vkv_core::StoreError::Unsupported`] rather than refusing to start.
pub trait KeySerializer<K>: Send + Sync {
    /// String form used by `CONTAINS` / `ENDS_WITH` / `REGEX`.
    fn serialize(&self, key: &K) -> String;

    /// Raw byte form used by `STARTS_WITH`.
    fn raw_bytes(&self, key: &K) -> Vec<u8>;
}

/// A [`KeySerializer`] for any key already representable as `String` via
/// `ToString` / `From<String>`-free `AsRef<str>` — the common case of
/// string-keyed stores.
pub struct StringKeySerializer;

impl<K: AsRef<str>> KeySerializer<K> for StringKeySerializer {
    fn serialize(&self, key: &K) -> String {
        key.as_ref().to_string()
    }

    fn raw_bytes(&self, key: &K) -> Vec<u8> {
        key.as_ref().as_bytes().to_vec()
    }
}
