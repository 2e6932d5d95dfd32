//! Expression-based bulk deletion: match-type enumeration.

/// The predicate used by `delete_all(match_type, expression)`.
///
/// Every variant except `StartsWith` compares against the key's serialized
/// string form; `StartsWith` compares raw bytes so it can be answered
/// without a key serializer in the common case of byte-string keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// Byte-wise prefix match against the key's raw bytes.
    StartsWith,
    /// Substring match against the key's serialized string form.
    Contains,
    /// Suffix match against the key's serialized string form.
    EndsWith,
    /// Regular-expression match against the key's serialized string form.
    Regex,
    /// Evaluate an external expression-language predicate against a
    /// `{ key = string_form }` binding.
    ///
    /// No expression-evaluator crate is available, so this variant always
    /// fails with `StoreError::Unsupported` rather than silently matching
    /// nothing.
    ElExpression,
}
