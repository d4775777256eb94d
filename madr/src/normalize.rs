//! Field-level input normalization
//!
//! Both normalizers are pure and idempotent. They run before validation so
//! uniqueness is enforced on the canonical form of a value.

/// Lowercase, collapse whitespace runs to one space and trim.
///
/// Used for novelist names and book titles.
pub fn normalize_free_text(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase and keep only alphanumerics and `_`.
///
/// Used for usernames. Lowercasing happens first because some characters
/// lowercase into more than one code point.
pub fn normalize_identifier(input: &str) -> String {
    input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}
