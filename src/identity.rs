// 🪪 Identity Normalizer
// "Alice", " alice ", "ALICE" → one person, key "alice".
// The display name is whatever casing was registered first.

use crate::error::{LedgerError, LedgerResult};
use regex::Regex;
use std::sync::LazyLock;

// Literal patterns: `Regex::new` can only fail on a malformed pattern, which
// `test_name_patterns_compile` rules out.
static PERSON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z_ -]{0,31}$").expect("static pattern"));

static GROUP_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z_-]{0,31}$").expect("static pattern"));

/// Canonical identity key: trimmed, lowercased
pub fn canonicalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validate a person's display name and return it trimmed
///
/// Starts with a letter; then letters, space, hyphen or underscore; 1-32 chars.
pub fn validate_person_name(name: &str) -> LedgerResult<String> {
    let display = name.trim();
    if !PERSON_NAME.is_match(display) {
        return Err(LedgerError::InvalidName {
            name: display.to_string(),
            reason: "person name must start with a letter, contain only letters, spaces, '-' or '_', and be 1-32 chars long",
        });
    }
    Ok(display.to_string())
}

/// Validate a group name and return it trimmed (no spaces allowed)
pub fn validate_group_name(name: &str) -> LedgerResult<String> {
    let display = name.trim();
    if !GROUP_NAME.is_match(display) {
        return Err(LedgerError::InvalidName {
            name: display.to_string(),
            reason: "group name must start with a letter, contain only letters, '-' or '_', and be 1-32 chars long",
        });
    }
    Ok(display.to_string())
}

/// Sort display names case-insensitively (stable for equal keys)
pub fn sort_case_insensitive(names: &mut [String]) {
    names.sort_by_cached_key(|name| name.to_lowercase());
}
