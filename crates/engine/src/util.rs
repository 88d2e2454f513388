//! Internal helpers for name validation.
//!
//! These utilities are **not** part of the public API. They centralize the
//! name normalization so that writes and lookups agree on what a name is.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Canonical form used both for storing and for matching names: trimmed and
/// NFC-composed, case preserved.
pub(crate) fn name_key(value: &str) -> String {
    value.trim().nfc().collect()
}

/// Normalize a user supplied name, rejecting empty ones.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let normalized = name_key(value);
    if normalized.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(normalized)
}
