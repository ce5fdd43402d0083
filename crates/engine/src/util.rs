//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same rules.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Trim a required text field, rejecting empty values and values longer than
/// `max` characters.
pub(crate) fn normalize_required(value: &str, label: &str, max: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    if trimmed.chars().count() > max {
        return Err(EngineError::InvalidInput(format!(
            "{label} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Collapse whitespace in a category display name.
pub(crate) fn normalize_category_display(input: &str) -> ResultEngine<String> {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngineError::InvalidInput(
            "category name must not be empty".to_string(),
        ));
    }
    if collapsed.chars().count() > 255 {
        return Err(EngineError::InvalidInput(
            "category name must be at most 255 characters".to_string(),
        ));
    }
    Ok(collapsed)
}

/// Comparison key for category names: compatibility decomposition, accents
/// stripped, lowercase, punctuation collapsed to single spaces.
///
/// `"Food & Dining"` and `"food dining"` share the key `"food dining"`.
pub(crate) fn normalize_category_key(input: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim_end();
    if normalized.is_empty() {
        return Err(EngineError::InvalidInput(
            "category name must contain letters or digits".to_string(),
        ));
    }
    Ok(normalized.to_string())
}

/// Validate a `#RRGGBB` color and return it uppercased.
pub(crate) fn parse_color(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    let valid = trimmed.len() == 7
        && trimmed.starts_with('#')
        && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(EngineError::InvalidInput(format!(
            "invalid color: {value}"
        )));
    }
    Ok(trimmed.to_ascii_uppercase())
}
