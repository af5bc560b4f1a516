//! Parsing of the export's multi-value list fields.
//!
//! The export writes list-valued columns as brace literals such as
//! `{Action,RPG}`. Parsing keeps the tokens exactly as written between the
//! commas: only the outer envelope of braces and spaces is removed, so
//! `{Action, RPG}` yields `"Action"` and `" RPG"`.
//!
//! An empty or blank token ends the list. `{Action,,RPG}` yields only
//! `"Action"`; anything after the blank token is dropped. Existing catalogs
//! were built this way, so the behavior is kept as is.

use crate::error::{Error, Result};
use crate::model::Dimension;

fn is_envelope(c: char) -> bool {
    matches!(c, '{' | '}' | ' ')
}

/// Split a raw multi-value field into its values, in source order.
///
/// Missing, empty, and `{}` inputs produce no values.
///
/// # Errors
///
/// Returns [`Error::MalformedField`] when the field opens a brace without
/// closing it, or closes one it never opened.
pub fn parse_multivalue(raw: Option<&str>) -> Result<Vec<String>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    match (trimmed.starts_with('{'), trimmed.ends_with('}')) {
        (true, false) => {
            return Err(Error::MalformedField {
                value: raw.to_string(),
                reason: "unterminated brace",
            });
        }
        (false, true) => {
            return Err(Error::MalformedField {
                value: raw.to_string(),
                reason: "closing brace without opening brace",
            });
        }
        _ => {}
    }

    let body = trimmed.trim_matches(is_envelope);

    let mut values = Vec::new();
    for token in body.split(',') {
        if token.trim().is_empty() {
            break;
        }
        values.push(token.to_string());
    }

    Ok(values)
}

/// Parse the source field for `dimension`.
///
/// Region cells without any brace are read as having no regions and are not
/// parsed further. Every other dimension goes straight to
/// [`parse_multivalue`].
///
/// # Errors
///
/// Propagates [`Error::MalformedField`] from [`parse_multivalue`].
pub fn parse_dimension_field(dimension: Dimension, raw: Option<&str>) -> Result<Vec<String>> {
    match raw {
        Some(value) if dimension.requires_braces() && !value.contains('{') => {
            log::debug!("Ignoring unbraced {dimension} field {value:?}");
            Ok(Vec::new())
        }
        _ => parse_multivalue(raw),
    }
}
