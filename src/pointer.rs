//! Schema navigation by data pointer
//!
//! Maps a pointer taken from a data document onto the schema node that
//! describes the value at that location. Numeric segments step into
//! `items`; every other segment steps into `properties[segment]`.
//!
//! Only single-schema `items` is understood. For tuple-typed arrays
//! (`items` is a list) the list itself is returned, which carries no
//! annotations. Segments are used verbatim: keys containing `/` cannot be
//! addressed.

use serde_json::Value;

use crate::error::PointerError;

/// Find the sub-schema describing the value at `pointer`
pub fn resolve_schema_at_pointer<'a>(
    schema: &'a Value,
    pointer: &str,
) -> Result<&'a Value, PointerError> {
    let mut node = schema;

    for segment in pointer.split('/').skip(1) {
        let next = if is_index(segment) {
            node.get("items")
        } else {
            node.get("properties").and_then(|properties| properties.get(segment))
        };

        node = next.ok_or_else(|| PointerError::NotFound {
            pointer: pointer.to_string(),
            segment: segment.to_string(),
        })?;
    }

    Ok(node)
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}
