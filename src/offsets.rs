//! Layer offset correction files (`interface/portrait_offsets/*.txt`)
//!
//! Each entry maps a sprite name to a pixel offset. Both the positional form
//! `GFX_name = { 3 -2 }` and the named form `GFX_name = { x = 3 y = -2 }`
//! are read; entries may be wrapped in an outer group.

use crate::models::Offset;
use crate::parser::{parse_document, Node, ParseError, Value};

/// Offset entries of one file, in declaration order.
pub fn parse_offsets(source: &str) -> Result<Vec<(String, Offset)>, ParseError> {
    let nodes = parse_document(source)?;
    let mut entries = Vec::new();
    collect(&nodes, &mut entries);
    Ok(entries)
}

fn collect(nodes: &[Node], entries: &mut Vec<(String, Offset)>) {
    for node in nodes {
        let (Some(key), Value::Group(children)) = (&node.key, &node.value) else {
            continue;
        };
        match offset_of(children) {
            Some(offset) => entries.push((key.clone(), offset)),
            None => collect(children, entries),
        }
    }
}

fn offset_of(children: &[Node]) -> Option<Offset> {
    let positional: Vec<i32> = children
        .iter()
        .filter(|c| c.key.is_none())
        .filter_map(|c| c.value.as_int())
        .filter_map(|n| i32::try_from(n).ok())
        .collect();
    if positional.len() == 2 && children.len() == 2 {
        return Some(Offset::new(positional[0], positional[1]));
    }

    let named = |axis: &str| {
        children
            .iter()
            .find(|c| c.is_ignore_case(axis))
            .and_then(|c| c.value.as_int())
            .and_then(|n| i32::try_from(n).ok())
    };
    match (named("x"), named("y")) {
        (Some(x), Some(y)) => Some(Offset::new(x, y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_offsets() {
        let entries = parse_offsets("GFX_a = { 3 -2 }\nGFX_b = { 0 10 }").unwrap();
        assert_eq!(
            entries,
            vec![("GFX_a".to_string(), Offset::new(3, -2)), ("GFX_b".to_string(), Offset::new(0, 10))]
        );
    }

    #[test]
    fn test_named_offsets_in_wrapper() {
        let source = "# corrections\nportrait_offsets = {\n  GFX_hat = { x = 1 y = 5 }\n}\n";
        assert_eq!(parse_offsets(source).unwrap(), vec![("GFX_hat".to_string(), Offset::new(1, 5))]);
    }

    #[test]
    fn test_malformed_entries_ignored() {
        let entries = parse_offsets("GFX_a = { 1 }\nGFX_b = { 1 2 3 }\nGFX_c = 4\nGFX_d = { 7 8 }").unwrap();
        assert_eq!(entries, vec![("GFX_d".to_string(), Offset::new(7, 8))]);
    }

    #[test]
    fn test_syntax_error_propagates() {
        assert!(parse_offsets("GFX_a = { 1 2").is_err());
    }
}
