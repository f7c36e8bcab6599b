//! A small, JSON-native path engine.
//!
//! Paths follow the familiar dotted/bracketed form (`$.orders[0].id`,
//! `store..price`, `['first name']`, `*`) with negative indices, slices
//! (`[1:-1:2]`), unions (`[0,2]`) and filters (`[?(@.qty > 1 && @.sku)]`).
//! They are evaluated against a `serde_json::Value`, yielding every match
//! together with a JSON pointer to it.

pub mod ast;
pub mod engine;
pub mod error;
mod parser;

// --- Public API ---
pub use ast::{CompareOp, FilterExpr, FilterQuery, JsonPath, Operand, PathSegment};
pub use engine::{Match, select};
pub use error::JPathError;
pub use parser::parse_path;

/// Parses `expression` and selects its matches from `context`.
pub fn select_str<'v>(expression: &str, context: &'v serde_json::Value) -> Result<Vec<Match<'v>>, JPathError> {
    let path = parse_path(expression)?;
    let matches = select(&path, context);
    log::trace!("JPath '{}' matched {} value(s)", expression, matches.len());
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_str_simple_path() {
        let data = json!({ "customer": { "name": "ACME" } });
        let matches = select_str("customer.name", &data).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value, &json!("ACME"));
    }

    #[test]
    fn test_select_str_filter_then_child() {
        let data = json!({ "items": [ { "id": 1, "n": "a" }, { "id": 2, "n": "b" } ] });
        let matches = select_str("$.items[?(@.id==2)].n", &data).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value, &json!("b"));
        assert_eq!(matches[0].pointer, "/items/1/n");
    }

    #[test]
    fn test_select_str_propagates_parse_errors() {
        let data = json!({});
        assert!(select_str("a[", &data).is_err());
    }
}
