//! Defines the Abstract Syntax Tree (AST) for JPath selections.
use serde_json::Value;

/// Represents a single step in a JPath selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// The document root (`$`). Only valid as the first segment.
    Root,
    /// An object key (e.g., `.name` or `['name']`).
    Key(String),
    /// An array index (e.g., `[0]`). Negative indices count from the end.
    Index(i64),
    /// All immediate children (`*`, `.*` or `[*]`).
    Wildcard,
    /// An array slice, `[start:end:step]`. Missing bounds take their defaults.
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
    /// Several selectors in one bracket (e.g., `[0,2]` or `['a','b']`).
    /// Results keep the order of the selectors.
    Union(Vec<PathSegment>),
    /// Children for which the expression holds (`[?(@.qty > 1)]`).
    Filter(FilterExpr),
    /// A key looked up at any depth (`..name`).
    RecursiveKey(String),
    /// Every descendant (`..*`).
    RecursiveWildcard,
    /// A bracket selector applied at every depth (`..[0]`, `..[?(@.id)]`).
    RecursiveSelect(Box<PathSegment>),
}

/// The boolean expression inside a filter selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    Or(Box<FilterExpr>, Box<FilterExpr>),
    And(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
    /// True when the query selects at least one value.
    Exists(FilterQuery),
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A path inside a filter, relative to the current item (`@`) or the queried value (`$`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterQuery {
    Current(JsonPath),
    Root(JsonPath),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Query(FilterQuery),
    Literal(Value),
}

/// A parsed path, evaluated segment by segment from the context value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    pub segments: Vec<PathSegment>,
}
