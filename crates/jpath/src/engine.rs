//! Evaluates a parsed `JsonPath` against a `serde_json::Value`.
use super::ast::{CompareOp, FilterExpr, FilterQuery, JsonPath, Operand, PathSegment};
use serde_json::Value;

/// A value selected by a path, together with its location in the queried document.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'v> {
    /// RFC 6901 pointer from the queried value to this match.
    pub pointer: String,
    pub value: &'v Value,
}

/// Selects every value matched by `path`, in document order.
pub fn select<'v>(path: &JsonPath, context: &'v Value) -> Vec<Match<'v>> {
    select_from(path, context, context)
}

/// `root` is what `$` refers to inside filters.
fn select_from<'v>(path: &JsonPath, start: &'v Value, root: &'v Value) -> Vec<Match<'v>> {
    let mut current = vec![Match {
        pointer: String::new(),
        value: start,
    }];

    for segment in &path.segments {
        let mut next = Vec::new();
        for m in &current {
            apply_segment(segment, m, root, &mut next);
        }
        current = next;
        if current.is_empty() {
            break;
        }
    }
    current
}

fn apply_segment<'v>(segment: &PathSegment, m: &Match<'v>, root: &'v Value, out: &mut Vec<Match<'v>>) {
    match segment {
        PathSegment::Root => out.push(m.clone()),
        PathSegment::Key(key) => {
            if let Some(child) = m.value.as_object().and_then(|obj| obj.get(key)) {
                out.push(child_match(m, key, child));
            }
        }
        PathSegment::Index(i) => {
            if let Some(arr) = m.value.as_array() {
                if let Some(at) = normalize_index(*i, arr.len()) {
                    out.push(child_match(m, &at.to_string(), &arr[at]));
                }
            }
        }
        PathSegment::Wildcard => push_children(m, out),
        PathSegment::Slice { start, end, step } => {
            if let Some(arr) = m.value.as_array() {
                for at in slice_indices(*start, *end, *step, arr.len()) {
                    out.push(child_match(m, &at.to_string(), &arr[at]));
                }
            }
        }
        PathSegment::Union(selectors) => {
            for selector in selectors {
                apply_segment(selector, m, root, out);
            }
        }
        PathSegment::Filter(expr) => {
            let mut children = Vec::new();
            push_children(m, &mut children);
            out.extend(
                children
                    .into_iter()
                    .filter(|child| filter_holds(expr, child.value, root)),
            );
        }
        PathSegment::RecursiveKey(key) => {
            for node in self_and_descendants(m) {
                if let Some(child) = node.value.as_object().and_then(|obj| obj.get(key)) {
                    out.push(child_match(&node, key, child));
                }
            }
        }
        PathSegment::RecursiveWildcard => {
            out.extend(self_and_descendants(m).into_iter().skip(1));
        }
        PathSegment::RecursiveSelect(inner) => {
            for node in self_and_descendants(m) {
                apply_segment(inner, &node, root, out);
            }
        }
    }
}

/// Negative indices count back from the end of the array.
fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let at = if index < 0 {
        i64::try_from(len).ok()? + index
    } else {
        index
    };
    usize::try_from(at).ok().filter(|&at| at < len)
}

/// Array positions selected by `[start:end:step]`, in selection order.
fn slice_indices(start: Option<i64>, end: Option<i64>, step: Option<i64>, len: usize) -> Vec<usize> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let step = step.unwrap_or(1);
    let normalize = |i: i64| if i < 0 { len + i } else { i };

    let mut indices = Vec::new();
    if step > 0 {
        let lower = start.map_or(0, normalize).clamp(0, len);
        let upper = end.map_or(len, normalize).clamp(0, len);
        let mut i = lower;
        while i < upper {
            indices.extend(usize::try_from(i).ok());
            i += step;
        }
    } else if step < 0 {
        let upper = start.map_or(len - 1, normalize).clamp(-1, len - 1);
        let lower = end.map_or(-len - 1, normalize).clamp(-1, len - 1);
        let mut i = upper;
        while lower < i {
            indices.extend(usize::try_from(i).ok());
            i += step;
        }
    }
    indices
}

fn filter_holds(expr: &FilterExpr, current: &Value, root: &Value) -> bool {
    match expr {
        FilterExpr::Or(left, right) => {
            filter_holds(left, current, root) || filter_holds(right, current, root)
        }
        FilterExpr::And(left, right) => {
            filter_holds(left, current, root) && filter_holds(right, current, root)
        }
        FilterExpr::Not(inner) => !filter_holds(inner, current, root),
        FilterExpr::Exists(query) => !run_query(query, current, root).is_empty(),
        FilterExpr::Compare { left, op, right } => compare(
            operand_value(left, current, root),
            *op,
            operand_value(right, current, root),
        ),
    }
}

fn run_query<'v>(query: &FilterQuery, current: &'v Value, root: &'v Value) -> Vec<Match<'v>> {
    match query {
        FilterQuery::Current(path) => select_from(path, current, root),
        FilterQuery::Root(path) => select_from(path, root, root),
    }
}

/// A query operand only has a value when it selects exactly one node.
fn operand_value<'a>(operand: &'a Operand, current: &'a Value, root: &'a Value) -> Option<&'a Value> {
    match operand {
        Operand::Literal(value) => Some(value),
        Operand::Query(query) => match run_query(query, current, root).as_slice() {
            [only] => Some(only.value),
            _ => None,
        },
    }
}

fn compare(left: Option<&Value>, op: CompareOp, right: Option<&Value>) -> bool {
    match op {
        CompareOp::Eq => equal(left, right),
        CompareOp::Ne => !equal(left, right),
        CompareOp::Lt => less(left, right),
        CompareOp::Le => less(left, right) || equal(left, right),
        CompareOp::Gt => less(right, left),
        CompareOp::Ge => less(right, left) || equal(left, right),
    }
}

/// Numbers compare by value, so `1` equals `1.0`. Two empty operands are equal.
fn equal(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a.as_f64() == b.as_f64(),
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Only numbers and strings are ordered.
fn less(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            matches!((a.as_f64(), b.as_f64()), (Some(a), Some(b)) if a < b)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a < b,
        _ => false,
    }
}

fn push_children<'v>(m: &Match<'v>, out: &mut Vec<Match<'v>>) {
    match m.value {
        Value::Object(obj) => {
            for (key, child) in obj {
                out.push(child_match(m, key, child));
            }
        }
        Value::Array(arr) => {
            for (i, child) in arr.iter().enumerate() {
                out.push(child_match(m, &i.to_string(), child));
            }
        }
        _ => {}
    }
}

/// Pre-order walk, so the result is in document order.
fn self_and_descendants<'v>(m: &Match<'v>) -> Vec<Match<'v>> {
    let mut stack = vec![m.clone()];
    let mut visited = Vec::new();
    while let Some(node) = stack.pop() {
        let mut children = Vec::new();
        push_children(&node, &mut children);
        visited.push(node);
        stack.extend(children.into_iter().rev());
    }
    visited
}

fn child_match<'v>(parent: &Match<'v>, token: &str, value: &'v Value) -> Match<'v> {
    let escaped = token.replace('~', "~0").replace('/', "~1");
    Match {
        pointer: format!("{}/{}", parent.pointer, escaped),
        value,
    }
}
