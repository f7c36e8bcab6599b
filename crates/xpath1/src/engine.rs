//! The evaluation engine for executing a parsed XPath AST against a generic `DataSourceNode`.

use super::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
use super::{axes, functions, operators};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XPathError;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

/// Represents the possible result types of an XPath expression evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum XPathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: DataSourceNode<'a>> XPathValue<N> {
    /// Coerces the value to a boolean as per XPath 1.0 rules.
    pub fn to_bool(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::Boolean(b) => *b,
        }
    }

    /// Coerces the value to a number as per XPath 1.0 rules.
    pub fn to_number(&self) -> f64 {
        match self {
            XPathValue::Number(n) => *n,
            XPathValue::Boolean(b) => f64::from(u8::from(*b)),
            _ => string_to_number(&self.to_string()),
        }
    }
}

pub(crate) fn string_to_number(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}

/// Formats a number the way XPath `string()` does: integers without a fraction.
pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl<'a, N: DataSourceNode<'a>> fmt::Display for XPathValue<N> {
    /// Coerces the value to a string as per XPath 1.0 rules.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XPathValue::NodeSet(nodes) => write!(
                f,
                "{}",
                nodes.first().map(|n| n.string_value()).unwrap_or_default()
            ),
            XPathValue::String(s) => write!(f, "{}", s),
            XPathValue::Number(n) => write!(f, "{}", number_to_string(*n)),
            XPathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Per-evaluation state: the context node, its document root, and the
/// context position/size used by `position()` and `last()`.
pub struct EvaluationContext<'a, N: DataSourceNode<'a>> {
    pub context_node: N,
    pub root_node: N,
    pub context_position: usize, // 1-based
    pub context_size: usize,
    _marker: PhantomData<&'a ()>,
}

impl<'a, N: DataSourceNode<'a>> EvaluationContext<'a, N> {
    /// Creates a context for `node`, locating the root by walking up its parents.
    pub fn new(node: N) -> Self {
        let mut root = node;
        while let Some(parent) = root.parent() {
            root = parent;
        }
        Self::at(node, root, 1, 1)
    }

    fn at(context_node: N, root_node: N, context_position: usize, context_size: usize) -> Self {
        Self {
            context_node,
            root_node,
            context_position,
            context_size,
            _marker: PhantomData,
        }
    }
}

/// Evaluates a compiled expression and returns a concrete `XPathValue`.
pub fn evaluate<'a, N>(
    expr: &Expression,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(XPathValue::String(s.clone())),
        Expression::Number(n) => Ok(XPathValue::Number(*n)),
        Expression::LocationPath(path) => Ok(XPathValue::NodeSet(evaluate_location_path(path, e_ctx)?)),
        Expression::FunctionCall { name, args } => {
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(evaluate(arg, e_ctx)?);
            }
            functions::call(name, evaluated, e_ctx)
        }
        Expression::BinaryOp { left, op, right } => match op {
            // Short-circuit: the right operand is only evaluated when needed.
            BinaryOperator::Or => Ok(XPathValue::Boolean(
                evaluate(left, e_ctx)?.to_bool() || evaluate(right, e_ctx)?.to_bool(),
            )),
            BinaryOperator::And => Ok(XPathValue::Boolean(
                evaluate(left, e_ctx)?.to_bool() && evaluate(right, e_ctx)?.to_bool(),
            )),
            _ => operators::evaluate(*op, evaluate(left, e_ctx)?, evaluate(right, e_ctx)?),
        },
        Expression::Negate(inner) => Ok(XPathValue::Number(-evaluate(inner, e_ctx)?.to_number())),
    }
}

fn evaluate_location_path<'a, N>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut current = if let Some(start) = &path.start_point {
        match evaluate(start, e_ctx)? {
            XPathValue::NodeSet(nodes) => nodes,
            other => {
                return Err(XPathError::TypeError(format!(
                    "cannot apply a path step to non-node-set value '{}'",
                    other
                )));
            }
        }
    } else if path.is_absolute {
        vec![e_ctx.root_node]
    } else {
        vec![e_ctx.context_node]
    };

    for step in &path.steps {
        current = evaluate_step(step, &current, e_ctx)?;
        if current.is_empty() {
            break;
        }
    }
    Ok(current)
}

/// Applies one step to every context node and merges the results in document order.
/// Predicates are applied per context node, so `//item[1]` means "first item child of each parent".
fn evaluate_step<'a, N>(
    step: &Step,
    context_nodes: &[N],
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for &node in context_nodes {
        let candidates: Vec<N> = axes::collect(step.axis, node)
            .into_iter()
            .filter(|n| matches_node_test(*n, &step.node_test, step.axis))
            .collect();
        for kept in apply_predicates(candidates, &step.predicates, e_ctx)? {
            if seen.insert(kept) {
                merged.push(kept);
            }
        }
    }
    merged.sort();
    Ok(merged)
}

fn matches_node_test<'a, N: DataSourceNode<'a>>(node: N, test: &NodeTest, axis: Axis) -> bool {
    let principal = if axis == Axis::Attribute {
        NodeType::Attribute
    } else {
        NodeType::Element
    };
    match test {
        NodeTest::Wildcard => node.node_type() == principal,
        NodeTest::Name(wanted) => {
            if node.node_type() != principal {
                return false;
            }
            let Some(name) = node.name() else {
                return false;
            };
            match wanted.split_once(':') {
                Some((prefix, local)) => name.prefix == Some(prefix) && name.local_part == local,
                None => name.local_part == wanted,
            }
        }
        NodeTest::NodeType(NodeTypeTest::Node) => true,
        NodeTest::NodeType(NodeTypeTest::Text) => node.node_type() == NodeType::Text,
        NodeTest::NodeType(NodeTypeTest::Comment) => node.node_type() == NodeType::Comment,
        NodeTest::NodeType(NodeTypeTest::ProcessingInstruction) => {
            node.node_type() == NodeType::ProcessingInstruction
        }
    }
}

fn apply_predicates<'a, N>(
    mut nodes: Vec<N>,
    predicates: &[Expression],
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<Vec<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    for predicate in predicates {
        let size = nodes.len();
        let mut kept = Vec::with_capacity(size);
        for (i, node) in nodes.iter().enumerate() {
            let p_ctx = EvaluationContext::at(*node, e_ctx.root_node, i + 1, size);
            let keep = match evaluate(predicate, &p_ctx)? {
                XPathValue::Number(n) => n == (i + 1) as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(*node);
            }
        }
        nodes = kept;
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::mock::{MockNode, create_test_tree};
    use crate::parser::parse_expression;

    fn eval<'a>(tree: &'a crate::datasource::mock::MockTree, expr: &str) -> XPathValue<MockNode<'a>> {
        let e_ctx = EvaluationContext::new(tree.node(0));
        evaluate(&parse_expression(expr).unwrap(), &e_ctx).unwrap()
    }

    fn ids(value: XPathValue<MockNode<'_>>) -> Vec<usize> {
        match value {
            XPathValue::NodeSet(nodes) => nodes.iter().map(|n| n.id).collect(),
            other => panic!("expected node-set, got {:?}", other),
        }
    }

    #[test]
    fn test_absolute_child_path() {
        let tree = create_test_tree();
        assert_eq!(ids(eval(&tree, "/root/para")), vec![2, 8]);
        assert_eq!(ids(eval(&tree, "/*")), vec![1]);
        assert_eq!(ids(eval(&tree, "/")), vec![0]);
    }

    #[test]
    fn test_positional_predicates() {
        let tree = create_test_tree();
        assert_eq!(ids(eval(&tree, "/root/para[2]")), vec![8]);
        assert_eq!(ids(eval(&tree, "/root/*[last()]")), vec![8]);
        assert_eq!(ids(eval(&tree, "//para[1]")), vec![2]);
    }

    #[test]
    fn test_attribute_selection_and_filtering() {
        let tree = create_test_tree();
        assert_eq!(ids(eval(&tree, "//para/@id")), vec![3]);
        assert_eq!(ids(eval(&tree, "//para[@id='p1']")), vec![2]);
        assert_eq!(ids(eval(&tree, "//@xml:lang")), vec![4]);
        assert_eq!(ids(eval(&tree, "//para[not(@id)]")), vec![8]);
    }

    #[test]
    fn test_text_and_comment_tests() {
        let tree = create_test_tree();
        assert_eq!(ids(eval(&tree, "//text()")), vec![5, 9]);
        assert_eq!(ids(eval(&tree, "/root/comment()")), vec![6]);
    }

    #[test]
    fn test_scalar_results() {
        let tree = create_test_tree();
        assert_eq!(eval(&tree, "count(//para)"), XPathValue::Number(2.0));
        assert_eq!(eval(&tree, "string(/root/para[2])").to_string(), "World");
        assert_eq!(eval(&tree, "//para = 'World'"), XPathValue::Boolean(true));
        assert_eq!(eval(&tree, "1 + 2 * 3").to_string(), "7");
    }

    #[test]
    fn test_union_is_in_document_order() {
        let tree = create_test_tree();
        assert_eq!(ids(eval(&tree, "//div | //para")), vec![2, 7, 8]);
    }

    #[test]
    fn test_relative_path_from_element_context() {
        let tree = create_test_tree();
        let e_ctx = EvaluationContext::new(tree.node(1));
        let expr = parse_expression("para[2]/text()").unwrap();
        assert_eq!(ids(evaluate(&expr, &e_ctx).unwrap()), vec![9]);
        let expr = parse_expression("..").unwrap();
        assert_eq!(ids(evaluate(&expr, &e_ctx).unwrap()), vec![0]);
    }
}
