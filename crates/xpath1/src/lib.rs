//! XPath 1.0 for read-only trees.
//!
//! The engine is written against [`DataSourceNode`], so any tree that can
//! report node kinds, names, string values and navigation can be queried.

pub mod ast;
pub mod axes;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use datasource::{DataSourceNode, NodeType, QName};
pub use engine::{EvaluationContext, XPathValue, evaluate};
pub use error::XPathError;
pub use parser::parse_expression;

/// Parses `expression` and evaluates it with `node` as the context node.
pub fn evaluate_str<'a, N>(expression: &str, node: N) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let expr = parse_expression(expression)?;
    let result = evaluate(&expr, &EvaluationContext::new(node))?;
    log::trace!("XPath '{}' evaluated to {:?}", expression, result);
    Ok(result)
}
