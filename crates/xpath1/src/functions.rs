//! The XPath 1.0 core function library.

use crate::datasource::{DataSourceNode, NodeType};
use crate::engine::{EvaluationContext, XPathValue, string_to_number};
use crate::error::XPathError;

pub fn call<'a, N>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<XPathValue<N>, XPathError>
where
    N: DataSourceNode<'a> + 'a,
{
    let context_string = || e_ctx.context_node.string_value();
    let string_arg = |i: usize| args.get(i).map(|v| v.to_string()).unwrap_or_default();

    let result = match name {
        "last" => XPathValue::Number(e_ctx.context_size as f64),
        "position" => XPathValue::Number(e_ctx.context_position as f64),
        "count" => match args.first() {
            Some(XPathValue::NodeSet(nodes)) => XPathValue::Number(nodes.len() as f64),
            _ => return Err(arity_error(name, "expects a node-set")),
        },
        "string" => XPathValue::String(match args.first() {
            Some(v) => v.to_string(),
            None => context_string(),
        }),
        "concat" => XPathValue::String(args.iter().map(|v| v.to_string()).collect()),
        "contains" => {
            expect_args(name, &args, 2)?;
            XPathValue::Boolean(string_arg(0).contains(&string_arg(1)))
        }
        "starts-with" => {
            expect_args(name, &args, 2)?;
            XPathValue::Boolean(string_arg(0).starts_with(&string_arg(1)))
        }
        "string-length" => {
            let s = if args.is_empty() { context_string() } else { string_arg(0) };
            XPathValue::Number(s.chars().count() as f64)
        }
        "normalize-space" => {
            let s = if args.is_empty() { context_string() } else { string_arg(0) };
            XPathValue::String(s.split_whitespace().collect::<Vec<_>>().join(" "))
        }
        "not" => {
            expect_args(name, &args, 1)?;
            XPathValue::Boolean(!args[0].to_bool())
        }
        "boolean" => {
            expect_args(name, &args, 1)?;
            XPathValue::Boolean(args[0].to_bool())
        }
        "true" => XPathValue::Boolean(true),
        "false" => XPathValue::Boolean(false),
        "number" => XPathValue::Number(match args.first() {
            Some(v) => v.to_number(),
            None => string_to_number(&context_string()),
        }),
        "sum" => match args.first() {
            Some(XPathValue::NodeSet(nodes)) => XPathValue::Number(
                nodes.iter().map(|n| string_to_number(&n.string_value())).sum(),
            ),
            _ => return Err(arity_error(name, "expects a node-set")),
        },
        "floor" | "ceiling" | "round" => {
            expect_args(name, &args, 1)?;
            let n = args[0].to_number();
            XPathValue::Number(match name {
                "floor" => n.floor(),
                "ceiling" => n.ceil(),
                _ => round(n),
            })
        }
        "substring" => {
            if !(2..=3).contains(&args.len()) {
                return Err(arity_error(name, "expects 2 or 3 arguments"));
            }
            let length = args.get(2).map(|v| v.to_number());
            XPathValue::String(substring(&string_arg(0), args[1].to_number(), length))
        }
        "substring-before" | "substring-after" => {
            expect_args(name, &args, 2)?;
            let (s, pattern) = (string_arg(0), string_arg(1));
            XPathValue::String(match s.find(&pattern) {
                Some(at) if name == "substring-before" => s[..at].to_string(),
                Some(at) => s[at + pattern.len()..].to_string(),
                None => String::new(),
            })
        }
        "translate" => {
            expect_args(name, &args, 3)?;
            XPathValue::String(translate(&string_arg(0), &string_arg(1), &string_arg(2)))
        }
        "lang" => {
            expect_args(name, &args, 1)?;
            XPathValue::Boolean(lang_matches(e_ctx.context_node, &string_arg(0)))
        }
        "name" | "local-name" | "namespace-uri" => {
            let node = match args.first() {
                Some(XPathValue::NodeSet(nodes)) => nodes.first().copied(),
                Some(_) => return Err(arity_error(name, "expects a node-set")),
                None => Some(e_ctx.context_node),
            };
            if name == "namespace-uri" {
                let uri = node.and_then(|n| n.namespace_uri()).unwrap_or_default();
                return Ok(XPathValue::String(uri.to_string()));
            }
            let qname = node.and_then(|n| n.name());
            XPathValue::String(match qname {
                Some(q) if name == "name" => match q.prefix {
                    Some(prefix) => format!("{}:{}", prefix, q.local_part),
                    None => q.local_part.to_string(),
                },
                Some(q) => q.local_part.to_string(),
                None => String::new(),
            })
        }
        _ => return Err(XPathError::UnknownFunction(name.to_string())),
    };
    Ok(result)
}

/// Rounds half-way values towards positive infinity.
fn round(n: f64) -> f64 {
    if !n.is_finite() || n == 0.0 {
        n
    } else {
        (n + 0.5).floor()
    }
}

/// Characters at 1-based positions `p` with `round(start) <= p < round(start) + round(length)`.
fn substring(s: &str, start: f64, length: Option<f64>) -> String {
    let first = round(start);
    let last = length.map_or(f64::INFINITY, |l| first + round(l));
    s.chars()
        .enumerate()
        .filter(|(i, _)| {
            let pos = (i + 1) as f64;
            pos >= first && pos < last
        })
        .map(|(_, c)| c)
        .collect()
}

/// Characters of `from` without a counterpart in `to` are removed.
fn translate(s: &str, from: &str, to: &str) -> String {
    let from: Vec<char> = from.chars().collect();
    let to: Vec<char> = to.chars().collect();
    s.chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(at) => to.get(at).copied(),
            None => Some(c),
        })
        .collect()
}

/// Checks the nearest `xml:lang` in scope, case-insensitively and with subtag prefixes.
fn lang_matches<'a, N: DataSourceNode<'a>>(context: N, wanted: &str) -> bool {
    let wanted = wanted.to_lowercase();
    let mut current = if context.node_type() == NodeType::Element {
        Some(context)
    } else {
        context.parent()
    };
    while let Some(node) = current {
        let declared = node.attributes().find(|attr| {
            attr.name()
                .is_some_and(|q| q.prefix == Some("xml") && q.local_part == "lang")
        });
        if let Some(attr) = declared {
            let lang = attr.string_value().to_lowercase();
            return lang == wanted || lang.starts_with(&format!("{}-", wanted));
        }
        current = node.parent();
    }
    false
}

fn expect_args<N>(name: &str, args: &[XPathValue<N>], count: usize) -> Result<(), XPathError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(arity_error(
            name,
            &format!("expects {} argument(s), got {}", count, args.len()),
        ))
    }
}

fn arity_error(function: &str, message: &str) -> XPathError {
    XPathError::FunctionError {
        function: function.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::mock::create_test_tree;
    use crate::engine::evaluate;
    use crate::parser::parse_expression;

    fn eval_string(expr: &str) -> Result<String, XPathError> {
        let tree = create_test_tree();
        let e_ctx = EvaluationContext::new(tree.node(2));
        Ok(evaluate(&parse_expression(expr)?, &e_ctx)?.to_string())
    }

    #[test]
    fn test_string_functions() {
        assert_eq!(eval_string("concat('a', 1, true())").unwrap(), "a1true");
        assert_eq!(eval_string("normalize-space('  a   b ')").unwrap(), "a b");
        assert_eq!(eval_string("string-length()").unwrap(), "5");
        assert_eq!(eval_string("contains(., 'ell')").unwrap(), "true");
    }

    #[test]
    fn test_name_functions() {
        assert_eq!(eval_string("name()").unwrap(), "para");
        assert_eq!(eval_string("name(@*[2])").unwrap(), "xml:lang");
        assert_eq!(eval_string("local-name(@*[2])").unwrap(), "lang");
    }

    #[test]
    fn test_number_functions() {
        assert_eq!(eval_string("round(2.6)").unwrap(), "3");
        assert_eq!(eval_string("round(2.5)").unwrap(), "3");
        assert_eq!(eval_string("round(-2.5)").unwrap(), "-2");
        assert_eq!(eval_string("floor(-1.5)").unwrap(), "-2");
        assert_eq!(eval_string("ceiling(1.2)").unwrap(), "2");
        assert_eq!(eval_string("round('x')").unwrap(), "NaN");
        // Non-numeric string values make the sum NaN.
        assert_eq!(eval_string("sum(/root/para)").unwrap(), "NaN");
        assert_eq!(eval_string("sum(/root/nothing)").unwrap(), "0");
        assert!(matches!(
            eval_string("sum(1)"),
            Err(XPathError::FunctionError { .. })
        ));
    }

    #[test]
    fn test_substring_functions() {
        assert_eq!(eval_string("substring('12345', 2, 3)").unwrap(), "234");
        assert_eq!(eval_string("substring('12345', 2)").unwrap(), "2345");
        assert_eq!(eval_string("substring('12345', 1.5, 2.6)").unwrap(), "234");
        assert_eq!(eval_string("substring('12345', 0, 3)").unwrap(), "12");
        assert_eq!(eval_string("substring('12345', 0 div 0, 3)").unwrap(), "");
        assert_eq!(eval_string("substring('12345', -42, 1 div 0)").unwrap(), "12345");
        assert_eq!(eval_string("substring-before('1999/04/01', '/')").unwrap(), "1999");
        assert_eq!(eval_string("substring-after('1999/04/01', '/')").unwrap(), "04/01");
        assert_eq!(eval_string("substring-after('abc', 'z')").unwrap(), "");
    }

    #[test]
    fn test_translate() {
        assert_eq!(eval_string("translate('bar', 'abc', 'ABC')").unwrap(), "BAr");
        assert_eq!(eval_string("translate('--aaa--', 'abc-', 'ABC')").unwrap(), "AAA");
        assert_eq!(eval_string("translate(., 'H', 'J')").unwrap(), "Jello");
    }

    #[test]
    fn test_lang_and_namespace_uri() {
        assert_eq!(eval_string("lang('EN')").unwrap(), "true");
        assert_eq!(eval_string("lang('en-GB')").unwrap(), "false");
        assert_eq!(eval_string("boolean(/root/div[lang('en')])").unwrap(), "false");
        assert_eq!(eval_string("boolean(text()[lang('en')])").unwrap(), "true");
        // The mock tree binds no namespaces.
        assert_eq!(eval_string("namespace-uri()").unwrap(), "");
    }

    #[test]
    fn test_unknown_function_and_arity() {
        assert_eq!(
            eval_string("frobnicate()"),
            Err(XPathError::UnknownFunction("frobnicate".into()))
        );
        assert!(matches!(
            eval_string("contains('a')"),
            Err(XPathError::FunctionError { .. })
        ));
    }
}
