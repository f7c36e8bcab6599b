//! A `nom`-based parser for XPath 1.0 expressions.

use super::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace0},
    combinator::{map, map_res, opt, recognize, value},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded},
};

// --- Main Public Parser ---

pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(XPathError::XPathParse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(XPathError::XPathParse(input.to_string(), e.to_string())),
    }
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

/// Folds `sub (op sub)*` into a left-associative chain of `BinaryOp`s.
fn binary_chain<'a>(
    input: &'a str,
    sub_expr: fn(&'a str) -> IResult<&'a str, Expression>,
    op: fn(&'a str) -> IResult<&'a str, BinaryOperator>,
) -> IResult<&'a str, Expression> {
    let (input, mut left) = sub_expr(input)?;
    let (input, rest) = many0(pair(ws(op), sub_expr)).parse(input)?;
    for (op, right) in rest {
        left = Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        };
    }
    Ok((input, left))
}

// --- Expression Parsers (lowest precedence first) ---

fn expression(input: &str) -> IResult<&str, Expression> {
    or_expr(input)
}

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    value(BinaryOperator::Or, tag("or")).parse(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    value(BinaryOperator::And, tag("and")).parse(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Equals, tag("=")),
        value(BinaryOperator::NotEquals, tag("!=")),
    ))
    .parse(input)
}

fn relational_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::LessThanOrEqual, tag("<=")),
        value(BinaryOperator::GreaterThanOrEqual, tag(">=")),
        value(BinaryOperator::LessThan, tag("<")),
        value(BinaryOperator::GreaterThan, tag(">")),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Plus, char('+')),
        value(BinaryOperator::Minus, char('-')),
    ))
    .parse(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        value(BinaryOperator::Multiply, char('*')),
        value(BinaryOperator::Divide, tag("div")),
        value(BinaryOperator::Modulo, tag("mod")),
    ))
    .parse(input)
}

fn union_op(input: &str) -> IResult<&str, BinaryOperator> {
    value(BinaryOperator::Union, char('|')).parse(input)
}

fn or_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, and_expr, or_op)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, equality_expr, and_op)
}

fn equality_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, relational_expr, equality_op)
}

fn relational_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, additive_expr, relational_op)
}

fn additive_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, multiplicative_expr, additive_op)
}

fn multiplicative_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, unary_expr, multiplicative_op)
}

fn unary_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(preceded(ws(char('-')), unary_expr), |e| {
            Expression::Negate(Box::new(e))
        }),
        union_expr,
    ))
    .parse(input)
}

fn union_expr(input: &str) -> IResult<&str, Expression> {
    binary_chain(input, path_expr, union_op)
}

/// A primary expression optionally continued by `/step`s, or a plain location path.
/// Primaries go first so `count(x)` is not read as the step `count`.
fn path_expr(input: &str) -> IResult<&str, Expression> {
    if let Ok((rest, primary)) = primary_expr(input) {
        let (rest, steps) = continuation_steps(rest)?;
        if steps.is_empty() {
            return Ok((rest, primary));
        }
        let path = LocationPath {
            start_point: Some(Box::new(primary)),
            is_absolute: false,
            steps,
        };
        return Ok((rest, Expression::LocationPath(path)));
    }
    map(ws(location_path), Expression::LocationPath).parse(input)
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    ws(alt((
        map(number, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        delimited(ws(char('(')), expression, ws(char(')'))),
    )))
    .parse(input)
}

// --- Literal Parsers ---

/// Plain decimal numbers only; `double` would also accept names like `inf`.
fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn function_call(input: &str) -> IResult<&str, Expression> {
    let (rest, name) = q_name(input)?;
    if matches!(
        name.as_str(),
        "text" | "node" | "comment" | "processing-instruction"
    ) {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    let (rest, args) = delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), expression),
        ws(char(')')),
    )
    .parse(rest)?;
    Ok((rest, Expression::FunctionCall { name, args }))
}

// --- Name and NodeTest Parsers ---

fn nc_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.'),
    ))
    .parse(input)
}

fn q_name(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(nc_name, opt(pair(char(':'), nc_name)))),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn node_type_test(input: &str) -> IResult<&str, NodeTest> {
    map(
        (
            alt((
                value(NodeTypeTest::Text, tag("text")),
                value(NodeTypeTest::Node, tag("node")),
                value(NodeTypeTest::Comment, tag("comment")),
                value(
                    NodeTypeTest::ProcessingInstruction,
                    tag("processing-instruction"),
                ),
            )),
            ws(char('(')),
            char(')'),
        ),
        |(test, _, _)| NodeTest::NodeType(test),
    )
    .parse(input)
}

fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        value(NodeTest::Wildcard, char('*')),
        node_type_test,
        map(q_name, NodeTest::Name),
    ))
    .parse(input)
}

// --- Path Parsers ---

fn axis(input: &str) -> IResult<&str, Axis> {
    let (rest, axis) = alt((
        value(Axis::AncestorOrSelf, tag("ancestor-or-self")),
        value(Axis::Ancestor, tag("ancestor")),
        value(Axis::Attribute, tag("attribute")),
        value(Axis::Child, tag("child")),
        value(Axis::DescendantOrSelf, tag("descendant-or-self")),
        value(Axis::Descendant, tag("descendant")),
        value(Axis::FollowingSibling, tag("following-sibling")),
        value(Axis::Following, tag("following")),
        value(Axis::Parent, tag("parent")),
        value(Axis::PrecedingSibling, tag("preceding-sibling")),
        value(Axis::Preceding, tag("preceding")),
        value(Axis::SelfAxis, tag("self")),
    ))
    .parse(input)?;
    let (rest, _) = tag("::").parse(rest)?;
    Ok((rest, axis))
}

fn predicate(input: &str) -> IResult<&str, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    alt((
        value(Step::abbreviated(Axis::Parent), tag("..")),
        value(Step::abbreviated(Axis::SelfAxis), char('.')),
        full_step,
    ))
    .parse(input)
}

fn full_step(input: &str) -> IResult<&str, Step> {
    let (rest, (axis, node_test)) = alt((
        map(preceded(char('@'), node_test), |nt| (Axis::Attribute, nt)),
        map(pair(opt(axis), node_test), |(ax, nt)| {
            (ax.unwrap_or(Axis::Child), nt)
        }),
    ))
    .parse(input)?;
    let (rest, predicates) = many0(predicate).parse(rest)?;
    Ok((
        rest,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

/// Parses any number of `/step` or `//step` continuations.
fn continuation_steps(input: &str) -> IResult<&str, Vec<Step>> {
    let (rest, pairs) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(input)?;
    let mut steps = Vec::new();
    for (separator, next) in pairs {
        if separator == "//" {
            steps.push(Step::abbreviated(Axis::DescendantOrSelf));
        }
        steps.push(next);
    }
    Ok((rest, steps))
}

fn relative_location_path(input: &str) -> IResult<&str, Vec<Step>> {
    let (rest, first) = step(input)?;
    let (rest, mut more) = continuation_steps(rest)?;
    let mut steps = vec![first];
    steps.append(&mut more);
    Ok((rest, steps))
}

fn location_path(input: &str) -> IResult<&str, LocationPath> {
    if let Ok((rest, _)) = tag::<&str, &str, nom::error::Error<&str>>("//").parse(input) {
        let (rest, mut steps) = relative_location_path(rest)?;
        steps.insert(0, Step::abbreviated(Axis::DescendantOrSelf));
        return Ok((
            rest,
            LocationPath {
                start_point: None,
                is_absolute: true,
                steps,
            },
        ));
    }
    if let Ok((rest, _)) = char::<&str, nom::error::Error<&str>>('/').parse(input) {
        // A lone `/` selects the root.
        let (rest, steps) = match relative_location_path(rest) {
            Ok((after, steps)) => (after, steps),
            Err(_) => (rest, vec![]),
        };
        return Ok((
            rest,
            LocationPath {
                start_point: None,
                is_absolute: true,
                steps,
            },
        ));
    }
    map(relative_location_path, |steps| LocationPath {
        start_point: None,
        is_absolute: false,
        steps,
    })
    .parse(input)
}
