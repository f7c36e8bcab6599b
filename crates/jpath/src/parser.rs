//! A `nom`-based parser for the JPath selection language.
use super::ast::{CompareOp, FilterExpr, FilterQuery, JsonPath, Operand, PathSegment};
use crate::error::JPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{map, map_res, opt, recognize, value},
    error::ErrorKind,
    multi::{many0, separated_list1},
    number::complete::double,
    sequence::{delimited, pair, preceded},
};
use serde_json::Value;

// --- Main Public Parser ---

pub fn parse_path(input: &str) -> Result<JsonPath, JPathError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(JPathError::EmptyPath);
    }
    match path(trimmed) {
        Ok(("", parsed)) => Ok(parsed),
        Ok((rem, _)) => Err(JPathError::JPathParse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(JPathError::JPathParse(input.to_string(), e.to_string())),
    }
}

// --- Combinators ---

fn path(input: &str) -> IResult<&str, JsonPath> {
    map(pair(first_segment, many0(segment)), |(first, mut rest)| {
        let mut segments = vec![first];
        segments.append(&mut rest);
        JsonPath { segments }
    })
    .parse(input)
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| {
        !matches!(
            c,
            '.' | '[' | ']' | '*' | '\'' | '"' | '=' | '!' | '<' | '>' | '(' | ')' | '&' | '|' | ','
        ) && !c.is_whitespace()
    })
    .parse(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
    ))
    .parse(input)
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |digits: &str| {
        digits.parse::<i64>()
    })
    .parse(input)
}

fn slice(input: &str) -> IResult<&str, PathSegment> {
    map(
        (
            opt(ws(integer)),
            char(':'),
            opt(ws(integer)),
            opt(preceded(char(':'), opt(ws(integer)))),
        ),
        |(start, _, end, step)| PathSegment::Slice {
            start,
            end,
            step: step.flatten(),
        },
    )
    .parse(input)
}

fn selector(input: &str) -> IResult<&str, PathSegment> {
    alt((
        slice,
        map(integer, PathSegment::Index),
        map(quoted, |key: &str| PathSegment::Key(key.to_string())),
        value(PathSegment::Wildcard, char('*')),
    ))
    .parse(input)
}

/// One selector, or a comma-separated union of them.
fn selectors(input: &str) -> IResult<&str, PathSegment> {
    map(
        separated_list1(ws(char(',')), selector),
        |mut selectors: Vec<PathSegment>| {
            if selectors.len() == 1 {
                selectors.swap_remove(0)
            } else {
                PathSegment::Union(selectors)
            }
        },
    )
    .parse(input)
}

fn bracket_segment(input: &str) -> IResult<&str, PathSegment> {
    delimited(
        pair(char('['), multispace0),
        alt((map(filter, PathSegment::Filter), selectors)),
        pair(multispace0, char(']')),
    )
    .parse(input)
}

fn recursive_segment(input: &str) -> IResult<&str, PathSegment> {
    preceded(
        tag(".."),
        alt((
            value(PathSegment::RecursiveWildcard, char('*')),
            map(bracket_segment, |inner| PathSegment::RecursiveSelect(Box::new(inner))),
            map(name, |key: &str| PathSegment::RecursiveKey(key.to_string())),
        )),
    )
    .parse(input)
}

fn child_segment(input: &str) -> IResult<&str, PathSegment> {
    preceded(
        char('.'),
        alt((
            value(PathSegment::Wildcard, char('*')),
            map(name, |key: &str| PathSegment::Key(key.to_string())),
        )),
    )
    .parse(input)
}

fn segment(input: &str) -> IResult<&str, PathSegment> {
    alt((recursive_segment, child_segment, bracket_segment)).parse(input)
}

/// A path may also open with a `.` or `..` step, relative to the context value.
fn first_segment(input: &str) -> IResult<&str, PathSegment> {
    alt((
        value(PathSegment::Root, char('$')),
        recursive_segment,
        child_segment,
        value(PathSegment::Wildcard, char('*')),
        bracket_segment,
        map(name, |key: &str| PathSegment::Key(key.to_string())),
    ))
    .parse(input)
}

// --- Filter Expressions (lowest precedence first) ---

fn filter(input: &str) -> IResult<&str, FilterExpr> {
    preceded(pair(char('?'), multispace0), or_filter).parse(input)
}

fn or_filter(input: &str) -> IResult<&str, FilterExpr> {
    let (input, first) = and_filter(input)?;
    let (input, rest) = many0(preceded(ws(tag("||")), and_filter)).parse(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |left, right| FilterExpr::Or(Box::new(left), Box::new(right)));
    Ok((input, expr))
}

fn and_filter(input: &str) -> IResult<&str, FilterExpr> {
    let (input, first) = unary_filter(input)?;
    let (input, rest) = many0(preceded(ws(tag("&&")), unary_filter)).parse(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |left, right| FilterExpr::And(Box::new(left), Box::new(right)));
    Ok((input, expr))
}

fn unary_filter(input: &str) -> IResult<&str, FilterExpr> {
    alt((
        map(preceded(pair(char('!'), multispace0), unary_filter), |e| {
            FilterExpr::Not(Box::new(e))
        }),
        delimited(
            pair(char('('), multispace0),
            or_filter,
            pair(multispace0, char(')')),
        ),
        comparison,
    ))
    .parse(input)
}

/// `operand op operand`, or a lone query tested for existence.
fn comparison(input: &str) -> IResult<&str, FilterExpr> {
    let (input, left) = operand(input)?;
    let (input, rest) = opt(pair(ws(compare_op), operand)).parse(input)?;
    match (left, rest) {
        (left, Some((op, right))) => Ok((input, FilterExpr::Compare { left, op, right })),
        (Operand::Query(query), None) => Ok((input, FilterExpr::Exists(query))),
        (Operand::Literal(_), None) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::Verify,
        ))),
    }
}

fn compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        value(CompareOp::Eq, tag("==")),
        value(CompareOp::Ne, tag("!=")),
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Lt, char('<')),
        value(CompareOp::Gt, char('>')),
    ))
    .parse(input)
}

fn operand(input: &str) -> IResult<&str, Operand> {
    alt((map(filter_query, Operand::Query), map(literal, Operand::Literal))).parse(input)
}

fn filter_query(input: &str) -> IResult<&str, FilterQuery> {
    let relative = || map(many0(segment), |segments| JsonPath { segments });
    alt((
        map(preceded(char('@'), relative()), FilterQuery::Current),
        map(preceded(char('$'), relative()), FilterQuery::Root),
    ))
    .parse(input)
}

fn literal(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), tag("true")),
        value(Value::Bool(false), tag("false")),
        value(Value::Null, tag("null")),
        map(quoted, |s: &str| Value::String(s.to_string())),
        map(double, Value::from),
    ))
    .parse(input)
}
