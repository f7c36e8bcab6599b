//! Comparison, arithmetic and union operators with XPath 1.0 coercions.

use crate::ast::BinaryOperator;
use crate::datasource::DataSourceNode;
use crate::engine::{XPathValue, string_to_number};
use crate::error::XPathError;

pub fn evaluate<'a, N: DataSourceNode<'a>>(
    op: BinaryOperator,
    left: XPathValue<N>,
    right: XPathValue<N>,
) -> Result<XPathValue<N>, XPathError> {
    use BinaryOperator::*;
    let result = match op {
        Union => match (left, right) {
            (XPathValue::NodeSet(mut a), XPathValue::NodeSet(b)) => {
                a.extend(b);
                a.sort();
                a.dedup();
                XPathValue::NodeSet(a)
            }
            _ => return Err(XPathError::TypeError("'|' requires two node-sets".to_string())),
        },
        Plus => XPathValue::Number(left.to_number() + right.to_number()),
        Minus => XPathValue::Number(left.to_number() - right.to_number()),
        Multiply => XPathValue::Number(left.to_number() * right.to_number()),
        Divide => XPathValue::Number(left.to_number() / right.to_number()),
        Modulo => XPathValue::Number(left.to_number() % right.to_number()),
        Equals | NotEquals | LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual => {
            XPathValue::Boolean(compare(op, &left, &right))
        }
        Or | And => XPathValue::Boolean(match op {
            Or => left.to_bool() || right.to_bool(),
            _ => left.to_bool() && right.to_bool(),
        }),
    };
    Ok(result)
}

/// An atomic operand taken from one side of a comparison.
enum Atom {
    Str(String),
    Num(f64),
    Bool(bool),
}

fn atoms<'a, N: DataSourceNode<'a>>(value: &XPathValue<N>) -> Vec<Atom> {
    match value {
        XPathValue::NodeSet(nodes) => nodes.iter().map(|n| Atom::Str(n.string_value())).collect(),
        XPathValue::String(s) => vec![Atom::Str(s.clone())],
        XPathValue::Number(n) => vec![Atom::Num(*n)],
        XPathValue::Boolean(b) => vec![Atom::Bool(*b)],
    }
}

fn compare<'a, N: DataSourceNode<'a>>(op: BinaryOperator, left: &XPathValue<N>, right: &XPathValue<N>) -> bool {
    // A node-set compared with a boolean compares its emptiness, not its members.
    match (left, right) {
        (XPathValue::NodeSet(_), XPathValue::Boolean(b)) => {
            return compare_atoms(op, &Atom::Bool(left.to_bool()), &Atom::Bool(*b));
        }
        (XPathValue::Boolean(b), XPathValue::NodeSet(_)) => {
            return compare_atoms(op, &Atom::Bool(*b), &Atom::Bool(right.to_bool()));
        }
        _ => {}
    }
    let left_atoms = atoms(left);
    let right_atoms = atoms(right);
    left_atoms
        .iter()
        .any(|l| right_atoms.iter().any(|r| compare_atoms(op, l, r)))
}

fn compare_atoms(op: BinaryOperator, left: &Atom, right: &Atom) -> bool {
    use BinaryOperator::*;
    match op {
        Equals | NotEquals => {
            let equal = match (left, right) {
                (Atom::Bool(a), b) | (b, Atom::Bool(a)) => *a == atom_bool(b),
                (Atom::Num(a), b) | (b, Atom::Num(a)) => *a == atom_number(b),
                (Atom::Str(a), Atom::Str(b)) => a == b,
            };
            if op == Equals { equal } else { !equal }
        }
        _ => {
            let (a, b) = (atom_number(left), atom_number(right));
            match op {
                LessThan => a < b,
                LessThanOrEqual => a <= b,
                GreaterThan => a > b,
                _ => a >= b,
            }
        }
    }
}

fn atom_bool(atom: &Atom) -> bool {
    match atom {
        Atom::Str(s) => !s.is_empty(),
        Atom::Num(n) => *n != 0.0 && !n.is_nan(),
        Atom::Bool(b) => *b,
    }
}

fn atom_number(atom: &Atom) -> f64 {
    match atom {
        Atom::Str(s) => string_to_number(s),
        Atom::Num(n) => *n,
        Atom::Bool(b) => f64::from(u8::from(*b)),
    }
}
