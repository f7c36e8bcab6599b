use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single primitive value: a tabular cell, an array element, or a plain variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// Converts a JSON primitive. Objects and arrays are not scalars.
    pub fn from_json(value: &Value) -> Option<Scalar> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(s) => Some(Scalar::Str(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_primitives() {
        assert_eq!(Scalar::from_json(&json!(3)), Some(Scalar::Int(3)));
        assert_eq!(Scalar::from_json(&json!(2.5)), Some(Scalar::Float(2.5)));
        assert_eq!(Scalar::from_json(&json!("x")), Some(Scalar::from("x")));
        assert_eq!(Scalar::from_json(&json!(null)), Some(Scalar::Null));
        assert_eq!(Scalar::from_json(&json!([1])), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::Null.to_string(), "");
        assert_eq!(Scalar::Float(1.0).to_string(), "1");
        assert_eq!(Scalar::Bool(false).to_string(), "false");
    }

    #[test]
    fn test_untagged_serde() {
        let cells: Vec<Scalar> = serde_json::from_str(r#"[null, true, 7, 1.5, "a"]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                Scalar::Null,
                Scalar::Bool(true),
                Scalar::Int(7),
                Scalar::Float(1.5),
                Scalar::from("a"),
            ]
        );
    }
}
