use crate::json::JsonNode;
use crate::scalar::Scalar;
use crate::table::TabularResult;
use crate::xml::XmlValue;
use itertools::Itertools;
use serde_json::Value;
use std::fmt;

/// A stored or resolved variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Scalar(Scalar),
    Array(Vec<VarValue>),
    Json(JsonNode),
    Xml(XmlValue),
    Tabular(TabularResult),
}

impl VarValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            VarValue::Scalar(_) => "scalar",
            VarValue::Array(_) => "array",
            VarValue::Json(_) => "json",
            VarValue::Xml(_) => "xml",
            VarValue::Tabular(_) => "tabular",
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            VarValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The text of a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_array(&self) -> Option<&[VarValue]> {
        match self {
            VarValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonNode> {
        match self {
            VarValue::Json(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlValue> {
        match self {
            VarValue::Xml(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_tabular(&self) -> Option<&TabularResult> {
        match self {
            VarValue::Tabular(table) => Some(table),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, VarValue::Scalar(Scalar::Null))
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Scalar(s) => fmt::Display::fmt(s, f),
            VarValue::Array(items) => write!(f, "{}", items.iter().join(", ")),
            VarValue::Json(node) => fmt::Display::fmt(node, f),
            VarValue::Xml(node) => fmt::Display::fmt(node, f),
            VarValue::Tabular(table) => fmt::Display::fmt(table, f),
        }
    }
}

impl From<Scalar> for VarValue {
    fn from(s: Scalar) -> Self {
        VarValue::Scalar(s)
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::Scalar(s.into())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::Scalar(s.into())
    }
}

impl From<i64> for VarValue {
    fn from(i: i64) -> Self {
        VarValue::Scalar(i.into())
    }
}

impl From<f64> for VarValue {
    fn from(x: f64) -> Self {
        VarValue::Scalar(x.into())
    }
}

impl From<bool> for VarValue {
    fn from(b: bool) -> Self {
        VarValue::Scalar(b.into())
    }
}

impl From<Vec<VarValue>> for VarValue {
    fn from(items: Vec<VarValue>) -> Self {
        VarValue::Array(items)
    }
}

impl From<JsonNode> for VarValue {
    fn from(node: JsonNode) -> Self {
        VarValue::Json(node)
    }
}

impl From<Value> for VarValue {
    fn from(value: Value) -> Self {
        VarValue::Json(JsonNode::new(value))
    }
}

impl From<XmlValue> for VarValue {
    fn from(node: XmlValue) -> Self {
        VarValue::Xml(node)
    }
}

impl From<TabularResult> for VarValue {
    fn from(table: TabularResult) -> Self {
        VarValue::Tabular(table)
    }
}
