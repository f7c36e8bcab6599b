use crate::json::JsonNode;
use crate::scalar::Scalar;
use crate::table::TabularResult;
use crate::value::VarValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The declared type of a variable. It picks the default value when nothing is
/// stored and the query strategy used when a reference is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarType {
    String,
    Integer,
    Float,
    Boolean,
    /// Untyped; the value is passed through as stored.
    Object,
    Array(Box<VarType>),
    JsonObject,
    JsonToken,
    XmlElement,
    /// Document-node XML. Queries may return any node kind.
    XmlDocument,
    Tabular,
}

impl VarType {
    pub fn array_of(element: VarType) -> Self {
        VarType::Array(Box::new(element))
    }

    pub fn element_type(&self) -> Option<&VarType> {
        match self {
            VarType::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, VarType::JsonObject | VarType::JsonToken)
    }

    pub fn is_xml(&self) -> bool {
        matches!(self, VarType::XmlElement | VarType::XmlDocument)
    }

    pub fn default_value(&self) -> VarValue {
        match self {
            VarType::String => VarValue::Scalar(Scalar::Str(String::new())),
            VarType::Integer => VarValue::Scalar(Scalar::Int(0)),
            VarType::Float => VarValue::Scalar(Scalar::Float(0.0)),
            VarType::Boolean => VarValue::Scalar(Scalar::Bool(false)),
            VarType::Array(_) => VarValue::Array(Vec::new()),
            VarType::JsonObject => VarValue::Json(JsonNode::new(Value::Object(Default::default()))),
            VarType::JsonToken => VarValue::Json(JsonNode::new(Value::Null)),
            VarType::Tabular => VarValue::Tabular(TabularResult::default()),
            VarType::Object | VarType::XmlElement | VarType::XmlDocument => {
                VarValue::Scalar(Scalar::Null)
            }
        }
    }

    /// The type a plain configuration value is registered under.
    pub fn infer(value: &Value) -> VarType {
        match value {
            Value::String(_) => VarType::String,
            Value::Number(n) if n.is_i64() => VarType::Integer,
            Value::Number(_) => VarType::Float,
            Value::Bool(_) => VarType::Boolean,
            Value::Object(_) => VarType::JsonObject,
            Value::Array(_) => VarType::JsonToken,
            Value::Null => VarType::Object,
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::String => f.write_str("string"),
            VarType::Integer => f.write_str("integer"),
            VarType::Float => f.write_str("float"),
            VarType::Boolean => f.write_str("boolean"),
            VarType::Object => f.write_str("object"),
            VarType::Array(element) => write!(f, "array<{}>", element),
            VarType::JsonObject => f.write_str("json-object"),
            VarType::JsonToken => f.write_str("json-token"),
            VarType::XmlElement => f.write_str("xml-element"),
            VarType::XmlDocument => f.write_str("xml-document"),
            VarType::Tabular => f.write_str("tabular"),
        }
    }
}
