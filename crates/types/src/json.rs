use crate::error::ValueError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

static NULL: Value = Value::Null;

/// A node inside a shared, immutable JSON document.
///
/// Query results keep a handle on the document they were selected from, so
/// the whole document stays reachable through [`JsonNode::root`].
#[derive(Debug, Clone)]
pub struct JsonNode {
    root: Arc<Value>,
    pointer: String,
}

impl JsonNode {
    /// Wraps `value` as its own document root.
    pub fn new(value: Value) -> Self {
        JsonNode {
            root: Arc::new(value),
            pointer: String::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ValueError> {
        Ok(JsonNode::new(serde_json::from_str(text)?))
    }

    /// A node at `pointer` (RFC 6901) within `root`.
    pub fn at(root: Arc<Value>, pointer: impl Into<String>) -> Self {
        JsonNode {
            root,
            pointer: pointer.into(),
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn shared_root(&self) -> &Arc<Value> {
        &self.root
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    pub fn node(&self) -> &Value {
        self.root.pointer(&self.pointer).unwrap_or(&NULL)
    }

    pub fn is_root(&self) -> bool {
        self.pointer.is_empty()
    }

    /// True for objects and arrays with at least one member.
    pub fn has_values(&self) -> bool {
        match self.node() {
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => false,
        }
    }
}

impl PartialEq for JsonNode {
    fn eq(&self, other: &Self) -> bool {
        self.node() == other.node()
    }
}

impl From<Value> for JsonNode {
    fn from(value: Value) -> Self {
        JsonNode::new(value)
    }
}

fn write_json(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Null => Ok(()),
        Value::String(s) => f.write_str(s),
        Value::Object(_) | Value::Array(_) => {
            let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
            f.write_str(&pretty)
        }
        other => write!(f, "{}", other),
    }
}

impl fmt::Display for JsonNode {
    /// Strings unquoted, null empty, containers pretty-printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(self.node(), f)
    }
}
