use serde::{Deserialize, Serialize};

/// Resolution settings shared by every lookup made through a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Characters dropped from the front of a JSON sub-path before it is
    /// evaluated. Callers write sub-paths as `$.a.b`, so the default is 2.
    pub json_marker_len: usize,
    /// Query used for JSON variables referenced without a sub-path.
    pub default_json_query: String,
    /// Query used for XML variables referenced without a sub-path.
    pub default_xml_query: String,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            json_marker_len: 2,
            default_json_query: "*".to_string(),
            default_xml_query: "/*".to_string(),
        }
    }
}

impl ContextConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
