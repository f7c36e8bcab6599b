//! Turns a reference into a value.
//!
//! Resolution parses the reference, looks up its key, applies an array index
//! when the declared type is an array, then dispatches on the working type in
//! a fixed order: JSON types, XML types, tabular, and finally passthrough for
//! everything else. Only one strategy is ever tried for a given value.

use crate::address::{Address, ColumnSelector};
use crate::config::ContextConfig;
use crate::error::ResolveError;
use crate::registry::VariableRegistry;
use molder_types::{JsonNode, Scalar, VarType, VarValue, XmlValue};
use molder_xpath1::{DataSourceNode, NodeType, XPathValue};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'c> {
    registry: &'c VariableRegistry,
    config: &'c ContextConfig,
}

impl<'c> Resolver<'c> {
    pub fn new(registry: &'c VariableRegistry, config: &'c ContextConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &'c VariableRegistry {
        self.registry
    }

    /// Resolves `reference`. `Ok(None)` means the variable is not declared or
    /// the query inside it matched nothing.
    pub fn resolve(&self, reference: &str) -> Result<Option<VarValue>, ResolveError> {
        let address = Address::parse(reference);
        let Some(variable) = self.registry.get_key(address.key) else {
            log::trace!("'{}' is not declared", address.key);
            return Ok(None);
        };
        let Some(stored) = &variable.value else {
            return Ok(Some(variable.var_type.default_value()));
        };

        let (var_type, value) = select_element(&address, &variable.var_type, stored)?;
        log::trace!("Resolving '{}' as {}", reference, var_type);

        if var_type.is_json() {
            self.query_json(&address, var_type, value)
        } else if var_type.is_xml() {
            self.query_xml(&address, var_type, value)
        } else if *var_type == VarType::Tabular {
            lookup_cell(&address, value)
        } else {
            Ok(Some(value.clone()))
        }
    }

    /// Resolves `reference` and renders the result as text.
    ///
    /// Leaf XML elements render as their text, XML nodes that start with a
    /// text child render as that text, and JSON containers render as the whole
    /// document they were selected from. Anything else uses its `Display` form.
    pub fn resolve_text(&self, reference: &str) -> Result<Option<String>, ResolveError> {
        let Some(value) = self.resolve(reference)? else {
            return Ok(None);
        };
        let text = match &value {
            VarValue::Xml(xml) if xml.kind() == NodeType::Element && !xml.has_element_children() => {
                xml.text_content()
            }
            VarValue::Xml(xml) => match xml.first_child_text() {
                Some(text) => text.to_string(),
                None => xml.to_string(),
            },
            VarValue::Json(node) if node.has_values() => {
                JsonNode::at(Arc::clone(node.shared_root()), "").to_string()
            }
            other => other.to_string(),
        };
        Ok(Some(text))
    }

    fn json_query<'a>(&'a self, sub_path: Option<&'a str>) -> &'a str {
        let marker = self.config.json_marker_len;
        let stripped = sub_path
            .map(|path| match path.char_indices().nth(marker) {
                Some((at, _)) => &path[at..],
                None => "",
            })
            .unwrap_or_default();
        if stripped.is_empty() {
            self.config.default_json_query.as_str()
        } else {
            stripped
        }
    }

    fn query_json(
        &self,
        address: &Address<'_>,
        var_type: &VarType,
        value: &VarValue,
    ) -> Result<Option<VarValue>, ResolveError> {
        let document = match value {
            VarValue::Json(node) => node.clone(),
            VarValue::Scalar(Scalar::Str(text)) => {
                JsonNode::parse(text).map_err(|source| ResolveError::InvalidJson {
                    reference: address.reference.to_string(),
                    source,
                })?
            }
            other => return Err(mismatch(address, var_type, other.kind_name())),
        };
        if *var_type == VarType::JsonObject && !document.node().is_object() {
            return Err(mismatch(address, var_type, json_kind(document.node())));
        }

        let query = self.json_query(address.sub_path);
        let matches = molder_jpath::select_str(query, document.node())?;
        let result = match matches.as_slice() {
            [] => None,
            [only] => {
                let pointer = format!("{}{}", document.pointer(), only.pointer);
                Some(JsonNode::at(Arc::clone(document.shared_root()), pointer))
            }
            many => Some(JsonNode::new(Value::Array(
                many.iter().map(|m| m.value.clone()).collect(),
            ))),
        };
        Ok(result.map(VarValue::Json))
    }

    fn query_xml(
        &self,
        address: &Address<'_>,
        var_type: &VarType,
        value: &VarValue,
    ) -> Result<Option<VarValue>, ResolveError> {
        let document = match value {
            VarValue::Xml(xml) => xml.clone(),
            VarValue::Scalar(Scalar::Str(text)) => {
                let parsed = if *var_type == VarType::XmlElement {
                    XmlValue::element(text)
                } else {
                    XmlValue::document(text)
                };
                parsed.map_err(|source| ResolveError::InvalidXml {
                    reference: address.reference.to_string(),
                    source,
                })?
            }
            other => return Err(mismatch(address, var_type, other.kind_name())),
        };

        let query = address
            .sub_path
            .filter(|p| !p.is_empty())
            .unwrap_or(self.config.default_xml_query.as_str());
        let result = match document.select(query)? {
            XPathValue::NodeSet(nodes) => {
                let first = if *var_type == VarType::XmlElement {
                    nodes.iter().find(|n| n.node_type() == NodeType::Element)
                } else {
                    nodes.first()
                };
                first.map(|node| VarValue::Xml(document.at(node.id())))
            }
            XPathValue::String(s) => Some(VarValue::Scalar(Scalar::Str(s))),
            XPathValue::Number(n) => Some(VarValue::Scalar(Scalar::Float(n))),
            XPathValue::Boolean(b) => Some(VarValue::Scalar(Scalar::Bool(b))),
        };
        Ok(result)
    }
}

fn select_element<'v>(
    address: &Address<'_>,
    var_type: &'v VarType,
    value: &'v VarValue,
) -> Result<(&'v VarType, &'v VarValue), ResolveError> {
    let (Some(element_type), Some(index)) = (var_type.element_type(), address.index) else {
        return Ok((var_type, value));
    };
    let items = value
        .as_array()
        .ok_or_else(|| mismatch(address, var_type, value.kind_name()))?;
    let item = usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .ok_or_else(|| ResolveError::IndexOutOfRange {
            reference: address.reference.to_string(),
            index,
            len: items.len(),
        })?;
    Ok((element_type, item))
}

fn lookup_cell(address: &Address<'_>, value: &VarValue) -> Result<Option<VarValue>, ResolveError> {
    let table = value
        .as_tabular()
        .ok_or_else(|| mismatch(address, &VarType::Tabular, value.kind_name()))?;
    let (row, column) = address.table_cell()?;

    let cells = usize::try_from(row)
        .ok()
        .and_then(|r| table.rows.get(r))
        .ok_or_else(|| ResolveError::RowOutOfRange {
            reference: address.reference.to_string(),
            row,
            rows: table.row_count(),
        })?;

    let cell = match column {
        ColumnSelector::Position(position) => usize::try_from(position)
            .ok()
            .and_then(|c| cells.get(c))
            .ok_or_else(|| ResolveError::ColumnOutOfRange {
                reference: address.reference.to_string(),
                column: position,
                columns: table.columns.len(),
            })?,
        ColumnSelector::Name(name) => table
            .column_index(name)
            .and_then(|c| cells.get(c))
            .ok_or_else(|| ResolveError::UnknownColumn {
                reference: address.reference.to_string(),
                column: name.to_string(),
            })?,
    };
    Ok(Some(VarValue::Scalar(cell.clone())))
}

fn mismatch(address: &Address<'_>, expected: &VarType, found: &'static str) -> ResolveError {
    log::warn!(
        "'{}' is declared as {} but holds a {} value",
        address.reference,
        expected,
        found
    );
    ResolveError::TypeMismatch {
        reference: address.reference.to_string(),
        expected: expected.clone(),
        found,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "json null",
        Value::Bool(_) => "json boolean",
        Value::Number(_) => "json number",
        Value::String(_) => "json string",
        Value::Array(_) => "json array",
        Value::Object(_) => "json object",
    }
}
