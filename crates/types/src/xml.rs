//! An owned XML tree that can be shared between variables and queried with XPath.
//!
//! `roxmltree` documents borrow their input text, so a parsed document is copied
//! into a flat arena. Nodes are pushed in document order (an element, then its
//! attributes, then its children), which lets node ids double as the ordering
//! key the XPath engine needs.
use crate::error::ValueError;
use molder_xpath1::{DataSourceNode, NodeType, QName, XPathError, XPathValue};
use quick_xml::escape::{escape, partial_escape};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug)]
struct NodeData {
    kind: NodeType,
    prefix: Option<String>,
    namespace: Option<String>,
    /// Local name for elements and attributes, target for processing instructions.
    name: Option<String>,
    value: String,
    parent: Option<usize>,
    children: Vec<usize>,
    attributes: Vec<usize>,
    /// Namespace declarations made on this element, as `(prefix, uri)`.
    namespaces: Vec<(Option<String>, String)>,
}

impl NodeData {
    fn new(kind: NodeType, parent: Option<usize>) -> Self {
        NodeData {
            kind,
            prefix: None,
            namespace: None,
            name: None,
            value: String::new(),
            parent,
            children: Vec::new(),
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct XmlTree {
    nodes: Vec<NodeData>,
}

impl XmlTree {
    /// Parses `text`. Whitespace-only text nodes are dropped.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let doc = roxmltree::Document::parse(text)?;
        let mut tree = XmlTree { nodes: Vec::new() };
        tree.copy_node(doc.root(), None);
        log::trace!("Parsed XML into {} nodes", tree.nodes.len());
        Ok(tree)
    }

    fn push(&mut self, data: NodeData) -> usize {
        let id = self.nodes.len();
        self.nodes.push(data);
        id
    }

    fn copy_node(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<usize>) {
        let id = match node.node_type() {
            roxmltree::NodeType::Root => self.push(NodeData::new(NodeType::Root, None)),
            roxmltree::NodeType::Element => self.copy_element(node, parent),
            roxmltree::NodeType::Text => {
                let text = node.text().unwrap_or_default();
                if text.trim().is_empty() {
                    return;
                }
                let mut data = NodeData::new(NodeType::Text, parent);
                data.value = text.to_string();
                self.push(data)
            }
            roxmltree::NodeType::Comment => {
                let mut data = NodeData::new(NodeType::Comment, parent);
                data.value = node.text().unwrap_or_default().to_string();
                self.push(data)
            }
            roxmltree::NodeType::PI => {
                let mut data = NodeData::new(NodeType::ProcessingInstruction, parent);
                if let Some(pi) = node.pi() {
                    data.name = Some(pi.target.to_string());
                    data.value = pi.value.unwrap_or_default().to_string();
                }
                self.push(data)
            }
        };
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        for child in node.children() {
            self.copy_node(child, Some(id));
        }
    }

    fn copy_element(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<usize>) -> usize {
        let tag = node.tag_name();
        let mut data = NodeData::new(NodeType::Element, parent);
        data.name = Some(tag.name().to_string());
        data.prefix = tag
            .namespace()
            .and_then(|uri| node.lookup_prefix(uri))
            .map(str::to_string);
        data.namespace = tag.namespace().map(str::to_string);

        let inherited: Vec<(Option<&str>, &str)> = node
            .parent_element()
            .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
            .unwrap_or_default();
        data.namespaces = node
            .namespaces()
            .filter(|ns| ns.name() != Some("xml"))
            .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
            .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
            .collect();

        let id = self.push(data);
        for attr in node.attributes() {
            let mut data = NodeData::new(NodeType::Attribute, Some(id));
            data.name = Some(attr.name().to_string());
            data.prefix = attr.namespace().and_then(|uri| {
                if uri == XML_NAMESPACE {
                    Some("xml".to_string())
                } else {
                    node.lookup_prefix(uri).map(str::to_string)
                }
            });
            data.namespace = attr.namespace().map(str::to_string);
            data.value = attr.value().to_string();
            let attr_id = self.push(data);
            self.nodes[id].attributes.push(attr_id);
        }
        id
    }

    pub fn root(&self) -> XmlNodeRef<'_> {
        XmlNodeRef { tree: self, id: 0 }
    }

    pub fn document_element(&self) -> Option<XmlNodeRef<'_>> {
        self.root()
            .children()
            .find(|c| c.node_type() == NodeType::Element)
    }

    pub fn node(&self, id: usize) -> XmlNodeRef<'_> {
        XmlNodeRef { tree: self, id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn qualified_name(&self, id: usize) -> String {
        let data = &self.nodes[id];
        let local = data.name.as_deref().unwrap_or_default();
        match &data.prefix {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Declarations visible at `id` that were made on its ancestors, nearest first.
    fn inherited_namespaces(&self, id: usize) -> Vec<(Option<&str>, &str)> {
        let mut seen: Vec<(Option<&str>, &str)> = Vec::new();
        let mut current = self.nodes[id].parent;
        while let Some(ancestor) = current {
            for (prefix, uri) in &self.nodes[ancestor].namespaces {
                if !seen.iter().any(|(p, _)| *p == prefix.as_deref()) {
                    seen.push((prefix.as_deref(), uri.as_str()));
                }
            }
            current = self.nodes[ancestor].parent;
        }
        seen
    }

    fn write_node(&self, id: usize, out: &mut String, top: bool) {
        let data = &self.nodes[id];
        match data.kind {
            NodeType::Root => {
                for &child in &data.children {
                    self.write_node(child, out, true);
                }
            }
            NodeType::Element => self.write_element(id, out, top),
            NodeType::Attribute => {
                out.push_str(&self.qualified_name(id));
                out.push_str("=\"");
                out.push_str(&escape(data.value.as_str()));
                out.push('"');
            }
            NodeType::Text => out.push_str(&partial_escape(data.value.as_str())),
            NodeType::Comment => {
                out.push_str("<!--");
                out.push_str(&data.value);
                out.push_str("-->");
            }
            NodeType::ProcessingInstruction => {
                out.push_str("<?");
                out.push_str(data.name.as_deref().unwrap_or_default());
                if !data.value.is_empty() {
                    out.push(' ');
                    out.push_str(&data.value);
                }
                out.push_str("?>");
            }
        }
    }

    fn write_element(&self, id: usize, out: &mut String, top: bool) {
        let data = &self.nodes[id];
        let name = self.qualified_name(id);
        out.push('<');
        out.push_str(&name);

        let mut declarations: Vec<(Option<&str>, &str)> = data
            .namespaces
            .iter()
            .map(|(p, u)| (p.as_deref(), u.as_str()))
            .collect();
        if top {
            for (prefix, uri) in self.inherited_namespaces(id) {
                if !declarations.iter().any(|(p, _)| *p == prefix) {
                    declarations.push((prefix, uri));
                }
            }
        }
        for (prefix, uri) in declarations {
            match prefix {
                Some(prefix) => out.push_str(&format!(" xmlns:{}=\"", prefix)),
                None => out.push_str(" xmlns=\""),
            }
            out.push_str(&escape(uri));
            out.push('"');
        }

        for &attr in &data.attributes {
            out.push(' ');
            self.write_node(attr, out, false);
        }

        if data.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for &child in &data.children {
            self.write_node(child, out, false);
        }
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
    }
}

/// A borrowed handle to one node of an [`XmlTree`].
#[derive(Clone, Copy)]
pub struct XmlNodeRef<'a> {
    tree: &'a XmlTree,
    id: usize,
}

impl<'a> XmlNodeRef<'a> {
    pub fn id(&self) -> usize {
        self.id
    }

    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id]
    }
}

impl fmt::Debug for XmlNodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlNodeRef")
            .field("id", &self.id)
            .field("kind", &self.data().kind)
            .field("name", &self.data().name)
            .finish()
    }
}

impl PartialEq for XmlNodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for XmlNodeRef<'_> {}

impl PartialOrd for XmlNodeRef<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for XmlNodeRef<'_> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for XmlNodeRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<'a> DataSourceNode<'a> for XmlNodeRef<'a> {
    fn node_type(&self) -> NodeType {
        self.data().kind
    }

    fn name(&self) -> Option<QName<'a>> {
        let data = self.data();
        match data.kind {
            NodeType::Element | NodeType::Attribute | NodeType::ProcessingInstruction => {
                data.name.as_deref().map(|local_part| QName {
                    prefix: data.prefix.as_deref(),
                    local_part,
                })
            }
            _ => None,
        }
    }

    fn string_value(&self) -> String {
        match self.node_type() {
            NodeType::Root | NodeType::Element => self
                .children()
                .filter(|c| matches!(c.node_type(), NodeType::Text | NodeType::Element))
                .map(|c| c.string_value())
                .collect(),
            _ => self.data().value.clone(),
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        let tree = self.tree;
        Box::new(
            self.data()
                .attributes
                .iter()
                .map(move |&id| XmlNodeRef { tree, id }),
        )
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        let tree = self.tree;
        Box::new(
            self.data()
                .children
                .iter()
                .map(move |&id| XmlNodeRef { tree, id }),
        )
    }

    fn parent(&self) -> Option<Self> {
        self.data().parent.map(|id| XmlNodeRef {
            tree: self.tree,
            id,
        })
    }

    fn namespace_uri(&self) -> Option<&'a str> {
        self.data().namespace.as_deref()
    }
}

/// A node of a shared XML tree, as stored in a variable or returned by a query.
#[derive(Debug, Clone)]
pub struct XmlValue {
    tree: Arc<XmlTree>,
    node: usize,
}

impl XmlValue {
    /// Parses `text` and anchors on its document element.
    pub fn element(text: &str) -> Result<Self, ValueError> {
        let tree = XmlTree::parse(text)?;
        let node = tree
            .document_element()
            .map(|e| e.id())
            .ok_or(ValueError::NoDocumentElement)?;
        Ok(XmlValue {
            tree: Arc::new(tree),
            node,
        })
    }

    /// Parses `text` and anchors on the document node itself.
    pub fn document(text: &str) -> Result<Self, ValueError> {
        Ok(XmlValue {
            tree: Arc::new(XmlTree::parse(text)?),
            node: 0,
        })
    }

    /// Another node of the same tree.
    pub fn at(&self, node: usize) -> XmlValue {
        XmlValue {
            tree: Arc::clone(&self.tree),
            node,
        }
    }

    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    pub fn node_ref(&self) -> XmlNodeRef<'_> {
        self.tree.node(self.node)
    }

    pub fn kind(&self) -> NodeType {
        self.node_ref().node_type()
    }

    /// Evaluates an XPath expression with this node as the context node.
    pub fn select(&self, expression: &str) -> Result<XPathValue<XmlNodeRef<'_>>, XPathError> {
        molder_xpath1::evaluate_str(expression, self.node_ref())
    }

    pub fn has_element_children(&self) -> bool {
        self.node_ref()
            .children()
            .any(|c| c.node_type() == NodeType::Element)
    }

    /// The first child's text, if that child is a text node.
    pub fn first_child_text(&self) -> Option<&str> {
        let first = *self.tree.nodes[self.node].children.first()?;
        let data = &self.tree.nodes[first];
        (data.kind == NodeType::Text).then_some(data.value.as_str())
    }

    pub fn text_content(&self) -> String {
        self.node_ref().string_value()
    }

    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.tree.write_node(self.node, &mut out, true);
        out
    }
}

impl PartialEq for XmlValue {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.to_xml_string() == other.to_xml_string()
    }
}

impl fmt::Display for XmlValue {
    /// Elements and documents print as markup, every other node as its value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeType::Root | NodeType::Element => f.write_str(&self.to_xml_string()),
            _ => f.write_str(&self.text_content()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: &str = r#"<order id="42">
    <customer>Ada &amp; Co</customer>
    <lines>
        <line sku="A1">2</line>
        <line sku="B7">5</line>
    </lines>
    <!-- audit -->
</order>"#;

    #[test]
    fn test_element_anchor_and_outer_xml() {
        let order = XmlValue::element(ORDER).unwrap();
        assert_eq!(order.kind(), NodeType::Element);
        assert_eq!(
            order.to_xml_string(),
            r#"<order id="42"><customer>Ada &amp; Co</customer><lines><line sku="A1">2</line><line sku="B7">5</line></lines><!-- audit --></order>"#
        );
        assert!(order.has_element_children());
    }

    #[test]
    fn test_document_anchor() {
        let doc = XmlValue::document("<?xml version=\"1.0\"?><a>x</a>").unwrap();
        assert_eq!(doc.kind(), NodeType::Root);
        assert_eq!(doc.to_string(), "<a>x</a>");
    }

    #[test]
    fn test_ids_follow_document_order() {
        let order = XmlValue::element(ORDER).unwrap();
        let XPathValue::NodeSet(nodes) = order.select("//line/@sku | //line").unwrap() else {
            panic!("expected a node-set");
        };
        let ids: Vec<usize> = nodes.iter().map(|n| n.id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0].node_type(), NodeType::Element);
        assert_eq!(nodes[1].node_type(), NodeType::Attribute);
    }

    #[test]
    fn test_select_and_reanchor() {
        let order = XmlValue::element(ORDER).unwrap();
        let XPathValue::NodeSet(nodes) = order.select("lines/line[2]").unwrap() else {
            panic!("expected a node-set");
        };
        let line = order.at(nodes[0].id());
        assert_eq!(line.to_string(), r#"<line sku="B7">5</line>"#);
        assert_eq!(line.first_child_text(), Some("5"));
        assert!(!line.has_element_children());

        let XPathValue::NodeSet(attrs) = order.select("@id").unwrap() else {
            panic!("expected a node-set");
        };
        let id = order.at(attrs[0].id());
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.to_xml_string(), r#"id="42""#);
    }

    #[test]
    fn test_scalar_results() {
        let order = XmlValue::element(ORDER).unwrap();
        assert_eq!(order.select("count(lines/line)").unwrap(), XPathValue::Number(2.0));
        assert_eq!(
            order.select("string(customer)").unwrap(),
            XPathValue::String("Ada & Co".to_string())
        );
    }

    #[test]
    fn test_namespaces_are_carried_into_fragments() {
        let text = r#"<s:Envelope xmlns:s="urn:soap"><s:Body><m:Ping xmlns:m="urn:m" xml:lang="en"/></s:Body></s:Envelope>"#;
        let envelope = XmlValue::element(text).unwrap();
        assert_eq!(envelope.to_xml_string(), text);

        let XPathValue::NodeSet(nodes) = envelope.select("s:Body").unwrap() else {
            panic!("expected a node-set");
        };
        let body = envelope.at(nodes[0].id());
        assert_eq!(
            body.to_xml_string(),
            r#"<s:Body xmlns:s="urn:soap"><m:Ping xmlns:m="urn:m" xml:lang="en"/></s:Body>"#
        );
    }

    #[test]
    fn test_namespace_uri_and_lang() {
        let text = r#"<s:Envelope xmlns:s="urn:soap"><s:Body><m:Ping xmlns:m="urn:m" xml:lang="en-GB" id="1"/></s:Body></s:Envelope>"#;
        let envelope = XmlValue::element(text).unwrap();
        let string = |expr: &str| envelope.select(expr).unwrap().to_string();
        assert_eq!(string("namespace-uri()"), "urn:soap");
        assert_eq!(string("namespace-uri(s:Body/*)"), "urn:m");
        assert_eq!(string("namespace-uri(s:Body/*/@xml:lang)"), XML_NAMESPACE);
        assert_eq!(string("namespace-uri(s:Body/*/@id)"), "");
        assert_eq!(string("boolean(s:Body/*[lang('EN')])"), "true");
        assert_eq!(string("boolean(s:Body[lang('en')])"), "false");
    }

    #[test]
    fn test_text_escaping() {
        let value = XmlValue::element(r#"<a note="&quot;x&quot;">1 &lt; 2</a>"#).unwrap();
        assert_eq!(value.to_xml_string(), r#"<a note="&quot;x&quot;">1 &lt; 2</a>"#);
        assert_eq!(value.text_content(), "1 < 2");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(XmlValue::element("<a>"), Err(ValueError::Xml(_))));
        assert!(matches!(XmlValue::document("not xml"), Err(ValueError::Xml(_))));
    }
}
