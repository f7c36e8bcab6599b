//! The read-only tree contract the engine evaluates against.
use std::hash::Hash;

/// A qualified name, consisting of an optional prefix and a local part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName<'a> {
    pub prefix: Option<&'a str>,
    pub local_part: &'a str,
}

/// Node kinds of the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
}

/// A cheap, copyable handle to a node in an immutable tree.
///
/// `Ord` must follow document order: a parent sorts before its attributes,
/// which sort before its children. The engine relies on it to return
/// node-sets in document order.
pub trait DataSourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    fn node_type(&self) -> NodeType;

    /// Element and attribute names, or a processing-instruction target.
    fn name(&self) -> Option<QName<'a>>;

    /// The XPath `string()` value: text content for text, attributes and
    /// comments, the concatenated descendant text for elements and the root.
    fn string_value(&self) -> String;

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// `None` only for the root. Attributes report their owning element.
    fn parent(&self) -> Option<Self>;

    /// The namespace URI an element or attribute name is bound to.
    fn namespace_uri(&self) -> Option<&'a str> {
        None
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    #[derive(Debug)]
    struct MockNodeData {
        node_type: NodeType,
        name: Option<(Option<&'static str>, &'static str)>,
        value: String,
        parent: Option<usize>,
        children: Vec<usize>,
        attributes: Vec<usize>,
    }

    /// Arena tree built in document order, so node ids double as the order key.
    #[derive(Debug)]
    pub struct MockTree {
        nodes: Vec<MockNodeData>,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree,
    }

    impl PartialEq for MockNode<'_> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl Eq for MockNode<'_> {}
    impl PartialOrd for MockNode<'_> {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }
    impl Ord for MockNode<'_> {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.id.cmp(&other.id)
        }
    }
    impl Hash for MockNode<'_> {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl MockTree {
        pub fn new() -> Self {
            MockTree {
                nodes: vec![MockNodeData {
                    node_type: NodeType::Root,
                    name: None,
                    value: String::new(),
                    parent: None,
                    children: vec![],
                    attributes: vec![],
                }],
            }
        }

        fn push(&mut self, parent: usize, node_type: NodeType, name: Option<&'static str>, value: &str) -> usize {
            let id = self.nodes.len();
            let name = name.map(|n| match n.split_once(':') {
                Some((prefix, local)) => (Some(prefix), local),
                None => (None, n),
            });
            self.nodes.push(MockNodeData {
                node_type,
                name,
                value: value.to_string(),
                parent: Some(parent),
                children: vec![],
                attributes: vec![],
            });
            if node_type == NodeType::Attribute {
                self.nodes[parent].attributes.push(id);
            } else {
                self.nodes[parent].children.push(id);
            }
            id
        }

        pub fn element(&mut self, parent: usize, name: &'static str) -> usize {
            self.push(parent, NodeType::Element, Some(name), "")
        }

        pub fn attribute(&mut self, parent: usize, name: &'static str, value: &str) -> usize {
            self.push(parent, NodeType::Attribute, Some(name), value)
        }

        pub fn text(&mut self, parent: usize, value: &str) -> usize {
            self.push(parent, NodeType::Text, None, value)
        }

        pub fn comment(&mut self, parent: usize, value: &str) -> usize {
            self.push(parent, NodeType::Comment, None, value)
        }

        pub fn node(&self, id: usize) -> MockNode<'_> {
            MockNode { id, tree: self }
        }
    }

    impl<'a> DataSourceNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[self.id].node_type
        }

        fn name(&self) -> Option<QName<'a>> {
            self.tree.nodes[self.id]
                .name
                .map(|(prefix, local_part)| QName { prefix, local_part })
        }

        fn string_value(&self) -> String {
            match self.node_type() {
                NodeType::Root | NodeType::Element => {
                    self.children().map(|c| match c.node_type() {
                        NodeType::Text | NodeType::Element => c.string_value(),
                        _ => String::new(),
                    }).collect()
                }
                _ => self.tree.nodes[self.id].value.clone(),
            }
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(tree.nodes[self.id].attributes.iter().map(move |&id| MockNode { id, tree }))
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            Box::new(tree.nodes[self.id].children.iter().map(move |&id| MockNode { id, tree }))
        }

        fn parent(&self) -> Option<Self> {
            self.tree.nodes[self.id].parent.map(|id| MockNode { id, tree: self.tree })
        }
    }

    /// Id 0 is the document node.
    /// ```text
    /// <root>                                        1
    ///   <para id="p1" xml:lang="en">Hello</para>    2 (attrs 3, 4; text 5)
    ///   <!-- note -->                               6
    ///   <div/>                                      7
    ///   <para>World</para>                          8 (text 9)
    /// </root>
    /// ```
    pub fn create_test_tree() -> MockTree {
        let mut tree = MockTree::new();
        let root = tree.element(0, "root");
        let para = tree.element(root, "para");
        tree.attribute(para, "id", "p1");
        tree.attribute(para, "xml:lang", "en");
        tree.text(para, "Hello");
        tree.comment(root, " note ");
        tree.element(root, "div");
        let para2 = tree.element(root, "para");
        tree.text(para2, "World");
        tree
    }
}
