//! Collects the nodes along each XPath axis, in proximity order.
//!
//! Forward axes yield document order; reverse axes (`ancestor`, `preceding`,
//! ...) yield nearest-first so positional predicates count from the context
//! node outwards.

use crate::ast::Axis;
use crate::datasource::DataSourceNode;

pub fn collect<'a, N: DataSourceNode<'a>>(axis: Axis, node: N) -> Vec<N> {
    let mut out = Vec::new();
    match axis {
        Axis::SelfAxis => out.push(node),
        Axis::Child => out.extend(node.children()),
        Axis::Attribute => out.extend(node.attributes()),
        Axis::Descendant => push_descendants(node, &mut out),
        Axis::DescendantOrSelf => {
            out.push(node);
            push_descendants(node, &mut out);
        }
        Axis::Parent => out.extend(node.parent()),
        Axis::Ancestor => push_ancestors(node, &mut out),
        Axis::AncestorOrSelf => {
            out.push(node);
            push_ancestors(node, &mut out);
        }
        Axis::FollowingSibling => {
            if let Some(parent) = sibling_parent(node) {
                out.extend(parent.children().skip_while(|s| *s != node).skip(1));
            }
        }
        Axis::PrecedingSibling => {
            if let Some(parent) = sibling_parent(node) {
                let mut before: Vec<N> = parent.children().take_while(|s| *s != node).collect();
                before.reverse();
                out.extend(before);
            }
        }
        Axis::Following => {
            let mut current = node;
            while let Some(parent) = current.parent() {
                for sibling in parent.children().filter(|s| *s > current) {
                    out.push(sibling);
                    push_descendants(sibling, &mut out);
                }
                current = parent;
            }
            out.sort();
            out.dedup();
        }
        Axis::Preceding => {
            let ancestors: Vec<N> = {
                let mut a = Vec::new();
                push_ancestors(node, &mut a);
                a
            };
            let mut current = node;
            while let Some(parent) = current.parent() {
                for sibling in parent.children().take_while(|s| *s != current) {
                    if sibling < current {
                        out.push(sibling);
                        push_descendants(sibling, &mut out);
                    }
                }
                current = parent;
            }
            out.retain(|n| !ancestors.contains(n));
            out.sort();
            out.dedup();
            out.reverse();
        }
    }
    out
}

fn push_descendants<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    for child in node.children() {
        out.push(child);
        push_descendants(child, out);
    }
}

fn push_ancestors<'a, N: DataSourceNode<'a>>(node: N, out: &mut Vec<N>) {
    let mut current = node.parent();
    while let Some(p) = current {
        out.push(p);
        current = p.parent();
    }
}

/// Attributes and the root have no siblings.
fn sibling_parent<'a, N: DataSourceNode<'a>>(node: N) -> Option<N> {
    if attribute_owner(node).is_some() {
        return None;
    }
    node.parent()
}

fn attribute_owner<'a, N: DataSourceNode<'a>>(node: N) -> Option<N> {
    match node.node_type() {
        crate::datasource::NodeType::Attribute => node.parent(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::mock::create_test_tree;

    fn ids<'a>(nodes: &[crate::datasource::mock::MockNode<'a>]) -> Vec<usize> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_child_and_attribute_axes() {
        let tree = create_test_tree();
        assert_eq!(ids(&collect(Axis::Child, tree.node(1))), vec![2, 6, 7, 8]);
        assert_eq!(ids(&collect(Axis::Attribute, tree.node(2))), vec![3, 4]);
        assert!(collect(Axis::Child, tree.node(3)).is_empty());
    }

    #[test]
    fn test_descendants_in_document_order() {
        let tree = create_test_tree();
        assert_eq!(ids(&collect(Axis::Descendant, tree.node(1))), vec![2, 5, 6, 7, 8, 9]);
        assert_eq!(ids(&collect(Axis::DescendantOrSelf, tree.node(8))), vec![8, 9]);
    }

    #[test]
    fn test_reverse_axes_are_nearest_first() {
        let tree = create_test_tree();
        assert_eq!(ids(&collect(Axis::Ancestor, tree.node(5))), vec![2, 1, 0]);
        assert_eq!(ids(&collect(Axis::PrecedingSibling, tree.node(8))), vec![7, 6, 2]);
        assert_eq!(ids(&collect(Axis::Preceding, tree.node(7))), vec![6, 5, 2]);
    }

    #[test]
    fn test_following_axes() {
        let tree = create_test_tree();
        assert_eq!(ids(&collect(Axis::FollowingSibling, tree.node(2))), vec![6, 7, 8]);
        assert_eq!(ids(&collect(Axis::Following, tree.node(5))), vec![6, 7, 8, 9]);
        assert!(collect(Axis::FollowingSibling, tree.node(3)).is_empty());
    }
}
