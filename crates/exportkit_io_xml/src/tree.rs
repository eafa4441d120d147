//! Depth-first serialization of a self-referencing forest.
//!
//! The parent -> children index is built once, before any element is emitted.
//! Children keep the order in which the caller supplied the nodes, so callers
//! sort by display order (then id) up front.

use std::collections::{BTreeMap, BTreeSet};

use crate::spec::{LeafItem, SpecElement, SpecTreeLayout, TreeNode, XmlExportError};

/// Serializer over a slice of nodes, validated at construction.
#[derive(Debug)]
pub struct HierarchicalTreeSerializer<'a, N> {
    layout: &'a SpecTreeLayout,
    nodes: &'a [N],
    dict_children: BTreeMap<i64, Vec<usize>>,
    l_roots: Vec<usize>,
}

/// Node whose element is open while its children are being serialized.
struct SpecOpenNode {
    n_idx: usize,
    n_child_next: usize,
    element: SpecElement,
    l_children: Vec<SpecElement>,
}

impl<'a, N: TreeNode> HierarchicalTreeSerializer<'a, N> {
    /// Index `nodes` by parent id.
    ///
    /// Fails on duplicate ids, and on any node that cannot be reached from a
    /// root (a cycle, or a parent id not present in `nodes`).
    pub fn new(layout: &'a SpecTreeLayout, nodes: &'a [N]) -> Result<Self, XmlExportError> {
        let mut set_ids = BTreeSet::new();
        let mut dict_children: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        let mut l_roots = Vec::new();
        for (n_idx, node) in nodes.iter().enumerate() {
            if !set_ids.insert(node.node_id()) {
                return Err(XmlExportError::DuplicateNodeId {
                    id: node.node_id(),
                });
            }
            match node.parent_id() {
                None => l_roots.push(n_idx),
                Some(n_parent) => dict_children.entry(n_parent).or_default().push(n_idx),
            }
        }

        let serializer = Self {
            layout,
            nodes,
            dict_children,
            l_roots,
        };
        serializer.validate_reachability()?;

        tracing::debug!(
            n_nodes = nodes.len(),
            n_roots = serializer.l_roots.len(),
            "Indexed tree nodes"
        );
        Ok(serializer)
    }

    fn children_of(&self, n_idx: usize) -> &[usize] {
        self.dict_children
            .get(&self.nodes[n_idx].node_id())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn validate_reachability(&self) -> Result<(), XmlExportError> {
        let mut l_visited = vec![false; self.nodes.len()];
        let mut l_pending = self.l_roots.clone();
        while let Some(n_idx) = l_pending.pop() {
            if l_visited[n_idx] {
                continue;
            }
            l_visited[n_idx] = true;
            l_pending.extend_from_slice(self.children_of(n_idx));
        }

        let mut l_ids: Vec<i64> = l_visited
            .iter()
            .zip(self.nodes)
            .filter(|(if_visited, _)| !**if_visited)
            .map(|(_, node)| node.node_id())
            .collect();
        if l_ids.is_empty() {
            return Ok(());
        }
        l_ids.sort_unstable();
        Err(XmlExportError::UnreachableNodes { ids: l_ids })
    }

    /// Serialize every root, depth-first pre-order, under the document root.
    ///
    /// `leaves_of` yields a node's leaf items; items whose referent is
    /// deleted are skipped without error.
    pub fn serialize<F, I, L>(&self, mut leaves_of: F) -> SpecElement
    where
        F: FnMut(&N) -> I,
        I: IntoIterator<Item = L>,
        L: LeafItem,
    {
        let mut root = SpecElement::new(self.layout.root_name.clone());
        root.attributes = self.layout.root_attributes.clone();
        for n_idx in &self.l_roots {
            root.push_child(self.serialize_subtree(*n_idx, &mut leaves_of));
        }

        tracing::debug!(
            root = %self.layout.root_name,
            n_nodes = self.nodes.len(),
            "Serialized tree"
        );
        root
    }

    fn serialize_subtree<F, I, L>(&self, n_idx_root: usize, leaves_of: &mut F) -> SpecElement
    where
        F: FnMut(&N) -> I,
        I: IntoIterator<Item = L>,
        L: LeafItem,
    {
        let mut stack = vec![self.open_node(n_idx_root, leaves_of)];
        let mut element_done = SpecElement::default();
        while let Some(node_open) = stack.last_mut() {
            let n_idx_child_next = self
                .children_of(node_open.n_idx)
                .get(node_open.n_child_next)
                .copied();
            if let Some(n_idx_child) = n_idx_child_next {
                node_open.n_child_next += 1;
                let node_child = self.open_node(n_idx_child, leaves_of);
                stack.push(node_child);
                continue;
            }

            let Some(node_closed) = stack.pop() else {
                break;
            };
            let mut element = node_closed.element;
            let mut group_children = SpecElement::new(self.layout.children_group_name.clone());
            group_children.children = node_closed.l_children;
            element.push_child(group_children);

            match stack.last_mut() {
                Some(node_parent) => node_parent.l_children.push(element),
                None => element_done = element,
            }
        }
        element_done
    }

    fn open_node<F, I, L>(&self, n_idx: usize, leaves_of: &mut F) -> SpecOpenNode
    where
        F: FnMut(&N) -> I,
        I: IntoIterator<Item = L>,
        L: LeafItem,
    {
        let node = &self.nodes[n_idx];
        let mut element = SpecElement::new(self.layout.node_name.clone());
        node.write_fields(&mut element);

        let mut group_leaves = SpecElement::new(self.layout.leaf_group_name.clone());
        for leaf in leaves_of(node) {
            if leaf.is_referent_deleted() {
                continue;
            }
            let mut element_leaf = SpecElement::new(self.layout.leaf_name.clone());
            leaf.write_fields(&mut element_leaf);
            group_leaves.push_child(element_leaf);
        }
        element.push_child(group_leaves);

        SpecOpenNode {
            n_idx,
            n_child_next: 0,
            element,
            l_children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Node {
        id: i64,
        parent: Option<i64>,
    }

    impl TreeNode for Node {
        fn node_id(&self) -> i64 {
            self.id
        }

        fn parent_id(&self) -> Option<i64> {
            self.parent
        }

        fn write_fields(&self, element: &mut SpecElement) {
            element.push_field("Id", &self.id);
        }
    }

    struct Leaf(i64);

    impl LeafItem for Leaf {
        fn is_referent_deleted(&self) -> bool {
            false
        }

        fn write_fields(&self, element: &mut SpecElement) {
            element.push_field("ProductId", &self.0);
        }
    }

    fn layout() -> SpecTreeLayout {
        SpecTreeLayout::new("Root", "Node", "Leaves", "Leaf", "Children")
    }

    fn no_leaves(_: &Node) -> Vec<Leaf> {
        Vec::new()
    }

    fn ids_of(element: &SpecElement) -> Vec<&str> {
        element
            .children_named("Node")
            .filter_map(|node| node.field_text("Id"))
            .collect()
    }

    #[test]
    fn test_children_keep_caller_order() {
        let nodes = vec![
            Node { id: 1, parent: None },
            Node { id: 9, parent: Some(1) },
            Node { id: 4, parent: Some(1) },
            Node { id: 2, parent: None },
        ];
        let layout = layout();
        let root = HierarchicalTreeSerializer::new(&layout, &nodes)
            .unwrap()
            .serialize(no_leaves);

        assert_eq!(ids_of(&root), vec!["1", "2"]);
        let children = root.children[0].child("Children").unwrap();
        assert_eq!(ids_of(children), vec!["9", "4"]);
    }

    #[test]
    fn test_empty_forest_yields_bare_root() {
        let layout = layout().with_root_attribute("Version", "1.0");
        let nodes: Vec<Node> = Vec::new();
        let root = HierarchicalTreeSerializer::new(&layout, &nodes)
            .unwrap()
            .serialize(no_leaves);
        assert!(root.children.is_empty());
        assert_eq!(root.attribute("Version"), Some("1.0"));
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let nodes: Vec<Node> = (0..50_000)
            .map(|n_id| Node {
                id: n_id,
                parent: if n_id == 0 { None } else { Some(n_id - 1) },
            })
            .collect();
        let layout = layout();
        let root = HierarchicalTreeSerializer::new(&layout, &nodes)
            .unwrap()
            .serialize(|node: &Node| vec![Leaf(node.id)]);

        let mut n_depth = 0;
        let mut element = &root.children[0];
        while let Some(next) = element.child("Children").and_then(|c| c.children.first()) {
            element = next;
            n_depth += 1;
        }
        assert_eq!(n_depth, 49_999);
        // Drop iteratively to keep the test independent of stack size.
        let mut l_pending = vec![root];
        while let Some(mut element) = l_pending.pop() {
            l_pending.append(&mut element.children);
        }
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let nodes = vec![Node { id: 1, parent: None }, Node { id: 1, parent: None }];
        let layout = layout();
        let err = HierarchicalTreeSerializer::new(&layout, &nodes).unwrap_err();
        assert!(matches!(err, XmlExportError::DuplicateNodeId { id: 1 }));
    }

    #[test]
    fn test_cycle_and_orphan_are_reported() {
        let nodes = vec![
            Node { id: 1, parent: None },
            Node { id: 2, parent: Some(3) },
            Node { id: 3, parent: Some(2) },
            Node { id: 7, parent: Some(99) },
            Node { id: 5, parent: Some(5) },
        ];
        let layout = layout();
        let err = HierarchicalTreeSerializer::new(&layout, &nodes).unwrap_err();
        assert!(matches!(
            err,
            XmlExportError::UnreachableNodes { ids } if ids == vec![2, 3, 5, 7]
        ));
    }
}
