//! Arena-backed page forest.
//!
//! Pages are stored in a flat `Vec<PageNode>` with parent/children
//! relationships tracked by [`NodeId`] indices. This provides:
//! - O(1) page id lookups via the `index` `HashMap`
//! - O(d) ancestor chains where d is the page depth
//! - iterative traversal, so deep spaces never grow the call stack

use std::collections::HashMap;

use serde::Serialize;

use crate::page::PageId;

/// Index of a node in a [`PageTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in registry order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A page in the forest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageNode {
    /// Page ID.
    pub id: PageId,
    /// Page title.
    pub title: String,
    /// Direct children, in discovery order. Never contains duplicates.
    pub children: Vec<NodeId>,
}

/// Owned, serializable view of a subtree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NestedPage {
    /// Page ID.
    pub id: PageId,
    /// Page title.
    pub title: String,
    /// Child pages.
    pub children: Vec<NestedPage>,
}

/// Deduplicated page forest produced by [`TreeBuilder`](crate::TreeBuilder).
///
/// Every distinct page id owns exactly one node. Each non-root node appears
/// in the children list of exactly one parent, the one recorded in
/// [`PageTree::parent`].
#[derive(Debug)]
pub struct PageTree {
    nodes: Vec<PageNode>,
    parents: Vec<Option<NodeId>>,
    roots: Vec<NodeId>,
    index: HashMap<PageId, NodeId>,
    fetch_count: usize,
    unreachable: usize,
}

impl PageTree {
    pub(crate) fn new(
        nodes: Vec<PageNode>,
        parents: Vec<Option<NodeId>>,
        roots: Vec<NodeId>,
        index: HashMap<PageId, NodeId>,
        fetch_count: usize,
    ) -> Self {
        let mut tree = Self {
            nodes,
            parents,
            roots,
            index,
            fetch_count,
            unreachable: 0,
        };
        tree.unreachable = tree.nodes.len() - tree.walk().count();
        tree
    }

    /// Root nodes in registry order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Get a node by index.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to a different tree and is out of range.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &PageNode {
        &self.nodes[id.0]
    }

    /// Look up a node by page id.
    #[must_use]
    pub fn get(&self, page_id: &PageId) -> Option<NodeId> {
        self.index.get(page_id).copied()
    }

    /// Parent of a node, `None` for roots.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.0]
    }

    /// Ancestors of a node, root first, excluding the node itself.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.parents[id.0];
        // Bounded by the node count so cyclic parent data cannot spin.
        while let Some(parent) = current {
            if chain.len() == self.nodes.len() {
                break;
            }
            chain.push(parent);
            current = self.parents[parent.0];
        }
        chain.reverse();
        chain
    }

    /// All nodes in registry order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PageNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i), node))
    }

    /// Depth-first pre-order traversal from the roots, yielding `(depth, node)`.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: self.roots.iter().rev().map(|&r| (0, r)).collect(),
        }
    }

    /// Number of distinct pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the space had no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of child lookups performed while building.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count
    }

    /// Number of pages not reachable from any root.
    ///
    /// Only non-zero when the remote data describes a parent cycle.
    #[must_use]
    pub fn unreachable(&self) -> usize {
        self.unreachable
    }

    /// Convert the forest into owned nested pages.
    #[must_use]
    pub fn to_nested(&self) -> Vec<NestedPage> {
        let order: Vec<NodeId> = self.walk().map(|(_, id)| id).collect();
        let mut built: Vec<Option<NestedPage>> = vec![None; self.nodes.len()];

        // Reverse pre-order visits every child before its parent.
        for &id in order.iter().rev() {
            let node = &self.nodes[id.0];
            let children = node
                .children
                .iter()
                .filter_map(|c| built[c.0].take())
                .collect();
            built[id.0] = Some(NestedPage {
                id: node.id.clone(),
                title: node.title.clone(),
                children,
            });
        }

        self.roots.iter().filter_map(|r| built[r.0].take()).collect()
    }
}

/// Iterator returned by [`PageTree::walk`].
pub struct Walk<'a> {
    tree: &'a PageTree,
    stack: Vec<(usize, NodeId)>,
}

impl Iterator for Walk<'_> {
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        let children = &self.tree.nodes[id.0].children;
        self.stack
            .extend(children.iter().rev().map(|&c| (depth + 1, c)));
        Some((depth, id))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn node(id: &str, title: &str, children: &[usize]) -> PageNode {
        PageNode {
            id: PageId::from(id),
            title: title.to_owned(),
            children: children.iter().map(|&c| NodeId(c)).collect(),
        }
    }

    /// Home -> (Guide -> Setup), About
    fn sample_tree() -> PageTree {
        let nodes = vec![
            node("1", "Home", &[1, 3]),
            node("2", "Guide", &[2]),
            node("3", "Setup", &[]),
            node("4", "About", &[]),
        ];
        let parents = vec![None, Some(NodeId(0)), Some(NodeId(1)), Some(NodeId(0))];
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), NodeId(i)))
            .collect();
        PageTree::new(nodes, parents, vec![NodeId(0)], index, 4)
    }

    #[test]
    fn test_walk_is_depth_first_preorder() {
        let tree = sample_tree();

        let titles: Vec<(usize, &str)> = tree
            .walk()
            .map(|(depth, id)| (depth, tree.node(id).title.as_str()))
            .collect();

        assert_eq!(
            titles,
            vec![(0, "Home"), (1, "Guide"), (2, "Setup"), (1, "About")]
        );
    }

    #[test]
    fn test_ancestors_root_first() {
        let tree = sample_tree();
        let setup = tree.get(&PageId::from("3")).unwrap();

        let ancestors: Vec<&str> = tree
            .ancestors(setup)
            .into_iter()
            .map(|id| tree.node(id).title.as_str())
            .collect();

        assert_eq!(ancestors, vec!["Home", "Guide"]);
    }

    #[test]
    fn test_ancestors_of_root_is_empty() {
        let tree = sample_tree();

        assert!(tree.ancestors(NodeId(0)).is_empty());
    }

    #[test]
    fn test_to_nested() {
        let tree = sample_tree();

        let nested = tree.to_nested();

        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].title, "Home");
        assert_eq!(nested[0].children.len(), 2);
        assert_eq!(nested[0].children[0].title, "Guide");
        assert_eq!(nested[0].children[0].children[0].title, "Setup");
        assert!(nested[0].children[1].children.is_empty());
    }

    #[test]
    fn test_nested_serializes_as_id_title_children() {
        let tree = sample_tree();

        let json = serde_json::to_value(tree.to_nested()).unwrap();

        assert_eq!(json[0]["id"], "1");
        assert_eq!(json[0]["children"][1]["title"], "About");
        assert_eq!(json[0]["children"][1]["children"], serde_json::json!([]));
    }

    #[test]
    fn test_unreachable_counts_cycle_members() {
        let nodes = vec![node("1", "A", &[1]), node("2", "B", &[0])];
        let parents = vec![Some(NodeId(1)), Some(NodeId(0))];
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), NodeId(i)))
            .collect();

        let tree = PageTree::new(nodes, parents, Vec::new(), index, 2);

        assert_eq!(tree.unreachable(), 2);
        assert_eq!(tree.walk().count(), 0);
        assert_eq!(tree.ancestors(NodeId(0)).len(), 2);
    }
}
