//! Breadth-first hierarchy reconstruction.
//!
//! The listing endpoint returns every page of a space flatly, so nesting is
//! only discovered by asking each page for its children. [`TreeBuilder`]
//! seeds a FIFO work queue with the listed pages, fetches children one page
//! at a time, and registers each newly seen page so that it is fetched
//! exactly once. After the queue drains, pages that never appeared as a
//! child become the roots.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::directory::PageDirectory;
use crate::error::BuildError;
use crate::page::{PageId, PageSummary};
use crate::tree::{NodeId, PageNode, PageTree};

/// What to do when a page is reported as the child of a second parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParentPolicy {
    /// The parent processed last keeps the page; the earlier parent loses it.
    #[default]
    LastWins,
    /// Abort the build with [`BuildError::ConflictingParent`].
    Strict,
}

/// Builds a [`PageTree`] from a [`PageDirectory`].
#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    policy: ParentPolicy,
}

impl TreeBuilder {
    /// Create a builder with the default [`ParentPolicy::LastWins`] policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the multi-parent policy.
    #[must_use]
    pub fn parent_policy(mut self, policy: ParentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// List all pages of the directory, then build the tree from them.
    pub fn build_from_directory<D>(&self, directory: &D) -> Result<PageTree, BuildError>
    where
        D: PageDirectory + ?Sized,
    {
        let pages = directory
            .list_pages()
            .map_err(|e| BuildError::ListPages {
                source: Box::new(e),
            })?;
        info!(pages = pages.len(), "Listed pages");
        self.build(pages, directory)
    }

    /// Build the tree from an initial page listing.
    ///
    /// Children are fetched sequentially in discovery order. The first
    /// failing fetch aborts the build.
    pub fn build<D>(
        &self,
        initial_pages: Vec<PageSummary>,
        directory: &D,
    ) -> Result<PageTree, BuildError>
    where
        D: PageDirectory + ?Sized,
    {
        let start = Instant::now();
        let mut registry = Registry::default();
        let mut queue = VecDeque::new();

        for summary in initial_pages {
            let (node, created) = registry.resolve(summary);
            if created {
                queue.push_back(node);
            }
        }

        let mut fetch_count = 0;
        while let Some(current) = queue.pop_front() {
            let page_id = registry.nodes[current.index()].id.clone();
            let children = directory
                .child_pages(&page_id)
                .map_err(|e| BuildError::ChildFetch {
                    page_id: page_id.clone(),
                    source: Box::new(e),
                })?;
            fetch_count += 1;

            for summary in children {
                let (child, created) = registry.resolve(summary);
                if created {
                    queue.push_back(child);
                }
                registry.link(current, child, self.policy)?;
            }
        }

        let tree = registry.finish(fetch_count);
        if tree.unreachable() > 0 {
            warn!(
                unreachable = tree.unreachable(),
                "Pages detached from every root by cyclic parent data"
            );
        }
        info!(
            pages = tree.len(),
            roots = tree.roots().len(),
            fetches = fetch_count,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Page tree built"
        );
        Ok(tree)
    }
}

/// Node registry for a single build.
#[derive(Default)]
struct Registry {
    nodes: Vec<PageNode>,
    parents: Vec<Option<NodeId>>,
    index: HashMap<PageId, NodeId>,
}

impl Registry {
    /// Return the node for a page, creating it on first sight.
    ///
    /// The flag is true when the node was created by this call.
    fn resolve(&mut self, summary: PageSummary) -> (NodeId, bool) {
        if let Some(&existing) = self.index.get(&summary.id) {
            return (existing, false);
        }
        let node = NodeId::new(self.nodes.len());
        self.index.insert(summary.id.clone(), node);
        self.nodes.push(PageNode {
            id: summary.id,
            title: summary.title,
            children: Vec::new(),
        });
        self.parents.push(None);
        (node, true)
    }

    /// Record `child` under `parent`.
    fn link(
        &mut self,
        parent: NodeId,
        child: NodeId,
        policy: ParentPolicy,
    ) -> Result<(), BuildError> {
        if let Some(previous) = self.parents[child.index()]
            && previous != parent
        {
            if policy == ParentPolicy::Strict {
                return Err(BuildError::ConflictingParent {
                    page_id: self.nodes[child.index()].id.clone(),
                    first_parent: self.nodes[previous.index()].id.clone(),
                    second_parent: self.nodes[parent.index()].id.clone(),
                });
            }
            debug!(
                page = %self.nodes[child.index()].id,
                from = %self.nodes[previous.index()].id,
                to = %self.nodes[parent.index()].id,
                "Moving page to later parent"
            );
            self.nodes[previous.index()]
                .children
                .retain(|&c| c != child);
        }

        let siblings = &mut self.nodes[parent.index()].children;
        if !siblings.contains(&child) {
            siblings.push(child);
        }
        self.parents[child.index()] = Some(parent);
        Ok(())
    }

    /// Classify roots and freeze the registry into a tree.
    fn finish(self, fetch_count: usize) -> PageTree {
        let roots = self
            .parents
            .iter()
            .enumerate()
            .filter(|(_, parent)| parent.is_none())
            .map(|(i, _)| NodeId::new(i))
            .collect();
        PageTree::new(self.nodes, self.parents, roots, self.index, fetch_count)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("remote unavailable")]
    struct RemoteError;

    /// In-memory directory that records every child lookup.
    #[derive(Default)]
    struct Fixture {
        pages: Vec<PageSummary>,
        children: HashMap<PageId, Vec<PageSummary>>,
        failing: Option<PageId>,
        calls: RefCell<Vec<PageId>>,
    }

    impl Fixture {
        fn page(mut self, id: &str, title: &str) -> Self {
            self.pages.push(PageSummary::new(id, title));
            self
        }

        fn child(mut self, parent: &str, id: &str, title: &str) -> Self {
            self.children
                .entry(PageId::from(parent))
                .or_default()
                .push(PageSummary::new(id, title));
            self
        }

        fn fail_on(mut self, id: &str) -> Self {
            self.failing = Some(PageId::from(id));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect()
        }
    }

    impl PageDirectory for Fixture {
        type Error = RemoteError;

        fn list_pages(&self) -> Result<Vec<PageSummary>, RemoteError> {
            Ok(self.pages.clone())
        }

        fn child_pages(&self, id: &PageId) -> Result<Vec<PageSummary>, RemoteError> {
            self.calls.borrow_mut().push(id.clone());
            if self.failing.as_ref() == Some(id) {
                return Err(RemoteError);
            }
            Ok(self.children.get(id).cloned().unwrap_or_default())
        }
    }

    fn build(fixture: &Fixture) -> PageTree {
        TreeBuilder::new().build_from_directory(fixture).unwrap()
    }

    fn ids(tree: &PageTree, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|&n| tree.node(n).id.as_str().to_owned())
            .collect()
    }

    fn child_ids(tree: &PageTree, id: &str) -> Vec<String> {
        let node = tree.get(&PageId::from(id)).unwrap();
        ids(tree, &tree.node(node).children)
    }

    #[test]
    fn test_single_page_without_children() {
        let fixture = Fixture::default().page("1", "A");

        let tree = build(&fixture);

        assert_eq!(ids(&tree, tree.roots()), vec!["1"]);
        assert_eq!(tree.node(tree.roots()[0]).title, "A");
        assert!(child_ids(&tree, "1").is_empty());
    }

    #[test]
    fn test_listed_child_is_not_a_root() {
        let fixture = Fixture::default()
            .page("1", "A")
            .page("2", "B")
            .child("1", "2", "B");

        let tree = build(&fixture);

        assert_eq!(ids(&tree, tree.roots()), vec!["1"]);
        assert_eq!(child_ids(&tree, "1"), vec!["2"]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_duplicate_child_in_one_listing_is_linked_once() {
        let fixture = Fixture::default()
            .page("1", "A")
            .child("1", "2", "B")
            .child("1", "2", "B");

        let tree = build(&fixture);

        assert_eq!(child_ids(&tree, "1"), vec!["2"]);
        assert_eq!(fixture.calls(), vec!["1", "2"]);
    }

    #[test]
    fn test_second_parent_wins() {
        let fixture = Fixture::default()
            .page("1", "A")
            .page("2", "B")
            .child("1", "3", "C")
            .child("2", "3", "C");

        let tree = build(&fixture);

        assert_eq!(ids(&tree, tree.roots()), vec!["1", "2"]);
        assert!(child_ids(&tree, "1").is_empty());
        assert_eq!(child_ids(&tree, "2"), vec!["3"]);
        let page3 = tree.get(&PageId::from("3")).unwrap();
        assert_eq!(tree.parent(page3), tree.get(&PageId::from("2")));
    }

    #[test]
    fn test_strict_policy_rejects_second_parent() {
        let fixture = Fixture::default()
            .page("1", "A")
            .page("2", "B")
            .child("1", "3", "C")
            .child("2", "3", "C");

        let err = TreeBuilder::new()
            .parent_policy(ParentPolicy::Strict)
            .build_from_directory(&fixture)
            .unwrap_err();

        match err {
            BuildError::ConflictingParent {
                page_id,
                first_parent,
                second_parent,
            } => {
                assert_eq!(page_id.as_str(), "3");
                assert_eq!(first_parent.as_str(), "1");
                assert_eq!(second_parent.as_str(), "2");
            }
            other => panic!("expected ConflictingParent, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_policy_allows_repeated_same_parent() {
        let fixture = Fixture::default()
            .page("1", "A")
            .child("1", "2", "B")
            .child("1", "2", "B");

        let tree = TreeBuilder::new()
            .parent_policy(ParentPolicy::Strict)
            .build_from_directory(&fixture)
            .unwrap();

        assert_eq!(child_ids(&tree, "1"), vec!["2"]);
    }

    #[test]
    fn test_empty_listing_makes_no_calls() {
        let fixture = Fixture::default();

        let tree = build(&fixture);

        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
        assert_eq!(tree.fetch_count(), 0);
        assert!(fixture.calls().is_empty());
    }

    #[test]
    fn test_unlisted_descendants_are_discovered() {
        let fixture = Fixture::default()
            .page("1", "Home")
            .child("1", "2", "Guide")
            .child("2", "3", "Setup")
            .child("3", "4", "Linux");

        let tree = build(&fixture);

        assert_eq!(ids(&tree, tree.roots()), vec!["1"]);
        let order: Vec<(usize, String)> = tree
            .walk()
            .map(|(depth, n)| (depth, tree.node(n).title.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, "Home".to_owned()),
                (1, "Guide".to_owned()),
                (2, "Setup".to_owned()),
                (3, "Linux".to_owned()),
            ]
        );
    }

    #[test]
    fn test_children_fetched_in_fifo_order() {
        let fixture = Fixture::default()
            .page("1", "A")
            .page("2", "B")
            .child("1", "3", "C")
            .child("1", "4", "D")
            .child("3", "5", "E");

        build(&fixture);

        assert_eq!(fixture.calls(), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_each_page_fetched_once() {
        // Page 4 is referenced from three parents and listed twice.
        let fixture = Fixture::default()
            .page("1", "A")
            .page("4", "D")
            .page("4", "D")
            .child("1", "2", "B")
            .child("1", "3", "C")
            .child("1", "4", "D")
            .child("2", "4", "D")
            .child("3", "4", "D");

        let tree = build(&fixture);

        let calls = fixture.calls();
        let unique: HashSet<&String> = calls.iter().collect();
        assert_eq!(calls.len(), unique.len());
        assert_eq!(tree.fetch_count(), 4);
        assert_eq!(tree.len(), 4);
        assert_eq!(child_ids(&tree, "3"), vec!["4"]);
    }

    #[test]
    fn test_every_page_appears_exactly_once() {
        let fixture = Fixture::default()
            .page("1", "A")
            .page("2", "B")
            .page("5", "E")
            .child("1", "3", "C")
            .child("2", "3", "C")
            .child("2", "4", "D")
            .child("4", "5", "E")
            .child("4", "6", "F")
            .child("4", "6", "F");

        let tree = build(&fixture);

        let seen: Vec<String> = tree
            .walk()
            .map(|(_, n)| tree.node(n).id.as_str().to_owned())
            .collect();
        let unique: HashSet<&String> = seen.iter().collect();
        assert_eq!(seen.len(), 6);
        assert_eq!(unique.len(), 6);
        assert_eq!(tree.unreachable(), 0);

        for (_, node) in tree.nodes() {
            let children: HashSet<NodeId> = node.children.iter().copied().collect();
            assert_eq!(children.len(), node.children.len());
        }
    }

    #[test]
    fn test_roots_are_pages_without_parent() {
        let fixture = Fixture::default()
            .page("3", "C")
            .page("1", "A")
            .page("2", "B")
            .child("1", "3", "C");

        let tree = build(&fixture);

        // Registry order follows the listing.
        assert_eq!(ids(&tree, tree.roots()), vec!["1", "2"]);
        for &root in tree.roots() {
            assert_eq!(tree.parent(root), None);
        }
    }

    #[test]
    fn test_fetch_failure_names_page_and_aborts() {
        let fixture = Fixture::default()
            .page("1", "A")
            .page("2", "B")
            .page("3", "C")
            .fail_on("2");

        let err = TreeBuilder::new()
            .build_from_directory(&fixture)
            .unwrap_err();

        assert!(matches!(err, BuildError::ChildFetch { .. }));
        assert_eq!(err.page_id().map(PageId::as_str), Some("2"));
        assert_eq!(err.to_string(), "failed to fetch children of page 2");
        assert_eq!(fixture.calls(), vec!["1", "2"]);
    }

    #[test]
    fn test_cycle_terminates() {
        let fixture = Fixture::default()
            .page("1", "A")
            .child("1", "2", "B")
            .child("2", "1", "A");

        let tree = build(&fixture);

        assert_eq!(fixture.calls(), vec!["1", "2"]);
        assert_eq!(tree.len(), 2);
        assert!(tree.roots().is_empty());
        assert_eq!(tree.unreachable(), 2);
    }

    #[test]
    fn test_self_reference_terminates() {
        let fixture = Fixture::default()
            .page("1", "A")
            .page("2", "B")
            .child("2", "2", "B");

        let tree = build(&fixture);

        assert_eq!(fixture.calls(), vec!["1", "2"]);
        assert_eq!(ids(&tree, tree.roots()), vec!["1"]);
    }

    #[test]
    fn test_build_from_explicit_listing() {
        let fixture = Fixture::default().child("7", "8", "Child");

        let tree = TreeBuilder::new()
            .build(vec![PageSummary::new("7", "Parent")], &fixture)
            .unwrap();

        assert_eq!(ids(&tree, tree.roots()), vec!["7"]);
        assert_eq!(child_ids(&tree, "7"), vec!["8"]);
    }
}
