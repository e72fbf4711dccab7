#![forbid(unsafe_code)]

//! Parent-pointer forest shared by locations and categories.
//!
//! Nodes only know their parent id; child lists are derived once when the forest is built.
//! Stored data may violate the forest invariant (a parent row deleted behind our back, or a
//! hand-edited database with a loop), so every walk guards against revisiting a node and treats
//! an unresolvable parent as the end of the chain.

use crate::ids::{CategoryId, LocationId};
use crate::model::{Category, Location};
use std::collections::{BTreeMap, BTreeSet};

pub const PATH_SEPARATOR: &str = "/";

/// Rendered in place of a parent reference that does not resolve.
pub const MISSING_NODE: &str = "<missing>";

pub trait TreeNode {
    type Id: Copy + Ord + std::fmt::Debug;

    fn node_id(&self) -> Self::Id;

    fn parent_id(&self) -> Option<Self::Id>;

    /// Path segment used for breadcrumbs and sibling ordering.
    fn label(&self) -> &str;
}

pub type LocationTree = Forest<Location>;
pub type CategoryTree = Forest<Category>;

#[derive(Clone, Debug)]
pub struct Forest<N: TreeNode> {
    nodes: BTreeMap<N::Id, N>,
    children: BTreeMap<N::Id, Vec<N::Id>>,
    roots: Vec<N::Id>,
}

impl<N: TreeNode> Forest<N> {
    pub fn new(nodes: impl IntoIterator<Item = N>) -> Self {
        let nodes = nodes
            .into_iter()
            .map(|node| (node.node_id(), node))
            .collect::<BTreeMap<_, _>>();

        let mut children = BTreeMap::<N::Id, Vec<N::Id>>::new();
        let mut roots = Vec::new();
        for node in nodes.values() {
            let id = node.node_id();
            match node.parent_id() {
                Some(parent) if parent != id && nodes.contains_key(&parent) => {
                    children.entry(parent).or_default().push(id);
                }
                _ => roots.push(id),
            }
        }

        let sibling_order = |a: &N::Id, b: &N::Id| {
            let (left, right) = (&nodes[a], &nodes[b]);
            left.label().cmp(right.label()).then_with(|| a.cmp(b))
        };
        for siblings in children.values_mut() {
            siblings.sort_by(sibling_order);
        }
        roots.sort_by(sibling_order);

        Self {
            nodes,
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: N::Id) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: N::Id) -> Option<&N> {
        self.nodes.get(&id)
    }

    /// Nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &N> {
        self.nodes.values()
    }

    pub fn children(&self, id: N::Id) -> impl Iterator<Item = &N> {
        self.child_ids(id)
            .iter()
            .filter_map(|child| self.nodes.get(child))
    }

    /// Root-first parents of `id`, excluding `id` itself. Stops at the first parent that does
    /// not resolve.
    pub fn ancestors(&self, id: N::Id) -> Vec<&N> {
        self.ancestor_path(id).into_iter().flatten().collect()
    }

    /// Like [`Forest::ancestors`], but an unresolvable parent reference is kept as `None` at
    /// the head of the chain.
    pub fn ancestor_path(&self, id: N::Id) -> Vec<Option<&N>> {
        let mut path = Vec::new();
        let mut visited = BTreeSet::from([id]);
        let mut cursor = self.nodes.get(&id).and_then(|node| node.parent_id());
        while let Some(parent_id) = cursor {
            if !visited.insert(parent_id) {
                break;
            }
            match self.nodes.get(&parent_id) {
                Some(parent) => {
                    path.push(Some(parent));
                    cursor = parent.parent_id();
                }
                None => {
                    path.push(None);
                    break;
                }
            }
        }
        path.reverse();
        path
    }

    pub fn depth(&self, id: N::Id) -> usize {
        self.ancestor_path(id).len()
    }

    /// All transitive children of `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: N::Id) -> Vec<&N> {
        let mut out = Vec::new();
        let mut visited = BTreeSet::from([id]);
        let mut stack = self.child_ids(id).iter().rev().copied().collect::<Vec<_>>();
        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            if let Some(node) = self.nodes.get(&next) {
                out.push(node);
            }
            stack.extend(self.child_ids(next).iter().rev().copied());
        }
        out
    }

    pub fn descendant_ids(&self, id: N::Id) -> BTreeSet<N::Id> {
        self.descendants(id)
            .into_iter()
            .map(|node| node.node_id())
            .collect()
    }

    /// `id` plus all of its descendants.
    pub fn subtree_ids(&self, id: N::Id) -> BTreeSet<N::Id> {
        let mut ids = self.descendant_ids(id);
        ids.insert(id);
        ids
    }

    /// `[*ancestors, node]` labels joined with [`PATH_SEPARATOR`]. Never fails: a dangling
    /// parent (or an unknown `id`) renders as [`MISSING_NODE`].
    pub fn breadcrumb(&self, id: N::Id) -> String {
        let Some(node) = self.nodes.get(&id) else {
            return MISSING_NODE.to_string();
        };
        let mut segments = self
            .ancestor_path(id)
            .into_iter()
            .map(|ancestor| ancestor.map(|n| n.label()).unwrap_or(MISSING_NODE))
            .collect::<Vec<_>>();
        segments.push(node.label());
        segments.join(PATH_SEPARATOR)
    }

    /// Every node, parents before children, siblings by label. Nodes caught in a parent loop
    /// are unreachable from any root and come last in id order.
    pub fn preorder(&self) -> Vec<&N> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut seen = BTreeSet::new();
        for root_id in &self.roots {
            if let Some(root) = self.nodes.get(root_id)
                && seen.insert(*root_id)
            {
                out.push(root);
            }
            for node in self.descendants(*root_id) {
                if seen.insert(node.node_id()) {
                    out.push(node);
                }
            }
        }
        for node in self.nodes.values() {
            if seen.insert(node.node_id()) {
                out.push(node);
            }
        }
        out
    }

    /// Whether re-parenting `id` under `new_parent` would make it its own ancestor.
    pub fn would_create_cycle(&self, id: N::Id, new_parent: Option<N::Id>) -> bool {
        match new_parent {
            None => false,
            Some(parent) => parent == id || self.descendant_ids(id).contains(&parent),
        }
    }

    /// Sum of `direct(n)` over `id` and all of its descendants.
    pub fn subtree_count(&self, id: N::Id, direct: impl Fn(N::Id) -> usize) -> usize {
        self.subtree_ids(id).into_iter().map(direct).sum()
    }

    fn child_ids(&self, id: N::Id) -> &[N::Id] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Forest<Location> {
    /// Hierarchical locator path, e.g. `garage/S1/A`. A root shows its locator alone.
    pub fn display_string(&self, id: LocationId) -> String {
        self.breadcrumb(id)
    }
}

impl Forest<Category> {
    /// `/`-joined category names from the root down to `id`.
    pub fn breadcrumb_name(&self, id: CategoryId) -> String {
        self.breadcrumb(id)
    }
}
