#![forbid(unsafe_code)]

//! Descendant-scoped filtering over tree-typed references.

use crate::tree::{Forest, TreeNode};
use std::collections::{BTreeMap, BTreeSet};

/// Matches a record whose reference is `target` or any descendant of `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescendantScope<Id: Ord> {
    target: Id,
    members: BTreeSet<Id>,
}

impl<Id: Copy + Ord + std::fmt::Debug> DescendantScope<Id> {
    /// `None` when `target` is not a node of `forest`.
    pub fn new<N: TreeNode<Id = Id>>(forest: &Forest<N>, target: Id) -> Option<Self> {
        if !forest.contains(target) {
            return None;
        }
        Some(Self {
            target,
            members: forest.subtree_ids(target),
        })
    }

    pub fn matches(&self, reference: Option<Id>) -> bool {
        reference.is_some_and(|id| id == self.target || self.members.contains(&id))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterChoice<Id> {
    pub id: Id,
    pub label: String,
}

/// Deduplicates `candidates` by id, orders them by label, and makes sure `selected` is listed
/// even when nothing references it.
pub fn enumerate_choices<Id: Copy + Ord>(
    candidates: impl IntoIterator<Item = FilterChoice<Id>>,
    selected: Option<FilterChoice<Id>>,
) -> Vec<FilterChoice<Id>> {
    let mut unique = BTreeMap::<Id, String>::new();
    for choice in candidates.into_iter().chain(selected) {
        unique.entry(choice.id).or_insert(choice.label);
    }
    let mut out = unique
        .into_iter()
        .map(|(id, label)| FilterChoice { id, label })
        .collect::<Vec<_>>();
    out.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
    out
}
