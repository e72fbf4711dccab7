#![forbid(unsafe_code)]

use super::categories::category_tree;
use super::items::load_items;
use super::locations::location_tree;
use super::{ItemQuery, NodeQuery, SqliteStore, StoreError, matches_search};
use inv_core::ids::{CategoryId, LocationId};
use inv_core::scope::{DescendantScope, FilterChoice, enumerate_choices};
use inv_core::{Category, CategoryTree, Item, Location, LocationTree};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

fn location_scope(
    tree: &LocationTree,
    id: LocationId,
) -> Result<DescendantScope<LocationId>, StoreError> {
    DescendantScope::new(tree, id).ok_or_else(|| {
        tracing::warn!(id = id.get(), "location filter names an unknown location");
        StoreError::unknown_location(id)
    })
}

fn category_scope(
    tree: &CategoryTree,
    id: CategoryId,
) -> Result<DescendantScope<CategoryId>, StoreError> {
    DescendantScope::new(tree, id).ok_or_else(|| {
        tracing::warn!(id = id.get(), "category filter names an unknown category");
        StoreError::unknown_category(id)
    })
}

fn location_choice(tree: &LocationTree, id: LocationId) -> FilterChoice<LocationId> {
    FilterChoice {
        id,
        label: tree.display_string(id),
    }
}

fn category_choice(tree: &CategoryTree, id: CategoryId) -> FilterChoice<CategoryId> {
    FilterChoice {
        id,
        label: tree.breadcrumb_name(id),
    }
}

/// The selected node as a choice. A selection that does not resolve is a lookup failure.
fn selected_location(
    tree: &LocationTree,
    selected: Option<LocationId>,
) -> Result<Option<FilterChoice<LocationId>>, StoreError> {
    match selected {
        None => Ok(None),
        Some(id) if tree.contains(id) => Ok(Some(location_choice(tree, id))),
        Some(id) => Err(StoreError::unknown_location(id)),
    }
}

fn selected_category(
    tree: &CategoryTree,
    selected: Option<CategoryId>,
) -> Result<Option<FilterChoice<CategoryId>>, StoreError> {
    match selected {
        None => Ok(None),
        Some(id) if tree.contains(id) => Ok(Some(category_choice(tree, id))),
        Some(id) => Err(StoreError::unknown_category(id)),
    }
}

/// Location pre-order position, then name, then id. Unlocated items sort last.
fn item_order(positions: &BTreeMap<LocationId, usize>, a: &Item, b: &Item) -> Ordering {
    let position = |item: &Item| {
        item.location_id
            .and_then(|id| positions.get(&id).copied())
            .unwrap_or(usize::MAX)
    };
    position(a)
        .cmp(&position(b))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

impl SqliteStore {
    pub fn query_items(&self, query: &ItemQuery) -> Result<Vec<Item>, StoreError> {
        let locations = location_tree(&self.conn)?;
        let categories = category_tree(&self.conn)?;

        let location_scope = query
            .location
            .map(|id| location_scope(&locations, id))
            .transpose()?;
        let category_scope = query
            .category
            .map(|id| category_scope(&categories, id))
            .transpose()?;

        let mut items = load_items(&self.conn)?
            .into_iter()
            .filter(|item| matches_search(query.search.as_deref(), &[item.name.as_str()]))
            .filter(|item| query.amount.is_none_or(|amount| item.amount == amount))
            .filter(|item| {
                location_scope
                    .as_ref()
                    .is_none_or(|scope| scope.matches(item.location_id))
            })
            .filter(|item| {
                category_scope
                    .as_ref()
                    .is_none_or(|scope| scope.matches(item.category_id))
            })
            .filter(|item| {
                query
                    .expiration
                    .as_ref()
                    .is_none_or(|filter| filter.matches(item.expiration))
            })
            .collect::<Vec<_>>();

        let positions = locations
            .preorder()
            .into_iter()
            .enumerate()
            .map(|(position, location)| (location.id, position))
            .collect::<BTreeMap<_, _>>();
        items.sort_by(|a, b| item_order(&positions, a, b));

        tracing::debug!(matched = items.len(), "items queried");
        Ok(items)
    }

    /// Locations in tree pre-order, searched by name or locator.
    pub fn query_locations(
        &self,
        query: &NodeQuery<LocationId>,
    ) -> Result<Vec<Location>, StoreError> {
        let tree = location_tree(&self.conn)?;
        let scope = query
            .descendants_of
            .map(|id| location_scope(&tree, id))
            .transpose()?;
        let out = tree
            .preorder()
            .into_iter()
            .filter(|location| {
                matches_search(
                    query.search.as_deref(),
                    &[location.name.as_str(), location.locator.as_str()],
                )
            })
            .filter(|location| {
                scope
                    .as_ref()
                    .is_none_or(|scope| scope.matches(Some(location.id)))
            })
            .cloned()
            .collect::<Vec<_>>();
        tracing::debug!(matched = out.len(), "locations queried");
        Ok(out)
    }

    pub fn query_categories(
        &self,
        query: &NodeQuery<CategoryId>,
    ) -> Result<Vec<Category>, StoreError> {
        let tree = category_tree(&self.conn)?;
        let scope = query
            .descendants_of
            .map(|id| category_scope(&tree, id))
            .transpose()?;
        let out = tree
            .preorder()
            .into_iter()
            .filter(|category| matches_search(query.search.as_deref(), &[category.name.as_str()]))
            .filter(|category| {
                scope
                    .as_ref()
                    .is_none_or(|scope| scope.matches(Some(category.id)))
            })
            .cloned()
            .collect::<Vec<_>>();
        tracing::debug!(matched = out.len(), "categories queried");
        Ok(out)
    }

    /// Locations referenced by at least one item, plus the selected one.
    pub fn item_location_choices(
        &self,
        selected: Option<LocationId>,
    ) -> Result<Vec<FilterChoice<LocationId>>, StoreError> {
        let tree = location_tree(&self.conn)?;
        let selected = selected_location(&tree, selected)?;
        let in_use = load_items(&self.conn)?
            .into_iter()
            .filter_map(|item| item.location_id)
            .collect::<BTreeSet<_>>();
        Ok(enumerate_choices(
            in_use.into_iter().map(|id| location_choice(&tree, id)),
            selected,
        ))
    }

    /// Categories referenced by at least one item together with all of their ancestors, plus
    /// the selected one.
    pub fn item_category_choices(
        &self,
        selected: Option<CategoryId>,
    ) -> Result<Vec<FilterChoice<CategoryId>>, StoreError> {
        let tree = category_tree(&self.conn)?;
        let selected = selected_category(&tree, selected)?;
        let mut in_use = BTreeSet::new();
        for id in load_items(&self.conn)?
            .into_iter()
            .filter_map(|item| item.category_id)
        {
            in_use.insert(id);
            in_use.extend(tree.ancestors(id).into_iter().map(|ancestor| ancestor.id));
        }
        Ok(enumerate_choices(
            in_use.into_iter().map(|id| category_choice(&tree, id)),
            selected,
        ))
    }

    pub fn location_choices(
        &self,
        selected: Option<LocationId>,
    ) -> Result<Vec<FilterChoice<LocationId>>, StoreError> {
        let tree = location_tree(&self.conn)?;
        let selected = selected_location(&tree, selected)?;
        let all = tree
            .iter()
            .map(|location| location_choice(&tree, location.id))
            .collect::<Vec<_>>();
        Ok(enumerate_choices(all, selected))
    }

    pub fn category_choices(
        &self,
        selected: Option<CategoryId>,
    ) -> Result<Vec<FilterChoice<CategoryId>>, StoreError> {
        let tree = category_tree(&self.conn)?;
        let selected = selected_category(&tree, selected)?;
        let all = tree
            .iter()
            .map(|category| category_choice(&tree, category.id))
            .collect::<Vec<_>>();
        Ok(enumerate_choices(all, selected))
    }

    /// Distinct item amounts, ascending.
    pub fn item_amount_choices(&self) -> Result<Vec<i64>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT amount FROM items ORDER BY amount")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
