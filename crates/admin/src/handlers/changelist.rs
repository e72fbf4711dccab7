#![forbid(unsafe_code)]

//! Changelists: one page of records for a model, narrowed by search and filters, together
//! with every filter's choice list so a client can render the sidebar.

use crate::config::TreeDisplayMode;
use crate::site::{FilterKind, ModelAdmin, ModelKind};
use crate::*;
use inv_core::expiration::{ExpirationError, ExpirationFilter, FIELD_PREFIX, today_local};
use inv_core::ids::{CategoryId, LocationId};
use inv_core::params::{FormParams, ParamError, non_blank, optional_id as form_id};
use inv_core::scope::FilterChoice;
use inv_core::{Forest, TreeNode};
use inv_storage::{ItemQuery, NodeQuery, StoreError};
use serde_json::{Value, json};
use std::collections::BTreeMap;

const SEARCH_PARAM: &str = "q";
const ALL_LABEL: &str = "All";
const INDENT: &str = "    ";

fn incorrect_lookup(param: &str, value: &str) -> Value {
    store_error(StoreError::IncorrectLookup(ExpirationError::IncorrectLookup {
        param: param.to_string(),
        value: value.to_string(),
    }))
}

fn param_lookup(err: ParamError) -> Value {
    match err {
        ParamError::Missing { key } => incorrect_lookup(&key, ""),
        ParamError::NotAnInteger { key, value }
        | ParamError::NotABoolean { key, value }
        | ParamError::NotAnId { key, value } => incorrect_lookup(&key, &value),
    }
}

/// Every parameter must be the search box or belong to one of the model's filters.
fn check_parameters(admin: &ModelAdmin, query: &FormParams) -> Result<(), Value> {
    for (key, value) in query {
        let known = key == SEARCH_PARAM
            || admin.filters.iter().any(|filter| match filter.parameter() {
                Some(parameter) => parameter == key,
                None => key.starts_with(FIELD_PREFIX),
            });
        if !known {
            return Err(incorrect_lookup(key, value));
        }
    }
    Ok(())
}

fn search_term(query: &FormParams) -> Option<String> {
    non_blank(query, SEARCH_PARAM).map(str::to_string)
}

fn choice_filter<Id: Copy + PartialEq>(
    filter: FilterKind,
    choices: Vec<FilterChoice<Id>>,
    selected: Option<Id>,
    raw: impl Fn(Id) -> i64,
) -> Value {
    let mut out = vec![json!({ "label": ALL_LABEL, "value": null, "selected": selected.is_none() })];
    out.extend(choices.into_iter().map(|choice| {
        json!({
            "label": choice.label,
            "value": raw(choice.id),
            "selected": selected == Some(choice.id),
        })
    }));
    json!({
        "title": filter.title(),
        "parameter": filter.parameter(),
        "choices": out,
    })
}

fn amount_filter(mut amounts: Vec<i64>, selected: Option<i64>) -> Value {
    if let Some(amount) = selected
        && !amounts.contains(&amount)
    {
        amounts.push(amount);
        amounts.sort_unstable();
    }
    let mut out = vec![json!({ "label": ALL_LABEL, "value": null, "selected": selected.is_none() })];
    out.extend(amounts.into_iter().map(|amount| {
        json!({
            "label": amount.to_string(),
            "value": amount,
            "selected": selected == Some(amount),
        })
    }));
    json!({
        "title": FilterKind::Amount.title(),
        "parameter": FilterKind::Amount.parameter(),
        "choices": out,
    })
}

fn expiration_filter(filter: &ExpirationFilter, query: &FormParams) -> Value {
    let choices = filter
        .choices(query)
        .into_iter()
        .map(|view| {
            json!({
                "label": view.display,
                "selected": view.selected,
                "params": view.params,
            })
        })
        .collect::<Vec<_>>();
    json!({
        "title": FilterKind::Expiration.title(),
        "parameter": null,
        "choices": choices,
    })
}

/// A tree changelist row. The label follows the model's display mode; `items` counts the
/// node's items together with those of every node below it.
fn tree_row<N: TreeNode>(
    tree: &Forest<N>,
    node: &N,
    raw_id: i64,
    name: &str,
    mode: TreeDisplayMode,
    counts: &BTreeMap<N::Id, usize>,
) -> Value {
    let id = node.node_id();
    let depth = tree.depth(id);
    let label = match mode {
        TreeDisplayMode::Indentation => format!("{}{}", INDENT.repeat(depth), node.label()),
        TreeDisplayMode::Breadcrumbs => tree.breadcrumb(id),
    };
    let count = tree.subtree_count(id, |id| counts.get(&id).copied().unwrap_or(0));
    json!({
        "id": raw_id,
        "label": label,
        "depth": depth,
        "items": format!("Items in {name} ({count})"),
        "item_count": count,
    })
}

fn page(admin: &ModelAdmin, search: Option<String>, rows: Vec<Value>, filters: Vec<Value>) -> Value {
    json!({
        "model": admin.kind.name(),
        "title": inv_core::text::capitalize(admin.verbose_name_plural),
        "search": search,
        "count": rows.len(),
        "count_label": admin.count_label(rows.len()),
        "columns": admin.list_display,
        "actions": admin.actions.iter().map(|action| action.name()).collect::<Vec<_>>(),
        "rows": rows,
        "filters": filters,
    })
}

impl AdminServer {
    /// `{model, params}` where `params` is the query string as an object.
    pub(crate) fn method_changelist(&mut self, args: Args) -> Value {
        let admin = match self.model_admin(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let query = match string_map(&args, "params") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        if let Err(resp) = check_parameters(&admin, &query) {
            return resp;
        }

        let result = match admin.kind {
            ModelKind::Item => self.item_changelist(&admin, &query),
            ModelKind::Location => self.location_changelist(&admin, &query),
            ModelKind::Category => self.category_changelist(&admin, &query),
        };
        match result {
            Ok(page) => ai_ok("changelist", page),
            Err(resp) => resp,
        }
    }

    fn item_changelist(&self, admin: &ModelAdmin, query: &FormParams) -> Result<Value, Value> {
        let search = search_term(query);
        let location = form_id(query, "location", LocationId::parse).map_err(param_lookup)?;
        let category = form_id(query, "category", CategoryId::parse).map_err(param_lookup)?;
        let amount = match non_blank(query, "amount") {
            None => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| incorrect_lookup("amount", raw))?,
            ),
        };
        let expiration = ExpirationFilter::new(today_local(), query)
            .map_err(|err| store_error(err.into()))?;

        let items = self
            .store
            .query_items(&ItemQuery {
                search: search.clone(),
                location,
                category,
                amount,
                expiration: Some(expiration.clone()),
            })
            .map_err(store_error)?;

        let locations = self.store.location_tree().map_err(store_error)?;
        let categories = self.store.category_tree().map_err(store_error)?;
        let rows = items
            .iter()
            .map(|item| {
                let category = item.category_id.and_then(|id| categories.get(id));
                json!({
                    "id": item.id.get(),
                    "display": item.display_name(category),
                    "name": item.name,
                    "category": item.category_id.map(|id| categories.breadcrumb_name(id)),
                    "location": item.location_id.map(|id| locations.display_string(id)),
                    "qty": item.short_amount(),
                    "expiration": date_value(item.expiration),
                })
            })
            .collect::<Vec<_>>();

        let mut filters = Vec::with_capacity(admin.filters.len());
        for filter in admin.filters {
            let rendered = match filter {
                FilterKind::ItemLocation => choice_filter(
                    *filter,
                    self.store
                        .item_location_choices(location)
                        .map_err(store_error)?,
                    location,
                    LocationId::get,
                ),
                FilterKind::ItemCategory => choice_filter(
                    *filter,
                    self.store
                        .item_category_choices(category)
                        .map_err(store_error)?,
                    category,
                    CategoryId::get,
                ),
                FilterKind::Amount => amount_filter(
                    self.store.item_amount_choices().map_err(store_error)?,
                    amount,
                ),
                FilterKind::Expiration => expiration_filter(&expiration, query),
                FilterKind::Descendants => continue,
            };
            filters.push(rendered);
        }

        Ok(page(admin, search, rows, filters))
    }

    fn location_changelist(&self, admin: &ModelAdmin, query: &FormParams) -> Result<Value, Value> {
        let search = search_term(query);
        let descendants =
            form_id(query, "descendants", LocationId::parse).map_err(param_lookup)?;
        let locations = self
            .store
            .query_locations(&NodeQuery {
                search: search.clone(),
                descendants_of: descendants,
            })
            .map_err(store_error)?;

        let tree = self.store.location_tree().map_err(store_error)?;
        let counts = self.store.location_item_counts().map_err(store_error)?;
        let mode = admin
            .display_mode
            .unwrap_or(TreeDisplayMode::Indentation);
        let rows = locations
            .iter()
            .map(|location| {
                tree_row(&tree, location, location.id.get(), &location.name, mode, &counts)
            })
            .collect::<Vec<_>>();

        let choices = self
            .store
            .location_choices(descendants)
            .map_err(store_error)?;
        let filters = vec![choice_filter(
            FilterKind::Descendants,
            choices,
            descendants,
            LocationId::get,
        )];
        Ok(page(admin, search, rows, filters))
    }

    fn category_changelist(&self, admin: &ModelAdmin, query: &FormParams) -> Result<Value, Value> {
        let search = search_term(query);
        let descendants =
            form_id(query, "descendants", CategoryId::parse).map_err(param_lookup)?;
        let categories = self
            .store
            .query_categories(&NodeQuery {
                search: search.clone(),
                descendants_of: descendants,
            })
            .map_err(store_error)?;

        let tree = self.store.category_tree().map_err(store_error)?;
        let counts = self.store.category_item_counts().map_err(store_error)?;
        let mode = admin
            .display_mode
            .unwrap_or(TreeDisplayMode::Breadcrumbs);
        let rows = categories
            .iter()
            .map(|category| {
                tree_row(&tree, category, category.id.get(), &category.name, mode, &counts)
            })
            .collect::<Vec<_>>();

        let choices = self
            .store
            .category_choices(descendants)
            .map_err(store_error)?;
        let filters = vec![choice_filter(
            FilterKind::Descendants,
            choices,
            descendants,
            CategoryId::get,
        )];
        Ok(page(admin, search, rows, filters))
    }
}
