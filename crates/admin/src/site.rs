#![forbid(unsafe_code)]

//! The admin site registry: which models are exposed and how each one is listed,
//! filtered and acted upon. Built once at startup and handed to the server by value.

use crate::actions::ActionKind;
use crate::config::{Cli, TreeDisplayMode};
use serde_json::{Value, json};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum ModelKind {
    Item,
    Location,
    Category,
}

impl ModelKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            ModelKind::Item => "item",
            ModelKind::Location => "location",
            ModelKind::Category => "category",
        }
    }
}

/// A changelist filter and the query parameter(s) it owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FilterKind {
    ItemLocation,
    ItemCategory,
    Amount,
    Expiration,
    /// Self filter on a tree model: the node and everything below it.
    Descendants,
}

impl FilterKind {
    pub(crate) fn title(self) -> &'static str {
        match self {
            FilterKind::ItemLocation => "location",
            FilterKind::ItemCategory => "category",
            FilterKind::Amount => "amount",
            FilterKind::Expiration => "expiration",
            FilterKind::Descendants => "container",
        }
    }

    /// The single query parameter of a plain filter. The expiration filter owns the whole
    /// `expiration__*` family instead.
    pub(crate) fn parameter(self) -> Option<&'static str> {
        match self {
            FilterKind::ItemLocation => Some("location"),
            FilterKind::ItemCategory => Some("category"),
            FilterKind::Amount => Some("amount"),
            FilterKind::Expiration => None,
            FilterKind::Descendants => Some("descendants"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ModelAdmin {
    pub(crate) kind: ModelKind,
    pub(crate) verbose_name: &'static str,
    pub(crate) verbose_name_plural: &'static str,
    pub(crate) search_fields: &'static [&'static str],
    pub(crate) list_display: &'static [&'static str],
    pub(crate) filters: &'static [FilterKind],
    pub(crate) actions: &'static [ActionKind],
    /// Label rendering for tree models; `None` for flat models.
    pub(crate) display_mode: Option<TreeDisplayMode>,
}

impl ModelAdmin {
    /// `1 item`, `3 items`.
    pub(crate) fn count_label(&self, count: usize) -> String {
        format!(
            "{count} {}",
            inv_core::text::plural(count, self.verbose_name, self.verbose_name_plural)
        )
    }

    pub(crate) fn action(&self, name: &str) -> Option<ActionKind> {
        self.actions
            .iter()
            .copied()
            .find(|action| action.name() == name)
    }

    pub(crate) fn describe(&self) -> Value {
        json!({
            "model": self.kind.name(),
            "verbose_name": self.verbose_name,
            "verbose_name_plural": self.verbose_name_plural,
            "title": inv_core::text::capitalize(self.verbose_name_plural),
            "search_fields": self.search_fields,
            "list_display": self.list_display,
            "filters": self
                .filters
                .iter()
                .map(|filter| filter.title())
                .collect::<Vec<_>>(),
            "actions": self
                .actions
                .iter()
                .map(|action| json!({ "name": action.name(), "description": action.description() }))
                .collect::<Vec<_>>(),
            "display_mode": self.display_mode.map(TreeDisplayMode::as_str),
        })
    }
}

#[derive(Clone, Debug)]
pub(crate) struct AdminSite {
    pub(crate) site_title: String,
    pub(crate) site_header: String,
    models: BTreeMap<&'static str, ModelAdmin>,
}

impl AdminSite {
    pub(crate) fn new(site_title: String, site_header: String) -> Self {
        Self {
            site_title,
            site_header,
            models: BTreeMap::new(),
        }
    }

    pub(crate) fn register(&mut self, admin: ModelAdmin) {
        self.models.insert(admin.kind.name(), admin);
    }

    pub(crate) fn model(&self, name: &str) -> Option<&ModelAdmin> {
        self.models.get(name)
    }

    pub(crate) fn models(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.models.values()
    }

    /// The inventory site: items, locations and categories.
    pub(crate) fn inventory(cli: &Cli) -> Self {
        let mut site = Self::new(cli.site_title.clone(), cli.site_header.clone());
        site.register(ModelAdmin {
            kind: ModelKind::Item,
            verbose_name: "item",
            verbose_name_plural: "items",
            search_fields: &["name"],
            list_display: &["name", "category", "location", "qty", "expiration"],
            filters: &[
                FilterKind::ItemLocation,
                FilterKind::ItemCategory,
                FilterKind::Amount,
                FilterKind::Expiration,
            ],
            actions: &[ActionKind::MoveToOtherLocation, ActionKind::ChangeCategory],
            display_mode: None,
        });
        site.register(ModelAdmin {
            kind: ModelKind::Location,
            verbose_name: "location",
            verbose_name_plural: "locations",
            search_fields: &["name", "locator"],
            list_display: &["label", "items"],
            filters: &[FilterKind::Descendants],
            actions: &[ActionKind::CreateSections],
            display_mode: Some(cli.locations_display_mode),
        });
        site.register(ModelAdmin {
            kind: ModelKind::Category,
            verbose_name: "category",
            verbose_name_plural: "categories",
            search_fields: &["name"],
            list_display: &["label", "items"],
            filters: &[FilterKind::Descendants],
            actions: &[],
            display_mode: Some(cli.categories_display_mode),
        });
        site
    }

    pub(crate) fn describe(&self) -> Value {
        json!({
            "site_title": self.site_title,
            "site_header": self.site_header,
            "index_title": "Inventory management",
            "models": self.models().map(ModelAdmin::describe).collect::<Vec<_>>(),
        })
    }
}
