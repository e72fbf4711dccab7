#![forbid(unsafe_code)]

use inv_core::expiration::ExpirationFilter;
use inv_core::ids::{CategoryId, ItemId, LocationId};
use inv_core::sections::PlannedSection;
use inv_core::Unit;
use time::Date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewLocation {
    pub name: String,
    pub locator: String,
    pub description: String,
    pub parent_id: Option<LocationId>,
}

/// `None` leaves a field untouched; `Some(None)` clears a nullable reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationPatch {
    pub name: Option<String>,
    pub locator: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<Option<LocationId>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub parent_id: Option<Option<CategoryId>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub amount: i64,
    pub unit: Unit,
    pub location_id: Option<LocationId>,
    pub category_id: Option<CategoryId>,
    pub expiration: Option<Date>,
}

impl NewItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            amount: inv_core::Item::DEFAULT_AMOUNT,
            unit: Unit::default(),
            location_id: None,
            category_id: None,
            expiration: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<i64>,
    pub unit: Option<Unit>,
    pub location_id: Option<Option<LocationId>>,
    pub category_id: Option<Option<CategoryId>>,
    pub expiration: Option<Option<Date>>,
}

/// The reference column a bulk item update rewrites.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemReference {
    Location(Option<LocationId>),
    Category(Option<CategoryId>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemsUpdateRequest {
    pub actor: String,
    pub ids: Vec<ItemId>,
    pub set: ItemReference,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionsCreateRequest {
    pub actor: String,
    pub parent_id: LocationId,
    pub sections: Vec<PlannedSection>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditAction {
    Addition,
    Change,
    Deletion,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Addition => "addition",
            AuditAction::Change => "change",
            AuditAction::Deletion => "deletion",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "addition" => Some(AuditAction::Addition),
            "change" => Some(AuditAction::Change),
            "deletion" => Some(AuditAction::Deletion),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditRow {
    pub id: i64,
    pub ts_ms: i64,
    pub actor: String,
    pub model: String,
    pub object_id: i64,
    pub object_repr: String,
    pub action: AuditAction,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditListRequest {
    pub model: Option<String>,
    pub object_id: Option<i64>,
    pub limit: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ItemQuery {
    /// Whitespace-separated terms; every term must occur in the name, case-insensitively.
    pub search: Option<String>,
    /// Narrow to items in this location or any location below it.
    pub location: Option<LocationId>,
    /// Narrow to items in this category or any category below it.
    pub category: Option<CategoryId>,
    pub amount: Option<i64>,
    pub expiration: Option<ExpirationFilter>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeQuery<Id> {
    pub search: Option<String>,
    /// Narrow to this node and its descendants.
    pub descendants_of: Option<Id>,
}

impl<Id> Default for NodeQuery<Id> {
    fn default() -> Self {
        Self {
            search: None,
            descendants_of: None,
        }
    }
}
