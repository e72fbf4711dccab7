#![forbid(unsafe_code)]

use crate::ids::{CategoryId, ItemId, LocationId};
use crate::text::plural;
use crate::tree::TreeNode;
use time::Date;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_LOCATOR_LEN: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub locator: String,
    pub description: String,
    pub parent_id: Option<LocationId>,
}

impl TreeNode for Location {
    type Id = LocationId;

    fn node_id(&self) -> LocationId {
        self.id
    }

    fn parent_id(&self) -> Option<LocationId> {
        self.parent_id
    }

    fn label(&self) -> &str {
        &self.locator
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

impl TreeNode for Category {
    type Id = CategoryId;

    fn node_id(&self) -> CategoryId {
        self.id
    }

    fn parent_id(&self) -> Option<CategoryId> {
        self.parent_id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    #[default]
    Pieces,
    Meter,
    Centimeter,
    Millimeter,
    Milliliter,
    Liter,
}

impl Unit {
    pub const ALL: [Unit; 6] = [
        Unit::Pieces,
        Unit::Meter,
        Unit::Centimeter,
        Unit::Millimeter,
        Unit::Milliliter,
        Unit::Liter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Pieces => "pieces",
            Unit::Meter => "m",
            Unit::Centimeter => "cm",
            Unit::Millimeter => "mm",
            Unit::Milliliter => "mL",
            Unit::Liter => "L",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|unit| unit.as_str() == value)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub amount: i64,
    pub unit: Unit,
    pub location_id: Option<LocationId>,
    pub category_id: Option<CategoryId>,
    pub expiration: Option<Date>,
}

impl Item {
    pub const DEFAULT_AMOUNT: i64 = 1;

    /// `Batteries (x4)`, `Rope (12 m)`, prefixed with `<category>: ` when categorized.
    /// `category` must be the record referenced by `category_id`.
    pub fn display_name(&self, category: Option<&Category>) -> String {
        let mut out = match self.unit {
            Unit::Pieces if self.amount != 1 => format!("{} (x{})", self.name, self.amount),
            Unit::Pieces => self.name.clone(),
            unit => format!("{} ({} {unit})", self.name, self.amount),
        };
        if let Some(category) = category {
            out = format!("{}: {out}", category.name);
        }
        out
    }

    /// Quantity column: `1 piece`, `3 pieces`, `250 mL`.
    pub fn short_amount(&self) -> String {
        let unit = match self.unit {
            Unit::Pieces => plural(usize::try_from(self.amount).unwrap_or(0), "piece", "pieces"),
            unit => unit.as_str(),
        };
        format!("{} {unit}", self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(amount: i64, unit: Unit) -> Item {
        Item {
            id: ItemId::new(1),
            name: "Batteries".to_string(),
            description: String::new(),
            amount,
            unit,
            location_id: None,
            category_id: None,
            expiration: None,
        }
    }

    #[test]
    fn display_name_pluralizes_pieces_only() {
        assert_eq!(item(1, Unit::Pieces).display_name(None), "Batteries");
        assert_eq!(item(4, Unit::Pieces).display_name(None), "Batteries (x4)");
        assert_eq!(item(12, Unit::Meter).display_name(None), "Batteries (12 m)");
    }

    #[test]
    fn display_name_prefixes_category() {
        let category = Category {
            id: CategoryId::new(3),
            name: "Electronics".to_string(),
            parent_id: None,
        };
        assert_eq!(
            item(2, Unit::Pieces).display_name(Some(&category)),
            "Electronics: Batteries (x2)"
        );
    }

    #[test]
    fn short_amount_uses_singular_for_one_piece() {
        assert_eq!(item(1, Unit::Pieces).short_amount(), "1 piece");
        assert_eq!(item(0, Unit::Pieces).short_amount(), "0 pieces");
        assert_eq!(item(3, Unit::Pieces).short_amount(), "3 pieces");
        assert_eq!(item(250, Unit::Milliliter).short_amount(), "250 mL");
    }

    #[test]
    fn unit_parse_accepts_stored_values() {
        for unit in Unit::ALL {
            assert_eq!(Unit::parse(unit.as_str()), Some(unit));
        }
        assert_eq!(Unit::parse("ml"), None);
        assert_eq!(Unit::parse("piece"), None);
    }
}
