#![forbid(unsafe_code)]

pub mod expiration;
pub mod model;
pub mod params;
pub mod scope;
pub mod sections;
pub mod tree;

pub use model::{Category, Item, Location, Unit};
pub use tree::{CategoryTree, Forest, LocationTree, TreeNode};

pub mod ids {
    macro_rules! record_id {
        ($name:ident, $entity:literal) => {
            #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(i64);

            impl $name {
                pub const ENTITY: &'static str = $entity;

                pub fn new(value: i64) -> Self {
                    Self(value)
                }

                pub fn get(self) -> i64 {
                    self.0
                }

                /// Parses a form or query value. Only positive integers are valid record ids.
                pub fn parse(raw: &str) -> Option<Self> {
                    raw.trim().parse::<i64>().ok().filter(|v| *v > 0).map(Self)
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        };
    }

    record_id!(LocationId, "location");
    record_id!(CategoryId, "category");
    record_id!(ItemId, "item");
}

pub mod text {
    /// Singular form when `count == 1`, plural otherwise.
    pub fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
        if count == 1 { singular } else { plural }
    }

    pub fn capitalize(value: &str) -> String {
        let mut chars = value.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
