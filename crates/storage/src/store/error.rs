#![forbid(unsafe_code)]

use inv_core::expiration::ExpirationError;
use inv_core::ids::{CategoryId, ItemId, LocationId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A referenced record does not exist. Usually a stale or tampered parameter.
    #[error("unknown {entity} id {id}")]
    UnknownId { entity: &'static str, id: i64 },
    #[error("{entity} {id} cannot be moved under itself or its descendants")]
    TreeCycle { entity: &'static str, id: i64 },
    #[error(transparent)]
    IncorrectLookup(#[from] ExpirationError),
}

impl StoreError {
    pub(crate) fn unknown_location(id: LocationId) -> Self {
        Self::UnknownId {
            entity: LocationId::ENTITY,
            id: id.get(),
        }
    }

    pub(crate) fn unknown_category(id: CategoryId) -> Self {
        Self::UnknownId {
            entity: CategoryId::ENTITY,
            id: id.get(),
        }
    }

    pub(crate) fn unknown_item(id: ItemId) -> Self {
        Self::UnknownId {
            entity: ItemId::ENTITY,
            id: id.get(),
        }
    }
}
