#![forbid(unsafe_code)]

use super::audit::{AuditEntry, log_entry};
use super::{
    AuditAction, LocationPatch, NewLocation, SqliteStore, StoreError, normalize_locator,
    normalize_name,
};
use inv_core::ids::LocationId;
use inv_core::{Location, LocationTree};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeMap;

const SELECT_LOCATION: &str = "SELECT id, name, locator, description, parent_id FROM locations";

pub(super) fn read_location(row: &Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: LocationId::new(row.get(0)?),
        name: row.get(1)?,
        locator: row.get(2)?,
        description: row.get(3)?,
        parent_id: row.get::<_, Option<i64>>(4)?.map(LocationId::new),
    })
}

pub(super) fn load_locations(conn: &Connection) -> Result<Vec<Location>, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_LOCATION} ORDER BY id"))?;
    let rows = stmt.query_map([], read_location)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(super) fn location_tree(conn: &Connection) -> Result<LocationTree, StoreError> {
    Ok(LocationTree::new(load_locations(conn)?))
}

pub(super) fn find_location(
    conn: &Connection,
    id: LocationId,
) -> Result<Option<Location>, StoreError> {
    Ok(conn
        .query_row(
            &format!("{SELECT_LOCATION} WHERE id=?1"),
            params![id.get()],
            read_location,
        )
        .optional()?)
}

pub(super) fn ensure_location(conn: &Connection, id: LocationId) -> Result<Location, StoreError> {
    find_location(conn, id)?.ok_or_else(|| StoreError::unknown_location(id))
}

impl SqliteStore {
    pub fn create_location(
        &mut self,
        actor: &str,
        request: NewLocation,
    ) -> Result<Location, StoreError> {
        let NewLocation {
            name,
            locator,
            description,
            parent_id,
        } = request;
        let name = normalize_name(&name)?;
        let locator = normalize_locator(&locator)?;

        let tx = self.conn.transaction()?;
        if let Some(parent_id) = parent_id {
            ensure_location(&tx, parent_id)?;
        }
        tx.execute(
            "INSERT INTO locations(name, locator, description, parent_id) VALUES (?1, ?2, ?3, ?4)",
            params![name, locator, description, parent_id.map(LocationId::get)],
        )?;
        let location = Location {
            id: LocationId::new(tx.last_insert_rowid()),
            name,
            locator,
            description,
            parent_id,
        };

        let repr = location_tree(&tx)?.display_string(location.id);
        log_entry(
            &tx,
            AuditEntry {
                actor,
                model: LocationId::ENTITY,
                object_id: location.id.get(),
                object_repr: &repr,
                action: AuditAction::Addition,
                message: "Added.",
            },
        )?;
        tx.commit()?;

        tracing::info!(id = location.id.get(), location = %repr, "location created");
        Ok(location)
    }

    pub fn get_location(&self, id: LocationId) -> Result<Location, StoreError> {
        ensure_location(&self.conn, id)
    }

    /// All locations in id order.
    pub fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        load_locations(&self.conn)
    }

    pub fn location_tree(&self) -> Result<LocationTree, StoreError> {
        location_tree(&self.conn)
    }

    pub fn update_location(
        &mut self,
        actor: &str,
        id: LocationId,
        patch: LocationPatch,
    ) -> Result<Location, StoreError> {
        let tx = self.conn.transaction()?;
        let mut location = ensure_location(&tx, id)?;

        if let Some(name) = patch.name {
            location.name = normalize_name(&name)?;
        }
        if let Some(locator) = patch.locator {
            location.locator = normalize_locator(&locator)?;
        }
        if let Some(description) = patch.description {
            location.description = description;
        }
        if let Some(parent_id) = patch.parent_id {
            if let Some(parent) = parent_id {
                ensure_location(&tx, parent)?;
            }
            if location_tree(&tx)?.would_create_cycle(id, parent_id) {
                return Err(StoreError::TreeCycle {
                    entity: LocationId::ENTITY,
                    id: id.get(),
                });
            }
            location.parent_id = parent_id;
        }

        tx.execute(
            "UPDATE locations SET name=?2, locator=?3, description=?4, parent_id=?5 WHERE id=?1",
            params![
                id.get(),
                location.name,
                location.locator,
                location.description,
                location.parent_id.map(LocationId::get),
            ],
        )?;

        let repr = location_tree(&tx)?.display_string(id);
        log_entry(
            &tx,
            AuditEntry {
                actor,
                model: LocationId::ENTITY,
                object_id: id.get(),
                object_repr: &repr,
                action: AuditAction::Change,
                message: "Changed.",
            },
        )?;
        tx.commit()?;

        tracing::info!(id = id.get(), location = %repr, "location updated");
        Ok(location)
    }

    /// Children become roots and items lose their location; neither is deleted.
    pub fn delete_location(&mut self, actor: &str, id: LocationId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        ensure_location(&tx, id)?;
        let repr = location_tree(&tx)?.display_string(id);
        log_entry(
            &tx,
            AuditEntry {
                actor,
                model: LocationId::ENTITY,
                object_id: id.get(),
                object_repr: &repr,
                action: AuditAction::Deletion,
                message: "Deleted.",
            },
        )?;
        tx.execute("DELETE FROM locations WHERE id=?1", params![id.get()])?;
        tx.commit()?;

        tracing::info!(id = id.get(), location = %repr, "location deleted");
        Ok(())
    }

    /// Number of items referencing each location directly.
    pub fn location_item_counts(&self) -> Result<BTreeMap<LocationId, usize>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT location_id, COUNT(*) FROM items WHERE location_id IS NOT NULL GROUP BY location_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                LocationId::new(row.get(0)?),
                usize::try_from(row.get::<_, i64>(1)?).unwrap_or(0),
            ))
        })?;
        Ok(rows.collect::<Result<BTreeMap<_, _>, _>>()?)
    }
}
