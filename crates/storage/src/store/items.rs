#![forbid(unsafe_code)]

use super::audit::{AuditEntry, log_entry};
use super::categories::{ensure_category, find_category};
use super::locations::ensure_location;
use super::{
    AuditAction, ItemPatch, ItemReference, ItemsUpdateRequest, NewItem, SqliteStore, StoreError,
    normalize_name, placeholders,
};
use inv_core::expiration::{format_date, parse_date};
use inv_core::ids::{CategoryId, ItemId, LocationId};
use inv_core::{Item, Unit};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

const SELECT_ITEM: &str = "SELECT id, name, description, amount, unit, location_id, category_id, expiration FROM items";

#[derive(Debug)]
struct BadColumn(&'static str);

impl std::fmt::Display for BadColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unexpected {} value", self.0)
    }
}

impl std::error::Error for BadColumn {}

pub(super) fn read_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    let unit: String = row.get(4)?;
    let unit = Unit::parse(&unit).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(BadColumn("unit")))
    })?;
    let expiration = match row.get::<_, Option<String>>(7)? {
        None => None,
        Some(raw) => Some(parse_date(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                Type::Text,
                Box::new(BadColumn("expiration")),
            )
        })?),
    };
    Ok(Item {
        id: ItemId::new(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        unit,
        location_id: row.get::<_, Option<i64>>(5)?.map(LocationId::new),
        category_id: row.get::<_, Option<i64>>(6)?.map(CategoryId::new),
        expiration,
    })
}

pub(super) fn load_items(conn: &Connection) -> Result<Vec<Item>, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_ITEM} ORDER BY id"))?;
    let rows = stmt.query_map([], read_item)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn find_item(conn: &Connection, id: ItemId) -> Result<Option<Item>, StoreError> {
    Ok(conn
        .query_row(
            &format!("{SELECT_ITEM} WHERE id=?1"),
            params![id.get()],
            read_item,
        )
        .optional()?)
}

fn ensure_item(conn: &Connection, id: ItemId) -> Result<Item, StoreError> {
    find_item(conn, id)?.ok_or_else(|| StoreError::unknown_item(id))
}

fn items_by_ids(conn: &Connection, ids: &[ItemId]) -> Result<Vec<Item>, StoreError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "{SELECT_ITEM} WHERE id IN ({}) ORDER BY id",
        placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ids.iter().map(|id| id.get())), read_item)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Display string of `item` as currently stored, category prefix included.
pub(super) fn item_display(conn: &Connection, item: &Item) -> Result<String, StoreError> {
    let category = match item.category_id {
        Some(id) => find_category(conn, id)?,
        None => None,
    };
    Ok(item.display_name(category.as_ref()))
}

fn validate_references(
    conn: &Connection,
    location_id: Option<LocationId>,
    category_id: Option<CategoryId>,
) -> Result<(), StoreError> {
    if let Some(id) = location_id {
        ensure_location(conn, id)?;
    }
    if let Some(id) = category_id {
        ensure_category(conn, id)?;
    }
    Ok(())
}

impl SqliteStore {
    pub fn create_item(&mut self, actor: &str, request: NewItem) -> Result<Item, StoreError> {
        let name = normalize_name(&request.name)?;
        let tx = self.conn.transaction()?;
        validate_references(&tx, request.location_id, request.category_id)?;
        tx.execute(
            r#"
            INSERT INTO items(name, description, amount, unit, location_id, category_id, expiration)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                name,
                request.description,
                request.amount,
                request.unit.as_str(),
                request.location_id.map(LocationId::get),
                request.category_id.map(CategoryId::get),
                request.expiration.map(format_date),
            ],
        )?;
        let item = Item {
            id: ItemId::new(tx.last_insert_rowid()),
            name,
            description: request.description,
            amount: request.amount,
            unit: request.unit,
            location_id: request.location_id,
            category_id: request.category_id,
            expiration: request.expiration,
        };

        let repr = item_display(&tx, &item)?;
        log_entry(
            &tx,
            AuditEntry {
                actor,
                model: ItemId::ENTITY,
                object_id: item.id.get(),
                object_repr: &repr,
                action: AuditAction::Addition,
                message: "Added.",
            },
        )?;
        tx.commit()?;

        tracing::info!(id = item.id.get(), item = %repr, "item created");
        Ok(item)
    }

    pub fn get_item(&self, id: ItemId) -> Result<Item, StoreError> {
        ensure_item(&self.conn, id)
    }

    /// Items among `ids` that exist, in id order. Unknown ids are skipped.
    pub fn items_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>, StoreError> {
        items_by_ids(&self.conn, ids)
    }

    pub fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        load_items(&self.conn)
    }

    pub fn item_display(&self, item: &Item) -> Result<String, StoreError> {
        item_display(&self.conn, item)
    }

    pub fn update_item(
        &mut self,
        actor: &str,
        id: ItemId,
        patch: ItemPatch,
    ) -> Result<Item, StoreError> {
        let tx = self.conn.transaction()?;
        let mut item = ensure_item(&tx, id)?;

        if let Some(name) = patch.name {
            item.name = normalize_name(&name)?;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(amount) = patch.amount {
            item.amount = amount;
        }
        if let Some(unit) = patch.unit {
            item.unit = unit;
        }
        if let Some(location_id) = patch.location_id {
            item.location_id = location_id;
        }
        if let Some(category_id) = patch.category_id {
            item.category_id = category_id;
        }
        if let Some(expiration) = patch.expiration {
            item.expiration = expiration;
        }
        validate_references(&tx, item.location_id, item.category_id)?;

        tx.execute(
            r#"
            UPDATE items
            SET name=?2, description=?3, amount=?4, unit=?5, location_id=?6, category_id=?7, expiration=?8
            WHERE id=?1
            "#,
            params![
                id.get(),
                item.name,
                item.description,
                item.amount,
                item.unit.as_str(),
                item.location_id.map(LocationId::get),
                item.category_id.map(CategoryId::get),
                item.expiration.map(format_date),
            ],
        )?;

        let repr = item_display(&tx, &item)?;
        log_entry(
            &tx,
            AuditEntry {
                actor,
                model: ItemId::ENTITY,
                object_id: id.get(),
                object_repr: &repr,
                action: AuditAction::Change,
                message: "Changed.",
            },
        )?;
        tx.commit()?;

        tracing::info!(id = id.get(), item = %repr, "item updated");
        Ok(item)
    }

    pub fn delete_item(&mut self, actor: &str, id: ItemId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let item = ensure_item(&tx, id)?;
        let repr = item_display(&tx, &item)?;
        log_entry(
            &tx,
            AuditEntry {
                actor,
                model: ItemId::ENTITY,
                object_id: id.get(),
                object_repr: &repr,
                action: AuditAction::Deletion,
                message: "Deleted.",
            },
        )?;
        tx.execute("DELETE FROM items WHERE id=?1", params![id.get()])?;
        tx.commit()?;

        tracing::info!(id = id.get(), item = %repr, "item deleted");
        Ok(())
    }

    /// Rewrites one reference column on every selected item in a single transaction.
    ///
    /// The target is resolved first; an unknown target fails with `UnknownId` before anything
    /// is written. Each item gets a `change` audit entry carrying its display string from
    /// before the update. Returns the number of items updated; unknown item ids are skipped.
    pub fn update_items(&mut self, request: ItemsUpdateRequest) -> Result<usize, StoreError> {
        let ItemsUpdateRequest { actor, ids, set } = request;
        let tx = self.conn.transaction()?;

        let (column, target, message) = match set {
            ItemReference::Location(target) => {
                if let Some(id) = target {
                    ensure_location(&tx, id)?;
                }
                ("location_id", target.map(LocationId::get), "Changed location.")
            }
            ItemReference::Category(target) => {
                if let Some(id) = target {
                    ensure_category(&tx, id)?;
                }
                ("category_id", target.map(CategoryId::get), "Changed category.")
            }
        };

        let items = items_by_ids(&tx, &ids)?;
        if items.is_empty() {
            return Ok(0);
        }

        for item in &items {
            let repr = item_display(&tx, item)?;
            log_entry(
                &tx,
                AuditEntry {
                    actor: &actor,
                    model: ItemId::ENTITY,
                    object_id: item.id.get(),
                    object_repr: &repr,
                    action: AuditAction::Change,
                    message,
                },
            )?;
        }

        let sql = format!(
            "UPDATE items SET {column}=? WHERE id IN ({})",
            placeholders(items.len())
        );
        let mut values = Vec::with_capacity(items.len() + 1);
        values.push(target.map(Value::Integer).unwrap_or(Value::Null));
        values.extend(items.iter().map(|item| Value::Integer(item.id.get())));
        let updated = tx.execute(&sql, params_from_iter(values))?;
        tx.commit()?;

        tracing::info!(column, target = ?target, updated, "items updated");
        Ok(updated)
    }
}
