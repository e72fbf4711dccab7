#![forbid(unsafe_code)]

use super::audit::{AuditEntry, log_entry};
use super::{AuditAction, CategoryPatch, NewCategory, SqliteStore, StoreError, normalize_name};
use inv_core::ids::CategoryId;
use inv_core::{Category, CategoryTree};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeMap;

const SELECT_CATEGORY: &str = "SELECT id, name, parent_id FROM categories";

pub(super) fn read_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: CategoryId::new(row.get(0)?),
        name: row.get(1)?,
        parent_id: row.get::<_, Option<i64>>(2)?.map(CategoryId::new),
    })
}

pub(super) fn load_categories(conn: &Connection) -> Result<Vec<Category>, StoreError> {
    let mut stmt = conn.prepare(&format!("{SELECT_CATEGORY} ORDER BY id"))?;
    let rows = stmt.query_map([], read_category)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(super) fn category_tree(conn: &Connection) -> Result<CategoryTree, StoreError> {
    Ok(CategoryTree::new(load_categories(conn)?))
}

pub(super) fn find_category(
    conn: &Connection,
    id: CategoryId,
) -> Result<Option<Category>, StoreError> {
    Ok(conn
        .query_row(
            &format!("{SELECT_CATEGORY} WHERE id=?1"),
            params![id.get()],
            read_category,
        )
        .optional()?)
}

pub(super) fn ensure_category(conn: &Connection, id: CategoryId) -> Result<Category, StoreError> {
    find_category(conn, id)?.ok_or_else(|| StoreError::unknown_category(id))
}

impl SqliteStore {
    pub fn create_category(
        &mut self,
        actor: &str,
        request: NewCategory,
    ) -> Result<Category, StoreError> {
        let name = normalize_name(&request.name)?;
        let tx = self.conn.transaction()?;
        if let Some(parent_id) = request.parent_id {
            ensure_category(&tx, parent_id)?;
        }
        tx.execute(
            "INSERT INTO categories(name, parent_id) VALUES (?1, ?2)",
            params![name, request.parent_id.map(CategoryId::get)],
        )?;
        let category = Category {
            id: CategoryId::new(tx.last_insert_rowid()),
            name,
            parent_id: request.parent_id,
        };
        log_entry(
            &tx,
            AuditEntry {
                actor,
                model: CategoryId::ENTITY,
                object_id: category.id.get(),
                object_repr: &category.name,
                action: AuditAction::Addition,
                message: "Added.",
            },
        )?;
        tx.commit()?;

        tracing::info!(id = category.id.get(), category = %category.name, "category created");
        Ok(category)
    }

    pub fn get_category(&self, id: CategoryId) -> Result<Category, StoreError> {
        ensure_category(&self.conn, id)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        load_categories(&self.conn)
    }

    pub fn category_tree(&self) -> Result<CategoryTree, StoreError> {
        category_tree(&self.conn)
    }

    pub fn update_category(
        &mut self,
        actor: &str,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> Result<Category, StoreError> {
        let tx = self.conn.transaction()?;
        let mut category = ensure_category(&tx, id)?;

        if let Some(name) = patch.name {
            category.name = normalize_name(&name)?;
        }
        if let Some(parent_id) = patch.parent_id {
            if let Some(parent) = parent_id {
                ensure_category(&tx, parent)?;
            }
            if category_tree(&tx)?.would_create_cycle(id, parent_id) {
                return Err(StoreError::TreeCycle {
                    entity: CategoryId::ENTITY,
                    id: id.get(),
                });
            }
            category.parent_id = parent_id;
        }

        tx.execute(
            "UPDATE categories SET name=?2, parent_id=?3 WHERE id=?1",
            params![id.get(), category.name, category.parent_id.map(CategoryId::get)],
        )?;
        log_entry(
            &tx,
            AuditEntry {
                actor,
                model: CategoryId::ENTITY,
                object_id: id.get(),
                object_repr: &category.name,
                action: AuditAction::Change,
                message: "Changed.",
            },
        )?;
        tx.commit()?;

        tracing::info!(id = id.get(), category = %category.name, "category updated");
        Ok(category)
    }

    /// Children become roots and items lose their category; neither is deleted.
    pub fn delete_category(&mut self, actor: &str, id: CategoryId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let category = ensure_category(&tx, id)?;
        log_entry(
            &tx,
            AuditEntry {
                actor,
                model: CategoryId::ENTITY,
                object_id: id.get(),
                object_repr: &category.name,
                action: AuditAction::Deletion,
                message: "Deleted.",
            },
        )?;
        tx.execute("DELETE FROM categories WHERE id=?1", params![id.get()])?;
        tx.commit()?;

        tracing::info!(id = id.get(), category = %category.name, "category deleted");
        Ok(())
    }

    /// Number of items referencing each category directly.
    pub fn category_item_counts(&self) -> Result<BTreeMap<CategoryId, usize>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT category_id, COUNT(*) FROM items WHERE category_id IS NOT NULL GROUP BY category_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                CategoryId::new(row.get(0)?),
                usize::try_from(row.get::<_, i64>(1)?).unwrap_or(0),
            ))
        })?;
        Ok(rows.collect::<Result<BTreeMap<_, _>, _>>()?)
    }
}
