#![forbid(unsafe_code)]

use super::audit::{AuditEntry, log_entry};
use super::locations::{ensure_location, location_tree};
use super::{
    AuditAction, SectionsCreateRequest, SqliteStore, StoreError, normalize_locator, normalize_name,
};
use inv_core::Location;
use inv_core::ids::LocationId;
use inv_core::tree::PATH_SEPARATOR;
use rusqlite::params;

impl SqliteStore {
    /// Inserts every planned section as a child of `parent_id`.
    ///
    /// All sections land or none do: a validation or insert failure rolls back the whole batch.
    /// Returned locations keep the order of the plan.
    pub fn create_sections(
        &mut self,
        request: SectionsCreateRequest,
    ) -> Result<Vec<Location>, StoreError> {
        let SectionsCreateRequest {
            actor,
            parent_id,
            sections,
        } = request;

        let tx = self.conn.transaction()?;
        ensure_location(&tx, parent_id)?;
        let parent_display = location_tree(&tx)?.display_string(parent_id);

        let mut created = Vec::with_capacity(sections.len());
        for section in sections {
            let name = normalize_name(&section.name)?;
            let locator = normalize_locator(&section.locator)?;
            tx.execute(
                "INSERT INTO locations(name, locator, description, parent_id) VALUES (?1, ?2, '', ?3)",
                params![name, locator, parent_id.get()],
            )?;
            let location = Location {
                id: LocationId::new(tx.last_insert_rowid()),
                name,
                locator,
                description: String::new(),
                parent_id: Some(parent_id),
            };

            let repr = format!("{parent_display}{PATH_SEPARATOR}{}", location.locator);
            log_entry(
                &tx,
                AuditEntry {
                    actor: &actor,
                    model: LocationId::ENTITY,
                    object_id: location.id.get(),
                    object_repr: &repr,
                    action: AuditAction::Addition,
                    message: "Added.",
                },
            )?;
            created.push(location);
        }
        tx.commit()?;

        tracing::info!(
            parent = %parent_display,
            created = created.len(),
            "sections created"
        );
        Ok(created)
    }
}
