#![forbid(unsafe_code)]

use super::{ActionOutcome, ActionRequest, Confirmation, Feedback, SelectedObject};
use crate::site::ModelAdmin;
use inv_core::ids::LocationId;
use inv_core::params::{FormParams, ParamError, flag, require_count, text_or_empty};
use inv_core::sections::{GridError, GridSpec, MAX_COLUMNS, MAX_SECTIONS, plan_sections};
use inv_storage::{SectionsCreateRequest, SqliteStore, StoreError};
use serde_json::json;

pub(crate) const ROWS: &str = "rows";
pub(crate) const COLUMNS: &str = "columns";
pub(crate) const LOCATOR_PREFIX: &str = "locator_prefix";
pub(crate) const NAME_PREFIX: &str = "name_prefix";
pub(crate) const ZERO_BASED: &str = "zero_based";

const NEED_ONE_LOCATION: &str = "Select exactly one location in order to add sections to it";

fn grid_spec(form: &FormParams) -> Result<GridSpec, ParamError> {
    Ok(GridSpec {
        rows: require_count(form, ROWS)?,
        columns: require_count(form, COLUMNS)?,
        locator_prefix: text_or_empty(form, LOCATOR_PREFIX),
        name_prefix: text_or_empty(form, NAME_PREFIX),
        zero_based: flag(form, ZERO_BASED)?,
    })
}

pub(super) fn create_sections(
    store: &mut SqliteStore,
    actor: &str,
    admin: &ModelAdmin,
    request: ActionRequest,
) -> Result<ActionOutcome, StoreError> {
    let [parent_id] = request.selection.as_slice() else {
        return Ok(ActionOutcome::done(Feedback::error(NEED_ONE_LOCATION)));
    };
    let parent_id = LocationId::new(*parent_id);
    let parent = store.get_location(parent_id)?;
    let parent_display = store.location_tree()?.display_string(parent_id);

    if !request.confirmed {
        return Ok(ActionOutcome::Confirm(Confirmation {
            action: "create_sections",
            title: format!("Add sections to {parent_display}"),
            objects_name: admin.verbose_name_plural.to_string(),
            model_count: 1,
            selection: vec![SelectedObject {
                id: parent_id.get(),
                display: parent_display,
            }],
            fields: json!({
                ROWS: 1,
                COLUMNS: 1,
                LOCATOR_PREFIX: "",
                NAME_PREFIX: parent.name,
                ZERO_BASED: false,
            }),
            targets: Vec::new(),
        }));
    }

    let spec = match grid_spec(&request.form) {
        Ok(spec) => spec,
        Err(err) => return Ok(ActionOutcome::done(Feedback::error(err.to_string()))),
    };
    let sections = match plan_sections(&spec) {
        Ok(sections) => sections,
        Err(GridError::TooManyColumns { .. }) => {
            return Ok(ActionOutcome::done(Feedback::error(format!(
                "Cannot create more than {MAX_COLUMNS} columns"
            ))));
        }
        Err(GridError::TooManySections { .. }) => {
            return Ok(ActionOutcome::done(Feedback::error(format!(
                "Cannot create more than {MAX_SECTIONS} sections at once"
            ))));
        }
    };

    let created = match store.create_sections(SectionsCreateRequest {
        actor: actor.to_string(),
        parent_id,
        sections,
    }) {
        Ok(created) => created,
        Err(StoreError::InvalidInput(reason)) => {
            return Ok(ActionOutcome::done(Feedback::error(format!(
                "No sections were created: {reason}"
            ))));
        }
        Err(err) => return Err(err),
    };

    Ok(ActionOutcome::done(Feedback::success(format!(
        "Successfully created {}.",
        admin.count_label(created.len())
    ))))
}
