#![forbid(unsafe_code)]

use super::{
    ActionOutcome, ActionRequest, Confirmation, Feedback, NOTHING_SELECTED, SelectedObject,
    TargetChoice,
};
use crate::site::ModelAdmin;
use inv_core::Item;
use inv_core::ids::{CategoryId, ItemId, LocationId};
use inv_core::params::optional_id;
use inv_storage::{ItemReference, ItemsUpdateRequest, SqliteStore, StoreError};
use serde_json::json;

pub(crate) const NEW_LOCATION: &str = "new_location";
pub(crate) const NEW_CATEGORY: &str = "new_category";

fn selected_items(store: &SqliteStore, request: &ActionRequest) -> Result<Vec<Item>, StoreError> {
    let ids = request
        .selection
        .iter()
        .copied()
        .map(ItemId::new)
        .collect::<Vec<_>>();
    store.items_by_ids(&ids)
}

fn selection_view(store: &SqliteStore, items: &[Item]) -> Result<Vec<SelectedObject>, StoreError> {
    items
        .iter()
        .map(|item| {
            Ok(SelectedObject {
                id: item.id.get(),
                display: store.item_display(item)?,
            })
        })
        .collect()
}

fn apply(
    store: &mut SqliteStore,
    actor: &str,
    items: &[Item],
    set: ItemReference,
) -> Result<usize, StoreError> {
    store.update_items(ItemsUpdateRequest {
        actor: actor.to_string(),
        ids: items.iter().map(|item| item.id).collect(),
        set,
    })
}

pub(super) fn move_to_other_location(
    store: &mut SqliteStore,
    actor: &str,
    admin: &ModelAdmin,
    request: ActionRequest,
) -> Result<ActionOutcome, StoreError> {
    let items = selected_items(store, &request)?;
    if items.is_empty() {
        return Ok(ActionOutcome::done(Feedback::info(NOTHING_SELECTED)));
    }
    let count = items.len();

    if !request.confirmed {
        let selection = selection_view(store, &items)?;
        let objects_name = match selection.as_slice() {
            [only] => only.display.clone(),
            _ => admin.verbose_name_plural.to_string(),
        };
        let targets = store
            .location_choices(None)?
            .into_iter()
            .map(|choice| TargetChoice {
                id: choice.id.get(),
                label: choice.label,
            })
            .collect();
        return Ok(ActionOutcome::Confirm(Confirmation {
            action: "move_to_other_location",
            title: format!("Moving {objects_name} to new location"),
            objects_name,
            model_count: count,
            selection,
            fields: json!({ NEW_LOCATION: null }),
            targets,
        }));
    }

    let target = match optional_id(&request.form, NEW_LOCATION, LocationId::parse) {
        Ok(Some(target)) => target,
        Ok(None) => {
            return Ok(ActionOutcome::done(Feedback::error(format!(
                "Failed to move {}: no location selected",
                admin.count_label(count)
            ))));
        }
        Err(err) => return Ok(ActionOutcome::done(Feedback::error(err.to_string()))),
    };

    let moved = apply(store, actor, &items, ItemReference::Location(Some(target)))?;
    Ok(ActionOutcome::done(Feedback::success(format!(
        "Successfully moved {}.",
        admin.count_label(moved)
    ))))
}

/// Unlike moving, an empty target is valid here and clears the category.
pub(super) fn change_category(
    store: &mut SqliteStore,
    actor: &str,
    admin: &ModelAdmin,
    request: ActionRequest,
) -> Result<ActionOutcome, StoreError> {
    let items = selected_items(store, &request)?;
    if items.is_empty() {
        return Ok(ActionOutcome::done(Feedback::info(NOTHING_SELECTED)));
    }
    let count = items.len();

    if !request.confirmed {
        let objects_name = inv_core::text::plural(
            count,
            admin.verbose_name,
            admin.verbose_name_plural,
        )
        .to_string();
        let targets = store
            .category_choices(None)?
            .into_iter()
            .map(|choice| TargetChoice {
                id: choice.id.get(),
                label: choice.label,
            })
            .collect();
        return Ok(ActionOutcome::Confirm(Confirmation {
            action: "change_category",
            title: format!("Changing {objects_name} categories"),
            objects_name,
            model_count: count,
            selection: selection_view(store, &items)?,
            fields: json!({ NEW_CATEGORY: null }),
            targets,
        }));
    }

    let target = match optional_id(&request.form, NEW_CATEGORY, CategoryId::parse) {
        Ok(target) => target,
        Err(err) => return Ok(ActionOutcome::done(Feedback::error(err.to_string()))),
    };

    let updated = apply(store, actor, &items, ItemReference::Category(target))?;
    Ok(ActionOutcome::done(Feedback::success(format!(
        "Successfully updated {}.",
        admin.count_label(updated)
    ))))
}
