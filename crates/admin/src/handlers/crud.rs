#![forbid(unsafe_code)]

use crate::site::{ModelAdmin, ModelKind};
use crate::*;
use inv_core::ids::{CategoryId, ItemId, LocationId};
use inv_core::{Category, Item, Location, Unit};
use inv_storage::{
    CategoryPatch, ItemPatch, LocationPatch, NewCategory, NewItem, NewLocation, StoreError,
};
use serde_json::{Value, json};

fn fields_object(args: &Args) -> Result<Args, Value> {
    match args.get("fields") {
        None | Some(Value::Null) => Ok(Args::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ai_error("INVALID_INPUT", "fields must be an object")),
    }
}

fn optional_unit(fields: &Args) -> Result<Option<Unit>, Value> {
    let Some(raw) = optional_string(fields, "unit")? else {
        return Ok(None);
    };
    Unit::parse(&raw).map(Some).ok_or_else(|| {
        let allowed = Unit::ALL.map(Unit::as_str).join(", ");
        ai_error("INVALID_INPUT", &format!("unit must be one of {allowed}"))
    })
}

fn location_json(location: &Location, display: String) -> Value {
    json!({
        "id": location.id.get(),
        "name": location.name,
        "locator": location.locator,
        "description": location.description,
        "parent_id": location.parent_id.map(LocationId::get),
        "display": display,
    })
}

fn category_json(category: &Category, display: String) -> Value {
    json!({
        "id": category.id.get(),
        "name": category.name,
        "parent_id": category.parent_id.map(CategoryId::get),
        "display": display,
    })
}

fn item_json(item: &Item, display: String) -> Value {
    json!({
        "id": item.id.get(),
        "name": item.name,
        "description": item.description,
        "amount": item.amount,
        "unit": item.unit.as_str(),
        "location_id": item.location_id.map(LocationId::get),
        "category_id": item.category_id.map(CategoryId::get),
        "expiration": date_value(item.expiration),
        "display": display,
    })
}

/// `The item "Tools: Hammer" was added successfully.`
fn record_response(intent: &str, admin: &ModelAdmin, object: Value, verb: &str) -> Value {
    let display = object
        .get("display")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let message = format!(
        "The {} \"{display}\" was {verb} successfully.",
        admin.verbose_name
    );
    ai_ok(
        intent,
        json!({
            "model": admin.kind.name(),
            "object": object,
            "message": message,
        }),
    )
}

impl AdminServer {
    fn location_object(&self, location: &Location) -> Result<Value, StoreError> {
        let display = self.store.location_tree()?.display_string(location.id);
        Ok(location_json(location, display))
    }

    fn category_object(&self, category: &Category) -> Result<Value, StoreError> {
        let display = self.store.category_tree()?.breadcrumb_name(category.id);
        Ok(category_json(category, display))
    }

    fn item_object(&self, item: &Item) -> Result<Value, StoreError> {
        Ok(item_json(item, self.store.item_display(item)?))
    }

    fn record_object(&self, kind: ModelKind, id: i64) -> Result<Value, StoreError> {
        match kind {
            ModelKind::Item => self.item_object(&self.store.get_item(ItemId::new(id))?),
            ModelKind::Location => {
                self.location_object(&self.store.get_location(LocationId::new(id))?)
            }
            ModelKind::Category => {
                self.category_object(&self.store.get_category(CategoryId::new(id))?)
            }
        }
    }

    pub(crate) fn method_get(&mut self, args: Args) -> Value {
        let admin = match self.model_admin(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let id = match require_id(&args, "id") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let object = match self.record_object(admin.kind, id) {
            Ok(v) => v,
            Err(err) => return store_error(err),
        };
        let mut result = json!({
            "model": admin.kind.name(),
            "object": object,
        });
        let inlines = match admin.kind {
            ModelKind::Item => Ok(Vec::new()),
            ModelKind::Location => self.location_inlines(LocationId::new(id)),
            ModelKind::Category => self.category_inlines(CategoryId::new(id)),
        };
        match inlines {
            Ok(inlines) => {
                for (key, rows) in inlines {
                    result[key] = Value::Array(rows);
                }
                ai_ok("get", result)
            }
            Err(err) => store_error(err),
        }
    }

    /// Items referencing the record directly, ordered by name.
    fn direct_items(&self, matches: impl Fn(&Item) -> bool) -> Result<Vec<Item>, StoreError> {
        let mut items = self.store.list_items()?;
        items.retain(|item| matches(item));
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    /// Direct child locations and the items stored right at the location.
    fn location_inlines(&self, id: LocationId) -> Result<Vec<(&'static str, Vec<Value>)>, StoreError> {
        let locations = self.store.location_tree()?;
        let categories = self.store.category_tree()?;
        let children = locations
            .children(id)
            .map(|child| {
                json!({
                    "id": child.id.get(),
                    "name": child.name,
                    "locator": child.locator,
                })
            })
            .collect();
        let items = self
            .direct_items(|item| item.location_id == Some(id))?
            .iter()
            .map(|item| {
                json!({
                    "id": item.id.get(),
                    "name": item.name,
                    "amount": item.amount,
                    "unit": item.unit.as_str(),
                    "category": item.category_id.map(|id| categories.breadcrumb_name(id)),
                    "expiration": date_value(item.expiration),
                })
            })
            .collect();
        Ok(vec![("children", children), ("items", items)])
    }

    fn category_inlines(&self, id: CategoryId) -> Result<Vec<(&'static str, Vec<Value>)>, StoreError> {
        let locations = self.store.location_tree()?;
        let items = self
            .direct_items(|item| item.category_id == Some(id))?
            .iter()
            .map(|item| {
                json!({
                    "id": item.id.get(),
                    "name": item.name,
                    "amount": item.amount,
                    "unit": item.unit.as_str(),
                    "location": item.location_id.map(|id| locations.display_string(id)),
                    "expiration": date_value(item.expiration),
                })
            })
            .collect();
        Ok(vec![("items", items)])
    }

    pub(crate) fn method_add(&mut self, args: Args) -> Value {
        let admin = match self.model_admin(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let fields = match fields_object(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let created = match admin.kind {
            ModelKind::Item => self.add_item(&fields),
            ModelKind::Location => self.add_location(&fields),
            ModelKind::Category => self.add_category(&fields),
        };
        match created {
            Ok(object) => record_response("add", &admin, object, "added"),
            Err(resp) => resp,
        }
    }

    pub(crate) fn method_change(&mut self, args: Args) -> Value {
        let admin = match self.model_admin(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let id = match require_id(&args, "id") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let fields = match fields_object(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let changed = match admin.kind {
            ModelKind::Item => self.change_item(ItemId::new(id), &fields),
            ModelKind::Location => self.change_location(LocationId::new(id), &fields),
            ModelKind::Category => self.change_category(CategoryId::new(id), &fields),
        };
        match changed {
            Ok(object) => record_response("change", &admin, object, "changed"),
            Err(resp) => resp,
        }
    }

    pub(crate) fn method_delete(&mut self, args: Args) -> Value {
        let admin = match self.model_admin(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let id = match require_id(&args, "id") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let object = match self.record_object(admin.kind, id) {
            Ok(v) => v,
            Err(err) => return store_error(err),
        };
        let deleted = match admin.kind {
            ModelKind::Item => self.store.delete_item(&self.actor, ItemId::new(id)),
            ModelKind::Location => self.store.delete_location(&self.actor, LocationId::new(id)),
            ModelKind::Category => self.store.delete_category(&self.actor, CategoryId::new(id)),
        };
        match deleted {
            Ok(()) => record_response("delete", &admin, object, "deleted"),
            Err(err) => store_error(err),
        }
    }

    fn add_item(&mut self, fields: &Args) -> Result<Value, Value> {
        let mut request = NewItem::named(require_string(fields, "name")?);
        if let Some(description) = optional_string(fields, "description")? {
            request.description = description;
        }
        if let Some(amount) = optional_i64(fields, "amount")? {
            request.amount = amount;
        }
        if let Some(unit) = optional_unit(fields)? {
            request.unit = unit;
        }
        request.location_id = optional_id(fields, "location")?.map(LocationId::new);
        request.category_id = optional_id(fields, "category")?.map(CategoryId::new);
        request.expiration = patch_date(fields, "expiration")?.flatten();

        let item = self
            .store
            .create_item(&self.actor, request)
            .map_err(store_error)?;
        self.item_object(&item).map_err(store_error)
    }

    fn change_item(&mut self, id: ItemId, fields: &Args) -> Result<Value, Value> {
        let patch = ItemPatch {
            name: optional_string(fields, "name")?,
            description: optional_string(fields, "description")?,
            amount: optional_i64(fields, "amount")?,
            unit: optional_unit(fields)?,
            location_id: patch_id(fields, "location")?.map(|id| id.map(LocationId::new)),
            category_id: patch_id(fields, "category")?.map(|id| id.map(CategoryId::new)),
            expiration: patch_date(fields, "expiration")?,
        };
        let item = self
            .store
            .update_item(&self.actor, id, patch)
            .map_err(store_error)?;
        self.item_object(&item).map_err(store_error)
    }

    fn add_location(&mut self, fields: &Args) -> Result<Value, Value> {
        let request = NewLocation {
            name: require_string(fields, "name")?,
            locator: require_string(fields, "locator")?,
            description: optional_string(fields, "description")?.unwrap_or_default(),
            parent_id: optional_id(fields, "parent")?.map(LocationId::new),
        };
        let location = self
            .store
            .create_location(&self.actor, request)
            .map_err(store_error)?;
        self.location_object(&location).map_err(store_error)
    }

    fn change_location(&mut self, id: LocationId, fields: &Args) -> Result<Value, Value> {
        let patch = LocationPatch {
            name: optional_string(fields, "name")?,
            locator: optional_string(fields, "locator")?,
            description: optional_string(fields, "description")?,
            parent_id: patch_id(fields, "parent")?.map(|id| id.map(LocationId::new)),
        };
        let location = self
            .store
            .update_location(&self.actor, id, patch)
            .map_err(store_error)?;
        self.location_object(&location).map_err(store_error)
    }

    fn add_category(&mut self, fields: &Args) -> Result<Value, Value> {
        let request = NewCategory {
            name: require_string(fields, "name")?,
            parent_id: optional_id(fields, "parent")?.map(CategoryId::new),
        };
        let category = self
            .store
            .create_category(&self.actor, request)
            .map_err(store_error)?;
        self.category_object(&category).map_err(store_error)
    }

    fn change_category(&mut self, id: CategoryId, fields: &Args) -> Result<Value, Value> {
        let patch = CategoryPatch {
            name: optional_string(fields, "name")?,
            parent_id: patch_id(fields, "parent")?.map(|id| id.map(CategoryId::new)),
        };
        let category = self
            .store
            .update_category(&self.actor, id, patch)
            .map_err(store_error)?;
        self.category_object(&category).map_err(store_error)
    }
}
