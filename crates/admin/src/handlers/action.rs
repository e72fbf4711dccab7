#![forbid(unsafe_code)]

use crate::actions::ActionRequest;
use crate::*;
use serde_json::{Value, json};

impl AdminServer {
    /// `{model, action, selection, post, form}`. Without `post` the action only renders its
    /// confirmation context.
    pub(crate) fn method_action(&mut self, args: Args) -> Value {
        let admin = match self.model_admin(&args) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let name = match require_string(&args, "action") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let Some(action) = admin.action(&name) else {
            return ai_error_with(
                "UNKNOWN_ACTION",
                &format!("{} has no action {name}", admin.kind.name()),
                Some("Call site to list the actions registered for each model."),
            );
        };
        let selection = match id_list(&args, "selection") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let confirmed = match optional_bool(&args, "post") {
            Ok(v) => v.unwrap_or(false),
            Err(resp) => return resp,
        };
        let form = match string_map(&args, "form") {
            Ok(v) => v,
            Err(resp) => return resp,
        };

        let request = ActionRequest {
            selection,
            confirmed,
            form,
        };
        match action.run(&mut self.store, &self.actor, &admin, request) {
            Ok(outcome) => ai_ok("action", json!(outcome)),
            Err(err) => store_error(err),
        }
    }
}
