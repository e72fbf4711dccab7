#![forbid(unsafe_code)]

use crate::site::{AdminSite, ModelAdmin};
use crate::*;
use inv_storage::SqliteStore;
use serde_json::{Value, json};

pub(crate) struct AdminServer {
    pub(crate) store: SqliteStore,
    pub(crate) site: AdminSite,
    /// Recorded as the author of every audit entry this server writes.
    pub(crate) actor: String,
}

impl AdminServer {
    pub(crate) fn new(store: SqliteStore, site: AdminSite, actor: String) -> Self {
        Self { store, site, actor }
    }

    pub(crate) fn handle(&mut self, request: JsonRpcRequest) -> Option<Value> {
        let expects_response = request.expects_response();
        let method = request.method.as_str();
        tracing::debug!(method, "request");

        if method == "ping" {
            return expects_response.then(|| json_rpc_response(request.id, json!({})));
        }

        let resp = match args_object(request.params) {
            Ok(args) => crate::handlers::dispatch_method(self, method, args),
            Err(resp) => Some(resp),
        };
        if !expects_response {
            return None;
        }
        match resp {
            Some(resp) => Some(json_rpc_response(request.id, resp)),
            None => Some(json_rpc_error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {method}"),
            )),
        }
    }

    /// The registered admin named by `args.model`. Cloned so handlers can borrow the store
    /// mutably while holding it.
    pub(crate) fn model_admin(&self, args: &Args) -> Result<ModelAdmin, Value> {
        let name = require_string(args, "model")?;
        self.site.model(&name).cloned().ok_or_else(|| {
            ai_error_with(
                "UNKNOWN_MODEL",
                &format!("unknown model: {name}"),
                Some("Call site to list the registered models."),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn server(test_name: &str) -> AdminServer {
        let dir = std::env::temp_dir().join(format!(
            "inv_admin_server_{test_name}_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let store = SqliteStore::open(&dir).expect("open store");
        let cli = Cli::try_parse_from(["inv_admin"]).expect("cli");
        AdminServer::new(store, AdminSite::inventory(&cli), "tester".to_string())
    }

    fn request(value: Value) -> JsonRpcRequest {
        serde_json::from_value(value).expect("request")
    }

    #[test]
    fn notifications_get_no_reply() {
        let mut server = server("notifications_get_no_reply");
        let reply = server.handle(request(json!({ "jsonrpc": "2.0", "method": "site" })));
        assert_eq!(reply, None);
        let reply = server.handle(request(json!({ "jsonrpc": "2.0", "method": "nope" })));
        assert_eq!(reply, None);
    }

    #[test]
    fn unknown_methods_are_json_rpc_errors() {
        let mut server = server("unknown_methods_are_json_rpc_errors");
        let reply = server
            .handle(request(json!({ "jsonrpc": "2.0", "id": 7, "method": "tools/list" })))
            .expect("reply");
        assert_eq!(reply["id"], 7);
        assert_eq!(reply["error"]["code"], METHOD_NOT_FOUND);
    }

    #[test]
    fn unknown_models_are_reported_in_the_envelope() {
        let mut server = server("unknown_models_are_reported");
        let reply = server
            .handle(request(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "changelist",
                "params": { "model": "user" }
            })))
            .expect("reply");
        assert_eq!(reply["result"]["success"], false);
        assert_eq!(reply["result"]["error"]["code"], "UNKNOWN_MODEL");
    }
}
