#![forbid(unsafe_code)]

use crate::*;
use inv_storage::{AuditListRequest, AuditRow};
use serde_json::{Value, json};

const DEFAULT_HISTORY_LIMIT: usize = 50;

fn audit_row_json(row: AuditRow) -> Value {
    json!({
        "id": row.id,
        "ts": ts_ms_to_rfc3339(row.ts_ms),
        "ts_ms": row.ts_ms,
        "actor": row.actor,
        "model": row.model,
        "object_id": row.object_id,
        "object_repr": row.object_repr,
        "action": row.action.as_str(),
        "message": row.message,
    })
}

impl AdminServer {
    /// Audit entries, newest first. `model` and `id` narrow the log to one model or one record.
    pub(crate) fn method_history(&mut self, args: Args) -> Value {
        let model = if args.contains_key("model") {
            match self.model_admin(&args) {
                Ok(admin) => Some(admin.kind.name().to_string()),
                Err(resp) => return resp,
            }
        } else {
            None
        };
        let object_id = match optional_id(&args, "id") {
            Ok(v) => v,
            Err(resp) => return resp,
        };
        let limit = match optional_usize(&args, "limit") {
            Ok(v) => v.unwrap_or(DEFAULT_HISTORY_LIMIT),
            Err(resp) => return resp,
        };

        let rows = match self.store.list_audit(AuditListRequest {
            model,
            object_id,
            limit,
        }) {
            Ok(v) => v,
            Err(err) => return store_error(err),
        };
        let entries = rows.into_iter().map(audit_row_json).collect::<Vec<_>>();
        ai_ok(
            "history",
            json!({
                "count": entries.len(),
                "entries": entries,
            }),
        )
    }
}
