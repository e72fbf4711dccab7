#![forbid(unsafe_code)]

use inv_storage::StoreError;
use serde_json::{Value, json};

pub(crate) fn ai_ok(intent: &str, result: Value) -> Value {
    json!({
        "success": true,
        "intent": intent,
        "result": result,
        "error": null
    })
}

pub(crate) fn ai_error(code: &str, message: &str) -> Value {
    ai_error_with(code, message, None)
}

pub(crate) fn ai_error_with(code: &str, message: &str, recovery: Option<&str>) -> Value {
    let mut error_obj = serde_json::Map::new();
    error_obj.insert("code".to_string(), Value::String(code.to_string()));
    error_obj.insert(
        "message".to_string(),
        Value::String(message.trim().to_string()),
    );
    if let Some(recovery) = recovery {
        error_obj.insert(
            "recovery".to_string(),
            Value::String(recovery.trim().to_string()),
        );
    }

    json!({
        "success": false,
        "intent": "error",
        "result": {},
        "error": Value::Object(error_obj)
    })
}

pub(crate) fn store_error_code(err: &StoreError) -> &'static str {
    match err {
        StoreError::Io(_) | StoreError::Sql(_) => "STORE_ERROR",
        StoreError::InvalidInput(_) => "INVALID_INPUT",
        StoreError::UnknownId { .. } => "UNKNOWN_ID",
        StoreError::TreeCycle { .. } => "TREE_CYCLE",
        StoreError::IncorrectLookup(_) => "INCORRECT_LOOKUP",
    }
}

pub(crate) fn store_error(err: StoreError) -> Value {
    let code = store_error_code(&err);
    let recovery = match &err {
        StoreError::UnknownId { .. } => {
            Some("Reload the changelist; the record may have been deleted.")
        }
        StoreError::TreeCycle { .. } => Some("Pick a parent outside the node's own subtree."),
        StoreError::IncorrectLookup(_) => {
            Some("Drop the filter parameter or use one of the listed choices.")
        }
        _ => None,
    };
    match code {
        "STORE_ERROR" => tracing::error!(error = %err, "store failure"),
        _ => tracing::warn!(code, error = %err, "request rejected"),
    }
    ai_error_with(code, &err.to_string(), recovery)
}
