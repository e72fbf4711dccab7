#![forbid(unsafe_code)]

//! Newline-delimited JSON-RPC over a byte stream: one request per line in, one response per
//! line out. Notifications produce no output line.

use crate::{AdminServer, INVALID_REQUEST, JsonRpcRequest, PARSE_ERROR, json_rpc_error};
use serde_json::Value;
use std::io::{BufRead, Write};

#[derive(Debug, thiserror::Error)]
pub(crate) enum TransportError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

fn write_newline_json(out: &mut impl Write, resp: &Value) -> Result<(), TransportError> {
    writeln!(out, "{}", serde_json::to_string(resp)?)?;
    out.flush()?;
    Ok(())
}

/// Serves requests from `input` until it reaches end of file.
pub(crate) fn run_stdio(
    server: &mut AdminServer,
    mut input: impl BufRead,
    mut output: impl Write,
) -> Result<(), TransportError> {
    let mut line = String::new();
    loop {
        line.clear();
        let read = input.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        if let Some(resp) = handle_newline_request(server, raw) {
            write_newline_json(&mut output, &resp)?;
        }
    }
    tracing::info!("input closed, shutting down");
    Ok(())
}

fn handle_newline_request(server: &mut AdminServer, raw: &str) -> Option<Value> {
    let data: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable request line");
            return Some(json_rpc_error(None, PARSE_ERROR, &format!("Parse error: {e}")));
        }
    };

    let (id, has_method) = match data.as_object() {
        Some(obj) => (obj.get("id").cloned(), obj.contains_key("method")),
        None => return Some(json_rpc_error(None, INVALID_REQUEST, "Invalid Request")),
    };
    if !has_method {
        return Some(json_rpc_error(id, INVALID_REQUEST, "Invalid Request"));
    }

    let request: JsonRpcRequest = match serde_json::from_value(data) {
        Ok(v) => v,
        Err(e) => {
            return Some(json_rpc_error(
                id,
                INVALID_REQUEST,
                &format!("Invalid Request: {e}"),
            ));
        }
    };

    server.handle(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use crate::site::AdminSite;
    use clap::Parser;
    use inv_storage::SqliteStore;
    use pretty_assertions::assert_eq;

    fn run(test_name: &str, input: &str) -> Vec<Value> {
        let dir = std::env::temp_dir().join(format!(
            "inv_admin_stdio_{test_name}_{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let store = SqliteStore::open(&dir).expect("open store");
        let cli = Cli::try_parse_from(["inv_admin"]).expect("cli");
        let mut server = AdminServer::new(store, AdminSite::inventory(&cli), "tester".to_string());

        let mut output = Vec::new();
        run_stdio(&mut server, input.as_bytes(), &mut output).expect("serve");
        let _ = std::fs::remove_dir_all(&dir);
        String::from_utf8(output)
            .expect("utf8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect()
    }

    #[test]
    fn malformed_lines_get_protocol_errors() {
        let replies = run(
            "malformed_lines_get_protocol_errors",
            "{not json\n\n[1,2]\n{\"id\":3}\n",
        );
        let codes = replies
            .iter()
            .map(|reply| reply["error"]["code"].as_i64().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(codes, vec![PARSE_ERROR, INVALID_REQUEST, INVALID_REQUEST]);
        assert_eq!(replies[2]["id"], 3);
    }

    #[test]
    fn notifications_are_silent_and_requests_answered_in_order() {
        let replies = run(
            "notifications_are_silent",
            concat!(
                "{\"jsonrpc\":\"2.0\",\"method\":\"ping\"}\n",
                "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
                "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"site\"}\n",
            ),
        );
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[1]["result"]["result"]["site_title"], "House inventory");
    }
}
