#![forbid(unsafe_code)]
#![allow(dead_code)]

use serde_json::Value;
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub(crate) struct Server {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    storage_dir: PathBuf,
    next_id: i64,
}

impl Server {
    pub(crate) fn start(test_name: &str) -> Self {
        Self::start_with_args(test_name, &[])
    }

    pub(crate) fn start_with_args(test_name: &str, extra_args: &[&str]) -> Self {
        let storage_dir = temp_dir(test_name);
        let mut child = Command::new(env!("CARGO_BIN_EXE_inv_admin"))
            .arg("--storage-dir")
            .arg(&storage_dir)
            .arg("--actor")
            .arg("tester")
            .args(extra_args)
            .env("RUST_LOG", "warn")
            .env_remove("SITE_TITLE")
            .env_remove("SITE_HEADER")
            .env_remove("LOCATIONS_DISPLAY_MODE")
            .env_remove("CATEGORIES_DISPLAY_MODE")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .expect("spawn inv_admin");

        let stdin = child.stdin.take().expect("stdin");
        let stdout = BufReader::new(child.stdout.take().expect("stdout"));

        Self {
            child,
            stdin,
            stdout,
            storage_dir,
            next_id: 1,
        }
    }

    pub(crate) fn send(&mut self, req: Value) {
        writeln!(self.stdin, "{req}").expect("write request");
        self.stdin.flush().expect("flush request");
    }

    pub(crate) fn send_raw(&mut self, line: &str) {
        writeln!(self.stdin, "{line}").expect("write line");
        self.stdin.flush().expect("flush line");
    }

    pub(crate) fn recv(&mut self) -> Value {
        let mut line = String::new();
        self.stdout.read_line(&mut line).expect("read response");
        assert!(!line.trim().is_empty(), "empty response line");
        serde_json::from_str(&line).expect("parse response json")
    }

    pub(crate) fn request(&mut self, req: Value) -> Value {
        self.send(req);
        self.recv()
    }

    /// The `{success, intent, result, error}` envelope of a method call.
    pub(crate) fn call(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        let resp = self.request(json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        }));
        assert_eq!(resp["id"], id, "response id");
        resp.get("result").cloned().expect("result envelope")
    }

    /// `result` of a call that must succeed.
    pub(crate) fn call_ok(&mut self, method: &str, params: Value) -> Value {
        let envelope = self.call(method, params);
        assert_eq!(envelope["success"], true, "{method} failed: {envelope}");
        envelope["result"].clone()
    }

    /// Error code of a call that must fail.
    pub(crate) fn call_err(&mut self, method: &str, params: Value) -> String {
        let envelope = self.call(method, params);
        assert_eq!(envelope["success"], false, "{method} succeeded: {envelope}");
        envelope["error"]["code"]
            .as_str()
            .expect("error.code")
            .to_string()
    }

    /// Adds a record and returns its id.
    pub(crate) fn add(&mut self, model: &str, fields: Value) -> i64 {
        let result = self.call_ok("add", json!({ "model": model, "fields": fields }));
        result["object"]["id"].as_i64().expect("object.id")
    }

    pub(crate) fn action(
        &mut self,
        model: &str,
        action: &str,
        selection: &[i64],
        post: bool,
        form: Value,
    ) -> Value {
        self.call_ok(
            "action",
            json!({
                "model": model,
                "action": action,
                "selection": selection,
                "post": post,
                "form": form
            }),
        )
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.storage_dir);
    }
}

pub(crate) fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("inv_admin_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub(crate) fn assert_json_rpc_error(resp: &Value, expected_code: i64) {
    let code = resp
        .get("error")
        .and_then(|v| v.get("code"))
        .and_then(|v| v.as_i64())
        .expect("error.code");
    assert_eq!(code, expected_code);
}

/// Labels of a rendered filter's choices.
pub(crate) fn choice_labels(filter: &Value) -> Vec<String> {
    filter["choices"]
        .as_array()
        .expect("choices")
        .iter()
        .map(|choice| choice["label"].as_str().expect("label").to_string())
        .collect()
}

/// Label of the selected choice; exactly one must be selected.
pub(crate) fn selected_label(filter: &Value) -> String {
    let selected = filter["choices"]
        .as_array()
        .expect("choices")
        .iter()
        .filter(|choice| choice["selected"] == true)
        .collect::<Vec<_>>();
    assert_eq!(selected.len(), 1, "exactly one selected choice: {filter}");
    selected[0]["label"].as_str().expect("label").to_string()
}
