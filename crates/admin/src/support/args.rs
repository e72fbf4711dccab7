#![forbid(unsafe_code)]

use super::envelope::ai_error;
use inv_core::expiration::parse_date;
use inv_core::params::FormParams;
use serde_json::Value;
use time::Date;

pub(crate) type Args = serde_json::Map<String, Value>;

/// Method params as an object. Absent or null params read as an empty object.
pub(crate) fn args_object(params: Option<Value>) -> Result<Args, Value> {
    match params {
        None | Some(Value::Null) => Ok(Args::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(ai_error("INVALID_INPUT", "params must be an object")),
    }
}

pub(crate) fn require_string(args: &Args, key: &str) -> Result<String, Value> {
    let Some(v) = args.get(key).and_then(|v| v.as_str()) else {
        return Err(ai_error("INVALID_INPUT", &format!("{key} is required")));
    };
    Ok(v.to_string())
}

pub(crate) fn optional_string(args: &Args, key: &str) -> Result<Option<String>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::String(v) => Ok(Some(v.to_string())),
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a string"),
        )),
    }
}

pub(crate) fn optional_i64(args: &Args, key: &str) -> Result<Option<i64>, Value> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ai_error("INVALID_INPUT", &format!("{key} must be an integer"))),
        _ => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be an integer"),
        )),
    }
}

pub(crate) fn optional_usize(args: &Args, key: &str) -> Result<Option<usize>, Value> {
    let Some(value) = optional_i64(args, key)? else {
        return Ok(None);
    };
    usize::try_from(value).map(Some).map_err(|_| {
        ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a positive integer"),
        )
    })
}

/// A record id: a positive integer, or a string holding one.
pub(crate) fn require_id(args: &Args, key: &str) -> Result<i64, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Err(ai_error("INVALID_INPUT", &format!("{key} is required"))),
        Some(value) => id_value(value)
            .ok_or_else(|| ai_error("INVALID_INPUT", &format!("{key} must be a record id"))),
    }
}

pub(crate) fn optional_id(args: &Args, key: &str) -> Result<Option<i64>, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => require_id(args, key).map(Some),
    }
}

/// Patch semantics for a nullable reference: absent leaves it alone, `null` clears it.
pub(crate) fn patch_id(args: &Args, key: &str) -> Result<Option<Option<i64>>, Value> {
    match args.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(_) => require_id(args, key).map(|id| Some(Some(id))),
    }
}

/// `YYYY-MM-DD`, with the same absent/`null` patch semantics as [`patch_id`].
pub(crate) fn patch_date(args: &Args, key: &str) -> Result<Option<Option<Date>>, Value> {
    match args.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(Some(None)),
        Some(Value::String(raw)) => parse_date(raw).map(|date| Some(Some(date))).ok_or_else(|| {
            ai_error(
                "INVALID_INPUT",
                &format!("{key} must be a date (YYYY-MM-DD)"),
            )
        }),
        Some(_) => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a date (YYYY-MM-DD)"),
        )),
    }
}

pub(crate) fn optional_bool(args: &Args, key: &str) -> Result<Option<bool>, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(v)) => Ok(Some(*v)),
        Some(_) => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be a boolean"),
        )),
    }
}

/// Selected record ids. Absent means an empty selection.
pub(crate) fn id_list(args: &Args, key: &str) -> Result<Vec<i64>, Value> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| {
                id_value(value).ok_or_else(|| {
                    ai_error(
                        "INVALID_INPUT",
                        &format!("{key} must contain record ids only"),
                    )
                })
            })
            .collect(),
        Some(_) => Err(ai_error(
            "INVALID_INPUT",
            &format!("{key} must be an array of record ids"),
        )),
    }
}

/// Form or query parameters. Every value is kept as the string a browser would submit:
/// numbers are rendered, booleans become `on`/`off`, nulls are dropped.
pub(crate) fn string_map(args: &Args, key: &str) -> Result<FormParams, Value> {
    let object = match args.get(key) {
        None | Some(Value::Null) => return Ok(FormParams::new()),
        Some(Value::Object(object)) => object,
        Some(_) => {
            return Err(ai_error(
                "INVALID_INPUT",
                &format!("{key} must be an object"),
            ));
        }
    };

    let mut out = FormParams::new();
    for (name, value) in object {
        let value = match value {
            Value::Null => continue,
            Value::String(v) => v.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(true) => "on".to_string(),
            Value::Bool(false) => "off".to_string(),
            _ => {
                return Err(ai_error(
                    "INVALID_INPUT",
                    &format!("{key}.{name} must be a scalar"),
                ));
            }
        };
        out.insert(name.clone(), value);
    }
    Ok(out)
}

fn id_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().filter(|v| *v > 0),
        Value::String(raw) => raw.trim().parse::<i64>().ok().filter(|v| *v > 0),
        _ => None,
    }
}
