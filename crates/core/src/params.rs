#![forbid(unsafe_code)]

//! Coercion of submitted form values, which always arrive as strings.

use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("{key} is required")]
    Missing { key: String },
    #[error("{key} must be a non-negative integer (got {value:?})")]
    NotAnInteger { key: String, value: String },
    #[error("{key} must be \"on\" or \"off\" (got {value:?})")]
    NotABoolean { key: String, value: String },
    #[error("{key} must be a record id (got {value:?})")]
    NotAnId { key: String, value: String },
}

pub type FormParams = BTreeMap<String, String>;

/// Value of `key`, treating blank strings as absent.
pub fn non_blank<'a>(params: &'a FormParams, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

pub fn require_count(params: &FormParams, key: &str) -> Result<u32, ParamError> {
    let Some(raw) = non_blank(params, key) else {
        return Err(ParamError::Missing {
            key: key.to_string(),
        });
    };
    raw.parse::<u32>().map_err(|_| ParamError::NotAnInteger {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Checkbox semantics: absent or `off` is false, `on` is true.
pub fn flag(params: &FormParams, key: &str) -> Result<bool, ParamError> {
    match non_blank(params, key) {
        None | Some("off") => Ok(false),
        Some("on") => Ok(true),
        Some(other) => Err(ParamError::NotABoolean {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

/// Blank means "no selection"; anything else must parse as a positive id.
pub fn optional_id<T>(
    params: &FormParams,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ParamError> {
    match non_blank(params, key) {
        None => Ok(None),
        Some(raw) => parse(raw).map(Some).ok_or_else(|| ParamError::NotAnId {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

pub fn text_or_empty(params: &FormParams, key: &str) -> String {
    params.get(key).cloned().unwrap_or_default()
}
