//! Query-string and form-body encoding.
//!
//! Payloads are flattened with bracket keys the way PHP's
//! `http_build_query` does it: `{"ids": [1, 2], "staff": {"id": 1}}`
//! becomes `ids[0]=1&ids[1]=2&staff[id]=1`. Nulls are dropped, booleans are
//! sent as `1`/`0`, and a top-level list of `(key, value)` pairs keeps its
//! order.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{CLIENT_ERROR_CODE, Error, Result};

/// Encode a payload as `application/x-www-form-urlencoded` text.
///
/// Fails with [`Error::Client`] when the payload is not a map, a struct or a
/// list, or cannot be serialized at all. An empty string means "no
/// parameters".
pub fn encode_params<P>(payload: &P) -> Result<String>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(payload).map_err(invalid_payload)?;
    let map = match value {
        Value::Null => return Ok(String::new()),
        Value::Object(map) => map,
        Value::Array(items) => top_level_list(items),
        other => {
            return Err(invalid_payload(format!(
                "expected key/value parameters, got {}",
                other
            )));
        }
    };

    let map = strip_map(map);
    if map.is_empty() {
        return Ok(String::new());
    }
    serde_qs::to_string(&map).map_err(invalid_payload)
}

pub(crate) fn invalid_payload(e: impl std::fmt::Display) -> Error {
    Error::Client {
        code: CLIENT_ERROR_CODE,
        message: format!("invalid payload: {}", e),
    }
}

/// `[("a", 1), ("b", 2)]` becomes `{a: 1, b: 2}`; any other list is keyed
/// by position.
fn top_level_list(items: Vec<Value>) -> Map<String, Value> {
    let is_pairs = !items.is_empty()
        && items.iter().all(|item| {
            matches!(item, Value::Array(pair) if pair.len() == 2 && pair[0].is_string())
        });

    if is_pairs {
        items
            .into_iter()
            .filter_map(|item| match item {
                Value::Array(mut pair) => {
                    let value = pair.pop()?;
                    let key = pair.pop()?;
                    key.as_str().map(|k| (k.to_string(), value))
                }
                _ => None,
            })
            .collect()
    } else {
        indexed(items)
    }
}

fn indexed(items: Vec<Value>) -> Map<String, Value> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| (i.to_string(), item))
        .collect()
}

fn strip_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(key, value)| strip(value).map(|value| (key, value)))
        .collect()
}

/// Drop nulls and turn booleans into `1`/`0`. A list that loses elements
/// becomes a position-keyed map so the surviving indices stay put.
fn strip(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(Value::Number(Number::from(u8::from(flag)))),
        Value::Object(map) => Some(Value::Object(strip_map(map))),
        Value::Array(items) if items.iter().any(Value::is_null) => {
            Some(Value::Object(strip_map(indexed(items))))
        }
        Value::Array(items) => Some(Value::Array(items.into_iter().filter_map(strip).collect())),
        other => Some(other),
    }
}
