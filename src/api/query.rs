//
//  circleci
//  api/query.rs
//

//! Query-string reflection for GET options structs.
//!
//! Options structs serialize through `serde_json` and the resulting object is
//! flattened into key/value pairs:
//!
//! - `null` values (absent `Option` fields) are omitted entirely, never
//!   encoded as empty strings
//! - sequences emit one pair per element, in element order
//! - strings, numbers, and booleans encode via their JSON display form
//!   (timestamps therefore encode as RFC 3339 strings)
//!
//! Nested objects have no query representation and are rejected. Percent
//! encoding happens later, when the pairs are appended to the request URL.

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::Value;

use super::common::Error;

/// Flattens `payload` into query pairs.
pub(crate) fn encode<P>(payload: &P) -> Result<Vec<(String, String)>, Error>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(payload).map_err(Error::Serialization)?;

    let object = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(object) => object,
        _ => {
            return Err(unsupported(
                "query payload must serialize to an object".to_string(),
            ))
        }
    };

    let mut pairs = Vec::new();
    for (key, value) in object {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    let scalar = scalar(&key, item)?;
                    pairs.push((key.clone(), scalar));
                }
            }
            other => {
                let scalar = scalar(&key, other)?;
                pairs.push((key, scalar));
            }
        }
    }

    Ok(pairs)
}

fn scalar(key: &str, value: Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Err(unsupported(format!(
            "query field `{key}` contains a null element"
        ))),
        Value::Array(_) | Value::Object(_) => Err(unsupported(format!(
            "query field `{key}` has no query-string representation"
        ))),
    }
}

fn unsupported(message: String) -> Error {
    Error::Serialization(serde_json::Error::custom(message))
}
