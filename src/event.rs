//! Presence-checked access into untyped inbound events.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::error::MapError;

/// One domain occurrence as received: a call leg, an agent status change, a
/// directory entity. No schema is enforced.
pub type InboundEvent = Value;

/// Walks `path` through nested objects. A missing key or `null` anywhere on
/// the path counts as absent; any other non-object on the way is an error.
pub fn lookup<'a>(event: &'a Value, path: &[&str]) -> Result<Option<&'a Value>, MapError> {
    let mut current = event;
    for (depth, key) in path.iter().enumerate() {
        current = match current {
            Value::Object(map) => match map.get(*key) {
                Some(value) => value,
                None => return Ok(None),
            },
            Value::Null => return Ok(None),
            _ if depth == 0 => return Err(MapError::NotAnObject),
            _ => {
                return Err(MapError::NotAnObjectAt {
                    path: path[..depth].join("."),
                })
            }
        };
    }
    Ok((!current.is_null()).then_some(current))
}

/// Renders a present value as the string the store expects.
pub fn scalar(value: &Value, path: &[&str]) -> Result<String, MapError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) => Err(MapError::NotAScalar {
            path: path.join("."),
            found: "a list",
        }),
        Value::Object(_) => Err(MapError::NotAScalar {
            path: path.join("."),
            found: "an object",
        }),
    }
}

/// Decodes a stream record payload: base64 text wrapping a JSON document.
pub fn decode_stream_payload(payload: &[u8]) -> Result<InboundEvent, MapError> {
    let trimmed = payload.trim_ascii();
    if trimmed.is_empty() {
        return Err(MapError::EmptyPayload);
    }
    let raw = STANDARD.decode(trimmed)?;
    let text = String::from_utf8(raw)?;
    Ok(serde_json::from_str(&text)?)
}

/// Parses a bus event delivered as plain JSON.
pub fn decode_bus_payload(payload: &[u8]) -> Result<InboundEvent, MapError> {
    if payload.is_empty() {
        return Err(MapError::EmptyPayload);
    }
    Ok(serde_json::from_slice(payload)?)
}
