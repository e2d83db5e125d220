//! Lossless textual codec for session-state values
//!
//! The protocol layer produces JSON-like value trees that may embed raw
//! binary at any depth. Binary sub-values are tagged during encoding as
//! `{"type":"Buffer","data":"<base64>"}` and restored to bytes on decoding,
//! so the round-trip is exact.

use base64::Engine;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::error::{Result, StoreError};

/// A structured session-state value, possibly carrying binary payloads
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<StateValue>),
    Object(BTreeMap<String, StateValue>),
}

impl StateValue {
    fn to_json(&self) -> Value {
        match self {
            StateValue::Null => Value::Null,
            StateValue::Bool(b) => Value::Bool(*b),
            StateValue::Number(n) => Value::Number(n.clone()),
            StateValue::String(s) => Value::String(s.clone()),
            StateValue::Bytes(bytes) => {
                let mut tagged = Map::new();
                tagged.insert("type".to_string(), Value::String("Buffer".to_string()));
                tagged.insert(
                    "data".to_string(),
                    Value::String(base64::engine::general_purpose::STANDARD.encode(bytes)),
                );
                Value::Object(tagged)
            }
            StateValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            StateValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(StateValue::Null),
            Value::Bool(b) => Ok(StateValue::Bool(b)),
            Value::Number(n) => Ok(StateValue::Number(n)),
            Value::String(s) => Ok(StateValue::String(s)),
            Value::Array(items) => Ok(StateValue::Array(
                items
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<Result<_>>()?,
            )),
            Value::Object(fields) => {
                // An object carrying exactly the tag fields is a binary value;
                // the tagged form wins, matching the original wire format.
                if fields.len() == 2
                    && fields.get("type").and_then(Value::as_str) == Some("Buffer")
                {
                    if let Some(encoded) = fields.get("data").and_then(Value::as_str) {
                        let bytes = base64::engine::general_purpose::STANDARD
                            .decode(encoded)
                            .map_err(|e| {
                                StoreError::Deserialization(format!(
                                    "Invalid base64 in binary tag: {}",
                                    e
                                ))
                            })?;
                        return Ok(StateValue::Bytes(bytes));
                    }
                }

                let mut out = BTreeMap::new();
                for (key, value) in fields {
                    out.insert(key, Self::from_json(value)?);
                }
                Ok(StateValue::Object(out))
            }
        }
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        StateValue::String(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        StateValue::String(s)
    }
}

impl From<Vec<u8>> for StateValue {
    fn from(bytes: Vec<u8>) -> Self {
        StateValue::Bytes(bytes)
    }
}

impl From<bool> for StateValue {
    fn from(b: bool) -> Self {
        StateValue::Bool(b)
    }
}

impl From<i64> for StateValue {
    fn from(n: i64) -> Self {
        StateValue::Number(Number::from(n))
    }
}

/// Encode a value to its canonical textual form
///
/// Encoding never fails for any value the protocol layer produces.
pub fn encode(value: &StateValue) -> String {
    // Serializing a `serde_json::Value` tree with string keys cannot fail
    serde_json::to_string(&value.to_json()).expect("JSON value serialization is infallible")
}

/// Decode the canonical textual form back into a value
pub fn decode(text: &str) -> Result<StateValue> {
    let json: Value =
        serde_json::from_str(text).map_err(|e| StoreError::Deserialization(e.to_string()))?;
    StateValue::from_json(json)
}
