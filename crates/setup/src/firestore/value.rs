//! Conversion between [`FieldValue`] and Firestore's REST value encoding.
//!
//! Firestore wraps every value in an object naming its type, e.g.
//! `{"integerValue": "6"}` (64-bit integers travel as strings) or
//! `{"mapValue": {"fields": {...}}}`. Server timestamps are not values at
//! all: they are pulled out into `updateTransforms` on the write.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::store::{Document, FieldValue, StoreError};

/// Fields of a document ready for a write, plus the paths that must be set
/// to the server's commit time.
#[derive(Debug)]
pub struct EncodedFields {
    pub fields: Map<String, Value>,
    pub server_timestamps: Vec<String>,
}

/// Encode a document for a write request.
///
/// # Errors
///
/// Returns `StoreError::InvalidDocument` if a server timestamp appears inside
/// an array, which Firestore cannot express.
pub fn encode_document(document: &Document) -> Result<EncodedFields, StoreError> {
    let mut server_timestamps = Vec::new();
    let fields = encode_fields(document.fields(), None, &mut server_timestamps)?;
    Ok(EncodedFields {
        fields,
        server_timestamps,
    })
}

fn encode_fields(
    fields: &BTreeMap<String, FieldValue>,
    parent: Option<&str>,
    server_timestamps: &mut Vec<String>,
) -> Result<Map<String, Value>, StoreError> {
    let mut out = Map::new();
    for (name, value) in fields {
        let segment = quote_segment(name);
        let path = parent.map_or_else(|| segment.clone(), |p| format!("{p}.{segment}"));
        match value {
            FieldValue::ServerTimestamp => server_timestamps.push(path),
            FieldValue::Map(nested) => {
                let nested = encode_fields(nested, Some(&path), server_timestamps)?;
                out.insert(name.clone(), json!({ "mapValue": { "fields": nested } }));
            }
            other => {
                out.insert(name.clone(), encode_value(other, &path)?);
            }
        }
    }
    Ok(out)
}

fn encode_value(value: &FieldValue, path: &str) -> Result<Value, StoreError> {
    Ok(match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Boolean(b) => json!({ "booleanValue": b }),
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": d }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Timestamp(at) => json!({ "timestampValue": format_timestamp(*at) }),
        FieldValue::Array(values) => {
            let values = values
                .iter()
                .map(|v| match v {
                    FieldValue::ServerTimestamp => Err(StoreError::InvalidDocument(format!(
                        "server timestamp inside array at `{path}`"
                    ))),
                    FieldValue::Map(nested) => {
                        let mut inner = Vec::new();
                        let fields = encode_fields(nested, Some(path), &mut inner)?;
                        if inner.is_empty() {
                            Ok(json!({ "mapValue": { "fields": fields } }))
                        } else {
                            Err(StoreError::InvalidDocument(format!(
                                "server timestamp inside array at `{path}`"
                            )))
                        }
                    }
                    other => encode_value(other, path),
                })
                .collect::<Result<Vec<_>, _>>()?;
            json!({ "arrayValue": { "values": values } })
        }
        FieldValue::Map(nested) => {
            let mut inner = Vec::new();
            let fields = encode_fields(nested, Some(path), &mut inner)?;
            json!({ "mapValue": { "fields": fields } })
        }
        FieldValue::ServerTimestamp => {
            return Err(StoreError::InvalidDocument(format!(
                "unexpected server timestamp at `{path}`"
            )));
        }
    })
}

/// Decode the `fields` object of a fetched document.
///
/// # Errors
///
/// Returns `StoreError::InvalidResponse` on value types this service does
/// not understand or malformed payloads.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Document, StoreError> {
    let decoded = fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode_value(value)?)))
        .collect::<Result<BTreeMap<_, _>, StoreError>>()?;
    Ok(Document::from(decoded))
}

fn decode_value(value: &Value) -> Result<FieldValue, StoreError> {
    let invalid = || StoreError::InvalidResponse(format!("unsupported Firestore value: {value}"));
    let object = value.as_object().ok_or_else(invalid)?;
    let (kind, inner) = object.iter().next().ok_or_else(invalid)?;

    match kind.as_str() {
        "nullValue" => Ok(FieldValue::Null),
        "booleanValue" => inner.as_bool().map(FieldValue::Boolean).ok_or_else(invalid),
        "integerValue" => parse_integer(inner).map(FieldValue::Integer).ok_or_else(invalid),
        "doubleValue" => inner.as_f64().map(FieldValue::Double).ok_or_else(invalid),
        "stringValue" | "referenceValue" => inner
            .as_str()
            .map(|s| FieldValue::String(s.to_owned()))
            .ok_or_else(invalid),
        "timestampValue" => inner
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|at| FieldValue::Timestamp(at.with_timezone(&Utc)))
            .ok_or_else(invalid),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
                Some(_) => return Err(invalid()),
            };
            Ok(FieldValue::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(Value::Object(fields)) => decode_fields(fields)?,
                None => Document::new(),
                Some(_) => return Err(invalid()),
            };
            Ok(fields.into())
        }
        _ => Err(invalid()),
    }
}

/// Firestore sends int64 as a JSON string; accept plain numbers too.
pub fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Quote a field path segment unless it is a plain identifier.
fn quote_segment(name: &str) -> String {
    let mut chars = name.chars();
    let simple = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_owned()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}
