//! Conversion of store values into their transport form.

use crate::value::{Fields, StoreValue};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value as JsonValue};

/// Field under which the store identifier is written.
pub const ID_FIELD: &str = "id";

/// Converts a store value into a transport-safe JSON value.
///
/// - `Timestamp` becomes a UTC ISO-8601 string with millisecond precision.
/// - `GeoPoint` becomes `{"latitude": .., "longitude": ..}`.
/// - `Reference` becomes its `<collection>/<id>` path.
/// - Containers are converted element by element.
/// - Everything else passes through unchanged.
///
/// Never fails. A non-finite double has no JSON spelling and becomes `null`.
pub fn serialize(value: &StoreValue) -> JsonValue {
    match value {
        StoreValue::Null => JsonValue::Null,
        StoreValue::Bool(b) => JsonValue::Bool(*b),
        StoreValue::Integer(n) => JsonValue::Number((*n).into()),
        StoreValue::Double(n) => Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
        StoreValue::Text(s) => JsonValue::String(s.clone()),
        StoreValue::Timestamp(ts) => JsonValue::String(format_timestamp(ts)),
        StoreValue::GeoPoint(point) => {
            let mut object = Map::with_capacity(2);
            object.insert("latitude".into(), f64_to_json(point.latitude));
            object.insert("longitude".into(), f64_to_json(point.longitude));
            JsonValue::Object(object)
        }
        StoreValue::Reference(r) => JsonValue::String(r.path()),
        StoreValue::Array(items) => JsonValue::Array(items.iter().map(serialize).collect()),
        StoreValue::Map(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), serialize(v)))
                .collect(),
        ),
    }
}

/// Serializes every field of a document and attaches its identifier.
///
/// The identifier is always the one the store assigned; a stored field that
/// happens to be called `id` does not replace it.
pub fn serialize_record(id: &str, fields: &Fields) -> Map<String, JsonValue> {
    let mut object: Map<String, JsonValue> = fields
        .iter()
        .map(|(k, v)| (k.clone(), serialize(v)))
        .collect();
    object.insert(ID_FIELD.into(), JsonValue::String(id.to_string()));
    object
}

/// Formats a timestamp the way the transport expects it.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn f64_to_json(n: f64) -> JsonValue {
    Number::from_f64(n).map_or(JsonValue::Null, JsonValue::Number)
}
