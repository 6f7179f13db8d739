//! Strict parsing of transport values back into store values.

use crate::error::{CodecError, CodecResult};
use crate::value::{truncate_timestamp, DocumentRef, GeoPoint, StoreValue};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

/// Parses an ISO-8601 / RFC 3339 timestamp into UTC, truncated to
/// milliseconds.
///
/// # Errors
///
/// Returns [`CodecError::InvalidTimestamp`] if the string does not parse.
pub fn parse_timestamp(input: &str) -> CodecResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .map(|ts| truncate_timestamp(ts.with_timezone(&Utc)))
        .map_err(|e| CodecError::InvalidTimestamp {
            input: input.to_string(),
            message: e.to_string(),
        })
}

/// Parses a `{"latitude": .., "longitude": ..}` object.
///
/// # Errors
///
/// Returns an error if the value is not an object, a coordinate is missing
/// or not a number, or a coordinate is out of range.
pub fn parse_geo_point(value: &JsonValue) -> CodecResult<GeoPoint> {
    let object = value
        .as_object()
        .ok_or_else(|| CodecError::unexpected("object", json_kind(value)))?;

    let coordinate = |name: &'static str| -> CodecResult<f64> {
        let field = object
            .get(name)
            .ok_or_else(|| CodecError::unexpected(name, "missing field"))?;
        field
            .as_f64()
            .ok_or_else(|| CodecError::unexpected("number", json_kind(field)))
    };

    GeoPoint::new(coordinate("latitude")?, coordinate("longitude")?)
}

/// Parses a `<collection>/<id>` string into a reference.
///
/// # Errors
///
/// Returns an error if the value is not a string or not a valid path.
pub fn parse_reference(value: &JsonValue) -> CodecResult<DocumentRef> {
    let path = value
        .as_str()
        .ok_or_else(|| CodecError::unexpected("string", json_kind(value)))?;
    DocumentRef::parse(path)
}

/// Maps plain JSON onto store values without guessing structural types.
///
/// Strings stay strings even when they look like timestamps; callers that
/// know a field's type use the `parse_*` functions instead.
pub fn from_plain_json(value: &JsonValue) -> StoreValue {
    match value {
        JsonValue::Null => StoreValue::Null,
        JsonValue::Bool(b) => StoreValue::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => StoreValue::Integer(i),
            None => StoreValue::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => StoreValue::Text(s.clone()),
        JsonValue::Array(items) => StoreValue::Array(items.iter().map(from_plain_json).collect()),
        JsonValue::Object(entries) => StoreValue::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), from_plain_json(v)))
                .collect(),
        ),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::serialize;
    use chrono::{TimeZone, Timelike};
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn parses_utc_and_offset_timestamps() {
        let expected = Utc.with_ymd_and_hms(2023, 11, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2023-11-01T09:30:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2023-11-01T09:30:00.000Z").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2023-11-01T12:30:00+03:00").unwrap(),
            expected
        );
    }

    #[test]
    fn sub_millisecond_digits_are_dropped() {
        let ts = parse_timestamp("2023-11-14T22:13:20.123456789Z").unwrap();
        assert_eq!(ts, Utc.timestamp_opt(1_700_000_000, 123_000_000).unwrap());
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, CodecError::InvalidTimestamp { .. }));
    }

    #[test]
    fn geo_point_shape_errors() {
        assert!(matches!(
            parse_geo_point(&json!("18.9,47.5")),
            Err(CodecError::UnexpectedType { expected: "object", .. })
        ));
        assert!(parse_geo_point(&json!({ "latitude": 18.9 })).is_err());
        assert!(parse_geo_point(&json!({ "latitude": "18.9", "longitude": 1 })).is_err());
        assert_eq!(
            parse_geo_point(&json!({ "latitude": 100.0, "longitude": 0.0 })),
            Err(CodecError::LatitudeOutOfRange(100.0))
        );
    }

    #[test]
    fn reference_parse() {
        let r = parse_reference(&json!("signalements/s1")).unwrap();
        assert_eq!(r, DocumentRef::new("signalements", "s1"));
        assert!(parse_reference(&json!(5)).is_err());
    }

    #[test]
    fn plain_json_mapping() {
        let value = from_plain_json(&json!({
            "budget": 15000,
            "surface": 45.5,
            "tags": ["a", null],
            "date_creation": "2023-11-01T09:30:00Z"
        }));
        assert_eq!(value.get("budget"), Some(&StoreValue::Integer(15000)));
        assert_eq!(value.get("surface"), Some(&StoreValue::Double(45.5)));
        assert_eq!(
            value.get("tags"),
            Some(&StoreValue::Array(vec![StoreValue::from("a"), StoreValue::Null]))
        );
        // No type sniffing.
        assert_eq!(
            value.get("date_creation"),
            Some(&StoreValue::from("2023-11-01T09:30:00Z"))
        );
    }

    proptest! {
        #[test]
        fn timestamp_survives_transport(secs in 0i64..4_102_444_800, nanos in 0u32..1_000_000_000) {
            let ts = Utc.timestamp_opt(secs, nanos).unwrap();
            let stored = StoreValue::from(ts);
            let wire = serialize(&stored);
            let back = parse_timestamp(wire.as_str().unwrap()).unwrap();
            prop_assert_eq!(StoreValue::Timestamp(back), stored);
            prop_assert_eq!(back.nanosecond() % 1_000_000, 0);
        }

        #[test]
        fn geo_point_survives_transport(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let point = GeoPoint::new(lat, lng).unwrap();
            let wire = serialize(&StoreValue::GeoPoint(point));
            prop_assert_eq!(parse_geo_point(&wire).unwrap(), point);
        }
    }
}
