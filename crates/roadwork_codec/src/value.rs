//! Store-native value type.

use crate::error::{CodecError, CodecResult};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field name to value mapping of a stored document.
pub type Fields = BTreeMap<String, StoreValue>;

/// Fractional-second digits a stored timestamp keeps (milliseconds).
pub const TIMESTAMP_PRECISION: u16 = 3;

/// Truncates `ts` to the store's millisecond precision.
///
/// Timestamps entering a [`StoreValue`] through `From` or deserialization
/// are truncated, so a value equals what its transport form parses back to.
pub fn truncate_timestamp(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(TIMESTAMP_PRECISION)
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    DateTime::<Utc>::deserialize(deserializer).map(truncate_timestamp)
}

/// A dynamic document-store value.
///
/// This mirrors what a document database hands back for a field: plain
/// scalars, nested containers, and the structural types (`Timestamp`,
/// `GeoPoint`, `Reference`) that have no direct JSON counterpart and must go
/// through [`crate::serialize`] before leaving the process.
///
/// The serde representation is adjacently tagged (`{"type": .., "value": ..}`)
/// so the structural types survive a trip through a JSON file unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StoreValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Double-precision float.
    Double(f64),
    /// Text string (UTF-8).
    Text(String),
    /// Point in time, UTC, at millisecond precision. Build it with
    /// `StoreValue::from` to get the truncation.
    #[serde(deserialize_with = "deserialize_timestamp")]
    Timestamp(DateTime<Utc>),
    /// Geographic coordinate.
    GeoPoint(GeoPoint),
    /// Reference to another document.
    Reference(DocumentRef),
    /// Array of values.
    Array(Vec<StoreValue>),
    /// Nested map with string keys.
    Map(BTreeMap<String, StoreValue>),
}

impl StoreValue {
    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            StoreValue::Null => "null",
            StoreValue::Bool(_) => "bool",
            StoreValue::Integer(_) => "integer",
            StoreValue::Double(_) => "double",
            StoreValue::Text(_) => "text",
            StoreValue::Timestamp(_) => "timestamp",
            StoreValue::GeoPoint(_) => "geo_point",
            StoreValue::Reference(_) => "reference",
            StoreValue::Array(_) => "array",
            StoreValue::Map(_) => "map",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, StoreValue::Null)
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StoreValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StoreValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a float. Integers are widened.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            StoreValue::Double(n) => Some(*n),
            StoreValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Get this value as a string, if it is a text string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StoreValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as a timestamp, if it is one.
    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            StoreValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    /// Get this value as a geographic point, if it is one.
    pub fn as_geo_point(&self) -> Option<&GeoPoint> {
        match self {
            StoreValue::GeoPoint(p) => Some(p),
            _ => None,
        }
    }

    /// Get this value as a document reference, if it is one.
    pub fn as_reference(&self) -> Option<&DocumentRef> {
        match self {
            StoreValue::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Get this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[StoreValue]> {
        match self {
            StoreValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&BTreeMap<String, StoreValue>> {
        match self {
            StoreValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a key in this map value.
    pub fn get(&self, key: &str) -> Option<&StoreValue> {
        self.as_map().and_then(|m| m.get(key))
    }
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180].
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting out-of-range or non-finite coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::LatitudeOutOfRange`] or
    /// [`CodecError::LongitudeOutOfRange`].
    pub fn new(latitude: f64, longitude: f64) -> CodecResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CodecError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CodecError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// A reference to a document in another (or the same) collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Collection name.
    pub collection: String,
    /// Document identifier.
    pub id: String,
}

impl DocumentRef {
    /// Creates a reference.
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Parses a `<collection>/<id>` path.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidReference`] unless the path has exactly
    /// two non-empty segments.
    pub fn parse(path: &str) -> CodecResult<Self> {
        match path.split_once('/') {
            Some((collection, id))
                if !collection.is_empty() && !id.is_empty() && !id.contains('/') =>
            {
                Ok(Self::new(collection, id))
            }
            _ => Err(CodecError::InvalidReference(path.to_string())),
        }
    }

    /// Returns the `<collection>/<id>` path.
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

impl From<bool> for StoreValue {
    fn from(b: bool) -> Self {
        StoreValue::Bool(b)
    }
}

impl From<i64> for StoreValue {
    fn from(n: i64) -> Self {
        StoreValue::Integer(n)
    }
}

impl From<i32> for StoreValue {
    fn from(n: i32) -> Self {
        StoreValue::Integer(i64::from(n))
    }
}

impl From<u32> for StoreValue {
    fn from(n: u32) -> Self {
        StoreValue::Integer(i64::from(n))
    }
}

impl From<f64> for StoreValue {
    fn from(n: f64) -> Self {
        StoreValue::Double(n)
    }
}

impl From<String> for StoreValue {
    fn from(s: String) -> Self {
        StoreValue::Text(s)
    }
}

impl From<&str> for StoreValue {
    fn from(s: &str) -> Self {
        StoreValue::Text(s.to_string())
    }
}

impl From<DateTime<Utc>> for StoreValue {
    fn from(ts: DateTime<Utc>) -> Self {
        StoreValue::Timestamp(truncate_timestamp(ts))
    }
}

impl From<GeoPoint> for StoreValue {
    fn from(p: GeoPoint) -> Self {
        StoreValue::GeoPoint(p)
    }
}

impl From<DocumentRef> for StoreValue {
    fn from(r: DocumentRef) -> Self {
        StoreValue::Reference(r)
    }
}

impl<T: Into<StoreValue>> From<Vec<T>> for StoreValue {
    fn from(v: Vec<T>) -> Self {
        StoreValue::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<()> for StoreValue {
    fn from((): ()) -> Self {
        StoreValue::Null
    }
}
