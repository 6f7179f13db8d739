//! # Roadwork Codec
//!
//! Store-native values and their transport-safe form.
//!
//! Document stores hand back values JSON cannot carry directly: points in
//! time, geographic coordinates, references to other documents. Before a
//! record leaves the sync engine every field goes through [`serialize`]:
//!
//! - timestamps become UTC ISO-8601 strings (`2023-11-01T09:30:00.000Z`)
//! - geo points become `{"latitude": .., "longitude": ..}`
//! - references become `<collection>/<id>` paths
//! - everything else is passed through unchanged
//!
//! Serialization is infallible. The reverse direction is strict: the
//! `parse_*` functions validate their input and return [`CodecError`].
//!
//! ## Usage
//!
//! ```
//! use roadwork_codec::{parse_geo_point, serialize, GeoPoint, StoreValue};
//!
//! let point = GeoPoint::new(18.9, 47.5).unwrap();
//! let wire = serialize(&StoreValue::GeoPoint(point));
//! assert_eq!(parse_geo_point(&wire).unwrap(), point);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{from_plain_json, parse_geo_point, parse_reference, parse_timestamp};
pub use encoder::{format_timestamp, serialize, serialize_record, ID_FIELD};
pub use error::{CodecError, CodecResult};
pub use value::{truncate_timestamp, DocumentRef, Fields, GeoPoint, StoreValue, TIMESTAMP_PRECISION};
