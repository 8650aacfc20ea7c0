//! Deterministic query-string encoding for call parameters.
//!
//! | value                     | encoding                               |
//! |---------------------------|----------------------------------------|
//! | text                      | as-is                                  |
//! | integer / float           | shortest decimal (`13.0` renders `13`) |
//! | instant                   | RFC 3339, UTC                          |
//! | coordinate                | `"<lat>,<lon>"`                        |
//! | list of the above         | comma-joined                           |
//!
//! Booleans, nested objects other than coordinates, and nested lists have no encoding and fail
//! with [`ConfigError::UnsupportedParameter`].
//!
//! [`QueryParams::from_fields`] only sees the serialized form of a field, so instant fields of
//! parameter structs use [`utc_rfc3339_option`] to reach the query already in UTC.

// crates.io
use serde_json::{Map, Value};
use time::{UtcOffset, format_description::well_known::Rfc3339};
// self
use crate::{_prelude::*, error::ConfigError};

/// Geographic coordinate rendered as `"<lat>,<lon>"`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
	/// Latitude in degrees.
	pub latitude: f64,
	/// Longitude in degrees.
	pub longitude: f64,
}
impl Coordinate {
	/// Creates a coordinate.
	pub fn new(latitude: f64, longitude: f64) -> Self {
		Self { latitude, longitude }
	}

	fn from_object(object: &Map<String, Value>) -> Option<Self> {
		let pick = |long: &str, short: &str| {
			object.get(long).or_else(|| object.get(short)).and_then(Value::as_f64)
		};

		if object.len() != 2 {
			return None;
		}

		Some(Self::new(pick("latitude", "lat")?, pick("longitude", "lon")?))
	}
}
impl Display for Coordinate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{},{}", self.latitude, self.longitude)
	}
}

/// Parameter value with a defined query encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryValue {
	/// Free-form text.
	Text(String),
	/// Whole number.
	Integer(i64),
	/// Floating point number; must be finite.
	Float(f64),
	/// Point in time, encoded in UTC.
	Instant(OffsetDateTime),
	/// Latitude/longitude pair.
	Coordinate(Coordinate),
	/// Comma-joined list of scalar values.
	List(Vec<QueryValue>),
}
impl QueryValue {
	/// Encodes the value; `name` is reported when the value has no encoding.
	pub fn encode(&self, name: &str) -> Result<String, ConfigError> {
		let unsupported =
			|kind: &'static str| ConfigError::UnsupportedParameter { name: name.into(), kind };

		match self {
			Self::Text(text) => Ok(text.clone()),
			Self::Integer(value) => Ok(value.to_string()),
			Self::Float(value) if value.is_finite() => Ok(value.to_string()),
			Self::Float(_) => Err(unsupported("non-finite number")),
			Self::Instant(instant) => instant
				.to_offset(UtcOffset::UTC)
				.format(&Rfc3339)
				.map_err(|_| unsupported("out-of-range instant")),
			Self::Coordinate(coordinate) => Ok(coordinate.to_string()),
			Self::List(items) => {
				let mut encoded = Vec::with_capacity(items.len());

				for item in items {
					if matches!(item, Self::List(_)) {
						return Err(unsupported("nested list"));
					}

					encoded.push(item.encode(name)?);
				}

				Ok(encoded.join(","))
			},
		}
	}
}
impl From<&str> for QueryValue {
	fn from(value: &str) -> Self {
		Self::Text(value.into())
	}
}
impl From<String> for QueryValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<i64> for QueryValue {
	fn from(value: i64) -> Self {
		Self::Integer(value)
	}
}
impl From<u32> for QueryValue {
	fn from(value: u32) -> Self {
		Self::Integer(value.into())
	}
}
impl From<f64> for QueryValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}
impl From<OffsetDateTime> for QueryValue {
	fn from(value: OffsetDateTime) -> Self {
		Self::Instant(value)
	}
}
impl From<Coordinate> for QueryValue {
	fn from(value: Coordinate) -> Self {
		Self::Coordinate(value)
	}
}
impl<T> From<Vec<T>> for QueryValue
where
	T: Into<QueryValue>,
{
	fn from(values: Vec<T>) -> Self {
		Self::List(values.into_iter().map(Into::into).collect())
	}
}

/// Ordered, already-encoded query pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
	pairs: Vec<(String, String)>,
}
impl QueryParams {
	/// Creates an empty parameter list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Encodes a parameter struct field by field, in declaration order.
	///
	/// `null` fields (for example `None` options) are skipped. Coordinate fields are objects
	/// holding exactly `latitude`/`longitude` (or `lat`/`lon`) numbers.
	pub fn from_fields<T>(fields: &T) -> Result<Self>
	where
		T: Serialize,
	{
		let value = serde_json::to_value(fields).map_err(ConfigError::ParameterEncode)?;
		let object = match value {
			Value::Object(object) => object,
			other =>
				return Err(ConfigError::UnsupportedParameter {
					name: String::new(),
					kind: json_kind(&other),
				}
				.into()),
		};
		let mut params = Self::new();

		for (name, value) in &object {
			if let Some(value) = query_value(name, value)? {
				params.push(name.as_str(), value)?;
			}
		}

		Ok(params)
	}

	/// Appends an encoded pair.
	pub fn push(
		&mut self,
		name: impl Into<String>,
		value: impl Into<QueryValue>,
	) -> Result<&mut Self, ConfigError> {
		let name = name.into();
		let encoded = value.into().encode(&name)?;

		self.pairs.push((name, encoded));

		Ok(self)
	}

	/// Appends an encoded pair when `value` is present.
	pub fn push_opt<V>(
		&mut self,
		name: impl Into<String>,
		value: Option<V>,
	) -> Result<&mut Self, ConfigError>
	where
		V: Into<QueryValue>,
	{
		match value {
			Some(value) => self.push(name, value),
			None => Ok(self),
		}
	}

	/// Encoded pairs in insertion order.
	pub fn pairs(&self) -> &[(String, String)] {
		&self.pairs
	}

	/// First encoded value for `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.pairs.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	/// Returns `true` when no pairs were added.
	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}

	/// Form-urlencodes the pairs into `url`'s query, replacing any existing query.
	pub fn apply_to(&self, url: &mut Url) {
		if self.pairs.is_empty() {
			url.set_query(None);

			return;
		}

		url.query_pairs_mut().clear().extend_pairs(self.pairs.iter());
	}
}

fn query_value(name: &str, value: &Value) -> Result<Option<QueryValue>, ConfigError> {
	let unsupported =
		|value: &Value| ConfigError::UnsupportedParameter { name: name.into(), kind: json_kind(value) };

	match value {
		Value::Null => Ok(None),
		Value::String(text) => Ok(Some(QueryValue::Text(text.clone()))),
		Value::Number(_) => scalar_number(value).map(Some).ok_or_else(|| unsupported(value)),
		Value::Object(object) => Coordinate::from_object(object)
			.map(|coordinate| Some(QueryValue::Coordinate(coordinate)))
			.ok_or_else(|| unsupported(value)),
		Value::Array(items) => {
			let mut list = Vec::with_capacity(items.len());

			for item in items {
				match item {
					Value::String(text) => list.push(QueryValue::Text(text.clone())),
					Value::Number(_) =>
						list.push(scalar_number(item).ok_or_else(|| unsupported(item))?),
					Value::Object(object) => list.push(QueryValue::Coordinate(
						Coordinate::from_object(object).ok_or_else(|| unsupported(item))?,
					)),
					other => return Err(unsupported(other)),
				}
			}

			Ok(Some(QueryValue::List(list)))
		},
		Value::Bool(_) => Err(unsupported(value)),
	}
}

fn scalar_number(value: &Value) -> Option<QueryValue> {
	if let Some(integer) = value.as_i64() {
		Some(QueryValue::Integer(integer))
	} else if let Some(unsigned) = value.as_u64() {
		Some(QueryValue::Text(unsigned.to_string()))
	} else {
		value.as_f64().map(QueryValue::Float)
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "list",
		Value::Object(_) => "object",
	}
}

/// Serde adapter for optional instants that serializes RFC 3339 in UTC.
pub mod utc_rfc3339_option {
	// crates.io
	use serde::{Deserializer, Serializer};
	use time::{OffsetDateTime, UtcOffset};

	/// Serializes `value` converted to UTC.
	pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		time::serde::rfc3339::option::serialize(
			&value.map(|instant| instant.to_offset(UtcOffset::UTC)),
			serializer,
		)
	}

	/// Deserializes an optional RFC 3339 instant, keeping its offset.
	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
	where
		D: Deserializer<'de>,
	{
		time::serde::rfc3339::option::deserialize(deserializer)
	}
}
