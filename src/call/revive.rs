//! JSON documents with date-like fields revived into real instants.
//!
//! Detection is by key name only: a string value is parsed as an RFC 3339 instant when its key
//! equals `asOf`, `moonrise`, or `moonset`, starts with `solar`, `sunrise`, or `sunset`, or ends
//! with `Time`, `End`, or `Start`. Strings that fail to parse are kept as they are.

// crates.io
use serde_json::{Number, Value};
use time::format_description::well_known::Rfc3339;
// self
use crate::_prelude::*;

const EXACT_KEYS: [&str; 3] = ["asOf", "moonrise", "moonset"];
const KEY_PREFIXES: [&str; 3] = ["solar", "sunrise", "sunset"];
const KEY_SUFFIXES: [&str; 3] = ["Time", "End", "Start"];

/// JSON value whose date-like fields hold [`OffsetDateTime`] instants.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Revived {
	/// `null`.
	Null,
	/// Boolean.
	Bool(bool),
	/// Number, kept in its JSON representation.
	Number(Number),
	/// String that is not a revived instant.
	String(String),
	/// Revived instant; serializes back to RFC 3339.
	Instant(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
	/// Array.
	Array(Vec<Revived>),
	/// Object, keyed by field name.
	Object(BTreeMap<String, Revived>),
}
impl Revived {
	/// Revives every date-like field of `value`.
	pub fn from_json(value: Value) -> Self {
		revive(None, value)
	}

	/// Field of an object value.
	pub fn get(&self, key: &str) -> Option<&Revived> {
		match self {
			Self::Object(fields) => fields.get(key),
			_ => None,
		}
	}

	/// Element of an array value.
	pub fn at(&self, index: usize) -> Option<&Revived> {
		match self {
			Self::Array(items) => items.get(index),
			_ => None,
		}
	}

	/// Instant held by a revived field.
	pub fn as_instant(&self) -> Option<OffsetDateTime> {
		match self {
			Self::Instant(instant) => Some(*instant),
			_ => None,
		}
	}

	/// Text held by a string field.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(text) => Some(text),
			_ => None,
		}
	}

	/// Numeric value as `f64`.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Number(number) => number.as_f64(),
			_ => None,
		}
	}

	/// Items of an array value.
	pub fn as_array(&self) -> Option<&[Revived]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Returns `true` for `null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}
}
impl From<Value> for Revived {
	fn from(value: Value) -> Self {
		Self::from_json(value)
	}
}

/// Returns `true` when string values under `key` are treated as instants.
pub fn is_date_key(key: &str) -> bool {
	EXACT_KEYS.contains(&key)
		|| KEY_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
		|| KEY_SUFFIXES.iter().any(|suffix| key.ends_with(suffix))
}

fn revive(key: Option<&str>, value: Value) -> Revived {
	match value {
		Value::Null => Revived::Null,
		Value::Bool(flag) => Revived::Bool(flag),
		Value::Number(number) => Revived::Number(number),
		Value::String(text) => match key.filter(|key| is_date_key(key)) {
			Some(_) => OffsetDateTime::parse(&text, &Rfc3339)
				.map(Revived::Instant)
				.unwrap_or(Revived::String(text)),
			None => Revived::String(text),
		},
		// Array elements are keyed by index, never by name.
		Value::Array(items) => Revived::Array(items.into_iter().map(|item| revive(None, item)).collect()),
		Value::Object(fields) => Revived::Object(
			fields.into_iter().map(|(key, value)| {
				let revived = revive(Some(&key), value);

				(key, revived)
			})
			.collect(),
		),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;

	#[test]
	fn date_keys_follow_the_naming_rules() {
		for key in [
			"asOf",
			"moonrise",
			"moonset",
			"solarNoon",
			"sunriseCivil",
			"sunset",
			"forecastStart",
			"forecastEnd",
			"expireTime",
		] {
			assert!(is_date_key(key), "{key} should be a date key");
		}
		for key in ["conditionCode", "moonPhase", "asOfDate", "daytimeForecast", "startTime2"] {
			assert!(!is_date_key(key), "{key} should not be a date key");
		}
	}

	#[test]
	fn weather_document_is_revived() {
		let revived = Revived::from_json(json!({
			"currentWeather": {
				"metadata": { "readTime": "2025-03-01T12:05:00Z", "expireTime": "not a date" },
				"asOf": "2025-03-01T12:00:00Z",
				"conditionCode": "Clear",
				"temperature": 11.5,
			},
			"forecastDaily": {
				"days": [{
					"forecastStart": "2025-03-01T05:00:00Z",
					"sunrise": "2025-03-01T06:58:00+01:00",
					"moonset": null,
					"sunsetTime": 17,
				}],
			},
		}));
		let current = revived.get("currentWeather").expect("Current weather should exist.");
		let day = revived
			.get("forecastDaily")
			.and_then(|daily| daily.get("days"))
			.and_then(|days| days.at(0))
			.expect("First day should exist.");

		assert_eq!(
			current.get("asOf").and_then(Revived::as_instant),
			Some(macros::datetime!(2025-03-01 12:00 UTC)),
		);
		assert_eq!(
			current.get("metadata").and_then(|m| m.get("readTime")).and_then(Revived::as_instant),
			Some(macros::datetime!(2025-03-01 12:05 UTC)),
		);
		assert_eq!(
			current.get("metadata").and_then(|m| m.get("expireTime")).and_then(Revived::as_str),
			Some("not a date"),
		);
		assert_eq!(current.get("conditionCode").and_then(Revived::as_str), Some("Clear"));
		assert_eq!(current.get("temperature").and_then(Revived::as_f64), Some(11.5));
		assert_eq!(
			day.get("sunrise").and_then(Revived::as_instant),
			Some(macros::datetime!(2025-03-01 05:58 UTC)),
		);
		assert!(day.get("forecastStart").and_then(Revived::as_instant).is_some());
		assert!(day.get("moonset").is_some_and(Revived::is_null));
		assert_eq!(day.get("sunsetTime").and_then(Revived::as_f64), Some(17.0));
	}

	#[test]
	fn array_elements_are_not_revived() {
		let revived = Revived::from_json(json!({ "asOf": ["2025-03-01T12:00:00Z"] }));
		let first = revived.get("asOf").and_then(|items| items.at(0));

		assert_eq!(first.and_then(Revived::as_str), Some("2025-03-01T12:00:00Z"));
	}

	#[test]
	fn revived_instants_serialize_as_rfc3339() {
		let revived = Revived::from_json(json!({ "asOf": "2025-03-01T12:00:00Z", "n": 1 }));

		assert_eq!(
			serde_json::to_value(&revived).expect("Revived values should serialize."),
			json!({ "asOf": "2025-03-01T12:00:00Z", "n": 1 }),
		);
	}
}
