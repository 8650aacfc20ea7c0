//! Response body decoding and error-message assembly.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ApiError, DecodeError},
	http::WireResponse,
};

/// Maximum number of characters of a raw body kept in error messages.
pub const BODY_PREVIEW_LIMIT: usize = 256;

#[derive(Deserialize)]
struct ErrorBody {
	message: String,
	#[serde(default)]
	details: Vec<String>,
}

/// Decodes a JSON body, reporting the failing JSON path on mismatch.
pub fn decode_json<T>(response: &WireResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		DecodeError::Json { source, status: response.status, url: response.url.to_string() }
			.into()
	})
}

/// Builds an [`ApiError`] from a `{ message, details[] }` failure body.
///
/// The message reads `"{message}: {details joined by ", "}"`, or just `message` when there are
/// no details. Bodies of any other shape fall back to a truncated preview of the raw text.
pub fn structured_error(response: &WireResponse) -> ApiError {
	let message = match serde_json::from_slice::<ErrorBody>(&response.body) {
		Ok(ErrorBody { message, details }) if details.is_empty() => message,
		Ok(ErrorBody { message, details }) => format!("{message}: {}", details.join(", ")),
		Err(_) => truncate_preview(response.text()),
	};

	ApiError::new(response.status, response.status_text.clone(), message)
}

/// Builds an [`ApiError`] whose message names the request URL, followed by a preview of the
/// body when one was returned.
pub fn url_error(response: &WireResponse) -> ApiError {
	let body = response.text();
	let body = body.trim();
	let message = if body.is_empty() {
		format!("Request to {} failed", response.url)
	} else {
		format!("Request to {} failed: {}", response.url, truncate_preview(body.to_owned()))
	};

	ApiError::new(response.status, response.status_text.clone(), message)
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> WireResponse {
		let url = Url::parse("https://api.example.com/v1/geocode?q=Berlin")
			.expect("Fixture URL should parse.");

		WireResponse::new(url, status, body.as_bytes().to_vec())
	}

	#[test]
	fn structured_error_joins_details() {
		let err = structured_error(&response(
			400,
			r#"{"message":"Invalid request","details":["q is required","lang is invalid"]}"#,
		));

		assert_eq!(err.status, 400);
		assert_eq!(err.status_text, "Bad Request");
		assert_eq!(err.message, "Invalid request: q is required, lang is invalid");

		let err = structured_error(&response(403, r#"{"message":"Forbidden key"}"#));

		assert_eq!(err.message, "Forbidden key");
	}

	#[test]
	fn unstructured_errors_keep_a_bounded_preview() {
		let err = structured_error(&response(502, &"x".repeat(1_000)));

		assert_eq!(err.status_text, "Bad Gateway");
		assert_eq!(err.message.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(err.message.ends_with('…'));
	}

	#[test]
	fn url_error_names_the_request() {
		let err = url_error(&response(404, ""));

		assert_eq!(err.message, "Request to https://api.example.com/v1/geocode?q=Berlin failed");

		let err = url_error(&response(500, "upstream down\n"));

		assert!(err.message.ends_with("failed: upstream down"));
	}

	#[test]
	fn decode_failures_carry_the_json_path() {
		#[derive(Debug, Deserialize)]
		struct Results {
			#[allow(dead_code)]
			results: Vec<u32>,
		}

		let err = decode_json::<Results>(&response(200, r#"{"results":[1,"two"]}"#))
			.expect_err("Mismatched element must fail.");

		match err {
			Error::Decode(DecodeError::Json { source, status, .. }) => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "results[1]");
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}
}
