//! Crate-level error types shared by credentials, calls, and the dispatcher.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Upstream API answered with a non-success status.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Local configuration or programming problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Upstream API answered with a body that could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}
impl Error {
	/// Returns the [`ApiError`] when the failure came from an upstream status.
	pub fn as_api(&self) -> Option<&ApiError> {
		match self {
			Self::Api(e) => Some(e),
			_ => None,
		}
	}
}

/// Failure reported by an upstream API or token authority.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{status} {status_text}: {message}")]
pub struct ApiError {
	/// HTTP status code.
	pub status: u16,
	/// HTTP reason phrase.
	pub status_text: String,
	/// Human-readable message assembled from the response.
	pub message: String,
}
impl ApiError {
	const UNAUTHORIZED: u16 = 401;

	/// Creates a new error from its parts.
	pub fn new(status: u16, status_text: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, status_text: status_text.into(), message: message.into() }
	}

	/// Error returned once every attempt allowed by a credential answered `401`.
	pub fn retry_limit_exceeded() -> Self {
		Self::new(Self::UNAUTHORIZED, "Unauthorized", "Retry limit exceeded")
	}

	/// Returns `true` for `401 Unauthorized`.
	pub fn is_unauthorized(&self) -> bool {
		self.status == Self::UNAUTHORIZED
	}
}

/// Configuration and programming failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Private key is not a PKCS#8 P-256 key.
	#[error("Signing key is not a valid PKCS#8 P-256 private key.")]
	InvalidSigningKey {
		/// Underlying key parsing failure.
		#[source]
		source: BoxError,
	},
	/// Assertion header or claims could not be serialized.
	#[error("Assertion could not be serialized.")]
	AssertionEncode(#[source] serde_json::Error),
	/// Endpoint URL cannot be parsed or extended.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL text.
		url: String,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Descriptor is missing a required endpoint.
	#[error("Descriptor `{descriptor}` is missing the {endpoint} endpoint.")]
	MissingEndpoint {
		/// Descriptor name.
		descriptor: String,
		/// Missing endpoint label.
		endpoint: &'static str,
	},
	/// Request parameters could not be serialized into a JSON object.
	#[error("Request parameters could not be serialized.")]
	ParameterEncode(#[source] serde_json::Error),
	/// A request parameter has a type the query encoder does not support.
	#[error("Parameter `{name}` has an unsupported {kind} value.")]
	UnsupportedParameter {
		/// Parameter name.
		name: String,
		/// JSON kind of the rejected value.
		kind: &'static str,
	},
	/// A request was prepared from a credential that holds no bearer value.
	#[error("Credential holds no bearer value; refresh it before preparing requests.")]
	MissingBearer,
	/// Credentials must allow at least one attempt.
	#[error("Retry limit must be at least 1.")]
	ZeroRetryLimit,
	/// Token authority returned an excessively large `expiresInSeconds`.
	#[error("The expiresInSeconds value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token authority returned a non-positive duration.
	#[error("The expiresInSeconds value must be positive.")]
	NonPositiveExpiresIn,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a key parsing failure inside [`ConfigError`].
	pub fn invalid_signing_key(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::InvalidSigningKey { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Request URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete within the transport's timeout.
	#[error("Request to {url} timed out.")]
	Timeout {
		/// Request URL.
		url: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

/// Response bodies that could not be decoded into the expected shape.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not the JSON document the call expects.
	#[error("Response from {url} is not the expected JSON (status {status}).")]
	Json {
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
		/// Request URL.
		url: String,
	},
}
