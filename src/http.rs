//! Transport primitives for token-gated API calls.
//!
//! [`Transport`] is the crate's only dependency on an HTTP stack. Calls describe requests as
//! [`WireRequest`] values, the transport sends them, and the fully buffered [`WireResponse`]
//! comes back for status inspection and parsing. Tests and embedders can inject any async
//! function through [`FnTransport`]; the `reqwest` feature provides [`ReqwestTransport`].

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use ::http::StatusCode;
// self
use crate::{_prelude::*, auth::BearerSecret};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<WireResponse>> + 'a + Send>>;

/// Abstraction over HTTP transports able to send a [`WireRequest`].
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by many
/// concurrent dispatches, and the futures they return must be `Send`. Timeouts and
/// cancellation belong to the transport; the dispatcher never imposes its own.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` as an HTTP `GET` and buffers the response.
	fn send(&self, request: WireRequest) -> TransportFuture<'_>;
}
impl<T> Transport for Arc<T>
where
	T: ?Sized + Transport,
{
	fn send(&self, request: WireRequest) -> TransportFuture<'_> {
		(**self).send(request)
	}
}

/// Outbound `GET` request produced by a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireRequest {
	/// Fully encoded target URL, query included.
	pub url: Url,
	/// Request headers keyed by lowercase name.
	pub headers: BTreeMap<String, String>,
}
impl WireRequest {
	/// Creates a request without headers.
	pub fn new(url: Url) -> Self {
		Self { url, headers: BTreeMap::new() }
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Attaches `Authorization: Bearer <secret>`.
	pub fn with_bearer(self, secret: &BearerSecret) -> Self {
		self.with_header("authorization", format!("Bearer {}", secret.expose()))
	}

	/// Returns a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}
}

/// Buffered HTTP response handed back by a [`Transport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireResponse {
	/// URL the request was sent to.
	pub url: Url,
	/// HTTP status code.
	pub status: u16,
	/// HTTP reason phrase.
	pub status_text: String,
	/// Response headers keyed by lowercase name.
	pub headers: BTreeMap<String, String>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl WireResponse {
	/// Creates a response whose reason phrase is derived from `status`.
	pub fn new(url: Url, status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self {
			url,
			status,
			status_text: reason_phrase(status).into(),
			headers: BTreeMap::new(),
			body: body.into(),
		}
	}

	/// Overrides the reason phrase.
	pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
		self.status_text = text.into();

		self
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for a non-success `401 Unauthorized`.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Lossy UTF-8 view of the body.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Adapter that turns an async function into a [`Transport`].
#[derive(Clone)]
pub struct FnTransport<F>(F);
impl<F> FnTransport<F> {
	/// Wraps `send`, which is invoked once per request.
	pub fn new(send: F) -> Self {
		Self(send)
	}
}
impl<F, Fut> Transport for FnTransport<F>
where
	F: 'static + Send + Sync + Fn(WireRequest) -> Fut,
	Fut: 'static + Send + Future<Output = Result<WireResponse>>,
{
	fn send(&self, request: WireRequest) -> TransportFuture<'_> {
		Box::pin((self.0)(request))
	}
}
impl<F> Debug for FnTransport<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FnTransport(..)")
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests fail after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(crate::error::ConfigError::from)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send(&self, request: WireRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let WireRequest { url, headers } = request;
			let mut builder = client.get(url.clone());

			for (name, value) in &headers {
				builder = builder.header(name, value);
			}

			let response = builder.send().await.map_err(|e| map_reqwest_error(&url, e))?;
			let status = response.status();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body = response.bytes().await.map_err(|e| map_reqwest_error(&url, e))?.to_vec();

			Ok::<_, Error>(WireResponse {
				url,
				status: status.as_u16(),
				status_text: reason_phrase(status.as_u16()).to_owned(),
				headers,
				body,
			})
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(url: &Url, err: ReqwestError) -> Error {
	use crate::error::{ConfigError, TransportError};

	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { url: url.to_string() }.into();
	}

	TransportError::network(url, err).into()
}

fn reason_phrase(status: u16) -> &'static str {
	StatusCode::from_u16(status).ok().and_then(|status| status.canonical_reason()).unwrap_or_default()
}
