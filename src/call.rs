//! Call descriptors: how to build one request from a credential and how to read its response.

pub mod body;
pub mod query;
pub mod revive;

pub use query::*;
pub use revive::*;

// self
use crate::{
	_prelude::*,
	auth::BearerSecret,
	credential::Credential,
	error::ConfigError,
	http::{WireRequest, WireResponse},
};

/// Immutable description of one outbound request against a token-gated API.
///
/// A call is bound to exactly one credential type. It never mutates the credential and never
/// sees retry counts; [`crate::dispatch::perform`] may prepare the same call several times, and
/// every preparation from the same credential state yields the same [`WireRequest`].
pub trait ApiCall
where
	Self: Send + Sync,
{
	/// Stable label used for spans and metrics (for example `maps.geocode`).
	const OPERATION: &'static str;

	/// Credential family the call authenticates with.
	type Credential: ?Sized + Credential;
	/// Domain value produced from a successful response.
	type Output;

	/// Builds the wire request: target URL, encoded query, and bearer header.
	fn prepare(&self, credential: &Self::Credential) -> Result<WireRequest>;

	/// Interprets a buffered response; non-success statuses become errors.
	fn parse(&self, response: WireResponse) -> Result<Self::Output>;
}

/// Returns the credential's bearer value or [`ConfigError::MissingBearer`].
pub fn require_bearer<C>(credential: &C) -> Result<BearerSecret>
where
	C: ?Sized + Credential,
{
	credential.bearer().ok_or_else(|| ConfigError::MissingBearer.into())
}

/// Builds an authorized `GET` request for `url` with `params` as its query.
pub fn authorized_request<C>(credential: &C, mut url: Url, params: &QueryParams) -> Result<WireRequest>
where
	C: ?Sized + Credential,
{
	let bearer = require_bearer(credential)?;

	params.apply_to(&mut url);

	Ok(WireRequest::new(url).with_header("accept", "application/json").with_bearer(&bearer))
}
