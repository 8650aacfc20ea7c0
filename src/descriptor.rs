//! Validated endpoint descriptors for token-gated API families.
//!
//! A descriptor names an API family, its base URL, and (for exchanged credentials) the
//! authority that trades self-issued assertions for access tokens. Builders enforce HTTPS for
//! every endpoint except loopback hosts so local mock servers keep working.

// self
use crate::{_prelude::*, error::ConfigError};

/// Immutable endpoint set for one API family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescriptor {
	/// Human-readable family name.
	pub name: String,
	/// Base URL that call paths are appended to.
	pub base_url: Url,
	/// Token authority; `{authority}/token` is the exchange endpoint.
	pub authority: Option<Url>,
}
impl ApiDescriptor {
	/// Creates a new builder for the provided family name.
	pub fn builder(name: impl Into<String>) -> ApiDescriptorBuilder {
		ApiDescriptorBuilder::new(name)
	}

	/// Apple Maps Server API; tokens are exchanged at the same host.
	pub fn apple_maps() -> Result<Self> {
		let base_url = parse_url("https://maps-api.apple.com/v1")?;

		Ok(Self { name: "apple-maps".into(), authority: Some(base_url.clone()), base_url })
	}

	/// Apple WeatherKit REST API; self-issued assertions are used directly.
	pub fn apple_weatherkit() -> Result<Self> {
		Ok(Self {
			name: "apple-weatherkit".into(),
			base_url: parse_url("https://weatherkit.apple.com/api/v1")?,
			authority: None,
		})
	}

	/// Appends path segments to the base URL.
	pub fn endpoint<I, S>(&self, segments: I) -> Result<Url>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		join_segments(&self.base_url, segments)
	}

	/// Returns `{authority}/token`.
	pub fn token_endpoint(&self) -> Result<Url> {
		let authority = self.authority.as_ref().ok_or_else(|| ConfigError::MissingEndpoint {
			descriptor: self.name.clone(),
			endpoint: "authority",
		})?;

		join_segments(authority, ["token"])
	}

	fn validate(&self) -> Result<(), ConfigError> {
		validate_endpoint("base", &self.base_url)?;

		if let Some(authority) = self.authority.as_ref() {
			validate_endpoint("authority", authority)?;
		}

		Ok(())
	}
}

/// Builder for [`ApiDescriptor`] values.
#[derive(Debug)]
pub struct ApiDescriptorBuilder {
	name: String,
	base_url: Option<Url>,
	authority: Option<Url>,
}
impl ApiDescriptorBuilder {
	fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), base_url: None, authority: None }
	}

	/// Sets the base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the token authority.
	pub fn authority(mut self, url: Url) -> Self {
		self.authority = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ApiDescriptor, ConfigError> {
		let base_url = self.base_url.ok_or_else(|| ConfigError::MissingEndpoint {
			descriptor: self.name.clone(),
			endpoint: "base",
		})?;
		let descriptor = ApiDescriptor { name: self.name, base_url, authority: self.authority };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|_| ConfigError::InvalidUrl { url: value.into() })
}

pub(crate) fn join_segments<I, S>(base: &Url, segments: I) -> Result<Url>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut url = base.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::InvalidUrl { url: base.to_string() })?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	let loopback = match url.host() {
		Some(url::Host::Domain(domain)) => domain == "localhost",
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	};

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}
