//! Credential obtained by exchanging a self-issued assertion at a token authority (Maps style).
//!
//! Refreshing signs an assertion, sends `GET {authority}/token` with it as the bearer, and
//! stores the returned `accessToken` together with `now + expiresInSeconds`.

// self
use crate::{
	_prelude::*,
	auth::{AssertionSigner, BearerSecret},
	call::body,
	credential::{self, Credential, RefreshFuture, RefreshGate},
	descriptor::ApiDescriptor,
	error::ConfigError,
	http::{Transport, WireRequest},
};

#[derive(Debug, Default)]
struct ExchangedState {
	bearer: BearerSecret,
	expires_at: Option<OffsetDateTime>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenGrant {
	access_token: String,
	expires_in_seconds: i64,
}

/// Expiring credential backed by an assertion-for-token exchange.
#[derive(Debug)]
pub struct ExchangedCredential {
	signer: AssertionSigner,
	token_url: Url,
	retry_limit: u32,
	state: RwLock<ExchangedState>,
	gate: RefreshGate,
}
impl ExchangedCredential {
	/// Attempts allowed per dispatch unless overridden.
	pub const DEFAULT_RETRY_LIMIT: u32 = 2;
	/// Validity window of the assertions sent to the authority.
	pub const ASSERTION_VALIDITY: Duration = Duration::minutes(30);

	const OPERATION: &'static str = "credential.exchanged";

	/// Creates an empty (invalid) credential exchanging at `descriptor`'s authority.
	///
	/// The signer's validity window is replaced with [`Self::ASSERTION_VALIDITY`].
	pub fn new(signer: AssertionSigner, descriptor: &ApiDescriptor) -> Result<Self> {
		Ok(Self {
			signer: signer.with_validity(Self::ASSERTION_VALIDITY),
			token_url: descriptor.token_endpoint()?,
			retry_limit: Self::DEFAULT_RETRY_LIMIT,
			state: RwLock::new(ExchangedState::default()),
			gate: RefreshGate::default(),
		})
	}

	/// Overrides the retry limit; `0` is rejected.
	pub fn with_retry_limit(mut self, limit: u32) -> Result<Self> {
		self.retry_limit = credential::validate_retry_limit(limit)?;

		Ok(self)
	}

	/// Exchange endpoint (`{authority}/token`).
	pub fn token_url(&self) -> &Url {
		&self.token_url
	}

	/// Expiry of the current bearer, if one has been obtained.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.state.read().expires_at
	}

	/// Returns `true` while `now <= expires_at` and a bearer is held.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		let state = self.state.read();

		!state.bearer.is_empty() && state.expires_at.is_some_and(|expires_at| now <= expires_at)
	}

	/// Number of exchanges that completed successfully.
	pub fn refreshes(&self) -> u64 {
		self.gate.completed()
	}

	async fn exchange(&self, transport: &dyn Transport) -> Result<()> {
		let assertion = self.signer.sign()?;
		let request = WireRequest::new(self.token_url.clone())
			.with_header("accept", "application/json")
			.with_bearer(&assertion.token);
		let response = transport.send(request).await?;

		if !response.is_success() {
			return Err(body::structured_error(&response).into());
		}

		let grant = body::decode_json::<TokenGrant>(&response)?;
		let expires_at = expiry_after(OffsetDateTime::now_utc(), grant.expires_in_seconds)?;

		*self.state.write() =
			ExchangedState { bearer: BearerSecret::new(grant.access_token), expires_at: Some(expires_at) };

		Ok(())
	}
}
impl Credential for ExchangedCredential {
	fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	fn retry_limit(&self) -> u32 {
		self.retry_limit
	}

	fn bearer(&self) -> Option<BearerSecret> {
		let state = self.state.read();

		(!state.bearer.is_empty()).then(|| state.bearer.clone())
	}

	fn refresh<'a>(&'a self, transport: &'a dyn Transport) -> RefreshFuture<'a> {
		self.refresh_stale(transport, self.gate.completed())
	}

	fn generation(&self) -> u64 {
		self.gate.completed()
	}

	fn refresh_stale<'a>(
		&'a self,
		transport: &'a dyn Transport,
		generation: u64,
	) -> RefreshFuture<'a> {
		Box::pin(self.gate.run(generation, move || {
			credential::observe_refresh(Self::OPERATION, self.exchange(transport))
		}))
	}
}

fn expiry_after(now: OffsetDateTime, expires_in_seconds: i64) -> Result<OffsetDateTime, ConfigError> {
	if expires_in_seconds <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn);
	}

	now.checked_add(Duration::seconds(expires_in_seconds)).ok_or(ConfigError::ExpiresInOutOfRange)
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		_preludet::{ScriptedTransport, json_response, test_signer},
		error::ApiError,
		http::FnTransport,
	};

	fn credential() -> ExchangedCredential {
		let descriptor = ApiDescriptor::apple_maps().expect("Apple Maps descriptor should build.");

		ExchangedCredential::new(test_signer(), &descriptor).expect("Credential should build.")
	}

	#[tokio::test]
	async fn exchange_stores_token_and_expiry() {
		let credential = credential();
		let transport =
			ScriptedTransport::new([(200, r#"{"accessToken":"T1","expiresInSeconds":3600}"#)]);
		let before = OffsetDateTime::now_utc();

		assert!(!credential.is_valid());
		assert_eq!(credential.retry_limit(), 2);

		credential.refresh(&transport).await.expect("Exchange should succeed.");

		let request = &transport.requests()[0];
		let expires_at = credential.expires_at().expect("Expiry should be recorded.");

		assert_eq!(request.url.as_str(), "https://maps-api.apple.com/v1/token");
		assert!(request.header("authorization").is_some_and(|value| value.starts_with("Bearer ey")));
		assert_eq!(credential.bearer().map(|bearer| bearer.expose().to_owned()).as_deref(), Some("T1"));
		assert!(credential.is_valid());
		assert!(expires_at >= before + Duration::seconds(3600));
		assert!(credential.is_valid_at(expires_at));
		assert!(!credential.is_valid_at(expires_at + Duration::seconds(1)));
	}

	#[tokio::test]
	async fn failed_exchange_reports_structured_error() {
		let credential = credential();
		let transport = ScriptedTransport::new([(
			401,
			r#"{"message":"Invalid auth token","details":["Token expired","Wrong team"]}"#,
		)]);
		let err = credential.refresh(&transport).await.expect_err("Exchange should fail.");

		assert_eq!(
			err.as_api(),
			Some(&ApiError::new(401, "Unauthorized", "Invalid auth token: Token expired, Wrong team")),
		);
		assert!(!credential.is_valid());
		assert_eq!(credential.refreshes(), 0);
	}

	#[tokio::test]
	async fn non_positive_expiry_is_rejected() {
		let credential = credential();
		let transport =
			ScriptedTransport::new([(200, r#"{"accessToken":"T1","expiresInSeconds":0}"#)]);
		let err = credential.refresh(&transport).await.expect_err("Zero expiry must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::NonPositiveExpiresIn)));
		assert!(credential.bearer().is_none());
		assert!(matches!(
			expiry_after(OffsetDateTime::now_utc(), i64::MAX),
			Err(ConfigError::ExpiresInOutOfRange)
		));
	}

	#[tokio::test]
	async fn rejections_of_the_same_bearer_exchange_once() {
		let credential = credential();
		let transport = ScriptedTransport::new([
			(200, r#"{"accessToken":"T1","expiresInSeconds":3600}"#),
			(200, r#"{"accessToken":"T2","expiresInSeconds":3600}"#),
			(200, r#"{"accessToken":"T3","expiresInSeconds":3600}"#),
		]);

		credential.refresh(&transport).await.expect("Initial exchange should succeed.");

		let seen = credential.generation();

		credential
			.refresh_stale(&transport, seen)
			.await
			.expect("First rejection of T1 should exchange.");
		credential
			.refresh_stale(&transport, seen)
			.await
			.expect("Second rejection of T1 should reuse T2.");

		assert_eq!(transport.calls(), 2);
		assert_eq!(credential.refreshes(), 2);
		assert_eq!(credential.bearer().map(|bearer| bearer.expose().to_owned()).as_deref(), Some("T2"));
	}

	#[tokio::test]
	async fn concurrent_refreshes_share_one_exchange() {
		let credential = credential();
		let exchanges = Arc::new(AtomicUsize::new(0));
		let transport = FnTransport::new({
			let exchanges = exchanges.clone();

			move |request: WireRequest| {
				let exchanges = exchanges.clone();

				async move {
					let n = exchanges.fetch_add(1, Ordering::SeqCst) + 1;

					tokio::task::yield_now().await;

					Ok::<_, Error>(json_response(
						&request,
						200,
						&format!(r#"{{"accessToken":"T{n}","expiresInSeconds":3600}}"#),
					))
				}
			}
		});
		let (first, second) = tokio::join!(credential.refresh(&transport), credential.refresh(&transport));

		first.expect("First refresh should succeed.");
		second.expect("Queued refresh should reuse the first exchange.");

		assert_eq!(exchanges.load(Ordering::SeqCst), 1);
		assert_eq!(credential.bearer().map(|bearer| bearer.expose().to_owned()).as_deref(), Some("T1"));
	}
}
