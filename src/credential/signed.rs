//! Credential whose bearer value is a self-issued assertion (WeatherKit style).

// self
use crate::{
	_prelude::*,
	auth::{AssertionSigner, BearerSecret},
	credential::{self, Credential, RefreshFuture, RefreshGate},
	http::Transport,
};

/// Self-issued credential: refreshing signs a new assertion locally and uses it directly.
///
/// Once a bearer has been set the credential stays valid; the assertion's own expiry is not
/// tracked; an upstream `401` is what triggers the next refresh.
#[derive(Debug)]
pub struct SignedCredential {
	signer: AssertionSigner,
	retry_limit: u32,
	bearer: RwLock<BearerSecret>,
	gate: RefreshGate,
}
impl SignedCredential {
	/// Attempts allowed per dispatch unless overridden.
	pub const DEFAULT_RETRY_LIMIT: u32 = 1;

	const OPERATION: &'static str = "credential.signed";

	/// Creates an empty (invalid) credential around `signer`.
	pub fn new(signer: AssertionSigner) -> Self {
		Self {
			signer,
			retry_limit: Self::DEFAULT_RETRY_LIMIT,
			bearer: RwLock::new(BearerSecret::default()),
			gate: RefreshGate::default(),
		}
	}

	/// Overrides the retry limit; `0` is rejected.
	pub fn with_retry_limit(mut self, limit: u32) -> Result<Self> {
		self.retry_limit = credential::validate_retry_limit(limit)?;

		Ok(self)
	}

	/// Signer used for every refresh.
	pub fn signer(&self) -> &AssertionSigner {
		&self.signer
	}

	/// Number of refreshes that completed successfully.
	pub fn refreshes(&self) -> u64 {
		self.gate.completed()
	}

	fn sign_now(&self) -> Result<()> {
		let assertion = self.signer.sign()?;

		*self.bearer.write() = assertion.token;

		Ok(())
	}
}
impl Credential for SignedCredential {
	fn is_valid(&self) -> bool {
		!self.bearer.read().is_empty()
	}

	fn retry_limit(&self) -> u32 {
		self.retry_limit
	}

	fn bearer(&self) -> Option<BearerSecret> {
		let bearer = self.bearer.read();

		(!bearer.is_empty()).then(|| bearer.clone())
	}

	fn refresh<'a>(&'a self, transport: &'a dyn Transport) -> RefreshFuture<'a> {
		self.refresh_stale(transport, self.gate.completed())
	}

	fn generation(&self) -> u64 {
		self.gate.completed()
	}

	fn refresh_stale<'a>(&'a self, _: &'a dyn Transport, generation: u64) -> RefreshFuture<'a> {
		Box::pin(self.gate.run(generation, move || {
			credential::observe_refresh(Self::OPERATION, async move { self.sign_now() })
		}))
	}
}
