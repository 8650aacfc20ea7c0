//! Bearer credentials: validity, retry budget, and refresh.
//!
//! A [`Credential`] is shared by every call made against one API family. Its state is mutated in
//! place by [`Credential::refresh`], which is single-flight: concurrent callers queue on one
//! async lock, and a caller that queued behind a refresh which completed while it waited reuses
//! that result instead of minting another bearer value.
//!
//! Dispatches read [`Credential::generation`] before they read the bearer and hand it back to
//! [`Credential::refresh_stale`] after a `401`. Two dispatches rejected for the same bearer then
//! cause one refresh, even when their refreshes do not overlap.

pub mod exchanged;
pub mod signed;

pub use exchanged::*;
pub use signed::*;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::BearerSecret,
	error::ConfigError,
	http::Transport,
	obs::{self, CallOutcome, CallSpan},
};

/// Boxed future returned by [`Credential::refresh`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Bearer credential for one external API family.
pub trait Credential
where
	Self: Send + Sync,
{
	/// Returns `true` while the credential holds a usable bearer value.
	fn is_valid(&self) -> bool;

	/// Maximum number of send attempts per dispatch.
	fn retry_limit(&self) -> u32;

	/// Current bearer value, if one has been obtained.
	fn bearer(&self) -> Option<BearerSecret>;

	/// Obtains a new bearer value and stores it in place.
	///
	/// Self-issued variants ignore `transport`; exchanged variants use it to reach their
	/// authority.
	fn refresh<'a>(&'a self, transport: &'a dyn Transport) -> RefreshFuture<'a>;

	/// Number of refreshes completed so far.
	///
	/// Credentials that do not track refreshes report `0`.
	fn generation(&self) -> u64 {
		0
	}

	/// Refreshes unless a refresh completed after `generation` was read.
	///
	/// The default always refreshes.
	fn refresh_stale<'a>(
		&'a self,
		transport: &'a dyn Transport,
		generation: u64,
	) -> RefreshFuture<'a> {
		let _ = generation;

		self.refresh(transport)
	}
}

/// Serializes refreshes of one credential and lets queued callers piggy-back on the refresh
/// that completed while they waited.
#[derive(Debug, Default)]
pub(crate) struct RefreshGate {
	lock: AsyncMutex<()>,
	generation: AtomicU64,
}
impl RefreshGate {
	/// Runs `refresh` unless a refresh completed after `observed` was read.
	///
	/// `refresh` is only invoked by the caller that holds the lock with an up-to-date generation.
	pub(crate) async fn run<F, Fut>(&self, observed: u64, refresh: F) -> Result<()>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<()>>,
	{
		let _singleflight = self.lock.lock().await;

		if self.generation.load(Ordering::Acquire) != observed {
			return Ok(());
		}

		refresh().await?;
		self.generation.fetch_add(1, Ordering::AcqRel);

		Ok(())
	}

	/// Number of refreshes that completed successfully.
	pub(crate) fn completed(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}
}

/// Runs `refresh` inside a `refresh` span and records its outcome under `operation`.
///
/// Call it from inside [`RefreshGate::run`] so refreshes skipped by the gate are not recorded.
pub(crate) async fn observe_refresh<Fut>(operation: &'static str, refresh: Fut) -> Result<()>
where
	Fut: Future<Output = Result<()>>,
{
	let span = CallSpan::new(operation, "refresh");

	obs::record_call_outcome(operation, CallOutcome::Attempt);

	let result = span.instrument(refresh).await;

	match &result {
		Ok(_) => obs::record_call_outcome(operation, CallOutcome::Success),
		Err(_) => obs::record_call_outcome(operation, CallOutcome::Failure),
	}

	result
}

pub(crate) fn validate_retry_limit(limit: u32) -> Result<u32, ConfigError> {
	if limit == 0 { Err(ConfigError::ZeroRetryLimit) } else { Ok(limit) }
}
