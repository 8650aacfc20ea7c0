//! Refresh-then-retry dispatch of calls.
//!
//! [`perform`] is the only place where a credential, a call, and a transport meet:
//!
//! 1. An invalid credential is refreshed once before anything is sent; a failed refresh aborts.
//! 2. Up to `retry_limit` attempts are made. Each prepares a fresh request from the credential
//!    and sends it.
//! 3. A `401 Unauthorized` refreshes the credential and moves on to the next attempt. The final
//!    attempt does not refresh, since no request would use the new bearer. The refresh is
//!    skipped when another dispatch already replaced the rejected bearer.
//! 4. Any other response goes to [`ApiCall::parse`] and ends the dispatch.
//! 5. When every attempt answered `401`, the dispatch fails with
//!    [`ApiError::retry_limit_exceeded`].
//!
//! Transport failures end the dispatch immediately; they are never retried here.

mod metrics;

pub use metrics::DispatchMetrics;

// self
use crate::{
	_prelude::*,
	call::ApiCall,
	credential::Credential,
	error::ApiError,
	http::Transport,
	obs::{self, CallOutcome, CallSpan},
};

/// Dispatches `call` with `credential` over `transport`.
pub async fn perform<C>(
	credential: &C::Credential,
	call: &C,
	transport: &dyn Transport,
) -> Result<C::Output>
where
	C: ApiCall,
{
	observed(credential, call, transport, None).await
}

/// Transport plus counters shared by every dispatch made through it.
#[derive(Debug)]
pub struct Dispatcher<T> {
	transport: Arc<T>,
	metrics: Arc<DispatchMetrics>,
}
impl<T> Dispatcher<T>
where
	T: Transport,
{
	/// Creates a dispatcher owning `transport`.
	pub fn new(transport: T) -> Self {
		Self::from_arc(Arc::new(transport))
	}

	/// Creates a dispatcher around an already shared transport.
	pub fn from_arc(transport: Arc<T>) -> Self {
		Self { transport, metrics: Default::default() }
	}

	/// Replaces the counters, for example to aggregate several dispatchers.
	pub fn with_metrics(mut self, metrics: Arc<DispatchMetrics>) -> Self {
		self.metrics = metrics;

		self
	}

	/// Transport used for every dispatch.
	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Counters updated by every dispatch.
	pub fn metrics(&self) -> &Arc<DispatchMetrics> {
		&self.metrics
	}

	/// Dispatches `call` with `credential`, see [`perform`].
	pub async fn perform<C>(&self, credential: &C::Credential, call: &C) -> Result<C::Output>
	where
		C: ApiCall,
	{
		observed(credential, call, self.transport.as_ref(), Some(&self.metrics)).await
	}
}
impl<T> Clone for Dispatcher<T> {
	fn clone(&self) -> Self {
		Self { transport: self.transport.clone(), metrics: self.metrics.clone() }
	}
}

async fn observed<C>(
	credential: &C::Credential,
	call: &C,
	transport: &dyn Transport,
	metrics: Option<&DispatchMetrics>,
) -> Result<C::Output>
where
	C: ApiCall,
{
	let span = CallSpan::new(C::OPERATION, "perform");
	let result = span.instrument(attempt_loop(credential, call, transport, metrics)).await;

	match &result {
		Ok(_) => {
			obs::record_call_outcome(C::OPERATION, CallOutcome::Success);

			if let Some(metrics) = metrics {
				metrics.record_success();
			}
		},
		Err(_) => {
			obs::record_call_outcome(C::OPERATION, CallOutcome::Failure);

			if let Some(metrics) = metrics {
				metrics.record_failure();
			}
		},
	}

	result
}

async fn attempt_loop<C>(
	credential: &C::Credential,
	call: &C,
	transport: &dyn Transport,
	metrics: Option<&DispatchMetrics>,
) -> Result<C::Output>
where
	C: ApiCall,
{
	if !credential.is_valid() {
		if let Some(metrics) = metrics {
			metrics.record_refresh();
		}

		credential.refresh(transport).await?;
	}

	let limit = credential.retry_limit();

	for attempt in 1..=limit {
		let generation = credential.generation();
		let request = call.prepare(credential)?;

		obs::record_call_outcome(C::OPERATION, CallOutcome::Attempt);

		if let Some(metrics) = metrics {
			metrics.record_attempt();
		}

		let response = transport.send(request).await?;

		if response.is_success() || !response.is_unauthorized() {
			return call.parse(response);
		}

		obs::record_call_outcome(C::OPERATION, CallOutcome::Unauthorized);

		if let Some(metrics) = metrics {
			metrics.record_unauthorized();
		}
		if attempt < limit {
			if let Some(metrics) = metrics {
				metrics.record_refresh();
			}

			credential.refresh_stale(transport, generation).await?;
		}
	}

	Err(ApiError::retry_limit_exceeded().into())
}
