//! Optional observability helpers for dispatches and credential refreshes.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `bearer_broker.call` with the `operation`
//!   (call or credential label) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `bearer_broker_call_total` counter for every
//!   attempt/success/unauthorized/failure, labeled by `operation` + `outcome`.
//!
//! Neither feature makes the crate log on its own; both compile to no-ops when disabled.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each dispatch or refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// A request attempt (or refresh) is about to start.
	Attempt,
	/// Upstream answered `401 Unauthorized`.
	Unauthorized,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Unauthorized => "unauthorized",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
