//! Bearer value wrapper that keeps credentials out of logs.

// self
use crate::_prelude::*;

/// Bearer value (signed assertion or exchanged access token) with redacted formatting.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BearerSecret(String);
impl BearerSecret {
	/// Wraps a new bearer value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw bearer value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when no bearer value has been set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for BearerSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.is_empty() {
			f.write_str("BearerSecret(<empty>)")
		} else {
			f.write_str("BearerSecret(<redacted>)")
		}
	}
}
impl Display for BearerSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
