//! Strongly typed identifiers that go into self-issued assertions.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, dotted = $dotted:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, $dotted, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, $dotted, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (team, application, key).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (team, application, key).
		kind: &'static str,
	},
	/// The identifier contains a `.`, which would make the `{team}.{app}` header ambiguous.
	#[error("{kind} identifier cannot contain `.`.")]
	ContainsDot {
		/// Kind of identifier (team, application, key).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (team, application, key).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { TeamId, "Developer team identifier; the assertion issuer.", "Team", dotted = false }
def_id! { AppId, "Application (service) identifier; the assertion subject.", "App", dotted = true }
def_id! { KeyId, "Identifier of the private key that signs assertions.", "Key", dotted = false }

fn validate_view(kind: &'static str, dotted: bool, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if !dotted && view.contains('.') {
		return Err(IdentifierError::ContainsDot { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	#[test]
	fn identifiers_validate() {
		assert!(TeamId::new(" TEAM").is_err(), "Leading whitespace must be rejected.");
		assert!(KeyId::new("").is_err());
		assert_eq!(
			TeamId::new("team.one").expect_err("Dotted team identifiers must be rejected."),
			IdentifierError::ContainsDot { kind: "Team" },
		);

		let app = AppId::new("com.example.weather").expect("Dotted app identifiers are valid.");

		assert_eq!(app.as_ref(), "com.example.weather");
		assert_eq!(format!("{app:?}"), "App(com.example.weather)");
	}

	#[test]
	fn serde_enforces_validation() {
		let key: KeyId = serde_json::from_str("\"ABC123DEFG\"").expect("Key should deserialize.");

		assert_eq!(key.as_ref(), "ABC123DEFG");
		assert!(serde_json::from_str::<KeyId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<TeamId>("\"a.b\"").is_err());
	}

	#[test]
	fn length_limit_and_lookup() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		AppId::new(&exact).expect("Exact length should succeed.");

		assert!(AppId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)).is_err());

		let map: HashMap<TeamId, u8> =
			HashMap::from_iter([(TeamId::new("TEAM1").expect("Team should be valid."), 7_u8)]);

		assert_eq!(map.get("TEAM1"), Some(&7));
	}
}
