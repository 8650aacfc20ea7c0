//! Assertion identities, bearer secrets, and the ES256 signer.

pub mod assertion;
pub mod id;
pub mod secret;

pub use assertion::*;
pub use id::*;
pub use secret::*;
