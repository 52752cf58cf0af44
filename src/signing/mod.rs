pub mod canonical;
pub mod keys;
pub mod signer;

pub use canonical::{canonical_json, CANONICAL_CONTRACT};
pub use keys::KeyRing;
pub use signer::{verify, CanonicalSigner, SignedPayload};
