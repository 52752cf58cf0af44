/// Ed25519 signing over the canonical payload
///
/// Ed25519 per RFC 8032 is deterministic: identical canonical bytes always
/// produce an identical signature, and no caller-supplied nonce exists to
/// get wrong.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer as _, Verifier as _, VerifyingKey};

use crate::error::{OracleError, Result};
use crate::signing::canonical::canonical_json;
use crate::signing::keys::KeyRing;
use crate::types::{SigningKeyConfig, SigningKeyInfo};

/// Outcome of a signing call: which key signed, and the hex signature.
#[derive(Debug, Clone)]
pub struct SignedPayload {
    pub key_id: String,
    pub signature: String,
}

pub struct CanonicalSigner {
    ring: KeyRing,
}

impl CanonicalSigner {
    pub fn new(ring: KeyRing) -> Self {
        CanonicalSigner { ring }
    }

    pub fn from_config(configs: &[SigningKeyConfig]) -> Result<Self> {
        Ok(CanonicalSigner::new(KeyRing::from_config(configs)?))
    }

    /// Key id that would sign at `now`. Receipts embed this before signing,
    /// so the id itself is covered by the signature.
    pub fn active_key_id(&self, now: DateTime<Utc>) -> Result<String> {
        Ok(self.ring.active(now)?.info.key_id.clone())
    }

    /// Canonically serialize `fields` and sign with the key active at `now`.
    pub fn sign(&self, now: DateTime<Utc>, fields: &BTreeMap<String, String>) -> Result<SignedPayload> {
        let entry = self.ring.active(now)?;
        let payload = canonical_json(fields)?;
        let signature = entry.secret.sign(payload.as_bytes());

        Ok(SignedPayload {
            key_id: entry.info.key_id.clone(),
            signature: hex::encode(signature.to_bytes()),
        })
    }

    pub fn registry(&self) -> Vec<SigningKeyInfo> {
        self.ring.registry()
    }

    pub fn public_key_hex(&self, key_id: &str) -> Option<String> {
        self.ring.public_key_hex(key_id)
    }
}

/// Verify a hex signature over `message` against a published hex public key.
pub fn verify(public_key_hex: &str, message: &[u8], signature_hex: &str) -> Result<()> {
    let key_bytes: [u8; 32] = hex::decode(public_key_hex)
        .map_err(|e| OracleError::InvalidKeyMaterial(e.to_string()))?
        .try_into()
        .map_err(|_| OracleError::InvalidKeyMaterial("public key must be 32 bytes".to_string()))?;
    let key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| OracleError::InvalidKeyMaterial(e.to_string()))?;

    let sig_bytes = hex::decode(signature_hex)
        .map_err(|e| OracleError::VerificationFailed(e.to_string()))?;
    let signature = Signature::from_slice(&sig_bytes)
        .map_err(|e| OracleError::VerificationFailed(e.to_string()))?;

    key.verify(message, &signature)
        .map_err(|e| OracleError::VerificationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SEED_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    fn signer() -> CanonicalSigner {
        CanonicalSigner::from_config(&[SigningKeyConfig {
            key_id: "key_2026_v1".to_string(),
            secret_seed_hex: SEED_HEX.to_string(),
            valid_from: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            valid_until: None,
        }])
        .unwrap()
    }

    fn fields() -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("mic".to_string(), "XNYS".to_string());
        fields.insert("status".to_string(), "OPEN".to_string());
        fields.insert("source".to_string(), "SCHEDULE".to_string());
        fields
    }

    #[test]
    fn test_repeated_signing_is_idempotent() {
        let signer = signer();
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 14, 30, 0).unwrap();

        let first = signer.sign(now, &fields()).unwrap();
        let second = signer.sign(now, &fields()).unwrap();
        assert_eq!(first.signature, second.signature);
        assert_eq!(first.key_id, "key_2026_v1");
    }

    #[test]
    fn test_signature_verifies_against_published_key() {
        let signer = signer();
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 14, 30, 0).unwrap();

        let signed = signer.sign(now, &fields()).unwrap();
        let payload = canonical_json(&fields()).unwrap();
        let public_key = signer.public_key_hex(&signed.key_id).unwrap();

        assert!(verify(&public_key, payload.as_bytes(), &signed.signature).is_ok());
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let signer = signer();
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 14, 30, 0).unwrap();

        let signed = signer.sign(now, &fields()).unwrap();
        let public_key = signer.public_key_hex(&signed.key_id).unwrap();

        let mut tampered = fields();
        tampered.insert("status".to_string(), "CLOSED".to_string());
        let payload = canonical_json(&tampered).unwrap();

        assert!(matches!(
            verify(&public_key, payload.as_bytes(), &signed.signature),
            Err(OracleError::VerificationFailed(_))
        ));
    }

    #[test]
    fn test_signing_before_key_validity_fails() {
        let signer = signer();
        let before = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 0).unwrap();
        assert!(matches!(
            signer.sign(before, &fields()),
            Err(OracleError::NoActiveSigningKey(_))
        ));
    }
}
