/// Signing key ring with rotation windows
///
/// Several keys may be valid at once during a rotation window. Signing uses
/// the valid key with the most recent valid_from; every configured key stays
/// published in the registry so consumers can verify older receipts by
/// signing_key_id.
use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;

use crate::error::{OracleError, Result};
use crate::types::{SigningKeyConfig, SigningKeyInfo};
use crate::utils::timefmt::format_instant;

pub(crate) struct KeyEntry {
    pub info: SigningKeyInfo,
    pub secret: SigningKey,
}

pub struct KeyRing {
    keys: Vec<KeyEntry>,
}

impl KeyRing {
    /// Build the ring from configured seeds, deriving each public key.
    pub fn from_config(configs: &[SigningKeyConfig]) -> Result<Self> {
        let mut keys = Vec::with_capacity(configs.len());

        for config in configs {
            if keys
                .iter()
                .any(|k: &KeyEntry| k.info.key_id == config.key_id)
            {
                return Err(OracleError::ConfigError(format!(
                    "Duplicate signing key id: {}",
                    config.key_id
                )));
            }
            if let Some(until) = config.valid_until {
                if until <= config.valid_from {
                    return Err(OracleError::ConfigError(format!(
                        "Signing key {} expires before it becomes valid",
                        config.key_id
                    )));
                }
            }

            let secret = decode_seed(&config.key_id, &config.secret_seed_hex)?;
            let public_key = hex::encode(secret.verifying_key().to_bytes());

            keys.push(KeyEntry {
                info: SigningKeyInfo {
                    key_id: config.key_id.clone(),
                    algorithm: "Ed25519".to_string(),
                    format: "hex".to_string(),
                    public_key,
                    valid_from: config.valid_from,
                    valid_until: config.valid_until,
                },
                secret,
            });
        }

        Ok(KeyRing { keys })
    }

    /// The key that signs at `now`: valid, with the latest valid_from.
    pub(crate) fn active(&self, now: DateTime<Utc>) -> Result<&KeyEntry> {
        self.keys
            .iter()
            .filter(|k| k.info.is_valid_at(now))
            .max_by_key(|k| k.info.valid_from)
            .ok_or_else(|| OracleError::NoActiveSigningKey(format_instant(now)))
    }

    /// Published registry entries, in configuration order.
    pub fn registry(&self) -> Vec<SigningKeyInfo> {
        self.keys.iter().map(|k| k.info.clone()).collect()
    }

    pub fn public_key_hex(&self, key_id: &str) -> Option<String> {
        self.keys
            .iter()
            .find(|k| k.info.key_id == key_id)
            .map(|k| k.info.public_key.clone())
    }
}

fn decode_seed(key_id: &str, seed_hex: &str) -> Result<SigningKey> {
    let bytes = hex::decode(seed_hex)
        .map_err(|e| OracleError::InvalidKeyMaterial(format!("{}: {}", key_id, e)))?;
    let seed: [u8; 32] = bytes.try_into().map_err(|_| {
        OracleError::InvalidKeyMaterial(format!("{}: seed must be 32 bytes", key_id))
    })?;
    Ok(SigningKey::from_bytes(&seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // RFC 8032 test vector 1
    const SEED_HEX: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const PUBLIC_HEX: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const SEED_HEX_2: &str = "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb";

    fn key_config(
        key_id: &str,
        seed: &str,
        valid_from: DateTime<Utc>,
        valid_until: Option<DateTime<Utc>>,
    ) -> SigningKeyConfig {
        SigningKeyConfig {
            key_id: key_id.to_string(),
            secret_seed_hex: seed.to_string(),
            valid_from,
            valid_until,
        }
    }

    #[test]
    fn test_public_key_derived_from_seed() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let ring = KeyRing::from_config(&[key_config("key_2026_v1", SEED_HEX, from, None)]).unwrap();

        assert_eq!(ring.public_key_hex("key_2026_v1").unwrap(), PUBLIC_HEX);
        assert_eq!(ring.registry()[0].algorithm, "Ed25519");
    }

    #[test]
    fn test_rotation_window_prefers_newest_key() {
        let v1_from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let v2_from = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let v1_until = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();

        let ring = KeyRing::from_config(&[
            key_config("key_2026_v1", SEED_HEX, v1_from, Some(v1_until)),
            key_config("key_2026_v2", SEED_HEX_2, v2_from, None),
        ])
        .unwrap();

        // Before rotation starts only v1 is valid.
        let early = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(ring.active(early).unwrap().info.key_id, "key_2026_v1");

        // During the overlap both are valid; the newer one signs.
        let overlap = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(ring.active(overlap).unwrap().info.key_id, "key_2026_v2");

        // Both stay published.
        assert_eq!(ring.registry().len(), 2);
    }

    #[test]
    fn test_no_valid_key_is_an_error() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let ring =
            KeyRing::from_config(&[key_config("key_2026_v1", SEED_HEX, from, Some(until))]).unwrap();

        let later = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            ring.active(later),
            Err(OracleError::NoActiveSigningKey(_))
        ));
    }

    #[test]
    fn test_bad_seed_material_rejected() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            KeyRing::from_config(&[key_config("short", "abcd", from, None)]),
            Err(OracleError::InvalidKeyMaterial(_))
        ));
        assert!(matches!(
            KeyRing::from_config(&[key_config("junk", "zz", from, None)]),
            Err(OracleError::InvalidKeyMaterial(_))
        ));
    }

    #[test]
    fn test_duplicate_key_id_rejected() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let result = KeyRing::from_config(&[
            key_config("key_2026_v1", SEED_HEX, from, None),
            key_config("key_2026_v1", SEED_HEX_2, from, None),
        ]);
        assert!(matches!(result, Err(OracleError::ConfigError(_))));
    }

    #[test]
    fn test_inverted_validity_window_rejected() {
        let from = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let result = KeyRing::from_config(&[key_config("key", SEED_HEX, from, Some(until))]);
        assert!(matches!(result, Err(OracleError::ConfigError(_))));
    }
}
