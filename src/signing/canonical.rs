/// Canonical receipt serialization — the exact bytes that get signed
///
/// Field names sorted lexicographically, compact JSON with no extraneous
/// whitespace, UTF-8 encoded. Any byte-level deviation invalidates
/// independent verification, so this encoding is published alongside the
/// key registry.
use std::collections::BTreeMap;

use crate::error::Result;

/// Human-readable contract text served with the key registry.
pub const CANONICAL_CONTRACT: &str = "Signature covers the receipt fields (all fields except \
'signature') serialized as a JSON object with keys sorted lexicographically, no whitespace, \
UTF-8 encoded, signed with Ed25519. Signature and public key are lowercase hex.";

/// Serialize a name→value map into the canonical signing payload.
///
/// A BTreeMap iterates its keys in sorted order and serde_json emits compact
/// output, so the encoding falls directly out of the types.
pub fn canonical_json(fields: &BTreeMap<String, String>) -> Result<String> {
    Ok(serde_json::to_string(fields)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_sorted_regardless_of_insertion_order() {
        let mut fields = BTreeMap::new();
        fields.insert("status".to_string(), "OPEN".to_string());
        fields.insert("mic".to_string(), "XNYS".to_string());
        fields.insert("issued_at".to_string(), "2026-03-09T14:30:00.000Z".to_string());

        assert_eq!(
            canonical_json(&fields).unwrap(),
            r#"{"issued_at":"2026-03-09T14:30:00.000Z","mic":"XNYS","status":"OPEN"}"#
        );
    }

    #[test]
    fn test_no_whitespace_in_encoding() {
        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), "1".to_string());
        fields.insert("b".to_string(), "2".to_string());

        let encoded = canonical_json(&fields).unwrap();
        assert_eq!(encoded, r#"{"a":"1","b":"2"}"#);
        assert!(!encoded.contains(' '));
    }

    #[test]
    fn test_identical_fields_encode_identically() {
        let mut a = BTreeMap::new();
        a.insert("mic".to_string(), "XJPX".to_string());
        a.insert("status".to_string(), "CLOSED".to_string());

        let mut b = BTreeMap::new();
        b.insert("status".to_string(), "CLOSED".to_string());
        b.insert("mic".to_string(), "XJPX".to_string());

        assert_eq!(canonical_json(&a).unwrap(), canonical_json(&b).unwrap());
    }
}
