/// Manual status overrides — circuit breakers, emergency halts
///
/// The override store is an external key-value collaborator: one entry per
/// MIC, carrying a forced status, a reason, and an expiry. An expired entry
/// is treated exactly like an absent one.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{OracleError, Result};
use crate::types::MarketStatus;
use crate::utils::timefmt;

/// Operator-supplied forced status, valid until `expires`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub status: MarketStatus,
    pub reason: String,
    #[serde(with = "timefmt::rfc3339_millis")]
    pub expires: DateTime<Utc>,
}

impl OverrideEntry {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires > now
    }
}

/// Injected lookup capability for the external override store.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    async fn lookup(&self, mic: &str) -> Result<Option<OverrideEntry>>;
}

/// In-process store, used by tests and embedded deployments.
#[derive(Default)]
pub struct MemoryOverrideStore {
    entries: RwLock<HashMap<String, OverrideEntry>>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, mic: &str, entry: OverrideEntry) {
        self.entries.write().await.insert(mic.to_string(), entry);
    }

    pub async fn clear(&self, mic: &str) {
        self.entries.write().await.remove(mic);
    }
}

#[async_trait]
impl OverrideStore for MemoryOverrideStore {
    async fn lookup(&self, mic: &str) -> Result<Option<OverrideEntry>> {
        Ok(self.entries.read().await.get(mic).cloned())
    }
}

/// File-backed store: a JSON object mapping MIC → entry, re-read on every
/// lookup so operators can edit it while the process runs. A missing file
/// means no overrides; a malformed file is a store failure.
pub struct FileOverrideStore {
    path: PathBuf,
}

impl FileOverrideStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileOverrideStore {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl OverrideStore for FileOverrideStore {
    async fn lookup(&self, mic: &str) -> Result<Option<OverrideEntry>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            OracleError::OverrideStore(format!("{}: {}", self.path.display(), e))
        })?;
        let entries: HashMap<String, OverrideEntry> = serde_json::from_str(&raw).map_err(|e| {
            OracleError::OverrideStore(format!("{}: {}", self.path.display(), e))
        })?;

        Ok(entries.get(mic).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(expires: DateTime<Utc>) -> OverrideEntry {
        OverrideEntry {
            status: MarketStatus::Halted,
            reason: "circuit breaker L1".to_string(),
            expires,
        }
    }

    #[test]
    fn test_entry_expiry_is_strict() {
        let expires = Utc.with_ymd_and_hms(2026, 3, 9, 20, 0, 0).unwrap();
        let entry = entry(expires);

        assert!(entry.is_active(expires - chrono::Duration::seconds(1)));
        assert!(!entry.is_active(expires));
        assert!(!entry.is_active(expires + chrono::Duration::hours(1)));
    }

    #[test]
    fn test_entry_parses_external_json() {
        let entry: OverrideEntry = serde_json::from_str(
            r#"{"status":"HALTED","reason":"NYSE circuit breaker L1","expires":"2026-03-09T20:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(entry.status, MarketStatus::Halted);
        assert_eq!(entry.reason, "NYSE circuit breaker L1");
        assert_eq!(
            entry.expires,
            Utc.with_ymd_and_hms(2026, 3, 9, 20, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_memory_store_set_and_clear() {
        let store = MemoryOverrideStore::new();
        let expires = Utc.with_ymd_and_hms(2026, 3, 9, 20, 0, 0).unwrap();

        assert!(store.lookup("XNYS").await.unwrap().is_none());

        store.set("XNYS", entry(expires)).await;
        let found = store.lookup("XNYS").await.unwrap().unwrap();
        assert_eq!(found.status, MarketStatus::Halted);

        store.clear("XNYS").await;
        assert!(store.lookup("XNYS").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_no_override() {
        let store = FileOverrideStore::new("/nonexistent/overrides.json");
        assert!(store.lookup("XNYS").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let path = std::env::temp_dir().join("marketproof_overrides_test.json");
        let body = r#"{"XNYS":{"status":"HALTED","reason":"test halt","expires":"2026-03-09T20:00:00Z"}}"#;
        tokio::fs::write(&path, body).await.unwrap();

        let store = FileOverrideStore::new(&path);
        let found = store.lookup("XNYS").await.unwrap().unwrap();
        assert_eq!(found.status, MarketStatus::Halted);
        assert!(store.lookup("XLON").await.unwrap().is_none());

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_malformed_file_is_store_failure() {
        let path = std::env::temp_dir().join("marketproof_overrides_malformed.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = FileOverrideStore::new(&path);
        assert!(matches!(
            store.lookup("XNYS").await,
            Err(OracleError::OverrideStore(_))
        ));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
