/// Core type definitions for the market status oracle
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::timefmt::{self, format_instant};

/// Fixed receipt validity window. Consumers must re-query after this.
pub const RECEIPT_TTL_SECS: i64 = 60;

/// Version tag embedded in every signed payload.
pub const SCHEMA_VERSION: &str = "v5.0-beta";

/// Market trading state carried in receipts.
///
/// HALTED is never derived from the schedule; it can only arrive via a
/// manual override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Open,
    Closed,
    Halted,
    Unknown,
}

impl MarketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketStatus::Open => "OPEN",
            MarketStatus::Closed => "CLOSED",
            MarketStatus::Halted => "HALTED",
            MarketStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Where a receipt's status came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusSource {
    Schedule,
    Override,
    System,
}

impl StatusSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusSource::Schedule => "SCHEDULE",
            StatusSource::Override => "OVERRIDE",
            StatusSource::System => "SYSTEM",
        }
    }
}

/// Early close overriding the regular close for a single date.
#[derive(Debug, Clone)]
pub struct EarlyClose {
    pub date: NaiveDate,
    pub close_hour: u32,
    pub close_minute: u32,
}

impl EarlyClose {
    pub fn close_minutes(&self) -> u32 {
        self.close_hour * 60 + self.close_minute
    }
}

/// Daily intraday break during which the market is not in session.
#[derive(Debug, Clone)]
pub struct LunchBreak {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

impl LunchBreak {
    pub fn start_minutes(&self) -> u32 {
        self.start_hour * 60 + self.start_minute
    }

    pub fn end_minutes(&self) -> u32 {
        self.end_hour * 60 + self.end_minute
    }

    pub fn start_label(&self) -> String {
        format!("{:02}:{:02}", self.start_hour, self.start_minute)
    }

    pub fn end_label(&self) -> String {
        format!("{:02}:{:02}", self.end_hour, self.end_minute)
    }
}

/// Per-market trading calendar, immutable after startup.
///
/// All wall-clock fields are local to `timezone`. Holiday dates are keyed by
/// year; a year missing from the map means the calendar is unverified for
/// that year, not that it has no holidays.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub name: String,
    pub timezone: String,
    pub open_hour: u32,
    pub open_minute: u32,
    pub close_hour: u32,
    pub close_minute: u32,
    pub holidays: HashMap<i32, HashSet<NaiveDate>>,
    pub early_closes: Vec<EarlyClose>,
    pub lunch_break: Option<LunchBreak>,
}

impl MarketConfig {
    pub fn open_minutes(&self) -> u32 {
        self.open_hour * 60 + self.open_minute
    }

    pub fn close_minutes(&self) -> u32 {
        self.close_hour * 60 + self.close_minute
    }

    pub fn early_close_on(&self, date: NaiveDate) -> Option<&EarlyClose> {
        self.early_closes.iter().find(|e| e.date == date)
    }
}

/// Directory entry for the supported-exchanges listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeInfo {
    pub mic: String,
    pub name: String,
    pub timezone: String,
}

/// Signed market-status attestation.
///
/// Everything except `signature` is covered by the signature; the serialized
/// field values are byte-identical to the signed canonical payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: String,
    #[serde(with = "timefmt::rfc3339_millis")]
    pub issued_at: DateTime<Utc>,
    #[serde(with = "timefmt::rfc3339_millis")]
    pub expires_at: DateTime<Utc>,
    pub mic: String,
    pub status: MarketStatus,
    pub source: StatusSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub schema_version: String,
    pub signing_key_id: String,
    pub signature: String,
}

impl Receipt {
    /// The name→value map that gets canonically serialized and signed.
    pub fn canonical_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("receipt_id".to_string(), self.receipt_id.clone());
        fields.insert("issued_at".to_string(), format_instant(self.issued_at));
        fields.insert("expires_at".to_string(), format_instant(self.expires_at));
        fields.insert("mic".to_string(), self.mic.clone());
        fields.insert("status".to_string(), self.status.as_str().to_string());
        fields.insert("source".to_string(), self.source.as_str().to_string());
        if let Some(reason) = &self.reason {
            fields.insert("reason".to_string(), reason.clone());
        }
        fields.insert("schema_version".to_string(), self.schema_version.clone());
        fields.insert("signing_key_id".to_string(), self.signing_key_id.clone());
        fields
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Unsigned terminal failure: the signing subsystem itself is down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalFailure {
    pub error: String,
    pub message: String,
    pub status: MarketStatus,
    pub source: StatusSource,
}

impl CriticalFailure {
    pub fn signing_offline() -> Self {
        CriticalFailure {
            error: "CRITICAL_FAILURE".to_string(),
            message: "Oracle signature system offline. Treat as UNKNOWN. Halt all execution."
                .to_string(),
            status: MarketStatus::Unknown,
            source: StatusSource::System,
        }
    }
}

/// Published signing-key record for the key registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningKeyInfo {
    pub key_id: String,
    pub algorithm: String,
    pub format: String,
    pub public_key: String,
    #[serde(with = "timefmt::rfc3339_millis")]
    pub valid_from: DateTime<Utc>,
    /// None means no rotation scheduled.
    #[serde(default, with = "timefmt::rfc3339_millis_opt")]
    pub valid_until: Option<DateTime<Utc>>,
}

impl SigningKeyInfo {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if now < self.valid_from {
            return false;
        }
        match self.valid_until {
            Some(until) => now < until,
            None => true,
        }
    }
}

/// One configured signing key. The public key is derived from the seed.
#[derive(Debug, Clone, Deserialize)]
pub struct SigningKeyConfig {
    pub key_id: String,
    pub secret_seed_hex: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
}

/// Process configuration, loaded once from TOML at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_overrides_path")]
    pub overrides_path: String,
    pub master_api_key: String,
    #[serde(default)]
    pub beta_api_keys: Vec<String>,
    pub signing_keys: Vec<SigningKeyConfig>,
}

fn default_overrides_path() -> String {
    "data/overrides.json".to_string()
}
