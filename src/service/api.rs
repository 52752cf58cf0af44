/// Typed endpoint handlers for the public oracle surface
///
/// HTTP routing, CORS, and header plumbing belong to the external adapter;
/// this layer owns the response shapes, the error bodies, and the wiring of
/// the issuer, schedule engine, and key registry behind the endpoints.
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::CalendarRegistry;
use crate::error::OracleError;
use crate::oracle::{IssueOutcome, ReceiptIssuer};
use crate::signing::{CanonicalSigner, CANONICAL_CONTRACT};
use crate::time::schedule::{current_status, next_session};
use crate::types::{
    CriticalFailure, ExchangeInfo, MarketStatus, Receipt, SigningKeyInfo, StatusSource,
    RECEIPT_TTL_SECS, SCHEMA_VERSION,
};
use crate::utils::timefmt::{self, format_instant};

/// Machine-readable error body, paired with the HTTP status an adapter
/// should send.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MarketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<StatusSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported: Option<Vec<String>>,
    #[serde(skip)]
    pub http_status: u16,
}

impl ApiError {
    fn unknown_mic(mic: &str, supported: Vec<String>) -> Self {
        ApiError {
            error: "UNKNOWN_MIC".to_string(),
            message: Some(format!(
                "Unsupported exchange: {mic}. See the exchange directory for supported markets."
            )),
            status: None,
            source: None,
            supported: Some(supported),
            http_status: 400,
        }
    }

    fn critical(message: String) -> Self {
        ApiError {
            error: "CRITICAL_FAILURE".to_string(),
            message: Some(message),
            status: Some(MarketStatus::Unknown),
            source: Some(StatusSource::System),
            supported: None,
            http_status: 500,
        }
    }
}

impl From<CriticalFailure> for ApiError {
    fn from(failure: CriticalFailure) -> Self {
        ApiError {
            error: failure.error,
            message: Some(failure.message),
            status: Some(failure.status),
            source: Some(failure.source),
            supported: None,
            http_status: 500,
        }
    }
}

impl From<OracleError> for ApiError {
    fn from(err: OracleError) -> Self {
        ApiError {
            error: err.error_code().to_string(),
            message: Some(err.to_string()),
            status: None,
            source: None,
            supported: None,
            http_status: err.http_status(),
        }
    }
}

/// Unsigned, informational schedule view of one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub mic: String,
    pub name: String,
    pub timezone: String,
    #[serde(with = "timefmt::rfc3339_millis")]
    pub queried_at: DateTime<Utc>,
    pub current_status: MarketStatus,
    #[serde(with = "timefmt::rfc3339_millis_opt")]
    pub next_open: Option<DateTime<Utc>>,
    #[serde(with = "timefmt::rfc3339_millis_opt")]
    pub next_close: Option<DateTime<Utc>>,
    pub lunch_break: Option<LunchBreakInfo>,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LunchBreakInfo {
    pub start: String,
    pub end: String,
}

const SCHEDULE_NOTE: &str =
    "Times are UTC. Schedule-based only — does not reflect real-time halts or overrides.";

#[derive(Debug, Clone, Serialize)]
pub struct ExchangesResponse {
    pub exchanges: Vec<ExchangeInfo>,
}

/// Key registry plus the canonical-serialization contract, everything a
/// consumer needs to verify receipts independently.
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<SigningKeyInfo>,
    pub canonical_encoding: String,
}

/// Signed liveness attestation. Proves the signing subsystem works,
/// independently of any market's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReceipt {
    pub receipt_id: String,
    #[serde(with = "timefmt::rfc3339_millis")]
    pub issued_at: DateTime<Utc>,
    #[serde(with = "timefmt::rfc3339_millis")]
    pub expires_at: DateTime<Utc>,
    pub status: String,
    pub scope: String,
    pub schema_version: String,
    pub signing_key_id: String,
    pub signature: String,
}

impl HealthReceipt {
    pub fn canonical_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert("receipt_id".to_string(), self.receipt_id.clone());
        fields.insert("issued_at".to_string(), format_instant(self.issued_at));
        fields.insert("expires_at".to_string(), format_instant(self.expires_at));
        fields.insert("status".to_string(), self.status.clone());
        fields.insert("scope".to_string(), self.scope.clone());
        fields.insert("schema_version".to_string(), self.schema_version.clone());
        fields.insert("signing_key_id".to_string(), self.signing_key_id.clone());
        fields
    }
}

pub struct OracleService {
    calendars: Arc<CalendarRegistry>,
    issuer: Arc<ReceiptIssuer>,
    signer: Arc<CanonicalSigner>,
}

impl OracleService {
    pub fn new(
        calendars: Arc<CalendarRegistry>,
        issuer: Arc<ReceiptIssuer>,
        signer: Arc<CanonicalSigner>,
    ) -> Self {
        OracleService {
            calendars,
            issuer,
            signer,
        }
    }

    /// Signed market status. Powers both the authenticated and the public
    /// demo endpoints; the adapter handles auth and the default MIC.
    pub async fn status(&self, mic: &str, now: DateTime<Utc>) -> Result<Receipt, ApiError> {
        match self.issuer.issue(mic, now).await {
            Ok(IssueOutcome::Signed(receipt)) => Ok(receipt),
            Ok(IssueOutcome::Unsigned(failure)) => Err(failure.into()),
            Err(OracleError::UnknownMarket(mic)) => {
                Err(ApiError::unknown_mic(&mic, self.calendars.supported_mics()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Unsigned schedule lookup: current status plus the next session
    /// boundaries, informational only.
    pub fn schedule(&self, mic: &str, now: DateTime<Utc>) -> Result<ScheduleResponse, ApiError> {
        let mic = mic.to_uppercase();
        let market = self
            .calendars
            .get(&mic)
            .ok_or_else(|| ApiError::unknown_mic(&mic, self.calendars.supported_mics()))?;

        let status = current_status(market, now)
            .map_err(|e| ApiError::critical(format!("Schedule computation failed: {e}")))?;
        let next = next_session(market, now)
            .map_err(|e| ApiError::critical(format!("Schedule computation failed: {e}")))?;

        Ok(ScheduleResponse {
            mic,
            name: market.name.clone(),
            timezone: market.timezone.clone(),
            queried_at: now,
            current_status: status,
            next_open: next.map(|n| n.next_open),
            next_close: next.map(|n| n.next_close),
            lunch_break: market.lunch_break.as_ref().map(|lunch| LunchBreakInfo {
                start: lunch.start_label(),
                end: lunch.end_label(),
            }),
            note: SCHEDULE_NOTE.to_string(),
        })
    }

    pub fn exchanges(&self) -> ExchangesResponse {
        ExchangesResponse {
            exchanges: self.calendars.directory(),
        }
    }

    pub fn keys(&self) -> KeysResponse {
        KeysResponse {
            keys: self.signer.registry(),
            canonical_encoding: CANONICAL_CONTRACT.to_string(),
        }
    }

    /// Signed liveness probe. A failure here means the signing subsystem is
    /// offline — the one condition callers must treat as "halt everything."
    pub async fn health(&self, now: DateTime<Utc>) -> Result<HealthReceipt, ApiError> {
        let key_id = match self.signer.active_key_id(now) {
            Ok(key_id) => key_id,
            Err(_) => return Err(CriticalFailure::signing_offline().into()),
        };

        let mut receipt = HealthReceipt {
            receipt_id: Uuid::new_v4().to_string(),
            issued_at: now,
            expires_at: now + Duration::seconds(RECEIPT_TTL_SECS),
            status: "OK".to_string(),
            scope: "liveness".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            signing_key_id: key_id,
            signature: String::new(),
        };

        match self.signer.sign(now, &receipt.canonical_fields()) {
            Ok(signed) => {
                receipt.signature = signed.signature;
                Ok(receipt)
            }
            Err(_) => Err(CriticalFailure::signing_offline().into()),
        }
    }
}
