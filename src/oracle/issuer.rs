/// Tiered receipt issuance
///
/// A strict linear fallback chain, entered fresh per request. Each tier
/// wraps exactly one narrow operation and either returns a signed receipt
/// or hands control to the next tier:
///
///   Tier 0  override-store lookup (any failure falls through, logged)
///   Tier 1  schedule computation (a calendar gap is a deliberate UNKNOWN
///           success, not a failure)
///   Tier 2  independent signing attempt of an UNKNOWN/SYSTEM receipt
///   Tier 3  unsigned CRITICAL_FAILURE: the signing subsystem is offline
///
/// The caller therefore always receives either a validly signed attestation
/// or an unmistakable unsigned failure signal, never a silent wrong answer.
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, warn};
use uuid::Uuid;

use crate::calendar::CalendarRegistry;
use crate::error::{OracleError, Result};
use crate::oracle::overrides::OverrideStore;
use crate::signing::CanonicalSigner;
use crate::time::schedule::current_status;
use crate::types::{
    CriticalFailure, MarketStatus, Receipt, StatusSource, RECEIPT_TTL_SECS, SCHEMA_VERSION,
};

/// Terminal result of an issuance request.
#[derive(Debug, Clone)]
pub enum IssueOutcome {
    Signed(Receipt),
    Unsigned(CriticalFailure),
}

pub struct ReceiptIssuer {
    calendars: Arc<CalendarRegistry>,
    overrides: Arc<dyn OverrideStore>,
    signer: Arc<CanonicalSigner>,
}

impl ReceiptIssuer {
    pub fn new(
        calendars: Arc<CalendarRegistry>,
        overrides: Arc<dyn OverrideStore>,
        signer: Arc<CanonicalSigner>,
    ) -> Self {
        ReceiptIssuer {
            calendars,
            overrides,
            signer,
        }
    }

    /// Run the fallback chain for one market at one instant.
    ///
    /// Returns Err only for the input error of an unknown MIC; that is
    /// surfaced immediately and never enters the tiers.
    pub async fn issue(&self, mic: &str, now: DateTime<Utc>) -> Result<IssueOutcome> {
        let mic = mic.to_uppercase();
        if !self.calendars.contains(&mic) {
            return Err(OracleError::UnknownMarket(mic));
        }

        // Tier 0: manual override. Unavailability must never block normal
        // schedule-based service.
        match self.override_receipt(&mic, now).await {
            Ok(Some(receipt)) => return Ok(IssueOutcome::Signed(receipt)),
            Ok(None) => {}
            Err(e) => {
                warn!(mic = %mic, error = %e, code = e.error_code(), "override tier failed");
            }
        }

        // Tier 1: schedule-based status.
        match self.schedule_receipt(&mic, now) {
            Ok(receipt) => return Ok(IssueOutcome::Signed(receipt)),
            Err(e) => {
                error!(mic = %mic, error = %e, code = e.error_code(), "schedule tier failed");
            }
        }

        // Tier 2: fail-closed safety net, a second independent signing
        // attempt. If this one fails too the signing subsystem is down.
        match self.build_and_sign(&mic, MarketStatus::Unknown, StatusSource::System, None, now) {
            Ok(receipt) => Ok(IssueOutcome::Signed(receipt)),
            Err(e) => {
                error!(mic = %mic, error = %e, code = e.error_code(), "signing subsystem offline");
                Ok(IssueOutcome::Unsigned(CriticalFailure::signing_offline()))
            }
        }
    }

    async fn override_receipt(&self, mic: &str, now: DateTime<Utc>) -> Result<Option<Receipt>> {
        let entry = match self.overrides.lookup(mic).await? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        // Expired entries are ignored entirely.
        if !entry.is_active(now) {
            return Ok(None);
        }

        self.build_and_sign(
            mic,
            entry.status,
            StatusSource::Override,
            Some(entry.reason),
            now,
        )
        .map(Some)
    }

    fn schedule_receipt(&self, mic: &str, now: DateTime<Utc>) -> Result<Receipt> {
        let market = self
            .calendars
            .get(mic)
            .ok_or_else(|| OracleError::UnknownMarket(mic.to_string()))?;

        let status = current_status(market, now)?;
        // A calendar gap is deliberate UNKNOWN, attributed to the system
        // rather than the schedule.
        let source = if status == MarketStatus::Unknown {
            StatusSource::System
        } else {
            StatusSource::Schedule
        };

        self.build_and_sign(mic, status, source, None, now)
    }

    fn build_and_sign(
        &self,
        mic: &str,
        status: MarketStatus,
        source: StatusSource,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Receipt> {
        let mut receipt = Receipt {
            receipt_id: Uuid::new_v4().to_string(),
            issued_at: now,
            expires_at: now + Duration::seconds(RECEIPT_TTL_SECS),
            mic: mic.to_string(),
            status,
            source,
            reason,
            schema_version: SCHEMA_VERSION.to_string(),
            signing_key_id: self.signer.active_key_id(now)?,
            signature: String::new(),
        };

        let signed = self.signer.sign(now, &receipt.canonical_fields())?;
        receipt.signature = signed.signature;
        Ok(receipt)
    }
}
