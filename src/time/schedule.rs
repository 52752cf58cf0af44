/// Trading-session state and next open/close lookahead
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

use crate::error::Result;
use crate::time::clock::{instant_of, wall_clock_parts, zone_of};
use crate::types::{MarketConfig, MarketStatus};

/// How many calendar days ahead the next-session walk will look.
const LOOKAHEAD_DAYS: i64 = 14;

/// Upcoming (or current) session boundaries, as absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextSession {
    pub next_open: DateTime<Utc>,
    pub next_close: DateTime<Utc>,
}

/// Schedule-derived state of a market at `now`.
///
/// UNKNOWN means the holiday calendar has no coverage for the zone-local
/// year of `now`. That check runs before everything else, weekends
/// included: without a verified calendar no other answer is trustworthy.
pub fn current_status(market: &MarketConfig, now: DateTime<Utc>) -> Result<MarketStatus> {
    let tz = zone_of(&market.timezone)?;
    let parts = wall_clock_parts(tz, now);

    let year_holidays = match market.holidays.get(&parts.date.year()) {
        Some(set) => set,
        None => return Ok(MarketStatus::Unknown),
    };

    if parts.is_weekend() {
        return Ok(MarketStatus::Closed);
    }

    if year_holidays.contains(&parts.date) {
        return Ok(MarketStatus::Closed);
    }

    let minute = parts.minute_of_day();
    let open = market.open_minutes();

    // Half days end at the early close and carry no lunch break.
    if let Some(early) = market.early_close_on(parts.date) {
        let in_session = minute >= open && minute < early.close_minutes();
        return Ok(if in_session {
            MarketStatus::Open
        } else {
            MarketStatus::Closed
        });
    }

    let mut in_session = minute >= open && minute < market.close_minutes();
    if in_session {
        if let Some(lunch) = &market.lunch_break {
            if minute >= lunch.start_minutes() && minute < lunch.end_minutes() {
                in_session = false;
            }
        }
    }

    Ok(if in_session {
        MarketStatus::Open
    } else {
        MarketStatus::Closed
    })
}

/// Walk forward from the current zone-local day to find the next session.
///
/// Returns None when no eligible day exists within the lookahead window, or
/// as soon as the walk reaches a year without holiday coverage: a candidate
/// day that cannot be checked against holidays must not be offered as a
/// session date.
pub fn next_session(market: &MarketConfig, now: DateTime<Utc>) -> Result<Option<NextSession>> {
    let tz = zone_of(&market.timezone)?;
    let start = now.with_timezone(&tz).date_naive();

    for offset in 0..LOOKAHEAD_DAYS {
        let date = start + chrono::Duration::days(offset);

        let year_holidays = match market.holidays.get(&date.year()) {
            Some(set) => set,
            None => return Ok(None),
        };

        if is_weekend(date) || year_holidays.contains(&date) {
            continue;
        }

        let (close_hour, close_minute) = match market.early_close_on(date) {
            Some(early) => (early.close_hour, early.close_minute),
            None => (market.close_hour, market.close_minute),
        };

        let open_at = instant_of(tz, date, market.open_hour, market.open_minute)?;
        let close_at = instant_of(tz, date, close_hour, close_minute)?;

        // Session already over today; keep walking.
        if close_at <= now {
            continue;
        }

        if open_at > now {
            return Ok(Some(NextSession {
                next_open: open_at,
                next_close: close_at,
            }));
        }

        // Inside today's session. During lunch the afternoon resumption is
        // the next open; otherwise the session is open right now.
        if let Some(lunch) = &market.lunch_break {
            let lunch_start = instant_of(tz, date, lunch.start_hour, lunch.start_minute)?;
            let lunch_end = instant_of(tz, date, lunch.end_hour, lunch.end_minute)?;
            if now >= lunch_start && now < lunch_end {
                return Ok(Some(NextSession {
                    next_open: lunch_end,
                    next_close: close_at,
                }));
            }
        }

        return Ok(Some(NextSession {
            next_open: now,
            next_close: close_at,
        }));
    }

    Ok(None)
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
