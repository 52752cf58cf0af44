/// DST-safe conversion between absolute instants and exchange-local wall clocks
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{OracleError, Result};

/// Zone-local wall-clock fields of a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimeParts {
    pub weekday: Weekday,
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
}

impl LocalTimeParts {
    pub fn minute_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn is_weekend(&self) -> bool {
        self.weekday == Weekday::Sat || self.weekday == Weekday::Sun
    }
}

/// Resolve an IANA zone name against the embedded tz database.
pub fn zone_of(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| OracleError::InvalidTimezone(name.to_string()))
}

/// What the named zone's clock reads at `instant`, using the zone's actual
/// offset rules for that date (DST included).
pub fn wall_clock_parts(tz: Tz, instant: DateTime<Utc>) -> LocalTimeParts {
    let local = instant.with_timezone(&tz);
    LocalTimeParts {
        weekday: local.weekday(),
        date: local.date_naive(),
        hour: local.hour(),
        minute: local.minute(),
    }
}

/// Convert a zone-local wall-clock time to the absolute instant it names.
///
/// The zone's offset at the target local time is not knowable without first
/// estimating an instant to query it, so this resolves in two passes:
/// read the wall clock as if it were UTC to get a provisional instant, ask
/// the zone what its clock shows at that instant, then shift the provisional
/// instant by the signed difference between the requested and observed
/// wall clocks.
pub fn instant_of(tz: Tz, date: NaiveDate, hour: u32, minute: u32) -> Result<DateTime<Utc>> {
    let requested = date.and_hms_opt(hour, minute, 0).ok_or_else(|| {
        OracleError::InvalidWallClock(format!("{} {:02}:{:02}", date, hour, minute))
    })?;

    let provisional = Utc.from_utc_datetime(&requested);
    let observed = provisional.with_timezone(&tz).naive_local();

    Ok(provisional + (requested - observed))
}
