/// Instant formatting shared by receipts and the canonical payload
///
/// Signed field values and serialized receipt fields must be byte-identical,
/// so every instant goes through the same RFC 3339 millisecond formatter.
use chrono::{DateTime, SecondsFormat, Utc};

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

pub mod rfc3339_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_instant(*instant))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_instant(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod rfc3339_millis_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(instant: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match instant {
            Some(instant) => serializer.serialize_str(&super::format_instant(*instant)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse_instant(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_has_millisecond_precision() {
        let instant = Utc.with_ymd_and_hms(2026, 7, 4, 13, 0, 0).unwrap();
        assert_eq!(format_instant(instant), "2026-07-04T13:00:00.000Z");
    }

    #[test]
    fn test_parse_round_trip() {
        let instant = Utc.with_ymd_and_hms(2026, 11, 27, 18, 0, 5).unwrap();
        let parsed = parse_instant(&format_instant(instant)).unwrap();
        assert_eq!(parsed, instant);
    }
}
