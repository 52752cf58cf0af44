/// Built-in market calendars
///
/// All session times are local to the exchange timezone; DST is resolved at
/// query time through the named IANA zone, never a hardcoded offset. Holiday
/// dates are local exchange dates, keyed by year. Update annually: a year
/// left out of a market's map makes every query in that year come back
/// UNKNOWN.
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::types::{EarlyClose, LunchBreak, MarketConfig};

fn holiday_set(year: i32, days: &[(u32, u32)]) -> HashSet<NaiveDate> {
    days.iter()
        .map(|&(month, day)| NaiveDate::from_ymd_opt(year, month, day).unwrap())
        .collect()
}

fn early_close(year: i32, month: u32, day: u32, close_hour: u32, close_minute: u32) -> EarlyClose {
    EarlyClose {
        date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        close_hour,
        close_minute,
    }
}

fn us_equity_holidays() -> HashMap<i32, HashSet<NaiveDate>> {
    let mut holidays = HashMap::new();
    holidays.insert(
        2026,
        holiday_set(
            2026,
            &[
                (1, 1),   // New Year's Day
                (1, 19),  // MLK Day
                (2, 16),  // Presidents' Day
                (4, 3),   // Good Friday
                (5, 25),  // Memorial Day
                (6, 19),  // Juneteenth
                (7, 3),   // Independence Day (observed)
                (9, 7),   // Labor Day
                (11, 26), // Thanksgiving
                (12, 25), // Christmas
            ],
        ),
    );
    holidays.insert(
        2027,
        holiday_set(
            2027,
            &[
                (1, 1),   // New Year's Day
                (1, 18),  // MLK Day
                (2, 15),  // Presidents' Day
                (3, 26),  // Good Friday
                (5, 31),  // Memorial Day
                (6, 18),  // Juneteenth (observed)
                (7, 5),   // Independence Day (observed)
                (9, 6),   // Labor Day
                (11, 25), // Thanksgiving
                (12, 24), // Christmas (observed)
            ],
        ),
    );
    holidays
}

fn us_equity_early_closes() -> Vec<EarlyClose> {
    vec![
        early_close(2026, 11, 27, 13, 0), // Black Friday
        early_close(2026, 12, 24, 13, 0), // Christmas Eve
        early_close(2027, 11, 26, 13, 0), // Black Friday
    ]
}

fn new_york() -> MarketConfig {
    MarketConfig {
        name: "New York Stock Exchange".to_string(),
        timezone: "America/New_York".to_string(),
        open_hour: 9,
        open_minute: 30,
        close_hour: 16,
        close_minute: 0,
        holidays: us_equity_holidays(),
        early_closes: us_equity_early_closes(),
        lunch_break: None,
    }
}

fn nasdaq() -> MarketConfig {
    MarketConfig {
        name: "NASDAQ".to_string(),
        ..new_york()
    }
}

fn london() -> MarketConfig {
    let mut holidays = HashMap::new();
    holidays.insert(
        2026,
        holiday_set(
            2026,
            &[
                (1, 1),   // New Year's Day
                (4, 3),   // Good Friday
                (4, 6),   // Easter Monday
                (5, 4),   // Early May Bank Holiday
                (5, 25),  // Spring Bank Holiday
                (8, 31),  // Summer Bank Holiday
                (12, 25), // Christmas Day
                (12, 28), // Boxing Day (observed; Dec 26 falls on Saturday)
            ],
        ),
    );
    MarketConfig {
        name: "London Stock Exchange".to_string(),
        timezone: "Europe/London".to_string(),
        open_hour: 8,
        open_minute: 0,
        close_hour: 16,
        close_minute: 30,
        holidays,
        early_closes: vec![
            early_close(2026, 12, 24, 12, 30), // Christmas Eve
            early_close(2026, 12, 31, 12, 30), // New Year's Eve
        ],
        lunch_break: None,
    }
}

fn tokyo() -> MarketConfig {
    let mut holidays = HashMap::new();
    holidays.insert(
        2026,
        holiday_set(
            2026,
            &[
                (1, 1),   // New Year's Day
                (1, 12),  // Coming of Age Day
                (2, 11),  // National Foundation Day
                (2, 23),  // Emperor's Birthday
                (3, 20),  // Vernal Equinox Day
                (4, 29),  // Showa Day
                (5, 3),   // Constitution Day
                (5, 4),   // Greenery Day
                (5, 5),   // Children's Day
                (5, 6),   // Substitute holiday
                (7, 20),  // Marine Day
                (8, 10),  // Mountain Day
                (9, 21),  // Respect for the Aged Day
                (9, 22),  // Autumnal Equinox Day
                (10, 12), // Sports Day
                (11, 3),  // Culture Day
                (11, 23), // Labour Thanksgiving Day
                (12, 31), // New Year's Eve (closed)
            ],
        ),
    );
    MarketConfig {
        name: "Japan Exchange Group (Tokyo)".to_string(),
        timezone: "Asia/Tokyo".to_string(),
        open_hour: 9,
        open_minute: 0,
        close_hour: 15,
        close_minute: 30,
        holidays,
        early_closes: Vec::new(),
        lunch_break: Some(LunchBreak {
            start_hour: 11,
            start_minute: 30,
            end_hour: 12,
            end_minute: 30,
        }),
    }
}

fn paris() -> MarketConfig {
    let mut holidays = HashMap::new();
    holidays.insert(
        2026,
        holiday_set(
            2026,
            &[
                (1, 1),   // New Year's Day
                (4, 3),   // Good Friday
                (4, 6),   // Easter Monday
                (5, 1),   // Labour Day
                (5, 14),  // Ascension Day
                (5, 25),  // Whit Monday
                (7, 14),  // Bastille Day
                (8, 15),  // Assumption of Mary
                (11, 1),  // All Saints' Day
                (11, 11), // Armistice Day
                (12, 25), // Christmas Day
                (12, 26), // Boxing Day
            ],
        ),
    );
    MarketConfig {
        name: "Euronext Paris".to_string(),
        timezone: "Europe/Paris".to_string(),
        open_hour: 9,
        open_minute: 0,
        close_hour: 17,
        close_minute: 30,
        holidays,
        early_closes: vec![
            early_close(2026, 12, 24, 14, 5), // Christmas Eve
            early_close(2026, 12, 31, 14, 5), // New Year's Eve
        ],
        lunch_break: None,
    }
}

fn hong_kong() -> MarketConfig {
    let mut holidays = HashMap::new();
    holidays.insert(
        2026,
        holiday_set(
            2026,
            &[
                (1, 1),   // New Year's Day
                (2, 17),  // Chinese New Year Day 1
                (2, 18),  // Chinese New Year Day 2
                (4, 3),   // Good Friday
                (4, 4),   // Ching Ming Festival
                (4, 6),   // Easter Monday
                (5, 1),   // Labour Day
                (5, 15),  // Buddha's Birthday
                (6, 10),  // Dragon Boat Festival
                (7, 1),   // HKSAR Establishment Day
                (10, 1),  // National Day
                (10, 29), // Chung Yeung Festival
                (12, 25), // Christmas Day
                (12, 26), // Boxing Day
            ],
        ),
    );
    MarketConfig {
        name: "Hong Kong Exchanges and Clearing".to_string(),
        timezone: "Asia/Hong_Kong".to_string(),
        open_hour: 9,
        open_minute: 30,
        close_hour: 16,
        close_minute: 0,
        holidays,
        early_closes: vec![
            early_close(2026, 2, 16, 12, 0), // CNY Eve (morning only)
        ],
        lunch_break: Some(LunchBreak {
            start_hour: 12,
            start_minute: 0,
            end_hour: 13,
            end_minute: 0,
        }),
    }
}

fn singapore() -> MarketConfig {
    let mut holidays = HashMap::new();
    holidays.insert(
        2026,
        holiday_set(
            2026,
            &[
                (1, 1),   // New Year's Day
                (2, 17),  // Chinese New Year Day 1
                (2, 18),  // Chinese New Year Day 2
                (4, 3),   // Good Friday
                (5, 1),   // Labour Day
                (6, 2),   // Hari Raya Haji
                (8, 9),   // National Day
                (11, 14), // Deepavali
                (12, 25), // Christmas Day
            ],
        ),
    );
    MarketConfig {
        name: "Singapore Exchange".to_string(),
        timezone: "Asia/Singapore".to_string(),
        open_hour: 9,
        open_minute: 0,
        close_hour: 17,
        close_minute: 0,
        holidays,
        early_closes: Vec::new(),
        lunch_break: None,
    }
}

/// The full built-in market table, keyed by MIC.
pub fn builtin_markets() -> HashMap<String, MarketConfig> {
    HashMap::from([
        ("XNYS".to_string(), new_york()),
        ("XNAS".to_string(), nasdaq()),
        ("XLON".to_string(), london()),
        ("XJPX".to_string(), tokyo()),
        ("XPAR".to_string(), paris()),
        ("XHKG".to_string(), hong_kong()),
        ("XSES".to_string(), singapore()),
    ])
}
