/// Immutable market-calendar registry
///
/// Built once at startup and shared read-only for the process lifetime.
/// A MIC missing from the registry ("unknown market") is a caller input
/// error; a year missing from a known market's holiday map ("unverified
/// calendar") is a schedule-engine concern. The two never blur.
use std::collections::HashMap;

use crate::calendar::markets::builtin_markets;
use crate::types::{ExchangeInfo, MarketConfig};

#[derive(Debug)]
pub struct CalendarRegistry {
    markets: HashMap<String, MarketConfig>,
}

impl CalendarRegistry {
    /// Registry backed by the built-in market table.
    pub fn builtin() -> Self {
        CalendarRegistry {
            markets: builtin_markets(),
        }
    }

    pub fn from_markets(markets: HashMap<String, MarketConfig>) -> Self {
        CalendarRegistry { markets }
    }

    pub fn get(&self, mic: &str) -> Option<&MarketConfig> {
        self.markets.get(mic)
    }

    pub fn contains(&self, mic: &str) -> bool {
        self.markets.contains_key(mic)
    }

    /// Sorted MIC list, as published in UNKNOWN_MIC error bodies.
    pub fn supported_mics(&self) -> Vec<String> {
        let mut mics: Vec<String> = self.markets.keys().cloned().collect();
        mics.sort();
        mics
    }

    /// Static directory for the exchanges listing, sorted by MIC.
    pub fn directory(&self) -> Vec<ExchangeInfo> {
        let mut entries: Vec<ExchangeInfo> = self
            .markets
            .iter()
            .map(|(mic, market)| ExchangeInfo {
                mic: mic.clone(),
                name: market.name.clone(),
                timezone: market.timezone.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.mic.cmp(&b.mic));
        entries
    }
}
