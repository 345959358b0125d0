use crate::shared::entity::ID;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One scheduled occurrence of a `Workshop`. `start_time` and `end_time`
/// are minutes since midnight UTC on the given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSlot {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub start_time: i64,
    pub end_time: i64,
}

impl SessionSlot {
    /// UTC timestamp in millis at which this session starts, or `None` if
    /// the ingested date fields do not form a valid date.
    pub fn start_ts_millis(&self) -> Option<i64> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .map(|d| d.and_hms(0, 0, 0).timestamp_millis() + self.start_time * 60 * 1000)
    }
}

/// One price point of a `Workshop`. Workshops scraped from organizers can
/// carry several tiers (early bird, door price, member price, ...).
/// `amount` is in minor currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    pub label: String,
    pub amount: i64,
}

/// A dance workshop as produced by the ingestion pipeline.
///
/// The storage row (and its `id`) is deleted and recreated wholesale every
/// few hours when the ingestion pipeline re-populates the collection. The
/// `slug` is derived from the workshop content and is the only identity
/// that survives those cycles, so all notification bookkeeping keys on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workshop {
    pub id: ID,
    pub slug: String,
    pub title: String,
    pub organizer_ids: Vec<ID>,
    pub sessions: Vec<SessionSlot>,
    pub prices: Vec<PriceTier>,
    pub available: bool,
    pub created: i64,
    pub updated: i64,
}

impl Workshop {
    /// Lowest amount across all price tiers.
    pub fn min_price(&self) -> Option<i64> {
        self.prices.iter().map(|p| p.amount).min()
    }

    /// Start timestamp of the earliest session at or after `now_millis`.
    /// Sessions with invalid dates are skipped.
    pub fn nearest_session_start_after(&self, now_millis: i64) -> Option<i64> {
        self.sessions
            .iter()
            .filter_map(|s| s.start_ts_millis())
            .filter(|ts| *ts >= now_millis)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(year: i32, month: u32, day: u32, start_time: i64) -> SessionSlot {
        SessionSlot {
            day,
            month,
            year,
            start_time,
            end_time: start_time + 90,
        }
    }

    fn workshop_factory() -> Workshop {
        Workshop {
            id: Default::default(),
            slug: "salsa-intensive-2021-06".into(),
            title: "Salsa Intensive".into(),
            organizer_ids: vec![Default::default()],
            sessions: vec![session(2021, 6, 12, 10 * 60), session(2021, 6, 5, 18 * 60)],
            prices: vec![
                PriceTier {
                    label: "Early bird".into(),
                    amount: 2500,
                },
                PriceTier {
                    label: "Door".into(),
                    amount: 3500,
                },
            ],
            available: true,
            created: 0,
            updated: 0,
        }
    }

    #[test]
    fn min_price_takes_cheapest_tier() {
        let w = workshop_factory();
        assert_eq!(w.min_price(), Some(2500));

        let mut w = w;
        w.prices.clear();
        assert_eq!(w.min_price(), None);
    }

    #[test]
    fn nearest_session_skips_past_sessions() {
        let w = workshop_factory();
        let first = w.sessions[1].start_ts_millis().expect("Valid date");
        let second = w.sessions[0].start_ts_millis().expect("Valid date");

        assert_eq!(w.nearest_session_start_after(0), Some(first));
        assert_eq!(w.nearest_session_start_after(first + 1), Some(second));
        assert_eq!(w.nearest_session_start_after(second + 1), None);
    }

    #[test]
    fn invalid_session_date_has_no_start() {
        let s = session(2021, 2, 30, 600);
        assert_eq!(s.start_ts_millis(), None);
    }
}
