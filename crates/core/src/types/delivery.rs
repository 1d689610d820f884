//! Delivery date and time values.
//!
//! Dates are calendar dates in ISO `YYYY-MM-DD` form, so their natural order
//! is also their string order. Times are kept exactly as entered (usually
//! `HH:MM AM/PM`) and additionally parsed into a time of day for ordering.

use core::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Formats accepted when deriving a sortable time of day.
const TIME_FORMATS: &[&str] = &["%I:%M %p", "%I:%M%p", "%H:%M", "%H:%M:%S", "%I:%M:%S %p"];

/// Parse an ISO calendar date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns the chrono parse error for anything else.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
}

/// Free-text delivery time, as recorded on the docket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryTime(String);

impl DeliveryTime {
    /// Wrap a trimmed time string. Returns `None` when it is empty.
    #[must_use]
    pub fn new(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            None
        } else {
            Some(Self(s.to_owned()))
        }
    }

    /// The time as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Time of day when the text matches a known clock format.
    #[must_use]
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        let upper = self.0.to_uppercase();
        TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(&upper, fmt).ok())
    }

    /// Ordering key: parsed times order by clock value and sort after
    /// unparseable text, which falls back to plain string order.
    #[must_use]
    pub fn sort_key(&self) -> (Option<NaiveTime>, &str) {
        (self.time_of_day(), self.as_str())
    }
}

impl fmt::Display for DeliveryTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_iso_date("15/01/2024").is_err());
        assert!(parse_iso_date("").is_err());
    }

    #[test]
    fn test_empty_time_rejected() {
        assert!(DeliveryTime::new("  ").is_none());
        assert_eq!(DeliveryTime::new(" 09:30 AM ").unwrap().as_str(), "09:30 AM");
    }

    #[test]
    fn test_time_of_day_formats() {
        let t = |s: &str| DeliveryTime::new(s).unwrap().time_of_day();
        assert_eq!(t("09:30 AM"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(t("12:05 pm"), NaiveTime::from_hms_opt(12, 5, 0));
        assert_eq!(t("14:45"), NaiveTime::from_hms_opt(14, 45, 0));
        assert_eq!(t("after lunch"), None);
    }

    #[test]
    fn test_sort_key_orders_by_clock_not_text() {
        let morning = DeliveryTime::new("11:00 AM").unwrap();
        let afternoon = DeliveryTime::new("01:00 PM").unwrap();
        // "01:00 PM" < "11:00 AM" as text, but later in the day.
        assert!(afternoon.sort_key() > morning.sort_key());
    }
}
