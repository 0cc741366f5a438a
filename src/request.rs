//! Optimizer request bodies.
//!
//! A request names the ticker basket and the look-back window the backend
//! should estimate returns and covariances over. Dates go over the wire as
//! `YYYY-MM-DD` strings.

use chrono::{Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RequestError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ticker codes: KRX numeric codes (`005930`), US symbols (`AAPL`), share
/// classes (`BRK.B`, `BF-B`).
static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-]{0,11}$").expect("ticker code pattern"));

/// Look-back presets offered next to the date pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Range {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
}

impl Range {
    pub const ALL: [Range; 5] = [
        Range::OneMonth,
        Range::ThreeMonths,
        Range::SixMonths,
        Range::OneYear,
        Range::ThreeYears,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Range::OneMonth => "1M",
            Range::ThreeMonths => "3M",
            Range::SixMonths => "6M",
            Range::OneYear => "1Y",
            Range::ThreeYears => "3Y",
        }
    }

    pub fn months(self) -> u32 {
        match self {
            Range::OneMonth => 1,
            Range::ThreeMonths => 3,
            Range::SixMonths => 6,
            Range::OneYear => 12,
            Range::ThreeYears => 36,
        }
    }

    /// Calendar start of the window ending at `end`. Month-end days clamp,
    /// so 2024-03-31 minus 1M is 2024-02-29.
    pub fn start_for(self, end: NaiveDate) -> Option<NaiveDate> {
        end.checked_sub_months(Months::new(self.months()))
    }
}

impl FromStr for Range {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Range::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| RequestError::UnknownRange(s.to_string()))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of every optimizer call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierRequest {
    pub codes: Vec<String>,
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

impl FrontierRequest {
    /// Build a request ending `today`. The window defaults to one year; a
    /// `range` preset picks another length.
    pub fn new<S: AsRef<str>>(
        codes: &[S],
        range: Option<Range>,
        today: NaiveDate,
    ) -> Result<Self, RequestError> {
        let codes = normalize_codes(codes)?;
        let start = range
            .unwrap_or(Range::OneYear)
            .start_for(today)
            .ok_or_else(|| RequestError::InvalidDate(format_date(today)))?;
        Ok(FrontierRequest {
            codes,
            start: format_date(start),
            end: format_date(today),
            range,
        })
    }

    /// Override either end of the window with an explicit `YYYY-MM-DD` date.
    pub fn with_window(mut self, start: Option<&str>, end: Option<&str>) -> Result<Self, RequestError> {
        if let Some(start) = start {
            self.start = format_date(parse_date(start)?);
        }
        if let Some(end) = end {
            self.end = format_date(parse_date(end)?);
        }
        if parse_date(&self.start)? > parse_date(&self.end)? {
            return Err(RequestError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(self)
    }

    /// Fail before any I/O when the basket is too small for the endpoint.
    pub fn ensure_codes(&self, required: usize) -> Result<(), RequestError> {
        if self.codes.len() < required {
            return Err(RequestError::TooFewCodes {
                required,
                given: self.codes.len(),
            });
        }
        Ok(())
    }
}

/// Trim, validate and de-duplicate ticker codes, keeping first occurrences.
pub fn normalize_codes<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, RequestError> {
    let mut codes: Vec<String> = Vec::with_capacity(raw.len());
    for code in raw {
        let code = code.as_ref().trim();
        if code.is_empty() {
            continue;
        }
        if !CODE_PATTERN.is_match(code) {
            return Err(RequestError::InvalidCode(code.to_string()));
        }
        if !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }
    Ok(codes)
}

pub fn parse_date(s: &str) -> Result<NaiveDate, RequestError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| RequestError::InvalidDate(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn defaults_to_one_year_window() {
        let req = FrontierRequest::new(&["005930", "000660"], None, date("2025-06-15")).unwrap();
        assert_eq!(req.start, "2024-06-15");
        assert_eq!(req.end, "2025-06-15");
        assert_eq!(req.range, None);
    }

    #[test]
    fn range_presets_use_calendar_months() {
        let end = date("2024-03-31");
        assert_eq!(Range::OneMonth.start_for(end), Some(date("2024-02-29")));
        assert_eq!(Range::ThreeMonths.start_for(end), Some(date("2023-12-31")));
        assert_eq!(Range::SixMonths.start_for(end), Some(date("2023-09-30")));
        assert_eq!(Range::ThreeYears.start_for(end), Some(date("2021-03-31")));
    }

    #[test]
    fn range_parses_case_insensitively() {
        assert_eq!("3m".parse::<Range>().unwrap(), Range::ThreeMonths);
        assert_eq!(" 1Y ".parse::<Range>().unwrap(), Range::OneYear);
        assert_eq!(
            "2W".parse::<Range>(),
            Err(RequestError::UnknownRange("2W".to_string()))
        );
    }

    #[test]
    fn serializes_wire_body() {
        let req = FrontierRequest::new(&["AAPL", "MSFT"], Some(Range::SixMonths), date("2025-01-10"))
            .unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "codes": ["AAPL", "MSFT"],
                "start": "2024-07-10",
                "end": "2025-01-10",
                "range": "6M",
            })
        );

        let no_range = FrontierRequest::new(&["AAPL", "MSFT"], None, date("2025-01-10")).unwrap();
        assert!(serde_json::to_value(&no_range).unwrap().get("range").is_none());
    }

    #[test]
    fn explicit_dates_override_preset() {
        let req = FrontierRequest::new(&["AAPL", "MSFT"], Some(Range::OneMonth), date("2025-01-10"))
            .unwrap()
            .with_window(Some("2023-01-02"), None)
            .unwrap();
        assert_eq!(req.start, "2023-01-02");
        assert_eq!(req.end, "2025-01-10");
        assert_eq!(req.range, Some(Range::OneMonth));
    }

    #[test]
    fn rejects_inverted_window_and_bad_dates() {
        let base = FrontierRequest::new(&["AAPL", "MSFT"], None, date("2025-01-10")).unwrap();
        assert!(matches!(
            base.clone().with_window(Some("2025-02-01"), None),
            Err(RequestError::InvalidWindow { .. })
        ));
        assert_eq!(
            base.with_window(None, Some("10/01/2025")),
            Err(RequestError::InvalidDate("10/01/2025".to_string()))
        );
    }

    #[test]
    fn codes_are_trimmed_and_deduplicated() {
        let codes = normalize_codes(&[" 005930", "AAPL", "", "005930", "BRK.B"]).unwrap();
        assert_eq!(codes, vec!["005930", "AAPL", "BRK.B"]);
        assert_eq!(
            normalize_codes(&["AAPL", "MS FT"]),
            Err(RequestError::InvalidCode("MS FT".to_string()))
        );
    }

    #[test]
    fn basket_size_is_checked() {
        let req = FrontierRequest::new(&["AAPL", "AAPL"], None, date("2025-01-10")).unwrap();
        assert_eq!(
            req.ensure_codes(2),
            Err(RequestError::TooFewCodes { required: 2, given: 1 })
        );
    }
}
