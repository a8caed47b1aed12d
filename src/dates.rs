//! Date handling: provider date text, caller date input, and search windows.
//!
//! Provider dates arrive in whatever shape the upstream engine felt like that
//! day (`"3 hours ago"`, `"Yesterday"`, `"07/02/2025, 05:49 PM, +0000 UTC"`,
//! `"2023-11-03 07:00:00 UTC"`, `"Nov 3, 2023"`, ...). [`parse_timestamp_at`]
//! turns any of them into a [`Timestamp`] that can be compared and sorted.
//! It never fails: text it cannot read becomes [`Timestamp::SENTINEL`], which
//! sorts before every real date and lies outside every real range.

use crate::error::SearchError;
use crate::models::DateBound;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use tracing::debug;

const START_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(0, 0, 0) {
    Some(t) => t,
    None => panic!("invalid start-of-day constant"),
};

const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999) {
    Some(t) => t,
    None => panic!("invalid end-of-day constant"),
};

/// Formats tried, in order, when nothing more specific matched.
const FALLBACK_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%d %b %Y"];

/// Formats accepted for caller-supplied range bounds.
const INPUT_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d", "%Y/%m/%d"];

static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+)\s+(minute|hour|day|week|month|year)s?\s+ago$")
        .expect("relative date pattern is valid")
});

/// A comparable point in time derived from provider date text.
///
/// Only used for filtering and ordering; articles keep their raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// The value given to unreadable dates.
    pub const SENTINEL: Timestamp = Timestamp(NaiveDateTime::MIN);

    pub fn new(dt: NaiveDateTime) -> Self {
        Timestamp(dt)
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            f.write_str("<unparsed>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Parse provider date text, with `now` anchoring relative phrases.
///
/// Accepts `&str` or `Option<&str>`; `None` yields the sentinel.
pub fn parse_timestamp_at<'a>(text: impl Into<Option<&'a str>>, now: NaiveDateTime) -> Timestamp {
    let Some(text) = text.into() else {
        return Timestamp::SENTINEL;
    };
    let text = text.trim();
    if text.is_empty() {
        return Timestamp::SENTINEL;
    }

    match parse_known_forms(text, now) {
        Some(dt) => Timestamp::new(dt),
        None => {
            debug!(date = %text, "Unrecognized date format");
            Timestamp::SENTINEL
        }
    }
}

fn parse_known_forms(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    if let Some(caps) = RELATIVE_RE.captures(text) {
        let n: i64 = caps[1].parse().ok()?;
        let delta = match caps[2].to_ascii_lowercase().as_str() {
            "minute" => Duration::try_minutes(n)?,
            "hour" => Duration::try_hours(n)?,
            "day" => Duration::try_days(n)?,
            "week" => Duration::try_weeks(n)?,
            "month" => Duration::try_days(n.checked_mul(30)?)?,
            "year" => Duration::try_days(n.checked_mul(365)?)?,
            _ => return None,
        };
        return now.checked_sub_signed(delta);
    }

    if text.to_lowercase().contains("yesterday") {
        return now.checked_sub_signed(Duration::days(1));
    }

    let has_comma = text.contains(',');
    let has_utc = text.contains("UTC");

    // "07/02/2025, 05:49 PM, +0000 UTC"
    if has_comma && has_utc {
        if let Some(dt) = parse_leading_us_date(text) {
            return Some(dt);
        }
    }

    // "2023-03-26 07:00:00 UTC"
    if has_utc && text.contains('-') {
        let cleaned = text.replace(" UTC", "");
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned.trim(), "%Y-%m-%d %H:%M:%S") {
            return Some(dt);
        }
    }

    if has_comma && !has_utc {
        if let Some(dt) = parse_leading_us_date(text) {
            return Some(dt);
        }
    }

    FALLBACK_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|d| d.and_time(START_OF_DAY))
}

/// Read `MM/DD/YYYY` from the text before the first comma.
fn parse_leading_us_date(text: &str) -> Option<NaiveDateTime> {
    let head = text.split(',').next()?.trim();
    NaiveDate::parse_from_str(head, "%m/%d/%Y")
        .ok()
        .map(|d| d.and_time(START_OF_DAY))
}

/// Parse a caller-supplied date in one of the accepted input formats.
pub fn parse_input_date(text: &str) -> Result<NaiveDate, SearchError> {
    let text = text.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| SearchError::InvalidDate(text.to_string()))
}

/// Inclusive search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Whole days from `start` 00:00 to `end` 23:59:59.999999.
    #[cfg(test)]
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.and_time(START_OF_DAY),
            end: end.and_time(END_OF_DAY),
        }
    }

    /// The sentinel never falls inside a range.
    pub fn contains(&self, ts: Timestamp) -> bool {
        !ts.is_sentinel() && (self.start..=self.end).contains(&ts.as_datetime())
    }

    /// Start bound in the provider's `MM/DD/YYYY` form.
    pub fn wire_start(&self) -> String {
        self.start.format("%m/%d/%Y").to_string()
    }

    /// End bound in the provider's `MM/DD/YYYY` form.
    pub fn wire_end(&self) -> String {
        self.end.format("%m/%d/%Y").to_string()
    }

    /// The custom-date-range `tbs` parameter.
    pub fn tbs(&self) -> String {
        format!("cdr:1,cd_min:{},cd_max:{}", self.wire_start(), self.wire_end())
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.wire_start(), self.wire_end())
    }
}

/// The window used when the caller gives no explicit range: from the 1st of
/// the month six months back, up to `now`.
pub fn default_range(now: NaiveDateTime) -> DateRange {
    let start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|first| first.checked_sub_months(Months::new(6)))
        .unwrap_or(now.date());
    DateRange {
        start: start.and_time(START_OF_DAY),
        end: now,
    }
}

/// Resolve the effective window for a request. Both bounds are needed for an
/// explicit range; otherwise [`default_range`] applies.
pub fn resolve_range(
    start: Option<&DateBound>,
    end: Option<&DateBound>,
    now: NaiveDateTime,
) -> Result<DateRange, SearchError> {
    let (Some(start), Some(end)) = (start, end) else {
        return Ok(default_range(now));
    };

    let start = match start {
        DateBound::Date(d) => d.and_time(START_OF_DAY),
        DateBound::DateTime(dt) => *dt,
        DateBound::Text(s) => parse_input_date(s)?.and_time(START_OF_DAY),
    };
    let end = match end {
        DateBound::Date(d) => d.and_time(END_OF_DAY),
        DateBound::DateTime(dt) => *dt,
        DateBound::Text(s) => parse_input_date(s)?.and_time(END_OF_DAY),
    };

    if start > end {
        return Err(SearchError::InvertedRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(DateRange { start, end })
}

/// Named date windows offered to interactive callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Monday of last week through today.
    PastWeek,
    /// First day of the previous month through today.
    PastMonth,
    /// January 1st of last year through today.
    PastYear,
    /// January 1st of this year through today.
    Ytd,
    /// Last Monday through last Sunday (the weekly digest window).
    PreviousWeek,
}

impl Preset {
    /// Start and end dates for this preset as seen on `today`.
    pub fn dates(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let weekday = i64::from(today.weekday().num_days_from_monday());
        match self {
            Preset::PastWeek => (today - Duration::days(weekday + 7), today),
            Preset::PastMonth => {
                let start = today
                    .with_day(1)
                    .and_then(|first| first.checked_sub_months(Months::new(1)))
                    .unwrap_or(today);
                (start, today)
            }
            Preset::PastYear => (
                NaiveDate::from_ymd_opt(today.year() - 1, 1, 1).unwrap_or(today),
                today,
            ),
            Preset::Ytd => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                today,
            ),
            Preset::PreviousWeek => {
                let last_sunday = today - Duration::days(weekday + 1);
                (last_sunday - Duration::days(6), last_sunday)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        at(y, m, d, 0, 0)
    }

    #[test]
    fn test_relative_units() {
        let now = at(2025, 7, 10, 12, 0);
        let cases = [
            ("5 minutes ago", Duration::minutes(5)),
            ("1 minute ago", Duration::minutes(1)),
            ("3 hours ago", Duration::hours(3)),
            ("2 days ago", Duration::days(2)),
            ("1 week ago", Duration::weeks(1)),
            ("2 months ago", Duration::days(60)),
            ("1 year ago", Duration::days(365)),
            ("4 Hours Ago", Duration::hours(4)),
            ("10 DAYS AGO", Duration::days(10)),
        ];
        for (text, delta) in cases {
            assert_eq!(
                parse_timestamp_at(text, now).as_datetime(),
                now - delta,
                "parsing {text:?}"
            );
        }
    }

    #[test]
    fn test_relative_with_huge_count_is_sentinel() {
        let now = at(2025, 7, 10, 12, 0);
        assert!(parse_timestamp_at("99999999999999 years ago", now).is_sentinel());
    }

    #[test]
    fn test_yesterday() {
        let now = at(2025, 7, 10, 12, 0);
        assert_eq!(parse_timestamp_at("Yesterday", now).as_datetime(), now - Duration::days(1));
        assert_eq!(parse_timestamp_at("yesterday", now).as_datetime(), now - Duration::days(1));
    }

    #[test]
    fn test_comma_utc_form_uses_leading_date() {
        let now = at(2025, 7, 10, 12, 0);
        let ts = parse_timestamp_at("07/02/2025, 05:49 PM, +0000 UTC", now);
        assert_eq!(ts.as_datetime(), day(2025, 7, 2));
    }

    #[test]
    fn test_iso_utc_form() {
        let now = at(2025, 7, 10, 12, 0);
        let ts = parse_timestamp_at("2023-03-26 07:00:00 UTC", now);
        assert_eq!(ts.as_datetime(), at(2023, 3, 26, 7, 0));
    }

    #[test]
    fn test_comma_without_utc() {
        let now = at(2025, 7, 10, 12, 0);
        assert_eq!(
            parse_timestamp_at("06/30/2025, 11:15 AM", now).as_datetime(),
            day(2025, 6, 30)
        );
    }

    #[test]
    fn test_fallback_formats() {
        let now = at(2025, 7, 10, 12, 0);
        assert_eq!(parse_timestamp_at("2025-01-15", now).as_datetime(), day(2025, 1, 15));
        assert_eq!(parse_timestamp_at("01/15/2025", now).as_datetime(), day(2025, 1, 15));
        assert_eq!(parse_timestamp_at("Nov 3, 2023", now).as_datetime(), day(2023, 11, 3));
        assert_eq!(parse_timestamp_at("3 Nov 2023", now).as_datetime(), day(2023, 11, 3));
        assert_eq!(parse_timestamp_at("  Mar 26, 2023  ", now).as_datetime(), day(2023, 3, 26));
    }

    #[test]
    fn test_unreadable_inputs_are_sentinel() {
        let now = at(2025, 7, 10, 12, 0);
        assert!(parse_timestamp_at("", now).is_sentinel());
        assert!(parse_timestamp_at("   ", now).is_sentinel());
        assert!(parse_timestamp_at(None, now).is_sentinel());
        assert!(parse_timestamp_at("No date available", now).is_sentinel());
        assert!(parse_timestamp_at("sometime last spring", now).is_sentinel());
        assert!(parse_timestamp_at("a few days ago", now).is_sentinel());
    }

    #[test]
    fn test_sentinel_sorts_first() {
        let now = at(2025, 7, 10, 12, 0);
        let real = parse_timestamp_at("2000-01-01", now);
        assert!(Timestamp::SENTINEL < real);
    }

    #[test]
    fn test_parse_input_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        for text in ["2025-03-09", "03/09/2025", "20250309", "2025/03/09", " 2025-03-09 "] {
            assert_eq!(parse_input_date(text).unwrap(), expected, "parsing {text:?}");
        }
        assert!(matches!(
            parse_input_date("9 March"),
            Err(SearchError::InvalidDate(ref s)) if s == "9 March"
        ));
    }

    #[test]
    fn test_default_range_is_six_months_from_first_of_month() {
        let now = at(2025, 10, 15, 9, 30);
        let range = default_range(now);
        assert_eq!(range.start, day(2025, 4, 1));
        assert_eq!(range.end, now);

        let january = at(2025, 1, 20, 9, 30);
        assert_eq!(default_range(january).start, day(2024, 7, 1));
    }

    #[test]
    fn test_resolve_range_bounds() {
        let now = at(2025, 10, 15, 9, 30);
        let start = DateBound::from("2025-01-01");
        let end = DateBound::from(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        let range = resolve_range(Some(&start), Some(&end), now).unwrap();
        assert_eq!(range.start, day(2025, 1, 1));
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap().and_time(END_OF_DAY));
        assert_eq!(range.tbs(), "cdr:1,cd_min:01/01/2025,cd_max:01/31/2025");
    }

    #[test]
    fn test_resolve_range_keeps_explicit_datetimes() {
        let now = at(2025, 10, 15, 9, 30);
        let start = DateBound::from(at(2025, 2, 1, 8, 0));
        let end = DateBound::from(at(2025, 2, 1, 18, 0));
        let range = resolve_range(Some(&start), Some(&end), now).unwrap();
        assert_eq!(range.start, at(2025, 2, 1, 8, 0));
        assert_eq!(range.end, at(2025, 2, 1, 18, 0));
    }

    #[test]
    fn test_resolve_range_with_one_bound_uses_default() {
        let now = at(2025, 10, 15, 9, 30);
        let start = DateBound::from("2025-01-01");
        assert_eq!(resolve_range(Some(&start), None, now).unwrap(), default_range(now));
    }

    #[test]
    fn test_resolve_range_errors() {
        let now = at(2025, 10, 15, 9, 30);
        let bad = DateBound::from("last tuesday");
        let good = DateBound::from("2025-01-01");
        assert!(matches!(
            resolve_range(Some(&bad), Some(&good), now),
            Err(SearchError::InvalidDate(_))
        ));

        let later = DateBound::from("2025-02-01");
        assert!(matches!(
            resolve_range(Some(&later), Some(&good), now),
            Err(SearchError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = DateRange::from_dates(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        );
        assert!(range.contains(Timestamp::new(day(2025, 1, 1))));
        assert!(range.contains(Timestamp::new(at(2025, 1, 31, 23, 59))));
        assert!(!range.contains(Timestamp::new(day(2025, 2, 1))));
        assert!(!range.contains(Timestamp::SENTINEL));
    }

    #[test]
    fn test_presets() {
        // Wednesday
        let today = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();
        let d = |y, m, dd| NaiveDate::from_ymd_opt(y, m, dd).unwrap();

        assert_eq!(Preset::PastWeek.dates(today), (d(2025, 10, 6), today));
        assert_eq!(Preset::PastMonth.dates(today), (d(2025, 9, 1), today));
        assert_eq!(Preset::PastYear.dates(today), (d(2024, 1, 1), today));
        assert_eq!(Preset::Ytd.dates(today), (d(2025, 1, 1), today));
        assert_eq!(Preset::PreviousWeek.dates(today), (d(2025, 10, 6), d(2025, 10, 12)));

        let january = d(2025, 1, 10);
        assert_eq!(Preset::PastMonth.dates(january).0, d(2024, 12, 1));
    }
}
