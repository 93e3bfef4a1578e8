//! Normalization of free-text invoice dates.
//!
//! OCR output is the biggest source of malformed dates. The normalizer tries
//! the canonical ISO shape, then a fixed list of separator-based and
//! concatenated formats, and finally a digit-only fallback that recovers
//! lost separators. Every attempt is strict: out-of-range components reject
//! the attempt instead of rolling over into the next month or year.

use chrono::{Datelike, Local, NaiveDate};
use thiserror::Error;
use tracing::trace;

use super::types::PeriodKey;

/// Why a date string could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// The input was empty or whitespace only.
    #[error("date is empty")]
    Empty,
    /// The input looks like `YYYY-MM-DD` but is not a real calendar date.
    #[error("'{0}' is not a valid calendar date")]
    OutOfRange(String),
    /// No known date shape matched.
    #[error("unrecognized date '{0}'")]
    Unrecognized(String),
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Day,
    Month,
    Year4,
    Year2,
    Sep(u8),
}

use Token::{Day, Month, Sep, Year2, Year4};

/// An explicit date pattern, e.g. `dd.MM.yyyy`.
struct DateFormat {
    tokens: &'static [Token],
    /// Concatenated formats require fixed two-digit day and month fields.
    compact: bool,
}

/// Explicit formats in priority order.
const FORMATS: &[DateFormat] = &[
    // dd.MM.yyyy, dd/MM/yyyy, dd-MM-yyyy
    DateFormat { tokens: &[Day, Sep(b'.'), Month, Sep(b'.'), Year4], compact: false },
    DateFormat { tokens: &[Day, Sep(b'/'), Month, Sep(b'/'), Year4], compact: false },
    DateFormat { tokens: &[Day, Sep(b'-'), Month, Sep(b'-'), Year4], compact: false },
    // yyyy.MM.dd, yyyy/MM/dd, yyyy-MM-dd
    DateFormat { tokens: &[Year4, Sep(b'.'), Month, Sep(b'.'), Day], compact: false },
    DateFormat { tokens: &[Year4, Sep(b'/'), Month, Sep(b'/'), Day], compact: false },
    DateFormat { tokens: &[Year4, Sep(b'-'), Month, Sep(b'-'), Day], compact: false },
    // dd.MM.yy, dd/MM/yy, dd-MM-yy
    DateFormat { tokens: &[Day, Sep(b'.'), Month, Sep(b'.'), Year2], compact: false },
    DateFormat { tokens: &[Day, Sep(b'/'), Month, Sep(b'/'), Year2], compact: false },
    DateFormat { tokens: &[Day, Sep(b'-'), Month, Sep(b'-'), Year2], compact: false },
    // yyyyMMdd, ddMMyyyy, ddMMyy
    DateFormat { tokens: &[Year4, Month, Day], compact: true },
    DateFormat { tokens: &[Day, Month, Year4], compact: true },
    DateFormat { tokens: &[Day, Month, Year2], compact: true },
];

/// Plausible year range for the digit-only fallback.
const FALLBACK_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Converts free-text dates into [`NaiveDate`]s.
///
/// Two-digit years are always expanded into the century of the reference
/// date (`currentCentury + yy`), never to the "closest" century.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    century: i32,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

impl DateNormalizer {
    /// Create a normalizer whose two-digit years expand into the century of `reference`.
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            century: reference.year().div_euclid(100) * 100,
        }
    }

    /// Normalize `raw` into a calendar date.
    pub fn normalize(&self, raw: &str) -> Result<NaiveDate, DateError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DateError::Empty);
        }

        if is_canonical(raw) {
            return self
                .parse_format(raw, &[Year4, Sep(b'-'), Month, Sep(b'-'), Day], true)
                .ok_or_else(|| DateError::OutOfRange(raw.to_string()));
        }

        if let Some(date) = FORMATS
            .iter()
            .find_map(|format| self.parse_format(raw, format.tokens, format.compact))
        {
            return Ok(date);
        }

        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        match self.digit_fallback(&digits) {
            Some(date) => {
                trace!(raw, %date, "date recovered from digits");
                Ok(date)
            }
            None => Err(DateError::Unrecognized(raw.to_string())),
        }
    }

    /// Canonical `YYYY-MM-DD` rendering of `raw`, if it normalizes.
    pub fn canonical(&self, raw: &str) -> Option<String> {
        self.normalize(raw)
            .ok()
            .map(|date| date.format("%Y-%m-%d").to_string())
    }

    /// Reporting period of `raw`, if it normalizes.
    pub fn period_key(&self, raw: &str) -> Option<PeriodKey> {
        self.normalize(raw).ok().map(PeriodKey::from_date)
    }

    /// Sort key for "most recent first" ordering: the normalized date as a
    /// `yyyymmdd` integer, or `0` when the date is missing or unreadable.
    ///
    /// The raw digits are never used as a key. A date that does not
    /// normalize, such as `"2024344"`, sorts as the oldest possible value.
    pub fn recency_key(&self, raw: Option<&str>) -> i64 {
        raw.and_then(|raw| self.normalize(raw).ok())
            .map(|date| {
                i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
            })
            .unwrap_or(0)
    }

    fn expand_two_digit_year(&self, yy: i32) -> i32 {
        self.century + yy
    }

    fn parse_format(&self, raw: &str, tokens: &[Token], compact: bool) -> Option<NaiveDate> {
        let bytes = raw.as_bytes();
        let mut pos = 0;
        let (mut year, mut month, mut day) = (None, None, None);

        for token in tokens {
            match *token {
                Sep(sep) => {
                    if bytes.get(pos) != Some(&sep) {
                        return None;
                    }
                    pos += 1;
                }
                Day | Month => {
                    let (min, max) = if compact { (2, 2) } else { (1, 2) };
                    let (value, len) = take_digits(&bytes[pos..], min, max)?;
                    pos += len;
                    if matches!(token, Day) {
                        day = Some(value);
                    } else {
                        month = Some(value);
                    }
                }
                Year4 => {
                    let (value, len) = take_digits(&bytes[pos..], 4, 4)?;
                    pos += len;
                    year = Some(value as i32);
                }
                Year2 => {
                    let (value, len) = take_digits(&bytes[pos..], 2, 2)?;
                    pos += len;
                    year = Some(self.expand_two_digit_year(value as i32));
                }
            }
        }

        if pos != bytes.len() {
            return None;
        }
        NaiveDate::from_ymd_opt(year?, month?, day?)
    }

    /// Positional interpretations of a bare digit string, first plausible wins.
    fn digit_fallback(&self, digits: &str) -> Option<NaiveDate> {
        let num = |range: std::ops::Range<usize>| -> Option<u32> { digits.get(range)?.parse().ok() };

        let candidates: Vec<(i32, u32, u32)> = match digits.len() {
            // YYYYMMDD, then DDMMYYYY
            8 => vec![
                (num(0..4)? as i32, num(4..6)?, num(6..8)?),
                (num(4..8)? as i32, num(2..4)?, num(0..2)?),
            ],
            // YYYYMMD (single-digit day), then YYYYMDD (single-digit month)
            7 => vec![
                (num(0..4)? as i32, num(4..6)?, num(6..7)?),
                (num(0..4)? as i32, num(4..5)?, num(5..7)?),
            ],
            // YYMMDD, then DDMMYY
            6 => vec![
                (self.expand_two_digit_year(num(0..2)? as i32), num(2..4)?, num(4..6)?),
                (self.expand_two_digit_year(num(4..6)? as i32), num(2..4)?, num(0..2)?),
            ],
            _ => return None,
        };

        candidates
            .into_iter()
            .find_map(|(year, month, day)| plausible(year, month, day))
    }
}

fn plausible(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !FALLBACK_YEARS.contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Exactly `\d{4}-\d{2}-\d{2}`.
fn is_canonical(raw: &str) -> bool {
    let b = raw.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

/// Read between `min` and `max` leading ASCII digits.
fn take_digits(bytes: &[u8], min: usize, max: usize) -> Option<(u32, usize)> {
    let len = bytes
        .iter()
        .take(max)
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len < min {
        return None;
    }
    let value = bytes[..len]
        .iter()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
    Some((value, len))
}
