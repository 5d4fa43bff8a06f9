//! Wall-clock time values with a 24:00 end-of-day sentinel.

use {
    crate::error::ParseError,
    chrono::{
        naive::NaiveTime,
        Duration,
        Timelike,
    },
    lazy_static::lazy_static,
    std::{
        fmt,
        str::FromStr,
    },
};

lazy_static! {
    /// Helper time value representing 24:00:00 as 00:00:00 minus 1
    /// nanosecond (underflowing to 23:59:59.999(...) ). While chrono
    /// has this value internally exposed as NaiveTime::MAX, it is not
    /// exposed outside the crate.
    static ref MAX_TIME_INSTANT: NaiveTime = NaiveTime::MIN.overflowing_sub_signed(Duration::nanoseconds(1)).0;
}

/// Seconds in a full day; the sentinel maps here for duration arithmetic.
pub(crate) const END_OF_DAY_SECONDS: u32 = 24 * 60 * 60;

/// An immutable time of day.
///
/// The literal `"24:00"` parses to the unique end-of-day sentinel, which
/// orders strictly after every ordinary time and is distinct from `"00:00"`.
/// Ordinary values are minute-resolution `"HH:mm"` tokens or wrapped
/// [`NaiveTime`] values.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Time(NaiveTime);

impl Time {
    /// Start of day, 00:00.
    pub fn midnight() -> Self {
        Time(NaiveTime::MIN)
    }

    /// The end-of-day sentinel produced by parsing `"24:00"`.
    pub fn end_of_day() -> Self {
        Time(*MAX_TIME_INSTANT)
    }

    /// Wraps a native time value.
    pub fn from_naive(time: NaiveTime) -> Self {
        Time(time)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    pub fn is_end_of_day(&self) -> bool {
        self.0 == *MAX_TIME_INSTANT
    }

    /// Parses an `"HH:mm"` token; `"24:00"` yields the end-of-day sentinel.
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let token = token.trim();
        if token == "24:00" {
            return Ok(Self::end_of_day());
        }
        NaiveTime::parse_from_str(token, "%H:%M")
            .map(Time)
            .map_err(|_| ParseError::InvalidTime(token.to_string()))
    }

    /// Seconds elapsed since midnight; the sentinel counts as a full day.
    pub fn seconds_from_midnight(&self) -> u32 {
        if self.is_end_of_day() {
            END_OF_DAY_SECONDS
        } else {
            self.0.num_seconds_from_midnight()
        }
    }

    pub(crate) fn from_seconds_from_midnight(seconds: u32) -> Self {
        if seconds >= END_OF_DAY_SECONDS {
            Self::end_of_day()
        } else {
            Time(NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or(NaiveTime::MIN))
        }
    }

    /// Renders with a chrono format pattern. The sentinel renders as its
    /// underlying 23:59:59.999… instant here; only the default
    /// [`Display`](fmt::Display) form spells it `"24:00"`.
    pub fn format(&self, pattern: &str) -> String {
        self.0.format(pattern).to_string()
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end_of_day() {
            write!(f, "24:00")
        } else {
            write!(f, "{}", self.0.format("%H:%M"))
        }
    }
}

impl FromStr for Time {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveTime> for Time {
    fn from(time: NaiveTime) -> Self {
        Self::from_naive(time)
    }
}
