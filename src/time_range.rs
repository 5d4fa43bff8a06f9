//! Time ranges with half-open containment and overnight wraparound.

use {
    crate::{
        error::ParseError,
        time::Time,
    },
    serde_json::Value,
    std::fmt,
};

/// An ordered pair of [`Time`] values plus an optional opaque payload.
///
/// Nothing forces `start < end`: a range whose end precedes its start spans
/// midnight and claims both the late evening and the early morning of its
/// own calendar day. The payload `D` is carried untouched and never
/// interpreted here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimeRange<D = Value> {
    start: Time,
    end:   Time,
    data:  Option<D>,
}

impl<D> TimeRange<D> {
    pub fn new(start: Time, end: Time) -> Self {
        Self {
            start,
            end,
            data: None,
        }
    }

    pub fn with_data(start: Time, end: Time, data: Option<D>) -> Self {
        Self { start, end, data }
    }

    /// Parses an `"HH:mm-HH:mm"` token.
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        Self::parse_with_data(token, None)
    }

    /// Parses an `"HH:mm-HH:mm"` token, attaching a payload. The token must
    /// split into exactly two parts around `-`.
    pub fn parse_with_data(token: &str, data: Option<D>) -> Result<Self, ParseError> {
        let parts: Vec<&str> = token.split('-').collect();
        match parts.as_slice() {
            [start, end] => Ok(Self {
                start: Time::parse(start)?,
                end: Time::parse(end)?,
                data,
            }),
            _ => Err(ParseError::InvalidTimeRange(token.to_string())),
        }
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    /// The end precedes the start, so the range wraps past midnight.
    pub fn is_overnight(&self) -> bool {
        self.end < self.start
    }

    /// The range's close boundary falls on the following calendar day,
    /// either by wrapping or by ending at the 24:00 sentinel.
    pub fn spans_to_next_day(&self) -> bool {
        self.is_overnight() || self.end.is_end_of_day()
    }

    /// Containment, half-open on the ordinary path: `start <= t < end`.
    ///
    /// Overnight ranges (`end < start`) contain `t >= start` as well as
    /// `t < end`, so `"22:00-02:00"` holds 23:00 and 01:59 but not 02:00.
    /// A sentinel end keeps the 23:59:59.999… instant itself inside, which
    /// an exclusive bound would lose.
    pub fn contains_time(&self, t: Time) -> bool {
        if self.is_overnight() {
            t >= self.start || t < self.end
        } else if self.end.is_end_of_day() {
            t >= self.start
        } else {
            self.start <= t && t < self.end
        }
    }

    /// True if any endpoint of either range falls inside the other.
    pub fn overlaps(&self, other: &TimeRange<D>) -> bool {
        self.contains_time(other.start)
            || self.contains_time(other.end)
            || other.contains_time(self.start)
            || other.contains_time(self.end)
    }
}

impl<D> fmt::Display for TimeRange<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        anyhow::Result,
        proptest::prelude::*,
    };

    fn range(token: &str) -> TimeRange {
        TimeRange::parse(token).unwrap()
    }

    fn time(token: &str) -> Time {
        Time::parse(token).unwrap()
    }

    #[test]
    fn test_parse_round_trip() -> Result<()> {
        for token in ["09:00-17:00", "00:00-24:00", "22:00-02:00"] {
            let parsed: TimeRange = TimeRange::parse(token)?;
            assert_eq!(parsed.to_string(), token);
        }

        Ok(())
    }

    #[test]
    fn test_parse_requires_exactly_two_parts() {
        for bad in ["09:00", "09:00-12:00-15:00", "-", ""] {
            assert_eq!(
                TimeRange::<Value>::parse(bad),
                Err(ParseError::InvalidTimeRange(bad.to_string())),
                "{bad:?} should not parse",
            );
        }
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = range("09:00-17:00");

        assert!(r.contains_time(time("09:00")));
        assert!(r.contains_time(time("12:34")));
        assert!(r.contains_time(time("16:59")));
        assert!(!r.contains_time(time("17:00")));
        assert!(!r.contains_time(time("08:59")));
    }

    #[test]
    fn test_overnight_wraparound() {
        let r = range("22:00-02:00");
        assert!(r.is_overnight());
        assert!(r.spans_to_next_day());

        for inside in ["22:00", "23:00", "00:30", "01:59"] {
            assert!(r.contains_time(time(inside)), "{inside} should be inside");
        }
        for outside in ["02:00", "10:00", "21:59"] {
            assert!(!r.contains_time(time(outside)), "{outside} should be outside");
        }
    }

    #[test]
    fn test_sentinel_end_is_inclusive() {
        let r = range("22:00-24:00");
        assert!(!r.is_overnight());
        assert!(r.spans_to_next_day());

        assert!(r.contains_time(time("23:59")));
        assert!(r.contains_time(Time::end_of_day()));
        // 00:00 belongs to the next day's schedule, not this range
        assert!(!r.contains_time(time("00:00")));
        assert!(!r.contains_time(time("10:00")));
    }

    #[test]
    fn test_overlaps() {
        assert!(range("08:00-11:00").overlaps(&range("10:00-12:00")));
        assert!(range("10:00-12:00").overlaps(&range("08:00-11:00")));
        assert!(range("08:00-12:00").overlaps(&range("09:00-10:00")));
        assert!(range("09:00-10:00").overlaps(&range("08:00-12:00")));
        assert!(range("09:00-10:00").overlaps(&range("09:00-10:00")));

        // The shared endpoint of adjacent ranges is start-inclusive in the
        // later range, so touching counts as overlap here
        assert!(range("08:00-10:00").overlaps(&range("10:00-12:00")));

        assert!(!range("08:00-09:00").overlaps(&range("10:00-12:00")));
        assert!(!range("10:00-12:00").overlaps(&range("08:00-09:00")));
    }

    #[test]
    fn test_payload_is_carried_opaquely() -> Result<()> {
        let r: TimeRange<&str> = TimeRange::parse_with_data("09:00-17:00", Some("staffed"))?;
        assert_eq!(r.data(), Some(&"staffed"));
        assert_eq!(r.to_string(), "09:00-17:00");

        Ok(())
    }

    proptest! {
        #[test]
        fn prop_display_round_trips(
            sh in 0u32..24, sm in 0u32..60,
            eh in 0u32..24, em in 0u32..60,
        ) {
            let token = format!("{sh:02}:{sm:02}-{eh:02}:{em:02}");
            let parsed: TimeRange = TimeRange::parse(&token).unwrap();
            prop_assert_eq!(parsed.to_string(), token);
        }
    }
}
