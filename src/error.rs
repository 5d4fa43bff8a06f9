//! Error taxonomy for parse and search operations.
//!
//! Construction from loosely-typed configuration deliberately does not
//! surface `ParseError`: malformed entries are skipped so one bad token
//! cannot take down the whole schedule. The typed parse entry points
//! (`Time::parse`, `TimeRange::parse`, `ExceptionKey::from_str`, the merge
//! utility) propagate it instead.

use {
    chrono::NaiveDateTime,
    thiserror::Error,
};

/// A malformed time, time-range, date or weekday token.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    #[error("time {0:?} does not match the HH:mm format")]
    InvalidTime(String),

    #[error("time range {0:?} must be two HH:mm tokens separated by a single '-'")]
    InvalidTimeRange(String),

    #[error("date {0:?} is neither a YYYY-MM-DD nor a MM-DD token")]
    InvalidDate(String),

    #[error("{0:?} is not a weekday name")]
    InvalidWeekday(String),
}

/// Terminal outcome of a boundary search. Deterministic: the same schedule
/// and query point always produce the same error.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SearchError {
    #[error("no matching boundary within {searched_days} days of {from}")]
    MaximumLimitExceeded {
        from:          NaiveDateTime,
        searched_days: u32,
    },
}

/// Two ranges of one day overlap. Only reported by the opt-in
/// [`validate_no_overlaps`](crate::day::OpeningHoursForDay::validate_no_overlaps)
/// check; construction itself accepts overlapping input and the merge
/// utility normalizes it away.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("time ranges {first} and {second} overlap")]
pub struct OverlappingTimeRanges {
    pub first:  String,
    pub second: String,
}
