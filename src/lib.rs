//! Weekly opening hours with date exceptions, boundary search and duration
//! accounting.
//!
//! A schedule owns one [`OpeningHoursForDay`] per weekday, a table of
//! date-keyed and recurring month-day exceptions, and an ordered list of
//! per-date filter functions. Queries resolve the effective day via
//! [`OpeningHours::for_date`] (filters first, then exact dates, then
//! recurring entries, then the weekday table) and delegate containment to
//! [`TimeRange`], including ranges that wrap past midnight and the `24:00`
//! end-of-day sentinel.
//!
//! ```
//! use {
//!     chrono::NaiveDateTime,
//!     opening_hours::OpeningHours,
//!     serde_json::json,
//! };
//!
//! let schedule = OpeningHours::create(&json!({
//!     "monday": ["09:00-12:00", "13:00-18:00"],
//!     "exceptions": {
//!         "2016-12-25": [],
//!     },
//! }));
//!
//! let monday = NaiveDateTime::parse_from_str("2016-12-26 11:00", "%Y-%m-%d %H:%M").unwrap();
//! assert!(schedule.is_open_at(monday));
//! assert_eq!(
//!     schedule.next_close(monday).unwrap().to_string(),
//!     "2016-12-26 12:00:00"
//! );
//! ```
//!
//! Schedules are immutable after construction; every query is a pure
//! function, so sharing one instance across threads needs no locking.

pub mod config;
pub mod day;
pub mod error;
pub mod merge;
pub mod schedule;
pub mod time;
pub mod time_range;

pub use {
    day::OpeningHoursForDay,
    error::{
        OverlappingTimeRanges,
        ParseError,
        SearchError,
    },
    merge::{
        create_and_merge_overlapping_ranges,
        merge_overlapping_ranges,
    },
    schedule::{
        search::{
            SearchBounds,
            MAX_SEARCH_DAYS,
        },
        ExceptionKey,
        Filter,
        OpeningHours,
        OpeningHoursBuilder,
        WeekdayGroup,
    },
    time::Time,
    time_range::TimeRange,
};
