//! Elapsed open/closed duration between two points in time.

use {
    crate::{
        day::OpeningHoursForDay,
        schedule::OpeningHours,
        time::Time,
    },
    chrono::{
        NaiveDateTime,
        NaiveTime,
        Timelike,
    },
};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

impl<D: Clone> OpeningHours<D> {
    /// Seconds spent open in `[from, to)`. A reversed interval yields the
    /// negated magnitude.
    pub fn diff_in_open_seconds(&self, from: NaiveDateTime, to: NaiveDateTime) -> i64 {
        self.diff_seconds(from, to, true)
    }

    pub fn diff_in_open_minutes(&self, from: NaiveDateTime, to: NaiveDateTime) -> f64 {
        self.diff_in_open_seconds(from, to) as f64 / 60.0
    }

    pub fn diff_in_open_hours(&self, from: NaiveDateTime, to: NaiveDateTime) -> f64 {
        self.diff_in_open_seconds(from, to) as f64 / 3600.0
    }

    pub fn diff_in_closed_seconds(&self, from: NaiveDateTime, to: NaiveDateTime) -> i64 {
        self.diff_seconds(from, to, false)
    }

    pub fn diff_in_closed_minutes(&self, from: NaiveDateTime, to: NaiveDateTime) -> f64 {
        self.diff_in_closed_seconds(from, to) as f64 / 60.0
    }

    pub fn diff_in_closed_hours(&self, from: NaiveDateTime, to: NaiveDateTime) -> f64 {
        self.diff_in_closed_seconds(from, to) as f64 / 3600.0
    }

    /// Walks day by day, clipping each day to `[from, to)` and summing the
    /// sub-segments whose state matches `open`. Swap-and-negate handles
    /// reversed intervals so the walk itself only ever moves forward.
    fn diff_seconds(&self, from: NaiveDateTime, to: NaiveDateTime, open: bool) -> i64 {
        if to < from {
            return -self.diff_seconds(to, from, open);
        }

        let mut total = 0;
        let mut cursor = from;
        while cursor < to {
            let day_start = cursor.date();
            let next_midnight = day_start.succ_opt().map(|d| d.and_time(NaiveTime::MIN));

            let (segment_end, end_seconds) = match next_midnight {
                Some(midnight) if midnight < to => (midnight, SECONDS_PER_DAY),
                // Calendar edge or final day: clip to `to`
                _ => (to, i64::from(to.time().num_seconds_from_midnight())),
            };

            let start_seconds = i64::from(cursor.time().num_seconds_from_midnight());
            let schedule = self.for_date(day_start);
            total += state_seconds_in_segment(&schedule, start_seconds, end_seconds, open);

            if segment_end == cursor {
                break;
            }
            cursor = segment_end;
        }
        total
    }
}

/// Sums the parts of `[start, end)` (seconds from midnight on one day)
/// where the day's open state equals `open`. Range starts and ends are the
/// only possible state-change points, so exact boundary arithmetic covers
/// the whole segment without stepping.
fn state_seconds_in_segment<D>(
    schedule: &OpeningHoursForDay<D>,
    start: i64,
    end: i64,
    open: bool,
) -> i64 {
    let mut points = vec![start, end];
    for range in schedule {
        for boundary in [
            i64::from(range.start().seconds_from_midnight()),
            i64::from(range.end().seconds_from_midnight()),
        ] {
            if start < boundary && boundary < end {
                points.push(boundary);
            }
        }
    }
    points.sort_unstable();
    points.dedup();

    let mut total = 0;
    for pair in points.windows(2) {
        let &[p, q] = pair else { continue };
        // State is constant on [p, q); sample at its inclusive start
        let state = schedule.is_open_at(Time::from_seconds_from_midnight(
            u32::try_from(p).unwrap_or(0),
        ));
        if state == open {
            total += q - p;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::schedule::ExceptionKey,
        anyhow::Result,
        chrono::Weekday,
        serde_json::Value,
    };

    fn day(tokens: &[&str]) -> OpeningHoursForDay {
        OpeningHoursForDay::from_strings(tokens).unwrap()
    }

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn monday_schedule() -> OpeningHours {
        OpeningHours::builder()
            .day(Weekday::Mon, day(&["09:00-12:00", "13:00-18:00"]))
            .exception(
                ExceptionKey::Date("2016-12-25".parse().unwrap()),
                OpeningHoursForDay::empty(),
            )
            .build()
    }

    #[test]
    fn test_open_hours_across_lunch_gap() {
        let schedule = monday_schedule();

        // 09:00-16:00 on an open Monday: 3h morning + 3h afternoon
        let hours = schedule.diff_in_open_hours(
            datetime("2016-12-26 09:00"),
            datetime("2016-12-26 16:00"),
        );
        assert_eq!(hours, 6.0);
    }

    #[test]
    fn test_closed_is_the_complement() {
        let schedule = monday_schedule();
        let from = datetime("2016-12-26 09:00");
        let to = datetime("2016-12-26 16:00");

        let open = schedule.diff_in_open_seconds(from, to);
        let closed = schedule.diff_in_closed_seconds(from, to);
        assert_eq!(open + closed, 7 * 3600);
        assert_eq!(closed, 3600); // the lunch hour
    }

    #[test]
    fn test_reversed_interval_negates() {
        let schedule = monday_schedule();
        let a = datetime("2016-12-26 09:00");
        let b = datetime("2016-12-26 16:00");

        assert_eq!(
            schedule.diff_in_open_seconds(b, a),
            -schedule.diff_in_open_seconds(a, b)
        );
        assert_eq!(schedule.diff_in_open_hours(b, a), -6.0);
    }

    #[test]
    fn test_multi_day_walk() {
        let schedule = monday_schedule();

        // Saturday noon through Tuesday noon covers exactly one full open
        // Monday: 3h + 5h
        let hours = schedule.diff_in_open_hours(
            datetime("2016-12-24 12:00"),
            datetime("2016-12-27 12:00"),
        );
        assert_eq!(hours, 8.0);
    }

    #[test]
    fn test_exception_day_counts_as_closed() {
        let schedule = OpeningHours::builder()
            .day(Weekday::Sun, day(&["09:00-17:00"]))
            .exception(
                ExceptionKey::Date("2016-12-25".parse().unwrap()),
                OpeningHoursForDay::empty(),
            )
            .build();

        // 2016-12-25 is a Sunday, but the exception empties it
        let open = schedule.diff_in_open_seconds(
            datetime("2016-12-25 00:00"),
            datetime("2016-12-26 00:00"),
        );
        assert_eq!(open, 0);
    }

    #[test]
    fn test_partial_range_clipping() {
        let schedule = monday_schedule();

        // Interval starts mid-range
        let minutes = schedule.diff_in_open_minutes(
            datetime("2016-12-26 11:30"),
            datetime("2016-12-26 13:30"),
        );
        assert_eq!(minutes, 60.0); // 30 min before noon + 30 min after 13:00
    }

    #[test]
    fn test_sentinel_range_counts_to_midnight() {
        let schedule = OpeningHours::<Value>::builder()
            .day(Weekday::Mon, day(&["22:00-24:00"]))
            .build();

        // 2023-11-20 is a Monday
        let open = schedule.diff_in_open_seconds(
            datetime("2023-11-20 21:00"),
            datetime("2023-11-21 01:00"),
        );
        assert_eq!(open, 2 * 3600);
    }

    #[test]
    fn test_overnight_range_claims_own_morning() {
        let schedule = OpeningHours::<Value>::builder()
            .day(Weekday::Mon, day(&["22:00-02:00"]))
            .build();

        // A wrapped range covers its own day's early morning and late
        // evening; the following Tuesday claims nothing
        let open = schedule.diff_in_open_seconds(
            datetime("2023-11-20 00:00"),
            datetime("2023-11-21 06:00"),
        );
        assert_eq!(open, 4 * 3600); // 00:00-02:00 and 22:00-24:00 on Monday
    }

    #[test]
    fn test_empty_interval_is_zero() {
        let schedule = monday_schedule();
        let at = datetime("2016-12-26 10:00");
        assert_eq!(schedule.diff_in_open_seconds(at, at), 0);
    }
}
