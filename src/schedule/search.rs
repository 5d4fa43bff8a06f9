//! Boundary search: next/previous open and close, current-range lookup.

use {
    crate::{
        day::OpeningHoursForDay,
        error::SearchError,
        schedule::OpeningHours,
        time::Time,
        time_range::TimeRange,
    },
    chrono::{
        DateTime,
        LocalResult,
        NaiveDate,
        NaiveDateTime,
        NaiveTime,
        TimeZone,
        Utc,
    },
    chrono_tz::Tz,
    tracing::trace,
};

/// Hard cap on how many days a boundary search may walk.
pub const MAX_SEARCH_DAYS: u32 = 366;

/// Caller-supplied limits for a boundary search.
///
/// A result past `search_until` (forward) or before it (backward) does not
/// count as found: the search fails with
/// [`MaximumLimitExceeded`](SearchError::MaximumLimitExceeded), unless
/// `cap` is set, in which case `cap` is returned in place of the failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchBounds {
    pub search_until: Option<NaiveDateTime>,
    pub cap:          Option<NaiveDateTime>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Direction {
    Forward,
    Backward,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Boundary {
    Open,
    Close,
}

impl<D: Clone> OpeningHours<D> {
    /// The next moment the schedule transitions to open, strictly after
    /// `from`.
    pub fn next_open(&self, from: NaiveDateTime) -> Result<NaiveDateTime, SearchError> {
        self.next_open_with(from, &SearchBounds::default())
    }

    pub fn next_open_with(
        &self,
        from: NaiveDateTime,
        bounds: &SearchBounds,
    ) -> Result<NaiveDateTime, SearchError> {
        self.seek(from, Direction::Forward, Boundary::Open, bounds)
    }

    /// The next moment the schedule transitions to closed. When `from` sits
    /// inside an open range this is that range's own end.
    pub fn next_close(&self, from: NaiveDateTime) -> Result<NaiveDateTime, SearchError> {
        self.next_close_with(from, &SearchBounds::default())
    }

    pub fn next_close_with(
        &self,
        from: NaiveDateTime,
        bounds: &SearchBounds,
    ) -> Result<NaiveDateTime, SearchError> {
        self.seek(from, Direction::Forward, Boundary::Close, bounds)
    }

    /// The latest open boundary strictly before `from`.
    pub fn previous_open(&self, from: NaiveDateTime) -> Result<NaiveDateTime, SearchError> {
        self.previous_open_with(from, &SearchBounds::default())
    }

    pub fn previous_open_with(
        &self,
        from: NaiveDateTime,
        bounds: &SearchBounds,
    ) -> Result<NaiveDateTime, SearchError> {
        self.seek(from, Direction::Backward, Boundary::Open, bounds)
    }

    /// The latest close boundary strictly before `from`.
    pub fn previous_close(&self, from: NaiveDateTime) -> Result<NaiveDateTime, SearchError> {
        self.previous_close_with(from, &SearchBounds::default())
    }

    pub fn previous_close_with(
        &self,
        from: NaiveDateTime,
        bounds: &SearchBounds,
    ) -> Result<NaiveDateTime, SearchError> {
        self.seek(from, Direction::Backward, Boundary::Close, bounds)
    }

    /// The range containing `when` on its resolved day, if any. The first
    /// match in stored order wins.
    pub fn current_open_range(&self, when: NaiveDateTime) -> Option<TimeRange<D>> {
        let schedule = self.for_date(when.date());
        let time = Time::from_naive(when.time());
        schedule
            .ranges()
            .iter()
            .find(|range| range.contains_time(time))
            .cloned()
    }

    pub fn current_open_range_start(&self, when: NaiveDateTime) -> Option<NaiveDateTime> {
        self.current_open_range(when)
            .map(|range| when.date().and_time(range.start().as_naive()))
    }

    /// End of the current range as a date-time, rolled to the next calendar
    /// day when the range wraps past midnight or ends at the 24:00 sentinel.
    pub fn current_open_range_end(&self, when: NaiveDateTime) -> Option<NaiveDateTime> {
        let time = Time::from_naive(when.time());
        self.current_open_range(when)
            .and_then(|range| close_boundary(when.date(), &range, time))
    }

    /// Next/previous boundary searches share one loop: walk day by day from
    /// the query point, scan each resolved day's ranges in stored order
    /// (reversed when walking backward) for the first matching boundary
    /// strictly past the cursor, and give up after [`MAX_SEARCH_DAYS`].
    fn seek(
        &self,
        from: NaiveDateTime,
        direction: Direction,
        boundary: Boundary,
        bounds: &SearchBounds,
    ) -> Result<NaiveDateTime, SearchError> {
        let mut cursor = from;
        for searched_days in 0..=MAX_SEARCH_DAYS {
            let schedule = self.for_date(cursor.date());
            let found = match (direction, boundary) {
                (Direction::Forward, Boundary::Open) => next_open_on_day(&schedule, cursor),
                (Direction::Forward, Boundary::Close) => next_close_on_day(&schedule, cursor),
                (Direction::Backward, Boundary::Open) => previous_open_on_day(&schedule, cursor),
                (Direction::Backward, Boundary::Close) => previous_close_on_day(&schedule, cursor),
            };

            if let Some(at) = found {
                let past_limit = match (direction, bounds.search_until) {
                    (Direction::Forward, Some(until)) => at > until,
                    (Direction::Backward, Some(floor)) => at < floor,
                    (_, None) => false,
                };
                if past_limit {
                    return capped(from, searched_days, bounds);
                }
                return Ok(at);
            }

            cursor = match step(cursor.date(), direction) {
                Some(next) => next,
                // Fell off the calendar; same outcome as an exhausted scan
                None => return capped(from, searched_days, bounds),
            };
            trace!(%cursor, ?direction, ?boundary, "no boundary on day, advancing");
        }
        capped(from, MAX_SEARCH_DAYS, bounds)
    }
}

fn capped(
    from: NaiveDateTime,
    searched_days: u32,
    bounds: &SearchBounds,
) -> Result<NaiveDateTime, SearchError> {
    match bounds.cap {
        Some(cap) => Ok(cap),
        None => Err(SearchError::MaximumLimitExceeded {
            from,
            searched_days,
        }),
    }
}

fn step(date: NaiveDate, direction: Direction) -> Option<NaiveDateTime> {
    match direction {
        Direction::Forward => date.succ_opt().map(|d| d.and_time(NaiveTime::MIN)),
        Direction::Backward => date
            .pred_opt()
            .and_then(|d| NaiveTime::from_hms_opt(23, 59, 59).map(|t| d.and_time(t))),
    }
}

fn next_open_on_day<D>(schedule: &OpeningHoursForDay<D>, cursor: NaiveDateTime) -> Option<NaiveDateTime> {
    let time = Time::from_naive(cursor.time());
    schedule
        .iter()
        .find(|range| range.start() > time)
        .map(|range| cursor.date().and_time(range.start().as_naive()))
}

fn previous_open_on_day<D>(
    schedule: &OpeningHoursForDay<D>,
    cursor: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let time = Time::from_naive(cursor.time());
    schedule
        .iter()
        .rev()
        .find(|range| range.start() < time)
        .map(|range| cursor.date().and_time(range.start().as_naive()))
}

fn next_close_on_day<D>(schedule: &OpeningHoursForDay<D>, cursor: NaiveDateTime) -> Option<NaiveDateTime> {
    let time = Time::from_naive(cursor.time());

    // Being inside an open range takes precedence: the close is that
    // range's own end, not some later range's.
    if let Some(range) = schedule.iter().find(|range| range.contains_time(time)) {
        return close_boundary(cursor.date(), range, time);
    }

    schedule
        .iter()
        .find(|range| range.end() > time)
        .and_then(|range| close_boundary(cursor.date(), range, time))
}

fn previous_close_on_day<D>(
    schedule: &OpeningHoursForDay<D>,
    cursor: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let time = Time::from_naive(cursor.time());
    schedule
        .iter()
        .rev()
        .find(|range| range.end() < time)
        .map(|range| cursor.date().and_time(range.end().as_naive()))
}

/// Materializes a range's close boundary on a calendar day. Ends at the
/// 24:00 sentinel land on the next day's midnight; a wrapped range's end
/// lands on the next day only when the cursor sits on its late side.
fn close_boundary<D>(
    date: NaiveDate,
    range: &TimeRange<D>,
    cursor_time: Time,
) -> Option<NaiveDateTime> {
    if range.end().is_end_of_day() {
        return date.succ_opt().map(|d| d.and_time(NaiveTime::MIN));
    }
    if range.is_overnight() && cursor_time >= range.start() {
        return date.succ_opt().map(|d| d.and_time(range.end().as_naive()));
    }
    Some(date.and_time(range.end().as_naive()))
}

impl<D: Clone> OpeningHours<D> {
    /// [`next_open`](OpeningHours::next_open) over an absolute instant:
    /// converts in through the input timezone, out through the output
    /// timezone.
    pub fn next_open_instant(&self, when: &DateTime<Utc>) -> Result<DateTime<Tz>, SearchError> {
        let found = self.next_open(when.with_timezone(&self.timezone()).naive_local())?;
        Ok(self.emit(found))
    }

    pub fn next_close_instant(&self, when: &DateTime<Utc>) -> Result<DateTime<Tz>, SearchError> {
        let found = self.next_close(when.with_timezone(&self.timezone()).naive_local())?;
        Ok(self.emit(found))
    }

    pub fn previous_open_instant(&self, when: &DateTime<Utc>) -> Result<DateTime<Tz>, SearchError> {
        let found = self.previous_open(when.with_timezone(&self.timezone()).naive_local())?;
        Ok(self.emit(found))
    }

    pub fn previous_close_instant(&self, when: &DateTime<Utc>) -> Result<DateTime<Tz>, SearchError> {
        let found = self.previous_close(when.with_timezone(&self.timezone()).naive_local())?;
        Ok(self.emit(found))
    }

    fn emit(&self, local: NaiveDateTime) -> DateTime<Tz> {
        let anchored = match self.timezone().from_local_datetime(&local) {
            LocalResult::Single(dt) => dt,
            // Autumn fold: take the earlier reading
            LocalResult::Ambiguous(dt, _) => dt,
            // Spring-forward gap: fall back to the UTC reading of the
            // same wall-clock value
            LocalResult::None => self.timezone().from_utc_datetime(&local),
        };
        anchored.with_timezone(&self.output_timezone())
    }
}
