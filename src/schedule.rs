//! The schedule itself: weekday table, exceptions, filters and resolution.

pub mod diff;
pub mod search;

use {
    crate::{
        day::OpeningHoursForDay,
        error::ParseError,
        time::Time,
    },
    chrono::{
        DateTime,
        Datelike,
        NaiveDate,
        NaiveDateTime,
        Utc,
        Weekday,
    },
    chrono_tz::Tz,
    serde_json::Value,
    std::{
        borrow::Cow,
        collections::BTreeMap,
        fmt,
        str::FromStr,
    },
    winnow::{
        combinator::{
            alt,
            separated_pair,
        },
        token::take,
        ModalResult,
        Parser,
    },
};

/// Reference year for recurring month-day arithmetic. A leap year, so
/// `02-29` stays representable and range walks never trip over Feb 28.
pub(crate) const ANCHOR_YEAR: i32 = 2000;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Key of a schedule exception: an exact calendar date, or a month-day
/// pattern recurring every year. Exact dates shadow recurring entries for
/// the same calendar date.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ExceptionKey {
    Recurring { month: u32, day: u32 },
    Date(NaiveDate),
}

impl ExceptionKey {
    /// The key an exact date projects onto in the recurring table.
    pub fn recurring_for(date: NaiveDate) -> Self {
        ExceptionKey::Recurring {
            month: date.month(),
            day:   date.day(),
        }
    }
}

fn two_digits(input: &mut &str) -> ModalResult<u32> {
    take(2usize).try_map(str::parse).parse_next(input)
}

fn four_digits(input: &mut &str) -> ModalResult<i32> {
    take(4usize).try_map(str::parse).parse_next(input)
}

fn full_date_parser(input: &mut &str) -> ModalResult<NaiveDate> {
    separated_pair(four_digits, '-', separated_pair(two_digits, '-', two_digits))
        .verify_map(|(year, (month, day))| NaiveDate::from_ymd_opt(year, month, day))
        .parse_next(input)
}

fn month_day_parser(input: &mut &str) -> ModalResult<ExceptionKey> {
    separated_pair(two_digits, '-', two_digits)
        .verify_map(|(month, day)| {
            NaiveDate::from_ymd_opt(ANCHOR_YEAR, month, day)
                .map(|_| ExceptionKey::Recurring { month, day })
        })
        .parse_next(input)
}

fn exception_key_parser(input: &mut &str) -> ModalResult<ExceptionKey> {
    alt((full_date_parser.map(ExceptionKey::Date), month_day_parser)).parse_next(input)
}

impl FromStr for ExceptionKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        exception_key_parser
            .parse(s.trim())
            .map_err(|_| ParseError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for ExceptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExceptionKey::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            ExceptionKey::Recurring { month, day } => write!(f, "{month:02}-{day:02}"),
        }
    }
}

/// A pluggable per-date override. The first filter returning `Some` wins
/// and replaces the day's schedule entirely; exceptions and the weekday
/// table are not consulted after a match.
pub type Filter<D> = Box<dyn Fn(NaiveDate) -> Option<OpeningHoursForDay<D>> + Send + Sync>;

/// A weekly opening-hours schedule with date exceptions and filters.
///
/// Immutable once built: every field is written exactly once during
/// construction, so sharing an instance across threads needs no locking.
/// Mutation-shaped operations ([`fill`](OpeningHours::fill)) build a new
/// instance instead.
pub struct OpeningHours<D = Value> {
    timezone:        Tz,
    output_timezone: Tz,
    week:            [OpeningHoursForDay<D>; 7],
    exceptions:      BTreeMap<ExceptionKey, OpeningHoursForDay<D>>,
    filters:         Vec<Filter<D>>,
    /// Accepted from configuration and stored; evaluation applies overnight
    /// semantics per range regardless of this flag.
    overflow:        bool,
}

impl<D> OpeningHours<D> {
    pub fn builder() -> OpeningHoursBuilder<D> {
        OpeningHoursBuilder::new()
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn output_timezone(&self) -> Tz {
        self.output_timezone
    }

    pub fn overflow(&self) -> bool {
        self.overflow
    }

    pub fn exceptions(&self) -> &BTreeMap<ExceptionKey, OpeningHoursForDay<D>> {
        &self.exceptions
    }

    pub fn filters(&self) -> &[Filter<D>] {
        &self.filters
    }

    /// The base schedule for a weekday, ignoring exceptions and filters.
    pub fn for_weekday(&self, weekday: Weekday) -> &OpeningHoursForDay<D> {
        &self.week[weekday.num_days_from_monday() as usize]
    }

    /// The base schedule for a weekday given by name.
    pub fn for_day(&self, name: &str) -> Result<&OpeningHoursForDay<D>, ParseError> {
        let weekday: Weekday = name
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidWeekday(name.to_string()))?;
        Ok(self.for_weekday(weekday))
    }

    /// All seven weekdays in Monday-first order.
    pub fn for_week(&self) -> [(Weekday, &OpeningHoursForDay<D>); 7] {
        std::array::from_fn(|i| (WEEKDAYS[i], &self.week[i]))
    }

    /// Weekdays grouped by identical schedule, in first-appearance order.
    pub fn for_week_combined(&self) -> Vec<WeekdayGroup<'_, D>>
    where
        D: PartialEq,
    {
        let mut groups: Vec<WeekdayGroup<'_, D>> = Vec::new();
        for (weekday, day) in self.for_week() {
            match groups.iter_mut().find(|group| group.schedule == day) {
                Some(group) => group.days.push(weekday),
                None => groups.push(WeekdayGroup {
                    days:     vec![weekday],
                    schedule: day,
                }),
            }
        }
        groups
    }

    /// Maximal runs of consecutive weekdays sharing a schedule. Runs do not
    /// wrap from Sunday back to Monday.
    pub fn for_week_consecutive_days(&self) -> Vec<WeekdayGroup<'_, D>>
    where
        D: PartialEq,
    {
        let mut groups: Vec<WeekdayGroup<'_, D>> = Vec::new();
        for (weekday, day) in self.for_week() {
            match groups.last_mut() {
                Some(group) if group.schedule == day => group.days.push(weekday),
                _ => groups.push(WeekdayGroup {
                    days:     vec![weekday],
                    schedule: day,
                }),
            }
        }
        groups
    }

    /// True only for the base weekly schedule: any exception or filter
    /// disqualifies "always", whatever its effect would be.
    pub fn is_always_open(&self) -> bool {
        self.exceptions.is_empty()
            && self.filters.is_empty()
            && self.week.iter().all(OpeningHoursForDay::spans_full_day)
    }

    pub fn is_always_closed(&self) -> bool {
        self.exceptions.is_empty()
            && self.filters.is_empty()
            && self.week.iter().all(OpeningHoursForDay::is_empty)
    }
}

impl<D: Clone> OpeningHours<D> {
    /// Resolves the effective schedule for a calendar date: filters in
    /// registration order first (first `Some` wins), then the exact-date
    /// exception, then the recurring month-day exception, then the weekday
    /// table.
    pub fn for_date(&self, date: NaiveDate) -> Cow<'_, OpeningHoursForDay<D>> {
        for filter in &self.filters {
            if let Some(day) = filter(date) {
                return Cow::Owned(day);
            }
        }
        if let Some(day) = self.exceptions.get(&ExceptionKey::Date(date)) {
            return Cow::Borrowed(day);
        }
        if let Some(day) = self.exceptions.get(&ExceptionKey::recurring_for(date)) {
            return Cow::Borrowed(day);
        }
        Cow::Borrowed(self.for_weekday(date.weekday()))
    }

    pub fn is_open_at(&self, when: NaiveDateTime) -> bool {
        self.for_date(when.date())
            .is_open_at(Time::from_naive(when.time()))
    }

    pub fn is_closed_at(&self, when: NaiveDateTime) -> bool {
        !self.is_open_at(when)
    }

    /// Evaluates an absolute instant by first converting it to the
    /// schedule's local time.
    pub fn is_open_at_instant(&self, when: &DateTime<Utc>) -> bool {
        let when_local = when.with_timezone(&self.timezone);
        self.is_open_at(when_local.naive_local())
    }

    pub fn is_closed_at_instant(&self, when: &DateTime<Utc>) -> bool {
        !self.is_open_at_instant(when)
    }

    /// Open right now, per the system clock and the configured timezone.
    pub fn is_open_now(&self) -> bool {
        self.is_open_at_instant(&Utc::now())
    }

    pub fn is_closed_now(&self) -> bool {
        !self.is_open_now()
    }

    /// Whether the token's day has any open range. A weekday name checks the
    /// base week only (exceptions ignored); otherwise the token is tried as
    /// a date (`YYYY-MM-DD`, or `MM-DD` in the current year) and resolved
    /// through [`for_date`](OpeningHours::for_date). Unknown tokens are
    /// `false`, never an error.
    pub fn is_open_on(&self, token: &str) -> bool {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        self.is_open_on_at(token, today)
    }

    pub fn is_closed_on(&self, token: &str) -> bool {
        !self.is_open_on(token)
    }

    /// Deterministic form of [`is_open_on`](OpeningHours::is_open_on):
    /// `today` supplies the year for bare `MM-DD` tokens.
    pub fn is_open_on_at(&self, token: &str, today: NaiveDate) -> bool {
        if let Ok(weekday) = token.trim().parse::<Weekday>() {
            return !self.for_weekday(weekday).is_empty();
        }
        match token.parse::<ExceptionKey>() {
            Ok(ExceptionKey::Date(date)) => !self.for_date(date).is_empty(),
            Ok(ExceptionKey::Recurring { month, day }) => {
                NaiveDate::from_ymd_opt(today.year(), month, day)
                    .is_some_and(|date| !self.for_date(date).is_empty())
            }
            Err(_) => false,
        }
    }
}

impl<D> Default for OpeningHours<D> {
    fn default() -> Self {
        Self {
            timezone:        Tz::UTC,
            output_timezone: Tz::UTC,
            week:            std::array::from_fn(|_| OpeningHoursForDay::default()),
            exceptions:      BTreeMap::new(),
            filters:         Vec::new(),
            overflow:        false,
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for OpeningHours<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpeningHours")
            .field("timezone", &self.timezone)
            .field("output_timezone", &self.output_timezone)
            .field("week", &self.week)
            .field("exceptions", &self.exceptions)
            .field("filters", &self.filters.len())
            .field("overflow", &self.overflow)
            .finish()
    }
}

/// A run of weekdays sharing one schedule, as returned by the week views.
#[derive(Debug)]
pub struct WeekdayGroup<'a, D = Value> {
    pub days:     Vec<Weekday>,
    pub schedule: &'a OpeningHoursForDay<D>,
}

/// Typed construction path. [`create`](OpeningHours::create) drives this
/// from a loosely-typed document; callers with non-JSON payloads use it
/// directly. Filter registration order is preserved.
pub struct OpeningHoursBuilder<D = Value> {
    schedule: OpeningHours<D>,
}

impl<D> OpeningHoursBuilder<D> {
    pub fn new() -> Self {
        Self {
            schedule: OpeningHours::default(),
        }
    }

    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.schedule.timezone = timezone;
        self
    }

    pub fn output_timezone(mut self, timezone: Tz) -> Self {
        self.schedule.output_timezone = timezone;
        self
    }

    pub fn day(mut self, weekday: Weekday, day: OpeningHoursForDay<D>) -> Self {
        self.schedule.week[weekday.num_days_from_monday() as usize] = day;
        self
    }

    pub fn exception(mut self, key: ExceptionKey, day: OpeningHoursForDay<D>) -> Self {
        self.schedule.exceptions.insert(key, day);
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(NaiveDate) -> Option<OpeningHoursForDay<D>> + Send + Sync + 'static,
    {
        self.schedule.filters.push(Box::new(filter));
        self
    }

    pub fn overflow(mut self, overflow: bool) -> Self {
        self.schedule.overflow = overflow;
        self
    }

    pub fn build(self) -> OpeningHours<D> {
        self.schedule
    }
}

impl<D> Default for OpeningHoursBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}
