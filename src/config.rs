//! Loosely-typed construction front-end.
//!
//! [`OpeningHours::create`] consumes a nested configuration document whose
//! keys are weekday names, day ranges (`"monday to friday"`) or the reserved
//! keys `exceptions`, `filters`, `overflow` and `timezone`. Value shapes are
//! resolved into [`OpeningHoursForDay`] once, here, through closed untagged
//! variants; queries never re-inspect shapes. Construction never fails:
//! malformed entries are logged and skipped, malformed shapes degrade to a
//! closed day.

use {
    crate::{
        day::OpeningHoursForDay,
        schedule::{
            ExceptionKey,
            OpeningHours,
            OpeningHoursBuilder,
            ANCHOR_YEAR,
        },
        time_range::TimeRange,
    },
    chrono::{
        Datelike,
        NaiveDate,
        Weekday,
    },
    chrono_tz::Tz,
    serde::Deserialize,
    serde_json::Value,
    tracing::warn,
};

/// The shapes a day (or exception) value may take: a flat list of range
/// tokens, a list mixing tokens with `{hours, data}` maps, or one
/// `{hours, data}` map for the whole day.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DayValue {
    Entries(Vec<HoursEntry>),
    Detailed(DetailedHours),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HoursEntry {
    Range(String),
    Detailed(DetailedHours),
}

#[derive(Debug, Deserialize)]
struct DetailedHours {
    #[serde(default)]
    hours: Option<HoursList>,
    #[serde(default)]
    data:  Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HoursList {
    One(String),
    Many(Vec<String>),
}

impl HoursList {
    fn tokens(&self) -> Vec<&str> {
        match self {
            HoursList::One(token) => vec![token.as_str()],
            HoursList::Many(tokens) => tokens.iter().map(String::as_str).collect(),
        }
    }
}

impl OpeningHours<Value> {
    /// Builds a schedule from a loosely-typed configuration document. The
    /// input timezone comes from the document's `timezone` key, defaulting
    /// to UTC; the output timezone matches the input one.
    pub fn create(config: &Value) -> Self {
        build(config, None, None)
    }

    /// [`create`](OpeningHours::create) with explicit timezones, which take
    /// precedence over the document's `timezone` key.
    pub fn create_in(config: &Value, timezone: Tz, output_timezone: Tz) -> Self {
        build(config, Some(timezone), Some(output_timezone))
    }

    /// Full rebuild from `config` with this schedule's timezones. Not a
    /// merge: nothing from the prior instance carries over, filters
    /// included; callers wanting additive behavior merge their documents
    /// before calling.
    pub fn fill(&self, config: &Value) -> Self {
        build(config, Some(self.timezone()), Some(self.output_timezone()))
    }
}

fn build(config: &Value, timezone: Option<Tz>, output_timezone: Option<Tz>) -> OpeningHours<Value> {
    let Some(entries) = config.as_object() else {
        warn!("configuration is not an object, schedule is closed all week");
        return OpeningHours::default();
    };

    let tz = timezone
        .or_else(|| entries.get("timezone").and_then(timezone_from_value))
        .unwrap_or(Tz::UTC);
    let mut builder = OpeningHours::builder()
        .timezone(tz)
        .output_timezone(output_timezone.unwrap_or(tz));

    for (key, value) in entries {
        match key.as_str() {
            "timezone" => {} // consumed above
            "overflow" => match value.as_bool() {
                Some(flag) => builder = builder.overflow(flag),
                None => warn!(?value, "overflow must be a boolean, ignoring"),
            },
            "filters" => {
                // Functions cannot ride in a document; the builder's
                // filter() is the attachment point
                warn!("filters cannot be configured from data, skipping");
            }
            "exceptions" => builder = apply_exceptions(builder, value),
            day_key => builder = apply_day(builder, day_key, value),
        }
    }

    builder.build()
}

fn timezone_from_value(value: &Value) -> Option<Tz> {
    let token = value.as_str()?;
    match token.parse() {
        Ok(tz) => Some(tz),
        Err(err) => {
            warn!(token, %err, "unknown timezone, falling back to UTC");
            None
        }
    }
}

fn apply_day(
    mut builder: OpeningHoursBuilder<Value>,
    key: &str,
    value: &Value,
) -> OpeningHoursBuilder<Value> {
    let Some(weekdays) = expand_day_key(key) else {
        warn!(key, "unrecognized day key, skipping entry");
        return builder;
    };

    let day = day_from_value(key, value);
    for weekday in weekdays {
        builder = builder.day(weekday, day.clone());
    }
    builder
}

fn apply_exceptions(
    mut builder: OpeningHoursBuilder<Value>,
    value: &Value,
) -> OpeningHoursBuilder<Value> {
    let Some(entries) = value.as_object() else {
        warn!("exceptions must be an object keyed by date, skipping");
        return builder;
    };

    for (key, day_value) in entries {
        let Some(keys) = expand_exception_key(key) else {
            warn!(key, "unrecognized exception key, skipping entry");
            continue;
        };
        let day = day_from_value(key, day_value);
        for exception_key in keys {
            builder = builder.exception(exception_key, day.clone());
        }
    }
    builder
}

/// A weekday name, or a `"start to end"` range walked forward cyclically so
/// `"friday to monday"` covers Fri, Sat, Sun, Mon.
fn expand_day_key(key: &str) -> Option<Vec<Weekday>> {
    let key = key.trim();
    let Some((start, end)) = key.split_once(" to ") else {
        return key.parse().ok().map(|weekday| vec![weekday]);
    };

    let start: Weekday = start.trim().parse().ok()?;
    let end: Weekday = end.trim().parse().ok()?;

    let mut days = vec![start];
    let mut cursor = start;
    while cursor != end {
        cursor = cursor.succ();
        days.push(cursor);
    }
    Some(days)
}

/// A date or month-day key, or a `"start to end"` range of either form
/// (both endpoints must share the form). Month-day ranges walk the leap
/// anchor year cyclically, so they may wrap past Dec 31.
fn expand_exception_key(key: &str) -> Option<Vec<ExceptionKey>> {
    let key = key.trim();
    let Some((start, end)) = key.split_once(" to ") else {
        return key.parse().ok().map(|parsed| vec![parsed]);
    };

    let start: ExceptionKey = start.trim().parse().ok()?;
    let end: ExceptionKey = end.trim().parse().ok()?;

    match (start, end) {
        (ExceptionKey::Date(first), ExceptionKey::Date(last)) => {
            if last < first {
                return None;
            }
            let mut keys = Vec::new();
            let mut cursor = first;
            loop {
                keys.push(ExceptionKey::Date(cursor));
                if cursor == last {
                    return Some(keys);
                }
                cursor = cursor.succ_opt()?;
            }
        }
        (
            ExceptionKey::Recurring { month, day },
            ExceptionKey::Recurring {
                month: end_month,
                day: end_day,
            },
        ) => {
            let last = NaiveDate::from_ymd_opt(ANCHOR_YEAR, end_month, end_day)?;
            let mut cursor = NaiveDate::from_ymd_opt(ANCHOR_YEAR, month, day)?;
            let mut keys = Vec::new();
            // The anchor year has 366 days, so any cyclic walk ends within
            // that many steps
            for _ in 0..=366 {
                keys.push(ExceptionKey::Recurring {
                    month: cursor.month(),
                    day:   cursor.day(),
                });
                if cursor == last {
                    return Some(keys);
                }
                cursor = match cursor.succ_opt() {
                    Some(next) if next.year() == ANCHOR_YEAR => next,
                    _ => NaiveDate::from_ymd_opt(ANCHOR_YEAR, 1, 1)?,
                };
            }
            None
        }
        // Mixed forms have no single expansion
        _ => None,
    }
}

fn day_from_value(key: &str, value: &Value) -> OpeningHoursForDay<Value> {
    match serde_json::from_value::<DayValue>(value.clone()) {
        Ok(shape) => day_from_shape(key, shape),
        Err(err) => {
            warn!(key, %err, "malformed day value, treating day as closed");
            OpeningHoursForDay::empty()
        }
    }
}

fn day_from_shape(key: &str, shape: DayValue) -> OpeningHoursForDay<Value> {
    match shape {
        DayValue::Entries(entries) => {
            let mut ranges = Vec::new();
            for entry in entries {
                match entry {
                    HoursEntry::Range(token) => push_range(key, &mut ranges, &token, None),
                    HoursEntry::Detailed(detail) => {
                        for token in detail.hours.iter().flat_map(HoursList::tokens) {
                            push_range(key, &mut ranges, token, detail.data.clone());
                        }
                    }
                }
            }
            OpeningHoursForDay::from_ranges(ranges)
        }
        DayValue::Detailed(detail) => {
            let mut ranges = Vec::new();
            for token in detail.hours.iter().flat_map(HoursList::tokens) {
                push_range(key, &mut ranges, token, None);
            }
            OpeningHoursForDay::from_ranges_with_data(ranges, detail.data)
        }
    }
}

fn push_range(key: &str, ranges: &mut Vec<TimeRange<Value>>, token: &str, data: Option<Value>) {
    match TimeRange::parse_with_data(token, data) {
        Ok(range) => ranges.push(range),
        Err(err) => warn!(key, token, %err, "skipping malformed time range"),
    }
}
