//! Per-day schedules: an ordered sequence of time ranges plus payload.

use {
    crate::{
        error::{
            OverlappingTimeRanges,
            ParseError,
        },
        time::Time,
        time_range::TimeRange,
    },
    serde_json::Value,
    std::slice,
};

/// The open ranges applying to one calendar day.
///
/// Ranges keep their input order; several algorithms visit them in stored
/// order (and reversed for backward searches), and overlapping input is
/// preserved as given unless normalized up front by
/// [`merge_overlapping_ranges`](crate::merge::merge_overlapping_ranges).
/// An empty sequence means closed all day. Immutable after construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpeningHoursForDay<D = Value> {
    ranges: Vec<TimeRange<D>>,
    data:   Option<D>,
}

impl<D> OpeningHoursForDay<D> {
    /// A day with no open ranges, i.e. closed all day.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_ranges(ranges: Vec<TimeRange<D>>) -> Self {
        Self { ranges, data: None }
    }

    pub fn from_ranges_with_data(ranges: Vec<TimeRange<D>>, data: Option<D>) -> Self {
        Self { ranges, data }
    }

    /// Parses a list of `"HH:mm-HH:mm"` tokens, preserving their order.
    /// No sorting or merging happens here.
    pub fn from_strings<I, S>(tokens: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ranges = tokens
            .into_iter()
            .map(|token| TimeRange::parse(token.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_ranges(ranges))
    }

    pub fn from_strings_with_data<I, S>(tokens: I, data: Option<D>) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut day = Self::from_strings(tokens)?;
        day.data = data;
        Ok(day)
    }

    /// True iff any contained range holds the given time.
    pub fn is_open_at(&self, time: Time) -> bool {
        self.ranges.iter().any(|range| range.contains_time(time))
    }

    /// Closed all day.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn ranges(&self) -> &[TimeRange<D>] {
        &self.ranges
    }

    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    pub fn iter(&self) -> slice::Iter<'_, TimeRange<D>> {
        self.ranges.iter()
    }

    /// Some range covers the whole day, 00:00 through the 24:00 sentinel.
    pub fn spans_full_day(&self) -> bool {
        self.ranges
            .iter()
            .any(|range| range.start() == Time::midnight() && range.end().is_end_of_day())
    }

    /// Opt-in strictness check for callers that want overlapping input
    /// rejected rather than merged. Ranges that merely touch at a shared
    /// boundary are fine.
    pub fn validate_no_overlaps(&self) -> Result<(), OverlappingTimeRanges> {
        for (i, a) in self.ranges.iter().enumerate() {
            for b in self.ranges.iter().skip(i + 1) {
                let touching = a.end() == b.start() || b.end() == a.start();
                if a.overlaps(b) && !touching {
                    return Err(OverlappingTimeRanges {
                        first:  a.to_string(),
                        second: b.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl<D> Default for OpeningHoursForDay<D> {
    fn default() -> Self {
        Self {
            ranges: Vec::new(),
            data:   None,
        }
    }
}

impl<'a, D> IntoIterator for &'a OpeningHoursForDay<D> {
    type Item = &'a TimeRange<D>;
    type IntoIter = slice::Iter<'a, TimeRange<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}
