//! Normalization of overlapping per-day range lists.

use {
    crate::{
        error::ParseError,
        schedule::OpeningHours,
        time_range::TimeRange,
    },
    serde_json::Value,
    std::collections::BTreeMap,
};

/// Normalizes a `day name -> ["HH:mm-HH:mm", ...]` map into minimal sorted,
/// non-overlapping range lists. Overlapping or exactly-adjacent ranges
/// collapse into one span from the earliest start to the latest end; days
/// with no ranges keep an empty list. Idempotent.
pub fn merge_overlapping_ranges(
    data: &BTreeMap<String, Vec<String>>,
) -> Result<BTreeMap<String, Vec<String>>, ParseError> {
    data.iter()
        .map(|(day, tokens)| Ok((day.clone(), merge_day(tokens)?)))
        .collect()
}

/// [`merge_overlapping_ranges`] composed with construction: the merged map
/// becomes the schedule's weekday configuration.
pub fn create_and_merge_overlapping_ranges(
    data: &BTreeMap<String, Vec<String>>,
) -> Result<OpeningHours<Value>, ParseError> {
    let merged = merge_overlapping_ranges(data)?;
    let config = Value::Object(
        merged
            .into_iter()
            .map(|(day, tokens)| {
                let list = tokens.into_iter().map(Value::String).collect();
                (day, Value::Array(list))
            })
            .collect(),
    );
    Ok(OpeningHours::create(&config))
}

fn merge_day(tokens: &[String]) -> Result<Vec<String>, ParseError> {
    let mut ranges = tokens
        .iter()
        .map(|token| TimeRange::<Value>::parse(token))
        .collect::<Result<Vec<_>, _>>()?;
    ranges.sort_by_key(TimeRange::start);

    let mut merged: Vec<TimeRange<Value>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if last.overlaps(&range) || last.end() == range.start() => {
                if range.end() > last.end() {
                    *last = TimeRange::new(last.start(), range.end());
                }
            }
            _ => merged.push(range),
        }
    }

    Ok(merged.iter().map(ToString::to_string).collect())
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        anyhow::Result,
        proptest::prelude::*,
    };

    fn map(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(day, tokens)| {
                (
                    day.to_string(),
                    tokens.iter().map(ToString::to_string).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_overlapping_ranges_collapse() -> Result<()> {
        let merged = merge_overlapping_ranges(&map(&[(
            "monday",
            &["08:00-11:00", "10:00-12:00"],
        )]))?;

        assert_eq!(merged["monday"], vec!["08:00-12:00"]);

        Ok(())
    }

    #[test]
    fn test_adjacent_ranges_collapse() -> Result<()> {
        let merged = merge_overlapping_ranges(&map(&[(
            "monday",
            &["08:00-10:00", "10:00-12:00"],
        )]))?;

        assert_eq!(merged["monday"], vec!["08:00-12:00"]);

        Ok(())
    }

    #[test]
    fn test_disjoint_ranges_sorted_not_merged() -> Result<()> {
        let merged = merge_overlapping_ranges(&map(&[(
            "monday",
            &["13:00-18:00", "09:00-12:00"],
        )]))?;

        assert_eq!(merged["monday"], vec!["09:00-12:00", "13:00-18:00"]);

        Ok(())
    }

    #[test]
    fn test_contained_range_disappears() -> Result<()> {
        let merged = merge_overlapping_ranges(&map(&[(
            "monday",
            &["08:00-18:00", "09:00-10:00"],
        )]))?;

        assert_eq!(merged["monday"], vec!["08:00-18:00"]);

        Ok(())
    }

    #[test]
    fn test_empty_day_preserved() -> Result<()> {
        let merged = merge_overlapping_ranges(&map(&[("monday", &[]), ("friday", &["09:00-17:00"])]))?;

        assert_eq!(merged["monday"], Vec::<String>::new());
        assert_eq!(merged["friday"], vec!["09:00-17:00"]);

        Ok(())
    }

    #[test]
    fn test_malformed_token_is_error() {
        let result = merge_overlapping_ranges(&map(&[("monday", &["nope"])]));
        assert!(matches!(result, Err(ParseError::InvalidTimeRange(_))));
    }

    #[test]
    fn test_create_and_merge_compose() -> Result<()> {
        let schedule = create_and_merge_overlapping_ranges(&map(&[(
            "monday",
            &["08:00-11:00", "10:00-12:00"],
        )]))?;

        let monday = schedule.for_day("monday")?;
        assert_eq!(monday.len(), 1);
        assert_eq!(monday.ranges()[0].to_string(), "08:00-12:00");

        Ok(())
    }

    fn arbitrary_token() -> impl Strategy<Value = String> {
        (0u32..24, 0u32..60, 0u32..24, 0u32..60)
            .prop_map(|(sh, sm, eh, em)| format!("{sh:02}:{sm:02}-{eh:02}:{em:02}"))
    }

    proptest! {
        #[test]
        fn prop_merge_is_idempotent(tokens in prop::collection::vec(arbitrary_token(), 0..8)) {
            let mut input = BTreeMap::new();
            input.insert("monday".to_string(), tokens);

            let once = merge_overlapping_ranges(&input).unwrap();
            let twice = merge_overlapping_ranges(&once).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
