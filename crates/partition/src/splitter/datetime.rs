use chrono::DateTime;
use tundra_common::{FieldMinMaxValue, PartitionFilter, PartitionValue};

use super::{assemble, stepped_cuts, TypeSplitter};

/// Splits a date-time domain by stepping over epoch milliseconds, with
/// the step clamped to one millisecond for domains smaller than the
/// requested piece count.
pub struct DateTimeSplitter;

impl TypeSplitter for DateTimeSplitter {
    fn split(
        &self,
        boundary: &PartitionFilter,
        min_max: &FieldMinMaxValue,
        pieces: usize,
    ) -> Vec<PartitionFilter> {
        if min_max.is_single_value() {
            return vec![boundary.pinned(&min_max.field_name, min_max.min.clone())];
        }
        let (PartitionValue::DateTime(min), PartitionValue::DateTime(max)) =
            (&min_max.min, &min_max.max)
        else {
            return vec![boundary.clone()];
        };

        let min_ms = min.timestamp_millis();
        let max_ms = max.timestamp_millis();
        if min_ms == max_ms {
            // Distinct instants within one millisecond: millisecond
            // arithmetic cannot separate them.
            return assemble(boundary, &min_max.field_name, Vec::new());
        }
        let (step, cut_count) = stepped_cuts(max_ms - min_ms, pieces);
        let cuts = (1..=cut_count)
            .filter_map(|i| DateTime::from_timestamp_millis(min_ms + step * i))
            .map(PartitionValue::DateTime)
            .collect();
        assemble(boundary, &min_max.field_name, cuts)
    }
}
