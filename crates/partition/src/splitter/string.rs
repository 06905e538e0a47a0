use tundra_common::{FieldMinMaxValue, PartitionFilter, PartitionValue};

use super::{assemble, stepped_cuts, TypeSplitter};

/// Splits a string domain on the first code point after the common
/// prefix of min and max. Cut keys are `prefix + char`, so the split is
/// coarse when many values share a long prefix; the step clamps to one
/// code point.
pub struct StringSplitter;

impl TypeSplitter for StringSplitter {
    fn split(
        &self,
        boundary: &PartitionFilter,
        min_max: &FieldMinMaxValue,
        pieces: usize,
    ) -> Vec<PartitionFilter> {
        if min_max.is_single_value() {
            return vec![boundary.pinned(&min_max.field_name, min_max.min.clone())];
        }
        let (PartitionValue::String(min), PartitionValue::String(max)) =
            (&min_max.min, &min_max.max)
        else {
            return vec![boundary.clone()];
        };

        let prefix: String = min
            .chars()
            .zip(max.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a)
            .collect();
        let cut_pos = prefix.chars().count();
        let (Some(lo), Some(hi)) = (min.chars().nth(cut_pos), max.chars().nth(cut_pos)) else {
            // min is a strict prefix of max: no character position left
            // to cut on, one piece spanning the inherited bounds.
            return assemble(boundary, &min_max.field_name, Vec::new());
        };
        let (lo, hi) = (u32::from(lo), u32::from(hi));

        let (step, cut_count) = stepped_cuts(i64::from(hi - lo), pieces);
        let cuts = (1..=cut_count)
            .filter_map(|i| {
                // Skip code points that are not valid chars (surrogate range).
                char::from_u32(lo + (step * i) as u32)
            })
            .map(|c| {
                let mut key = prefix.clone();
                key.push(c);
                PartitionValue::String(key)
            })
            .collect();
        assemble(boundary, &min_max.field_name, cuts)
    }
}
