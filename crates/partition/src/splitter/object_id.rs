use tundra_common::{FieldMinMaxValue, ObjectId, PartitionFilter, PartitionValue};

use super::{assemble, stepped_cuts, TypeSplitter};

/// Splits Mongo-style identifiers on the embedded coarse timestamp only,
/// not the full identifier ordering. Rows sharing a timestamp second are
/// indistinguishable to this strategy, a known source of uneven splits;
/// identifiers that collapse to one timestamp fall back to a single piece
/// spanning the inherited bounds.
pub struct ObjectIdSplitter;

impl TypeSplitter for ObjectIdSplitter {
    fn split(
        &self,
        boundary: &PartitionFilter,
        min_max: &FieldMinMaxValue,
        pieces: usize,
    ) -> Vec<PartitionFilter> {
        if min_max.is_single_value() {
            return vec![boundary.pinned(&min_max.field_name, min_max.min.clone())];
        }
        let (PartitionValue::ObjectId(min), PartitionValue::ObjectId(max)) =
            (&min_max.min, &min_max.max)
        else {
            return vec![boundary.clone()];
        };

        let min_seconds = min.timestamp();
        let max_seconds = max.timestamp();
        if min_seconds == max_seconds {
            // Distinct ids within one second: timestamp arithmetic cannot
            // separate them.
            return assemble(boundary, &min_max.field_name, Vec::new());
        }

        let (step, cut_count) = stepped_cuts(i64::from(max_seconds - min_seconds), pieces);
        let cuts = (1..=cut_count)
            .map(|i| {
                let seconds = i64::from(min_seconds) + step * i;
                PartitionValue::ObjectId(ObjectId::from_timestamp(seconds as u32))
            })
            .collect();
        assemble(boundary, &min_max.field_name, cuts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_timestamp_seconds() {
        let mm = FieldMinMaxValue::new(
            "_id",
            ObjectId::from_timestamp(1_000),
            ObjectId::from_timestamp(1_100),
        )
        .unwrap();
        let pieces = ObjectIdSplitter.split(&PartitionFilter::new(), &mm, 10);
        assert_eq!(pieces.len(), 10);
        let PartitionValue::ObjectId(cut) = &pieces[0].right.as_ref().unwrap().value else {
            panic!("expected ObjectId cut");
        };
        assert_eq!(cut.timestamp(), 1_010);
        // remaining bytes zero-filled
        assert_eq!(cut.bytes()[4..], [0u8; 8]);
    }

    #[test]
    fn shared_timestamp_second_falls_back_to_one_piece() {
        let mut hi = ObjectId::from_timestamp(1_000).bytes();
        hi[11] = 0xff;
        let mm = FieldMinMaxValue::new(
            "_id",
            ObjectId::from_timestamp(1_000),
            ObjectId::from_bytes(hi),
        )
        .unwrap();
        let pieces = ObjectIdSplitter.split(&PartitionFilter::new(), &mm, 10);
        assert_eq!(pieces.len(), 1);
    }

    #[test]
    fn narrow_timestamp_span_clamps_step() {
        let mm = FieldMinMaxValue::new(
            "_id",
            ObjectId::from_timestamp(1_000),
            ObjectId::from_timestamp(1_003),
        )
        .unwrap();
        let pieces = ObjectIdSplitter.split(&PartitionFilter::new(), &mm, 50);
        assert_eq!(pieces.len(), 3);
    }
}
