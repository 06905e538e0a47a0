use tundra_common::{FieldMinMaxValue, PartitionFilter, PartitionValue};

use super::{assemble, TypeSplitter};

/// Splits a boolean field into at most two ranged pieces, `< true` and
/// `>= true` (false orders before true). Boundary pieces rather than
/// match pieces, so a small piece can be accepted directly and only the
/// single-value degenerate escalates as match-only.
pub struct BooleanSplitter;

impl TypeSplitter for BooleanSplitter {
    fn split(
        &self,
        boundary: &PartitionFilter,
        min_max: &FieldMinMaxValue,
        _pieces: usize,
    ) -> Vec<PartitionFilter> {
        if min_max.is_single_value() {
            return vec![boundary.pinned(&min_max.field_name, min_max.min.clone())];
        }
        assemble(boundary, &min_max.field_name, vec![PartitionValue::Boolean(true)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tundra_common::Boundary;

    #[test]
    fn two_distinct_values_give_two_ranged_pieces() {
        let mm = FieldMinMaxValue::new("active", false, true).unwrap();
        let pieces = BooleanSplitter.split(&PartitionFilter::new(), &mm, 20);
        assert_eq!(pieces.len(), 2);
        assert!(!pieces[0].is_match_only());
        assert!(!pieces[1].is_match_only());
        assert_eq!(pieces[0].right.as_ref().unwrap().value, PartitionValue::Boolean(true));
        assert_eq!(pieces[1].left.as_ref().unwrap().value, PartitionValue::Boolean(true));
    }

    #[test]
    fn single_value_pins_the_field() {
        let mm = FieldMinMaxValue::new("active", true, true).unwrap();
        let boundary = PartitionFilter::new().with_left(Boundary::gte("active", false));
        let pieces = BooleanSplitter.split(&boundary, &mm, 5);
        assert_eq!(pieces.len(), 1);
        assert!(pieces[0].is_match_only());
        assert_eq!(pieces[0].matches.get("active"), Some(&PartitionValue::Boolean(true)));
    }
}
