use tundra_common::{FieldMinMaxValue, PartitionFilter, PartitionValue};

use super::{assemble, stepped_cuts, TypeSplitter};

/// Splits numeric domains. Integer pairs step in `i64` with the step
/// clamped to 1; double (or mixed) pairs step in `f64`. The realized
/// piece count drops below the requested one when the domain is smaller
/// than the requested pieces.
pub struct NumberSplitter;

impl TypeSplitter for NumberSplitter {
    fn split(
        &self,
        boundary: &PartitionFilter,
        min_max: &FieldMinMaxValue,
        pieces: usize,
    ) -> Vec<PartitionFilter> {
        if min_max.is_single_value() {
            return vec![boundary.pinned(&min_max.field_name, min_max.min.clone())];
        }
        let pieces = pieces.max(1);
        let cuts = match (&min_max.min, &min_max.max) {
            (PartitionValue::Integer(min), PartitionValue::Integer(max)) => {
                integer_cuts(*min, *max, pieces)
            }
            (min, max) => {
                // Mixed integer/double pairs promote to double.
                match (min.as_f64(), max.as_f64()) {
                    (Some(min), Some(max)) => double_cuts(min, max, pieces),
                    _ => Vec::new(),
                }
            }
        };
        assemble(boundary, &min_max.field_name, cuts)
    }
}

fn integer_cuts(min: i64, max: i64, pieces: usize) -> Vec<PartitionValue> {
    let span = max.saturating_sub(min);
    let (step, cut_count) = stepped_cuts(span, pieces);
    (1..=cut_count)
        .map(|i| PartitionValue::Integer(min.saturating_add(step * i)))
        .collect()
}

fn double_cuts(min: f64, max: f64, pieces: usize) -> Vec<PartitionValue> {
    let step = (max - min) / pieces as f64;
    if !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }
    let mut cuts = Vec::new();
    for i in 1..pieces {
        let cut = min + step * i as f64;
        if cut >= max {
            break;
        }
        cuts.push(PartitionValue::Double(cut));
    }
    cuts
}

#[cfg(test)]
mod tests {
    use super::*;
    use tundra_common::Boundary;

    #[test]
    fn splits_integer_domain_into_requested_pieces() {
        let mm = FieldMinMaxValue::new("id", 0i64, 100i64).unwrap();
        let pieces = NumberSplitter.split(&PartitionFilter::new(), &mm, 4);
        assert_eq!(pieces.len(), 4);
        assert!(pieces[0].left.is_none());
        assert!(pieces[3].right.is_none());
        assert_eq!(pieces[1].left.as_ref().unwrap().value, PartitionValue::Integer(25));
    }

    #[test]
    fn small_domain_clamps_step_and_reduces_pieces() {
        let mm = FieldMinMaxValue::new("id", 0i64, 3i64).unwrap();
        let pieces = NumberSplitter.split(&PartitionFilter::new(), &mm, 10);
        // step clamps to 1: cuts at 1, 2 give three pieces, none zero-width
        assert_eq!(pieces.len(), 3);
        for window in pieces.windows(2) {
            let upper = &window[0].right.as_ref().unwrap().value;
            let lower = &window[1].left.as_ref().unwrap().value;
            assert_eq!(upper, lower);
        }
    }

    #[test]
    fn inherits_ancestor_bounds() {
        let boundary = PartitionFilter::new()
            .with_left(Boundary::gte("id", 10i64))
            .with_right(Boundary::lt("id", 50i64));
        let mm = FieldMinMaxValue::new("id", 10i64, 50i64).unwrap();
        let pieces = NumberSplitter.split(&boundary, &mm, 2);
        assert_eq!(pieces.first().unwrap().left, boundary.left);
        assert_eq!(pieces.last().unwrap().right, boundary.right);
    }

    #[test]
    fn single_value_pins_field() {
        let mm = FieldMinMaxValue::new("id", 7i64, 7i64).unwrap();
        let pieces = NumberSplitter.split(&PartitionFilter::new(), &mm, 10);
        assert_eq!(pieces.len(), 1);
        assert!(pieces[0].is_match_only());
    }

    #[test]
    fn adjacent_values_still_get_a_cut() {
        // without the forced cut a re-split of [7, 8] would reproduce
        // its own input filter and recurse forever
        let mm = FieldMinMaxValue::new("id", 7i64, 8i64).unwrap();
        let pieces = NumberSplitter.split(&PartitionFilter::new(), &mm, 4);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].right.as_ref().unwrap().value, PartitionValue::Integer(8));
        assert_eq!(pieces[1].left.as_ref().unwrap().value, PartitionValue::Integer(8));
    }

    #[test]
    fn double_domain_produces_monotonic_cuts() {
        let mm = FieldMinMaxValue::new("score", 0.0f64, 1.0f64).unwrap();
        let pieces = NumberSplitter.split(&PartitionFilter::new(), &mm, 4);
        assert_eq!(pieces.len(), 4);
        let mut last = f64::MIN;
        for piece in &pieces[..3] {
            let PartitionValue::Double(cut) = &piece.right.as_ref().unwrap().value else {
                panic!("expected double cut");
            };
            assert!(*cut > last);
            last = *cut;
        }
    }
}
