//! Type splitter strategies: pure functions dividing a field's value
//! domain `[min, max]` into ordered, non-overlapping sub-ranges.
//!
//! Every strategy follows the same contract: the first piece inherits
//! the boundary filter's left bound, the last piece inherits its right
//! bound, match predicates propagate into every piece, and a step that
//! rounds to zero is clamped to the domain's smallest unit (producing
//! fewer, larger pieces than requested, never zero-width ones).

mod boolean;
mod datetime;
mod number;
mod object_id;
mod string;

use std::collections::HashMap;
use std::sync::Arc;

use tundra_common::{Boundary, FieldMinMaxValue, PartitionFilter, PartitionValue, ValueType};

pub use boolean::BooleanSplitter;
pub use datetime::DateTimeSplitter;
pub use number::NumberSplitter;
pub use object_id::ObjectIdSplitter;
pub use string::StringSplitter;

/// Strategy splitting one semantic type's value domain.
pub trait TypeSplitter: Send + Sync {
    fn split(
        &self,
        boundary: &PartitionFilter,
        min_max: &FieldMinMaxValue,
        pieces: usize,
    ) -> Vec<PartitionFilter>;
}

/// Read-mostly mapping from semantic type key to splitter strategy.
///
/// Custom registrations happen before `start_splitting`; lookups during
/// execution are read-only.
#[derive(Clone)]
pub struct SplitterRegistry {
    map: HashMap<String, Arc<dyn TypeSplitter>>,
}

impl Default for SplitterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitterRegistry {
    /// Registry preloaded with the built-in strategies.
    pub fn new() -> Self {
        let mut map: HashMap<String, Arc<dyn TypeSplitter>> = HashMap::new();
        map.insert(ValueType::Boolean.key().to_string(), Arc::new(BooleanSplitter));
        map.insert(ValueType::DateTime.key().to_string(), Arc::new(DateTimeSplitter));
        map.insert(ValueType::Number.key().to_string(), Arc::new(NumberSplitter));
        map.insert(ValueType::String.key().to_string(), Arc::new(StringSplitter));
        map.insert("ObjectId".to_string(), Arc::new(ObjectIdSplitter));
        Self { map }
    }

    pub fn register(&mut self, value_type: ValueType, splitter: Arc<dyn TypeSplitter>) {
        self.map.insert(value_type.key().to_string(), splitter);
    }

    pub fn resolve(&self, value_type: &ValueType) -> Option<Arc<dyn TypeSplitter>> {
        self.map.get(value_type.key()).cloned()
    }
}

/// Step size and cut count for an integral domain of `span` units.
///
/// The step clamps to one unit when the requested piece count exceeds the
/// span, so the realized piece count drops rather than producing
/// zero-width pieces. A domain realizing a single piece still gets one
/// cut at `min + step`: without it a re-split would reproduce its input
/// filter verbatim and recurse forever on adjacent values.
pub(crate) fn stepped_cuts(span: i64, pieces: usize) -> (i64, i64) {
    let step = (span / pieces.max(1) as i64).max(1);
    let realized = (span / step).max(1);
    let cut_count = if realized == 1 { 1 } else { realized - 1 };
    (step, cut_count)
}

/// Assembles piece filters from ascending interior cut points.
///
/// With cuts `c1..cn` the pieces are `[left, c1) [c1, c2) .. [cn, right]`
/// where `left`/`right` are the boundary filter's own bounds, inherited
/// verbatim so nested splits never lose the ancestor's constraint. An
/// empty cut list yields a single piece spanning the inherited bounds.
pub(crate) fn assemble(
    boundary: &PartitionFilter,
    field: &str,
    cuts: Vec<PartitionValue>,
) -> Vec<PartitionFilter> {
    if cuts.is_empty() {
        let mut piece = boundary.child();
        piece.left = boundary.left.clone();
        piece.right = boundary.right.clone();
        return vec![piece];
    }

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut lower: Option<PartitionValue> = None;
    for cut in &cuts {
        let mut piece = boundary.child();
        piece.left = match &lower {
            Some(value) => Some(Boundary::gte(field, value.clone())),
            None => boundary.left.clone(),
        };
        piece.right = Some(Boundary::lt(field, cut.clone()));
        pieces.push(piece);
        lower = Some(cut.clone());
    }
    let mut last = boundary.child();
    last.left = lower.map(|value| Boundary::gte(field, value));
    last.right = boundary.right.clone();
    pieces.push(last);
    pieces
}
