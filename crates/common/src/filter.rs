use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::PartitionValue;

/// Comparison operator of a single range boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl BoundaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BoundaryOp::Gt => ">",
            BoundaryOp::Gte => ">=",
            BoundaryOp::Lt => "<",
            BoundaryOp::Lte => "<=",
        }
    }
}

/// One bound on a partition index field, e.g. `id >= 1000`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub field: String,
    pub op: BoundaryOp,
    pub value: PartitionValue,
}

impl Boundary {
    pub fn gt(field: impl Into<String>, value: impl Into<PartitionValue>) -> Self {
        Self { field: field.into(), op: BoundaryOp::Gt, value: value.into() }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<PartitionValue>) -> Self {
        Self { field: field.into(), op: BoundaryOp::Gte, value: value.into() }
    }

    pub fn lt(field: impl Into<String>, value: impl Into<PartitionValue>) -> Self {
        Self { field: field.into(), op: BoundaryOp::Lt, value: value.into() }
    }

    pub fn lte(field: impl Into<String>, value: impl Into<PartitionValue>) -> Self {
        Self { field: field.into(), op: BoundaryOp::Lte, value: value.into() }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op.symbol(), self.value)
    }
}

/// A predicate selecting one candidate partition of a table.
///
/// `left`/`right` bound the field currently being range-split; fields pinned
/// by earlier splits of a composite index live in `matches` as equality
/// predicates. A filter with only `matches` set has no usable range left and
/// is a terminal leaf for range splitting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartitionFilter {
    pub left: Option<Boundary>,
    pub right: Option<Boundary>,
    pub matches: BTreeMap<String, PartitionValue>,
}

impl PartitionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole-table filter: no boundaries, no match predicates.
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.matches.is_empty()
    }

    /// Match-only filter with no ordered boundary; never range-split further.
    pub fn is_match_only(&self) -> bool {
        self.left.is_none() && self.right.is_none() && !self.matches.is_empty()
    }

    pub fn with_left(mut self, boundary: Boundary) -> Self {
        self.left = Some(boundary);
        self
    }

    pub fn with_right(mut self, boundary: Boundary) -> Self {
        self.right = Some(boundary);
        self
    }

    pub fn with_match(mut self, field: impl Into<String>, value: impl Into<PartitionValue>) -> Self {
        self.matches.insert(field.into(), value.into());
        self
    }

    /// Starts a sub-filter that keeps this filter's match predicates but
    /// carries fresh boundaries. Splitters use this for every piece.
    pub fn child(&self) -> Self {
        Self { left: None, right: None, matches: self.matches.clone() }
    }

    /// Pins a field to an exact value, dropping same-field boundaries
    /// (equality subsumes them). Used when a field's min and max coincide.
    pub fn pinned(&self, field: &str, value: PartitionValue) -> Self {
        let mut out = self.child();
        out.matches.insert(field.to_string(), value);
        out
    }
}

impl fmt::Display for PartitionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (field, value) in &self.matches {
            parts.push(format!("{} = {}", field, value));
        }
        if let Some(left) = &self.left {
            parts.push(left.to_string());
        }
        if let Some(right) = &self.right {
            parts.push(right.to_string());
        }
        if parts.is_empty() {
            write!(f, "<all rows>")
        } else {
            write!(f, "{}", parts.join(" AND "))
        }
    }
}

/// The final output unit: one independently readable slice of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadPartition {
    pub id: String,
    pub filter: PartitionFilter,
}

impl ReadPartition {
    pub fn new(id: impl Into<String>, filter: PartitionFilter) -> Self {
        Self { id: id.into(), filter }
    }
}

impl fmt::Display for ReadPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReadPartition[{}: {}]", self.id, self.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_match_only_classification() {
        let empty = PartitionFilter::new();
        assert!(empty.is_empty());
        assert!(!empty.is_match_only());

        let matched = PartitionFilter::new().with_match("active", true);
        assert!(!matched.is_empty());
        assert!(matched.is_match_only());

        let ranged = matched.clone().with_left(Boundary::gte("id", 5i64));
        assert!(!ranged.is_match_only());
    }

    #[test]
    fn child_keeps_matches_drops_boundaries() {
        let filter = PartitionFilter::new()
            .with_match("region", "eu")
            .with_left(Boundary::gte("id", 10i64))
            .with_right(Boundary::lt("id", 20i64));
        let child = filter.child();
        assert!(child.left.is_none());
        assert!(child.right.is_none());
        assert_eq!(child.matches.len(), 1);
    }

    #[test]
    fn pinned_subsumes_same_field_boundaries() {
        let filter = PartitionFilter::new().with_left(Boundary::gte("id", 10i64));
        let pinned = filter.pinned("id", PartitionValue::Integer(10));
        assert!(pinned.is_match_only());
    }

    #[test]
    fn display_is_readable() {
        let filter = PartitionFilter::new()
            .with_left(Boundary::gte("id", 10i64))
            .with_right(Boundary::lt("id", 20i64));
        assert_eq!(filter.to_string(), "id >= 10 AND id < 20");
    }
}
