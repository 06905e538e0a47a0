use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::object_id::ObjectId;

/// A single value of a partition index field.
///
/// Values of the same variant order by their natural ordering; values of
/// different variants (a caller bug, min and max always share a type) fall
/// back to ordering by variant tag so that sorting stays total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartitionValue {
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Integer(i64),
    Double(f64),
    String(String),
    ObjectId(ObjectId),
}

impl PartitionValue {
    fn tag(&self) -> u8 {
        match self {
            PartitionValue::Boolean(_) => 0,
            PartitionValue::DateTime(_) => 1,
            PartitionValue::Integer(_) => 2,
            PartitionValue::Double(_) => 3,
            PartitionValue::String(_) => 4,
            PartitionValue::ObjectId(_) => 5,
        }
    }

    /// Numeric view used by the number splitter; integers promote losslessly
    /// for small magnitudes, doubles pass through.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PartitionValue::Integer(v) => Some(*v as f64),
            PartitionValue::Double(v) => Some(*v),
            _ => None,
        }
    }
}

impl PartialOrd for PartitionValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for PartitionValue {}

impl Ord for PartitionValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use PartitionValue::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Double(a), Double(b)) => a.total_cmp(b),
            // numerically equal mixed pairs still order by tag, keeping
            // Ord consistent with the derived PartialEq
            (Integer(a), Double(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Double(a), Integer(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (String(a), String(b)) => a.cmp(b),
            (ObjectId(a), ObjectId(b)) => a.cmp(b),
            (a, b) => a.tag().cmp(&b.tag()),
        }
    }
}

impl fmt::Display for PartitionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionValue::Boolean(v) => write!(f, "{}", v),
            PartitionValue::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            PartitionValue::Integer(v) => write!(f, "{}", v),
            PartitionValue::Double(v) => write!(f, "{}", v),
            PartitionValue::String(v) => write!(f, "'{}'", v),
            PartitionValue::ObjectId(v) => write!(f, "ObjectId(\"{}\")", v),
        }
    }
}

impl From<bool> for PartitionValue {
    fn from(v: bool) -> Self {
        PartitionValue::Boolean(v)
    }
}

impl From<i64> for PartitionValue {
    fn from(v: i64) -> Self {
        PartitionValue::Integer(v)
    }
}

impl From<f64> for PartitionValue {
    fn from(v: f64) -> Self {
        PartitionValue::Double(v)
    }
}

impl From<&str> for PartitionValue {
    fn from(v: &str) -> Self {
        PartitionValue::String(v.to_string())
    }
}

impl From<String> for PartitionValue {
    fn from(v: String) -> Self {
        PartitionValue::String(v)
    }
}

impl From<DateTime<Utc>> for PartitionValue {
    fn from(v: DateTime<Utc>) -> Self {
        PartitionValue::DateTime(v)
    }
}

impl From<ObjectId> for PartitionValue {
    fn from(v: ObjectId) -> Self {
        PartitionValue::ObjectId(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_numeric_ordering() {
        assert!(PartitionValue::Integer(2) < PartitionValue::Double(2.5));
        assert!(PartitionValue::Double(3.0) > PartitionValue::Integer(2));
    }

    #[test]
    fn string_ordering_is_lexicographic() {
        assert!(PartitionValue::from("abc") < PartitionValue::from("abd"));
    }
}
