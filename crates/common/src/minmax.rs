use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::value::PartitionValue;

/// Semantic type key of a partition index field.
///
/// The string form of the key is what the splitter registry is indexed by;
/// custom types use their fully-qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Boolean,
    DateTime,
    Number,
    String,
    Custom(std::string::String),
}

impl ValueType {
    pub fn key(&self) -> &str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::DateTime => "dateTime",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Custom(name) => name,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Observed minimum and maximum of one index field over a filter's rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMinMaxValue {
    pub field_name: String,
    pub min: PartitionValue,
    pub max: PartitionValue,
    pub value_type: ValueType,
}

impl FieldMinMaxValue {
    /// Builds a min/max result, deriving the semantic type from the values.
    pub fn new(
        field_name: impl Into<String>,
        min: impl Into<PartitionValue>,
        max: impl Into<PartitionValue>,
    ) -> Result<Self, Error> {
        let field_name = field_name.into();
        let min = min.into();
        let max = max.into();
        if min > max {
            return Err(Error::InvertedMinMax { field: field_name });
        }
        let value_type = detect_type(&min);
        Ok(Self { field_name, min, max, value_type })
    }

    pub fn is_single_value(&self) -> bool {
        self.min == self.max
    }
}

fn detect_type(value: &PartitionValue) -> ValueType {
    match value {
        PartitionValue::Boolean(_) => ValueType::Boolean,
        PartitionValue::DateTime(_) => ValueType::DateTime,
        PartitionValue::Integer(_) | PartitionValue::Double(_) => ValueType::Number,
        PartitionValue::String(_) => ValueType::String,
        PartitionValue::ObjectId(_) => ValueType::Custom("ObjectId".to_string()),
    }
}
