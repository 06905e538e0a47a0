use serde::{Deserialize, Serialize};

/// The ordered set of fields usable to bound row ranges for splitting.
/// Composite indexes list their fields in index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionIndex {
    pub fields: Vec<String>,
}

impl PartitionIndex {
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { fields: fields.into_iter().map(Into::into).collect() }
    }
}

/// Source table descriptor, as much of the schema as splitting needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub partition_index: Option<PartitionIndex>,
}

impl TableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), partition_index: None }
    }

    pub fn with_partition_index(mut self, index: PartitionIndex) -> Self {
        self.partition_index = Some(index);
        self
    }
}
