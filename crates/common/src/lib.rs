//! Common crate
//!
//! Shared data model for Tundra's initial-load partitioning: partition
//! values and filters, field min/max results, table descriptors and the
//! final `ReadPartition` handed to connectors.

pub mod error;
pub mod filter;
pub mod minmax;
pub mod object_id;
pub mod table;
pub mod value;

pub use error::Error;
pub use filter::{Boundary, BoundaryOp, PartitionFilter, ReadPartition};
pub use minmax::{FieldMinMaxValue, ValueType};
pub use object_id::ObjectId;
pub use table::{PartitionIndex, TableSpec};
pub use value::PartitionValue;
