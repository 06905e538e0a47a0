use async_trait::async_trait;
use uuid::Uuid;

use tundra_common::{FieldMinMaxValue, PartitionFilter, TableSpec};

use crate::error::Result;

/// Execution context handed through to every collaborator call.
#[derive(Debug, Clone)]
pub struct ConnectorContext {
    pub connector: String,
    pub run_id: String,
}

impl ConnectorContext {
    pub fn new(connector: impl Into<String>) -> Self {
        Self { connector: connector.into(), run_id: Uuid::new_v4().to_string() }
    }
}

/// Counts the rows of a table matching a partition filter.
///
/// This is a blocking database call on the source; implementations run it
/// over the connector's own driver. A source configured with
/// `count_is_slow` never has this invoked by the engine.
#[async_trait]
pub trait CountByPartitionFilter: Send + Sync {
    async fn count_by_partition_filter(
        &self,
        context: &ConnectorContext,
        table: &TableSpec,
        filter: &PartitionFilter,
    ) -> Result<i64>;
}

/// Fetches one index field's min and max value over a partition filter.
///
/// The returned `value_type` must resolve in the splitter registry,
/// otherwise the run fails with a missing-strategy error.
#[async_trait]
pub trait QueryFieldMinMaxValue: Send + Sync {
    async fn query_field_min_max_value(
        &self,
        context: &ConnectorContext,
        table: &TableSpec,
        filter: &PartitionFilter,
        field_name: &str,
    ) -> Result<FieldMinMaxValue>;
}
