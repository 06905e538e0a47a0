use tundra_common::PartitionFilter;

use crate::collector::CollectorId;

/// Immutable context shared by every job of one splitting run.
#[derive(Debug, Clone)]
pub struct SplitContext {
    /// Ordered partition-index fields; composite indexes have several.
    pub index_fields: Vec<String>,
    /// Whole-table row estimate at start, -1 when counting is skipped.
    pub total: i64,
}

/// Per-job state, created fresh for every recursive split and never
/// shared between concurrent jobs.
#[derive(Debug, Clone)]
pub struct SplitProgress {
    /// Active filter this job is subdividing.
    pub filter: PartitionFilter,
    /// Which index field to split on; re-splitting a still-ranged filter
    /// keeps the position, a match-only escalation advances it.
    pub field_pos: usize,
    /// Estimated row count for this filter's range, -1 when unknown.
    pub count: i64,
    /// Collector owning whatever this job finalizes.
    pub collector: CollectorId,
}
