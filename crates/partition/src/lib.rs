//! Adaptive range-partitioning engine for Tundra initial loads.
//!
//! Splits very large source tables into row ranges of roughly bounded
//! estimated size without a full table scan, so many workers can read
//! disjoint ranges in parallel. Range estimates are approximate and are
//! refined by recursive re-splitting; the number of `COUNT` and
//! `MIN/MAX` queries against the source stays limited.
//!
//! Entry point is [`ReadPartitionSplitter`]: configure the source
//! collaborators and a consumer channel, then `start_splitting()`.
//! Finalized partitions arrive on the channel in the order they become
//! final, not necessarily in range order.

pub mod collector;
pub mod config;
pub mod controller;
pub mod error;
pub mod progress;
pub mod scheduler;
pub mod source;
pub mod splitter;

pub use config::Settings;
pub use controller::{ReadPartitionSplitter, SplitSummary};
pub use error::{Result, SplitError};
pub use scheduler::{ParallelWorker, SplitJob, WorkerState};
pub use source::{ConnectorContext, CountByPartitionFilter, QueryFieldMinMaxValue};
pub use splitter::{SplitterRegistry, TypeSplitter};
