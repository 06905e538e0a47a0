//! Splitter controller: wires configuration and collaborators, performs
//! the initial count and index check, and either short-circuits to a
//! single whole-table partition or drives the concurrent splitting
//! process to completion.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tundra_common::{PartitionFilter, ReadPartition, TableSpec, ValueType};

use crate::collector::{CollectorArena, CollectorState};
use crate::config::Settings;
use crate::error::{Result, SplitError};
use crate::progress::{SplitContext, SplitProgress};
use crate::scheduler::{ParallelWorker, SplitJob, WorkerState};
use crate::source::{ConnectorContext, CountByPartitionFilter, QueryFieldMinMaxValue};
use crate::splitter::{SplitterRegistry, TypeSplitter};

/// Default piece count when the row count is unknown.
const DEFAULT_SPLIT_PIECES: i64 = 200;

/// Outcome of a completed splitting run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    pub partitions: usize,
    pub failed_lineages: usize,
    pub elapsed: Duration,
}

/// Builder-configured entry point of the range-partitioning engine.
///
/// Finalized [`ReadPartition`]s are pushed onto the consumer channel as
/// they become final, possibly out of global range order; the receiver
/// must not assume sequential delivery.
pub struct ReadPartitionSplitter {
    id: String,
    context: Option<ConnectorContext>,
    table: Option<TableSpec>,
    consumer: Option<mpsc::Sender<ReadPartition>>,
    count_by_partition_filter: Option<Arc<dyn CountByPartitionFilter>>,
    query_field_min_max_value: Option<Arc<dyn QueryFieldMinMaxValue>>,
    state_listener: Option<mpsc::Sender<WorkerState>>,
    max_record_in_partition: i64,
    max_record_ratio: i64,
    count_num_of_thread: usize,
    count_is_slow: bool,
    drain_interval: Duration,
    registry: SplitterRegistry,
    running: Arc<AtomicBool>,
}

impl Default for ReadPartitionSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadPartitionSplitter {
    pub fn new() -> Self {
        let defaults = Settings::default();
        Self {
            id: format!("ReadPartitionSplitter_{}", Uuid::new_v4()),
            context: None,
            table: None,
            consumer: None,
            count_by_partition_filter: None,
            query_field_min_max_value: None,
            state_listener: None,
            max_record_in_partition: defaults.max_record_in_partition,
            max_record_ratio: defaults.max_record_ratio,
            count_num_of_thread: defaults.count_num_of_thread,
            count_is_slow: defaults.count_is_slow,
            drain_interval: Duration::from_millis(defaults.drain_interval_ms),
            registry: SplitterRegistry::new(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Applies file/env settings onto the builder knobs.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .max_record_in_partition(settings.max_record_in_partition)
            .max_record_ratio(settings.max_record_ratio)
            .count_num_of_thread(settings.count_num_of_thread)
            .count_is_slow(settings.count_is_slow)
            .drain_interval(Duration::from_millis(settings.drain_interval_ms))
    }

    pub fn context(mut self, context: ConnectorContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn table(mut self, table: TableSpec) -> Self {
        self.table = Some(table);
        self
    }

    pub fn consumer(mut self, consumer: mpsc::Sender<ReadPartition>) -> Self {
        self.consumer = Some(consumer);
        self
    }

    pub fn count_by_partition_filter(mut self, f: Arc<dyn CountByPartitionFilter>) -> Self {
        self.count_by_partition_filter = Some(f);
        self
    }

    pub fn query_field_min_max_value(mut self, f: Arc<dyn QueryFieldMinMaxValue>) -> Self {
        self.query_field_min_max_value = Some(f);
        self
    }

    pub fn state_listener(mut self, listener: mpsc::Sender<WorkerState>) -> Self {
        self.state_listener = Some(listener);
        self
    }

    pub fn max_record_in_partition(mut self, value: i64) -> Self {
        self.max_record_in_partition = value;
        self
    }

    pub fn max_record_ratio(mut self, value: i64) -> Self {
        self.max_record_ratio = value;
        self
    }

    pub fn count_num_of_thread(mut self, value: usize) -> Self {
        self.count_num_of_thread = value;
        self
    }

    pub fn count_is_slow(mut self, value: bool) -> Self {
        self.count_is_slow = value;
        self
    }

    pub fn drain_interval(mut self, value: Duration) -> Self {
        self.drain_interval = value;
        self
    }

    /// Registers a custom type splitter; expected before
    /// `start_splitting`, not concurrently with active jobs.
    pub fn register_custom_splitter(
        mut self,
        value_type: ValueType,
        splitter: Arc<dyn TypeSplitter>,
    ) -> Self {
        self.registry.register(value_type, splitter);
        self
    }

    /// Cooperative stop handle: storing `false` makes in-flight jobs
    /// abandon further recursion at their next check.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Runs the whole splitting process, delivering partitions through
    /// the consumer channel, and returns once every lineage is settled.
    pub async fn start_splitting(self) -> Result<SplitSummary> {
        let started = Instant::now();
        let count_fn = self
            .count_by_partition_filter
            .clone()
            .ok_or(SplitError::MissingCountByPartitionFilter)?;
        let min_max_fn = self
            .query_field_min_max_value
            .clone()
            .ok_or(SplitError::MissingQueryFieldMinMaxValue)?;
        let table = self.table.clone().ok_or(SplitError::MissingTable)?;
        let consumer = self.consumer.clone().ok_or(SplitError::MissingConsumer)?;
        let context = self.context.clone().ok_or(SplitError::MissingConnectorContext)?;

        info!(
            table = %table.name,
            max_record_in_partition = self.max_record_in_partition,
            "start splitting"
        );

        let count = if self.count_is_slow {
            -1
        } else {
            let t = Instant::now();
            let count = count_fn
                .count_by_partition_filter(&context, &table, &PartitionFilter::new())
                .await?;
            info!(count, elapsed_ms = t.elapsed().as_millis() as u64, "initial count");
            count
        };

        let upper_bound = self.max_record_in_partition * self.max_record_ratio;
        info!(
            lower = self.max_record_in_partition,
            upper = upper_bound,
            "record range for a partition"
        );

        let index_fields = table
            .partition_index
            .as_ref()
            .map(|index| index.fields.clone())
            .unwrap_or_default();

        if index_fields.is_empty() || (count != -1 && upper_bound > count) {
            let partition = ReadPartition::new("P_0", PartitionFilter::new());
            info!(count, upper_bound, %partition, "under bound or no partition index, single partition");
            consumer
                .send(partition)
                .await
                .map_err(|_| SplitError::Collaborator("consumer channel closed".into()))?;
            return Ok(SplitSummary {
                partitions: 1,
                failed_lineages: 0,
                elapsed: started.elapsed(),
            });
        }

        let runtime = Arc::new(SplitRuntime {
            context,
            table,
            count_fn,
            min_max_fn,
            registry: self.registry.clone(),
            split_context: SplitContext { index_fields, total: count },
            arena: Mutex::new(CollectorArena::new()),
            consumer,
            emitted: AtomicUsize::new(0),
            max_record_in_partition: self.max_record_in_partition,
            upper_bound,
            count_is_slow: self.count_is_slow,
            running: Arc::clone(&self.running),
        });

        let worker = ParallelWorker::new(
            self.id.clone(),
            self.count_num_of_thread,
            Arc::clone(&self.running),
            Arc::clone(&runtime) as Arc<dyn SplitJob>,
            self.state_listener.clone(),
        );

        let root = {
            let arena = runtime.arena.lock().unwrap_or_else(|e| e.into_inner());
            arena.root()
        };
        worker.submit(SplitProgress {
            filter: PartitionFilter::new(),
            field_pos: 0,
            count,
            collector: root,
        });

        // Periodic drain worker, stopped once long-idle is observed.
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let drain_runtime = Arc::clone(&runtime);
        let interval = self.drain_interval;
        let drain_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        drain_runtime.drain_to_consumer().await;
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        worker.wait_until_long_idle(self.drain_interval).await;
        let _ = shutdown_tx.send(true);
        let _ = drain_task.await;
        // Forced final pass so the last completed partitions are not lost.
        runtime.drain_to_consumer().await;

        if let Some(fatal) = worker.take_fatal() {
            return Err(fatal);
        }

        let summary = SplitSummary {
            partitions: runtime.emitted.load(Ordering::SeqCst),
            failed_lineages: worker.failed_lineages(),
            elapsed: started.elapsed(),
        };
        if summary.failed_lineages > 0 {
            warn!(
                failed_lineages = summary.failed_lineages,
                "split run finished with unfinished lineages"
            );
        } else {
            info!(partitions = summary.partitions, "split run finished");
        }
        Ok(summary)
    }
}

/// Shared state of one concurrent splitting run; doubles as the job
/// handler executed by the scheduler.
struct SplitRuntime {
    context: ConnectorContext,
    table: TableSpec,
    count_fn: Arc<dyn CountByPartitionFilter>,
    min_max_fn: Arc<dyn QueryFieldMinMaxValue>,
    registry: SplitterRegistry,
    split_context: SplitContext,
    arena: Mutex<CollectorArena>,
    consumer: mpsc::Sender<ReadPartition>,
    emitted: AtomicUsize,
    max_record_in_partition: i64,
    upper_bound: i64,
    count_is_slow: bool,
    running: Arc<AtomicBool>,
}

impl SplitRuntime {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn arena(&self) -> std::sync::MutexGuard<'_, CollectorArena> {
        self.arena.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Piece count for one filter: local count over the partition bound,
    /// rounded up, or the fixed default when the count is unknown.
    fn pieces_for(&self, count: i64) -> usize {
        let times = if count >= 0 {
            count / self.max_record_in_partition
                + i64::from(count % self.max_record_in_partition != 0)
        } else {
            DEFAULT_SPLIT_PIECES
        };
        times.max(1) as usize
    }

    /// Emits every not-yet-delivered finalized partition, assigning ids
    /// in emission order.
    async fn drain_to_consumer(&self) {
        let ready = self.arena().drain();
        for (filter, count) in ready {
            let n = self.emitted.fetch_add(1, Ordering::SeqCst);
            let partition = ReadPartition::new(format!("P_{}", n), filter);
            debug!(%partition, count, "emitting partition");
            if self.consumer.send(partition).await.is_err() {
                warn!("consumer channel closed, stopping split run");
                self.running.store(false, Ordering::SeqCst);
                return;
            }
        }
    }
}

#[async_trait]
impl SplitJob for SplitRuntime {
    async fn run(&self, progress: SplitProgress, worker: &ParallelWorker) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }
        let fields = &self.split_context.index_fields;
        if progress.field_pos >= fields.len() {
            // The composite index is exhausted; nothing finer to split on.
            warn!(
                filter = %progress.filter,
                "partition index exhausted, accepting oversized partition"
            );
            let mut arena = self.arena();
            arena.add_partition(progress.collector, progress.filter, progress.count);
            arena.advance(progress.collector, CollectorState::Done);
            return Ok(());
        }

        let pieces = self.pieces_for(progress.count);
        let field = &fields[progress.field_pos];
        let min_max = self
            .min_max_fn
            .query_field_min_max_value(&self.context, &self.table, &progress.filter, field)
            .await?;
        let splitter = self.registry.resolve(&min_max.value_type).ok_or_else(|| {
            SplitError::MissingTypeSplitter { type_key: min_max.value_type.key().to_string() }
        })?;
        self.arena().advance(progress.collector, CollectorState::MinMax);

        let sub_filters = splitter.split(&progress.filter, &min_max, pieces);
        self.arena().advance(progress.collector, CollectorState::Split);
        debug!(
            field,
            requested = pieces,
            produced = sub_filters.len(),
            "split into sub-filters"
        );

        let mut current = progress.collector;
        let mut owned = vec![progress.collector];
        for sub_filter in sub_filters {
            if !self.is_running() {
                break;
            }
            let sub_count = if self.count_is_slow {
                -1
            } else {
                self.count_fn
                    .count_by_partition_filter(&self.context, &self.table, &sub_filter)
                    .await?
            };
            self.arena().advance(current, CollectorState::Count);

            let no_boundary = sub_filter.is_match_only();
            if no_boundary || (sub_count >= 0 && sub_count > self.upper_bound) {
                // Too large (or unsplittable by range): recurse on a child
                // collector and move subsequent acceptances to a fresh
                // sibling so they are not attributed to the recursing one.
                let (child, sibling) = {
                    let mut arena = self.arena();
                    let child = arena.alloc();
                    arena.link_next(current, child);
                    let sibling = arena.alloc();
                    arena.advance(sibling, CollectorState::Count);
                    arena.link_next(child, sibling);
                    (child, sibling)
                };
                // A ranged filter narrows the same field further; a
                // match-only one has no range left on this field and
                // advances to the next composite-index field.
                let next_pos = if no_boundary {
                    progress.field_pos + 1
                } else {
                    progress.field_pos
                };
                worker.submit(SplitProgress {
                    filter: sub_filter,
                    field_pos: next_pos,
                    count: sub_count,
                    collector: child,
                });
                current = sibling;
                owned.push(sibling);
            } else {
                self.arena().add_partition(current, sub_filter, sub_count);
            }
        }

        if self.is_running() {
            let mut arena = self.arena();
            for id in owned {
                arena.advance(id, CollectorState::Done);
            }
        }
        Ok(())
    }
}
