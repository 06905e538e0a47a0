//! Collector arena: one record per split lineage, chained by explicit
//! handles instead of shared mutable links. The chain from the root
//! enumerates collectors in per-lineage ascending range order, which is
//! what the drain worker walks.

use tundra_common::PartitionFilter;

/// Handle into the arena. Collectors are never removed.
pub type CollectorId = usize;

/// Forward-only lifecycle of one collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CollectorState {
    Created,
    MinMax,
    Split,
    Count,
    Done,
}

/// Accumulates finalized partitions and their counts for one lineage.
#[derive(Debug)]
pub struct Collector {
    pub state: CollectorState,
    partitions: Vec<(PartitionFilter, i64)>,
    drained: usize,
    next: Option<CollectorId>,
}

impl Collector {
    fn new() -> Self {
        Self { state: CollectorState::Created, partitions: Vec::new(), drained: 0, next: None }
    }
}

/// Growable table of collectors referenced by integer handle; the root
/// lineage sits at index 0.
#[derive(Debug)]
pub struct CollectorArena {
    slots: Vec<Collector>,
}

impl CollectorArena {
    pub fn new() -> Self {
        Self { slots: vec![Collector::new()] }
    }

    pub const fn root(&self) -> CollectorId {
        0
    }

    pub fn alloc(&mut self) -> CollectorId {
        self.slots.push(Collector::new());
        self.slots.len() - 1
    }

    /// Inserts `id` into the chain right after `after`, keeping whatever
    /// followed `after` behind `id`. Insertion (not overwrite) is what
    /// keeps the chain in ascending range order when a lineage recurses.
    pub fn link_next(&mut self, after: CollectorId, id: CollectorId) {
        let tail = self.slots[after].next.take();
        self.slots[id].next = tail;
        self.slots[after].next = Some(id);
    }

    /// Advances a collector's state; backward transitions are ignored so
    /// a `Done` collector never mutates again.
    pub fn advance(&mut self, id: CollectorId, state: CollectorState) {
        let slot = &mut self.slots[id];
        if state > slot.state {
            slot.state = state;
        }
    }

    pub fn state(&self, id: CollectorId) -> CollectorState {
        self.slots[id].state
    }

    /// Records an accepted partition. Accepted partitions are final from
    /// this point on, whatever the collector's state.
    pub fn add_partition(&mut self, id: CollectorId, filter: PartitionFilter, count: i64) {
        self.slots[id].partitions.push((filter, count));
    }

    /// Takes every not-yet-drained finalized partition, walking the chain
    /// from the root so partitions come out in per-lineage range order.
    pub fn drain(&mut self) -> Vec<(PartitionFilter, i64)> {
        let mut out = Vec::new();
        let mut cursor = Some(self.root());
        while let Some(id) = cursor {
            let slot = &mut self.slots[id];
            if slot.drained < slot.partitions.len() {
                out.extend(slot.partitions[slot.drained..].iter().cloned());
                slot.drained = slot.partitions.len();
            }
            cursor = slot.next;
        }
        out
    }

    /// Collectors that never reached `Done`; nonzero after a run means a
    /// lineage failed mid-flight.
    pub fn unfinished(&self) -> usize {
        self.slots.iter().filter(|c| c.state != CollectorState::Done).count()
    }
}

impl Default for CollectorArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tundra_common::Boundary;

    fn filter(lo: i64) -> PartitionFilter {
        PartitionFilter::new().with_left(Boundary::gte("id", lo))
    }

    #[test]
    fn state_machine_is_forward_only() {
        let mut arena = CollectorArena::new();
        let id = arena.root();
        arena.advance(id, CollectorState::Split);
        arena.advance(id, CollectorState::MinMax);
        assert_eq!(arena.state(id), CollectorState::Split);
        arena.advance(id, CollectorState::Done);
        arena.advance(id, CollectorState::Count);
        assert_eq!(arena.state(id), CollectorState::Done);
    }

    #[test]
    fn link_next_inserts_preserving_tail() {
        let mut arena = CollectorArena::new();
        let root = arena.root();
        // root recurses: child then sibling, as the split job does
        let child = arena.alloc();
        arena.link_next(root, child);
        let sibling = arena.alloc();
        arena.link_next(child, sibling);
        // child recurses in turn
        let grandchild = arena.alloc();
        arena.link_next(child, grandchild);
        let child_sibling = arena.alloc();
        arena.link_next(grandchild, child_sibling);

        arena.add_partition(root, filter(0), 1);
        arena.add_partition(child, filter(10), 1);
        arena.add_partition(grandchild, filter(20), 1);
        arena.add_partition(child_sibling, filter(30), 1);
        arena.add_partition(sibling, filter(40), 1);

        let order: Vec<i64> = arena
            .drain()
            .into_iter()
            .map(|(f, _)| match f.left.unwrap().value {
                tundra_common::PartitionValue::Integer(v) => v,
                _ => panic!("integer boundary expected"),
            })
            .collect();
        assert_eq!(order, vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn drain_is_incremental() {
        let mut arena = CollectorArena::new();
        arena.add_partition(arena.root(), filter(0), 5);
        assert_eq!(arena.drain().len(), 1);
        assert!(arena.drain().is_empty());
        arena.add_partition(arena.root(), filter(1), 5);
        assert_eq!(arena.drain().len(), 1);
    }
}
