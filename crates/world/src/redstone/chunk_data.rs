//! Simulator-owned per-chunk metadata: the wire-connectivity cache, the
//! dirty-set of positions awaiting re-evaluation, and the mechanism delay
//! ledger. None of this is part of the persisted block grid.

use super::connectivity::WireConnectivity;
use super::position::BlockPos;
use crate::chunk::{ChunkPos, LocalPos};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::trace;

/// Insertion-ordered set of chunk-relative positions scheduled for
/// re-evaluation. Enqueueing an already-queued position is a no-op, so a
/// position appears at most once and keeps its original drain slot.
#[derive(Debug, Default)]
pub(crate) struct DirtySet {
    queue: VecDeque<LocalPos>,
    queued: HashSet<LocalPos>,
}

impl DirtySet {
    /// Enqueue a position. Returns whether it was newly queued.
    pub fn push(&mut self, pos: LocalPos) -> bool {
        if !self.queued.insert(pos) {
            return false;
        }
        self.queue.push_back(pos);
        true
    }

    /// Pop the oldest queued position.
    pub fn pop(&mut self) -> Option<LocalPos> {
        let pos = self.queue.pop_front()?;
        self.queued.remove(&pos);
        Some(pos)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// A pending mechanism flip: apply after `ticks_left` more chunk drains.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MechanismDelay {
    pub ticks_left: u32,
    pub power_on: bool,
}

/// One instance per valid chunk; dies with the chunk.
#[derive(Debug, Default)]
pub(crate) struct ChunkRedstoneData {
    wire_states: HashMap<LocalPos, WireConnectivity>,
    dirty: DirtySet,
    delays: BTreeMap<LocalPos, MechanismDelay>,
}

/// All per-chunk simulator data, keyed by chunk. Presence of an entry is the
/// validity check for cross-chunk writes: data for a chunk exists exactly
/// while that chunk is valid, so every accessor here degrades to a no-op for
/// missing chunks instead of faulting.
#[derive(Debug, Default)]
pub(crate) struct RedstoneStore {
    chunks: BTreeMap<ChunkPos, ChunkRedstoneData>,
}

impl RedstoneStore {
    pub fn create_chunk_data(&mut self, chunk: ChunkPos) {
        self.chunks.entry(chunk).or_default();
    }

    pub fn drop_chunk_data(&mut self, chunk: ChunkPos) {
        self.chunks.remove(&chunk);
    }

    pub fn is_valid(&self, chunk: ChunkPos) -> bool {
        self.chunks.contains_key(&chunk)
    }

    /// Valid chunks in deterministic (x, then z) order.
    pub fn chunk_positions(&self) -> Vec<ChunkPos> {
        self.chunks.keys().copied().collect()
    }

    pub fn wire_connectivity(&self, pos: BlockPos) -> Option<WireConnectivity> {
        let (chunk, local) = pos.split()?;
        self.chunks.get(&chunk)?.wire_states.get(&local).copied()
    }

    /// Cache a wire's connectivity record. Returns whether the stored record
    /// changed (a fresh insert counts as unchanged: there was nothing to
    /// re-notify about).
    pub fn set_wire_connectivity(&mut self, pos: BlockPos, record: WireConnectivity) -> bool {
        let Some((chunk, local)) = pos.split() else {
            return false;
        };
        let Some(data) = self.chunks.get_mut(&chunk) else {
            return false;
        };
        match data.wire_states.insert(local, record) {
            Some(previous) => previous != record,
            None => false,
        }
    }

    /// Reciprocal write into a (possibly neighboring) chunk's record.
    /// Returns whether a stored record changed; silently skipped when the
    /// target chunk is invalid or holds no record.
    pub fn update_wire_direction(
        &mut self,
        pos: BlockPos,
        offset: super::position::Offset,
        connection: super::connectivity::WireConnection,
    ) -> bool {
        let Some((chunk, local)) = pos.split() else {
            return false;
        };
        let Some(data) = self.chunks.get_mut(&chunk) else {
            return false;
        };
        let Some(record) = data.wire_states.get_mut(&local) else {
            return false;
        };
        if record.get(offset) == connection {
            return false;
        }
        record.set(offset, connection);
        true
    }

    pub fn remove_wire_state(&mut self, pos: BlockPos) {
        if let Some((chunk, local)) = pos.split() {
            if let Some(data) = self.chunks.get_mut(&chunk) {
                data.wire_states.remove(&local);
            }
        }
    }

    /// Enqueue a position into its chunk's dirty-set. No-op for invalid
    /// chunks or out-of-height positions.
    pub fn enqueue(&mut self, pos: BlockPos) {
        let Some((chunk, local)) = pos.split() else {
            return;
        };
        if let Some(data) = self.chunks.get_mut(&chunk) {
            if data.dirty.push(local) {
                trace!(x = pos.x, y = pos.y, z = pos.z, "position dirtied");
            }
        }
    }

    pub fn pop_dirty(&mut self, chunk: ChunkPos) -> Option<LocalPos> {
        self.chunks.get_mut(&chunk)?.dirty.pop()
    }

    pub fn dirty_len(&self, chunk: ChunkPos) -> usize {
        self.chunks.get(&chunk).map_or(0, |data| data.dirty.len())
    }

    /// Schedule a mechanism flip unless one is already pending there.
    pub fn schedule_delay(&mut self, pos: BlockPos, ticks: u32, power_on: bool) {
        let Some((chunk, local)) = pos.split() else {
            return;
        };
        if let Some(data) = self.chunks.get_mut(&chunk) {
            data.delays
                .entry(local)
                .or_insert(MechanismDelay { ticks_left: ticks, power_on });
        }
    }

    pub fn delay_info(&self, pos: BlockPos) -> Option<MechanismDelay> {
        let (chunk, local) = pos.split()?;
        self.chunks.get(&chunk)?.delays.get(&local).copied()
    }

    pub fn clear_delay(&mut self, pos: BlockPos) {
        if let Some((chunk, local)) = pos.split() {
            if let Some(data) = self.chunks.get_mut(&chunk) {
                data.delays.remove(&local);
            }
        }
    }

    /// Decrement every pending delay in the chunk; positions that just became
    /// due are returned in deterministic order for re-evaluation.
    pub fn advance_delays(&mut self, chunk: ChunkPos) -> Vec<LocalPos> {
        let Some(data) = self.chunks.get_mut(&chunk) else {
            return Vec::new();
        };
        let mut due = Vec::new();
        for (local, delay) in data.delays.iter_mut() {
            if delay.ticks_left > 0 {
                delay.ticks_left -= 1;
                if delay.ticks_left == 0 {
                    due.push(*local);
                }
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redstone::connectivity::WireConnection;

    #[test]
    fn dirty_set_is_insertion_ordered_and_idempotent() {
        let mut set = DirtySet::default();
        assert!(set.push(LocalPos::new(3, 0, 0)));
        assert!(set.push(LocalPos::new(1, 0, 0)));
        // Re-enqueue keeps the original slot.
        assert!(!set.push(LocalPos::new(3, 0, 0)));
        assert!(set.push(LocalPos::new(2, 0, 0)));

        assert_eq!(set.pop(), Some(LocalPos::new(3, 0, 0)));
        assert_eq!(set.pop(), Some(LocalPos::new(1, 0, 0)));
        assert_eq!(set.pop(), Some(LocalPos::new(2, 0, 0)));
        assert_eq!(set.pop(), None);
    }

    #[test]
    fn dirty_set_allows_requeue_after_pop() {
        let mut set = DirtySet::default();
        set.push(LocalPos::new(0, 0, 0));
        assert_eq!(set.pop(), Some(LocalPos::new(0, 0, 0)));
        assert!(set.push(LocalPos::new(0, 0, 0)));
    }

    #[test]
    fn enqueue_ignores_invalid_chunks() {
        let mut store = RedstoneStore::default();
        store.enqueue(BlockPos::new(0, 10, 0));
        assert_eq!(store.dirty_len(ChunkPos::new(0, 0)), 0);

        store.create_chunk_data(ChunkPos::new(0, 0));
        store.enqueue(BlockPos::new(0, 10, 0));
        assert_eq!(store.dirty_len(ChunkPos::new(0, 0)), 1);
    }

    #[test]
    fn wire_record_round_trip() {
        let mut store = RedstoneStore::default();
        store.create_chunk_data(ChunkPos::new(0, 0));

        let pos = BlockPos::new(1, 20, 1);
        let mut record = WireConnectivity::default();

        // First insert reports no change to re-notify.
        assert!(!store.set_wire_connectivity(pos, record));
        record.set((1, 0, 0), WireConnection::Side);
        assert!(store.set_wire_connectivity(pos, record));
        assert!(!store.set_wire_connectivity(pos, record));
        assert_eq!(store.wire_connectivity(pos), Some(record));

        store.remove_wire_state(pos);
        assert_eq!(store.wire_connectivity(pos), None);
    }

    #[test]
    fn reciprocal_write_requires_valid_chunk_and_record() {
        let mut store = RedstoneStore::default();
        let pos = BlockPos::new(-1, 20, 0);

        // Chunk invalid: skipped.
        assert!(!store.update_wire_direction(pos, (1, 0, 0), WireConnection::Side));

        store.create_chunk_data(ChunkPos::new(-1, 0));
        // Valid but no record yet: still skipped.
        assert!(!store.update_wire_direction(pos, (1, 0, 0), WireConnection::Side));

        store.set_wire_connectivity(pos, WireConnectivity::default());
        assert!(store.update_wire_direction(pos, (1, 0, 0), WireConnection::Side));
        assert!(!store.update_wire_direction(pos, (1, 0, 0), WireConnection::Side));
    }

    #[test]
    fn delays_tick_down_once_per_advance() {
        let mut store = RedstoneStore::default();
        store.create_chunk_data(ChunkPos::new(0, 0));

        let pos = BlockPos::new(4, 8, 4);
        store.schedule_delay(pos, 2, true);
        // A second schedule while pending is ignored.
        store.schedule_delay(pos, 9, false);

        assert!(store.advance_delays(ChunkPos::new(0, 0)).is_empty());
        let due = store.advance_delays(ChunkPos::new(0, 0));
        assert_eq!(due, vec![LocalPos::new(4, 8, 4)]);
        assert!(store.delay_info(pos).is_some());

        store.clear_delay(pos);
        assert!(store.delay_info(pos).is_none());
    }
}
