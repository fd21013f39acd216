//! Fixed-capacity slot allocator for cargo units.
//!
//! The pool owns every live [`CargoUnit`]; lists hold [`UnitId`] handles into
//! it. Slot indices are stable for a unit's lifetime, allocation reuses the
//! lowest free slot, and freed slots are tombstoned rather than compacted so
//! persisted references stay valid. The pool is plain owned state passed
//! explicitly (`&mut UnitPool`) to every operation that allocates or frees.

use crate::id::{NodeId, OrderId, SourceId, SourceKind, UnitId};
use crate::unit::CargoUnit;
use serde::{Deserialize, Serialize};

/// Errors raised by pool operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("cargo unit pool has no free slot (capacity {0})")]
    CapacityExhausted(u32),
}

/// Fixed-capacity pool of cargo units with stable integer identities.
///
/// Storage grows lazily toward the capacity fixed at construction; it never
/// shrinks. `first_free` and `live` are bookkeeping over the persisted slots
/// and are re-derived by [`after_load`](Self::after_load) instead of being
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPool {
    capacity: u32,
    slots: Vec<Option<CargoUnit>>,
    /// Lowest slot index that may be free. Everything below it is occupied.
    #[serde(skip)]
    first_free: u32,
    #[serde(skip)]
    live: u32,
}

impl UnitPool {
    /// Default capacity, a little over 16 million units, matching the slot
    /// budget the surrounding simulation plans for.
    pub const DEFAULT_CAPACITY: u32 = 0xFFF000;

    /// Create an empty pool holding at most `capacity` units.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            slots: Vec::new(),
            first_free: 0,
            live: 0,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of live (non-tombstoned) units.
    pub fn live_units(&self) -> u32 {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Place `unit` in the lowest free slot and return its identity.
    pub fn allocate(&mut self, unit: CargoUnit) -> Result<UnitId, PoolError> {
        let mut idx = self.first_free as usize;
        while idx < self.slots.len() && self.slots[idx].is_some() {
            idx += 1;
        }
        if idx == self.slots.len() {
            if self.slots.len() as u32 >= self.capacity {
                return Err(PoolError::CapacityExhausted(self.capacity));
            }
            self.slots.push(Some(unit));
        } else {
            self.slots[idx] = Some(unit);
        }
        self.first_free = idx as u32 + 1;
        self.live += 1;
        Ok(UnitId(idx as u32))
    }

    /// Look up a live unit. `None` for tombstones and out-of-range ids.
    pub fn get(&self, id: UnitId) -> Option<&CargoUnit> {
        self.slots.get(id.0 as usize).and_then(|slot| slot.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut CargoUnit> {
        self.slots.get_mut(id.0 as usize).and_then(|slot| slot.as_mut())
    }

    /// Tombstone the slot and hand the unit back. `None` if it was already
    /// free.
    pub fn free(&mut self, id: UnitId) -> Option<CargoUnit> {
        let unit = self.slots.get_mut(id.0 as usize).and_then(|slot| slot.take());
        if unit.is_some() {
            self.first_free = self.first_free.min(id.0);
            self.live -= 1;
        }
        unit
    }

    /// All live unit ids at or above `start`, in slot order. Finite,
    /// restartable, skips tombstones.
    pub fn ids_from(&self, start: UnitId) -> impl Iterator<Item = UnitId> + '_ {
        let begin = (start.0 as usize).min(self.slots.len());
        self.slots[begin..]
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(move |(offset, _)| UnitId((begin + offset) as u32))
    }

    /// All live unit ids, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.ids_from(UnitId(0))
    }

    /// Slot-occupancy projection for the persistence collaborator, in slot
    /// order over every slot ever touched.
    pub fn occupancy(&self) -> impl Iterator<Item = bool> + '_ {
        self.slots.iter().map(|slot| slot.is_some())
    }

    /// Accrue feeder payment on a live unit. Called by the economy
    /// collaborator when it computes a transfer credit for an intermediate
    /// carrier; the amount is paid out on final delivery. If the unit
    /// currently sits in a carrier list, that list's share cache must be
    /// re-derived with `invalidate_cache`; units waiting at nodes need no
    /// follow-up.
    pub fn accrue_feeder_share(&mut self, id: UnitId, share: crate::unit::Money) {
        if let Some(unit) = self.get_mut(id) {
            unit.add_feeder_share(share);
        }
    }

    /// Drop every unit. Called on simulation reset/teardown; lists must
    /// forget their membership via `clear_on_reset`.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.first_free = 0;
        self.live = 0;
    }

    /// Post-persistence-load fix-up: re-derives the free-slot bookkeeping
    /// (which is not serialized) and destroys any zero-quantity unit a stale
    /// or hand-edited save may carry.
    pub fn after_load(&mut self) {
        let mut first_free = self.slots.len() as u32;
        let mut live = 0;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|unit| unit.quantity() == 0) {
                *slot = None;
            }
            match slot {
                Some(_) => live += 1,
                None => first_free = first_free.min(idx as u32),
            }
        }
        self.first_free = first_free;
        self.live = live;
    }

    // -- pool-wide invalidation sweeps ---------------------------------------
    //
    // These run when an entity disappears from the simulation and every unit
    // pointing at it must stop doing so. They are O(pool size) and
    // intentionally rare. A sweep can change `next_hop_order` on units that
    // sit in node lists, so any node list that may hold affected units must
    // re-derive its hop index with `invalidate_cache` afterwards.

    /// Clear production provenance on every unit that came from the given
    /// source. Used when an industry/town is removed.
    pub fn invalidate_all_from(&mut self, kind: SourceKind, id: SourceId) {
        for unit in self.slots.iter_mut().flatten() {
            if unit.origin_kind() == Some(kind) && unit.origin_id() == Some(id) {
                unit.clear_origin_source();
            }
        }
    }

    /// Clear the origin node on every unit first picked up there. Used when
    /// a transfer node is removed.
    pub fn invalidate_all_from_node(&mut self, node: NodeId) {
        for unit in self.slots.iter_mut().flatten() {
            if unit.origin_node() == Some(node) {
                unit.clear_origin_node();
            }
        }
    }

    /// Clear the next-hop hints on every unit routed via the given order or
    /// unload node. Used when an order or its unload target goes away.
    pub fn invalidate_all_to_hop(&mut self, order: OrderId, unload_node: NodeId) {
        for unit in self.slots.iter_mut().flatten() {
            if unit.next_hop_order() == Some(order) || unit.next_hop_node() == Some(unload_node) {
                unit.set_next_hop(None, None);
            }
        }
    }

    /// Clear destination intent (and the now-meaningless hop hints) on every
    /// unit headed for the given destination. Used when it is removed.
    pub fn invalidate_all_to(&mut self, kind: SourceKind, id: SourceId) {
        for unit in self.slots.iter_mut().flatten() {
            if unit.dest_kind() == Some(kind) && unit.dest_id() == Some(id) {
                unit.clear_destination();
                unit.set_next_hop(None, None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TileIndex;

    fn unit(quantity: u16) -> CargoUnit {
        CargoUnit::new(quantity, TileIndex(0)).unwrap()
    }

    #[test]
    fn allocate_reuses_lowest_free_slot() {
        let mut pool = UnitPool::new(16);
        let a = pool.allocate(unit(1)).unwrap();
        let b = pool.allocate(unit(2)).unwrap();
        let c = pool.allocate(unit(3)).unwrap();
        assert_eq!((a, b, c), (UnitId(0), UnitId(1), UnitId(2)));

        pool.free(b);
        let d = pool.allocate(unit(4)).unwrap();
        assert_eq!(d, UnitId(1), "freed slot 1 is the lowest free slot");
        assert_eq!(pool.get(d).unwrap().quantity(), 4);
    }

    #[test]
    fn exhaustion_is_reported_not_fatal() {
        let mut pool = UnitPool::new(2);
        pool.allocate(unit(1)).unwrap();
        pool.allocate(unit(2)).unwrap();
        assert_eq!(
            pool.allocate(unit(3)).unwrap_err(),
            PoolError::CapacityExhausted(2)
        );
        // Freeing restores allocatability.
        pool.free(UnitId(0));
        assert!(pool.allocate(unit(3)).is_ok());
    }

    #[test]
    fn iteration_skips_tombstones_and_restarts() {
        let mut pool = UnitPool::new(8);
        for q in 1..=5 {
            pool.allocate(unit(q)).unwrap();
        }
        pool.free(UnitId(1));
        pool.free(UnitId(3));

        let all: Vec<_> = pool.ids().collect();
        assert_eq!(all, vec![UnitId(0), UnitId(2), UnitId(4)]);

        let resumed: Vec<_> = pool.ids_from(UnitId(2)).collect();
        assert_eq!(resumed, vec![UnitId(2), UnitId(4)]);

        // Restarting past the end yields nothing.
        assert_eq!(pool.ids_from(UnitId(100)).count(), 0);
    }

    #[test]
    fn occupancy_projects_every_touched_slot() {
        let mut pool = UnitPool::new(8);
        for q in 1..=3 {
            pool.allocate(unit(q)).unwrap();
        }
        pool.free(UnitId(1));
        let occupied: Vec<bool> = pool.occupancy().collect();
        assert_eq!(occupied, vec![true, false, true]);
    }

    #[test]
    fn free_twice_is_harmless() {
        let mut pool = UnitPool::new(4);
        let id = pool.allocate(unit(9)).unwrap();
        assert!(pool.free(id).is_some());
        assert!(pool.free(id).is_none());
        assert_eq!(pool.live_units(), 0);
    }

    #[test]
    fn clear_empties_everything() {
        let mut pool = UnitPool::new(4);
        pool.allocate(unit(1)).unwrap();
        pool.allocate(unit(2)).unwrap();
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.ids().count(), 0);
        assert_eq!(pool.allocate(unit(3)).unwrap(), UnitId(0));
    }

    #[test]
    fn after_load_rebuilds_bookkeeping() {
        let mut pool = UnitPool::new(8);
        pool.allocate(unit(1)).unwrap();
        pool.allocate(unit(2)).unwrap();
        pool.free(UnitId(0));

        // Simulate a persistence round-trip: bookkeeping fields are skipped.
        pool.first_free = 0;
        pool.live = 0;
        pool.after_load();

        assert_eq!(pool.live_units(), 1);
        assert_eq!(pool.allocate(unit(3)).unwrap(), UnitId(0));
    }

    #[test]
    fn invalidate_all_from_clears_matching_provenance() {
        let mut pool = UnitPool::new(8);
        let hit = pool
            .allocate(
                unit(5).with_origin(NodeId(1), SourceKind::Industry, SourceId(7)),
            )
            .unwrap();
        let miss = pool
            .allocate(
                unit(5).with_origin(NodeId(1), SourceKind::Industry, SourceId(8)),
            )
            .unwrap();

        pool.invalidate_all_from(SourceKind::Industry, SourceId(7));
        assert_eq!(pool.get(hit).unwrap().origin_id(), None);
        assert_eq!(pool.get(miss).unwrap().origin_id(), Some(SourceId(8)));
    }

    #[test]
    fn invalidate_all_to_hop_clears_hints() {
        let mut pool = UnitPool::new(8);
        let via_order = pool
            .allocate(unit(5).with_next_hop(OrderId(3), Some(NodeId(9))))
            .unwrap();
        let via_node = pool
            .allocate(unit(5).with_next_hop(OrderId(4), Some(NodeId(2))))
            .unwrap();
        let untouched = pool
            .allocate(unit(5).with_next_hop(OrderId(5), Some(NodeId(6))))
            .unwrap();

        pool.invalidate_all_to_hop(OrderId(3), NodeId(2));
        assert_eq!(pool.get(via_order).unwrap().next_hop_order(), None);
        assert_eq!(pool.get(via_node).unwrap().next_hop_order(), None);
        assert_eq!(pool.get(untouched).unwrap().next_hop_order(), Some(OrderId(5)));
    }

    #[test]
    fn invalidate_all_to_clears_destination_and_hints() {
        let mut pool = UnitPool::new(8);
        let id = pool
            .allocate(
                unit(5)
                    .with_destination(TileIndex(40), SourceKind::Town, SourceId(2))
                    .with_next_hop(OrderId(1), Some(NodeId(4))),
            )
            .unwrap();

        pool.invalidate_all_to(SourceKind::Town, SourceId(2));
        let u = pool.get(id).unwrap();
        assert!(!u.has_destination());
        assert_eq!(u.next_hop_order(), None);
        assert_eq!(u.next_hop_node(), None);
    }
}
