//! Cargo list kind used by fixed transfer nodes.
//!
//! On top of the generic list it maintains a hop index — next-hop order →
//! waiting quantity — so dispatch decisions elsewhere are O(1) lookups
//! instead of O(n) scans. The index is kept exact incrementally; the
//! next-hop recomputation itself is amortized over many simulation steps via
//! a wrap-around cursor, so a large node list never stalls a single step.
//!
//! The merge predicate here is looser than the carrier's: units waiting at a
//! node have not committed to a `loaded_at_tile` yet, so it is ignored.

use crate::id::{CargoKind, OrderId};
use crate::list::{CachePolicy, CargoList};
use crate::pool::UnitPool;
use crate::routing::{NextHopResolver, RoutingFlags};
use crate::unit::CargoUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cache policy for node lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodePolicy;

/// Kind-specific state: the hop index plus the resumable recompute cursor.
/// The index is rebuilt after a load; the cursor is part of the persisted
/// list state so amortized recomputation survives a save/load cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HopCache {
    #[serde(skip)]
    counts: BTreeMap<OrderId, u32>,
    /// List position the next `update_next_hop` call resumes from.
    next_start: u32,
}

impl HopCache {
    fn add(&mut self, order: Option<OrderId>, quantity: u32) {
        if let Some(order) = order {
            *self.counts.entry(order).or_insert(0) += quantity;
        }
    }

    fn remove(&mut self, order: Option<OrderId>, quantity: u32) {
        let Some(order) = order else { return };
        if let Some(entry) = self.counts.get_mut(&order) {
            *entry = entry.saturating_sub(quantity);
            if *entry == 0 {
                self.counts.remove(&order);
            }
        }
    }
}

impl CachePolicy for NodePolicy {
    type Extra = HopCache;

    fn mergeable(a: &CargoUnit, b: &CargoUnit) -> bool {
        a.origin_node() == b.origin_node()
            && a.origin_kind() == b.origin_kind()
            && a.origin_id() == b.origin_id()
            && a.origin_tile() == b.origin_tile()
            && a.dest_tile() == b.dest_tile()
            && a.dest_kind() == b.dest_kind()
            && a.dest_id() == b.dest_id()
            && a.next_hop_order() == b.next_hop_order()
            && a.next_hop_node() == b.next_hop_node()
            && a.routing_flags() == b.routing_flags()
    }

    fn on_add(extra: &mut HopCache, unit: &CargoUnit) {
        extra.add(unit.next_hop_order(), u32::from(unit.quantity()));
    }

    fn on_remove(extra: &mut HopCache, unit: &CargoUnit) {
        extra.remove(unit.next_hop_order(), u32::from(unit.quantity()));
    }

    fn on_remove_local(extra: &mut HopCache, unit: &CargoUnit, removed: u16) {
        extra.remove(unit.next_hop_order(), u32::from(removed));
    }

    /// Rebuilds the index but keeps the cursor: a cache invalidation must not
    /// restart the amortized scan from scratch.
    fn rebuild<'a, I>(extra: &mut HopCache, units: I)
    where
        I: Iterator<Item = &'a CargoUnit>,
    {
        extra.counts.clear();
        for unit in units {
            Self::on_add(extra, unit);
        }
    }
}

/// The cargo list waiting at a fixed transfer node.
pub type NodeCargoList = CargoList<NodePolicy>;

impl NodeCargoList {
    /// The full hop index: next-hop order → waiting quantity. Only assigned
    /// hops appear.
    pub fn hop_index(&self) -> &BTreeMap<OrderId, u32> {
        &self.extra.counts
    }

    /// Waiting quantity for one hop, 0 when none. O(log hops).
    pub fn hop_count(&self, order: OrderId) -> u32 {
        self.extra.counts.get(&order).copied().unwrap_or(0)
    }

    /// Recompute next-hop hints for at most `budget` resident units, resuming
    /// from where the previous call stopped and wrapping around the list.
    ///
    /// The hop index stays exact throughout: each recomputed unit's old
    /// contribution comes out and its new one goes in, even though the scan
    /// only covers a slice of the list. Units flagged
    /// [`RoutingFlags::FIXED_ROUTE`] are skipped.
    pub fn update_next_hop(
        &mut self,
        pool: &mut UnitPool,
        resolver: &dyn NextHopResolver,
        cargo: CargoKind,
        budget: usize,
    ) {
        let len = self.ids.len();
        if len == 0 {
            self.extra.next_start = 0;
            return;
        }
        let mut pos = self.extra.next_start as usize % len;
        for _ in 0..budget.min(len) {
            let id = self.ids[pos];
            pos = (pos + 1) % len;

            let Some(unit) = pool.get(id) else {
                debug_assert!(false, "list references a freed unit");
                continue;
            };
            if unit.routing_flags().contains(RoutingFlags::FIXED_ROUTE) {
                continue;
            }
            let decision = resolver.next_hop(unit, cargo);
            let new_order = decision.map(|d| d.order);
            let new_node = decision.and_then(|d| d.unload_node);
            if new_order == unit.next_hop_order() && new_node == unit.next_hop_node() {
                continue;
            }
            let quantity = u32::from(unit.quantity());
            self.extra.remove(unit.next_hop_order(), quantity);
            self.extra.add(new_order, quantity);
            if let Some(unit) = pool.get_mut(id) {
                unit.set_next_hop(new_order, new_node);
            }
        }
        self.extra.next_start = pos as u32;
    }
}
