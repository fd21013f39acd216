//! Cargo list kind used by mobile carriers.
//!
//! On top of the generic list it caches the total feeder share of resident
//! units and owns the per-step aging pass. The merge predicate here is the
//! strict one: units loaded at different tiles never merge, because their
//! feeder-share accounting differs.

use crate::list::{CachePolicy, CargoList};
use crate::pool::UnitPool;
use crate::unit::{CargoUnit, Money};
use serde::{Deserialize, Serialize};

/// Cache policy for carrier lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarrierPolicy;

/// Kind-specific aggregate: Σ feeder_share over members. Rebuilt, not
/// persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarrierCache {
    #[serde(skip)]
    total_feeder_share: Money,
}

impl CachePolicy for CarrierPolicy {
    type Extra = CarrierCache;

    fn mergeable(a: &CargoUnit, b: &CargoUnit) -> bool {
        a.origin_node() == b.origin_node()
            && a.origin_kind() == b.origin_kind()
            && a.origin_id() == b.origin_id()
            && a.origin_tile() == b.origin_tile()
            && a.loaded_at_tile() == b.loaded_at_tile()
            && a.dest_tile() == b.dest_tile()
            && a.dest_kind() == b.dest_kind()
            && a.dest_id() == b.dest_id()
            && a.next_hop_order() == b.next_hop_order()
            && a.next_hop_node() == b.next_hop_node()
            && a.routing_flags() == b.routing_flags()
    }

    fn on_add(extra: &mut CarrierCache, unit: &CargoUnit) {
        extra.total_feeder_share += unit.feeder_share();
    }

    fn on_remove(extra: &mut CarrierCache, unit: &CargoUnit) {
        extra.total_feeder_share -= unit.feeder_share();
    }

    // Truncation destroys items but leaves the unit's feeder share with the
    // remainder, so there is nothing local to adjust.
}

/// The cargo list carried by a mobile carrier.
pub type CarrierCargoList = CargoList<CarrierPolicy>;

impl CarrierCargoList {
    /// Total feeder share across resident units. O(1).
    pub fn total_feeder_share(&self) -> Money {
        self.extra.total_feeder_share
    }

    /// Age every resident unit by one step, saturating at
    /// [`CargoUnit::MAX_AGE`]. Called once per simulation step per carrier.
    pub fn age_cargo(&mut self, pool: &mut UnitPool) {
        for &id in &self.ids {
            let Some(unit) = pool.get_mut(id) else {
                debug_assert!(false, "list references a freed unit");
                continue;
            };
            if unit.age() < CargoUnit::MAX_AGE {
                unit.age_step();
                // total_age is Σ quantity × age, so one step adds quantity.
                self.total_age += u64::from(unit.quantity());
            }
        }
    }

    /// Clear the cached unload target on every resident unit. Called when
    /// the carrier's route changes and the targets are no longer valid. O(n).
    pub fn invalidate_next_station(&mut self, pool: &mut UnitPool) {
        for &id in &self.ids {
            if let Some(unit) = pool.get_mut(id) {
                unit.clear_next_hop_node();
            }
        }
    }
}
