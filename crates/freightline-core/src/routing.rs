//! Routing collaborator interface.
//!
//! This crate never decides *where* cargo should go; it only stores the
//! next-hop hints that dispatch logic computed elsewhere and keeps the
//! per-node hop index in sync with them. The [`NextHopResolver`] trait is the
//! seam through which [`NodeCargoList::update_next_hop`] asks the surrounding
//! simulation for fresh decisions.
//!
//! [`NodeCargoList::update_next_hop`]: crate::node::NodeCargoList::update_next_hop

use crate::id::{CargoKind, NodeId, OrderId};
use crate::unit::CargoUnit;
use serde::{Deserialize, Serialize};

/// Bit-set of per-unit routing behaviour flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutingFlags(pub u8);

impl RoutingFlags {
    /// The unit has passed through at least one intermediate transfer.
    pub const TRANSFERRED: RoutingFlags = RoutingFlags(1 << 0);
    /// The unit's next hop is pinned and must not be recomputed.
    pub const FIXED_ROUTE: RoutingFlags = RoutingFlags(1 << 1);

    pub fn contains(self, other: RoutingFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: RoutingFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: RoutingFlags) {
        self.0 &= !other.0;
    }
}

/// A next-hop decision produced by the external dispatch logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDecision {
    /// The order entry the unit should travel under next.
    pub order: OrderId,
    /// Where the unit should be unloaded next, when known.
    pub unload_node: Option<NodeId>,
}

/// External transfer-node lookup: given a resident unit and the cargo kind,
/// produce the unit's next hop, or `None` when no route exists (the unit's
/// hints are then cleared).
pub trait NextHopResolver {
    fn next_hop(&self, unit: &CargoUnit, cargo: CargoKind) -> Option<RouteDecision>;
}

/// Closures make handy resolvers in tests and glue code.
impl<F> NextHopResolver for F
where
    F: Fn(&CargoUnit, CargoKind) -> Option<RouteDecision>,
{
    fn next_hop(&self, unit: &CargoUnit, cargo: CargoKind) -> Option<RouteDecision> {
        self(unit, cargo)
    }
}
