//! The cargo unit: an indivisible-until-split record of a quantity of goods
//! sharing provenance, destination, and routing attributes.
//!
//! Units live in the [`UnitPool`](crate::pool::UnitPool) and are referenced,
//! never owned, by exactly one cargo list at a time. All mutation goes through
//! `pub(crate)` methods so only the owning list (and the pool's bulk sweeps)
//! can change a unit; external collaborators get read-only projections plus
//! the serde derives the persistence layer needs.

use crate::id::{NodeId, OrderId, SourceId, SourceKind, TileIndex};
use crate::routing::RoutingFlags;
use serde::{Deserialize, Serialize};

/// Monetary amount in base currency units. Feeder shares accrue as plain
/// signed integers; fractional payment math happens in the payment
/// collaborator, not here.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

/// Rejected quantity: zero or above [`CargoUnit::MAX_COUNT`]. Raised before
/// any mutation takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid cargo quantity {0} (valid range 1..={max})", max = CargoUnit::MAX_COUNT)]
pub struct InvalidQuantity(pub u32);

/// Container for cargo produced at the same place and time.
///
/// `quantity` is always in `1..=MAX_COUNT`; a unit whose quantity would reach
/// zero is destroyed instead. Provenance fields are fixed at creation and
/// copied verbatim by splits; only `quantity`, `age`, `feeder_share`,
/// `loaded_at_tile`, and the next-hop hints change over a unit's life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoUnit {
    quantity: u16,
    age: u8,
    feeder_share: Money,
    origin_node: Option<NodeId>,
    origin_kind: Option<SourceKind>,
    origin_id: Option<SourceId>,
    origin_tile: TileIndex,
    loaded_at_tile: Option<TileIndex>,
    dest_tile: Option<TileIndex>,
    dest_kind: Option<SourceKind>,
    dest_id: Option<SourceId>,
    next_hop_order: Option<OrderId>,
    next_hop_node: Option<NodeId>,
    routing_flags: RoutingFlags,
}

impl CargoUnit {
    /// Maximum number of items in a single cargo unit.
    pub const MAX_COUNT: u16 = u16::MAX;

    /// Maximum age; `age` saturates here and never wraps.
    pub const MAX_AGE: u8 = u8::MAX;

    /// Create a fresh unit of `quantity` items produced at `origin_tile`.
    /// Everything else starts unset; use the `with_*` builders to attach
    /// provenance, destination intent, and routing hints.
    pub fn new(quantity: u16, origin_tile: TileIndex) -> Result<Self, InvalidQuantity> {
        if quantity == 0 {
            return Err(InvalidQuantity(0));
        }
        Ok(Self {
            quantity,
            age: 0,
            feeder_share: Money::ZERO,
            origin_node: None,
            origin_kind: None,
            origin_id: None,
            origin_tile,
            loaded_at_tile: None,
            dest_tile: None,
            dest_kind: None,
            dest_id: None,
            next_hop_order: None,
            next_hop_node: None,
            routing_flags: RoutingFlags::default(),
        })
    }

    /// Attach production provenance (the node and source the cargo came from).
    pub fn with_origin(
        mut self,
        node: NodeId,
        kind: SourceKind,
        id: SourceId,
    ) -> Self {
        self.origin_node = Some(node);
        self.origin_kind = Some(kind);
        self.origin_id = Some(id);
        self
    }

    /// Attach destination intent.
    pub fn with_destination(
        mut self,
        tile: TileIndex,
        kind: SourceKind,
        id: SourceId,
    ) -> Self {
        self.dest_tile = Some(tile);
        self.dest_kind = Some(kind);
        self.dest_id = Some(id);
        self
    }

    /// Attach initial next-hop hints.
    pub fn with_next_hop(mut self, order: OrderId, unload_node: Option<NodeId>) -> Self {
        self.next_hop_order = Some(order);
        self.next_hop_node = unload_node;
        self
    }

    /// Attach routing behaviour flags.
    pub fn with_flags(mut self, flags: RoutingFlags) -> Self {
        self.routing_flags = flags;
        self
    }

    // -- read-only projection ------------------------------------------------

    pub fn quantity(&self) -> u16 {
        self.quantity
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    /// Payment already owed to earlier carriers in the feeder chain, settled
    /// on final delivery.
    pub fn feeder_share(&self) -> Money {
        self.feeder_share
    }

    pub fn origin_node(&self) -> Option<NodeId> {
        self.origin_node
    }

    pub fn origin_kind(&self) -> Option<SourceKind> {
        self.origin_kind
    }

    pub fn origin_id(&self) -> Option<SourceId> {
        self.origin_id
    }

    pub fn origin_tile(&self) -> TileIndex {
        self.origin_tile
    }

    /// Where the unit was last loaded onto a carrier; `None` until first load.
    pub fn loaded_at_tile(&self) -> Option<TileIndex> {
        self.loaded_at_tile
    }

    pub fn dest_tile(&self) -> Option<TileIndex> {
        self.dest_tile
    }

    pub fn dest_kind(&self) -> Option<SourceKind> {
        self.dest_kind
    }

    pub fn dest_id(&self) -> Option<SourceId> {
        self.dest_id
    }

    pub fn next_hop_order(&self) -> Option<OrderId> {
        self.next_hop_order
    }

    pub fn next_hop_node(&self) -> Option<NodeId> {
        self.next_hop_node
    }

    pub fn routing_flags(&self) -> RoutingFlags {
        self.routing_flags
    }

    /// True when the unit carries a committed destination.
    pub fn has_destination(&self) -> bool {
        self.dest_id.is_some() || self.dest_tile.is_some()
    }

    // -- owner-only mutation -------------------------------------------------

    /// The piece a split of `amount` items would carve off: identical
    /// provenance, destination, and routing fields, plus a proportional
    /// (floor) slice of the feeder share. The caller is responsible for
    /// shrinking `self` by the same amount once the piece has a pool slot.
    pub(crate) fn split_piece(&self, amount: u16) -> CargoUnit {
        debug_assert!(amount > 0 && amount < self.quantity);
        let mut piece = self.clone();
        piece.quantity = amount;
        piece.feeder_share =
            Money(self.feeder_share.0 * i64::from(amount) / i64::from(self.quantity));
        piece
    }

    /// Remove `amount` items and `share` of the feeder accrual, the
    /// counterpart of [`split_piece`](Self::split_piece) landing in a pool
    /// slot (or being delivered/truncated away).
    pub(crate) fn shrink(&mut self, amount: u16, share: Money) {
        debug_assert!(amount < self.quantity);
        self.quantity -= amount;
        self.feeder_share -= share;
    }

    /// Absorb `other` into this unit. Quantities and feeder shares add; age
    /// becomes the quantity-weighted average of the two, floor-rounded.
    /// Callers must have checked mergeability and that the combined quantity
    /// fits in `MAX_COUNT`.
    pub(crate) fn merge(&mut self, other: CargoUnit) {
        let total = u32::from(self.quantity) + u32::from(other.quantity);
        debug_assert!(total <= u32::from(Self::MAX_COUNT));
        let weighted = u64::from(self.quantity) * u64::from(self.age)
            + u64::from(other.quantity) * u64::from(other.age);
        self.age = (weighted / u64::from(total)) as u8;
        self.quantity = total as u16;
        self.feeder_share += other.feeder_share;
    }

    /// One aging step, saturating at [`MAX_AGE`](Self::MAX_AGE).
    pub(crate) fn age_step(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    pub(crate) fn set_loaded_at(&mut self, tile: TileIndex) {
        self.loaded_at_tile = Some(tile);
    }

    pub(crate) fn reset_feeder_share(&mut self) {
        self.feeder_share = Money::ZERO;
    }

    pub(crate) fn mark_transferred(&mut self) {
        self.routing_flags.insert(RoutingFlags::TRANSFERRED);
    }

    pub(crate) fn set_next_hop(&mut self, order: Option<OrderId>, node: Option<NodeId>) {
        self.next_hop_order = order;
        self.next_hop_node = node;
    }

    pub(crate) fn clear_next_hop_node(&mut self) {
        self.next_hop_node = None;
    }

    pub(crate) fn clear_origin_source(&mut self) {
        self.origin_kind = None;
        self.origin_id = None;
    }

    pub(crate) fn clear_origin_node(&mut self) {
        self.origin_node = None;
    }

    pub(crate) fn clear_destination(&mut self) {
        self.dest_tile = None;
        self.dest_kind = None;
        self.dest_id = None;
    }

    pub(crate) fn add_feeder_share(&mut self, share: Money) {
        self.feeder_share += share;
    }
}
