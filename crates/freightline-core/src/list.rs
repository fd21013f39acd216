//! Generic ordered cargo list with cached aggregates and the move protocol.
//!
//! A `CargoList` holds pool handles in strict insertion order (front = oldest)
//! and keeps `count` and `total_age` exact under every mutation. Everything a
//! concrete list kind adds on top — the carrier's feeder-share total, the
//! node's hop index — goes through the [`CachePolicy`] hooks, so the
//! move/merge/split/truncate algorithm is written once and never knows the
//! shape of the kind-specific cache.
//!
//! Ordering is externally observable: `move_to` always drains from the front
//! and `append` always adds at the back, which fixes which units get split
//! versus merged.

use crate::id::{NodeId, TileIndex, UnitId};
use crate::payment::{DeliveredCargo, PaymentError, PaymentSink, TransferredCargo};
use crate::pool::{PoolError, UnitPool};
use crate::unit::{CargoUnit, Money};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Kind-specific cache maintenance, the one point of specialization between
/// carrier and node lists. `Extra` is the kind's aggregate state; the hooks
/// are called by the generic algorithm whenever membership changes.
pub trait CachePolicy: Sized {
    type Extra: Default + Clone + std::fmt::Debug + Serialize + DeserializeOwned;

    /// Whether two units may be combined without losing routing-relevant
    /// information. Quantity, age, and feeder share never block a merge.
    fn mergeable(a: &CargoUnit, b: &CargoUnit) -> bool;

    /// `unit` became a member (or grew by a merge).
    fn on_add(_extra: &mut Self::Extra, _unit: &CargoUnit) {}

    /// `unit` stopped being a member (or shrank by a merge-recompute).
    fn on_remove(_extra: &mut Self::Extra, _unit: &CargoUnit) {}

    /// `removed` items of `unit` were destroyed in place (truncation); the
    /// unit itself stays a member.
    fn on_remove_local(_extra: &mut Self::Extra, _unit: &CargoUnit, _removed: u16) {}

    /// Full recompute from current members, for `invalidate_cache`.
    fn rebuild<'a, I>(extra: &mut Self::Extra, units: I)
    where
        I: Iterator<Item = &'a CargoUnit>,
    {
        *extra = Self::Extra::default();
        for unit in units {
            Self::on_add(extra, unit);
        }
    }
}

/// What a move does with each unit it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAction {
    /// The unit reached its final destination: report to the payment
    /// collaborator and destroy it. No destination list is involved.
    FinalDelivery,
    /// Load onto a carrier; stamps `loaded_at_tile` with the load location.
    CarrierLoad { load_tile: TileIndex },
    /// Intermediate hand-off: report the feeder share accrued so far, then
    /// reset it on the moved unit and mark the unit as transferred.
    Transfer,
    /// Forced unload; the unit moves unchanged.
    Unload,
    /// The node does not accept the cargo: leave everything untouched. Only
    /// meaningful for units without a committed destination.
    NoAction,
}

/// What a `move_to` call actually did. `moved` is clipped to the source's
/// count; partial progress is the designed behaviour, not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[must_use = "moved may be less than requested and must be checked"]
pub struct MoveOutcome {
    /// Items actually moved (or delivered/destroyed).
    pub moved: u32,
    /// Whether at least one unit moved whole, as opposed to split-only
    /// progress. Lets callers detect forced partial transfers.
    pub any_whole_unit: bool,
}

/// Errors from the move protocol. Anything already moved before the failure
/// stays moved; the unit being processed when the error arose is untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// Ordered collection of cargo-unit handles with cached aggregates.
///
/// Membership (`ids`) and the kind-specific `extra` state are what persist;
/// `count` and `total_age` are rebuilt by [`invalidate_cache`]
/// (Self::invalidate_cache) after a load, the same way they are re-derived
/// after any bulk mutation that bypassed incremental tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CargoList<P: CachePolicy> {
    pub(crate) ids: VecDeque<UnitId>,
    /// Σ quantity over members.
    #[serde(skip)]
    pub(crate) count: u32,
    /// Σ quantity × age over members.
    #[serde(skip)]
    pub(crate) total_age: u64,
    pub(crate) extra: P::Extra,
}

impl<P: CachePolicy> Default for CargoList<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: CachePolicy> CargoList<P> {
    pub fn new() -> Self {
        Self {
            ids: VecDeque::new(),
            count: 0,
            total_age: 0,
            extra: P::Extra::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total items across all member units. O(1).
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Quantity-weighted average age, 0 when empty. O(1).
    pub fn average_age(&self) -> u8 {
        if self.count == 0 {
            0
        } else {
            (self.total_age / u64::from(self.count)) as u8
        }
    }

    /// Origin node of the first-in-order unit, `None` when empty. O(1).
    pub fn source_node(&self, pool: &UnitPool) -> Option<NodeId> {
        self.ids
            .front()
            .and_then(|&id| pool.get(id))
            .and_then(|unit| unit.origin_node())
    }

    /// Number of member units (not items).
    pub fn unit_count(&self) -> usize {
        self.ids.len()
    }

    /// Read-only ordered view of member handles, front to back.
    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.ids.iter().copied()
    }

    /// Read-only ordered view of member units, front to back.
    pub fn units<'a>(&'a self, pool: &'a UnitPool) -> impl Iterator<Item = &'a CargoUnit> + 'a {
        self.ids.iter().filter_map(move |&id| pool.get(id))
    }

    fn add_to_cache(&mut self, unit: &CargoUnit) {
        self.count += u32::from(unit.quantity());
        self.total_age += u64::from(unit.quantity()) * u64::from(unit.age());
        P::on_add(&mut self.extra, unit);
    }

    fn remove_from_cache(&mut self, unit: &CargoUnit) {
        self.count -= u32::from(unit.quantity());
        self.total_age -= u64::from(unit.quantity()) * u64::from(unit.age());
        P::on_remove(&mut self.extra, unit);
    }

    /// Pop the front handle and subtract `snapshot` (its pre-move state) from
    /// the caches.
    fn detach_front(&mut self, snapshot: &CargoUnit) {
        self.ids.pop_front();
        self.remove_from_cache(snapshot);
    }

    /// Insert `id` at the tail, merging into the current last unit when the
    /// kind's predicate allows and the combined quantity fits. The merged-away
    /// unit is freed. O(1) amortized.
    pub fn append(&mut self, pool: &mut UnitPool, id: UnitId) {
        let Some(unit) = pool.get(id) else {
            debug_assert!(false, "appending a freed unit");
            return;
        };
        if unit.quantity() == 0 {
            // Zero-quantity units are invalid; destroy on sight.
            pool.free(id);
            return;
        }
        let merge_target = self.ids.back().copied().filter(|&tail| {
            pool.get(tail).is_some_and(|t| {
                P::mergeable(t, unit)
                    && u32::from(t.quantity()) + u32::from(unit.quantity())
                        <= u32::from(CargoUnit::MAX_COUNT)
            })
        });
        match merge_target {
            Some(tail) => {
                let Some(incoming) = pool.free(id) else { return };
                let Some(tail_unit) = pool.get_mut(tail) else {
                    debug_assert!(false, "tail handle references a freed unit");
                    return;
                };
                // The merge recomputes the tail's age, so its old cache
                // contribution comes out and the combined one goes in.
                let before = tail_unit.clone();
                tail_unit.merge(incoming);
                let after = tail_unit.clone();
                self.remove_from_cache(&before);
                self.add_to_cache(&after);
            }
            None => {
                self.ids.push_back(id);
                if let Some(unit) = pool.get(id) {
                    let snapshot = unit.clone();
                    self.add_to_cache(&snapshot);
                }
            }
        }
    }

    /// Destroy units from the front until `count() <= max_remaining`. The
    /// unit straddling the boundary is reduced in place; its feeder share
    /// stays with the remainder. O(k) in units removed.
    pub fn truncate(&mut self, pool: &mut UnitPool, max_remaining: u32) {
        while self.count > max_remaining {
            let Some(&front) = self.ids.front() else {
                debug_assert!(false, "cached count nonzero but list is empty");
                self.count = 0;
                self.total_age = 0;
                break;
            };
            let Some(unit) = pool.get(front) else {
                debug_assert!(false, "list references a freed unit");
                self.ids.pop_front();
                continue;
            };
            let quantity = u32::from(unit.quantity());
            let excess = self.count - max_remaining;
            if quantity <= excess {
                let snapshot = unit.clone();
                self.detach_front(&snapshot);
                pool.free(front);
            } else {
                let cut = excess as u16;
                self.count -= excess;
                self.total_age -= u64::from(cut) * u64::from(unit.age());
                P::on_remove_local(&mut self.extra, unit, cut);
                if let Some(u) = pool.get_mut(front) {
                    u.shrink(cut, Money::ZERO);
                }
            }
        }
    }

    /// Move up to `amount` items into `dest` under `action`, walking units
    /// front to back and splitting the one that straddles the requested
    /// amount. O(k) in units touched.
    ///
    /// `dest` may be `None` only for [`MoveAction::FinalDelivery`] and
    /// [`MoveAction::NoAction`]; see [`deliver`](Self::deliver).
    ///
    /// On [`MoveError`], units moved before the failure stay moved and the
    /// unit being processed is untouched; a failed split allocation leaves
    /// both lists exactly as they were for that unit.
    pub fn move_to<D: CachePolicy>(
        &mut self,
        pool: &mut UnitPool,
        mut dest: Option<&mut CargoList<D>>,
        amount: u32,
        action: MoveAction,
        payment: &mut dyn PaymentSink,
    ) -> Result<MoveOutcome, MoveError> {
        let mut outcome = MoveOutcome::default();
        if matches!(action, MoveAction::NoAction) {
            return Ok(outcome);
        }
        let needs_dest = !matches!(action, MoveAction::FinalDelivery);
        if needs_dest && dest.is_none() {
            debug_assert!(false, "this move action requires a destination list");
            return Ok(outcome);
        }

        let mut remaining = amount.min(self.count);
        while remaining > 0 {
            let Some(&front) = self.ids.front() else {
                debug_assert!(false, "cached count nonzero but list is empty");
                break;
            };
            let Some(unit) = pool.get(front) else {
                debug_assert!(false, "list references a freed unit");
                self.ids.pop_front();
                continue;
            };
            let quantity = u32::from(unit.quantity());

            if quantity <= remaining {
                // The whole unit moves.
                let snapshot = unit.clone();
                match action {
                    MoveAction::FinalDelivery => {
                        payment.report_delivery(DeliveredCargo::of(
                            &snapshot,
                            snapshot.quantity(),
                            snapshot.feeder_share(),
                        ))?;
                        self.detach_front(&snapshot);
                        pool.free(front);
                    }
                    MoveAction::Transfer => {
                        payment.report_transfer(TransferredCargo::of(
                            &snapshot,
                            snapshot.quantity(),
                            snapshot.feeder_share(),
                        ))?;
                        self.detach_front(&snapshot);
                        if let Some(u) = pool.get_mut(front) {
                            u.reset_feeder_share();
                            u.mark_transferred();
                        }
                        if let Some(d) = dest.as_deref_mut() {
                            d.append(pool, front);
                        }
                    }
                    MoveAction::CarrierLoad { load_tile } => {
                        self.detach_front(&snapshot);
                        if let Some(u) = pool.get_mut(front) {
                            u.set_loaded_at(load_tile);
                        }
                        if let Some(d) = dest.as_deref_mut() {
                            d.append(pool, front);
                        }
                    }
                    MoveAction::Unload => {
                        self.detach_front(&snapshot);
                        if let Some(d) = dest.as_deref_mut() {
                            d.append(pool, front);
                        }
                    }
                    MoveAction::NoAction => break,
                }
                remaining -= quantity;
                outcome.moved += quantity;
                outcome.any_whole_unit = true;
            } else {
                // Only part of the unit moves.
                let take = remaining as u16;
                if matches!(action, MoveAction::FinalDelivery) {
                    // Final delivery needs no pool slot: report, then shrink
                    // the source in place.
                    let piece = unit.split_piece(take);
                    let share = piece.feeder_share();
                    payment.report_delivery(DeliveredCargo::of(&piece, take, share))?;
                    self.remove_from_cache(&piece);
                    if let Some(u) = pool.get_mut(front) {
                        u.shrink(take, share);
                    }
                } else {
                    let piece = unit.split_piece(take);
                    let share = piece.feeder_share();
                    let transfer_report = matches!(action, MoveAction::Transfer)
                        .then(|| TransferredCargo::of(&piece, take, share));
                    // Allocate before reporting or mutating anything, so a
                    // full pool rejects the move with both lists unchanged.
                    let new_id = pool.allocate(piece)?;
                    if let Some(report) = transfer_report {
                        if let Err(err) = payment.report_transfer(report) {
                            pool.free(new_id);
                            return Err(err.into());
                        }
                    }
                    // While the new unit still mirrors the carved piece, take
                    // its contribution out of this list's caches.
                    if let Some(new_unit) = pool.get(new_id) {
                        let piece_snapshot = new_unit.clone();
                        self.remove_from_cache(&piece_snapshot);
                    }
                    if let Some(source) = pool.get_mut(front) {
                        source.shrink(take, share);
                    }
                    if let Some(new_unit) = pool.get_mut(new_id) {
                        match action {
                            MoveAction::Transfer => {
                                new_unit.reset_feeder_share();
                                new_unit.mark_transferred();
                            }
                            MoveAction::CarrierLoad { load_tile } => {
                                new_unit.set_loaded_at(load_tile);
                            }
                            _ => {}
                        }
                    }
                    if let Some(d) = dest.as_deref_mut() {
                        d.append(pool, new_id);
                    }
                }
                outcome.moved += u32::from(take);
                remaining = 0;
            }
        }
        Ok(outcome)
    }

    /// Final delivery of up to `amount` items: destroy them and report
    /// quantity plus accrued feeder share to the payment collaborator.
    pub fn deliver(
        &mut self,
        pool: &mut UnitPool,
        amount: u32,
        payment: &mut dyn PaymentSink,
    ) -> Result<MoveOutcome, MoveError> {
        self.move_to::<P>(pool, None, amount, MoveAction::FinalDelivery, payment)
    }

    /// O(n) recompute of every cache from current members. Handles to freed
    /// units are dropped. Use after bulk external mutation (pool sweeps,
    /// persistence load) where incremental tracking was bypassed.
    pub fn invalidate_cache(&mut self, pool: &UnitPool) {
        self.ids.retain(|&id| pool.get(id).is_some());
        self.count = 0;
        self.total_age = 0;
        for &id in &self.ids {
            if let Some(unit) = pool.get(id) {
                self.count += u32::from(unit.quantity());
                self.total_age += u64::from(unit.quantity()) * u64::from(unit.age());
            }
        }
        P::rebuild(&mut self.extra, self.ids.iter().filter_map(|&id| pool.get(id)));
    }

    /// Forget all membership without touching the pool. For simulation
    /// reset/teardown, where the pool is cleared wholesale.
    pub fn clear_on_reset(&mut self) {
        self.ids.clear();
        self.count = 0;
        self.total_age = 0;
        P::rebuild(&mut self.extra, std::iter::empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{SourceId, SourceKind, TileIndex};
    use crate::payment::NullPayment;

    /// Minimal policy exercising only the generic machinery: no extra cache,
    /// carrier-strength merge predicate minus `loaded_at_tile`.
    struct PlainPolicy;

    impl CachePolicy for PlainPolicy {
        type Extra = ();

        fn mergeable(a: &CargoUnit, b: &CargoUnit) -> bool {
            a.origin_node() == b.origin_node()
                && a.origin_tile() == b.origin_tile()
                && a.dest_id() == b.dest_id()
                && a.next_hop_order() == b.next_hop_order()
                && a.routing_flags() == b.routing_flags()
        }
    }

    type PlainList = CargoList<PlainPolicy>;

    fn unit(pool: &mut UnitPool, quantity: u16) -> UnitId {
        pool.allocate(CargoUnit::new(quantity, TileIndex(5)).unwrap())
            .unwrap()
    }

    fn recomputed(list: &PlainList, pool: &UnitPool) -> (u32, u64) {
        list.units(pool).fold((0, 0), |(c, a), u| {
            (
                c + u32::from(u.quantity()),
                a + u64::from(u.quantity()) * u64::from(u.age()),
            )
        })
    }

    #[test]
    fn empty_list_has_zero_everything() {
        let pool = UnitPool::new(8);
        let list = PlainList::new();
        assert!(list.is_empty());
        assert_eq!(list.count(), 0);
        assert_eq!(list.average_age(), 0);
        assert_eq!(list.source_node(&pool), None);
    }

    #[test]
    fn append_mergeable_units_collapses_them() {
        let mut pool = UnitPool::new(8);
        let mut list = PlainList::new();
        let a = unit(&mut pool, 50);
        let b = unit(&mut pool, 30);
        list.append(&mut pool, a);
        list.append(&mut pool, b);

        assert_eq!(list.unit_count(), 1, "mergeable tail absorbed the append");
        assert_eq!(list.count(), 80);
        assert_eq!(pool.live_units(), 1, "the merged-away unit was freed");
    }

    #[test]
    fn append_non_mergeable_units_keeps_order() {
        let mut pool = UnitPool::new(8);
        let mut list = PlainList::new();
        let a = unit(&mut pool, 10);
        let routed = pool
            .allocate(
                CargoUnit::new(20, TileIndex(5))
                    .unwrap()
                    .with_destination(TileIndex(9), SourceKind::Town, SourceId(1)),
            )
            .unwrap();
        list.append(&mut pool, a);
        list.append(&mut pool, routed);

        assert_eq!(list.unit_count(), 2);
        let ids: Vec<_> = list.unit_ids().collect();
        assert_eq!(ids, vec![a, routed]);
    }

    #[test]
    fn append_never_overflows_max_count() {
        let mut pool = UnitPool::new(8);
        let mut list = PlainList::new();
        let a = unit(&mut pool, CargoUnit::MAX_COUNT - 10);
        let b = unit(&mut pool, 30);
        list.append(&mut pool, a);
        list.append(&mut pool, b);

        // Combined quantity would exceed MAX_COUNT, so no merge happened.
        assert_eq!(list.unit_count(), 2);
        assert_eq!(list.count(), u32::from(CargoUnit::MAX_COUNT) + 20);
    }

    #[test]
    fn move_whole_units_conserves_quantity() {
        let mut pool = UnitPool::new(8);
        let mut source = PlainList::new();
        let mut dest = PlainList::new();
        list_with(&mut pool, &mut source, &[40, 25]);

        let before = source.count() + dest.count();
        let outcome = source
            .move_to(
                &mut pool,
                Some(&mut dest),
                65,
                MoveAction::Unload,
                &mut NullPayment,
            )
            .unwrap();

        assert_eq!(outcome.moved, 65);
        assert!(outcome.any_whole_unit);
        assert_eq!(source.count() + dest.count(), before);
        assert!(source.is_empty());
    }

    #[test]
    fn move_splits_the_straddling_unit() {
        let mut pool = UnitPool::new(8);
        let mut source = PlainList::new();
        let mut dest = PlainList::new();
        list_with(&mut pool, &mut source, &[80]);

        let outcome = source
            .move_to(
                &mut pool,
                Some(&mut dest),
                30,
                MoveAction::Unload,
                &mut NullPayment,
            )
            .unwrap();

        assert_eq!(outcome.moved, 30);
        assert!(!outcome.any_whole_unit, "only a split piece moved");
        assert_eq!(source.count(), 50);
        assert_eq!(dest.count(), 30);
    }

    #[test]
    fn move_clips_to_available() {
        let mut pool = UnitPool::new(8);
        let mut source = PlainList::new();
        let mut dest = PlainList::new();
        list_with(&mut pool, &mut source, &[15]);

        let outcome = source
            .move_to(
                &mut pool,
                Some(&mut dest),
                1_000,
                MoveAction::Unload,
                &mut NullPayment,
            )
            .unwrap();

        assert_eq!(outcome.moved, 15);
        assert!(source.is_empty());
        assert_eq!(dest.count(), 15);
    }

    #[test]
    fn move_from_empty_list_is_a_noop() {
        let mut pool = UnitPool::new(8);
        let mut source = PlainList::new();
        let mut dest = PlainList::new();

        let outcome = source
            .move_to(
                &mut pool,
                Some(&mut dest),
                10,
                MoveAction::Unload,
                &mut NullPayment,
            )
            .unwrap();
        assert_eq!(outcome, MoveOutcome::default());
    }

    #[test]
    fn no_action_touches_nothing() {
        let mut pool = UnitPool::new(8);
        let mut source = PlainList::new();
        let mut dest = PlainList::new();
        list_with(&mut pool, &mut source, &[40]);

        let outcome = source
            .move_to(
                &mut pool,
                Some(&mut dest),
                40,
                MoveAction::NoAction,
                &mut NullPayment,
            )
            .unwrap();

        assert_eq!(outcome.moved, 0);
        assert_eq!(source.count(), 40);
        assert!(dest.is_empty());
    }

    #[test]
    fn split_with_exhausted_pool_leaves_both_lists_unchanged() {
        let mut pool = UnitPool::new(1);
        let mut source = PlainList::new();
        let mut dest = PlainList::new();
        list_with(&mut pool, &mut source, &[80]);
        assert_eq!(pool.live_units(), pool.capacity());

        let err = source
            .move_to(
                &mut pool,
                Some(&mut dest),
                30,
                MoveAction::Unload,
                &mut NullPayment,
            )
            .unwrap_err();

        assert!(matches!(err, MoveError::Pool(PoolError::CapacityExhausted(_))));
        assert_eq!(source.count(), 80);
        assert!(dest.is_empty());
        let (count, _) = recomputed(&source, &pool);
        assert_eq!(count, 80);
    }

    #[test]
    fn truncate_drops_from_the_front_and_splits_the_straddler() {
        let mut pool = UnitPool::new(8);
        let mut list = PlainList::new();
        // Distinct destinations keep the units unmerged.
        for (i, q) in [(1u32, 30u16), (2, 30), (3, 30)] {
            let id = pool
                .allocate(
                    CargoUnit::new(q, TileIndex(5))
                        .unwrap()
                        .with_destination(TileIndex(i), SourceKind::Town, SourceId(i)),
                )
                .unwrap();
            list.append(&mut pool, id);
        }

        list.truncate(&mut pool, 50);
        assert_eq!(list.count(), 50);
        assert_eq!(list.unit_count(), 2, "the oldest unit was destroyed whole");
        // The straddler was reduced in place: 30 + 30 - 40 destroyed = 20 left.
        let first = list.units(&pool).next().unwrap();
        assert_eq!(first.quantity(), 20);
        assert_eq!(first.dest_id(), Some(SourceId(2)));
    }

    #[test]
    fn truncate_to_zero_empties_the_list() {
        let mut pool = UnitPool::new(8);
        let mut list = PlainList::new();
        list_with(&mut pool, &mut list, &[10, 20]);
        list.truncate(&mut pool, 0);
        assert!(list.is_empty());
        assert_eq!(list.unit_count(), 0);
        assert_eq!(pool.live_units(), 0);
    }

    #[test]
    fn cache_matches_recompute_after_mixed_operations() {
        let mut pool = UnitPool::new(16);
        let mut list = PlainList::new();
        let mut other = PlainList::new();
        list_with(&mut pool, &mut list, &[50, 20]);
        let _ = list
            .move_to(
                &mut pool,
                Some(&mut other),
                35,
                MoveAction::Unload,
                &mut NullPayment,
            )
            .unwrap();
        list.truncate(&mut pool, 30);

        let (count, total_age) = recomputed(&list, &pool);
        assert_eq!(list.count(), count);
        assert_eq!(list.total_age, total_age);

        list.invalidate_cache(&pool);
        assert_eq!(list.count(), count);
        assert_eq!(list.total_age, total_age);
    }

    #[test]
    fn clear_on_reset_forgets_membership() {
        let mut pool = UnitPool::new(8);
        let mut list = PlainList::new();
        list_with(&mut pool, &mut list, &[10]);
        pool.clear();
        list.clear_on_reset();
        assert!(list.is_empty());
        assert_eq!(list.unit_ids().count(), 0);
    }

    /// Append several mergeable-with-each-other units; quantities merge into
    /// one unit, which is fine for the tests that only care about totals.
    fn list_with(pool: &mut UnitPool, list: &mut PlainList, quantities: &[u16]) {
        for &q in quantities {
            let id = unit(pool, q);
            list.append(pool, id);
        }
    }
}
