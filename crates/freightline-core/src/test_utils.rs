//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::id::*;
use crate::payment::{DeliveredCargo, PaymentError, PaymentSink, TransferredCargo};
use crate::pool::UnitPool;
use crate::unit::{CargoUnit, Money};

// ===========================================================================
// Well-known test entities
// ===========================================================================

pub fn steel_mill() -> (NodeId, SourceKind, SourceId) {
    (NodeId(1), SourceKind::Industry, SourceId(10))
}

pub fn sawmill() -> (NodeId, SourceKind, SourceId) {
    (NodeId(2), SourceKind::Industry, SourceId(11))
}

pub fn port_town() -> (SourceKind, SourceId) {
    (SourceKind::Town, SourceId(20))
}

// ===========================================================================
// Unit constructors
// ===========================================================================

/// A unit with provenance from `origin` and no destination.
pub fn produced_unit(quantity: u16, origin: (NodeId, SourceKind, SourceId)) -> CargoUnit {
    let (node, kind, id) = origin;
    CargoUnit::new(quantity, TileIndex(u32::from(node.0)))
        .unwrap()
        .with_origin(node, kind, id)
}

/// A unit from `origin` headed for `dest` at `dest_tile`.
pub fn routed_unit(
    quantity: u16,
    origin: (NodeId, SourceKind, SourceId),
    dest_tile: u32,
    dest: (SourceKind, SourceId),
) -> CargoUnit {
    produced_unit(quantity, origin).with_destination(TileIndex(dest_tile), dest.0, dest.1)
}

/// Allocate `unit` expecting a free slot.
pub fn pooled(pool: &mut UnitPool, unit: CargoUnit) -> UnitId {
    pool.allocate(unit).expect("test pool should have capacity")
}

// ===========================================================================
// Recording payment sink
// ===========================================================================

/// Records every report; optionally fails each call, for error-path tests.
#[derive(Debug, Default)]
pub struct RecordingPayment {
    pub deliveries: Vec<DeliveredCargo>,
    pub transfers: Vec<TransferredCargo>,
    pub fail: bool,
}

impl RecordingPayment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn delivered_quantity(&self) -> u32 {
        self.deliveries.iter().map(|d| u32::from(d.quantity)).sum()
    }

    pub fn delivered_feeder_share(&self) -> Money {
        Money(self.deliveries.iter().map(|d| d.feeder_share.0).sum())
    }

    pub fn transferred_quantity(&self) -> u32 {
        self.transfers.iter().map(|t| u32::from(t.quantity)).sum()
    }
}

impl PaymentSink for RecordingPayment {
    fn report_delivery(&mut self, cargo: DeliveredCargo) -> Result<(), PaymentError> {
        if self.fail {
            return Err(PaymentError("recording sink set to fail".into()));
        }
        self.deliveries.push(cargo);
        Ok(())
    }

    fn report_transfer(&mut self, cargo: TransferredCargo) -> Result<(), PaymentError> {
        if self.fail {
            return Err(PaymentError("recording sink set to fail".into()));
        }
        self.transfers.push(cargo);
        Ok(())
    }
}
