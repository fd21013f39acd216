//! Payment collaborator interface.
//!
//! Delivery and transfer proceeds are computed outside this crate; `move_to`
//! only reports what happened, synchronously, and propagates any failure. The
//! report structs are plain data so a sink can price them however it likes.

use crate::id::{NodeId, SourceId, SourceKind};
use crate::unit::{CargoUnit, Money};

/// Failure reported by a payment sink. Opaque to this crate beyond the
/// message; `move_to` propagates it and performs no further mutation for the
/// unit being processed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payment collaborator failed: {0}")]
pub struct PaymentError(pub String);

/// Cargo that reached its final destination and was destroyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredCargo {
    pub quantity: u16,
    pub age: u8,
    /// Accrued feeder share to be paid out to earlier carriers.
    pub feeder_share: Money,
    pub origin_node: Option<NodeId>,
    pub origin_kind: Option<SourceKind>,
    pub origin_id: Option<SourceId>,
}

impl DeliveredCargo {
    pub(crate) fn of(unit: &CargoUnit, quantity: u16, feeder_share: Money) -> Self {
        Self {
            quantity,
            age: unit.age(),
            feeder_share,
            origin_node: unit.origin_node(),
            origin_kind: unit.origin_kind(),
            origin_id: unit.origin_id(),
        }
    }
}

/// Cargo handed off at an intermediate node. The reported feeder share is the
/// accrual so far; the moved unit's own share is reset afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferredCargo {
    pub quantity: u16,
    pub age: u8,
    pub feeder_share: Money,
    pub origin_node: Option<NodeId>,
}

impl TransferredCargo {
    pub(crate) fn of(unit: &CargoUnit, quantity: u16, feeder_share: Money) -> Self {
        Self {
            quantity,
            age: unit.age(),
            feeder_share,
            origin_node: unit.origin_node(),
        }
    }
}

/// Sink for delivery/transfer reports, called synchronously during `move_to`.
pub trait PaymentSink {
    fn report_delivery(&mut self, cargo: DeliveredCargo) -> Result<(), PaymentError>;
    fn report_transfer(&mut self, cargo: TransferredCargo) -> Result<(), PaymentError>;
}

/// Sink that accepts everything and pays nothing. For moves whose action
/// never reports (loads, forced unloads) and for benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPayment;

impl PaymentSink for NullPayment {
    fn report_delivery(&mut self, _cargo: DeliveredCargo) -> Result<(), PaymentError> {
        Ok(())
    }

    fn report_transfer(&mut self, _cargo: TransferredCargo) -> Result<(), PaymentError> {
        Ok(())
    }
}
