use serde::{Deserialize, Serialize};

/// Identifies a cargo unit's slot in the [`UnitPool`](crate::pool::UnitPool).
/// Stable for the unit's lifetime and safe to persist or hand across process
/// boundaries; never reused while the unit is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Identifies a fixed transfer node (station, depot) in the surrounding
/// simulation. Opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u16);

/// Identifies a map tile. Opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileIndex(pub u32);

/// Identifies an order entry used as a next-hop reference for routed cargo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

/// Identifies a cargo kind in the surrounding simulation's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CargoKind(pub u8);

/// Identifies a production source or consumption destination. Interpreted
/// together with a [`SourceKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u32);

/// What kind of entity a [`SourceId`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Industry,
    Town,
    Headquarters,
}
