//! Freightline Core -- cargo-unit lifecycle for tick-based transport
//! simulations.
//!
//! This crate manages the creation, merging, splitting, and routed movement
//! of discrete cargo units circulating between mobile carriers and fixed
//! transfer nodes. It executes moves once dispatch logic elsewhere has
//! decided on a destination, and maintains the cached aggregates that make
//! the next decision cheap.
//!
//! # Key Types
//!
//! - [`pool::UnitPool`] -- fixed-capacity slot allocator owning every live
//!   [`unit::CargoUnit`]; stable integer identities, lowest-free-slot reuse.
//! - [`list::CargoList`] -- ordered collection of unit handles with cached
//!   aggregates and the five-action move protocol
//!   ([`list::MoveAction`]), specialized per kind via [`list::CachePolicy`].
//! - [`carrier::CarrierCargoList`] -- list kind for mobile carriers: feeder
//!   share total, per-step aging.
//! - [`node::NodeCargoList`] -- list kind for transfer nodes: incrementally
//!   maintained hop index with an amortized, cursor-resumable next-hop
//!   recompute.
//! - [`payment::PaymentSink`] / [`routing::NextHopResolver`] -- the seams to
//!   the external payment and dispatch collaborators.
//!
//! # Ownership
//!
//! A unit is referenced by exactly one list at a time and mutated only
//! through it; everything else sees read-only projections. The pool is
//! explicit state (`&mut UnitPool`), passed into every operation that
//! allocates or frees, never ambient.
//!
//! # Stepping
//!
//! Everything here is single-threaded and step-driven: one logical
//! simulation step owns all mutation, runs to completion, and a `move_to`
//! returning less than requested is a normal outcome every caller checks.

pub mod carrier;
pub mod id;
pub mod list;
pub mod node;
pub mod payment;
pub mod pool;
pub mod routing;
pub mod unit;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
