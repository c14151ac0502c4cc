//! bg-core: stable foundation for boardgraph.
//!
//! Contains:
//! - units (uom length/mass types, text parsing, fixed-point USD)
//! - geom (points, bounding boxes, footprints)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact slot identifiers)
//! - slots (stable-index list used to address ports)
//! - error (shared error types)

pub mod error;
pub mod geom;
pub mod ids;
pub mod numeric;
pub mod slots;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use geom::{Aabb, Footprint, Point};
pub use ids::SlotIndex;
pub use numeric::*;
pub use slots::StableIndexList;
pub use units::{Length, Mass, Usd};
