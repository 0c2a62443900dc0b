//! Pure domain types with no framework dependencies
//!
//! Geometry primitives and the selection state machine live here so the
//! capture pipeline and the page boundary can share them without
//! pulling in each other.

pub mod geometry;
pub mod selection;

pub use geometry::*;
pub use selection::*;
