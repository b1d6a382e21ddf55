//! **tilenav-core** — integer grid geometry for the *tilenav* crates.
//!
//! Cells of a tile map are addressed by [`Point`]; a whole map, or any
//! rectangular part of it, is a half-open [`Range`]. Everything above this
//! crate (graph construction, search, steering) speaks in these two types
//! whenever it talks about tiles rather than world-space positions.

pub mod geom;

pub use geom::{Point, Range, RangeIter};
