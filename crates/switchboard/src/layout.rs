//! Placement of states on the visual surface.
//!
//! - [`GridPacker`] and [`RowPacker`] hand out positions for items of known
//!   size.
//! - [`Placement`] turns saved positions into absolute ones and packs states
//!   that have none.

mod grid;
mod placement;

pub use grid::{GridPacker, Packer, Row, RowPacker};
pub use placement::{PackingStrategy, Placement};
