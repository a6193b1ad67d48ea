//! Conversion between diagram-local and absolute positions, and packing of
//! states that have no saved position.

use serde::Deserialize;

use switchboard_core::geometry::{Point, Size};

use super::{GridPacker, Packer, RowPacker};
use crate::config::LayoutConfig;

/// Packing used for states without a saved position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingStrategy {
    /// A fixed number of columns, see [`GridPacker`].
    #[default]
    Columns,
    /// Rows bounded by a maximum width, see [`RowPacker`].
    Rows,
}

/// Places states on the visual surface.
///
/// Saved positions are diagram-local. The absolute position handed to the
/// visual layer is `origin + local - scroll`, where `origin` is the
/// diagram's offset on the page and `scroll` the scroll offset of its
/// container.
pub struct Placement {
    origin: Point,
    scroll: Point,
    cell_padding: f32,
    packer: Box<dyn Packer>,
}

impl std::fmt::Debug for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Placement")
            .field("origin", &self.origin)
            .field("scroll", &self.scroll)
            .field("cell_padding", &self.cell_padding)
            .finish_non_exhaustive()
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl Placement {
    pub fn new(config: &LayoutConfig) -> Self {
        let packer: Box<dyn Packer> = match config.strategy() {
            PackingStrategy::Columns => Box::new(GridPacker::new(config.num_cols())),
            PackingStrategy::Rows => Box::new(RowPacker::new(config.max_row_width())),
        };
        Self {
            origin: Point::default(),
            scroll: Point::default(),
            cell_padding: config.cell_padding(),
            packer,
        }
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = scroll;
    }

    /// Converts a saved, diagram-local position to an absolute one.
    pub fn to_absolute(&self, local: Point) -> Point {
        self.origin.add_point(local).sub_point(self.scroll)
    }

    /// Converts an absolute position, such as the end of a drag, back to a
    /// diagram-local one.
    pub fn to_local(&self, absolute: Point) -> Point {
        absolute.add_point(self.scroll).sub_point(self.origin)
    }

    /// Packs a state of `size`, returning its diagram-local position.
    pub fn pack(&mut self, size: Size) -> Point {
        self.packer.add(self.cell(size))
    }

    /// The diagram-local position [`pack`](Self::pack) would return.
    pub fn peek(&self, size: Size) -> Point {
        self.packer.next(self.cell(size))
    }

    /// Restarts packing from the diagram origin.
    pub fn reset(&mut self) {
        self.packer.reset();
    }

    fn cell(&self, size: Size) -> Size {
        size.add_padding(self.cell_padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_and_local_positions() {
        let mut placement = Placement::default().with_origin(Point::new(100.0, 50.0));
        placement.set_scroll(Point::new(10.0, 5.0));

        let absolute = placement.to_absolute(Point::new(20.0, 30.0));
        assert_eq!(absolute, Point::new(110.0, 75.0));
        assert_eq!(placement.to_local(absolute), Point::new(20.0, 30.0));
    }

    #[test]
    fn test_pack_uses_configured_strategy() {
        let config = LayoutConfig::new(PackingStrategy::Rows, 3, 25.0);
        let mut placement = Placement::new(&config);

        assert_eq!(placement.pack(Size::new(20.0, 10.0)), Point::new(0.0, 0.0));
        assert_eq!(placement.peek(Size::new(20.0, 10.0)), Point::new(0.0, 10.0));
        assert_eq!(placement.pack(Size::new(20.0, 10.0)), Point::new(0.0, 10.0));
    }

    #[test]
    fn test_cell_padding_widens_cells() {
        let config = LayoutConfig::default().with_cell_padding(5.0);
        let mut placement = Placement::new(&config);

        placement.pack(Size::new(20.0, 10.0));
        assert_eq!(placement.pack(Size::new(20.0, 10.0)), Point::new(25.0, 0.0));

        placement.reset();
        assert_eq!(placement.peek(Size::new(1.0, 1.0)), Point::default());
    }
}
