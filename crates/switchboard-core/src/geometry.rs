//! Positions and extents of states on the canvas.
//!
//! Coordinates grow right and down from a top-left origin. A state's
//! position is always its top-left corner. Positions stored on the model
//! are relative to the diagram; positions handed to the visual layer are
//! absolute (see `switchboard::layout::Placement`).

/// A 2D coordinate.
///
/// ```
/// # use switchboard_core::geometry::Point;
/// let origin = Point::new(100.0, 40.0);
/// let local = Point::new(10.0, 20.0);
///
/// let absolute = origin.add_point(local);
/// assert_eq!(absolute, Point::new(110.0, 60.0));
/// assert_eq!(absolute.sub_point(origin), local);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// Offsets this point by `offset`.
    pub fn add_point(self, offset: Point) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }

    /// Expresses this point relative to `origin`.
    pub fn sub_point(self, origin: Point) -> Self {
        Self::new(self.x - origin.x, self.y - origin.y)
    }

    /// The box of `size` whose top-left corner is this point.
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_top_left(self, size)
    }
}

/// Width and height of a state or a grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Grows both dimensions by `padding`, leaving a gutter on the right
    /// and bottom edges of a cell.
    pub fn add_padding(self, padding: f32) -> Self {
        Self::new(self.width + padding, self.height + padding)
    }
}

/// An axis-aligned box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(&self) -> f32 {
        self.min_x
    }

    pub fn min_y(&self) -> f32 {
        self.min_y
    }

    pub fn max_x(&self) -> f32 {
        self.max_x
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// The smallest box covering both.
    pub fn merge(&self, other: &Bounds) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_cell_padding() {
        let cell = Size::new(160.0, 80.0).add_padding(20.0);
        assert_eq!(cell, Size::new(180.0, 100.0));
    }

    #[test]
    fn test_state_box() {
        let bounds = Point::new(10.0, 20.0).to_bounds(Size::new(100.0, 50.0));

        assert_approx_eq!(f32, bounds.min_x(), 10.0);
        assert_approx_eq!(f32, bounds.max_x(), 110.0);
        assert_approx_eq!(f32, bounds.height(), 50.0);
        assert_eq!(bounds.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_merge_covers_both() {
        let a = Point::new(0.0, 0.0).to_bounds(Size::new(10.0, 10.0));
        let b = Point::new(20.0, 5.0).to_bounds(Size::new(10.0, 30.0));

        let merged = a.merge(&b);
        assert_approx_eq!(f32, merged.min_y(), 0.0);
        assert_approx_eq!(f32, merged.width(), 30.0);
        assert_approx_eq!(f32, merged.height(), 35.0);
    }

    proptest! {
        #[test]
        fn local_absolute_round_trip(
            ox in -1000i32..1000, oy in -1000i32..1000,
            x in -1000i32..1000, y in -1000i32..1000,
        ) {
            let origin = Point::new(ox as f32, oy as f32);
            let local = Point::new(x as f32, y as f32);
            prop_assert_eq!(origin.add_point(local).sub_point(origin), local);
        }
    }
}
