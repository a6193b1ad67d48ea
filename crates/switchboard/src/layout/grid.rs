//! Packers that hand out positions for items of known size.
//!
//! Both packers are incremental: [`Packer::add`] returns the position for an
//! item and advances the packer, [`Packer::next`] previews the position the
//! next `add` would return without advancing.

use log::trace;

use switchboard_core::geometry::{Point, Size};

/// Incremental placement of sized items.
pub trait Packer {
    /// Places an item and advances the packer.
    fn add(&mut self, size: Size) -> Point;

    /// Returns the position [`add`](Self::add) would hand out for `size`.
    fn next(&self, size: Size) -> Point;

    /// Forgets every placed item.
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Cursor {
    x: f32,
    y: f32,
    column: usize,
    row_height: f32,
}

/// Fills a fixed number of columns left to right, then starts a new row.
///
/// Each item is placed at the running x offset of its row. The row height
/// is the tallest of the row's items *except its last one*, and the next
/// row starts that far below. A single-column grid advances by each item's
/// own height.
///
/// Because the last item of a row is not measured, a row whose last item
/// is its tallest overlaps the row below it. Equal-height items, as every
/// editor preset uses, never overlap.
///
/// ```
/// # use switchboard::layout::{GridPacker, Packer};
/// # use switchboard_core::geometry::{Point, Size};
/// let mut grid = GridPacker::new(2);
/// assert_eq!(grid.add(Size::new(10.0, 20.0)), Point::new(0.0, 0.0));
/// assert_eq!(grid.add(Size::new(30.0, 40.0)), Point::new(10.0, 0.0));
/// // The 40-high item reaches y = 40, but the next row starts at 20.
/// assert_eq!(grid.next(Size::new(5.0, 5.0)), Point::new(0.0, 20.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GridPacker {
    num_cols: usize,
    cursor: Cursor,
}

impl GridPacker {
    /// Creates a packer with `num_cols` columns (at least one).
    pub fn new(num_cols: usize) -> Self {
        Self {
            num_cols: num_cols.max(1),
            cursor: Cursor::default(),
        }
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn step(&self, size: Size) -> (Point, Cursor) {
        let cursor = self.cursor;
        let position = Point::new(cursor.x, cursor.y);

        let advanced = if cursor.column + 1 >= self.num_cols {
            let row_height = if cursor.column == 0 {
                size.height()
            } else {
                cursor.row_height
            };
            Cursor {
                x: 0.0,
                y: cursor.y + row_height,
                column: 0,
                row_height: 0.0,
            }
        } else {
            Cursor {
                x: cursor.x + size.width(),
                y: cursor.y,
                column: cursor.column + 1,
                row_height: cursor.row_height.max(size.height()),
            }
        };
        (position, advanced)
    }
}

impl Packer for GridPacker {
    fn add(&mut self, size: Size) -> Point {
        let (position, cursor) = self.step(size);
        trace!(x = position.x(), y = position.y(), column = self.cursor.column; "Grid placed item");
        self.cursor = cursor;
        position
    }

    fn next(&self, size: Size) -> Point {
        self.step(size).0
    }

    fn reset(&mut self) {
        self.cursor = Cursor::default();
    }
}

/// A row produced by [`RowPacker`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Insertion indices of the row's items.
    pub items: Vec<usize>,
    /// Total width taken by the row.
    pub span: f32,
    pub height: f32,
}

/// Packs items into rows no wider than `max_span`, in insertion order.
///
/// An item wider than `max_span` gets a row of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPacker {
    max_span: f32,
    rows: Vec<Row>,
    top: f32,
    count: usize,
}

impl RowPacker {
    pub fn new(max_span: f32) -> Self {
        Self {
            max_span,
            rows: Vec::new(),
            top: 0.0,
            count: 0,
        }
    }

    pub fn max_span(&self) -> f32 {
        self.max_span
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn fits(&self, row: &Row, size: Size) -> bool {
        row.items.is_empty() || row.span + size.width() <= self.max_span
    }
}

impl Packer for RowPacker {
    fn add(&mut self, size: Size) -> Point {
        let needs_row = self.rows.last().is_none_or(|row| !self.fits(row, size));
        if needs_row {
            if let Some(last) = self.rows.last() {
                self.top += last.height;
            }
            self.rows.push(Row {
                items: Vec::new(),
                span: 0.0,
                height: 0.0,
            });
        }

        let index = self.count;
        self.count += 1;
        let top = self.top;
        let Some(row) = self.rows.last_mut() else {
            return Point::new(0.0, top);
        };
        let position = Point::new(row.span, top);
        row.items.push(index);
        row.span += size.width();
        row.height = row.height.max(size.height());
        position
    }

    fn next(&self, size: Size) -> Point {
        match self.rows.last() {
            Some(row) if self.fits(row, size) => Point::new(row.span, self.top),
            Some(row) => Point::new(0.0, self.top + row.height),
            None => Point::default(),
        }
    }

    fn reset(&mut self) {
        self.rows.clear();
        self.top = 0.0;
        self.count = 0;
    }
}
