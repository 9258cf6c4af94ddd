//! Ready-made [`GridGeometry`] providers for square and hexagonal maps.

use pathwright_core::{Point, Range, Token, Vec2};

use crate::distance::DiagonalRule;
use crate::traits::GridGeometry;

// ---------------------------------------------------------------------------
// SquareGrid
// ---------------------------------------------------------------------------

/// A square grid, 8-connected unless built with [`SquareGrid::cardinal`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SquareGrid {
    bounds: Range,
    cell_size: f64,
    diagonals: bool,
    rule: DiagonalRule,
}

impl SquareGrid {
    /// A `width`×`height` grid of `cell_size`-pixel squares.
    pub fn new(width: i32, height: i32, cell_size: f64) -> Self {
        Self {
            bounds: Range::sized(width, height),
            cell_size,
            diagonals: true,
            rule: DiagonalRule::Standard,
        }
    }

    /// Restrict movement to the four cardinal directions.
    pub fn cardinal(self) -> Self {
        Self {
            diagonals: false,
            ..self
        }
    }

    /// Charge diagonal steps according to `rule`.
    pub fn with_rule(self, rule: DiagonalRule) -> Self {
        Self { rule, ..self }
    }

    pub fn allows_diagonals(&self) -> bool {
        self.diagonals
    }
}

impl GridGeometry for SquareGrid {
    fn bounds(&self) -> Range {
        self.bounds
    }

    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        if self.diagonals {
            buf.extend_from_slice(&p.neighbors_8());
        } else {
            buf.extend_from_slice(&p.neighbors_4());
        }
    }

    fn is_diagonal(&self, from: Point, to: Point) -> bool {
        from.x != to.x && from.y != to.y
    }

    fn diagonal_rule(&self) -> DiagonalRule {
        self.rule
    }

    fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn to_pixels(&self, p: Point) -> Vec2 {
        Vec2::new(p.x as f64 * self.cell_size, p.y as f64 * self.cell_size)
    }

    fn to_cell(&self, px: Vec2) -> Point {
        Point::new(
            (px.x / self.cell_size).floor() as i32,
            (px.y / self.cell_size).floor() as i32,
        )
    }

    /// Odd-sized tokens snap to cell centers, even-sized ones to the cell's
    /// top-left corner, and tokens of half a cell or less to the center of
    /// the top-left quarter.
    fn snap_point(&self, p: Point, token: &Token) -> Vec2 {
        let tl = self.to_pixels(p);
        Vec2::new(
            snap_axis(tl.x, self.cell_size, token.width),
            snap_axis(tl.y, self.cell_size, token.height),
        )
    }
}

fn snap_axis(top_left: f64, cell_size: f64, extent: f64) -> f64 {
    if extent <= 0.5 {
        top_left + (cell_size / 2.0).floor() / 2.0
    } else if extent < 1.0 || (extent.round() as i64) % 2 == 1 {
        top_left + cell_size / 2.0
    } else {
        top_left
    }
}

// ---------------------------------------------------------------------------
// HexGrid
// ---------------------------------------------------------------------------

/// Offset-coordinate layout of a hex grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HexLayout {
    /// Pointy-top hexes, odd rows shoved right.
    OddRows,
    /// Pointy-top hexes, even rows shoved right.
    EvenRows,
    /// Flat-top hexes, odd columns shoved down.
    OddColumns,
    /// Flat-top hexes, even columns shoved down.
    EvenColumns,
}

impl HexLayout {
    fn is_columns(self) -> bool {
        matches!(self, Self::OddColumns | Self::EvenColumns)
    }

    fn is_shoved(self, line: i32) -> bool {
        match self {
            Self::OddRows | Self::OddColumns => line.rem_euclid(2) == 1,
            Self::EvenRows | Self::EvenColumns => line.rem_euclid(2) == 0,
        }
    }
}

const SHOVED: [Point; 6] = [
    Point::new(1, 0),
    Point::new(-1, 0),
    Point::new(0, -1),
    Point::new(1, -1),
    Point::new(0, 1),
    Point::new(1, 1),
];

const UNSHOVED: [Point; 6] = [
    Point::new(1, 0),
    Point::new(-1, 0),
    Point::new(-1, -1),
    Point::new(0, -1),
    Point::new(-1, 1),
    Point::new(0, 1),
];

/// A hex grid in offset coordinates. Six neighbours, no diagonals.
///
/// `cell_size` is the distance between two opposite flat sides. Column
/// layouts are handled as transposed row layouts.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HexGrid {
    bounds: Range,
    cell_size: f64,
    layout: HexLayout,
}

impl HexGrid {
    pub fn new(width: i32, height: i32, cell_size: f64, layout: HexLayout) -> Self {
        Self {
            bounds: Range::sized(width, height),
            cell_size,
            layout,
        }
    }

    pub fn layout(&self) -> HexLayout {
        self.layout
    }

    /// Swap axes for column layouts so the rest of the code only deals
    /// with rows.
    #[inline]
    fn local(&self, p: Point) -> Point {
        if self.layout.is_columns() {
            Point::new(p.y, p.x)
        } else {
            p
        }
    }

    #[inline]
    fn global_px(&self, v: Vec2) -> Vec2 {
        if self.layout.is_columns() {
            Vec2::new(v.y, v.x)
        } else {
            v
        }
    }

    /// Pointy side to pointy side.
    #[inline]
    fn long_diameter(&self) -> f64 {
        self.cell_size * 2.0 / 3f64.sqrt()
    }

    /// Center of local (row-layout) cell `l`, in local pixel space.
    fn local_center(&self, l: Point) -> Vec2 {
        let w = self.cell_size;
        let h = self.long_diameter();
        let shove = if self.layout.is_shoved(l.y) { w / 2.0 } else { 0.0 };
        Vec2::new(l.x as f64 * w + shove + w / 2.0, l.y as f64 * h * 0.75 + h / 2.0)
    }
}

impl GridGeometry for HexGrid {
    fn bounds(&self) -> Range {
        self.bounds
    }

    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        let l = self.local(p);
        let offsets = if self.layout.is_shoved(l.y) { &SHOVED } else { &UNSHOVED };
        for &d in offsets {
            buf.push(self.local(l + d));
        }
    }

    fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn to_pixels(&self, p: Point) -> Vec2 {
        let c = self.local_center(self.local(p));
        let tl = Vec2::new(c.x - self.cell_size / 2.0, c.y - self.long_diameter() / 2.0);
        self.global_px(tl)
    }

    fn center(&self, p: Point) -> Vec2 {
        self.global_px(self.local_center(self.local(p)))
    }

    /// Hex cells are the Voronoi regions of their centers, so the nearest
    /// center among the candidate rows and columns wins.
    fn to_cell(&self, px: Vec2) -> Point {
        let v = self.global_px(px);
        let w = self.cell_size;
        let pitch = self.long_diameter() * 0.75;
        let row = (v.y / pitch).floor() as i32;
        let col = (v.x / w).floor() as i32;
        let mut best = Point::new(col, row);
        let mut best_dist = f64::INFINITY;
        for r in row - 1..=row + 1 {
            for c in col - 1..=col + 1 {
                let l = Point::new(c, r);
                let d = self.local_center(l).distance_to(v);
                if d < best_dist {
                    best_dist = d;
                    best = l;
                }
            }
        }
        self.local(best)
    }
}
