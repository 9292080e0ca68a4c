//! Sight-line tile walk.
//!
//! Produces the ordered tiles a straight sight line crosses between two map
//! tiles, observer first, together with the borders the line enters and
//! leaves each tile through. Both endpoints sit at the configured in-tile
//! anchor.
//!
//! The walk always runs left to right internally; when the observer is to
//! the right of the target the endpoints are swapped and the result reversed
//! afterwards. Exact corners are crossed diagonally, so the two tiles that
//! merely touch the corner are never visited and cannot block.

pub mod line;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::constants::{
    ANCHOR_MAX, ANCHOR_MIN, CORNER_TOLERANCE_STEPS, DEFAULT_ANCHOR, LINE_TILES_PER_STEP,
    MIN_LINE_TILES,
};
use crate::direction::{Borders, Direction};
use crate::error::SightError;
pub use line::Point;
use line::Line;

/// Where sight rays start/end inside a tile, as fractions of a tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Default for Anchor {
    fn default() -> Self {
        Self {
            x: DEFAULT_ANCHOR,
            y: DEFAULT_ANCHOR,
        }
    }
}

impl Anchor {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }.clamped()
    }

    /// Anchor forced into [ANCHOR_MIN, ANCHOR_MAX]; NaN falls back to the centre
    pub fn clamped(self) -> Self {
        let fix = |v: f64| {
            if v.is_nan() {
                DEFAULT_ANCHOR
            } else {
                v.clamp(ANCHOR_MIN, ANCHOR_MAX)
            }
        };
        Self {
            x: fix(self.x),
            y: fix(self.y),
        }
    }

    /// Anchored point inside tile (x, y)
    pub fn point(&self, x: i32, y: i32) -> Point {
        Point::new(x as f64 + self.x, y as f64 + self.y)
    }
}

/// One tile on a sight line and the borders crossed inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCrossing {
    pub x: i32,
    pub y: i32,
    /// Borders the line came in through (empty for the observer's tile)
    pub entry: Borders,
    /// Borders the line leaves through (empty for the target's tile)
    pub exit: Borders,
}

impl TileCrossing {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            entry: Borders::empty(),
            exit: Borders::empty(),
        }
    }

    /// Every border crossed in this tile
    pub fn borders(&self) -> Borders {
        self.entry | self.exit
    }

    /// Crossed borders as host directions
    pub fn directions(&self) -> impl Iterator<Item = Direction> {
        self.borders().directions()
    }

    fn reversed(self) -> Self {
        Self {
            entry: self.exit,
            exit: self.entry,
            ..self
        }
    }
}

/// Result of a sight-line trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightLine {
    /// Tiles from observer to target inclusive
    pub tiles: Vec<TileCrossing>,
    /// Walk hit its iteration cap; `tiles` is partial and advisory only
    pub truncated: bool,
}

impl SightLine {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Iteration budget for a walk covering `rectilinear` tiles
pub fn max_line_tiles(rectilinear: u64) -> usize {
    (rectilinear as usize)
        .saturating_mul(LINE_TILES_PER_STEP)
        .max(MIN_LINE_TILES)
}

/// Smallest meaningful distance between coordinates on a map of this size.
///
/// Scaled by the largest coordinate the walk can see so it stays above one
/// ulp of every coordinate involved.
pub fn tile_epsilon(width: u32, height: u32) -> f64 {
    f64::EPSILON * width.max(height).max(1) as f64
}

/// Trace the sight line from tile (x1, y1) to tile (x2, y2).
///
/// `extent` is the map's (width, height) and only scales the corner
/// tolerance. Identical endpoints give a single tile with no crossings.
/// The current tile is tracked as integers and each step moves one tile
/// toward the target, so a walk takes at most the rectilinear distance in
/// steps.
pub fn trace_tiles(
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    anchor: Anchor,
    extent: (u32, u32),
) -> SightLine {
    if (x1, y1) == (x2, y2) {
        return SightLine {
            tiles: vec![TileCrossing::new(x1, y1)],
            truncated: false,
        };
    }

    let reversed = x1 > x2;
    let (from, to) = if reversed {
        ((x2, y2), (x1, y1))
    } else {
        ((x1, y1), (x2, y2))
    };

    let line = Line::through(anchor.point(from.0, from.1), anchor.point(to.0, to.1));

    let rectilinear = from.0.abs_diff(to.0) as u64 + from.1.abs_diff(to.1) as u64;
    let limit = max_line_tiles(rectilinear);

    // Corner tolerance must stay above one ulp of the largest coordinate,
    // including off-map endpoints
    let span = [x1, y1, x2, y2]
        .iter()
        .map(|c| c.unsigned_abs().saturating_add(1))
        .max()
        .unwrap_or(1);
    let tolerance = tile_epsilon(extent.0.max(span), extent.1) * CORNER_TOLERANCE_STEPS;

    let capacity = usize::try_from(rectilinear)
        .unwrap_or(usize::MAX)
        .saturating_add(1)
        .min(limit);
    let mut tiles = Vec::with_capacity(capacity);
    let (mut tx, mut ty) = from;
    let mut entry = Borders::empty();
    let mut truncated = true;

    for _ in 0..limit {
        if (tx, ty) == to {
            tiles.push(TileCrossing {
                x: tx,
                y: ty,
                entry,
                exit: Borders::empty(),
            });
            truncated = false;
            break;
        }

        // Never step past the target's column or row
        let exit = if tx == to.0 {
            if to.1 > ty {
                Borders::SOUTH
            } else {
                Borders::NORTH
            }
        } else if ty == to.1 {
            Borders::EAST
        } else {
            line.exit_borders((tx, ty), tolerance)
        };

        tiles.push(TileCrossing {
            x: tx,
            y: ty,
            entry,
            exit,
        });
        entry = exit.mirrored();
        if exit.contains(Borders::EAST) {
            tx += 1;
        }
        if exit.contains(Borders::SOUTH) {
            ty += 1;
        } else if exit.contains(Borders::NORTH) {
            ty -= 1;
        }
    }

    if truncated {
        let err = SightError::LineTruncated {
            from_x: x1,
            from_y: y1,
            to_x: x2,
            to_y: y2,
            limit,
        };
        error!(target: "tower_sight::geometry", tiles = tiles.len(), "{}", err);
    }

    if reversed {
        tiles.reverse();
        for tile in tiles.iter_mut() {
            *tile = tile.reversed();
        }
    }

    SightLine { tiles, truncated }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(line: &SightLine) -> Vec<(i32, i32)> {
        line.tiles.iter().map(|t| (t.x, t.y)).collect()
    }

    fn trace(x1: i32, y1: i32, x2: i32, y2: i32) -> SightLine {
        trace_tiles(x1, y1, x2, y2, Anchor::default(), (20, 20))
    }

    #[test]
    fn test_same_tile_single_crossing() {
        let line = trace(3, 4, 3, 4);
        assert_eq!(line.len(), 1);
        assert_eq!(line.tiles[0], TileCrossing::new(3, 4));
        assert!(line.tiles[0].borders().is_empty());
        assert!(!line.truncated);
    }

    #[test]
    fn test_horizontal_line() {
        let line = trace(0, 0, 5, 0);
        assert_eq!(
            coords(&line),
            vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]
        );
        assert_eq!(line.tiles[0].entry, Borders::empty());
        assert_eq!(line.tiles[0].exit, Borders::EAST);
        for tile in &line.tiles[1..5] {
            assert_eq!(tile.entry, Borders::WEST);
            assert_eq!(tile.exit, Borders::EAST);
        }
        assert_eq!(line.tiles[5].entry, Borders::WEST);
        assert_eq!(line.tiles[5].exit, Borders::empty());
    }

    #[test]
    fn test_reversed_line_starts_at_observer() {
        let line = trace(5, 0, 0, 0);
        assert_eq!(
            coords(&line),
            vec![(5, 0), (4, 0), (3, 0), (2, 0), (1, 0), (0, 0)]
        );
        assert_eq!(line.tiles[0].entry, Borders::empty());
        assert_eq!(line.tiles[0].exit, Borders::WEST);
        assert_eq!(line.tiles[2].entry, Borders::EAST);
        assert_eq!(line.tiles[2].exit, Borders::WEST);
        assert_eq!(line.tiles[5].entry, Borders::EAST);
    }

    #[test]
    fn test_vertical_lines() {
        let down = trace(2, 0, 2, 3);
        assert_eq!(coords(&down), vec![(2, 0), (2, 1), (2, 2), (2, 3)]);
        assert_eq!(down.tiles[1].entry, Borders::NORTH);
        assert_eq!(down.tiles[1].exit, Borders::SOUTH);

        let up = trace(2, 3, 2, 0);
        assert_eq!(coords(&up), vec![(2, 3), (2, 2), (2, 1), (2, 0)]);
        assert_eq!(up.tiles[1].entry, Borders::SOUTH);
        assert_eq!(up.tiles[1].exit, Borders::NORTH);
    }

    #[test]
    fn test_exact_diagonal_skips_side_tiles() {
        let line = trace(0, 0, 2, 2);
        assert_eq!(coords(&line), vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(line.tiles[0].exit, Borders::SOUTH | Borders::EAST);
        assert_eq!(line.tiles[1].entry, Borders::NORTH | Borders::WEST);
        assert_eq!(line.tiles[1].exit, Borders::SOUTH | Borders::EAST);
        assert_eq!(line.tiles[2].entry, Borders::NORTH | Borders::WEST);
    }

    #[test]
    fn test_exact_anti_diagonal() {
        let line = trace(0, 2, 2, 0);
        assert_eq!(coords(&line), vec![(0, 2), (1, 1), (2, 0)]);
        assert_eq!(line.tiles[1].entry, Borders::SOUTH | Borders::WEST);
        assert_eq!(line.tiles[1].exit, Borders::NORTH | Borders::EAST);
    }

    #[test]
    fn test_shallow_line_is_contiguous() {
        let line = trace(0, 0, 4, 1);
        let tiles = coords(&line);
        assert_eq!(tiles.first(), Some(&(0, 0)));
        assert_eq!(tiles.last(), Some(&(4, 1)));
        for pair in tiles.windows(2) {
            let dx = (pair[1].0 - pair[0].0).abs();
            let dy = (pair[1].1 - pair[0].1).abs();
            assert!(dx <= 1 && dy <= 1 && dx + dy >= 1, "gap in {tiles:?}");
        }
        // (0,0)->(4,1) through centres: y crosses 1.0 at x = 2.5, mid-tile
        assert_eq!(tiles, vec![(0, 0), (1, 0), (2, 0), (2, 1), (3, 1), (4, 1)]);
    }

    #[test]
    fn test_steep_line_with_offset_anchor_reaches_target() {
        let line = trace_tiles(24, 4, 23, 35, Anchor::new(0.7, 0.3), (50, 50));
        assert!(!line.truncated);
        let tiles = coords(&line);
        assert_eq!(tiles.first(), Some(&(24, 4)));
        assert_eq!(tiles.last(), Some(&(23, 35)));
        assert!(tiles.len() <= 33);
        // The observer's half of the line stays in its own column
        for y in 4..=25 {
            assert!(tiles.contains(&(24, y)), "missing (24, {y}) in {tiles:?}");
        }
        for pair in tiles.windows(2) {
            let dx = (pair[1].0 - pair[0].0).abs();
            let dy = (pair[1].1 - pair[0].1).abs();
            assert!(dx <= 1 && dy <= 1 && dx + dy >= 1, "gap in {tiles:?}");
        }
    }

    #[test]
    fn test_walk_never_overshoots_target_column() {
        for (x2, y2) in [(1, 40), (1, -40), (40, 1), (3, 97)] {
            let line = trace_tiles(0, 0, x2, y2, Anchor::new(0.99, 0.01), (100, 100));
            assert!(!line.truncated);
            assert!(line.tiles.iter().all(|t| t.x >= 0 && t.x <= x2));
            assert_eq!(line.tiles.last().map(|t| (t.x, t.y)), Some((x2, y2)));
        }
    }

    #[test]
    fn test_distant_target_capacity_is_bounded() {
        let line = trace_tiles(0, 0, 5000, 3, Anchor::default(), (10, 10));
        assert!(!line.truncated);
        assert_eq!(line.len(), 5004);
    }

    #[test]
    fn test_negative_coordinates() {
        let line = trace(-2, -1, 1, -1);
        assert_eq!(coords(&line), vec![(-2, -1), (-1, -1), (0, -1), (1, -1)]);
    }

    #[test]
    fn test_anchor_clamping() {
        let anchor = Anchor::new(0.0, 1.5);
        assert_eq!(anchor.x, ANCHOR_MIN);
        assert_eq!(anchor.y, ANCHOR_MAX);
        let anchor = Anchor::new(f64::NAN, 0.25);
        assert_eq!(anchor.x, DEFAULT_ANCHOR);
        assert_eq!(anchor.y, 0.25);
    }

    #[test]
    fn test_max_line_tiles() {
        assert_eq!(max_line_tiles(0), 100);
        assert_eq!(max_line_tiles(10), 100);
        assert_eq!(max_line_tiles(75), 150);
    }

    #[test]
    fn test_tile_epsilon_scales_with_map() {
        assert_eq!(tile_epsilon(0, 0), f64::EPSILON);
        assert_eq!(tile_epsilon(10, 40), f64::EPSILON * 40.0);
    }

    #[test]
    fn test_sight_line_json() {
        let json = trace(0, 0, 1, 0).to_json();
        assert!(json.contains("\"truncated\":false"));
        assert!(json.contains("\"tiles\""));
    }
}
