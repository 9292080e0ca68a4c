//! Straight-line math for the tile walk.
//!
//! A line is kept as its origin and slope; a vertical line has an infinite
//! slope. The walk itself tracks tiles as integers and only asks the line
//! which borders it leaves a given tile through.

use serde::{Deserialize, Serialize};

use crate::direction::Borders;

/// Continuous position in tile space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Integer tile containing this point
    pub fn tile(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Line {
    pub m: f64,
    origin: Point,
}

impl Line {
    /// Line through two distinct points; division by zero yields the
    /// infinite slope of a vertical line.
    pub fn through(a: Point, b: Point) -> Self {
        Self {
            m: (b.y - a.y) / (b.x - a.x),
            origin: a,
        }
    }

    pub fn y_at(&self, x: f64) -> Option<f64> {
        self.m
            .is_finite()
            .then(|| self.origin.y + self.m * (x - self.origin.x))
    }

    /// Borders the line leaves `tile` through when travelling left to right.
    ///
    /// Decided by `c`, the height of the line at the tile's east edge
    /// measured from the tile's top. A descending line leaves south once
    /// `c` passes 1, an ascending one north once `c` drops below 0; anything
    /// else leaves east. Within `tolerance` of the corner both borders are
    /// reported.
    pub fn exit_borders(&self, tile: (i32, i32), tolerance: f64) -> Borders {
        let Some(edge_y) = self.y_at(tile.0 as f64 + 1.0) else {
            return if self.m > 0.0 {
                Borders::SOUTH
            } else {
                Borders::NORTH
            };
        };
        let c = edge_y - tile.1 as f64;
        if self.m > 0.0 {
            if (c - 1.0).abs() <= tolerance {
                Borders::SOUTH | Borders::EAST
            } else if c > 1.0 {
                Borders::SOUTH
            } else {
                Borders::EAST
            }
        } else if self.m < 0.0 {
            if c.abs() <= tolerance {
                Borders::NORTH | Borders::EAST
            } else if c < 0.0 {
                Borders::NORTH
            } else {
                Borders::EAST
            }
        } else {
            Borders::EAST
        }
    }
}
