//! In-memory reference map.
//!
//! `TileGrid` is a plain [`SightMap`] implementation: per-tile blocked
//! borders, region ids, occupants and named entity positions. Tiles outside
//! the grid are impassable and carry region 0. The host distance metric is
//! rectilinear, like a non-looping tile map.

use std::collections::HashMap;

use crate::direction::{Borders, Direction};
use crate::world::{Occupant, SightMap};

#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    width: u32,
    height: u32,
    blocked: Vec<Borders>,
    regions: Vec<i32>,
    occupants: HashMap<(i32, i32), Vec<Occupant>>,
    entities: HashMap<u32, (i32, i32)>,
}

impl TileGrid {
    /// Fully passable grid with no regions or occupants
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            blocked: vec![Borders::empty(); len],
            regions: vec![0; len],
            occupants: HashMap::new(),
            entities: HashMap::new(),
        }
    }

    /// Build from text rows: `#` is a wall, digits paint a region, anything
    /// else is open floor. Rows may differ in length; the widest sets the width.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let mut grid = Self::new(width, rows.len() as u32);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let (x, y) = (x as i32, y as i32);
                match ch {
                    '#' => grid.set_wall(x, y),
                    d if d.is_ascii_digit() => {
                        grid.set_region(x, y, d.to_digit(10).unwrap_or(0) as i32)
                    }
                    _ => {}
                }
            }
        }
        grid
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Make (x, y) impassable in every direction
    pub fn set_wall(&mut self, x: i32, y: i32) {
        self.block_borders(x, y, Borders::all());
    }

    /// Block leaving (x, y) through the given borders
    pub fn block_borders(&mut self, x: i32, y: i32, borders: Borders) {
        if let Some(i) = self.index(x, y) {
            self.blocked[i] |= borders;
        }
    }

    /// Reopen every border of (x, y)
    pub fn clear(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.blocked[i] = Borders::empty();
        }
    }

    pub fn set_region(&mut self, x: i32, y: i32, region: i32) {
        if let Some(i) = self.index(x, y) {
            self.regions[i] = region;
        }
    }

    /// Put an occupant on (x, y); its id also becomes a named entity
    pub fn add_occupant(&mut self, x: i32, y: i32, occupant: Occupant) {
        self.occupants.entry((x, y)).or_default().push(occupant);
        self.entities.insert(occupant.id, (x, y));
    }

    /// Register a named entity without putting an occupant on the map
    pub fn place_entity(&mut self, id: u32, x: i32, y: i32) {
        self.entities.insert(id, (x, y));
    }

    pub fn remove_entity(&mut self, id: u32) {
        if let Some(pos) = self.entities.remove(&id) {
            if let Some(list) = self.occupants.get_mut(&pos) {
                list.retain(|o| o.id != id);
            }
        }
    }
}

impl SightMap for TileGrid {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_passable(&self, x: i32, y: i32, dir: Direction) -> bool {
        match self.index(x, y) {
            Some(i) => !self.blocked[i].intersects(Borders::from_direction(dir)),
            None => false,
        }
    }

    fn occupants_at(&self, x: i32, y: i32) -> Vec<Occupant> {
        self.occupants.get(&(x, y)).cloned().unwrap_or_default()
    }

    fn region_id(&self, x: i32, y: i32) -> i32 {
        self.index(x, y).map(|i| self.regions[i]).unwrap_or(0)
    }

    fn distance(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> f64 {
        x1.abs_diff(x2) as f64 + y1.abs_diff(y2) as f64
    }

    fn entity_position(&self, id: u32) -> Option<(i32, i32)> {
        self.entities.get(&id).copied()
    }
}
