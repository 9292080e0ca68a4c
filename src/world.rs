//! Host world interface.
//!
//! The sight engine never reaches into host state directly. Everything it
//! needs about the map (passability, occupants, regions, entity lookup) is
//! asked through [`SightMap`], and occupants arrive as plain values whose
//! notetags were already resolved into [`OccupantFlags`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// Read-only view of the host map used by sight queries
pub trait SightMap {
    /// Map width in tiles
    fn width(&self) -> u32;

    /// Map height in tiles
    fn height(&self) -> u32;

    /// Can something leave tile (x, y) through its border in direction `dir`?
    fn is_passable(&self, x: i32, y: i32, dir: Direction) -> bool;

    /// Occupants (events, characters) currently standing on (x, y)
    fn occupants_at(&self, x: i32, y: i32) -> Vec<Occupant>;

    /// Region painted on (x, y); 0 means none
    fn region_id(&self, x: i32, y: i32) -> i32;

    /// Host's own distance metric between two tiles
    fn distance(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> f64;

    /// Tile position of a named entity (map event id), if it exists
    fn entity_position(&self, id: u32) -> Option<(i32, i32)>;
}

/// Anything with a tile position that can be a sight target
pub trait Located {
    fn tile(&self) -> (i32, i32);
}

impl Located for (i32, i32) {
    fn tile(&self) -> (i32, i32) {
        *self
    }
}

bitflags! {
    /// Sight-relevant capabilities of an occupant, resolved once at load
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct OccupantFlags: u16 {
        /// Occupant has an active page / is present on the map
        const ACTIVE           = 0b0000_0001;
        /// `<sight block>`: always a blocking candidate
        const SIGHT_BLOCK      = 0b0000_0010;
        /// `<no sight block>`: never blocks (beats SIGHT_BLOCK)
        const NO_SIGHT_BLOCK   = 0b0000_0100;
        /// `<piercing sight>`: sees through occlusion, is never an obstacle
        const PIERCING_SIGHT   = 0b0000_1000;
        /// Through (non-solid) movement
        const THROUGH          = 0b0001_0000;
        /// Same-as-characters priority
        const NORMAL_PRIORITY  = 0b0010_0000;
        /// Object sprite (`!` file-name prefix)
        const OBJECT_CHARACTER = 0b0100_0000;
    }
}

/// Something standing on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: u32,
    pub flags: OccupantFlags,
}

impl Occupant {
    pub fn new(id: u32, flags: OccupantFlags) -> Self {
        Self { id, flags }
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(OccupantFlags::ACTIVE)
    }

    pub fn has(&self, flag: OccupantFlags) -> bool {
        self.flags.contains(flag)
    }
}
