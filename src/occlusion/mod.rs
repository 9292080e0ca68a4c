//! Occlusion rules.
//!
//! A tile on a sight line can be blocked by three independent sources:
//! - Terrain: the host's passability in the crossed directions
//! - Occupants: events standing on the tile (never at the line's endpoints)
//! - Regions: region ids listed as blocking
//!
//! A region listed as negative (force-allow) overrides all three.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::direction::Direction;
use crate::geometry::TileCrossing;
use crate::world::{Occupant, OccupantFlags, SightMap};

/// How terrain passability affects sight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapOcclusion {
    /// Passability never blocks sight
    Ignore,
    /// Only tiles impassable in all four directions block
    AnyDirection,
    /// Tiles block when impassable in a direction the line crosses
    #[default]
    DirectionSpecific,
}

impl MapOcclusion {
    /// Parse a host parameter value; unrecognized values never block
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "direction-specific" => Self::DirectionSpecific,
            "any direction" => Self::AnyDirection,
            "ignore passability" => Self::Ignore,
            other => {
                warn!("Unknown map occlusion '{}', terrain will not block sight", other);
                Self::Ignore
            }
        }
    }
}

bitflags! {
    /// Which occupants can block sight. Empty means every active occupant does.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EventOcclusion: u8 {
        /// Occupants never block
        const IGNORE          = 0b0001;
        /// Only object sprites block
        const OBJECT_ONLY     = 0b0010;
        /// Only same-as-characters priority blocks
        const NORMAL_PRIORITY = 0b0100;
        /// Through occupants do not block
        const SEE_THROUGH     = 0b1000;
    }
}

impl EventOcclusion {
    /// Flag for one host option name. Options meaning "no restriction"
    /// (`all events`, `all priorities`, `no effect`) contribute nothing.
    pub fn from_option(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "ignore events" => Self::IGNORE,
            "object events" => Self::OBJECT_ONLY,
            "normal priority" => Self::NORMAL_PRIORITY,
            "see-through" => Self::SEE_THROUGH,
            "all events" | "all priorities" | "no effect" | "" => Self::empty(),
            other => {
                warn!("Unknown event occlusion option '{}', ignoring it", other);
                Self::empty()
            }
        }
    }

    /// Combine several host options into one mask
    pub fn from_options<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        values
            .into_iter()
            .fold(Self::empty(), |acc, v| acc | Self::from_option(v))
    }

    /// Whether `occupant` is a blocking candidate under this mask.
    ///
    /// Inactive and piercing-sight occupants never are. An explicit block
    /// tag skips the through/priority/object filters.
    pub fn considers(&self, occupant: &Occupant) -> bool {
        if !occupant.is_active() || occupant.has(OccupantFlags::PIERCING_SIGHT) {
            return false;
        }
        if occupant.has(OccupantFlags::SIGHT_BLOCK) {
            return true;
        }
        if self.contains(Self::SEE_THROUGH) && occupant.has(OccupantFlags::THROUGH) {
            return false;
        }
        if self.contains(Self::NORMAL_PRIORITY) && !occupant.has(OccupantFlags::NORMAL_PRIORITY) {
            return false;
        }
        if self.contains(Self::OBJECT_ONLY) && !occupant.has(OccupantFlags::OBJECT_CHARACTER) {
            return false;
        }
        true
    }
}

/// Terrain check for one tile
pub fn terrain_blocked<M: SightMap + ?Sized>(
    map: &M,
    mode: MapOcclusion,
    tile: &TileCrossing,
) -> bool {
    match mode {
        MapOcclusion::DirectionSpecific => tile
            .directions()
            .any(|d| !map.is_passable(tile.x, tile.y, d)),
        MapOcclusion::AnyDirection => !Direction::CARDINALS
            .iter()
            .any(|d| map.is_passable(tile.x, tile.y, *d)),
        MapOcclusion::Ignore => false,
    }
}

/// Occupant check for one tile: blocked iff some candidate lacks `<no sight block>`
pub fn occupants_block<M: SightMap + ?Sized>(
    map: &M,
    mask: EventOcclusion,
    tile: &TileCrossing,
) -> bool {
    if mask.contains(EventOcclusion::IGNORE) {
        return false;
    }
    map.occupants_at(tile.x, tile.y)
        .iter()
        .filter(|o| mask.considers(o))
        .any(|o| !o.has(OccupantFlags::NO_SIGHT_BLOCK))
}

/// Region id is listed as blocking
pub fn region_blocked(regions: &[i32], region: i32) -> bool {
    !regions.is_empty() && regions.contains(&region)
}

/// Negated region id is listed, forcing the tile see-through
pub fn region_allowed(regions: &[i32], region: i32) -> bool {
    !regions.is_empty() && regions.contains(&-region)
}

/// Occlusion rule set bound to a map
pub struct Occluder<'a, M: SightMap + ?Sized> {
    pub map: &'a M,
    pub map_occlusion: MapOcclusion,
    pub event_occlusion: EventOcclusion,
    pub regions: &'a [i32],
}

impl<'a, M: SightMap + ?Sized> Occluder<'a, M> {
    /// Is this tile opaque? Endpoints skip the occupant check.
    pub fn is_blocked(&self, tile: &TileCrossing, is_endpoint: bool) -> bool {
        let region = if self.regions.is_empty() {
            0
        } else {
            self.map.region_id(tile.x, tile.y)
        };
        if region_allowed(self.regions, region) {
            return false;
        }
        terrain_blocked(self.map, self.map_occlusion, tile)
            || (!is_endpoint && occupants_block(self.map, self.event_occlusion, tile))
            || region_blocked(self.regions, region)
    }

    /// True iff any tile blocks; first and last tiles count as endpoints
    pub fn any_blocked(&self, tiles: &[TileCrossing]) -> bool {
        let last = tiles.len().saturating_sub(1);
        tiles
            .iter()
            .enumerate()
            .any(|(i, tile)| self.is_blocked(tile, i == 0 || i == last))
    }
}
