//! Compass directions and tile borders.
//!
//! Directions keep the host's numeric-keypad codes (2 = down, 4 = left,
//! 6 = right, 8 = up, diagonals on the corners) so values can be exchanged
//! with host systems unchanged. Angles are measured in screen space: the
//! y axis grows downwards, so south is 90 degrees.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// 8-way facing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    SouthWest,
    South,
    SouthEast,
    West,
    East,
    NorthWest,
    North,
    NorthEast,
}

impl Direction {
    pub const CARDINALS: [Direction; 4] = [
        Direction::South,
        Direction::West,
        Direction::East,
        Direction::North,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::SouthWest),
            2 => Some(Self::South),
            3 => Some(Self::SouthEast),
            4 => Some(Self::West),
            6 => Some(Self::East),
            7 => Some(Self::NorthWest),
            8 => Some(Self::North),
            9 => Some(Self::NorthEast),
            _ => None,
        }
    }

    /// Host numeric code
    pub fn code(&self) -> u8 {
        match self {
            Self::SouthWest => 1,
            Self::South => 2,
            Self::SouthEast => 3,
            Self::West => 4,
            Self::East => 6,
            Self::NorthWest => 7,
            Self::North => 8,
            Self::NorthEast => 9,
        }
    }

    /// Reverse direction (host relation: `10 - code`)
    pub fn opposite(&self) -> Self {
        match self {
            Self::SouthWest => Self::NorthEast,
            Self::South => Self::North,
            Self::SouthEast => Self::NorthWest,
            Self::West => Self::East,
            Self::East => Self::West,
            Self::NorthWest => Self::SouthEast,
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
        }
    }

    /// Bearing in degrees from the +x axis, clockwise on screen
    pub fn angle(&self) -> f64 {
        match self {
            Self::East => 0.0,
            Self::SouthEast => 45.0,
            Self::South => 90.0,
            Self::SouthWest => 135.0,
            Self::West => 180.0,
            Self::NorthWest => 225.0,
            Self::North => 270.0,
            Self::NorthEast => 315.0,
        }
    }

    pub fn is_cardinal(&self) -> bool {
        matches!(self, Self::South | Self::West | Self::East | Self::North)
    }
}

bitflags! {
    /// Set of cardinal tile borders crossed by a sight line
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Borders: u8 {
        const NORTH = 0b0001;
        const SOUTH = 0b0010;
        const EAST  = 0b0100;
        const WEST  = 0b1000;
    }
}

impl Borders {
    /// Border set for a single cardinal direction; diagonals map to their
    /// two component borders.
    pub fn from_direction(dir: Direction) -> Self {
        match dir {
            Direction::North => Self::NORTH,
            Direction::South => Self::SOUTH,
            Direction::East => Self::EAST,
            Direction::West => Self::WEST,
            Direction::NorthEast => Self::NORTH | Self::EAST,
            Direction::NorthWest => Self::NORTH | Self::WEST,
            Direction::SouthEast => Self::SOUTH | Self::EAST,
            Direction::SouthWest => Self::SOUTH | Self::WEST,
        }
    }

    /// Cardinal directions in this set, in host code order
    pub fn directions(self) -> impl Iterator<Item = Direction> {
        Direction::CARDINALS
            .into_iter()
            .filter(move |d| self.contains(Self::from_direction(*d)))
    }

    /// Same borders seen from the neighbouring tile (N <-> S, E <-> W)
    pub fn mirrored(self) -> Self {
        let mut out = Self::empty();
        if self.contains(Self::NORTH) {
            out |= Self::SOUTH;
        }
        if self.contains(Self::SOUTH) {
            out |= Self::NORTH;
        }
        if self.contains(Self::EAST) {
            out |= Self::WEST;
        }
        if self.contains(Self::WEST) {
            out |= Self::EAST;
        }
        out
    }

    /// True when the set names a corner (one vertical and one horizontal border)
    pub fn is_corner(self) -> bool {
        self.intersects(Self::NORTH | Self::SOUTH) && self.intersects(Self::EAST | Self::WEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in [1, 2, 3, 4, 6, 7, 8, 9] {
            let dir = Direction::from_code(code).unwrap();
            assert_eq!(dir.code(), code);
        }
        assert_eq!(Direction::from_code(0), None);
        assert_eq!(Direction::from_code(5), None);
    }

    #[test]
    fn test_opposite_matches_host_relation() {
        for code in [1, 2, 3, 4, 6, 7, 8, 9] {
            let dir = Direction::from_code(code).unwrap();
            assert_eq!(dir.opposite().code(), 10 - code);
        }
    }

    #[test]
    fn test_angles_are_screen_space() {
        assert_eq!(Direction::East.angle(), 0.0);
        assert_eq!(Direction::South.angle(), 90.0);
        assert_eq!(Direction::West.angle(), 180.0);
        assert_eq!(Direction::North.angle(), 270.0);
        assert_eq!(Direction::NorthEast.angle(), 315.0);
    }

    #[test]
    fn test_borders_directions() {
        let set = Borders::WEST | Borders::EAST;
        let dirs: Vec<Direction> = set.directions().collect();
        assert_eq!(dirs, vec![Direction::West, Direction::East]);
        assert!(!set.is_corner());
        assert!((Borders::NORTH | Borders::EAST).is_corner());
        assert_eq!(Borders::empty().directions().count(), 0);
    }

    #[test]
    fn test_borders_mirrored() {
        assert_eq!(Borders::EAST.mirrored(), Borders::WEST);
        assert_eq!(
            (Borders::SOUTH | Borders::EAST).mirrored(),
            Borders::NORTH | Borders::WEST
        );
        assert_eq!(Borders::empty().mirrored(), Borders::empty());
    }
}
