//! Tower Sightline - Tile-Grid Line-of-Sight Library
//!
//! This crate answers "can A see B" on a tile map:
//! - Sight-line tracing (ordered tiles + border crossings per tile)
//! - Range and field-of-view pre-checks
//! - Occlusion rules (terrain passability, occupants, regions)
//! - Query surface for tiles, actors and named entities
//! - Notetag resolution, configuration loading, chase-AI hook
//!
//! The host map is reached only through the [`world::SightMap`] trait.

pub mod chase;
pub mod config;
pub mod constants;
pub mod direction;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod notetags;
pub mod occlusion;
#[cfg(feature = "bevy")]
pub mod plugin;
pub mod query;
pub mod world;

pub use config::SightConfig;
pub use direction::Direction;
pub use error::{ConfigError, SightError};
pub use geometry::{trace_tiles, SightLine, TileCrossing};
pub use query::{Observer, Sight, SightQuery};
pub use world::{Occupant, OccupantFlags, SightMap};
