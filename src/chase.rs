//! Chase-AI sight hook.
//!
//! Hosts with a "chase the player" AI can route its sight check through the
//! line-of-sight engine. Each chaser carries its own range and FOV
//! properties; the hook picks which property to read.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::query::{Observer, Sight, SightQuery};
use crate::world::{Located, SightMap};

/// Which chaser property supplies the sight range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeSource {
    /// No property; the config's default range applies
    #[default]
    Default,
    Chase,
    Flee,
    Sight,
}

impl RangeSource {
    /// Parse a host property name (`_chaseRange`, `_fleeRange`, `_sightRange`)
    pub fn from_param(value: &str) -> Self {
        let name = value.trim().trim_start_matches('_').to_lowercase();
        match name.as_str() {
            "" => Self::Default,
            "chaserange" => Self::Chase,
            "fleerange" => Self::Flee,
            "sightrange" => Self::Sight,
            other => {
                warn!("Unknown chase range property '{}', using default range", other);
                Self::Default
            }
        }
    }

    pub fn pick(&self, stats: &ChaserStats) -> Option<f64> {
        match self {
            Self::Default => None,
            Self::Chase => stats.chase_range,
            Self::Flee => stats.flee_range,
            Self::Sight => stats.sight_range,
        }
    }
}

/// Which chaser property supplies the field of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FovSource {
    #[default]
    Default,
    Fov,
}

impl FovSource {
    /// Parse a host property name (`_fov`)
    pub fn from_param(value: &str) -> Self {
        let name = value.trim().trim_start_matches('_').to_lowercase();
        match name.as_str() {
            "" => Self::Default,
            "fov" => Self::Fov,
            other => {
                warn!("Unknown chase FOV property '{}', using default FOV", other);
                Self::Default
            }
        }
    }

    pub fn pick(&self, stats: &ChaserStats) -> Option<f64> {
        match self {
            Self::Default => None,
            Self::Fov => stats.fov,
        }
    }
}

/// Per-chaser sight properties as the host stores them
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChaserStats {
    pub chase_range: Option<f64>,
    pub flee_range: Option<f64>,
    pub sight_range: Option<f64>,
    pub fov: Option<f64>,
}

/// Chase-AI hook settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaseSight {
    /// Route the chase AI's player check through line of sight
    pub use_line_of_sight: bool,
    pub range_source: RangeSource,
    pub fov_source: FovSource,
}

impl ChaseSight {
    /// Line-of-sight answer for a chaser looking for the player.
    ///
    /// `None` when the hook is disabled, so the host keeps its own check.
    /// Missing chaser properties fall back to the config defaults.
    pub fn can_see_player<M: SightMap + ?Sized>(
        &self,
        sight: &Sight<'_, M>,
        chaser: &Observer,
        stats: &ChaserStats,
        player: &impl Located,
    ) -> Option<bool> {
        if !self.use_line_of_sight {
            return None;
        }
        let mut query = SightQuery::new(*chaser, player.tile());
        query.range = self.range_source.pick(stats);
        query.fov = self.fov_source.pick(stats);
        let seen = sight.evaluate(&query);
        debug!(
            target: "tower_sight::chase",
            x = chaser.x,
            y = chaser.y,
            seen,
            "chase sight check"
        );
        Some(seen)
    }
}
