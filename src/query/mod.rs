//! Sight queries.
//!
//! [`Sight`] binds a config to a host map and answers "can this observer
//! see that tile". Each query runs the same pipeline:
//! - Range check, then field-of-view check
//! - Piercing observers stop there and see the target
//! - Otherwise the sight line is traced and every tile tested for occlusion

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::SightConfig;
use crate::direction::Direction;
use crate::error::SightError;
use crate::filter::{in_arc, in_range};
use crate::geometry::{trace_tiles, SightLine};
use crate::logging::TimingSpan;
use crate::occlusion::Occluder;
use crate::world::{Located, Occupant, OccupantFlags, SightMap};

/// The one doing the looking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observer {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    /// Sees through every obstacle (range and FOV still apply)
    pub piercing: bool,
}

impl Observer {
    pub fn new(x: i32, y: i32, direction: Direction) -> Self {
        Self {
            x,
            y,
            direction,
            piercing: false,
        }
    }

    /// Observer backed by a map occupant; piercing comes from its tags
    pub fn from_occupant(x: i32, y: i32, direction: Direction, occupant: &Occupant) -> Self {
        Self {
            piercing: occupant.has(OccupantFlags::PIERCING_SIGHT),
            ..Self::new(x, y, direction)
        }
    }

    pub fn with_piercing(mut self, piercing: bool) -> Self {
        self.piercing = piercing;
        self
    }
}

impl Located for Observer {
    fn tile(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// A single self-contained sight question
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SightQuery {
    pub observer: Observer,
    pub target: (i32, i32),
    /// `None` uses the config's default range
    pub range: Option<f64>,
    /// `None` uses the config's default FOV
    pub fov: Option<f64>,
    /// Overrides the observer's own piercing flag
    pub piercing: Option<bool>,
}

impl SightQuery {
    pub fn new(observer: Observer, target: (i32, i32)) -> Self {
        Self {
            observer,
            target,
            range: None,
            fov: None,
            piercing: None,
        }
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_fov(mut self, fov: f64) -> Self {
        self.fov = Some(fov);
        self
    }

    pub fn with_piercing(mut self, piercing: bool) -> Self {
        self.piercing = Some(piercing);
        self
    }
}

/// Query surface over one map
pub struct Sight<'a, M: SightMap + ?Sized> {
    config: &'a SightConfig,
    map: &'a M,
}

impl<'a, M: SightMap + ?Sized> Sight<'a, M> {
    pub fn new(config: &'a SightConfig, map: &'a M) -> Self {
        Self { config, map }
    }

    pub fn config(&self) -> &SightConfig {
        self.config
    }

    fn occluder(&self) -> Occluder<'a, M> {
        let config = self.config;
        Occluder {
            map: self.map,
            map_occlusion: config.map_occlusion,
            event_occlusion: config.event_occlusion,
            regions: &config.regions,
        }
    }

    /// Can `observer` see tile (x, y)?
    pub fn can_see_tile(
        &self,
        observer: &Observer,
        x: i32,
        y: i32,
        range: Option<f64>,
        fov: Option<f64>,
    ) -> bool {
        self.evaluate(&SightQuery {
            observer: *observer,
            target: (x, y),
            range,
            fov,
            piercing: None,
        })
    }

    /// Can `observer` see the tile `other` stands on?
    pub fn can_see_actor(
        &self,
        observer: &Observer,
        other: &impl Located,
        range: Option<f64>,
        fov: Option<f64>,
    ) -> bool {
        let (x, y) = other.tile();
        self.can_see_tile(observer, x, y, range, fov)
    }

    /// Can `observer` see the named entity `id`?
    pub fn can_see_named(
        &self,
        observer: &Observer,
        id: u32,
        range: Option<f64>,
        fov: Option<f64>,
    ) -> Result<bool, SightError> {
        let Some((x, y)) = self.map.entity_position(id) else {
            let err = SightError::UnknownEntity(id);
            error!(target: "tower_sight::query", "{}", err);
            return Err(err);
        };
        Ok(self.can_see_tile(observer, x, y, range, fov))
    }

    /// Run one query through range, arc and occlusion checks
    pub fn evaluate(&self, query: &SightQuery) -> bool {
        let observer = &query.observer;
        let from = observer.tile();
        let to = query.target;
        let range = query
            .range
            .filter(|r| !r.is_nan())
            .unwrap_or(self.config.default_range);
        let fov = query
            .fov
            .filter(|f| !f.is_nan())
            .unwrap_or(self.config.default_fov);

        if !in_range(self.map, self.config.distance_metric, from, to, range) {
            debug!(target: "tower_sight::query", ?from, ?to, range, "out of range");
            return false;
        }
        if !in_arc(from, to, observer.direction, fov) {
            debug!(target: "tower_sight::query", ?from, ?to, fov, "outside field of view");
            return false;
        }
        if query.piercing.unwrap_or(observer.piercing) {
            debug!(target: "tower_sight::query", ?from, ?to, "piercing sight");
            return true;
        }

        let line = self.trace(observer, to.0, to.1);
        let visible = !self.occluder().any_blocked(&line.tiles);
        debug!(
            target: "tower_sight::query",
            ?from,
            ?to,
            tiles = line.len(),
            visible,
            "sight line checked"
        );
        visible
    }

    /// Tiles on the sight line from `observer` to (x, y)
    pub fn trace(&self, observer: &Observer, x: i32, y: i32) -> SightLine {
        trace_tiles(
            observer.x,
            observer.y,
            x,
            y,
            self.config.anchor,
            (self.map.width(), self.map.height()),
        )
    }
}

impl<'a, M: SightMap + Sync + ?Sized> Sight<'a, M> {
    /// Evaluate many queries in parallel; results keep the input order
    pub fn evaluate_batch(&self, queries: &[SightQuery]) -> Vec<bool> {
        let _span = TimingSpan::new("evaluate_batch");
        debug!(target: "tower_sight::query", count = queries.len(), "batch evaluation");
        queries.par_iter().map(|q| self.evaluate(q)).collect()
    }
}
