//! Centralized sight constants.
//!
//! Defaults mirror the host's plugin-parameter defaults so a map configured
//! with no parameters behaves the same as one configured with the defaults.

// =====================================================
// Query defaults
// =====================================================

/// Field of vision used when a query does not specify one (degrees)
pub const DEFAULT_FOV: f64 = 90.0;

/// Range used when a query does not specify one (negative = unlimited)
pub const DEFAULT_RANGE: f64 = -1.0;

/// FOV at or above which the arc check always passes
pub const FULL_CIRCLE: f64 = 360.0;

// =====================================================
// Anchors
// =====================================================

/// Default in-tile anchor (tile centre)
pub const DEFAULT_ANCHOR: f64 = 0.5;

/// Lowest accepted anchor fraction
pub const ANCHOR_MIN: f64 = 0.01;

/// Highest accepted anchor fraction
pub const ANCHOR_MAX: f64 = 0.99;

// =====================================================
// Geometry
// =====================================================

/// Minimum iteration budget for a single sight-line walk
pub const MIN_LINE_TILES: usize = 100;

/// Walk budget per unit of rectilinear distance
pub const LINE_TILES_PER_STEP: usize = 2;

/// Border intercepts within this many tile epsilons of 0 or 1 count as corners
pub const CORNER_TOLERANCE_STEPS: f64 = 8.0;

// =====================================================
// Notetags
// =====================================================

/// Default key for the "always blocks sight" occupant tag
pub const TAG_SIGHT_BLOCK: &str = "sight block";

/// Default key for the "never blocks sight" occupant tag
pub const TAG_NO_SIGHT_BLOCK: &str = "no sight block";

/// Default key for the "sight ignores occlusion" observer tag
pub const TAG_PIERCING_SIGHT: &str = "piercing sight";
