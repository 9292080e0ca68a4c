//! Sight Configuration
//!
//! One immutable [`SightConfig`] drives every query:
//! - Built from defaults, host plugin parameters or a RON/JSON file
//! - Sanitized once by [`SightConfig::validate`]
//! - Optionally installed as a process-wide, set-once instance

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chase::{ChaseSight, FovSource, RangeSource};
use crate::constants::{DEFAULT_ANCHOR, DEFAULT_FOV, DEFAULT_RANGE};
use crate::error::ConfigError;
use crate::filter::DistanceMetric;
use crate::geometry::Anchor;
use crate::notetags::TagKeys;
use crate::occlusion::{EventOcclusion, MapOcclusion};

// Host plugin parameter names
const P_DEFAULT_FOV: &str = "Default FOV";
const P_DEFAULT_RANGE: &str = "Default Range";
const P_ANCHOR_X: &str = "Tile Anchor X";
const P_ANCHOR_Y: &str = "Tile Anchor Y";
const P_DISTANCE: &str = "Distance Metric";
const P_MAP_OCCLUSION: &str = "Map Occlusion";
const P_EVENT_TYPE: &str = "Event Type Occlusion";
const P_EVENT_PRIORITY: &str = "Event Priority Occlusion";
const P_EVENT_THROUGH: &str = "Event Through";
const P_REGIONS: &str = "Region Occlusion";
const P_TAG_BLOCK: &str = "Event tag: block";
const P_TAG_NO_BLOCK: &str = "Event tag: no block";
const P_TAG_PIERCING: &str = "Event tag: piercing";
const P_CHASE_USE: &str = "YEP_ECP Use LoS";
const P_CHASE_RANGE: &str = "YEP_ECP Sight range";
const P_CHASE_FOV: &str = "YEP_ECP Sight FOV";

/// Line-of-sight settings shared by all queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SightConfig {
    pub map_occlusion: MapOcclusion,
    /// Empty means every active occupant is a blocking candidate
    pub event_occlusion: EventOcclusion,
    /// Positive ids block sight, negative ids force their region see-through
    pub regions: Vec<i32>,
    pub anchor: Anchor,
    /// Negative is unlimited
    pub default_range: f64,
    /// Degrees
    pub default_fov: f64,
    pub distance_metric: DistanceMetric,
    pub tags: TagKeys,
    pub chase: ChaseSight,
}

impl Default for SightConfig {
    fn default() -> Self {
        Self {
            map_occlusion: MapOcclusion::DirectionSpecific,
            event_occlusion: EventOcclusion::IGNORE,
            regions: Vec::new(),
            anchor: Anchor::default(),
            default_range: DEFAULT_RANGE,
            default_fov: DEFAULT_FOV,
            distance_metric: DistanceMetric::Host,
            tags: TagKeys::default(),
            chase: ChaseSight::default(),
        }
    }
}

impl SightConfig {
    /// Build from the host's string-keyed plugin parameters.
    ///
    /// Missing keys take their defaults. Unrecognized values are logged and
    /// replaced by the non-blocking default.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| params.get(key).map(String::as_str);
        let number = |key: &str, fallback: f64| parse_number(key, get(key), fallback);

        let map_occlusion = get(P_MAP_OCCLUSION)
            .map(MapOcclusion::from_param)
            .unwrap_or_default();
        let event_occlusion = EventOcclusion::from_options([
            get(P_EVENT_TYPE).unwrap_or("Ignore events"),
            get(P_EVENT_PRIORITY).unwrap_or("All priorities"),
            get(P_EVENT_THROUGH).unwrap_or("No effect"),
        ]);

        let config = Self {
            map_occlusion,
            event_occlusion,
            regions: get(P_REGIONS).map(parse_regions).unwrap_or_default(),
            anchor: Anchor {
                x: number(P_ANCHOR_X, DEFAULT_ANCHOR),
                y: number(P_ANCHOR_Y, DEFAULT_ANCHOR),
            },
            default_range: number(P_DEFAULT_RANGE, DEFAULT_RANGE),
            default_fov: number(P_DEFAULT_FOV, DEFAULT_FOV),
            distance_metric: get(P_DISTANCE)
                .map(DistanceMetric::from_param)
                .unwrap_or_default(),
            tags: TagKeys::new(
                get(P_TAG_BLOCK).unwrap_or(""),
                get(P_TAG_NO_BLOCK).unwrap_or(""),
                get(P_TAG_PIERCING).unwrap_or(""),
            ),
            chase: ChaseSight {
                use_line_of_sight: get(P_CHASE_USE)
                    .map(|v| v.trim().eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
                range_source: get(P_CHASE_RANGE)
                    .map(RangeSource::from_param)
                    .unwrap_or_default(),
                fov_source: get(P_CHASE_FOV)
                    .map(FovSource::from_param)
                    .unwrap_or_default(),
            },
        };
        config.validate()
    }

    /// Load a `.ron` or `.json` config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = match ext.as_str() {
            "ron" => ron::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        info!(path = %path.display(), "Loaded sight config");
        Ok(config.validate())
    }

    /// Sanitized copy: anchors clamped, NaN numbers replaced by defaults,
    /// FOV taken by magnitude
    pub fn validate(mut self) -> Self {
        self.anchor = self.anchor.clamped();
        if self.default_fov.is_nan() {
            self.default_fov = DEFAULT_FOV;
        }
        self.default_fov = self.default_fov.abs();
        if self.default_range.is_nan() {
            self.default_range = DEFAULT_RANGE;
        }
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str::<Self>(json).ok().map(Self::validate)
    }
}

fn parse_number(key: &str, value: Option<&str>, fallback: f64) -> f64 {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return fallback;
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            warn!("Parameter '{}' has non-numeric value '{}', using {}", key, raw, fallback);
            fallback
        }
    }
}

/// Region list from a JSON array of numbers or numeric strings
fn parse_regions(raw: &str) -> Vec<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    let items: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("Region Occlusion is not a JSON array ({}), no regions block sight", e);
            return Vec::new();
        }
    };
    items
        .iter()
        .filter_map(|item| {
            let id = match item {
                serde_json::Value::Number(n) => n.as_i64(),
                serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            let id = id.and_then(|v| i32::try_from(v).ok());
            if id.is_none() {
                warn!("Skipping invalid region id {}", item);
            }
            id
        })
        .collect()
}

static GLOBAL: OnceLock<SightConfig> = OnceLock::new();

/// Install the process-wide config. Only the first call succeeds.
pub fn install(config: SightConfig) -> Result<&'static SightConfig, ConfigError> {
    let mut fresh = false;
    let installed = GLOBAL.get_or_init(|| {
        fresh = true;
        config.validate()
    });
    if fresh {
        info!("Sight config installed");
        Ok(installed)
    } else {
        Err(ConfigError::AlreadyInstalled)
    }
}

/// The installed config, if any
pub fn global() -> Option<&'static SightConfig> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = SightConfig::default();
        assert_eq!(config.map_occlusion, MapOcclusion::DirectionSpecific);
        assert_eq!(config.event_occlusion, EventOcclusion::IGNORE);
        assert!(config.regions.is_empty());
        assert_eq!(config.anchor, Anchor::default());
        assert_eq!(config.default_range, -1.0);
        assert_eq!(config.default_fov, 90.0);
        assert_eq!(config.distance_metric, DistanceMetric::Host);
        assert!(!config.chase.use_line_of_sight);
    }

    #[test]
    fn test_empty_params_match_default() {
        assert_eq!(SightConfig::from_params(&HashMap::new()), SightConfig::default());
    }

    #[test]
    fn test_from_params_full() {
        let config = SightConfig::from_params(&params(&[
            ("Default FOV", "120"),
            ("Default Range", "8"),
            ("Tile Anchor X", "0.25"),
            ("Tile Anchor Y", "1.5"),
            ("Distance Metric", "Cartesian"),
            ("Map Occlusion", "Any direction"),
            ("Event Type Occlusion", "Object events"),
            ("Event Priority Occlusion", "Normal priority"),
            ("Event Through", "See-through"),
            ("Region Occlusion", r#"["3", 4, "-5"]"#),
            ("Event tag: block", "wall"),
            ("Event tag: no block", "no sight block "),
            ("YEP_ECP Use LoS", "true"),
            ("YEP_ECP Sight range", "_chaseRange"),
            ("YEP_ECP Sight FOV", "_fov"),
        ]));
        assert_eq!(config.default_fov, 120.0);
        assert_eq!(config.default_range, 8.0);
        assert_eq!(config.anchor.x, 0.25);
        assert_eq!(config.anchor.y, 0.99);
        assert_eq!(config.distance_metric, DistanceMetric::Euclidean);
        assert_eq!(config.map_occlusion, MapOcclusion::AnyDirection);
        assert_eq!(
            config.event_occlusion,
            EventOcclusion::OBJECT_ONLY | EventOcclusion::NORMAL_PRIORITY | EventOcclusion::SEE_THROUGH
        );
        assert_eq!(config.regions, vec![3, 4, -5]);
        assert_eq!(config.tags.block, "wall");
        assert_eq!(config.tags.no_block, "no sight block");
        assert_eq!(config.tags.piercing, "piercing sight");
        assert!(config.chase.use_line_of_sight);
        assert_eq!(config.chase.range_source, RangeSource::Chase);
        assert_eq!(config.chase.fov_source, FovSource::Fov);
    }

    #[test]
    fn test_from_params_bad_values_fall_back() {
        let config = SightConfig::from_params(&params(&[
            ("Default FOV", "wide"),
            ("Default Range", ""),
            ("Map Occlusion", "sometimes"),
            ("Event Type Occlusion", "Purple events"),
            ("Region Occlusion", "3, 4"),
        ]));
        assert_eq!(config.default_fov, DEFAULT_FOV);
        assert_eq!(config.default_range, DEFAULT_RANGE);
        assert_eq!(config.map_occlusion, MapOcclusion::Ignore);
        assert!(config.event_occlusion.is_empty());
        assert!(config.regions.is_empty());
    }

    #[test]
    fn test_parse_regions_skips_junk() {
        assert_eq!(parse_regions(r#"[1, "x", 2.5, "7", null]"#), vec![1, 7]);
        assert!(parse_regions("").is_empty());
        assert!(parse_regions("[]").is_empty());
    }

    #[test]
    fn test_validate() {
        let config = SightConfig {
            anchor: Anchor { x: -3.0, y: f64::NAN },
            default_fov: -180.0,
            default_range: f64::NAN,
            ..SightConfig::default()
        }
        .validate();
        assert_eq!(config.anchor.x, 0.01);
        assert_eq!(config.anchor.y, 0.5);
        assert_eq!(config.default_fov, 180.0);
        assert_eq!(config.default_range, DEFAULT_RANGE);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SightConfig {
            regions: vec![2, -9],
            event_occlusion: EventOcclusion::SEE_THROUGH | EventOcclusion::OBJECT_ONLY,
            ..SightConfig::default()
        };
        let json = config.to_json();
        assert!(!json.is_empty());
        let restored = SightConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
        assert!(SightConfig::from_json("not json").is_none());
    }

    #[test]
    fn test_load_ron_file() {
        let mut file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        write!(
            file,
            "(map_occlusion: AnyDirection, regions: [4, -2], default_fov: 360.0)"
        )
        .unwrap();
        let config = SightConfig::load(file.path()).unwrap();
        assert_eq!(config.map_occlusion, MapOcclusion::AnyDirection);
        assert_eq!(config.regions, vec![4, -2]);
        assert_eq!(config.default_fov, 360.0);
        // Unlisted fields keep their defaults
        assert_eq!(config.event_occlusion, EventOcclusion::IGNORE);
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"default_range": 6.0, "distance_metric": "Rectilinear"}}"#).unwrap();
        let config = SightConfig::load(file.path()).unwrap();
        assert_eq!(config.default_range, 6.0);
        assert_eq!(config.distance_metric, DistanceMetric::Rectilinear);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ron");
        assert!(matches!(
            SightConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));

        let toml = dir.path().join("sight.toml");
        std::fs::write(&toml, "fov = 90").unwrap();
        assert!(matches!(
            SightConfig::load(&toml),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "toml"
        ));

        let bad_ron = dir.path().join("bad.ron");
        std::fs::write(&bad_ron, "(regions: [1,").unwrap();
        assert!(matches!(SightConfig::load(&bad_ron), Err(ConfigError::Ron(_))));

        let bad_json = dir.path().join("bad.json");
        std::fs::write(&bad_json, "{").unwrap();
        assert!(matches!(SightConfig::load(&bad_json), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_install_once() {
        let config = SightConfig {
            default_fov: 45.0,
            ..SightConfig::default()
        };
        let installed = install(config).unwrap();
        assert_eq!(installed.default_fov, 45.0);
        assert_eq!(global().map(|c| c.default_fov), Some(45.0));
        assert!(matches!(
            install(SightConfig::default()),
            Err(ConfigError::AlreadyInstalled)
        ));
        assert_eq!(global().map(|c| c.default_fov), Some(45.0));
    }
}
