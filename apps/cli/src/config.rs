// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use envbake_pipeline::config::{DEFAULT_ENV_ROOT, DEFAULT_GROUND_OBJECT, DEFAULT_START_DELAY};
use envbake_pipeline::{PipelineConfig, TileGrid};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,envbake=debug,envbake_pipeline=debug";

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Scene document to read.
    pub source_scene: PathBuf,
    /// Directory receiving the exported scene and `world.json`.
    pub dest_dir: PathBuf,
    /// Ground mesh to dice.
    pub ground_object: String,
    /// Root of the environment hierarchy.
    pub env_root: String,
    pub tile_min: f64,
    pub tile_max: f64,
    pub tile_size: f64,
    /// Seconds to wait between opening the scene and the first stage.
    pub start_delay_secs: f64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source. Unset or unparsable
    /// values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let grid = TileGrid::default();
        let parse_f64 = |key: &str, default: f64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            source_scene: lookup("ENVBAKE_SOURCE_SCENE")
                .unwrap_or_else(|| "src/wrap/wrap.scene.json".into())
                .into(),
            dest_dir: lookup("ENVBAKE_DEST_DIR")
                .unwrap_or_else(|| "dest".into())
                .into(),
            ground_object: lookup("ENVBAKE_GROUND_OBJECT")
                .unwrap_or_else(|| DEFAULT_GROUND_OBJECT.into()),
            env_root: lookup("ENVBAKE_ENV_ROOT").unwrap_or_else(|| DEFAULT_ENV_ROOT.into()),
            tile_min: parse_f64("ENVBAKE_TILE_MIN", grid.min),
            tile_max: parse_f64("ENVBAKE_TILE_MAX", grid.max),
            tile_size: parse_f64("ENVBAKE_TILE_SIZE", grid.size),
            start_delay_secs: parse_f64("ENVBAKE_START_DELAY_SECS", 2.0),
        }
    }

    /// Builds the pipeline configuration. Negative or non-finite delays
    /// count as no delay; delays too large for a `Duration` use the default.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let delay = if self.start_delay_secs.is_finite() && self.start_delay_secs > 0.0 {
            Duration::try_from_secs_f64(self.start_delay_secs).unwrap_or(DEFAULT_START_DELAY)
        } else {
            Duration::ZERO
        };

        let mut config =
            PipelineConfig::new(&self.source_scene, &self.dest_dir).with_start_delay(delay);
        config.ground_object = self.ground_object.clone();
        config.env_root = self.env_root.clone();
        config.grid = TileGrid {
            min: self.tile_min,
            max: self.tile_max,
            size: self.tile_size,
        };
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
