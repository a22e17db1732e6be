// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline run configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::metadata::METADATA_FILE;
use crate::tiler::TileGrid;

/// File name of the exported scene inside the destination directory.
pub const OUTPUT_SCENE_FILE: &str = "edit.scene.json";

pub const DEFAULT_GROUND_OBJECT: &str = "gnd.001";
pub const DEFAULT_ENV_ROOT: &str = "env";
pub const DEFAULT_START_DELAY: Duration = Duration::from_secs(2);

/// Everything a run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub source_scene: PathBuf,
    pub output_scene: PathBuf,
    pub metadata_path: PathBuf,
    /// Name of the ground mesh to dice.
    pub ground_object: String,
    /// Root of the hierarchy holding the environment meshes.
    pub env_root: String,
    pub grid: TileGrid,
    /// Pause between opening the scene and the first stage.
    pub start_delay: Duration,
}

impl PipelineConfig {
    /// Default configuration writing its outputs into `dest_dir`.
    pub fn new(source_scene: impl Into<PathBuf>, dest_dir: impl AsRef<Path>) -> Self {
        let dest_dir = dest_dir.as_ref();
        Self {
            source_scene: source_scene.into(),
            output_scene: dest_dir.join(OUTPUT_SCENE_FILE),
            metadata_path: dest_dir.join(METADATA_FILE),
            ground_object: DEFAULT_GROUND_OBJECT.to_string(),
            env_root: DEFAULT_ENV_ROOT.to_string(),
            grid: TileGrid::default(),
            start_delay: DEFAULT_START_DELAY,
        }
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    /// Checks the configuration before anything touches the disk.
    pub fn validate(&self) -> Result<()> {
        if same_path(&self.source_scene, &self.output_scene) {
            return Err(Error::OutputOverwritesSource(self.output_scene.clone()));
        }
        if self.ground_object.is_empty() {
            return Err(Error::InvalidConfig("ground object name is empty".into()));
        }
        if self.env_root.is_empty() {
            return Err(Error::InvalidConfig("environment root name is empty".into()));
        }
        self.grid.validate()
    }
}

/// Lexical equality, or the same file on disk when both exist.
fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
