// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Staged pipeline driver.
//!
//! A run loads prior metadata, opens the source scene, waits out the start
//! delay, runs the stages strictly in order, then persists the metadata and
//! saves the scene under the output path. Any stage error aborts the run
//! before anything is written.

use std::fmt;

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::host::SceneHost;
use crate::lightmap::{prepare_lightmaps, LightmapReport};
use crate::metadata::{MetadataStore, WorldMetadata};
use crate::splitter::{separate_materials, SplitReport};
use crate::tiler::dice_ground;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    DiceGround,
    SeparateMaterials,
    Lightmaps,
}

impl Stage {
    pub const ORDER: [Stage; 3] = [Stage::DiceGround, Stage::SeparateMaterials, Stage::Lightmaps];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::DiceGround => "dice_ground",
            Stage::SeparateMaterials => "separate_materials",
            Stage::Lightmaps => "lightmaps",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a completed run did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    /// Tile objects cut from the ground, in tile order.
    pub tiles: Vec<String>,
    pub split: SplitReport,
    pub lightmaps: LightmapReport,
    /// Stages that completed, in order.
    pub stages: Vec<Stage>,
}

/// Drives a [`SceneHost`] through the export stages.
pub struct Pipeline<H> {
    host: H,
    config: PipelineConfig,
    store: MetadataStore,
}

impl<H: SceneHost> Pipeline<H> {
    /// Validates `config` and prepares a run against `host`.
    pub fn new(host: H, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let store = MetadataStore::new(&config.metadata_path);
        Ok(Self {
            host,
            config,
            store,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Runs the whole pipeline.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let mut doc = self.store.load();
        info!(
            path = %self.store.path().display(),
            records = doc.len(),
            "Metadata loaded"
        );

        self.host.open_scene(&self.config.source_scene)?;

        if !self.config.start_delay.is_zero() {
            info!(delay_ms = self.config.start_delay.as_millis() as u64, "Waiting before first stage");
            tokio::time::sleep(self.config.start_delay).await;
        }

        let summary = self.run_stages(&mut doc)?;
        self.finalize(&doc)?;
        Ok(summary)
    }

    /// Runs every stage in order against the already open scene.
    pub fn run_stages(&mut self, doc: &mut WorldMetadata) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for stage in Stage::ORDER {
            info!(%stage, "Stage started");
            self.run_stage(stage, doc, &mut summary)?;
            summary.stages.push(stage);
            info!(%stage, "Stage finished");
        }
        Ok(summary)
    }

    fn run_stage(
        &mut self,
        stage: Stage,
        doc: &mut WorldMetadata,
        summary: &mut RunSummary,
    ) -> Result<()> {
        match stage {
            Stage::DiceGround => {
                let tiles = self.config.grid.tiles();
                summary.tiles = dice_ground(&mut self.host, &self.config.ground_object, &tiles)?;
            }
            Stage::SeparateMaterials => {
                summary.split = separate_materials(&mut self.host, &self.config.env_root)?;
                info!(
                    split = summary.split.split.len(),
                    created = summary.split.created.len(),
                    "Materials separated"
                );
            }
            Stage::Lightmaps => {
                summary.lightmaps = prepare_lightmaps(&mut self.host, &self.config.env_root, doc)?;
                info!(
                    packed = summary.lightmaps.packed(),
                    failed = summary.lightmaps.failed.len(),
                    "Lightmaps prepared"
                );
            }
        }
        Ok(())
    }

    /// Persists the metadata, then saves the scene under the output path.
    pub fn finalize(&mut self, doc: &WorldMetadata) -> Result<()> {
        self.store.persist(doc)?;
        self.host.save_scene_as(&self.config.output_scene)?;
        info!(
            scene = %self.config.output_scene.display(),
            metadata = %self.store.path().display(),
            "Export finished"
        );
        Ok(())
    }
}
