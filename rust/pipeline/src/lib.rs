// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # envbake pipeline
//!
//! Prepares an environment scene for a real-time engine in three stages:
//!
//! 1. **Dice ground** - cut the ground mesh into square tiles and give each
//!    tile a bounded cube projection.
//! 2. **Separate materials** - split every multi-material mesh below the
//!    environment root into single-material objects.
//! 3. **Lightmaps** - record each environment mesh's world bounding sphere
//!    and UV layer names, then lightmap-pack it into a new UV layer.
//!
//! The result is saved as a new scene next to a `world.json` metadata
//! document that accumulates across runs.
//!
//! All scene access goes through the [`SceneHost`] trait; [`Scene`] from
//! `envbake-scene` implements it in memory.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use envbake_pipeline::{Pipeline, PipelineConfig};
//! use envbake_scene::Scene;
//!
//! # async fn demo() -> envbake_pipeline::Result<()> {
//! let config = PipelineConfig::new("src/wrap/wrap.scene.json", "dest")
//!     .with_start_delay(Duration::ZERO);
//! let mut pipeline = Pipeline::new(Scene::new(), config)?;
//! let summary = pipeline.run().await?;
//! println!("{} tiles", summary.tiles.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`Scene`]: envbake_scene::Scene

pub mod bounds;
pub mod config;
pub mod edit;
pub mod error;
pub mod host;
pub mod lightmap;
pub mod memory;
pub mod metadata;
pub mod sequencer;
pub mod splitter;
pub mod tiler;

pub use bounds::BoundingSphere;
pub use config::PipelineConfig;
pub use edit::with_edit_mode;
pub use error::{Error, Result};
pub use host::SceneHost;
pub use lightmap::{prepare_lightmaps, BakeFailure, LightmapReport};
pub use metadata::{MetadataStore, ObjectRecord, WorldMetadata};
pub use sequencer::{Pipeline, RunSummary, Stage};
pub use splitter::{separate_materials, SplitReport};
pub use tiler::{dice_ground, separate_tile, SpatialTile, TileGrid};
