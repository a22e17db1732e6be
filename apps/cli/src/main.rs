// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! envbake - environment export driver.
//!
//! Opens the wrapped environment scene, dices the ground into tiles, splits
//! multi-material meshes and prepares lightmap UVs, then writes the edited
//! scene and `world.json` into the destination directory.
//!
//! Configuration comes from environment variables:
//!
//! - `ENVBAKE_SOURCE_SCENE` - scene document to read
//! - `ENVBAKE_DEST_DIR` - output directory
//! - `ENVBAKE_GROUND_OBJECT` - ground mesh name
//! - `ENVBAKE_ENV_ROOT` - environment root object name
//! - `ENVBAKE_TILE_MIN`, `ENVBAKE_TILE_MAX`, `ENVBAKE_TILE_SIZE` - tile grid
//! - `ENVBAKE_START_DELAY_SECS` - pause before the first stage
//! - `RUST_LOG` - log filter

use anyhow::Context;
use envbake_pipeline::Pipeline;
use envbake_scene::Scene;
use tracing_subscriber::EnvFilter;

mod config;

use config::{Config, DEFAULT_LOG_FILTER};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env();

    tracing::info!(
        source = %config.source_scene.display(),
        dest = %config.dest_dir.display(),
        ground = %config.ground_object,
        env_root = %config.env_root,
        "Starting envbake"
    );

    if let Err(e) = run(&config).await {
        tracing::error!(error = %format!("{e:#}"), "Export failed");
        std::process::exit(1);
    }
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let mut pipeline = Pipeline::new(Scene::new(), config.pipeline_config())
        .context("invalid configuration")?;
    let summary = pipeline
        .run()
        .await
        .with_context(|| format!("exporting {}", config.source_scene.display()))?;

    tracing::info!(
        tiles = summary.tiles.len(),
        split = summary.split.split.len(),
        lightmaps_packed = summary.lightmaps.packed(),
        lightmaps_failed = summary.lightmaps.failed.len(),
        "Done"
    );
    Ok(())
}
