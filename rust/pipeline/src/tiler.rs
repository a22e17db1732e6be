// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ground dicing.
//!
//! The ground mesh is cut into square tiles on the XY plane. For each tile
//! the vertices inside it are selected, the selection is flushed to whole
//! edges and faces, and the selection is separated into a new object. The
//! source keeps whatever no tile claimed, so it shrinks as tiles are cut.
//!
//! Tiles are half-open, `[lo, hi)` on both axes, and share their boundaries
//! exactly, so every vertex position inside the grid belongs to one tile.
//! Faces straddling a tile boundary are not fully selected; they stay in the
//! source for good, which keeps its own copy of the boundary vertices. No
//! later tile picks them up, so the residual face count is logged.

use std::fmt;

use envbake_scene::{CubeProjection, SelectAction};
use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::edit::with_edit_mode;
use crate::error::{Error, Result};
use crate::host::SceneHost;

/// An axis-aligned region of the XY plane, half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialTile {
    pub xlo: f64,
    pub xhi: f64,
    pub ylo: f64,
    pub yhi: f64,
}

impl SpatialTile {
    /// True when the XY projection of `co` lies in the tile. Z is ignored.
    pub fn contains(&self, co: &Point3<f64>) -> bool {
        self.xlo <= co.x && co.x < self.xhi && self.ylo <= co.y && co.y < self.yhi
    }
}

impl fmt::Display for SpatialTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) x [{}, {})",
            self.xlo, self.xhi, self.ylo, self.yhi
        )
    }
}

/// A square grid of tiles covering `[min, max)` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    pub min: f64,
    pub max: f64,
    pub size: f64,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self {
            min: -750.0,
            max: 750.0,
            size: 250.0,
        }
    }
}

impl TileGrid {
    pub fn validate(&self) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.size.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "tile grid bounds must be finite, got min={} max={} size={}",
                self.min, self.max, self.size
            )));
        }
        if self.size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tile size must be positive, got {}",
                self.size
            )));
        }
        if self.max <= self.min {
            return Err(Error::InvalidConfig(format!(
                "tile grid max {} must exceed min {}",
                self.max, self.min
            )));
        }
        Ok(())
    }

    /// Tile boundaries along one axis. The last step may overshoot `max`.
    fn edges(&self) -> Vec<f64> {
        let steps = ((self.max - self.min) / self.size).ceil() as usize;
        (0..=steps).map(|i| self.min + i as f64 * self.size).collect()
    }

    /// Every tile, X-major: all Y tiles of the first column, then the next
    /// column, and so on.
    pub fn tiles(&self) -> Vec<SpatialTile> {
        let edges = self.edges();
        let spans: Vec<(f64, f64)> = edges.windows(2).map(|w| (w[0], w[1])).collect();
        spans
            .iter()
            .flat_map(|&(xlo, xhi)| {
                spans
                    .iter()
                    .map(move |&(ylo, yhi)| SpatialTile { xlo, xhi, ylo, yhi })
            })
            .collect()
    }
}

/// Settings for the per-tile texture projection.
pub fn tile_projection() -> CubeProjection {
    CubeProjection {
        cube_size: 1.0,
        scale_to_bounds: true,
    }
}

/// Cuts one tile out of `source`.
///
/// Returns the name of the new tile object, or `None` when no vertex of the
/// source falls inside the tile. The new object's faces are cube projected.
pub fn separate_tile<H: SceneHost + ?Sized>(
    host: &mut H,
    source: &str,
    tile: &SpatialTile,
) -> Result<Option<String>> {
    let before = host.object_names();
    host.select_object(source)?;

    let selected = with_edit_mode(host, |h| {
        h.select_all(SelectAction::Deselect)?;
        let count = h.select_vertices(&mut |co| tile.contains(co))?;
        h.select_flush()?;
        if count > 0 {
            h.separate_selected()?;
        }
        Ok(count)
    })?;

    let after = host.object_names();
    let mut created = after.difference(&before);
    let Some(name) = created.next().cloned() else {
        debug!(tile = %tile, "Tile is empty");
        return Ok(None);
    };
    if created.next().is_some() {
        warn!(tile = %tile, "Separation produced more than one object, projecting the first");
    }

    host.select_object(&name)?;
    // TODO: project into a dedicated UV layer so the ground's large-scale
    // texture coordinates on the tile survive.
    with_edit_mode(host, |h| {
        h.select_all(SelectAction::Select)?;
        h.cube_project(&tile_projection())
    })?;

    debug!(tile = %tile, object = %name, vertices = selected, "Separated tile");
    Ok(Some(name))
}

/// Dices `source` into the given tiles in order. Returns the new objects.
pub fn dice_ground<H: SceneHost + ?Sized>(
    host: &mut H,
    source: &str,
    tiles: &[SpatialTile],
) -> Result<Vec<String>> {
    let mut created = Vec::new();
    for tile in tiles {
        if let Some(name) = separate_tile(host, source, tile)? {
            created.push(name);
        }
    }

    let residual_vertices = host.vertex_count(source)?;
    let residual_faces = host.face_count(source)?;
    info!(
        source,
        tiles = created.len(),
        residual_vertices,
        residual_faces,
        "Ground diced"
    );
    Ok(created)
}
