// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! UV unwrapping operators.
//!
//! Two projections are provided:
//!
//! - **Cube projection** flattens each selected face onto the axis plane its
//!   normal faces most. Cheap, and good enough to give a freshly separated
//!   object a bounded parameterization.
//! - **Lightmap pack** gives every face its own non-overlapping rectangle in
//!   a single square atlas, which is what static light baking needs.
//!
//! Both write the mesh's active UV layer.

use nalgebra::{Point3, Vector3};

use crate::arena::Scene;
use crate::error::{Error, Result};
use crate::mesh::MeshData;

/// Name of the layer cube projection creates on a mesh without UVs.
pub const DEFAULT_UV_LAYER: &str = "UVMap";

/// Name of the layer lightmap pack creates when asked for a new one.
pub const LIGHTMAP_UV_LAYER: &str = "lightmap";

/// Cube projection settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeProjection {
    /// Edge length of the projection cube in object units.
    pub cube_size: f64,
    /// Stretch the result to fill the unit square.
    pub scale_to_bounds: bool,
}

impl Default for CubeProjection {
    fn default() -> Self {
        Self {
            cube_size: 1.0,
            scale_to_bounds: true,
        }
    }
}

/// Which faces a lightmap pack covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackContext {
    AllFaces,
    SelectedFaces,
}

/// Lightmap pack settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightmapPack {
    pub context: PackContext,
    /// Create a fresh `lightmap` layer instead of writing the active one.
    pub new_uv_layer: bool,
    /// Gap between face islands, as a fraction of the atlas size.
    pub margin: f32,
}

impl Default for LightmapPack {
    fn default() -> Self {
        Self {
            context: PackContext::AllFaces,
            new_uv_layer: false,
            margin: 0.1 / 64.0,
        }
    }
}

impl Scene {
    /// Cube-projects the selected faces of the edit mesh.
    pub fn cube_project(&mut self, settings: &CubeProjection) -> Result<()> {
        cube_project(self.edit_mesh_mut()?, settings)
    }

    /// Lightmap-packs the active object's mesh. Works in either mode.
    pub fn lightmap_pack(&mut self, settings: &LightmapPack) -> Result<()> {
        let key = self.active.ok_or(Error::NoActiveObject)?;
        let name = self
            .object(key)
            .ok_or(Error::ObjectKeyNotFound(key))?
            .name
            .clone();
        let mesh = self.mesh_mut(&name)?;
        if settings.new_uv_layer {
            let index = mesh.add_uv_layer(LIGHTMAP_UV_LAYER)?;
            mesh.active_uv = Some(index);
        }
        lightmap_pack(mesh, settings)
    }
}

/// Cube-projects every selected face of `mesh` into its active UV layer.
pub fn cube_project(mesh: &mut MeshData, settings: &CubeProjection) -> Result<()> {
    if settings.cube_size <= 0.0 || !settings.cube_size.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "cube size must be positive, got {}",
            settings.cube_size
        )));
    }
    if mesh.active_uv_layer().is_none() {
        mesh.add_uv_layer(DEFAULT_UV_LAYER)?;
    }

    let mut projected: Vec<(usize, Vec<[f64; 2]>)> = Vec::new();
    for (i, face) in mesh.faces.iter().enumerate().filter(|(_, f)| f.select) {
        let n = mesh.face_normal(i);
        let (nx, ny, nz) = (n.x.abs(), n.y.abs(), n.z.abs());
        let corners = face
            .verts
            .iter()
            .map(|&v| {
                let co = mesh.vertices[v as usize].co / settings.cube_size;
                if nx >= ny && nx >= nz {
                    [co.y, co.z]
                } else if ny >= nz {
                    [co.x, co.z]
                } else {
                    [co.x, co.y]
                }
            })
            .collect();
        projected.push((i, corners));
    }

    if settings.scale_to_bounds && !projected.is_empty() {
        let mut lo = [f64::INFINITY; 2];
        let mut hi = [f64::NEG_INFINITY; 2];
        for uv in projected.iter().flat_map(|(_, c)| c) {
            for axis in 0..2 {
                lo[axis] = lo[axis].min(uv[axis]);
                hi[axis] = hi[axis].max(uv[axis]);
            }
        }
        for uv in projected.iter_mut().flat_map(|(_, c)| c.iter_mut()) {
            for axis in 0..2 {
                let extent = hi[axis] - lo[axis];
                uv[axis] = if extent > f64::EPSILON {
                    (uv[axis] - lo[axis]) / extent
                } else {
                    0.0
                };
            }
        }
    }

    let layer = mesh.active_uv_layer_mut().ok_or(Error::NoActiveUvLayer)?;
    for (face, corners) in projected {
        layer.uvs[face] = corners
            .into_iter()
            .map(|[u, v]| [u as f32, v as f32])
            .collect();
    }
    Ok(())
}

/// A face flattened into its own plane.
struct Island {
    face: usize,
    corners: Vec<[f64; 2]>,
    width: f64,
    height: f64,
}

/// Packs faces of `mesh` into one unit-square atlas in its active UV layer.
pub fn lightmap_pack(mesh: &mut MeshData, settings: &LightmapPack) -> Result<()> {
    if mesh.active_uv_layer().is_none() {
        return Err(Error::NoActiveUvLayer);
    }

    let faces: Vec<usize> = (0..mesh.faces.len())
        .filter(|&i| settings.context == PackContext::AllFaces || mesh.faces[i].select)
        .collect();
    if faces.is_empty() {
        return Err(Error::NothingToPack);
    }

    let mut islands = faces
        .into_iter()
        .map(|face| flatten_face(mesh, face))
        .collect::<Result<Vec<_>>>()?;

    let total_area: f64 = islands.iter().map(|i| i.width * i.height).sum();
    let widest = islands.iter().map(|i| i.width).fold(0.0, f64::max);
    let tallest = islands.iter().map(|i| i.height).fold(0.0, f64::max);
    let gap = settings.margin.max(0.0) as f64 * total_area.sqrt().max(widest).max(tallest);
    let row_width = total_area.sqrt().max(widest) * 1.2;

    // Shelf packing, tallest islands first.
    islands.sort_by(|a, b| b.height.total_cmp(&a.height));
    let mut offsets = Vec::with_capacity(islands.len());
    let (mut x, mut y, mut shelf_height, mut atlas_width) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for island in &islands {
        if x > 0.0 && x + island.width > row_width {
            x = 0.0;
            y += shelf_height + gap;
            shelf_height = 0.0;
        }
        offsets.push([x, y]);
        x += island.width + gap;
        atlas_width = atlas_width.max(x - gap);
        shelf_height = shelf_height.max(island.height);
    }
    let side = atlas_width.max(y + shelf_height);
    if side <= 0.0 || !side.is_finite() {
        return Err(Error::DegenerateFace(islands[0].face));
    }

    let layer = mesh.active_uv_layer_mut().ok_or(Error::NoActiveUvLayer)?;
    for (island, [ox, oy]) in islands.iter().zip(offsets) {
        layer.uvs[island.face] = island
            .corners
            .iter()
            .map(|[u, v]| [((ox + u) / side) as f32, ((oy + v) / side) as f32])
            .collect();
    }
    Ok(())
}

fn flatten_face(mesh: &MeshData, face: usize) -> Result<Island> {
    let normal = mesh.face_normal(face);
    let length = normal.norm();
    if length <= f64::EPSILON || !length.is_finite() {
        return Err(Error::DegenerateFace(face));
    }
    let normal = normal / length;

    let points: Vec<Point3<f64>> = mesh.faces[face]
        .verts
        .iter()
        .map(|&v| mesh.vertices[v as usize].co)
        .collect();
    let origin = points[0];
    let u_axis = points
        .iter()
        .map(|p| p - origin)
        .find(|d| d.norm() > f64::EPSILON)
        .map(|d| d.normalize())
        .unwrap_or_else(Vector3::x);
    let v_axis = normal.cross(&u_axis);

    let mut corners: Vec<[f64; 2]> = points
        .iter()
        .map(|p| {
            let d = p - origin;
            [d.dot(&u_axis), d.dot(&v_axis)]
        })
        .collect();
    let min_u = corners.iter().map(|c| c[0]).fold(f64::INFINITY, f64::min);
    let min_v = corners.iter().map(|c| c[1]).fold(f64::INFINITY, f64::min);
    for c in &mut corners {
        c[0] -= min_u;
        c[1] -= min_v;
    }
    let width = corners.iter().map(|c| c[0]).fold(0.0, f64::max);
    let height = corners.iter().map(|c| c[1]).fold(0.0, f64::max);

    Ok(Island {
        face,
        corners,
        width,
        height,
    })
}
