// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The capability surface the pipeline drives.
//!
//! Scene mutation happens through coarse, all-or-nothing operators: select
//! something, invoke an operator, then inspect the scene to see what changed.
//! Objects are addressed by name only. Operators such as separation create
//! and reshape objects, so implementations must resolve names afresh on every
//! call and callers must never hold on to anything but names.

use std::collections::BTreeSet;
use std::path::Path;

use envbake_scene::{CubeProjection, LightmapPack, SelectAction};
use nalgebra::{Matrix4, Point3};

use crate::error::Result;

/// A scene runtime that owns objects, meshes and materials.
pub trait SceneHost {
    /// Replaces the current scene with the document at `path`.
    fn open_scene(&mut self, path: &Path) -> Result<()>;

    /// Writes the current scene to `path`.
    fn save_scene_as(&mut self, path: &Path) -> Result<()>;

    /// Names of every object currently in the scene.
    fn object_names(&self) -> BTreeSet<String>;

    /// Names of all mesh objects below `root`, direct and nested.
    fn mesh_descendants(&self, root: &str) -> Result<Vec<String>>;

    /// Deselects everything, then selects and activates `name`.
    fn select_object(&mut self, name: &str) -> Result<()>;

    fn in_edit_mode(&self) -> bool;

    /// Switches the active object between object and edit mode.
    fn toggle_edit_mode(&mut self) -> Result<()>;

    /// Selects or deselects all elements of the edit mesh.
    fn select_all(&mut self, action: SelectAction) -> Result<()>;

    /// Sets the vertex selection of the edit mesh from a predicate over
    /// vertex positions. Returns the number of selected vertices.
    fn select_vertices(
        &mut self,
        predicate: &mut dyn FnMut(&Point3<f64>) -> bool,
    ) -> Result<usize>;

    /// Selects edges and faces whose vertices are all selected.
    fn select_flush(&mut self) -> Result<()>;

    /// Moves the selected edit-mesh geometry into a new object.
    fn separate_selected(&mut self) -> Result<()>;

    /// Splits the active object into one object per material.
    fn separate_by_material(&mut self) -> Result<()>;

    /// Cube-projects the selected faces of the edit mesh.
    fn cube_project(&mut self, settings: &CubeProjection) -> Result<()>;

    /// Lightmap-packs the active object.
    fn lightmap_pack(&mut self, settings: &LightmapPack) -> Result<()>;

    fn material_slot_count(&self, name: &str) -> Result<usize>;

    fn vertex_count(&self, name: &str) -> Result<usize>;

    fn face_count(&self, name: &str) -> Result<usize>;

    /// The eight local bounding box corners of a mesh object.
    fn bound_box(&self, name: &str) -> Result<[Point3<f64>; 8]>;

    /// The object's local-to-world matrix.
    fn matrix_world(&self, name: &str) -> Result<Matrix4<f64>>;

    /// Name of the object's active UV layer, if it has one.
    fn active_uv_layer(&self, name: &str) -> Result<Option<String>>;

    /// Adds a UV layer named after `base` and returns the name it got.
    fn new_uv_layer(&mut self, name: &str, base: &str) -> Result<String>;

    fn set_active_uv_layer(&mut self, name: &str, layer: &str) -> Result<()>;
}
