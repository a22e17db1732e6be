// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`SceneHost`] for the in-memory [`Scene`].

use std::collections::BTreeSet;
use std::path::Path;

use envbake_scene::{CubeProjection, LightmapPack, Mode, Scene, SelectAction};
use nalgebra::{Matrix4, Point3};

use crate::error::{Error, Result};
use crate::host::SceneHost;

/// Attaches the path to I/O failures, which the scene crate reports bare.
fn with_path(path: &Path) -> impl FnOnce(envbake_scene::Error) -> Error + '_ {
    move |e| match e {
        envbake_scene::Error::Io(source) => Error::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other.into(),
    }
}

impl SceneHost for Scene {
    fn open_scene(&mut self, path: &Path) -> Result<()> {
        *self = Scene::load(path).map_err(with_path(path))?;
        tracing::info!(path = %path.display(), objects = self.object_count(), "Opened scene");
        Ok(())
    }

    fn save_scene_as(&mut self, path: &Path) -> Result<()> {
        self.save(path).map_err(with_path(path))?;
        tracing::info!(path = %path.display(), objects = self.object_count(), "Saved scene");
        Ok(())
    }

    fn object_names(&self) -> BTreeSet<String> {
        self.names().map(str::to_string).collect()
    }

    fn mesh_descendants(&self, root: &str) -> Result<Vec<String>> {
        Ok(Scene::mesh_descendants(self, root)?)
    }

    fn select_object(&mut self, name: &str) -> Result<()> {
        Scene::select_object(self, name)?;
        Ok(())
    }

    fn in_edit_mode(&self) -> bool {
        self.mode() == Mode::Edit
    }

    fn toggle_edit_mode(&mut self) -> Result<()> {
        Ok(Scene::toggle_edit_mode(self)?)
    }

    fn select_all(&mut self, action: SelectAction) -> Result<()> {
        Ok(Scene::select_all(self, action)?)
    }

    fn select_vertices(
        &mut self,
        predicate: &mut dyn FnMut(&Point3<f64>) -> bool,
    ) -> Result<usize> {
        Ok(self.edit_mesh_mut()?.select_vertices_where(predicate))
    }

    fn select_flush(&mut self) -> Result<()> {
        self.edit_mesh_mut()?.select_flush();
        Ok(())
    }

    fn separate_selected(&mut self) -> Result<()> {
        Scene::separate_selected(self)?;
        Ok(())
    }

    fn separate_by_material(&mut self) -> Result<()> {
        Scene::separate_by_material(self)?;
        Ok(())
    }

    fn cube_project(&mut self, settings: &CubeProjection) -> Result<()> {
        Ok(Scene::cube_project(self, settings)?)
    }

    fn lightmap_pack(&mut self, settings: &LightmapPack) -> Result<()> {
        Ok(Scene::lightmap_pack(self, settings)?)
    }

    fn material_slot_count(&self, name: &str) -> Result<usize> {
        let key = self.require(name)?;
        self.object(key)
            .map(|o| o.materials.len())
            .ok_or_else(|| envbake_scene::Error::ObjectKeyNotFound(key).into())
    }

    fn vertex_count(&self, name: &str) -> Result<usize> {
        Ok(self.mesh(name)?.vertex_count())
    }

    fn face_count(&self, name: &str) -> Result<usize> {
        Ok(self.mesh(name)?.face_count())
    }

    fn bound_box(&self, name: &str) -> Result<[Point3<f64>; 8]> {
        Ok(self.mesh(name)?.bound_box())
    }

    fn matrix_world(&self, name: &str) -> Result<Matrix4<f64>> {
        Ok(self.world_matrix(self.require(name)?)?)
    }

    fn active_uv_layer(&self, name: &str) -> Result<Option<String>> {
        Ok(self.mesh(name)?.active_uv_layer().map(|l| l.name.clone()))
    }

    fn new_uv_layer(&mut self, name: &str, base: &str) -> Result<String> {
        let mesh = self.mesh_mut(name)?;
        let index = mesh.add_uv_layer(base)?;
        Ok(mesh.uv_layers()[index].name.clone())
    }

    fn set_active_uv_layer(&mut self, name: &str, layer: &str) -> Result<()> {
        Ok(self.mesh_mut(name)?.set_active_uv_layer(layer)?)
    }
}
