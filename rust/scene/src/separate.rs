// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh separation operators.
//!
//! Both operators extract geometry from the active object into brand-new
//! objects and shrink the source mesh in place. New objects copy the source's
//! parent, local transform, material slots and UV layer names, and are named
//! after the source with the next free numeric suffix.

use rustc_hash::FxHashSet;

use crate::arena::{ObjectKind, Scene};
use crate::error::{Error, Result};
use crate::keys::ObjectKey;
use crate::mesh::{edge_key, MeshData};
use crate::selection::Mode;

impl Scene {
    /// Moves the selected geometry of the edit mesh into a new object.
    ///
    /// Returns `None` and leaves the mesh untouched when no vertex is
    /// selected.
    pub fn separate_selected(&mut self) -> Result<Option<ObjectKey>> {
        let mesh = self.edit_mesh_mut()?;
        if mesh.selected_vertex_count() == 0 {
            return Ok(None);
        }
        let verts: Vec<bool> = mesh.vertices.iter().map(|v| v.select).collect();
        let edges: Vec<bool> = mesh.edges.iter().map(|e| e.select).collect();
        let faces: Vec<bool> = mesh.faces.iter().map(|f| f.select).collect();
        let split = mesh.split_off(&verts, &edges, &faces);

        let source = self.active.ok_or(Error::NoActiveObject)?;
        let key = self.spawn_from(source, split, None)?;
        Ok(Some(key))
    }

    /// Splits the active mesh object into one object per used material.
    ///
    /// Faces on the lowest material index stay in the source; every other
    /// material group moves into a new object. Afterwards each resulting
    /// object has exactly one material slot. Returns the new objects.
    pub fn separate_by_material(&mut self) -> Result<Vec<ObjectKey>> {
        self.expect_mode(Mode::Object)?;
        let source = self.active.ok_or(Error::NoActiveObject)?;
        let name = self
            .object(source)
            .ok_or(Error::ObjectKeyNotFound(source))?
            .name
            .clone();

        let groups: Vec<usize> = self.mesh(&name)?.used_material_indices().into_iter().collect();
        let mut created = Vec::new();

        for &material in groups.iter().skip(1) {
            let mesh = self.mesh_mut(&name)?;
            let faces: Vec<bool> = mesh
                .faces
                .iter()
                .map(|f| f.material_index == material)
                .collect();
            let face_edges: FxHashSet<(u32, u32)> = mesh
                .faces
                .iter()
                .filter(|f| f.material_index == material)
                .flat_map(|f| f.edge_keys())
                .collect();
            let edges: Vec<bool> = mesh
                .edges
                .iter()
                .map(|e| face_edges.contains(&edge_key(e.verts[0], e.verts[1])))
                .collect();
            let verts = vec![false; mesh.vertex_count()];

            let mut split = mesh.split_off(&verts, &edges, &faces);
            split.faces.iter_mut().for_each(|f| f.material_index = 0);

            let slot = self.objects[source].materials.get(material).cloned();
            created.push(self.spawn_from(source, split, Some(slot))?);
        }

        if let Some(&first) = groups.first() {
            let object = &mut self.objects[source];
            object.materials = object.materials.get(first).cloned().into_iter().collect();
            if let ObjectKind::Mesh(mesh) = &mut object.kind {
                mesh.faces.iter_mut().for_each(|f| f.material_index = 0);
            }
        }
        Ok(created)
    }

    /// Adds a sibling of `source` carrying `mesh`.
    fn spawn_from(
        &mut self,
        source: ObjectKey,
        mesh: MeshData,
        material: Option<Option<String>>,
    ) -> Result<ObjectKey> {
        let template = self.object(source).ok_or(Error::ObjectKeyNotFound(source))?;
        let name = template.name.clone();
        let parent = template.parent;
        let matrix_local = template.matrix_local;
        let materials = match material {
            Some(slot) => slot.into_iter().collect(),
            None => template.materials.clone(),
        };

        let key = self.add_mesh(&name, mesh, parent)?;
        let object = &mut self.objects[key];
        object.matrix_local = matrix_local;
        object.materials = materials;
        self.selected.insert(key);
        Ok(key)
    }
}
