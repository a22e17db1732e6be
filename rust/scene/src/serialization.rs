// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON scene documents.
//!
//! Full round-trip serialization of objects, hierarchy, materials, mesh
//! geometry and UV layers. Objects are written parents-first so documents
//! diff cleanly between runs; parents are referenced by name. Selection and
//! mode are session state and are not stored.

use std::path::Path;

use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};

use crate::arena::{ObjectKind, Scene};
use crate::error::{Error, Result};
use crate::mesh::{MeshData, UvLayer};

/// Serializable representation of a whole scene.
#[derive(Debug, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub objects: Vec<ObjectSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Local transform, row by row.
    #[serde(default = "identity_rows")]
    pub transform: [[f64; 4]; 4],
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub vertices: Vec<[f64; 3]>,
    #[serde(default)]
    pub edges: Vec<[u32; 2]>,
    #[serde(default)]
    pub faces: Vec<FaceSnapshot>,
    #[serde(default)]
    pub uv_layers: Vec<UvLayerSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_uv: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FaceSnapshot {
    pub verts: Vec<u32>,
    #[serde(default)]
    pub material: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UvLayerSnapshot {
    pub name: String,
    pub uvs: Vec<Vec<[f32; 2]>>,
}

fn identity_rows() -> [[f64; 4]; 4] {
    matrix_to_rows(&Matrix4::identity())
}

fn matrix_to_rows(m: &Matrix4<f64>) -> [[f64; 4]; 4] {
    std::array::from_fn(|r| std::array::from_fn(|c| m[(r, c)]))
}

fn rows_to_matrix(rows: &[[f64; 4]; 4]) -> Matrix4<f64> {
    Matrix4::from_fn(|r, c| rows[r][c])
}

impl Scene {
    /// Serializes the scene to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot();
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserializes a scene from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: SceneSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    /// Reads a scene document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Writes the scene document to disk, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Creates a serializable snapshot of the scene.
    pub fn to_snapshot(&self) -> SceneSnapshot {
        let objects = self
            .hierarchy_order()
            .into_iter()
            .map(|key| {
                let object = &self.objects[key];
                ObjectSnapshot {
                    name: object.name.clone(),
                    parent: object.parent.map(|p| self.objects[p].name.clone()),
                    transform: matrix_to_rows(&object.matrix_local),
                    materials: object.materials.clone(),
                    mesh: object.mesh().map(mesh_snapshot),
                }
            })
            .collect();
        SceneSnapshot { objects }
    }

    /// Rebuilds a scene from a snapshot. Names must be unique and parents
    /// must exist; document order does not matter.
    pub fn from_snapshot(snapshot: SceneSnapshot) -> Result<Self> {
        let mut scene = Scene::new();
        let mut parents = Vec::new();

        for object in snapshot.objects {
            if scene.names.contains_key(&object.name) {
                return Err(Error::DuplicateName(object.name));
            }
            let kind = match object.mesh {
                Some(mesh) => ObjectKind::Mesh(mesh_from_snapshot(mesh)?),
                None => ObjectKind::Empty,
            };
            let key = scene.add_object(&object.name, kind, None)?;
            let created = &mut scene.objects[key];
            created.matrix_local = rows_to_matrix(&object.transform);
            created.materials = object.materials;
            if let Some(parent) = object.parent {
                parents.push((key, parent));
            }
        }

        for (key, parent) in parents {
            let parent_key = scene.require(&parent)?;
            scene.set_parent(key, Some(parent_key))?;
        }
        Ok(scene)
    }
}

fn mesh_snapshot(mesh: &MeshData) -> MeshSnapshot {
    MeshSnapshot {
        vertices: mesh.vertices.iter().map(|v| [v.co.x, v.co.y, v.co.z]).collect(),
        edges: mesh.edges.iter().map(|e| e.verts).collect(),
        faces: mesh
            .faces
            .iter()
            .map(|f| FaceSnapshot {
                verts: f.verts.clone(),
                material: f.material_index,
            })
            .collect(),
        uv_layers: mesh
            .uv_layers
            .iter()
            .map(|l| UvLayerSnapshot {
                name: l.name.clone(),
                uvs: l.uvs.clone(),
            })
            .collect(),
        active_uv: mesh.active_uv_layer().map(|l| l.name.clone()),
    }
}

fn mesh_from_snapshot(snapshot: MeshSnapshot) -> Result<MeshData> {
    let (faces, materials): (Vec<Vec<u32>>, Vec<usize>) = snapshot
        .faces
        .into_iter()
        .map(|f| (f.verts, f.material))
        .unzip();
    let mut mesh = MeshData::from_geometry(
        snapshot
            .vertices
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect(),
        snapshot.edges,
        faces,
    )?;
    mesh.set_material_indices(&materials)?;

    for layer in snapshot.uv_layers {
        let shape_matches = layer.uvs.len() == mesh.faces.len()
            && layer
                .uvs
                .iter()
                .zip(&mesh.faces)
                .all(|(uvs, face)| uvs.len() == face.verts.len());
        if !shape_matches {
            return Err(Error::Serialization(format!(
                "UV layer {} does not match the face corners",
                layer.name
            )));
        }
        if mesh.uv_layers.len() >= crate::mesh::MAX_UV_LAYERS {
            return Err(Error::UvLayerLimit {
                max: crate::mesh::MAX_UV_LAYERS,
            });
        }
        mesh.uv_layers.push(UvLayer {
            name: layer.name,
            uvs: layer.uvs,
        });
    }
    match snapshot.active_uv {
        Some(name) => mesh.set_active_uv_layer(&name)?,
        None if !mesh.uv_layers.is_empty() => mesh.active_uv = Some(0),
        None => {}
    }
    Ok(mesh)
}
