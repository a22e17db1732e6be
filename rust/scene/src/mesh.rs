// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use std::collections::BTreeSet;

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashSet;

use crate::arena::unique_name;
use crate::error::{Error, Result};

/// Maximum number of UV layers a mesh can carry.
pub const MAX_UV_LAYERS: usize = 8;

/// A mesh vertex with its edit-mode selection flag.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshVertex {
    pub co: Point3<f64>,
    pub select: bool,
}

/// An edge between two vertex indices.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshEdge {
    pub verts: [u32; 2],
    pub select: bool,
}

/// A polygon given by its vertex loop.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFace {
    pub verts: Vec<u32>,
    /// Index into the owning object's material slots.
    pub material_index: usize,
    pub select: bool,
}

impl MeshFace {
    /// Boundary edges of the face as sorted vertex pairs.
    pub fn edge_keys(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.verts.len();
        (0..n).map(move |i| edge_key(self.verts[i], self.verts[(i + 1) % n]))
    }
}

/// A named UV parameterization.
#[derive(Debug, Clone, PartialEq)]
pub struct UvLayer {
    pub name: String,
    /// One coordinate per face corner, parallel to the mesh's face list.
    pub uvs: Vec<Vec<[f32; 2]>>,
}

/// Polygon mesh owned by a scene object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub(crate) vertices: Vec<MeshVertex>,
    pub(crate) edges: Vec<MeshEdge>,
    pub(crate) faces: Vec<MeshFace>,
    pub(crate) uv_layers: Vec<UvLayer>,
    pub(crate) active_uv: Option<usize>,
}

pub(crate) fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl MeshData {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from raw geometry.
    ///
    /// Face boundary edges missing from `edges` are added, so a mesh can be
    /// described by its faces alone. All faces start on material slot 0.
    pub fn from_geometry(
        vertices: Vec<Point3<f64>>,
        edges: Vec<[u32; 2]>,
        faces: Vec<Vec<u32>>,
    ) -> Result<Self> {
        let len = vertices.len();
        let check = |what: &'static str, index: u32| {
            if (index as usize) < len {
                Ok(())
            } else {
                Err(Error::InvalidIndex {
                    what,
                    index: index as usize,
                    len,
                })
            }
        };

        for e in &edges {
            check("edge vertex", e[0])?;
            check("edge vertex", e[1])?;
        }
        for f in &faces {
            if f.len() < 3 {
                return Err(Error::InvalidArgument(format!(
                    "face with {} vertices",
                    f.len()
                )));
            }
            for &v in f {
                check("face vertex", v)?;
            }
        }

        let faces: Vec<MeshFace> = faces
            .into_iter()
            .map(|verts| MeshFace {
                verts,
                material_index: 0,
                select: false,
            })
            .collect();

        let mut known = FxHashSet::default();
        let mut mesh_edges = Vec::with_capacity(edges.len());
        let face_edges = faces.iter().flat_map(|f| f.edge_keys());
        for (a, b) in edges.into_iter().map(|[a, b]| (a, b)).chain(face_edges) {
            if a != b && known.insert(edge_key(a, b)) {
                mesh_edges.push(MeshEdge {
                    verts: [a, b],
                    select: false,
                });
            }
        }

        Ok(Self {
            vertices: vertices
                .into_iter()
                .map(|co| MeshVertex { co, select: false })
                .collect(),
            edges: mesh_edges,
            faces,
            uv_layers: Vec::new(),
            active_uv: None,
        })
    }

    /// Assigns a material slot index to every face, in face order.
    pub fn set_material_indices(&mut self, indices: &[usize]) -> Result<()> {
        if indices.len() != self.faces.len() {
            return Err(Error::InvalidArgument(format!(
                "{} material indices for {} faces",
                indices.len(),
                self.faces.len()
            )));
        }
        for (face, &index) in self.faces.iter_mut().zip(indices) {
            face.material_index = index;
        }
        Ok(())
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[MeshEdge] {
        &self.edges
    }

    pub fn faces(&self) -> &[MeshFace] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no vertices at all
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Distinct material slot indices referenced by faces.
    pub fn used_material_indices(&self) -> BTreeSet<usize> {
        self.faces.iter().map(|f| f.material_index).collect()
    }

    // --- UV layers ---

    pub fn uv_layers(&self) -> &[UvLayer] {
        &self.uv_layers
    }

    pub fn uv_layer(&self, name: &str) -> Option<&UvLayer> {
        self.uv_layers.iter().find(|l| l.name == name)
    }

    /// Returns the layer that UV operators write to.
    pub fn active_uv_layer(&self) -> Option<&UvLayer> {
        self.active_uv.and_then(|i| self.uv_layers.get(i))
    }

    pub(crate) fn active_uv_layer_mut(&mut self) -> Option<&mut UvLayer> {
        self.active_uv.and_then(|i| self.uv_layers.get_mut(i))
    }

    /// Adds a UV layer and returns its index.
    ///
    /// The name gets a numeric suffix when `base` is taken. Coordinates are
    /// copied from the active layer if there is one. The first layer of a mesh
    /// becomes active; later layers do not.
    pub fn add_uv_layer(&mut self, base: &str) -> Result<usize> {
        if self.uv_layers.len() >= MAX_UV_LAYERS {
            return Err(Error::UvLayerLimit { max: MAX_UV_LAYERS });
        }
        let name = unique_name(base, |n| self.uv_layer(n).is_some());
        let uvs = match self.active_uv_layer() {
            Some(active) => active.uvs.clone(),
            None => self
                .faces
                .iter()
                .map(|f| vec![[0.0; 2]; f.verts.len()])
                .collect(),
        };
        self.uv_layers.push(UvLayer { name, uvs });
        let index = self.uv_layers.len() - 1;
        if self.active_uv.is_none() {
            self.active_uv = Some(index);
        }
        Ok(index)
    }

    /// Makes the named layer the active one.
    pub fn set_active_uv_layer(&mut self, name: &str) -> Result<()> {
        let index = self
            .uv_layers
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| Error::UvLayerNotFound(name.to_string()))?;
        self.active_uv = Some(index);
        Ok(())
    }

    // --- Selection ---

    /// Sets the selection flag of every vertex, edge and face.
    pub fn select_all(&mut self, select: bool) {
        self.vertices.iter_mut().for_each(|v| v.select = select);
        self.edges.iter_mut().for_each(|e| e.select = select);
        self.faces.iter_mut().for_each(|f| f.select = select);
    }

    /// Sets each vertex's selection from a predicate over its position.
    /// Returns the number of selected vertices.
    pub fn select_vertices_where(&mut self, mut pred: impl FnMut(&Point3<f64>) -> bool) -> usize {
        let mut count = 0;
        for v in &mut self.vertices {
            v.select = pred(&v.co);
            count += v.select as usize;
        }
        count
    }

    /// Flushes vertex selection upward: edges with both vertices selected
    /// and faces with all vertices selected become selected.
    pub fn select_flush(&mut self) {
        let vertices = &self.vertices;
        let selected = |i: &u32| vertices[*i as usize].select;
        for e in &mut self.edges {
            if e.verts.iter().all(selected) {
                e.select = true;
            }
        }
        for f in &mut self.faces {
            if f.verts.iter().all(selected) {
                f.select = true;
            }
        }
    }

    pub fn selected_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.select).count()
    }

    // --- Geometry ---

    /// Axis-aligned bounds of the vertex positions.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.co;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.inf(&v.co), max.sup(&v.co))
        }))
    }

    /// The eight corners of the local bounding box.
    ///
    /// Corner order is x-major: `(-,-,-) (-,-,+) (-,+,+) (-,+,-) (+,-,-)
    /// (+,-,+) (+,+,+) (+,+,-)`. An empty mesh yields eight origin points.
    pub fn bound_box(&self) -> [Point3<f64>; 8] {
        let (lo, hi) = self
            .bounds()
            .unwrap_or((Point3::origin(), Point3::origin()));
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
            Point3::new(hi.x, hi.y, lo.z),
        ]
    }

    /// Unnormalized face normal (Newell's method).
    pub fn face_normal(&self, face: usize) -> Vector3<f64> {
        let verts = &self.faces[face].verts;
        let mut n = Vector3::zeros();
        for i in 0..verts.len() {
            let a = self.vertices[verts[i] as usize].co;
            let b = self.vertices[verts[(i + 1) % verts.len()] as usize].co;
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
        }
        n
    }

    // --- Splitting ---

    /// Moves the flagged elements into a new mesh.
    ///
    /// Vertices and edges still used by geometry that stays behind remain in
    /// `self` as well, so boundary elements end up in both meshes. A vertex
    /// used only by moved edges or faces leaves `self` even when it is not
    /// flagged itself. Both meshes keep every UV layer and the same active
    /// layer.
    pub(crate) fn split_off(
        &mut self,
        take_verts: &[bool],
        take_edges: &[bool],
        take_faces: &[bool],
    ) -> MeshData {
        let keep_faces: Vec<bool> = take_faces.iter().map(|t| !t).collect();

        let remaining_face_edges: FxHashSet<(u32, u32)> = self
            .faces
            .iter()
            .zip(&keep_faces)
            .filter(|(_, keep)| **keep)
            .flat_map(|(f, _)| f.edge_keys())
            .collect();
        let keep_edges: Vec<bool> = self
            .edges
            .iter()
            .zip(take_edges)
            .map(|(e, take)| {
                !take || remaining_face_edges.contains(&edge_key(e.verts[0], e.verts[1]))
            })
            .collect();
        let mut moved_refs = vec![false; self.vertices.len()];
        for (e, _) in self.edges.iter().zip(take_edges).filter(|(_, take)| **take) {
            moved_refs[e.verts[0] as usize] = true;
            moved_refs[e.verts[1] as usize] = true;
        }
        for (f, _) in self.faces.iter().zip(take_faces).filter(|(_, take)| **take) {
            for &v in &f.verts {
                moved_refs[v as usize] = true;
            }
        }
        // Kept edges and faces pull their vertices back in through `subset`.
        let keep_verts: Vec<bool> = take_verts
            .iter()
            .zip(&moved_refs)
            .map(|(take, moved)| !take && !moved)
            .collect();

        let split = self.subset(take_verts, take_edges, take_faces);
        *self = self.subset(&keep_verts, &keep_edges, &keep_faces);
        split
    }

    /// Copies the flagged elements into a new mesh, pulling in any vertex
    /// referenced by a flagged edge or face.
    fn subset(&self, verts: &[bool], edges: &[bool], faces: &[bool]) -> MeshData {
        let mut include = verts.to_vec();
        for (e, _) in self.edges.iter().zip(edges).filter(|(_, inc)| **inc) {
            include[e.verts[0] as usize] = true;
            include[e.verts[1] as usize] = true;
        }
        for (f, _) in self.faces.iter().zip(faces).filter(|(_, inc)| **inc) {
            for &v in &f.verts {
                include[v as usize] = true;
            }
        }

        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut vertices = Vec::new();
        for (i, v) in self.vertices.iter().enumerate() {
            if include[i] {
                remap[i] = vertices.len() as u32;
                vertices.push(v.clone());
            }
        }

        let edges = self
            .edges
            .iter()
            .zip(edges)
            .filter(|(_, inc)| **inc)
            .map(|(e, _)| MeshEdge {
                verts: [remap[e.verts[0] as usize], remap[e.verts[1] as usize]],
                select: e.select,
            })
            .collect();

        let face_ids: Vec<usize> = (0..self.faces.len()).filter(|&i| faces[i]).collect();
        let faces = face_ids
            .iter()
            .map(|&i| {
                let f = &self.faces[i];
                MeshFace {
                    verts: f.verts.iter().map(|&v| remap[v as usize]).collect(),
                    material_index: f.material_index,
                    select: f.select,
                }
            })
            .collect();

        let uv_layers = self
            .uv_layers
            .iter()
            .map(|layer| UvLayer {
                name: layer.name.clone(),
                uvs: face_ids.iter().map(|&i| layer.uvs[i].clone()).collect(),
            })
            .collect();

        MeshData {
            vertices,
            edges,
            faces,
            uv_layers,
            active_uv: self.active_uv,
        }
    }
}
