// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for scene objects.
//!
//! The [`Scene`] is the central owner of all objects. Objects live in a slot
//! map with stable, generational keys; a name index maps the unique object
//! name to its key, and a child index supports downward traversal of the
//! parent hierarchy.
//!
//! ## Names are the identity
//!
//! Separation operators create brand-new objects and rewrite the source mesh
//! in place. Code that drives several operators in a row should keep names,
//! not borrowed objects, and resolve them through [`Scene::lookup`] after
//! every mutating call.

use nalgebra::Matrix4;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::keys::ObjectKey;
use crate::mesh::MeshData;
use crate::selection::Mode;

/// What an object carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Mesh(MeshData),
    /// A transform-only node used to group other objects.
    Empty,
}

/// Data stored for an object.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub(crate) name: String,
    pub(crate) parent: Option<ObjectKey>,
    /// Transform relative to the parent (or the world for root objects).
    pub matrix_local: Matrix4<f64>,
    /// Material slot names; faces reference them by index.
    pub materials: Vec<String>,
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ObjectKey> {
        self.parent
    }

    pub fn mesh(&self) -> Option<&MeshData> {
        match &self.kind {
            ObjectKind::Mesh(mesh) => Some(mesh),
            ObjectKind::Empty => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut MeshData> {
        match &mut self.kind {
            ObjectKind::Mesh(mesh) => Some(mesh),
            ObjectKind::Empty => None,
        }
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, ObjectKind::Mesh(_))
    }
}

/// The scene graph: objects, their hierarchy, and interaction state.
///
/// # Example
///
/// ```
/// use envbake_scene::{MeshData, Scene};
///
/// let mut scene = Scene::new();
/// let env = scene.add_empty("env", None).unwrap();
/// scene.add_mesh("gnd", MeshData::new(), Some(env)).unwrap();
/// let clash = scene.add_mesh("gnd", MeshData::new(), Some(env)).unwrap();
///
/// assert_eq!(scene.object(clash).unwrap().name(), "gnd.001");
/// assert_eq!(scene.object_count(), 3);
/// ```
#[derive(Debug, Default)]
pub struct Scene {
    pub(crate) objects: SlotMap<ObjectKey, SceneObject>,
    pub(crate) names: FxHashMap<String, ObjectKey>,

    // Downward adjacency: parent → children
    pub(crate) children: FxHashMap<ObjectKey, Vec<ObjectKey>>,

    // Interaction state
    pub(crate) selected: FxHashSet<ObjectKey>,
    pub(crate) active: Option<ObjectKey>,
    pub(crate) mode: Mode,
}

impl Scene {
    /// Creates a new, empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object under `parent` with an identity transform and no
    /// material slots. A taken name gets a numeric suffix.
    pub fn add_object(
        &mut self,
        name: &str,
        kind: ObjectKind,
        parent: Option<ObjectKey>,
    ) -> Result<ObjectKey> {
        if let Some(p) = parent {
            if !self.objects.contains_key(p) {
                return Err(Error::ObjectKeyNotFound(p));
            }
        }
        let name = unique_name(name, |n| self.names.contains_key(n));
        let key = self.objects.insert(SceneObject {
            name: name.clone(),
            parent,
            matrix_local: Matrix4::identity(),
            materials: Vec::new(),
            kind,
        });
        self.names.insert(name, key);
        if let Some(p) = parent {
            self.link_child(p, key);
        }
        Ok(key)
    }

    pub fn add_mesh(
        &mut self,
        name: &str,
        mesh: MeshData,
        parent: Option<ObjectKey>,
    ) -> Result<ObjectKey> {
        self.add_object(name, ObjectKind::Mesh(mesh), parent)
    }

    pub fn add_empty(&mut self, name: &str, parent: Option<ObjectKey>) -> Result<ObjectKey> {
        self.add_object(name, ObjectKind::Empty, parent)
    }

    /// Re-parents an object. Cycles are rejected.
    pub fn set_parent(&mut self, key: ObjectKey, parent: Option<ObjectKey>) -> Result<()> {
        let old = self.object(key).ok_or(Error::ObjectKeyNotFound(key))?.parent;
        if let Some(p) = parent {
            if !self.objects.contains_key(p) {
                return Err(Error::ObjectKeyNotFound(p));
            }
            let mut cursor = Some(p);
            while let Some(c) = cursor {
                if c == key {
                    return Err(Error::InvalidArgument(format!(
                        "parenting {} would create a cycle",
                        self.objects[key].name
                    )));
                }
                cursor = self.objects[c].parent;
            }
        }

        if let Some(o) = old {
            if let Some(siblings) = self.children.get_mut(&o) {
                siblings.retain(|&c| c != key);
            }
        }
        self.objects[key].parent = parent;
        if let Some(p) = parent {
            self.link_child(p, key);
        }
        Ok(())
    }

    /// Returns the object for the given key, or `None` if not found.
    pub fn object(&self, key: ObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    pub fn object_mut(&mut self, key: ObjectKey) -> Option<&mut SceneObject> {
        self.objects.get_mut(key)
    }

    /// Resolves a name to the object's current key.
    pub fn lookup(&self, name: &str) -> Option<ObjectKey> {
        self.names.get(name).copied()
    }

    /// Like [`lookup`](Self::lookup), but a missing object is an error.
    pub fn require(&self, name: &str) -> Result<ObjectKey> {
        self.lookup(name)
            .ok_or_else(|| Error::ObjectNotFound(name.to_string()))
    }

    /// Mesh data of the named object.
    pub fn mesh(&self, name: &str) -> Result<&MeshData> {
        let key = self.require(name)?;
        self.objects[key]
            .mesh()
            .ok_or_else(|| Error::NotAMesh(name.to_string()))
    }

    pub fn mesh_mut(&mut self, name: &str) -> Result<&mut MeshData> {
        let key = self.require(name)?;
        self.objects[key]
            .mesh_mut()
            .ok_or_else(|| Error::NotAMesh(name.to_string()))
    }

    /// Returns the number of objects in the scene.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Iterates over all object names in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Direct children of an object.
    pub fn children(&self, key: ObjectKey) -> &[ObjectKey] {
        self.children.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Root objects (no parent).
    pub fn roots(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.objects
            .iter()
            .filter(|(_, o)| o.parent.is_none())
            .map(|(k, _)| k)
    }

    /// Register that `child` hangs below `parent`.
    pub(crate) fn link_child(&mut self, parent: ObjectKey, child: ObjectKey) {
        self.children.entry(parent).or_default().push(child);
    }
}

/// Picks `wanted` if free, otherwise the first free `base.NNN` where `base`
/// is `wanted` without an existing three-digit suffix.
pub(crate) fn unique_name(wanted: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(wanted) {
        return wanted.to_string();
    }
    let base = match wanted.rsplit_once('.') {
        Some((stem, suffix)) if suffix.len() == 3 && suffix.bytes().all(|b| b.is_ascii_digit()) => {
            stem
        }
        _ => wanted,
    };
    (1u32..)
        .map(|n| format!("{base}.{n:03}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| wanted.to_string())
}
