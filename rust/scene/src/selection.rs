// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object selection and interaction mode.
//!
//! Operators act on the *active* object. In edit mode the active object's
//! mesh is the edit mesh, whose per-element selection flags drive the
//! geometry operators.

use crate::arena::{ObjectKind, Scene, SceneObject};
use crate::error::{Error, Result};
use crate::keys::ObjectKey;
use crate::mesh::MeshData;

/// Interaction mode of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Object,
    Edit,
}

/// What `select_all` does to the edit mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    Select,
    Deselect,
}

impl Scene {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn active(&self) -> Option<ObjectKey> {
        self.active
    }

    pub fn is_selected(&self, key: ObjectKey) -> bool {
        self.selected.contains(&key)
    }

    /// Deselects all objects, then selects and activates the named one.
    pub fn select_object(&mut self, name: &str) -> Result<ObjectKey> {
        let key = self.require(name)?;
        self.selected.clear();
        self.selected.insert(key);
        self.active = Some(key);
        Ok(key)
    }

    /// Switches between object and edit mode.
    ///
    /// Entering edit mode needs an active mesh object.
    pub fn toggle_edit_mode(&mut self) -> Result<()> {
        self.mode = match self.mode {
            Mode::Edit => Mode::Object,
            Mode::Object => {
                let key = self.active.ok_or(Error::NoActiveObject)?;
                let object = self.object(key).ok_or(Error::ObjectKeyNotFound(key))?;
                if !object.is_mesh() {
                    return Err(Error::NotAMesh(object.name().to_string()));
                }
                Mode::Edit
            }
        };
        Ok(())
    }

    /// The active object's mesh while in edit mode.
    pub fn edit_mesh(&self) -> Result<&MeshData> {
        self.expect_mode(Mode::Edit)?;
        let key = self.active.ok_or(Error::NoActiveObject)?;
        let object = self.object(key).ok_or(Error::ObjectKeyNotFound(key))?;
        object
            .mesh()
            .ok_or_else(|| Error::NotAMesh(object.name().to_string()))
    }

    pub fn edit_mesh_mut(&mut self) -> Result<&mut MeshData> {
        self.expect_mode(Mode::Edit)?;
        let key = self.active.ok_or(Error::NoActiveObject)?;
        let SceneObject { name, kind, .. } = self
            .objects
            .get_mut(key)
            .ok_or(Error::ObjectKeyNotFound(key))?;
        match kind {
            ObjectKind::Mesh(mesh) => Ok(mesh),
            ObjectKind::Empty => Err(Error::NotAMesh(name.clone())),
        }
    }

    /// Selects or deselects every element of the edit mesh.
    pub fn select_all(&mut self, action: SelectAction) -> Result<()> {
        self.edit_mesh_mut()?
            .select_all(action == SelectAction::Select);
        Ok(())
    }

    pub(crate) fn expect_mode(&self, expected: Mode) -> Result<()> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(Error::WrongMode {
                expected,
                actual: self.mode,
            })
        }
    }
}
