// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! World-space transforms.
//!
//! Objects store a local matrix relative to their parent. The world matrix
//! is the product of the parent chain, root first.

use nalgebra::{Matrix4, Point3};

use crate::arena::Scene;
use crate::error::{Error, Result};
use crate::keys::ObjectKey;

impl Scene {
    /// Returns the object's local-to-world matrix.
    pub fn world_matrix(&self, key: ObjectKey) -> Result<Matrix4<f64>> {
        let mut object = self.object(key).ok_or(Error::ObjectKeyNotFound(key))?;
        let mut matrix = object.matrix_local;
        while let Some(parent) = object.parent {
            object = self.object(parent).ok_or(Error::ObjectKeyNotFound(parent))?;
            matrix = object.matrix_local * matrix;
        }
        Ok(matrix)
    }

    /// The mesh's local bounding box corners mapped to world space.
    pub fn world_bound_box(&self, name: &str) -> Result<[Point3<f64>; 8]> {
        let matrix = self.world_matrix(self.require(name)?)?;
        Ok(self
            .mesh(name)?
            .bound_box()
            .map(|p| matrix.transform_point(&p)))
    }
}
