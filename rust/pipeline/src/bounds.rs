// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! World-space bounding spheres.

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::host::SceneHost;

/// Sphere enclosing an object's world-space bounding box, rounded to three
/// decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: [f64; 3],
    pub radius: f64,
}

/// Rounds to three decimal places. Never yields negative zero.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0 + 0.0
}

impl BoundingSphere {
    /// Builds the sphere from local bounding box corners and a world matrix.
    ///
    /// The center is the mean of the transformed corners. The radius is
    /// measured from the rounded center, so rounding can shrink it by at most
    /// half a thousandth.
    pub fn from_corners(corners: &[Point3<f64>; 8], matrix_world: &Matrix4<f64>) -> Self {
        let world: Vec<Point3<f64>> = corners
            .iter()
            .map(|c| matrix_world.transform_point(c))
            .collect();
        let mean = world
            .iter()
            .fold(Vector3::zeros(), |acc: Vector3<f64>, p| acc + p.coords)
            / world.len() as f64;
        let center = Point3::new(round3(mean.x), round3(mean.y), round3(mean.z));

        let radius = world
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0_f64, f64::max);

        Self {
            center: [center.x, center.y, center.z],
            radius: round3(radius),
        }
    }

    pub fn center_point(&self) -> Point3<f64> {
        Point3::new(self.center[0], self.center[1], self.center[2])
    }

    /// True when `point` lies inside the sphere grown by `tolerance`.
    pub fn contains(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        (point - self.center_point()).norm() <= self.radius + tolerance
    }
}

/// Bounding sphere of the named object as the host currently sees it.
pub fn object_bounding_sphere<H: SceneHost + ?Sized>(host: &H, name: &str) -> Result<BoundingSphere> {
    let corners = host.bound_box(name)?;
    let matrix = host.matrix_world(name)?;
    Ok(BoundingSphere::from_corners(&corners, &matrix))
}
