// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # envbake scene
//!
//! In-memory scene graph used by the environment export pipeline.
//!
//! Objects live in a slot map with generational keys and are indexed by their
//! unique name. Mesh objects carry vertex/edge/face lists with per-element
//! selection flags, material slots and per-corner UV layers. On top of that the
//! scene exposes the coarse editor operators the pipeline drives: object
//! selection, edit-mode toggling, separating selected geometry, separating by
//! material, cube projection and lightmap packing.
//!
//! Separation operators create new objects and shrink the source in place, so
//! callers should hold on to object *names* and look them up again after every
//! mutating call.

pub mod arena;
pub mod error;
pub mod keys;
pub mod mesh;
pub mod selection;
pub mod separate;
pub mod serialization;
pub mod transform;
pub mod traversal;
pub mod uv;

pub use arena::{ObjectKind, Scene, SceneObject};
pub use error::{Error, Result};
pub use keys::ObjectKey;
pub use mesh::{MeshData, MeshEdge, MeshFace, MeshVertex, UvLayer, MAX_UV_LAYERS};
pub use selection::{Mode, SelectAction};
pub use uv::{CubeProjection, LightmapPack, PackContext};
