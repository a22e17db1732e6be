// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene operations.

use crate::keys::ObjectKey;
use crate::selection::Mode;

/// Result type alias for scene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing a scene.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No object with this name exists in the scene.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// A key no longer references a live object.
    #[error("object key not found: {0:?}")]
    ObjectKeyNotFound(ObjectKey),

    /// The object exists but carries no mesh data.
    #[error("object is not a mesh: {0}")]
    NotAMesh(String),

    /// Two objects in a scene document share a name.
    #[error("duplicate object name: {0}")]
    DuplicateName(String),

    /// The operator needs an active object and none is set.
    #[error("no active object")]
    NoActiveObject,

    /// The operator was invoked in the wrong interaction mode.
    #[error("operator requires {expected:?} mode, scene is in {actual:?} mode")]
    WrongMode { expected: Mode, actual: Mode },

    /// A vertex, edge or face index points outside its list.
    #[error("{what} index {index} out of range (len {len})")]
    InvalidIndex {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A mesh already carries the maximum number of UV layers.
    #[error("mesh already has the maximum of {max} UV layers")]
    UvLayerLimit { max: usize },

    /// No UV layer with this name exists on the mesh.
    #[error("UV layer not found: {0}")]
    UvLayerNotFound(String),

    /// The operator writes the active UV layer and the mesh has none.
    #[error("mesh has no active UV layer")]
    NoActiveUvLayer,

    /// A packing operator found no faces to work on.
    #[error("no faces to pack")]
    NothingToPack,

    /// A face has a zero-length normal or non-finite coordinates.
    #[error("degenerate face {0}")]
    DegenerateFace(usize),

    /// An operator argument is out of its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Reading or writing a scene document failed.
    #[error("scene I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
