// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the export pipeline.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a pipeline run
#[derive(Error, Debug)]
pub enum Error {
    #[error("Scene error: {0}")]
    Scene(#[from] envbake_scene::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Output scene {} would overwrite the source scene", .0.display())]
    OutputOverwritesSource(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Maps an I/O failure to [`Error::Io`] tagged with `path`.
    pub(crate) fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.to_path_buf();
        move |source| Error::Io { path, source }
    }
}
