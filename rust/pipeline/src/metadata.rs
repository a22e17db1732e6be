// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The world metadata document.
//!
//! A JSON object with an `objs` map from object name to per-object record.
//! Runs merge into whatever the previous run left behind: records for objects
//! not visited survive untouched, as do keys this crate does not know about.
//! Output is pretty-printed with two-space indentation and sorted keys.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::bounds::BoundingSphere;
use crate::error::{Error, Result};

/// File name of the metadata document inside the destination directory.
pub const METADATA_FILE: &str = "world.json";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMetadata {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub objs: BTreeMap<String, ObjectRecord>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(rename = "worldBbox", default, skip_serializing_if = "Option::is_none")]
    pub world_bbox: Option<BoundingSphere>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_uv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightmap_uv: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl WorldMetadata {
    /// Returns the record for `name`, creating an empty one if needed.
    pub fn record_mut(&mut self, name: &str) -> &mut ObjectRecord {
        self.objs.entry(name.to_string()).or_default()
    }

    pub fn record(&self, name: &str) -> Option<&ObjectRecord> {
        self.objs.get(name)
    }

    pub fn len(&self) -> usize {
        self.objs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objs.is_empty()
    }

    /// Pretty JSON with two-space indentation and lexicographically sorted
    /// keys at every level.
    pub fn to_pretty_json(&self) -> Result<String> {
        let value = sort_keys(serde_json::to_value(self)?);
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

/// Rebuilds every object in `value` with its keys in sorted order, whatever
/// map representation serde_json was built with.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Location of the metadata document on disk.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the prior document. A missing, unreadable or malformed file
    /// yields an empty document.
    pub fn load(&self) -> WorldMetadata {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No prior metadata, starting empty");
                return WorldMetadata::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cannot read metadata, starting empty");
                return WorldMetadata::default();
            }
        };

        match serde_json::from_str::<WorldMetadata>(&text) {
            Ok(doc) => {
                debug!(path = %self.path.display(), records = doc.len(), "Loaded metadata");
                doc
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Malformed metadata, starting empty");
                WorldMetadata::default()
            }
        }
    }

    /// Writes the document, replacing the previous file atomically.
    pub fn persist(&self, doc: &WorldMetadata) -> Result<()> {
        let json = doc.to_pretty_json()?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(Error::io_at(dir))?;
        }

        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| METADATA_FILE.into());
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);

        std::fs::write(&tmp, json).map_err(Error::io_at(&tmp))?;
        std::fs::rename(&tmp, &self.path).map_err(Error::io_at(&self.path))?;
        debug!(path = %self.path.display(), records = doc.len(), "Persisted metadata");
        Ok(())
    }
}
