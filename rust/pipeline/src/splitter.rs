// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-material splitting of the environment hierarchy.

use tracing::debug;

use crate::error::Result;
use crate::host::SceneHost;

/// Outcome of [`separate_materials`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SplitReport {
    /// Objects that had more than one material slot.
    pub split: Vec<String>,
    /// Objects the splits created.
    pub created: Vec<String>,
}

/// Splits every mesh object below `root` with more than one material slot
/// into one object per material.
///
/// The object list is taken once up front. Objects created by a split are
/// single-material already and are not revisited.
pub fn separate_materials<H: SceneHost + ?Sized>(host: &mut H, root: &str) -> Result<SplitReport> {
    let mut report = SplitReport::default();

    for name in host.mesh_descendants(root)? {
        let slots = host.material_slot_count(&name)?;
        if slots <= 1 {
            continue;
        }

        let before = host.object_names();
        host.select_object(&name)?;
        host.separate_by_material()?;
        let created: Vec<String> = host
            .object_names()
            .difference(&before)
            .cloned()
            .collect();

        debug!(object = %name, slots, created = created.len(), "Separated by material");
        report.split.push(name);
        report.created.extend(created);
    }

    Ok(report)
}
