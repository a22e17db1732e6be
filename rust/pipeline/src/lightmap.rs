// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lightmap UV preparation and per-object metadata.
//!
//! Every mesh object below the environment root gets its world bounding
//! sphere and UV layer names recorded, a fresh `lightmap` UV layer made
//! active, and a lightmap pack over all faces. Metadata is written before
//! packing, so a failed pack still leaves a complete record. A failed pack is
//! logged and the loop moves on.

use envbake_scene::uv::LIGHTMAP_UV_LAYER;
use envbake_scene::{LightmapPack, PackContext};
use tracing::{debug, warn};

use crate::bounds::object_bounding_sphere;
use crate::error::Result;
use crate::host::SceneHost;
use crate::metadata::WorldMetadata;

/// An object whose lightmap pack failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeFailure {
    pub object: String,
    pub reason: String,
}

/// Outcome of [`prepare_lightmaps`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LightmapReport {
    /// Every object visited, in visit order.
    pub visited: Vec<String>,
    pub failed: Vec<BakeFailure>,
}

impl LightmapReport {
    /// Number of objects packed successfully.
    pub fn packed(&self) -> usize {
        self.visited.len() - self.failed.len()
    }
}

/// Pack settings used for every object.
pub fn lightmap_settings() -> LightmapPack {
    LightmapPack {
        context: PackContext::AllFaces,
        new_uv_layer: false,
        ..LightmapPack::default()
    }
}

/// Records metadata for and lightmap-packs every mesh object below `root`.
///
/// Only host failures outside the pack itself abort the stage.
pub fn prepare_lightmaps<H: SceneHost + ?Sized>(
    host: &mut H,
    root: &str,
    doc: &mut WorldMetadata,
) -> Result<LightmapReport> {
    let mut report = LightmapReport::default();

    for name in host.mesh_descendants(root)? {
        host.select_object(&name)?;

        let sphere = object_bounding_sphere(host, &name)?;
        let render_uv = host.active_uv_layer(&name)?;
        let lightmap_uv = host.new_uv_layer(&name, LIGHTMAP_UV_LAYER)?;

        let record = doc.record_mut(&name);
        record.world_bbox = Some(sphere);
        if let Some(layer) = render_uv {
            record.render_uv = Some(layer);
        }
        record.lightmap_uv = Some(lightmap_uv.clone());

        host.set_active_uv_layer(&name, &lightmap_uv)?;
        let active = host.active_uv_layer(&name)?.unwrap_or_default();
        debug!(object = %name, active_uv = %active, "start lightmap_pack");

        if let Err(e) = host.lightmap_pack(&lightmap_settings()) {
            warn!(object = %name, error = %e, "Lightmap pack failed");
            report.failed.push(BakeFailure {
                object: name.clone(),
                reason: e.to_string(),
            });
        }
        report.visited.push(name);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use envbake_scene::{MeshData, Scene};
    use nalgebra::{Matrix4, Point3, Vector3};

    fn quad() -> MeshData {
        MeshData::from_geometry(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ],
            vec![],
            vec![vec![0, 1, 2, 3]],
        )
        .unwrap()
    }

    fn scene() -> Scene {
        let mut scene = Scene::new();
        let env = scene.add_empty("env", None).unwrap();
        scene.object_mut(env).unwrap().matrix_local =
            Matrix4::new_translation(&Vector3::new(100.0, 0.0, 0.0));

        let mut textured = quad();
        textured.add_uv_layer("UVMap").unwrap();
        scene.add_mesh("textured", textured, Some(env)).unwrap();
        scene.add_mesh("plain", quad(), Some(env)).unwrap();
        scene
    }

    #[test]
    fn records_and_packs_every_mesh() {
        let mut scene = scene();
        let mut doc = WorldMetadata::default();
        let report = prepare_lightmaps(&mut scene, "env", &mut doc).unwrap();

        assert_eq!(report.visited, vec!["plain", "textured"]);
        assert_eq!(report.packed(), 2);

        let textured = doc.record("textured").unwrap();
        assert_eq!(textured.render_uv.as_deref(), Some("UVMap"));
        assert_eq!(textured.lightmap_uv.as_deref(), Some("lightmap"));
        let sphere = textured.world_bbox.unwrap();
        assert_eq!(sphere.center, [101.0, 1.0, 0.0]);
        assert_eq!(sphere.radius, 1.414);

        // No prior layer: render_uv is omitted.
        let plain = doc.record("plain").unwrap();
        assert_eq!(plain.render_uv, None);
        assert_eq!(plain.lightmap_uv.as_deref(), Some("lightmap"));

        let mesh = scene.mesh("textured").unwrap();
        assert_eq!(mesh.active_uv_layer().unwrap().name, "lightmap");
        assert_eq!(mesh.uv_layers().len(), 2);
    }

    #[test]
    fn failed_pack_is_isolated() {
        let mut scene = scene();
        let env = scene.lookup("env").unwrap();
        let loose = MeshData::from_geometry(vec![Point3::new(5.0, 5.0, 5.0)], vec![], vec![])
            .unwrap();
        scene.add_mesh("loose", loose, Some(env)).unwrap();

        let mut doc = WorldMetadata::default();
        let report = prepare_lightmaps(&mut scene, "env", &mut doc).unwrap();

        assert_eq!(report.visited, vec!["loose", "plain", "textured"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].object, "loose");
        assert_eq!(report.packed(), 2);

        // The failing object's metadata was recorded before the pack.
        let loose = doc.record("loose").unwrap();
        assert_eq!(loose.world_bbox.unwrap().center, [105.0, 5.0, 5.0]);
        assert_eq!(loose.lightmap_uv.as_deref(), Some("lightmap"));
    }

    #[test]
    fn existing_lightmap_layer_gets_a_fresh_name() {
        let mut scene = scene();
        let mut doc = WorldMetadata::default();
        prepare_lightmaps(&mut scene, "env", &mut doc).unwrap();
        prepare_lightmaps(&mut scene, "env", &mut doc).unwrap();

        let textured = doc.record("textured").unwrap();
        assert_eq!(textured.render_uv.as_deref(), Some("lightmap"));
        assert_eq!(textured.lightmap_uv.as_deref(), Some("lightmap.001"));
    }

    #[test]
    fn unrelated_records_survive() {
        let mut scene = scene();
        let mut doc = WorldMetadata::default();
        doc.record_mut("elsewhere").render_uv = Some("UVMap".into());
        prepare_lightmaps(&mut scene, "env", &mut doc).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.record("elsewhere").unwrap().render_uv.as_deref(), Some("UVMap"));
    }
}
