// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use envbake_pipeline::{
    dice_ground, prepare_lightmaps, separate_materials, BoundingSphere, Error, MetadataStore,
    Pipeline, PipelineConfig, Result, SceneHost, SpatialTile, TileGrid, WorldMetadata,
};
use envbake_scene::{CubeProjection, LightmapPack, MeshData, Scene, SelectAction};
use nalgebra::{Matrix4, Point3, Vector3};
use serde_json::Value;

/// A flat grid of `n x n` quads of edge `step` with its lower-left corner at
/// (`origin`, `origin`).
fn ground_mesh(origin: f64, step: f64, n: u32) -> MeshData {
    let mut vertices = Vec::new();
    for i in 0..=n {
        for j in 0..=n {
            vertices.push(Point3::new(
                origin + i as f64 * step,
                origin + j as f64 * step,
                0.0,
            ));
        }
    }
    let row = n + 1;
    let mut faces = Vec::new();
    for i in 0..n {
        for j in 0..n {
            let a = i * row + j;
            faces.push(vec![a, a + row, a + row + 1, a + 1]);
        }
    }
    MeshData::from_geometry(vertices, vec![], faces).unwrap()
}

/// An axis-aligned box from `lo` to `hi` with one material index per face.
fn box_mesh(lo: Point3<f64>, hi: Point3<f64>, materials: [usize; 6]) -> MeshData {
    let v = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
    let vertices = vec![
        v(lo.x, lo.y, lo.z),
        v(hi.x, lo.y, lo.z),
        v(hi.x, hi.y, lo.z),
        v(lo.x, hi.y, lo.z),
        v(lo.x, lo.y, hi.z),
        v(hi.x, lo.y, hi.z),
        v(hi.x, hi.y, hi.z),
        v(lo.x, hi.y, hi.z),
    ];
    let faces = vec![
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![1, 2, 6, 5],
        vec![2, 3, 7, 6],
        vec![3, 0, 4, 7],
    ];
    let mut mesh = MeshData::from_geometry(vertices, vec![], faces).unwrap();
    mesh.set_material_indices(&materials).unwrap();
    mesh
}

/// `env` holding a 13 x 13 ground of 125-unit quads reaching past the
/// default grid on the high side, and a two-material crate.
fn environment() -> Scene {
    let mut scene = Scene::new();
    let env = scene.add_empty("env", None).unwrap();

    let mut ground = ground_mesh(-750.0, 125.0, 13);
    ground.add_uv_layer("UVMap").unwrap();
    let gnd = scene.add_mesh("gnd.001", ground, Some(env)).unwrap();
    scene.object_mut(gnd).unwrap().materials = vec!["terrain".into()];

    let mut crate_mesh = box_mesh(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 1.0, 1.0),
        [0, 0, 1, 1, 1, 0],
    );
    crate_mesh.add_uv_layer("UVMap").unwrap();
    let key = scene.add_mesh("crate", crate_mesh, Some(env)).unwrap();
    let object = scene.object_mut(key).unwrap();
    object.materials = vec!["wood".into(), "metal".into()];
    object.matrix_local = Matrix4::new_translation(&Vector3::new(10.0, 20.0, 0.5));
    scene
}

fn config_in(dir: &Path) -> PipelineConfig {
    PipelineConfig::new(dir.join("src").join("wrap.scene.json"), dir.join("dest"))
        .with_start_delay(Duration::ZERO)
}

/// Vertices no edge or face of `mesh` uses.
fn loose_vertices(mesh: &MeshData) -> usize {
    let mut used = vec![false; mesh.vertex_count()];
    for e in mesh.edges() {
        used[e.verts[0] as usize] = true;
        used[e.verts[1] as usize] = true;
    }
    for f in mesh.faces() {
        for &v in &f.verts {
            used[v as usize] = true;
        }
    }
    used.iter().filter(|u| !**u).count()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn four_vertex_ground_in_two_tiles() {
    let mut scene = Scene::new();
    let quad = MeshData::from_geometry(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
        ],
        vec![],
        vec![vec![0, 1, 3, 2]],
    )
    .unwrap();
    scene.add_mesh("gnd.001", quad, None).unwrap();

    let tiles = [
        SpatialTile {
            xlo: 0.0,
            xhi: 5.0,
            ylo: 0.0,
            yhi: 10.0,
        },
        SpatialTile {
            xlo: 5.0,
            xhi: 10.0,
            ylo: 0.0,
            yhi: 10.0,
        },
    ];
    let created = dice_ground(&mut scene, "gnd.001", &tiles).unwrap();
    assert!(created.len() <= 2);

    let positions = |name: &str| -> Vec<Point3<f64>> {
        scene
            .mesh(name)
            .unwrap()
            .vertices()
            .iter()
            .map(|v| v.co)
            .collect()
    };
    let mut seen = Vec::new();
    for (name, tile) in created.iter().zip(&tiles) {
        for co in positions(name) {
            assert!(tile.contains(&co));
            assert!(!seen.contains(&co), "{co:?} in two tiles");
            seen.push(co);
        }
    }

    // x = 10 and y = 10 lie on exclusive edges, so only the origin is cut.
    assert_eq!(created.len(), 1);
    assert_eq!(positions(&created[0]), vec![Point3::origin()]);
    assert_eq!(scene.mesh("gnd.001").unwrap().vertex_count(), 4);
    assert_eq!(scene.mesh("gnd.001").unwrap().face_count(), 1);
}

#[test]
fn tiling_partitions_vertices() {
    let mut scene = environment();
    let grid = TileGrid::default();
    let tiles = grid.tiles();
    let original: Vec<Point3<f64>> = scene
        .mesh("gnd.001")
        .unwrap()
        .vertices()
        .iter()
        .map(|v| v.co)
        .collect();

    let created = dice_ground(&mut scene, "gnd.001", &tiles).unwrap();
    assert_eq!(created.len(), 36);

    // Tile objects never share a vertex position, and each stays inside the
    // one tile that contains its first vertex.
    let mut seen: BTreeSet<(i64, i64)> = BTreeSet::new();
    for name in &created {
        let mesh = scene.mesh(name).unwrap();
        let first = mesh.vertices()[0].co;
        let tile = tiles.iter().find(|t| t.contains(&first)).unwrap();
        for v in mesh.vertices() {
            assert!(tile.contains(&v.co), "{name} leaves its tile");
            assert!(seen.insert((v.co.x as i64, v.co.y as i64)), "{name} shares a vertex");
        }
    }

    // Every original vertex inside the grid went to the tile containing it.
    // Vertices outside the grid stay in the residual ground only.
    let residual: Vec<Point3<f64>> = scene
        .mesh("gnd.001")
        .unwrap()
        .vertices()
        .iter()
        .map(|v| v.co)
        .collect();
    for co in &original {
        let key = (co.x as i64, co.y as i64);
        if tiles.iter().any(|t| t.contains(co)) {
            assert!(seen.contains(&key), "{co:?} not assigned");
        } else {
            assert!(!seen.contains(&key));
            assert!(residual.contains(co));
        }
    }
}

#[test]
fn empty_tile_leaves_source_unchanged() {
    let mut scene = environment();
    let before = scene.mesh("gnd.001").unwrap().clone();
    let names = scene.object_names();

    let nowhere = SpatialTile {
        xlo: 5000.0,
        xhi: 6000.0,
        ylo: 5000.0,
        yhi: 6000.0,
    };
    assert!(dice_ground(&mut scene, "gnd.001", &[nowhere]).unwrap().is_empty());
    assert_eq!(scene.mesh("gnd.001").unwrap(), &before);
    assert_eq!(scene.object_names(), names);
}

#[test]
fn material_split_is_complete() {
    let mut scene = environment();
    let report = separate_materials(&mut scene, "env").unwrap();
    assert_eq!(report.split, vec!["crate"]);
    assert_eq!(report.created.len(), 1);

    let parts = ["crate".to_string(), report.created[0].clone()];
    let mut materials = Vec::new();
    let mut faces = 0;
    let mut vertices = 0;
    for name in &parts {
        let key = scene.lookup(name).unwrap();
        let object = scene.object(key).unwrap();
        assert_eq!(object.materials.len(), 1);
        materials.push(object.materials[0].clone());
        let mesh = object.mesh().unwrap();
        faces += mesh.face_count();
        vertices += mesh.vertex_count();
        assert_eq!(loose_vertices(mesh), 0, "{name}");
        // Transform is inherited.
        assert_eq!(object.matrix_local[(1, 3)], 20.0);
    }
    materials.sort();
    assert_eq!(materials, vec!["metal", "wood"]);
    assert_eq!(faces, 6);
    // Both groups touch all 8 corners, so every vertex is a boundary copy.
    assert_eq!(vertices, 16);
}

#[test]
fn material_split_of_disjoint_parts_shrinks_source() {
    let mut scene = Scene::new();
    let env = scene.add_empty("env", None).unwrap();
    let mut mesh = ground_mesh(0.0, 1.0, 1);
    let far = ground_mesh(10.0, 1.0, 1);
    let offset = 4;
    let mut vertices: Vec<Point3<f64>> = mesh.vertices().iter().map(|v| v.co).collect();
    vertices.extend(far.vertices().iter().map(|v| v.co));
    let faces = mesh
        .faces()
        .iter()
        .map(|f| f.verts.clone())
        .chain(far.faces().iter().map(|f| f.verts.iter().map(|v| v + offset).collect()))
        .collect();
    mesh = MeshData::from_geometry(vertices, vec![], faces).unwrap();
    mesh.set_material_indices(&[0, 1]).unwrap();
    let key = scene.add_mesh("crate", mesh, Some(env)).unwrap();
    scene.object_mut(key).unwrap().materials = vec!["wood".into(), "metal".into()];

    let report = separate_materials(&mut scene, "env").unwrap();
    assert_eq!(report.created.len(), 1);
    let mut total = 0;
    for name in ["crate".to_string(), report.created[0].clone()] {
        let mesh = scene.mesh(&name).unwrap();
        assert_eq!(loose_vertices(mesh), 0, "{name}");
        total += mesh.vertex_count();
    }
    assert_eq!(total, 8);

    let corners = scene.bound_box("crate").unwrap();
    assert!(corners.iter().all(|c| c.x <= 1.0));

    let mut doc = WorldMetadata::default();
    prepare_lightmaps(&mut scene, "env", &mut doc).unwrap();
    let sphere = doc.record("crate").unwrap().world_bbox.unwrap();
    assert_eq!(sphere.center, [0.5, 0.5, 0.0]);
    assert_eq!(sphere.radius, 0.707);
}

#[test]
fn bounding_spheres_contain_world_corners() {
    let mut scene = environment();
    let mut doc = WorldMetadata::default();
    prepare_lightmaps(&mut scene, "env", &mut doc).unwrap();

    for name in ["crate", "gnd.001"] {
        let sphere = doc.record(name).unwrap().world_bbox.unwrap();
        assert!(sphere.radius >= 0.0);
        let corners = scene.bound_box(name).unwrap();
        let matrix = SceneHost::matrix_world(&scene, name).unwrap();
        for corner in &corners {
            let world = matrix.transform_point(corner);
            assert!(sphere.contains(&world, 0.001), "{name}: {world:?}");
        }
    }

    let crate_sphere = doc.record("crate").unwrap().world_bbox.unwrap();
    assert_eq!(crate_sphere.center, [11.0, 20.5, 1.0]);
}

#[tokio::test]
async fn full_run_writes_scene_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    environment().save(&config.source_scene).unwrap();
    let source_before = std::fs::read_to_string(&config.source_scene).unwrap();

    let mut pipeline = Pipeline::new(Scene::new(), config.clone()).unwrap();
    let summary = pipeline.run().await.unwrap();
    assert_eq!(summary.stages.len(), 3);
    assert!(!summary.tiles.is_empty());
    assert_eq!(summary.split.split, vec!["crate"]);
    assert!(summary.lightmaps.failed.is_empty());

    // The source is untouched; the output is a separate file.
    assert_eq!(std::fs::read_to_string(&config.source_scene).unwrap(), source_before);
    let output = Scene::load(&config.output_scene).unwrap();
    for tile in &summary.tiles {
        assert!(output.lookup(tile).is_some());
    }

    let doc = read_json(&config.metadata_path);
    let objs = doc["objs"].as_object().unwrap();
    assert_eq!(objs.len(), summary.lightmaps.visited.len());
    for (name, record) in objs {
        assert!(record["worldBbox"]["radius"].as_f64().unwrap() >= 0.0, "{name}");
        assert!(record["lightmap_uv"].as_str().unwrap().starts_with("lightmap"));
        let mesh = output.mesh(name).unwrap();
        assert_eq!(mesh.active_uv_layer().unwrap().name, record["lightmap_uv"]);
    }
    assert_eq!(objs["crate"]["render_uv"], "UVMap");
}

#[tokio::test]
async fn metadata_merge_is_non_destructive() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let mut scene = Scene::new();
    let env = scene.add_empty("env", None).unwrap();
    scene
        .add_mesh("gnd.001", ground_mesh(0.0, 1.0, 1), Some(env))
        .unwrap();
    scene
        .add_mesh(
            "B",
            box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0), [0; 6]),
            Some(env),
        )
        .unwrap();
    scene.save(&config.source_scene).unwrap();

    let prior = r#"{"objs": {"A": {"lightmap_uv": "lightmap", "worldBbox": {"center": [1.0, 2.0, 3.0], "radius": 4.0}}}}"#;
    std::fs::create_dir_all(config.metadata_path.parent().unwrap()).unwrap();
    std::fs::write(&config.metadata_path, prior).unwrap();

    Pipeline::new(Scene::new(), config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    let doc = read_json(&config.metadata_path);
    let prior: Value = serde_json::from_str(prior).unwrap();
    assert_eq!(doc["objs"]["A"], prior["objs"]["A"]);
    assert_eq!(doc["objs"]["B"]["lightmap_uv"], "lightmap");
    assert_eq!(doc["objs"]["B"]["worldBbox"]["center"][0], 0.5);
}

#[tokio::test]
async fn corrupt_metadata_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    environment().save(&config.source_scene).unwrap();
    std::fs::create_dir_all(config.metadata_path.parent().unwrap()).unwrap();
    std::fs::write(&config.metadata_path, "not json at all").unwrap();

    Pipeline::new(Scene::new(), config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    let store = MetadataStore::new(&config.metadata_path);
    assert!(store.load().record("crate").is_some());
}

#[tokio::test]
async fn missing_ground_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.ground_object = "no-such-ground".into();
    environment().save(&config.source_scene).unwrap();

    let err = Pipeline::new(Scene::new(), config.clone())
        .unwrap()
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Scene(_)));
    assert!(!config.output_scene.exists());
    assert!(!config.metadata_path.exists());
}

/// Delegates to an in-memory scene but fails the lightmap pack of one
/// object.
struct FailingPack {
    scene: Scene,
    fail_on: String,
    active: Option<String>,
}

impl SceneHost for FailingPack {
    fn open_scene(&mut self, path: &Path) -> Result<()> {
        self.scene.open_scene(path)
    }
    fn save_scene_as(&mut self, path: &Path) -> Result<()> {
        self.scene.save_scene_as(path)
    }
    fn object_names(&self) -> BTreeSet<String> {
        SceneHost::object_names(&self.scene)
    }
    fn mesh_descendants(&self, root: &str) -> Result<Vec<String>> {
        SceneHost::mesh_descendants(&self.scene, root)
    }
    fn select_object(&mut self, name: &str) -> Result<()> {
        SceneHost::select_object(&mut self.scene, name)?;
        self.active = Some(name.to_string());
        Ok(())
    }
    fn in_edit_mode(&self) -> bool {
        self.scene.in_edit_mode()
    }
    fn toggle_edit_mode(&mut self) -> Result<()> {
        SceneHost::toggle_edit_mode(&mut self.scene)
    }
    fn select_all(&mut self, action: SelectAction) -> Result<()> {
        SceneHost::select_all(&mut self.scene, action)
    }
    fn select_vertices(
        &mut self,
        predicate: &mut dyn FnMut(&Point3<f64>) -> bool,
    ) -> Result<usize> {
        self.scene.select_vertices(predicate)
    }
    fn select_flush(&mut self) -> Result<()> {
        self.scene.select_flush()
    }
    fn separate_selected(&mut self) -> Result<()> {
        SceneHost::separate_selected(&mut self.scene)
    }
    fn separate_by_material(&mut self) -> Result<()> {
        SceneHost::separate_by_material(&mut self.scene)
    }
    fn cube_project(&mut self, settings: &CubeProjection) -> Result<()> {
        SceneHost::cube_project(&mut self.scene, settings)
    }
    fn lightmap_pack(&mut self, settings: &LightmapPack) -> Result<()> {
        if self.active.as_deref() == Some(self.fail_on.as_str()) {
            return Err(Error::InvalidConfig(format!("bake refused for {}", self.fail_on)));
        }
        SceneHost::lightmap_pack(&mut self.scene, settings)
    }
    fn material_slot_count(&self, name: &str) -> Result<usize> {
        self.scene.material_slot_count(name)
    }
    fn vertex_count(&self, name: &str) -> Result<usize> {
        self.scene.vertex_count(name)
    }
    fn face_count(&self, name: &str) -> Result<usize> {
        self.scene.face_count(name)
    }
    fn bound_box(&self, name: &str) -> Result<[Point3<f64>; 8]> {
        self.scene.bound_box(name)
    }
    fn matrix_world(&self, name: &str) -> Result<Matrix4<f64>> {
        self.scene.matrix_world(name)
    }
    fn active_uv_layer(&self, name: &str) -> Result<Option<String>> {
        self.scene.active_uv_layer(name)
    }
    fn new_uv_layer(&mut self, name: &str, base: &str) -> Result<String> {
        self.scene.new_uv_layer(name, base)
    }
    fn set_active_uv_layer(&mut self, name: &str, layer: &str) -> Result<()> {
        self.scene.set_active_uv_layer(name, layer)
    }
}

#[test]
fn bake_failure_is_isolated() {
    let mut scene = Scene::new();
    let env = scene.add_empty("env", None).unwrap();
    for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
        let lo = Point3::new(i as f64 * 3.0, 0.0, 0.0);
        let hi = lo + Vector3::new(1.0, 1.0, 1.0);
        scene.add_mesh(name, box_mesh(lo, hi, [0; 6]), Some(env)).unwrap();
    }
    let mut host = FailingPack {
        scene,
        fail_on: "b".into(),
        active: None,
    };

    let mut doc = WorldMetadata::default();
    let report = prepare_lightmaps(&mut host, "env", &mut doc).unwrap();

    assert_eq!(report.visited, vec!["a", "b", "c"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].object, "b");
    assert!(report.failed[0].reason.contains("bake refused"));

    for name in ["a", "b", "c"] {
        let record = doc.record(name).unwrap();
        let sphere: BoundingSphere = record.world_bbox.unwrap();
        assert_eq!(sphere.radius, 0.866);
        assert_eq!(record.lightmap_uv.as_deref(), Some("lightmap"));
    }
}
