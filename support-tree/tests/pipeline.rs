//! End-to-end scenarios for the support pipeline.

use std::collections::HashSet;
use std::f64::consts::FRAC_PI_2;

use nalgebra::{Point3, Vector3};
use support_mesh::{TriMesh, VertexAdjacency};
use support_tree::{
    classify_overhangs, generate_supports, sample_support_points, PointOrigin, Progress, Stage,
    SupportParams, TreePoint,
};

/// Axis-aligned box with the same topology as the unit cube.
fn box_mesh(min: Point3<f64>, max: Point3<f64>) -> TriMesh {
    TriMesh::from_parts(
        vec![
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, max.z),
            Point3::new(min.x, max.y, max.z),
        ],
        vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ],
    )
}

/// A 10x10x1 box on the plate with a 2x2x0.1 slab floating at Z = 5.
fn roof_scene() -> TriMesh {
    let mut scene = box_mesh(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 1.0));
    scene.merge(&box_mesh(
        Point3::new(4.0, 4.0, 5.0),
        Point3::new(6.0, 6.0, 5.1),
    ));
    scene
}

/// A single triangle whose downward normal makes `overhang_degrees`
/// with straight down, hanging at Z near 5.
fn ramp(overhang_degrees: f64) -> TriMesh {
    let tilt = (90.0 - overhang_degrees).to_radians();
    let (s, c) = tilt.sin_cos();
    TriMesh::from_parts(
        vec![
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(1.0, 0.0, 5.0),
            Point3::new(0.0, -c, 5.0 - s),
        ],
        vec![[0, 1, 2]],
    )
}

/// Angle between a tree edge and its horizontal projection, if defined.
fn edge_angle_from_horizontal(edge: &TreePoint) -> Option<f64> {
    let connector = edge.lower.location - edge.upper.location;
    let horizontal = Vector3::new(connector.x, connector.y, 0.0);
    let norms = connector.norm() * horizontal.norm();
    if norms < 1e-12 {
        return None;
    }
    Some((connector.dot(&horizontal) / norms).clamp(-1.0, 1.0).acos())
}

#[test]
fn flat_roof_is_fully_supported() {
    let scene = roof_scene();
    let params = SupportParams::default();
    let result = generate_supports(&scene, &params, &mut Progress::none()).unwrap();

    // Both box and slab undersides look straight down
    assert_eq!(result.flagged_faces, 4);
    assert_eq!(result.flagged_vertices, 0);
    assert_eq!(result.flagged_edges, 0);

    assert!(!result.is_empty());
    assert!(result.strut_count() > 0);

    // Every roof sample is the upper end of exactly one edge. The two
    // slab triangles sample 2 * g(g+1)/2 points and share g along their
    // diagonal, leaving g * g distinct.
    let roof_uppers = result
        .tree
        .iter()
        .filter(|e| e.upper.origin == PointOrigin::Model && e.upper.location.z > 4.0)
        .count();
    assert_eq!(roof_uppers, params.grid_density * params.grid_density);

    // The forest reaches the plate, and nowhere else but Z = 0
    let plate_edges: Vec<_> = result
        .tree
        .iter()
        .filter(|e| e.lower.origin == PointOrigin::Plate)
        .collect();
    assert!(!plate_edges.is_empty());
    for edge in plate_edges {
        assert!(edge.lower.location.z.abs() < 1e-9);
    }
}

#[test]
fn tree_edges_only_go_down() {
    let result =
        generate_supports(&roof_scene(), &SupportParams::default(), &mut Progress::none()).unwrap();

    for edge in &result.tree {
        assert!(
            edge.lower.location.z <= edge.upper.location.z + 1e-9,
            "edge rises from {:?} to {:?}",
            edge.upper.location,
            edge.lower.location
        );
    }
}

#[test]
fn tree_edges_respect_the_cone() {
    let params = SupportParams::default();
    let result = generate_supports(&roof_scene(), &params, &mut Progress::none()).unwrap();

    // Struts descending anywhere but straight down must stay inside the
    // self-support cone
    for edge in &result.tree {
        if edge.lower.origin == PointOrigin::Plate {
            continue;
        }
        if let Some(angle) = edge_angle_from_horizontal(edge) {
            assert!(
                angle >= FRAC_PI_2 - params.angle_limit - 1e-9,
                "strut at {angle} rad from horizontal is too shallow"
            );
        }
    }
}

#[test]
fn shallow_ramp_needs_no_support() {
    let result =
        generate_supports(&ramp(45.0), &SupportParams::default(), &mut Progress::none()).unwrap();

    assert_eq!(result.flagged_faces, 0);
    assert!(result.is_empty());
    assert!(result.tree.is_empty());
}

#[test]
fn steep_ramp_routes_every_sample_to_the_plate() {
    let params = SupportParams::default();
    let result = generate_supports(&ramp(61.0), &params, &mut Progress::none()).unwrap();

    assert_eq!(result.flagged_faces, 1);

    // Triangular grid over the face; the face's own low corner doubles
    // as a flagged vertex but dedup keeps one copy
    let g = params.grid_density;
    assert_eq!(result.sample_count, g * (g + 1) / 2);

    // The lowest sample defines the plate and is discarded; everything
    // else is within a unit of it and drops straight down
    assert_eq!(result.strut_count(), g * (g + 1) / 2 - 1);
    for edge in &result.tree {
        assert_eq!(edge.lower.origin, PointOrigin::Plate);
        assert!((edge.upper.location.x - edge.lower.location.x).abs() < 1e-12);
        assert!((edge.upper.location.y - edge.lower.location.y).abs() < 1e-12);
    }
}

#[test]
fn flagged_faces_exceed_the_limit() {
    let scene = roof_scene();
    let params = SupportParams::default();
    let adjacency = VertexAdjacency::build(&scene.faces);
    let normals = scene.vertex_normals();
    let flags = classify_overhangs(&scene, &adjacency, &normals, &params);

    for &f in &flags.faces {
        let n = scene.face_normal(f).unwrap();
        let angle = n.dot(&Vector3::z()).clamp(-1.0, 1.0).acos();
        assert!(angle >= FRAC_PI_2 + params.angle_limit - 1e-9);
    }
}

#[test]
fn flagged_vertices_are_local_minima() {
    let mesh = ramp(61.0);
    let params = SupportParams::default();
    let adjacency = VertexAdjacency::build(&mesh.faces);
    let normals = mesh.vertex_normals();
    let flags = classify_overhangs(&mesh, &adjacency, &normals, &params);

    assert!(!flags.vertices.is_empty());
    for &v in &flags.vertices {
        let vz = mesh.vertices[v as usize].z;
        let ring = adjacency.neighbors(v);
        assert!(ring.iter().all(|&n| mesh.vertices[n as usize].z >= vz));
        assert!(ring.iter().any(|&n| mesh.vertices[n as usize].z > vz));
    }
}

#[test]
fn samples_are_unique() {
    let scene = roof_scene();
    let params = SupportParams::default().with_grid_density(6);
    let adjacency = VertexAdjacency::build(&scene.faces);
    let normals = scene.vertex_normals();
    let flags = classify_overhangs(&scene, &adjacency, &normals, &params);
    let samples = sample_support_points(
        &scene,
        &adjacency,
        &normals,
        &flags,
        &params,
        &mut Progress::none(),
    );

    let mut seen = HashSet::new();
    for p in &samples {
        assert!(seen.insert((
            p.location.x.to_bits(),
            p.location.y.to_bits(),
            p.location.z.to_bits(),
        )));
    }
}

#[test]
fn generation_is_deterministic() {
    let scene = roof_scene();
    let params = SupportParams::default();

    let first = generate_supports(&scene, &params, &mut Progress::none()).unwrap();
    let second = generate_supports(&scene, &params, &mut Progress::none()).unwrap();

    assert_eq!(first.tree.len(), second.tree.len());
    assert_eq!(
        first.support_mesh.face_count(),
        second.support_mesh.face_count()
    );
    for (a, b) in first
        .support_mesh
        .vertices
        .iter()
        .zip(&second.support_mesh.vertices)
    {
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
        assert_eq!(a.z.to_bits(), b.z.to_bits());
    }
    assert_eq!(first.support_mesh.faces, second.support_mesh.faces);
}

#[test]
fn horizontal_translation_moves_supports_along() {
    let params = SupportParams::default();
    let offset = Vector3::new(13.0, -4.0, 0.0);

    let base = generate_supports(&roof_scene(), &params, &mut Progress::none()).unwrap();

    let mut moved_scene = roof_scene();
    moved_scene.translate(offset);
    let moved = generate_supports(&moved_scene, &params, &mut Progress::none()).unwrap();

    // Same topology
    assert_eq!(base.tree.len(), moved.tree.len());
    assert_eq!(
        base.support_mesh.face_count(),
        moved.support_mesh.face_count()
    );

    // Same geometry, shifted
    for (a, b) in base
        .support_mesh
        .vertices
        .iter()
        .zip(&moved.support_mesh.vertices)
    {
        assert!(((a + offset) - b).norm() < 1e-6);
    }
}

#[test]
fn empty_mesh_yields_empty_result() {
    let result = generate_supports(
        &TriMesh::new(),
        &SupportParams::default(),
        &mut Progress::none(),
    )
    .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.sample_count, 0);
}

#[test]
fn invalid_parameters_are_rejected() {
    let err = generate_supports(
        &roof_scene(),
        &SupportParams::default().with_grid_density(0),
        &mut Progress::none(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("grid density"));
}

#[test]
fn progress_is_monotone_per_stage() {
    let mut reports: Vec<(Stage, u32)> = Vec::new();
    let mut sink = |stage: Stage, pct: u32| reports.push((stage, pct));
    let mut progress = Progress::new(&mut sink);

    generate_supports(&roof_scene(), &SupportParams::default(), &mut progress).unwrap();

    for stage in [Stage::Classify, Stage::Sample, Stage::Route, Stage::Mesh] {
        let per_stage: Vec<u32> = reports
            .iter()
            .filter(|(s, _)| *s == stage)
            .map(|&(_, p)| p)
            .collect();
        assert!(!per_stage.is_empty(), "stage {} never reported", stage.name());
        assert!(per_stage.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*per_stage.last().unwrap(), 100);
    }
}
