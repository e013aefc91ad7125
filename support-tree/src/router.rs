//! Tree routing.
//!
//! Consumes the sorted queue of sample points top-down and emits a
//! forest of directed support edges. Every point terminates in exactly
//! one of four ways: a strut to the build plate, a strut to the model
//! surface, a merge with another queue point at a newly inserted
//! junction, or (for model-surface points) a micro-lift that re-enters
//! the queue one unit off the surface.

use nalgebra::{Point3, Vector3};
use support_mesh::TriMesh;
use tracing::debug;

use crate::geometry::{angle_between, intersect_lines, rotate_around, unit_or_up, PARALLEL_EPS};
use crate::params::SupportParams;
use crate::progress::{Progress, Stage};
use crate::sample::sort_top_down;
use crate::types::{PointOrigin, SupportPoint, TreePoint};

/// Clearance below which a model point routes straight to the plate
/// instead of being lifted off the surface.
const MIN_LIFT_CLEARANCE: f64 = 1.0;

/// Which of the three candidate termini a point routes to.
enum Winner {
    /// Merge with another queue point at a common junction.
    Merge(SupportPoint),
    /// Strut to the nearest qualifying point on the model surface.
    Model(SupportPoint),
    /// Strut straight down to the build plate.
    Plate,
}

/// Route every sample point to a terminator.
///
/// `queue` must be sorted top-down (the sampler's output order). The
/// build plate is the height of the lowest queue entry at the start.
/// Returns the forest of directed edges; an empty queue yields an empty
/// forest.
#[must_use]
pub fn route_tree(
    mesh: &TriMesh,
    mut queue: Vec<SupportPoint>,
    params: &SupportParams,
    progress: &mut Progress<'_>,
) -> Vec<TreePoint> {
    progress.begin(Stage::Route);

    let mut tree = Vec::new();
    let Some(lowest) = queue.last() else {
        return tree;
    };
    let z_min = lowest.location.z;

    // Lifts and junctions roughly double the pop count
    let full_size = queue.len() * 2;
    let mut processed = 0usize;

    while !queue.is_empty() {
        processed += 1;
        #[allow(clippy::cast_possible_truncation)]
        progress.report((100 * processed / full_size) as u32);

        let p = queue[0];
        // Points at plate height have arrived; they emit nothing
        if p.location.z > z_min {
            if p.origin == PointOrigin::Model {
                micro_lift(&mut tree, &mut queue, p, z_min);
            } else {
                let plate = Point3::new(p.location.x, p.location.y, z_min);
                match pick_winner(&p, &queue, mesh, plate, params.angle_limit) {
                    Winner::Merge(partner) => {
                        let junction = common_junction(
                            p.location,
                            partner.location,
                            params.angle_limit,
                        );
                        tree.push(TreePoint::new(p, SupportPoint::common(junction)));
                        tree.push(TreePoint::new(partner, SupportPoint::common(junction)));
                        if let Some(idx) =
                            queue.iter().position(|q| q.location == partner.location)
                        {
                            queue.remove(idx);
                        }
                        queue.push(SupportPoint::common(junction));
                    }
                    Winner::Model(anchor) => {
                        tree.push(TreePoint::new(p, anchor));
                    }
                    Winner::Plate => {
                        tree.push(TreePoint::new(p, SupportPoint::plate(plate)));
                    }
                }
            }
        }

        queue.remove(0);
        sort_top_down(&mut queue);
    }

    debug!(edges = tree.len(), "Routed support tree");
    progress.report(100);

    tree
}

/// Model-surface points get one unit of clearance along their normal
/// before routing continues from the lifted junction. Points already
/// within a unit of the plate drop straight down instead.
fn micro_lift(
    tree: &mut Vec<TreePoint>,
    queue: &mut Vec<SupportPoint>,
    p: SupportPoint,
    z_min: f64,
) {
    if p.location.z - z_min < MIN_LIFT_CLEARANCE {
        let plate = Point3::new(p.location.x, p.location.y, z_min);
        tree.push(TreePoint::new(p, SupportPoint::plate(plate)));
    } else {
        let lifted = p.location + unit_or_up(p.normal);
        tree.push(TreePoint::new(p, SupportPoint::common(lifted)));
        queue.push(SupportPoint::common(lifted));
    }
}

/// Choose among the three candidate termini.
///
/// Degenerate candidates (none qualifying) drop out of the comparison;
/// among the rest the nearest wins, with ties broken queue point first,
/// then model, then plate.
fn pick_winner(
    p: &SupportPoint,
    queue: &[SupportPoint],
    mesh: &TriMesh,
    plate: Point3<f64>,
    angle_limit: f64,
) -> Winner {
    let cp = closest_queue_point(queue, p, angle_limit);
    let cm = closest_point_on_model(mesh, p, angle_limit);
    let db = (p.location - plate).norm();

    match (cp, cm) {
        (Some(cp), Some(cm)) => {
            let dp = (cp.location - p.location).norm();
            let dm = (cm.location - p.location).norm();
            if dp <= db && dp <= dm {
                Winner::Merge(cp)
            } else if dm <= db {
                Winner::Model(cm)
            } else {
                Winner::Plate
            }
        }
        (Some(cp), None) => {
            if (cp.location - p.location).norm() <= db {
                Winner::Merge(cp)
            } else {
                Winner::Plate
            }
        }
        (None, Some(cm)) => {
            if (cm.location - p.location).norm() <= db {
                Winner::Model(cm)
            } else {
                Winner::Plate
            }
        }
        (None, None) => Winner::Plate,
    }
}

/// Nearest other queue point within reach of a merged strut.
///
/// A candidate qualifies when the angle between the connector and its
/// horizontal projection stays under `π/2 − angle_limit`, i.e. the
/// partner sits roughly lateral so the two self-support cones intersect
/// below. Vertically aligned candidates have no defined junction and
/// never qualify.
fn closest_queue_point(
    queue: &[SupportPoint],
    p: &SupportPoint,
    angle_limit: f64,
) -> Option<SupportPoint> {
    let threshold = std::f64::consts::FRAC_PI_2 - angle_limit;
    let mut best: Option<(f64, SupportPoint)> = None;

    // The point under consideration is always at the queue front
    for q in queue.iter().skip(1) {
        let connector = q.location - p.location;
        let horizontal = Vector3::new(connector.x, connector.y, 0.0);
        let Some(angle) = angle_between(&connector, &horizontal) else {
            continue;
        };
        if angle >= threshold {
            continue;
        }
        let dist = connector.norm();
        if best.map_or(true, |(bd, _)| dist < bd) {
            best = Some((dist, *q));
        }
    }

    best.map(|(_, q)| q)
}

/// Nearest point on the model surface a strut could anchor to.
///
/// Projects onto every triangle and keeps the closest projection that
/// lies strictly below the point and within the self-support cone.
fn closest_point_on_model(
    mesh: &TriMesh,
    p: &SupportPoint,
    angle_limit: f64,
) -> Option<SupportPoint> {
    let threshold = std::f64::consts::FRAC_PI_2 - angle_limit;
    let mut best: Option<(f64, SupportPoint)> = None;

    for tri in mesh.triangles() {
        let Some(normal) = tri.normal() else {
            continue;
        };
        let projection = tri.closest_point(p.location);
        if projection.z >= p.location.z {
            continue;
        }
        let connector = projection - p.location;
        let horizontal = Vector3::new(connector.x, connector.y, 0.0);
        let Some(angle) = angle_between(&connector, &horizontal) else {
            continue;
        };
        if angle <= threshold {
            continue;
        }
        let dist = connector.norm();
        if best.as_ref().map_or(true, |(bd, _)| dist < *bd) {
            best = Some((dist, SupportPoint::model(projection, normal)));
        }
    }

    best.map(|(_, anchor)| anchor)
}

/// Junction where the self-support cones of two points meet.
///
/// The straight-down direction of each point is rotated by
/// `±angle_limit` around the horizontal axis perpendicular to their
/// connector, and the junction is the closest approach of the two
/// resulting cone-surface lines.
fn common_junction(p1: Point3<f64>, p2: Point3<f64>, angle_limit: f64) -> Point3<f64> {
    let axis = (p2 - p1).cross(&Vector3::z());
    let len = axis.norm();
    if len < PARALLEL_EPS {
        return p1;
    }
    let axis = axis / len;

    let down = -Vector3::z();
    let d1 = rotate_around(down, axis, angle_limit);
    let d2 = rotate_around(down, axis, -angle_limit);
    intersect_lines(p1, d1, p2, d2)
}
