//! Manifold generation by clipping the incident edge against the reference
//! edge.

use glam::Vec2;

use crate::geometry::{right_perp, Convex, EdgeFeature, Feature, Transform, Vertex};

use super::{Manifold, ManifoldPoint, ManifoldPointId, Penetration};

/// Builds contact manifolds from a penetration and the two shapes'
/// farthest features along the normal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClippingManifoldSolver;

impl ClippingManifoldSolver {
    /// Manifold for a detected penetration, or `None` when clipping leaves no
    /// point behind the reference face.
    pub fn manifold(
        &self,
        penetration: &Penetration,
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Option<Manifold> {
        let normal = penetration.normal;
        let feature_a = a.farthest_feature(normal, ta);
        let feature_b = b.farthest_feature(-normal, tb);

        let (edge_a, edge_b) = match (feature_a, feature_b) {
            (Feature::Point(vertex), _) | (Feature::Edge(_), Feature::Point(vertex)) => {
                return Some(Manifold {
                    normal,
                    points: vec![ManifoldPoint {
                        point: vertex.point,
                        depth: penetration.depth,
                        id: ManifoldPointId::Distance,
                    }],
                });
            }
            (Feature::Edge(ea), Feature::Edge(eb)) => (ea, eb),
        };

        // The edge more perpendicular to the normal is the reference face.
        let flipped = edge_a.edge().normalize_or_zero().dot(normal).abs()
            > edge_b.edge().normalize_or_zero().dot(normal).abs();
        let (reference, incident, search) = if flipped {
            (edge_b, edge_a, -normal)
        } else {
            (edge_a, edge_b, normal)
        };

        let ref_dir = reference.edge().normalize_or_zero();
        let side1 = clip(
            incident.v1,
            incident.v2,
            ref_dir,
            ref_dir.dot(reference.v1.point),
        )?;
        let side2 = clip(
            side1[0],
            side1[1],
            -ref_dir,
            -ref_dir.dot(reference.v2.point),
        )?;

        let mut face = right_perp(reference.edge()).normalize_or_zero();
        if face.dot(search) < 0.0 {
            face = -face;
        }
        let face_offset = face.dot(reference.max.point);

        let points: Vec<ManifoldPoint> = side2
            .iter()
            .filter_map(|v| {
                let depth = face_offset - face.dot(v.point);
                (depth >= 0.0).then_some(ManifoldPoint {
                    point: v.point,
                    depth,
                    id: indexed_id(&reference, &incident, v, flipped),
                })
            })
            .collect();

        (!points.is_empty()).then_some(Manifold { normal, points })
    }
}

fn indexed_id(
    reference: &EdgeFeature,
    incident: &EdgeFeature,
    vertex: &Vertex,
    flipped: bool,
) -> ManifoldPointId {
    ManifoldPointId::Indexed {
        reference_edge: reference.index,
        incident_edge: incident.index,
        incident_vertex: vertex.index,
        flipped,
    }
}

/// Keep the part of segment `v1`-`v2` with `direction . p >= offset`.
///
/// A point created on the plane takes the index of the vertex it replaces.
fn clip(v1: Vertex, v2: Vertex, direction: Vec2, offset: f32) -> Option<[Vertex; 2]> {
    let d1 = direction.dot(v1.point) - offset;
    let d2 = direction.dot(v2.point) - offset;

    let mut kept = Vec::with_capacity(2);
    if d1 >= 0.0 {
        kept.push(v1);
    }
    if d2 >= 0.0 {
        kept.push(v2);
    }
    if d1 * d2 < 0.0 {
        let t = d1 / (d1 - d2);
        let point = v1.point + (v2.point - v1.point) * t;
        let index = if d1 < 0.0 { v1.index } else { v2.index };
        kept.push(Vertex { point, index });
    }

    match kept.as_slice() {
        [first, second] => Some([*first, *second]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{NarrowphaseDetector, Sat};
    use crate::geometry::{Circle, Polygon, Slice};
    use std::f32::consts::{FRAC_PI_2, PI};

    fn manifold(
        a: &dyn Convex,
        ta: &Transform,
        b: &dyn Convex,
        tb: &Transform,
    ) -> Manifold {
        let p = Sat
            .detect(a, ta, b, tb)
            .unwrap()
            .expect("expected a collision");
        ClippingManifoldSolver
            .manifold(&p, a, ta, b, tb)
            .expect("expected a manifold")
    }

    #[test]
    fn test_box_resting_on_box_has_two_points() {
        let ground = Polygon::rectangle(10.0, 1.0).unwrap();
        let crate_ = Polygon::square(1.0).unwrap();
        let tg = Transform::identity();
        let tc = Transform::from_translation(Vec2::new(0.3, 0.99));
        let m = manifold(&ground, &tg, &crate_, &tc);

        assert_eq!(m.len(), 2);
        assert!((m.normal - Vec2::Y).length() < 1e-5);
        for p in &m.points {
            assert!((p.depth - 0.01).abs() < 1e-4);
            assert!(matches!(
                p.id,
                ManifoldPointId::Indexed {
                    reference_edge: 2,
                    flipped: false,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_reference_on_b_sets_flip() {
        let small = Polygon::square(1.0).unwrap();
        let ground = Polygon::rectangle(10.0, 1.0).unwrap();
        let ts = Transform::from_translation(Vec2::new(0.3, 0.99));
        let tg = Transform::identity();
        // Tilted slightly so B's face is the more perpendicular one.
        let ts = Transform::new(ts.translation, 0.05);
        let m = manifold(&small, &ts, &ground, &tg);
        assert!((1..=2).contains(&m.len()));
        assert!(m
            .points
            .iter()
            .all(|p| matches!(p.id, ManifoldPointId::Indexed { flipped: true, .. })));
    }

    #[test]
    fn test_circle_gives_single_distance_point() {
        let circle = Circle::new(0.5).unwrap();
        let ground = Polygon::rectangle(10.0, 1.0).unwrap();
        let tc = Transform::from_translation(Vec2::new(0.0, 0.9));
        let m = manifold(&ground, &Transform::identity(), &circle, &tc);
        assert_eq!(m.len(), 1);
        assert_eq!(m.points[0].id, ManifoldPointId::Distance);
        assert!((m.points[0].depth - 0.1).abs() < 1e-5);
        assert!((m.points[0].point - Vec2::new(0.0, 0.4)).length() < 1e-5);
    }

    #[test]
    fn test_hexagon_inside_slice_has_two_points() {
        let slice = Slice::new(3.0, FRAC_PI_2).unwrap();
        let hex = Polygon::regular(6, 0.5).unwrap();
        let th = Transform::new(Vec2::new(1.5, 0.2), -PI / 12.0);
        let m = manifold(&slice, &Transform::identity(), &hex, &th);
        assert_eq!(m.len(), 2);
        for p in &m.points {
            assert!((p.depth - 1.3523).abs() < 1e-3);
        }
    }

    #[test]
    fn test_ids_stable_for_unchanged_configuration() {
        let a = Polygon::rectangle(4.0, 1.0).unwrap();
        let b = Polygon::regular(5, 0.6).unwrap();
        let ta = Transform::identity();
        let tb = Transform::new(Vec2::new(0.4, 0.95), 0.2);
        let first = manifold(&a, &ta, &b, &tb);
        let second = manifold(&a, &ta, &b, &tb);
        assert_eq!(first, second);
    }

    #[test]
    fn test_clip_interpolates_with_removed_index() {
        let v1 = Vertex::indexed(Vec2::new(-1.0, 0.0), 3);
        let v2 = Vertex::indexed(Vec2::new(1.0, 0.0), 4);
        let clipped = clip(v1, v2, Vec2::X, 0.0);
        let [a, b] = clipped.expect("segment straddles the plane");
        assert_eq!(a.index, Some(4));
        assert_eq!(b.index, Some(3));
        assert!(b.point.length() < 1e-6);
    }
}
