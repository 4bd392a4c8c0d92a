//! Clickable area data.

use glam::Vec2;
use marigold_core::PointerButton;
use marigold_scene::NodeId;

/// A pointer-sensitive polygon in world space.
///
/// Receivers are value-identified: the index removes an entry by
/// matching button, depth, and vertex sequence against the shape that
/// was registered. The owning node is carried for routing only and is
/// excluded from equality, so a node can re-register the same area
/// after being respawned under a fresh id.
#[derive(Debug, Clone)]
pub struct Receiver {
    pub owner: NodeId,
    pub button: PointerButton,
    pub z_order: i32,
    pub vertices: Vec<Vec2>,
}

impl PartialEq for Receiver {
    fn eq(&self, other: &Self) -> bool {
        self.button == other.button
            && self.z_order == other.z_order
            && self.vertices == other.vertices
    }
}

impl Receiver {
    pub fn new(owner: NodeId, button: PointerButton, z_order: i32, vertices: Vec<Vec2>) -> Self {
        Self {
            owner,
            button,
            z_order,
            vertices,
        }
    }

    /// Axis-aligned bounds as `(min, max)`.
    ///
    /// An empty polygon yields an inverted box that fits no quadrant
    /// and overlaps no point.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for v in &self.vertices {
            min = min.min(*v);
            max = max.max(*v);
        }
        (min, max)
    }

    /// Even-odd ray cast towards +x.
    ///
    /// Each edge contributes on the half-open span `[v1, v2)` of its y
    /// interval; a crossing that lands exactly on a vertex counts only
    /// when the two edges meeting there leave it on opposite sides of
    /// the ray. Shared corners are therefore never counted twice.
    pub fn contains(&self, point: Vec2) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut count = 0;
        for i in 0..n {
            let v1 = self.vertices[i];
            let v2 = self.vertices[(i + 1) % n];
            let dy = v2.y - v1.y;
            if dy == 0.0 {
                // Horizontal edge: its endpoints are resolved by the
                // adjacent edges' vertex checks.
                continue;
            }
            let t2 = (point.y - v1.y) / dy;
            if !(0.0..1.0).contains(&t2) {
                continue;
            }
            if v1.x + t2 * (v2.x - v1.x) < point.x {
                continue;
            }
            if t2 < 1e-6 {
                let v0 = self.vertices[(i + n - 1) % n];
                if (v0.y - v1.y) * dy < 0.0 {
                    count += 1;
                }
            } else {
                count += 1;
            }
        }
        count % 2 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marigold_scene::Scene;
    use rstest::rstest;

    fn owner() -> NodeId {
        let mut scene = Scene::new();
        scene.create_entity()
    }

    fn square(owner: NodeId) -> Receiver {
        Receiver::new(
            owner,
            PointerButton::Primary,
            0,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(10.0, 10.0),
                Vec2::new(0.0, 10.0),
            ],
        )
    }

    fn diamond(owner: NodeId) -> Receiver {
        Receiver::new(
            owner,
            PointerButton::Primary,
            0,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(5.0, 5.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(5.0, -5.0),
            ],
        )
    }

    // The ray casts towards +x, so the right edge is inside while the
    // left edge crosses both verticals and stays out.
    #[rstest]
    #[case::center(Vec2::new(5.0, 5.0), true)]
    #[case::right_of(Vec2::new(15.0, 5.0), false)]
    #[case::below(Vec2::new(5.0, -1.0), false)]
    #[case::right_edge(Vec2::new(10.0, 5.0), true)]
    #[case::left_edge(Vec2::new(0.0, 5.0), false)]
    fn square_containment(#[case] point: Vec2, #[case] inside: bool) {
        assert_eq!(square(owner()).contains(point), inside);
    }

    #[test]
    fn apex_vertex_is_not_a_crossing() {
        let r = diamond(owner());
        // A ray at the apex height touches the polygon only at (5, 5).
        assert!(!r.contains(Vec2::new(-1.0, 5.0)));
    }

    #[test]
    fn pass_through_vertex_counts_once() {
        let r = diamond(owner());
        // At y = 0 the ray passes exactly through the side corners.
        assert!(r.contains(Vec2::new(2.0, 0.0)));
        assert!(!r.contains(Vec2::new(-1.0, 0.0)));
        assert!(!r.contains(Vec2::new(11.0, 0.0)));
    }

    #[test]
    fn degenerate_polygons_contain_nothing() {
        let empty = Receiver::new(owner(), PointerButton::Primary, 0, Vec::new());
        assert!(!empty.contains(Vec2::ZERO));

        let segment = Receiver::new(
            owner(),
            PointerButton::Primary,
            0,
            vec![Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0)],
        );
        assert!(!segment.contains(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn equality_ignores_the_owner() {
        let mut scene = Scene::new();
        let a = square(scene.create_entity());
        let b = square(scene.create_entity());
        assert_eq!(a, b);

        let mut c = a.clone();
        c.z_order = 5;
        assert_ne!(a, c);

        let mut d = a.clone();
        d.button = PointerButton::Secondary;
        assert_ne!(a, d);
    }

    #[test]
    fn bounds_cover_the_vertex_set() {
        let r = diamond(owner());
        let (min, max) = r.bounds();
        assert_eq!(min, Vec2::new(0.0, -5.0));
        assert_eq!(max, Vec2::new(10.0, 5.0));
    }
}
