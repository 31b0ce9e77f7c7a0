//! 2D colored vertices and the procedural Sierpinski mesh

use bytemuck::{Pod, Zeroable};

use crate::config::MeshConfig;
use crate::foundation::math::Vec2;

/// Corner colors of a depth-0 triangle
pub const TOP_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
/// See [`TOP_COLOR`]
pub const RIGHT_COLOR: [f32; 3] = [0.0, 1.0, 0.0];
/// See [`TOP_COLOR`]
pub const LEFT_COLOR: [f32; 3] = [0.0, 0.0, 1.0];

/// Vertex of the base geometry
///
/// Matches `simple_shader.vert`: location 0 is `vec2 position`, location 1 is
/// `vec3 color`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Clip-space position
    pub position: [f32; 2],
    /// RGB color
    pub color: [f32; 3],
}

impl Vertex {
    /// Create a vertex
    pub fn new(position: Vec2, color: [f32; 3]) -> Self {
        Self {
            position: [position.x, position.y],
            color,
        }
    }
}

/// Number of vertices [`sierpinski`] emits for `depth`
///
/// `None` when the count does not fit in `usize`.
pub fn sierpinski_vertex_count(depth: i32) -> Option<usize> {
    3usize
        .checked_pow(depth.max(0).unsigned_abs())
        .and_then(|triangles| triangles.checked_mul(3))
}

/// Append a Sierpinski triangle of the given depth to `vertices`
///
/// At depth zero (or below) the triangle itself is emitted as top (red), right
/// (green), left (blue). Otherwise the three corner sub-triangles are emitted
/// in order: left corner, right corner, top corner.
pub fn sierpinski(vertices: &mut Vec<Vertex>, depth: i32, left: Vec2, right: Vec2, top: Vec2) {
    if depth <= 0 {
        vertices.push(Vertex::new(top, TOP_COLOR));
        vertices.push(Vertex::new(right, RIGHT_COLOR));
        vertices.push(Vertex::new(left, LEFT_COLOR));
        return;
    }

    let left_top = (left + top) * 0.5;
    let right_top = (right + top) * 0.5;
    let left_right = (left + right) * 0.5;
    sierpinski(vertices, depth - 1, left, left_right, left_top);
    sierpinski(vertices, depth - 1, left_right, right, right_top);
    sierpinski(vertices, depth - 1, left_top, right_top, top);
}

/// Generate the base mesh described by `config`
///
/// The caller bounds the depth; see [`sierpinski_vertex_count`].
pub fn sierpinski_mesh(config: &MeshConfig) -> Vec<Vertex> {
    let capacity = sierpinski_vertex_count(config.sierpinski_depth).unwrap_or_default();
    let mut vertices = Vec::with_capacity(capacity);
    sierpinski(
        &mut vertices,
        config.sierpinski_depth,
        Vec2::from(config.left),
        Vec2::from(config.right),
        Vec2::from(config.top),
    );
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Vec2, Vec2, Vec2) {
        (Vec2::new(-0.5, 0.5), Vec2::new(0.5, 0.5), Vec2::new(0.0, -0.5))
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
        let v = Vertex::new(Vec2::new(1.0, 2.0), [3.0, 4.0, 5.0]);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn vertex_count_grows_by_three_per_level() {
        let (left, right, top) = triangle();
        for depth in 0..6 {
            let mut vertices = Vec::new();
            sierpinski(&mut vertices, depth, left, right, top);
            assert_eq!(vertices.len(), 3 * 3usize.pow(depth as u32), "depth {depth}");
            assert_eq!(Some(vertices.len()), sierpinski_vertex_count(depth));
        }
    }

    #[test]
    fn depth_zero_colors_ignore_coordinates() {
        let mut vertices = Vec::new();
        sierpinski(
            &mut vertices,
            0,
            Vec2::new(10.0, -3.0),
            Vec2::new(7.5, 2.0),
            Vec2::new(-100.0, 0.25),
        );
        let colors: Vec<_> = vertices.iter().map(|v| v.color).collect();
        assert_eq!(colors, vec![TOP_COLOR, RIGHT_COLOR, LEFT_COLOR]);
        assert_eq!(vertices[0].position, [-100.0, 0.25]);
        assert_eq!(vertices[1].position, [7.5, 2.0]);
        assert_eq!(vertices[2].position, [10.0, -3.0]);
    }

    #[test]
    fn negative_depth_behaves_like_zero() {
        let (left, right, top) = triangle();
        let mut negative = Vec::new();
        let mut zero = Vec::new();
        sierpinski(&mut negative, -4, left, right, top);
        sierpinski(&mut zero, 0, left, right, top);
        assert_eq!(negative, zero);
        assert_eq!(sierpinski_vertex_count(-4), Some(3));
    }

    #[test]
    fn vertex_count_overflow_is_none() {
        assert_eq!(sierpinski_vertex_count(20), Some(3 * 3usize.pow(20)));
        assert_eq!(sierpinski_vertex_count(41), None);
        assert_eq!(sierpinski_vertex_count(i32::MAX), None);
    }

    #[test]
    fn recursion_concatenates_corner_subtriangles() {
        let (left, right, top) = triangle();
        let left_top = (left + top) * 0.5;
        let right_top = (right + top) * 0.5;
        let left_right = (left + right) * 0.5;

        for depth in 1..4 {
            let mut whole = Vec::new();
            sierpinski(&mut whole, depth, left, right, top);

            let mut parts = Vec::new();
            sierpinski(&mut parts, depth - 1, left, left_right, left_top);
            sierpinski(&mut parts, depth - 1, left_right, right, right_top);
            sierpinski(&mut parts, depth - 1, left_top, right_top, top);

            assert_eq!(whole, parts, "depth {depth}");
        }
    }

    #[test]
    fn appends_without_clearing() {
        let (left, right, top) = triangle();
        let sentinel = Vertex::new(Vec2::new(9.0, 9.0), [1.0, 1.0, 1.0]);
        let mut vertices = vec![sentinel];
        sierpinski(&mut vertices, 1, left, right, top);
        assert_eq!(vertices.len(), 10);
        assert_eq!(vertices[0], sentinel);
    }

    #[test]
    fn default_config_builds_nine_vertices() {
        let vertices = sierpinski_mesh(&MeshConfig::default());
        assert_eq!(vertices.len(), 9);
        assert_eq!(vertices[6].position, [0.0, -0.5]);
    }

    #[test]
    fn depth_one_matches_reference_layout() {
        let (left, right, top) = triangle();
        let mut vertices = Vec::new();
        sierpinski(&mut vertices, 1, left, right, top);
        // first sub-triangle: top = mid(left, top), right = mid(left, right), left = left
        assert_eq!(vertices[0].position, [-0.25, 0.0]);
        assert_eq!(vertices[1].position, [0.0, 0.5]);
        assert_eq!(vertices[2].position, [-0.5, 0.5]);
        // last sub-triangle ends with its left corner mid(left, top)
        assert_eq!(vertices[6].position, [0.0, -0.5]);
        assert_eq!(vertices[8].position, [-0.25, 0.0]);
    }
}
