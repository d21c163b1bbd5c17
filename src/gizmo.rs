use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Position/color vertex for the unlit overlay lines.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GizmoVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl GizmoVertex {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }
}

/// World-axis lines from the origin: +X red, +Y green, +Z blue.
pub fn world_axes(length: f32) -> Vec<GizmoVertex> {
    let axes = [
        (Vec3::X, Vec3::new(0.9, 0.2, 0.2)),
        (Vec3::Y, Vec3::new(0.2, 0.9, 0.2)),
        (Vec3::Z, Vec3::new(0.2, 0.2, 0.9)),
    ];
    let mut vertices = Vec::with_capacity(6);
    for (axis, color) in axes {
        vertices.push(GizmoVertex::new(Vec3::ZERO, color));
        vertices.push(GizmoVertex::new(axis * length, color));
    }
    vertices
}

/// Small cross marking the origin. Point primitives rasterize at a single
/// pixel, so the marker is three short lines through the origin instead.
pub fn origin_marker(size: f32) -> Vec<GizmoVertex> {
    let color = Vec3::splat(0.95);
    let half = size / 2.0;
    let mut vertices = Vec::with_capacity(6);
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        vertices.push(GizmoVertex::new(-axis * half, color));
        vertices.push(GizmoVertex::new(axis * half, color));
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_axes_span_origin_to_length() {
        let vertices = world_axes(10.0);
        assert_eq!(vertices.len(), 6);
        for pair in vertices.chunks(2) {
            assert_eq!(pair[0].position, [0.0; 3]);
            assert_eq!(pair[0].color, pair[1].color);
            let end = Vec3::from_array(pair[1].position);
            assert_eq!(end.length(), 10.0);
        }
    }

    #[test]
    fn world_axes_are_color_coded() {
        let vertices = world_axes(1.0);
        let colors: Vec<[f32; 3]> = vertices.iter().step_by(2).map(|v| v.color).collect();
        assert_eq!(colors.len(), 3);
        assert!(colors[0][0] > colors[0][1] && colors[0][0] > colors[0][2]);
        assert!(colors[1][1] > colors[1][0] && colors[1][1] > colors[1][2]);
        assert!(colors[2][2] > colors[2][0] && colors[2][2] > colors[2][1]);
    }

    #[test]
    fn origin_marker_is_symmetric() {
        let vertices = origin_marker(0.5);
        assert_eq!(vertices.len(), 6);
        for pair in vertices.chunks(2) {
            let start = Vec3::from_array(pair[0].position);
            let end = Vec3::from_array(pair[1].position);
            assert_eq!(start, -end);
            assert!((end.length() - 0.25).abs() < 1e-6);
        }
    }
}
