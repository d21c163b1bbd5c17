use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved vertex shared by every primitive and both render passes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
        }
    }
}

/// CPU-side triangle mesh produced by the primitive generators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Unit quad in the XY plane with a +Z normal; model transforms orient it.
pub fn plane() -> Mesh {
    let normal = Vec3::Z;
    let vertices = vec![
        Vertex::new(Vec3::new(-0.5, -0.5, 0.0), normal, [0.0, 0.0]),
        Vertex::new(Vec3::new(0.5, -0.5, 0.0), normal, [1.0, 0.0]),
        Vertex::new(Vec3::new(0.5, 0.5, 0.0), normal, [1.0, 1.0]),
        Vertex::new(Vec3::new(-0.5, 0.5, 0.0), normal, [0.0, 1.0]),
    ];
    Mesh {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Unit cube centered at the origin, four vertices per face so every face
/// keeps a flat normal.
pub fn cube() -> Mesh {
    // (normal, tangent toward u, tangent toward v) per face
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut mesh = Mesh::default();
    for (normal, tangent_u, tangent_v) in FACES {
        let base = mesh.vertices.len() as u32;
        let center = normal * 0.5;
        for (du, dv, uv) in [
            (-0.5, -0.5, [0.0, 0.0]),
            (0.5, -0.5, [1.0, 0.0]),
            (0.5, 0.5, [1.0, 1.0]),
            (-0.5, 0.5, [0.0, 1.0]),
        ] {
            let position = center + tangent_u * du + tangent_v * dv;
            mesh.vertices.push(Vertex::new(position, normal, uv));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Latitude/longitude sphere. Rows share their last column with the first so
/// the longitude seam has no duplicate strip.
pub fn sphere(radius: f32, stacks: u32, slices: u32) -> Mesh {
    let mut mesh = Mesh::default();
    for i in 0..=stacks {
        let lat = PI * i as f32 / stacks as f32;
        for j in 0..slices {
            let lon = 2.0 * PI * j as f32 / slices as f32;
            let position = Vec3::new(
                radius * lat.sin() * lon.cos(),
                radius * lat.cos(),
                radius * lat.sin() * lon.sin(),
            );
            let uv = [j as f32 / slices as f32, i as f32 / stacks as f32];
            mesh.vertices
                .push(Vertex::new(position, position / radius, uv));
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let next_j = (j + 1) % slices;
            let a = i * slices + j;
            let b = i * slices + next_j;
            let c = (i + 1) * slices + j;
            let d = (i + 1) * slices + next_j;
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    mesh
}

/// Closed cylinder along the Y axis: top/bottom fans plus side quads with
/// radial normals. Edge vertices are duplicated per role so cap and side
/// normals stay distinct.
pub fn cylinder(radius: f32, height: f32, segments: u32) -> Mesh {
    let half = height / 2.0;
    let mut mesh = Mesh::default();
    mesh.vertices
        .push(Vertex::new(Vec3::new(0.0, half, 0.0), Vec3::Y, [0.5, 0.5]));
    mesh.vertices.push(Vertex::new(
        Vec3::new(0.0, -half, 0.0),
        Vec3::NEG_Y,
        [0.5, 0.5],
    ));

    for i in 0..=segments {
        let angle = 2.0 * PI * i as f32 / segments as f32;
        let x = radius * angle.cos();
        let z = radius * angle.sin();
        let u = i as f32 / segments as f32;
        let radial = Vec3::new(x / radius, 0.0, z / radius);

        mesh.vertices
            .push(Vertex::new(Vec3::new(x, half, z), Vec3::Y, [u, 1.0]));
        mesh.vertices
            .push(Vertex::new(Vec3::new(x, -half, z), Vec3::NEG_Y, [u, 0.0]));
        mesh.vertices
            .push(Vertex::new(Vec3::new(x, half, z), radial, [u, 1.0]));
        mesh.vertices
            .push(Vertex::new(Vec3::new(x, -half, z), radial, [u, 0.0]));
    }

    for i in 0..segments {
        let top = 2 + 4 * i;
        let next_top = 2 + 4 * (i + 1);
        mesh.indices.extend_from_slice(&[0, top, next_top]);

        let bottom = 3 + 4 * i;
        let next_bottom = 3 + 4 * (i + 1);
        mesh.indices.extend_from_slice(&[1, next_bottom, bottom]);

        let side_top = 4 + 4 * i;
        let side_bottom = 5 + 4 * i;
        let next_side_top = 4 + 4 * (i + 1);
        let next_side_bottom = 5 + 4 * (i + 1);
        mesh.indices
            .extend_from_slice(&[side_top, side_bottom, next_side_bottom]);
        mesh.indices
            .extend_from_slice(&[side_top, next_side_bottom, next_side_top]);
    }
    mesh
}

/// Cone along the Y axis with the apex at +height/2: base fan plus one apex
/// vertex per segment so each side triangle keeps its own slant normal.
pub fn cone(radius: f32, height: f32, segments: u32) -> Mesh {
    let half = height / 2.0;
    let mut mesh = Mesh::default();
    mesh.vertices.push(Vertex::new(
        Vec3::new(0.0, -half, 0.0),
        Vec3::NEG_Y,
        [0.5, 0.5],
    ));

    // base ring
    for i in 0..=segments {
        let angle = 2.0 * PI * i as f32 / segments as f32;
        let x = radius * angle.cos();
        let z = radius * angle.sin();
        mesh.vertices.push(Vertex::new(
            Vec3::new(x, -half, z),
            Vec3::NEG_Y,
            [i as f32 / segments as f32, 0.0],
        ));
    }
    for i in 0..segments {
        mesh.indices.extend_from_slice(&[0, 1 + i + 1, 1 + i]);
    }

    // side ring and apex copies; slant normal tilts outward by radius/height
    let side_base = mesh.vertices.len() as u32;
    for i in 0..=segments {
        let angle = 2.0 * PI * i as f32 / segments as f32;
        let x = radius * angle.cos();
        let z = radius * angle.sin();
        let u = i as f32 / segments as f32;
        let normal = Vec3::new(height * angle.cos(), radius, height * angle.sin()).normalize();
        mesh.vertices.push(Vertex::new(Vec3::new(x, -half, z), normal, [u, 0.0]));
        mesh.vertices
            .push(Vertex::new(Vec3::new(0.0, half, 0.0), normal, [u, 1.0]));
    }
    for i in 0..segments {
        let ring = side_base + 2 * i;
        let apex = side_base + 2 * i + 1;
        let next_ring = side_base + 2 * (i + 1);
        mesh.indices.extend_from_slice(&[ring, apex, next_ring]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_indices_in_range(mesh: &Mesh) {
        let count = mesh.vertices.len() as u32;
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.indices.iter().all(|&index| index < count));
    }

    fn assert_unit_normals(mesh: &Mesh) {
        for vertex in &mesh.vertices {
            let normal = Vec3::from_array(vertex.normal);
            assert!((normal.length() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn plane_is_a_single_quad() {
        let mesh = plane();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
    }

    #[test]
    fn cube_has_flat_faces() {
        let mesh = cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
        for vertex in &mesh.vertices {
            let position = Vec3::from_array(vertex.position);
            let normal = Vec3::from_array(vertex.normal);
            assert!((position.dot(normal) - 0.5).abs() < EPSILON);
        }
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let mesh = sphere(2.0, 8, 16);
        assert_eq!(mesh.vertices.len(), (8 + 1) * 16);
        assert_eq!(mesh.indices.len(), (8 * 16 * 6) as usize);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
        for vertex in &mesh.vertices {
            let position = Vec3::from_array(vertex.position);
            assert!((position.length() - 2.0).abs() < 1e-4);
            let normal = Vec3::from_array(vertex.normal);
            assert!((normal - position / 2.0).length() < EPSILON);
        }
    }

    #[test]
    fn cylinder_is_closed_and_radial() {
        let mesh = cylinder(0.5, 1.0, 12);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
        // 2 centers + 4 vertices per ring step
        assert_eq!(mesh.vertices.len(), 2 + 4 * 13);
        // caps: 12 triangles each; sides: 24
        assert_eq!(mesh.indices.len(), (12 + 12 + 24) * 3);
        for vertex in &mesh.vertices {
            assert!((vertex.position[1].abs() - 0.5).abs() < EPSILON);
        }
    }

    #[test]
    fn cone_spans_base_to_apex() {
        let mesh = cone(0.5, 1.5, 10);
        assert_indices_in_range(&mesh);
        assert_unit_normals(&mesh);
        let min_y = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::INFINITY, f32::min);
        let max_y = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::NEG_INFINITY, f32::max);
        assert!((min_y + 0.75).abs() < EPSILON);
        assert!((max_y - 0.75).abs() < EPSILON);
    }
}
