use glam::{Mat4, Vec3};

/// Fixed (direction, up) pair for each cube-map face, in +X -X +Y -Y +Z -Z
/// layer order.
///
/// The up-vectors keep every face right-side-up under the cube sampling
/// convention; the table is a contract with the sampler, not a derived value.
pub const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
    (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
    (Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
    (Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 0.0, -1.0)),
    (Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, -1.0, 0.0)),
    (Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, -1.0, 0.0)),
];

/// Extents of the directional light's orthographic shadow frustum.
///
/// Hand tuned for the demo scene; geometry outside the box simply receives no
/// shadow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoBounds {
    pub half_extent: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrthoBounds {
    fn default() -> Self {
        Self {
            half_extent: 10.0,
            distance: 10.0,
            near: 0.1,
            far: 40.0,
        }
    }
}

/// Sun-style light: a direction and a color, no position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec3) -> Self {
        Self { direction, color }
    }

    /// World-to-clip transform for the directional shadow map.
    ///
    /// Views the origin from `-direction * distance` through an orthographic
    /// box of `half_extent` per side. When the light shines straight up or
    /// down the up-reference flips to +Z to keep the look-at defined.
    pub fn light_space_matrix(&self, bounds: &OrthoBounds) -> Mat4 {
        let mut direction = self.direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = Vec3::NEG_Y;
        }
        let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(-direction * bounds.distance, Vec3::ZERO, up);
        let h = bounds.half_extent;
        let projection = Mat4::orthographic_rh(-h, h, -h, h, bounds.near, bounds.far);
        projection * view
    }
}

/// Point light with the standard inverse attenuation model
/// `1 / (constant + linear * d + quadratic * d^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            color,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }

    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }

    /// Six view matrices looking out from the light, one per cube face.
    pub fn cube_face_views(&self) -> [Mat4; 6] {
        CUBE_FACES.map(|(direction, up)| {
            Mat4::look_at_rh(self.position, self.position + direction, up)
        })
    }

    /// Shared projection for every cube face: 90 degrees so the six frusta
    /// tile all directions exactly, square aspect.
    pub fn cube_projection(near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, near, far)
    }
}

/// Circular path for the point light at a fixed height.
///
/// The position is a pure function of elapsed time, so the orbit never
/// accumulates drift across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    pub height: f32,
    pub speed_deg: f32,
}

impl Orbit {
    pub fn new(radius: f32, height: f32, speed_deg: f32) -> Self {
        Self {
            radius,
            height,
            speed_deg,
        }
    }

    pub fn position_at(&self, elapsed: f32) -> Vec3 {
        let angle = (self.speed_deg * elapsed).to_radians();
        Vec3::new(
            self.radius * angle.cos(),
            self.height,
            self.radius * angle.sin(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn orbit_stays_on_the_circle() {
        let orbit = Orbit::new(3.0, 2.5, 45.0);
        for t in [0.0_f32, 0.25, 1.0, 7.3, 100.0] {
            let position = orbit.position_at(t);
            let planar = position.x * position.x + position.z * position.z;
            assert!((planar - 9.0).abs() < EPSILON * 9.0);
            assert_eq!(position.y, 2.5);
        }
    }

    #[test]
    fn orbit_starts_at_the_configured_angle() {
        let orbit = Orbit::new(3.0, 2.5, 45.0);
        let start = orbit.position_at(0.0);
        assert!((start - Vec3::new(3.0, 2.5, 0.0)).length() < EPSILON);
    }

    #[test]
    fn zero_radius_orbit_is_a_fixed_light() {
        let orbit = Orbit::new(0.0, 3.0, 45.0);
        for t in [0.0_f32, 1.0, 2.0, 3.0, 4.0, 5.0] {
            assert_eq!(orbit.position_at(t), Vec3::new(0.0, 3.0, 0.0));
        }
    }

    #[test]
    fn cube_faces_map_direction_and_up_consistently() {
        let light = PointLight::new(Vec3::new(1.0, 2.0, -3.0), Vec3::ONE);
        let views = light.cube_face_views();
        for (view, (direction, up)) in views.iter().zip(CUBE_FACES) {
            let forward = view.transform_point3(light.position + direction);
            assert!((forward - Vec3::new(0.0, 0.0, -1.0)).length() < EPSILON);
            let upward = view.transform_point3(light.position + up);
            assert!((upward - Vec3::new(0.0, 1.0, 0.0)).length() < EPSILON);
        }
    }

    #[test]
    fn cube_face_table_covers_all_axes() {
        let mut sum = Vec3::ZERO;
        for (direction, up) in CUBE_FACES {
            assert!((direction.length() - 1.0).abs() < EPSILON);
            assert!((up.length() - 1.0).abs() < EPSILON);
            assert!(direction.dot(up).abs() < EPSILON);
            sum += direction;
        }
        assert_eq!(sum, Vec3::ZERO);
    }

    #[test]
    fn light_space_matrix_contains_the_scene_center() {
        let light = DirectionalLight::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::ONE);
        let matrix = light.light_space_matrix(&OrthoBounds::default());
        let clip = matrix.project_point3(Vec3::ZERO);
        assert!(clip.x.abs() <= 1.0);
        assert!(clip.y.abs() <= 1.0);
        assert!(clip.z >= 0.0 && clip.z <= 1.0);
    }

    #[test]
    fn light_space_matrix_rejects_points_outside_the_bounds() {
        let light = DirectionalLight::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::ONE);
        let matrix = light.light_space_matrix(&OrthoBounds::default());
        let clip = matrix.project_point3(Vec3::new(100.0, 0.0, 0.0));
        assert!(clip.x.abs() > 1.0 || clip.y.abs() > 1.0);
    }

    #[test]
    fn straight_down_light_keeps_a_finite_transform() {
        let light = DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE);
        let matrix = light.light_space_matrix(&OrthoBounds::default());
        assert!(matrix.is_finite());
        let clip = matrix.project_point3(Vec3::ZERO);
        assert!(clip.is_finite());
    }

    #[test]
    fn attenuation_falls_off_with_distance() {
        let light = PointLight::new(Vec3::ZERO, Vec3::ONE);
        assert!((light.attenuation(0.0) - 1.0).abs() < EPSILON);
        assert!(light.attenuation(5.0) < light.attenuation(1.0));
    }
}
