use glam::{Mat4, Vec3};

const DEFAULT_SPEED: f32 = 3.0;
const DEFAULT_SENSITIVITY: f32 = 0.1;
const MIN_FOV_DEG: f32 = 1.0;
const MAX_FOV_DEG: f32 = 45.0;
const PITCH_LIMIT_DEG: f32 = 89.0;

/// Movement directions held down during a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementInput {
    pub fn any(self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// First-person free-fly camera.
///
/// Orientation is stored as yaw/pitch in degrees; the front/right/up basis is
/// recomputed whenever either angle changes and stays orthonormal for every
/// reachable pitch.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub front: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
    sensitivity: f32,
    fov: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// Creates a camera at `position` with the given yaw/pitch in degrees.
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: world_up,
            world_up,
            yaw,
            pitch,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            fov: MAX_FOV_DEG,
            near: 0.1,
            far: 100.0,
        };
        camera.update_vectors();
        camera
    }

    /// Look-at transform from the camera position along its front vector.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection for the given aspect ratio.
    ///
    /// Callers keep the viewport at least 1x1 so the ratio stays positive.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch
    }

    pub fn far_plane(&self) -> f32 {
        self.far
    }

    /// Translates along the front/right axes for every held direction.
    pub fn process_movement(&mut self, delta_time: f32, input: MovementInput) {
        let velocity = self.speed * delta_time;
        if input.forward {
            self.position += self.front * velocity;
        }
        if input.backward {
            self.position -= self.front * velocity;
        }
        if input.left {
            self.position -= self.right * velocity;
        }
        if input.right {
            self.position += self.right * velocity;
        }
    }

    /// Applies a cursor delta to yaw/pitch and rebuilds the basis.
    ///
    /// Pitch is clamped inside +-89 degrees while `constrain_pitch` is set so
    /// the basis never degenerates at the poles; yaw wraps naturally.
    pub fn process_look(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.sensitivity;
        self.pitch += y_offset * self.sensitivity;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        }
        self.update_vectors();
    }

    /// Narrows or widens the field of view, clamped to [1, 45] degrees.
    pub fn process_zoom(&mut self, scroll_offset: f32) {
        self.fov = (self.fov - scroll_offset).clamp(MIN_FOV_DEG, MAX_FOV_DEG);
    }

    fn update_vectors(&mut self) {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), Vec3::Y, -90.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn basis_stays_orthonormal_across_angles() {
        let mut camera = Camera::default();
        for yaw in [-180.0_f32, -90.0, -30.5, 0.0, 45.0, 123.0, 359.0] {
            for pitch in [-89.0_f32, -45.0, -1.5, 0.0, 30.0, 89.0] {
                camera.yaw = yaw;
                camera.pitch = pitch;
                camera.update_vectors();
                assert!((camera.front.length() - 1.0).abs() < EPSILON);
                assert!((camera.right.length() - 1.0).abs() < EPSILON);
                assert!((camera.up.length() - 1.0).abs() < EPSILON);
                assert!(camera.front.dot(camera.right).abs() < EPSILON);
                assert!(camera.front.dot(camera.up).abs() < EPSILON);
                assert!(camera.right.dot(camera.up).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn pitch_is_clamped_at_the_poles() {
        let mut camera = Camera::default();
        camera.process_look(0.0, 1_000_000.0, true);
        assert!(camera.pitch_degrees() <= 89.0);
        camera.process_look(0.0, -1_000_000.0, true);
        assert!(camera.pitch_degrees() >= -89.0);
    }

    #[test]
    fn fov_is_clamped_after_any_scroll_sequence() {
        let mut camera = Camera::default();
        for offset in [10.0_f32, -200.0, 3.5, 500.0, -0.1, 44.0] {
            camera.process_zoom(offset);
            assert!(camera.fov_degrees() >= 1.0);
            assert!(camera.fov_degrees() <= 45.0);
        }
    }

    #[test]
    fn movement_translates_along_the_basis() {
        let mut camera = Camera::default();
        let start = camera.position;
        camera.process_movement(
            1.0,
            MovementInput {
                forward: true,
                ..MovementInput::default()
            },
        );
        let moved = camera.position - start;
        assert!((moved.normalize().dot(camera.front) - 1.0).abs() < EPSILON);
        assert!((moved.length() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn view_looks_down_the_front_vector() {
        let camera = Camera::default();
        let ahead = camera.view().transform_point3(camera.position + camera.front);
        assert!((ahead - Vec3::new(0.0, 0.0, -1.0)).length() < EPSILON);
    }
}
