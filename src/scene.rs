use glam::{Mat4, Vec3};

use crate::lights::{DirectionalLight, Orbit, OrthoBounds, PointLight};
use crate::material::{Material, TextureImage};
use crate::mesh::{self, Mesh};

/// A mesh instance with a fixed world transform and material.
#[derive(Debug, Clone)]
pub struct Drawable {
    pub name: String,
    pub mesh: Mesh,
    pub model: Mat4,
    pub material: Material,
}

impl Drawable {
    pub fn new(name: impl Into<String>, mesh: Mesh, model: Mat4, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh,
            model,
            material,
        }
    }
}

/// Owns the drawable list and both lights, and runs the per-frame update
/// that feeds the render passes.
///
/// The drawable list is append-only once the scene is built; passes iterate
/// it in insertion order and never mutate the meshes.
#[derive(Debug)]
pub struct Scene {
    drawables: Vec<Drawable>,
    pub directional: DirectionalLight,
    pub ortho_bounds: OrthoBounds,
    pub point: PointLight,
    pub orbit: Orbit,
    /// Draws the world-axis overlay when set. Off by default.
    pub show_axes: bool,
}

impl Scene {
    pub fn new(directional: DirectionalLight, point: PointLight, orbit: Orbit) -> Self {
        Self {
            drawables: Vec::new(),
            directional,
            ortho_bounds: OrthoBounds::default(),
            point,
            orbit,
            show_axes: false,
        }
    }

    /// The fixed demo arrangement: a checkered floor with a sphere, two
    /// cubes, a cone and a cylinder resting on it.
    pub fn demo() -> Self {
        let directional = DirectionalLight::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::splat(0.55));
        let orbit = Orbit::new(3.0, 3.0, 45.0);
        let point = PointLight::new(orbit.position_at(0.0), Vec3::new(0.9, 0.65, 0.35));
        let mut scene = Self::new(directional, point, orbit);

        let checker = TextureImage::checkerboard(
            512,
            16,
            [210, 210, 210, 255],
            [60, 60, 60, 255],
        );
        let floor_model = Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0))
            * Mat4::from_rotation_x((-90.0_f32).to_radians())
            * Mat4::from_scale(Vec3::new(20.0, 20.0, 1.0));
        scene.push(Drawable::new(
            "floor",
            mesh::plane(),
            floor_model,
            Material::phong().with_texture(checker),
        ));

        scene.push(Drawable::new(
            "sphere",
            mesh::sphere(1.0, 48, 96),
            Mat4::IDENTITY,
            Material::phong(),
        ));

        scene.push(Drawable::new(
            "cube",
            mesh::cube(),
            Mat4::from_translation(Vec3::new(-2.5, -0.5, 1.0)),
            Material::colored(Vec3::new(0.8, 0.3, 0.3)),
        ));

        scene.push(Drawable::new(
            "tall cube",
            mesh::cube(),
            Mat4::from_translation(Vec3::new(2.0, -0.25, -1.5))
                * Mat4::from_scale(Vec3::splat(1.5)),
            Material::colored(Vec3::new(0.3, 0.5, 0.8)),
        ));

        scene.push(Drawable::new(
            "cone",
            mesh::cone(0.6, 1.2, 32),
            Mat4::from_translation(Vec3::new(2.5, -0.4, 1.8)),
            Material::colored(Vec3::new(0.4, 0.7, 0.4)),
        ));

        scene.push(Drawable::new(
            "cylinder",
            mesh::cylinder(0.5, 1.0, 32),
            Mat4::from_translation(Vec3::new(-1.8, -0.5, -2.0)),
            Material::colored(Vec3::new(0.75, 0.7, 0.3)),
        ));

        scene
    }

    pub fn push(&mut self, drawable: Drawable) {
        self.drawables.push(drawable);
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    /// Advances the orbit. The point-light position is a pure function of
    /// elapsed seconds, never of the previous frame.
    pub fn update(&mut self, elapsed: f32) {
        self.point.position = self.orbit.position_at(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scene_contains_every_primitive() {
        let scene = Scene::demo();
        let names: Vec<&str> = scene.drawables().iter().map(|d| d.name.as_str()).collect();
        for expected in ["floor", "sphere", "cube", "cone", "cylinder"] {
            assert!(names.contains(&expected), "missing {expected}");
        }
        assert!(scene.drawables().len() >= 6);
        assert!(!scene.show_axes);
    }

    #[test]
    fn floor_carries_the_checker_texture() {
        let scene = Scene::demo();
        let floor = scene
            .drawables()
            .iter()
            .find(|d| d.name == "floor")
            .unwrap();
        assert!(floor.material.texture.is_some());
    }

    #[test]
    fn update_is_deterministic_in_elapsed_time() {
        let mut scene = Scene::demo();
        scene.update(2.0);
        let first = scene.point.position;
        scene.update(5.0);
        scene.update(2.0);
        assert_eq!(scene.point.position, first);
    }

    #[test]
    fn update_keeps_the_light_on_the_orbit() {
        let mut scene = Scene::demo();
        for t in [0.0_f32, 0.5, 1.0, 10.0] {
            scene.update(t);
            let p = scene.point.position;
            let planar = (p.x * p.x + p.z * p.z).sqrt();
            assert!((planar - scene.orbit.radius).abs() < 1e-3);
            assert_eq!(p.y, scene.orbit.height);
        }
    }

    #[test]
    fn drawable_list_grows_append_only() {
        let mut scene = Scene::demo();
        let before = scene.drawables().len();
        scene.push(Drawable::new(
            "extra",
            mesh::cube(),
            Mat4::IDENTITY,
            Material::phong(),
        ));
        assert_eq!(scene.drawables().len(), before + 1);
        assert_eq!(scene.drawables().last().unwrap().name, "extra");
    }

    #[test]
    fn empty_scene_is_valid() {
        let scene = Scene::new(
            DirectionalLight::new(Vec3::NEG_ONE, Vec3::ONE),
            PointLight::new(Vec3::ZERO, Vec3::ONE),
            Orbit::new(0.0, 3.0, 0.0),
        );
        assert!(scene.drawables().is_empty());
    }
}
