//! A small real-time shadow-mapping demo.
//!
//! The crate builds a fixed scene of lit primitives and renders it with a
//! two-pass shadow protocol: depth from the directional light into a 2D map,
//! depth from the orbiting point light into a cube map, then a Phong main
//! pass that samples both to attenuate each light's contribution.  The
//! window and GPU plumbing live behind the `render` module so that the scene,
//! camera and light math stay testable without a device.

pub mod camera;
pub mod gizmo;
pub mod input;
pub mod lights;
pub mod material;
pub mod mesh;
pub mod render;
pub mod scene;

pub use camera::{Camera, MovementInput};
pub use gizmo::GizmoVertex;
pub use input::{InputState, MoveKey};
pub use lights::{DirectionalLight, Orbit, OrthoBounds, PointLight, CUBE_FACES};
pub use material::{Material, TextureImage};
pub use mesh::{Mesh, Vertex};
pub use render::{Renderer, ShadowSettings, ShadowTargetError};
pub use scene::{Drawable, Scene};
