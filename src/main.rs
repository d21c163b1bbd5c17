use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use glam::Vec2;
use log::{info, warn};
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, WindowBuilder};

use shadowbox::{Camera, InputState, MoveKey, Renderer, Scene};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let mut scene = Scene::demo();
    scene.show_axes = options.axes;
    if options.describe {
        describe_scene(&scene);
        return Ok(());
    }
    match run_interactive(scene) {
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --describe output (set DISPLAY or install X11 libs to enable rendering)."
            );
            let mut scene = Scene::demo();
            scene.show_axes = options.axes;
            describe_scene(&scene);
            Ok(())
        }
        other => other,
    }
}

fn run_interactive(scene: Scene) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;

    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Shadowbox")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    // Free-look wants the cursor captured; not every backend supports both
    // grab modes, so fall through and keep running uncaptured.
    window.set_cursor_visible(false);
    if window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
        .is_err()
    {
        warn!("cursor grab unavailable; mouse look stays active");
    }

    let renderer = block_on(Renderer::new(Arc::clone(&window), &scene))?;
    info!(
        "Rendering {} drawables with shadow maps enabled",
        scene.drawables().len()
    );

    let now = Instant::now();
    let mut app = AppState {
        renderer,
        scene,
        camera: Camera::default(),
        input: InputState::new(),
        started: now,
        last_frame: now,
        last_error: None,
    };

    event_loop.run(|event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        if let Err(err) = app.process_event(&event, elwt) {
            app.last_error = Some(err);
            elwt.exit();
        }
    })?;

    if let Some(err) = app.last_error.take() {
        return Err(err);
    }
    Ok(())
}

struct AppState {
    renderer: Renderer,
    scene: Scene,
    camera: Camera,
    input: InputState,
    started: Instant,
    last_frame: Instant,
    last_error: Option<anyhow::Error>,
}

impl AppState {
    fn process_event(
        &mut self,
        event: &Event<()>,
        elwt: &EventLoopWindowTarget<()>,
    ) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => self.renderer.resize(*size),
                    WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(event, elwt),
                    WindowEvent::MouseWheel { delta, .. } => {
                        let amount = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(position) => position.y as f32 / 40.0,
                        };
                        self.input.push_scroll(amount);
                    }
                    WindowEvent::RedrawRequested => self.redraw()?,
                    _ => {}
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                // Raw deltas, with y flipped so pushing forward looks up.
                self.input
                    .push_look_delta(Vec2::new(delta.0 as f32, -(delta.1 as f32)));
            }
            Event::AboutToWait => self.renderer.window().request_redraw(),
            _ => {}
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, event: &KeyEvent, elwt: &EventLoopWindowTarget<()>) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if code == KeyCode::Escape {
            elwt.exit();
            return;
        }
        let Some(key) = map_keycode(code) else {
            return;
        };
        match event.state {
            ElementState::Pressed => self.input.set_key_down(key),
            ElementState::Released => self.input.set_key_up(key),
        }
    }

    fn redraw(&mut self) -> Result<()> {
        let now = Instant::now();
        let delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        let elapsed = now.duration_since(self.started).as_secs_f32();

        self.camera.process_movement(delta_time, self.input.movement());
        let look = self.input.take_look_delta();
        if look != Vec2::ZERO {
            self.camera.process_look(look.x, look.y, true);
        }
        let scroll = self.input.take_scroll();
        if scroll != 0.0 {
            self.camera.process_zoom(scroll);
        }

        self.scene.update(elapsed);
        self.renderer.update_globals(&self.scene, &self.camera);
        if let Err(err) = self.renderer.render() {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
                wgpu::SurfaceError::Other => {
                    return Err(anyhow!("unrecoverable surface error"));
                }
            }
        }
        Ok(())
    }
}

fn map_keycode(code: KeyCode) -> Option<MoveKey> {
    Some(match code {
        KeyCode::KeyW | KeyCode::ArrowUp => MoveKey::Forward,
        KeyCode::KeyS | KeyCode::ArrowDown => MoveKey::Backward,
        KeyCode::KeyA | KeyCode::ArrowLeft => MoveKey::Left,
        KeyCode::KeyD | KeyCode::ArrowRight => MoveKey::Right,
        _ => return None,
    })
}

fn describe_scene(scene: &Scene) {
    println!("Scene contains {} drawables", scene.drawables().len());
    for drawable in scene.drawables() {
        println!(
            " - {}: {} vertices, {} indices",
            drawable.name,
            drawable.mesh.vertices.len(),
            drawable.mesh.indices.len()
        );
    }
    let direction = scene.directional.direction;
    println!(
        "Directional light direction ({:.2}, {:.2}, {:.2})",
        direction.x, direction.y, direction.z
    );
    println!(
        "Point light orbit radius {:.1}, height {:.1}, speed {:.1} deg/s",
        scene.orbit.radius, scene.orbit.height, scene.orbit.speed_deg
    );
    if scene.show_axes {
        println!("Axis overlay enabled");
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

struct CliOptions {
    describe: bool,
    axes: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut describe = false;
        let mut axes = false;
        for arg in env::args().skip(1) {
            match arg.as_str() {
                "--describe" => describe = true,
                "--axes" => axes = true,
                other => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: shadowbox [--describe] [--axes]"
                    ));
                }
            }
        }
        Ok(Self { describe, axes })
    }
}
