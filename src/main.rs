use std::sync::Arc;

use tracing::{error, info, warn};
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::{CursorGrabMode, Window},
};

use camsnap::{
    config::Settings,
    controller::{GroundMover, InputEvent, InputProcessor, InputState, PlayerController},
    logging,
    model::{CameraRig, GalleryStore, PlayerBody, Scene},
    ui::{self, PhotoTextures},
    view::{render::EguiFrame, CursorState, GpuContext, HudSurfaces, RenderState, SurfaceCapture},
};

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    render: RenderState,

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    photo_textures: PhotoTextures,

    controller: PlayerController,
    input: InputState,
    input_processor: InputProcessor,
    applied_cursor: Option<CursorState>,

    last_frame_time: std::time::Instant,
}

impl App {
    async fn new(window: Arc<Window>, settings: Settings) -> Result<Self, Box<dyn std::error::Error>> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let gpu = GpuContext::new(&instance, surface, size.width, size.height).await?;

        let scene = Scene::new();
        let body = PlayerBody::new(glam::Vec3::ZERO);
        let render = RenderState::new(&gpu, &scene, body.half_extents);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let rig = CameraRig::new(
            gpu.config.width,
            gpu.config.height,
            settings.controller.original_fov,
            settings.controller.eye_height,
        );
        let controller = PlayerController::new(
            settings.controller.clone(),
            settings.keys.clone(),
            rig,
            body,
            Box::new(GroundMover::new(scene.colliders(), scene.half_extent)),
            HudSurfaces::full(),
            Some(GalleryStore::shared()),
        );

        Ok(Self {
            window,
            gpu,
            render,
            egui_ctx,
            egui_state,
            photo_textures: PhotoTextures::new(),
            controller,
            input: InputState::new(),
            input_processor: InputProcessor::new(settings.keys),
            applied_cursor: None,
            last_frame_time: std::time::Instant::now(),
        })
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // egui only sees the pointer while the cursor is free
        if !self.controller.cursor().is_locked() {
            let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;
            if egui_captured {
                return true;
            }
        }

        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, logical_key, repeat, .. }, .. } => {
                let Some(name) = key_name(logical_key) else {
                    return false;
                };
                match state {
                    ElementState::Pressed if !repeat => {
                        self.input.process_event(&InputEvent::KeyDown(name));
                        if self.input_processor.is_escape(&self.input) {
                            self.controller.release_cursor();
                        }
                    }
                    ElementState::Pressed => {}
                    ElementState::Released => self.input.process_event(&InputEvent::KeyUp(name)),
                }
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => camsnap::controller::MouseButton::Left,
                    MouseButton::Right => camsnap::controller::MouseButton::Right,
                    _ => camsnap::controller::MouseButton::Middle,
                };
                let is_down = *state == ElementState::Pressed;
                self.input.process_event(&InputEvent::MouseClick { button, is_down });
                true
            }
            WindowEvent::Focused(false) => {
                self.input.process_event(&InputEvent::FocusLost);
                true
            }
            _ => false,
        }
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.input.process_event(&InputEvent::MouseMove { dx: dx as f32, dy: dy as f32 });
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gpu.resize(new_size.width, new_size.height);
            self.render.resize(&self.gpu.device, new_size.width, new_size.height);
            self.controller.rig.set_aspect(new_size.width, new_size.height);
        }
    }

    /// Push the controller's cursor state to the OS when it changes.
    fn apply_cursor(&mut self) {
        let cursor = self.controller.cursor();
        if self.applied_cursor == Some(cursor) {
            return;
        }
        self.applied_cursor = Some(cursor);

        let locked = if cursor.is_locked() {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
                .map_err(|e| warn!("cursor grab failed: {e}"))
                .is_ok()
        } else {
            let _ = self.window.set_cursor_grab(CursorGrabMode::None);
            false
        };
        self.window.set_cursor_visible(cursor.visible);
        self.input.process_event(&InputEvent::PointerLockChanged { locked });
    }

    fn update(&mut self, dt: f32) {
        self.controller.update(&mut self.input, dt);
        self.apply_cursor();
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let (output, actions) = ui::build_ui(&self.egui_ctx, raw_input, &self.controller, &mut self.photo_textures);
        self.egui_state.handle_platform_output(&self.window, output.platform_output);

        let pixels_per_point = output.pixels_per_point;
        let frame = EguiFrame {
            primitives: self.egui_ctx.tessellate(output.shapes, pixels_per_point),
            textures_delta: output.textures_delta,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
                pixels_per_point,
            },
        };

        let wants_capture = self.controller.wants_frame_capture();
        let captured = self.render.draw_frame(&self.gpu, &self.controller, frame, wants_capture)?;
        if wants_capture {
            self.controller.end_of_frame(&mut SurfaceCapture::new(captured));
        }

        if actions.next_photo {
            self.controller.next_photo();
        }
        if actions.previous_photo {
            self.controller.previous_photo();
        }
        self.apply_cursor();

        Ok(())
    }
}

/// winit logical key to the key names used by the bindings.
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(s) => Some(s.to_string()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        Key::Named(NamedKey::Escape) => Some("Escape".to_string()),
        Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft".to_string()),
        Key::Named(NamedKey::ArrowRight) => Some("ArrowRight".to_string()),
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp".to_string()),
        Key::Named(NamedKey::ArrowDown) => Some("ArrowDown".to_string()),
        Key::Named(NamedKey::Enter) => Some("Enter".to_string()),
        Key::Named(NamedKey::Tab) => Some("Tab".to_string()),
        Key::Named(NamedKey::Shift) => Some("Shift".to_string()),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    run().map_err(|e| {
        error!("camsnap stopped: {e}");
        e
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default(&Settings::path_from_env());

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title(settings.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(settings.window.width, settings.window.height));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window.clone(), settings))?;
    info!("camsnap started");

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == app.window.id() => {
            if !app.input(event) {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(physical_size) => app.resize(*physical_size),
                    WindowEvent::RedrawRequested => {
                        let now = std::time::Instant::now();
                        let dt = (now - app.last_frame_time).as_secs_f32();
                        app.last_frame_time = now;

                        app.update(dt);

                        match app.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => app.gpu.reconfigure(),
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                error!("GPU out of memory");
                                elwt.exit();
                            }
                            Err(e) => warn!("surface error: {e:?}"),
                        }
                    }
                    _ => {}
                }
            }
        }
        Event::DeviceEvent { event: DeviceEvent::MouseMotion { delta }, .. } => {
            app.handle_mouse_motion(delta.0, delta.1);
        }
        Event::AboutToWait => {
            app.window.request_redraw();
        }
        _ => {}
    })?;

    Ok(())
}
