//! Event loop wiring
//!
//! Startup loads every asset before the window's render loop begins, so a
//! missing image or shader aborts with nothing drawn.

use crate::backend::BackendError;
use crate::error::DioramaResult;
use crate::frame::FramePlan;
use crate::renderer::Renderer;
use crate::resources::{load_layer_textures, ShaderSources};
use crate::scene::Projection;
use crate::state::ApplicationState;
use crate::window::Window;
use crate::{DioramaConfig, WgpuBackend};
use std::time::Instant;
use winit::{
    event::{ElementState, Event, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::PhysicalKey,
};

/// Pixels of touchpad scroll that count as one wheel line
const PIXELS_PER_LINE: f64 = 100.0;

/// Load assets, open the window and run until it closes
pub fn run(config: DioramaConfig) -> DioramaResult<()> {
    let textures = load_layer_textures(&config.image_dir)?;
    let shaders = ShaderSources::load(&config.shader_dir)?;

    let event_loop = EventLoop::new()?;
    let mut window = Window::new(&event_loop, &config)?;

    let backend = WgpuBackend::new(window.window_arc(), config.vsync)?;
    let mut renderer = Renderer::new(backend, &shaders, &textures)?;
    drop(textures);

    // Aspect stays at the configured window shape; only the viewport follows resizes
    let projection = Projection::perspective(
        config.fov_y_degrees,
        config.aspect_ratio(),
        config.near,
        config.far,
    );

    let mut state = ApplicationState::new(&config);
    let (width, height) = window.dimensions();
    state.on_resize(width, height);

    let start = Instant::now();
    let mut last_frame = start;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => {
                window.handle_event(&event);

                match event {
                    WindowEvent::KeyboardInput { event, .. } => {
                        if let PhysicalKey::Code(key) = event.physical_key {
                            state.on_key(key, event.state == ElementState::Pressed);
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let lines = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
                        };
                        state.on_scroll(lines);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        state.on_cursor_moved(position.x, position.y);
                    }
                    WindowEvent::MouseInput { state: button_state, button, .. } => {
                        state.on_mouse_button(button, button_state == ElementState::Pressed);
                    }
                    WindowEvent::Focused(false) => {
                        state.focus_lost();
                    }
                    WindowEvent::RedrawRequested if window.is_renderable() => {
                        let elapsed = start.elapsed().as_secs_f32();
                        let plan = FramePlan::build(&state, &projection, elapsed);
                        match renderer.render(&plan) {
                            Ok(()) => {}
                            Err(BackendError::SurfaceLost) => {
                                let (w, h) = window.dimensions();
                                if let Err(e) = renderer.resize(w, h) {
                                    log::error!("Failed to recover lost surface: {}", e);
                                    window.request_close();
                                }
                            }
                            Err(e) if e.is_transient() => {
                                log::warn!("Skipped frame: {}", e);
                            }
                            Err(e) => {
                                log::error!("Rendering failed: {}", e);
                                window.request_close();
                            }
                        }
                    }
                    _ => {}
                }

                if window.should_close() {
                    elwt.exit();
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                let dt = (now - last_frame).as_secs_f32();
                last_frame = now;

                if let Some((w, h)) = window.take_resize() {
                    log::debug!("Window resized to {}x{}", w, h);
                    if let Err(e) = renderer.resize(w, h) {
                        log::error!("Failed to resize render targets: {}", e);
                        elwt.exit();
                        return;
                    }
                    state.on_resize(w, h);
                }

                state.update(dt);
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
