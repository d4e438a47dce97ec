//! The viewer window
//!
//! Tracks the framebuffer size and close requests from winit events so
//! the event loop can ask simple questions between frames.

use crate::error::DioramaResult;
use crate::DioramaConfig;
use std::sync::Arc;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window as WinitWindow, WindowBuilder},
};

pub struct Window {
    window: Arc<WinitWindow>,
    size: PhysicalSize<u32>,
    pending_resize: Option<PhysicalSize<u32>>,
    close_requested: bool,
}

impl Window {
    /// Open the window at the configured title and pixel size
    pub fn new(event_loop: &EventLoop<()>, config: &DioramaConfig) -> DioramaResult<Self> {
        let window = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .build(event_loop)?;
        let size = window.inner_size();
        log::info!("Window created at {}x{}", size.width, size.height);

        Ok(Self {
            window: Arc::new(window),
            size,
            pending_resize: None,
            close_requested: false,
        })
    }

    /// Shared handle for surface creation
    pub fn window_arc(&self) -> Arc<WinitWindow> {
        Arc::clone(&self.window)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    /// Minimized windows report a zero-sized framebuffer
    pub fn is_renderable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// Latest size since the previous call, if the window was resized
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.pending_resize.take().map(|s| (s.width, s.height))
    }

    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    /// Update window state from `event`; Escape counts as a close request
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.size = *size;
                self.pending_resize = Some(*size);
            }
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.close_requested = true;
            }
            _ => {}
        }
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}
