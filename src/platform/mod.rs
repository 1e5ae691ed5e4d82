//=========================================================================
// Platform Subsystem
//=========================================================================
//
// Bridges winit (OS-level events) with the core thread via a bounded
// crossbeam channel.
//
// Architecture:
// ```text
//  Main Thread:                     Logic Thread:
//  ┌──────────────────────────┐    ┌──────────────────┐
//  │  winit Event Loop        │    │  EventCollector  │
//  │   ↓                      │    │   ↓              │
//  │  InputProcessor          │    │  GlobalSystems   │
//  │   ↓                      │    │   ├─ input       │
//  │  InputBuffer             │    │   └─ scenes      │
//  │   ↓ RedrawRequested      │    └──────────────────┘
//  │  Sender ─────────────────┼──────────────┘   │
//  │                          │                  │ drops `alive`
//  │  about_to_wait ←─────────┼──────────────────┘ on exit
//  └──────────────────────────┘
// ```
//
// RedrawRequested is the frame boundary: buffered input is flushed as
// one batch. Resizes are forwarded immediately in logical pixels.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_buffer;
mod input_processor;

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Dependencies ===============================================

use crate::config::WindowConfig;
use crate::core::platform_bridge::{PlatformError, PlatformEvent};
use input_buffer::InputBuffer;
use input_processor::InputProcessor;

//=== Platform ============================================================

/// Window owner and input aggregator. Must stay on the main thread.
pub(crate) struct Platform {
    window: Option<Window>,
    config: WindowConfig,
    buffer: InputBuffer,
    event_sender: Sender<PlatformEvent>,
    core_alive: Receiver<()>,
    input_processor: InputProcessor,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// The window itself is created lazily in `resumed()`.
    pub(crate) fn new(
        event_sender: Sender<PlatformEvent>,
        core_alive: Receiver<()>,
        config: WindowConfig,
    ) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            config,
            buffer: InputBuffer::new(),
            event_sender,
            core_alive,
            input_processor: InputProcessor::new(),
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the winit event loop until the window closes or the core
    /// thread ends.
    ///
    /// # Errors
    ///
    /// [`PlatformError`] if the event loop cannot be created or fails.
    pub(crate) fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting winit event loop");

        let event_loop =
            EventLoop::new().map_err(|e| PlatformError::EventLoopCreation(e.to_string()))?;

        event_loop
            .run_app(&mut self)
            .map_err(|e| PlatformError::EventLoopExecution(e.to_string()))
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends buffered input to the core thread. Empty frames send nothing.
    fn flush_input_buffer(&mut self) {
        if let Some((discrete, continuous)) = self.buffer.drain() {
            let total = discrete.len() + continuous.len();
            trace!(target: "platform::input", "Flushing {} events", total);

            if self.event_sender.send(PlatformEvent::Inputs { discrete, continuous }).is_err() {
                warn!(
                    target: "platform::input",
                    "Channel disconnected, dropping {} events",
                    total
                );
            }
        }
    }

    fn send_resize(&self, size: PhysicalSize<u32>, scale_factor: f64) {
        let logical: LogicalSize<u32> = size.to_logical(scale_factor);
        debug!(target: "platform", "Viewport {}x{}", logical.width, logical.height);

        let _ = self.event_sender.send(PlatformEvent::Resized {
            width: logical.width,
            height: logical.height,
        });
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map_or(1.0, Window::scale_factor)
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        let _ = self.event_sender.send(PlatformEvent::WindowClosed);
        event_loop.exit();
    }
}

//=== winit Integration ===================================================

impl ApplicationHandler for Platform {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                self.send_resize(window.inner_size(), window.scale_factor());
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.close(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.close(event_loop);
            }

            WindowEvent::Resized(size) => {
                self.send_resize(size, self.scale_factor());
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.input_processor.update_modifiers(modifiers.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self.input_processor.process_pointer_move(
                    position.x,
                    position.y,
                    self.scale_factor(),
                );
                self.buffer.push_continuous(event);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let Some(event) = self.input_processor.process_key_event(&key_event) {
                    self.buffer.push_discrete(event);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.input_processor.process_mouse_button(button, state);
                self.buffer.push_discrete(event);
            }

            WindowEvent::RedrawRequested => {
                self.flush_input_buffer();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(TryRecvError::Disconnected) = self.core_alive.try_recv() {
            info!(target: "platform", "Core thread finished, closing window");
            event_loop.exit();
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
