//=========================================================================
// Platform Subsystem
//
// Bridges Winit (OS-level events) and the pixels framebuffer with the
// engine's simulation core.
//
// Architecture:
// ```text
//  Winit Event Loop
//   ├─ resumed            → create window + framebuffer
//   ├─ CloseRequested     → quit (the host's single external signal)
//   └─ RedrawRequested    → one displayed frame:
//        ├─ accumulate real elapsed time (clamped)
//        ├─ advance_time(TIME_STEP) per whole step   (simulation clock)
//        ├─ render scene → framebuffer → present     (animation clock)
//        └─ pace to the target frame rate, request next redraw
// ```
//
// Key Design Decisions:
// - **Single thread**: the simulation is single-threaded and cooperative,
//   so the tick loop runs inside the event handler rather than on a
//   separate logic thread.
// - **Fixed timestep with accumulator**: real frame deltas are clamped
//   (long stalls never fast-forward the show) and consumed in TIME_STEP
//   quanta; leftover fractions carry to the next frame.
// - **Tick cap**: a frame may run at most a few simulation steps; any
//   remaining backlog is dropped with a warning instead of spiraling.
// - **Errors leave the loop**: the first fatal error is stored, the loop
//   exits, and `run` surfaces it to the caller.
//
//=========================================================================

//=== Submodules ==========================================================

mod framebuffer;

//=== External Dependencies ===============================================

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

//=== Internal Dependencies ===============================================

use crate::engine::{EngineError, Gamebook};
use framebuffer::{DialogFont, Framebuffer};

//=== Constants ===========================================================

// A stall (debugger, window drag) must not fast-forward the show.
const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

// Simulation steps allowed per displayed frame before backlog is dropped.
const MAX_TICKS_PER_FRAME: u32 = 5;

// Dialog font location inside the asset tree.
const FONT_RELATIVE_PATH: &str = "fonts/dialog.ttf";

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
///
/// These are typically fatal — if the window, framebuffer, or dialog font
/// cannot be created, the show cannot run.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    WindowCreation(#[source] winit::error::OsError),

    #[error("framebuffer creation failed: {0}")]
    FramebufferCreation(#[source] pixels::Error),

    #[error("framebuffer resize failed: {0}")]
    FramebufferResize(#[source] pixels::TextureError),

    #[error("frame present failed: {0}")]
    Present(#[source] pixels::Error),

    #[error("failed to load dialog font from {path}: {reason}")]
    FontLoad { path: PathBuf, reason: String },
}

//=== Entry Point =========================================================

/// Runs the host's event loop until quit is requested or a fatal error
/// occurs. Called by `Gamebook::run`.
pub(crate) fn run(gamebook: Gamebook) -> Result<(), EngineError> {
    let font_path = gamebook.assets_root().join(FONT_RELATIVE_PATH);
    let font = DialogFont::load(&font_path)?;

    let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;

    let mut shell = Shell::new(gamebook, font);
    event_loop
        .run_app(&mut shell)
        .map_err(PlatformError::EventLoopExecution)?;

    match shell.failure.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

//=== Shell ===============================================================

/// Owns the window, the framebuffer, and the frame/tick pacing state for
/// the duration of the event loop.
struct Shell {
    gamebook: Gamebook,
    font: DialogFont,

    /// OS window handle (None until `resumed` is called).
    window: Option<Arc<Window>>,

    /// GPU-presented CPU framebuffer (created with the window).
    pixels: Option<Pixels>,

    /// Fixed-timestep accumulator state.
    last_frame: Option<Instant>,
    accumulator: f64,

    /// Frame pacing state for the display clock.
    last_present: Instant,

    /// First fatal error, surfaced by `run` after the loop exits.
    failure: Option<EngineError>,
}

impl Shell {
    fn new(gamebook: Gamebook, font: DialogFont) -> Self {
        Self {
            gamebook,
            font,
            window: None,
            pixels: None,
            last_frame: None,
            accumulator: 0.0,
            last_present: Instant::now(),
            failure: None,
        }
    }

    /// Records the first fatal error and stops the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: EngineError) {
        error!("fatal: {}", error);
        if self.failure.is_none() {
            self.failure = Some(error);
        }
        event_loop.exit();
    }

    //--- Per-Frame Work ---------------------------------------------------

    /// Consumes elapsed real time in fixed simulation steps.
    fn advance_simulation(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let frame_delta = match self.last_frame {
            Some(previous) => now.duration_since(previous).min(MAX_FRAME_DELTA),
            None => Duration::ZERO,
        };
        self.last_frame = Some(now);
        self.accumulator += frame_delta.as_secs_f64();

        let time_step = self.gamebook.config().time_step;
        let mut ticks = 0;
        while self.accumulator >= time_step && ticks < MAX_TICKS_PER_FRAME {
            if let Err(asset_error) = self.gamebook.advance_time(time_step) {
                self.fail(event_loop, asset_error.into());
                return;
            }
            self.accumulator -= time_step;
            ticks += 1;
        }

        if self.accumulator >= time_step {
            warn!(
                "dropping {:.3}s of simulation backlog after {} ticks",
                self.accumulator, MAX_TICKS_PER_FRAME
            );
            self.accumulator = 0.0;
        }
    }

    /// Renders the scene into the framebuffer and presents it.
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };

        let config = self.gamebook.config();
        let (width, height) = (config.width, config.height);

        let mut surface = Framebuffer::new(pixels.frame_mut(), width, height, &self.font);
        self.gamebook.render(&mut surface);

        if let Err(present_error) = pixels.render() {
            let error = PlatformError::Present(present_error);
            self.fail(event_loop, error.into());
        }
    }

    /// Sleeps out the remainder of the display frame budget.
    fn pace_frame(&mut self) {
        let target = Duration::from_secs_f64(1.0 / self.gamebook.config().frame_rate as f64);
        let since_present = self.last_present.elapsed();
        if since_present < target {
            thread::sleep(target - since_present);
        }
        self.last_present = Instant::now();
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Shell {
    /// Called when the app becomes active; creates the window and the
    /// framebuffer lazily.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = self.gamebook.config().clone();
        let attrs = WindowAttributes::default()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(os_error) => {
                let error = PlatformError::WindowCreation(os_error);
                self.fail(event_loop, error.into());
                return;
            }
        };

        let inner = window.inner_size();
        let texture = SurfaceTexture::new(inner.width, inner.height, window.as_ref());
        let pixels = match Pixels::new(config.width, config.height, texture) {
            Ok(pixels) => pixels,
            Err(pixels_error) => {
                let error = PlatformError::FramebufferCreation(pixels_error);
                self.fail(event_loop, error.into());
                return;
            }
        };

        info!(
            "window created: {}x{} @ {}x DPI",
            inner.width,
            inner.height,
            window.scale_factor()
        );

        window.request_redraw();
        self.window = Some(window);
        self.pixels = Some(pixels);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("quit requested, closing");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.pixels.as_mut() {
                    if let Err(resize_error) = pixels.resize_surface(size.width, size.height) {
                        let error = PlatformError::FramebufferResize(resize_error);
                        self.fail(event_loop, error.into());
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                self.advance_simulation(event_loop);
                if self.failure.is_some() {
                    return;
                }

                self.render_frame(event_loop);
                self.pace_frame();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {
                // Input beyond quit is out of scope for a scripted show.
            }
        }
    }
}
