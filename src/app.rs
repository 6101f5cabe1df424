use crate::input::{ChannelInput, KeyEvent};
use antr_core::{CapabilityError, DisplaySurface, KeyId, VisualState};
use antr_render::SkiaRenderer;
use antr_sequencer::{SessionError, SessionSummary};
use antr_timing::{HighPrecisionTimer, Timer};
use anyhow::{Context, Result, anyhow, bail};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowId},
};

const WINDOWED_SIZE: PhysicalSize<u32> = PhysicalSize::new(1280, 720);

pub type FrameAck = Result<(), CapabilityError>;

/// The session itself, run on a worker thread against the window's surface
/// and keyboard.
pub type SessionJob =
    Box<dyn FnOnce(WindowSurface, ChannelInput) -> Result<SessionSummary, SessionError> + Send>;

#[derive(Debug, Clone, Copy)]
pub enum UserEvent {
    Present(VisualState),
    SessionEnded,
}

/// Display surface backed by the window on the main thread. `render` blocks
/// until the frame has been handed to the GPU.
pub struct WindowSurface {
    proxy: EventLoopProxy<UserEvent>,
    acks: Receiver<FrameAck>,
    interrupted: Arc<AtomicBool>,
}

impl DisplaySurface for WindowSurface {
    fn render(&mut self, state: &VisualState) -> Result<(), CapabilityError> {
        if self.interrupted.load(Ordering::SeqCst) {
            return Err(CapabilityError::Interrupted);
        }
        self.proxy
            .send_event(UserEvent::Present(*state))
            .map_err(|_| CapabilityError::Disconnected("window"))?;
        self.acks
            .recv()
            .map_err(|_| CapabilityError::Disconnected("window"))?
    }
}

struct PendingSession {
    job: SessionJob,
    input: ChannelInput,
    acks: Receiver<FrameAck>,
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    timer: HighPrecisionTimer,
    fullscreen: bool,
    refresh_rate: Option<f64>,

    proxy: EventLoopProxy<UserEvent>,
    keys: Sender<KeyEvent>,
    acks: Sender<FrameAck>,
    interrupted: Arc<AtomicBool>,
    pending: Option<PendingSession>,
    worker: Option<JoinHandle<Result<SessionSummary, SessionError>>>,
}

impl App {
    fn new(event_loop: &EventLoop<UserEvent>, job: SessionJob, fullscreen: bool) -> Self {
        let (keys, key_rx) = mpsc::channel();
        let (acks, ack_rx) = mpsc::channel();
        let interrupted = Arc::new(AtomicBool::new(false));
        let input = ChannelInput::new(key_rx, interrupted.clone());

        Self {
            window: None,
            pixels: None,
            renderer: None,
            timer: HighPrecisionTimer::new(),
            fullscreen,
            refresh_rate: None,
            proxy: event_loop.create_proxy(),
            keys,
            acks,
            interrupted,
            pending: Some(PendingSession {
                job,
                input,
                acks: ack_rx,
            }),
            worker: None,
        }
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .context("no monitor available")?;
        self.refresh_rate = monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let mut attributes = Window::default_attributes()
            .with_title("ANT-R")
            .with_resizable(false);
        attributes = if self.fullscreen {
            attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
        } else {
            attributes.with_inner_size(WINDOWED_SIZE)
        };

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            refresh_hz = ?self.refresh_rate,
            "display ready"
        );

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface)?);
        self.renderer = Some(SkiaRenderer::new(size.width, size.height)?);

        window.set_cursor_visible(false);
        self.window = Some(window);
        Ok(())
    }

    fn start_session(&mut self) -> Result<()> {
        let Some(PendingSession { job, input, acks }) = self.pending.take() else {
            return Ok(());
        };
        let surface = WindowSurface {
            proxy: self.proxy.clone(),
            acks,
            interrupted: self.interrupted.clone(),
        };
        let proxy = self.proxy.clone();
        let handle = thread::Builder::new()
            .name("session".into())
            .spawn(move || {
                let result = job(surface, input);
                let _ = proxy.send_event(UserEvent::SessionEnded);
                result
            })
            .context("spawning the session thread")?;
        self.worker = Some(handle);
        Ok(())
    }

    fn present(&mut self, state: &VisualState) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            bail!("no surface to present on");
        };
        let stats = renderer.render_frame(state, pixels.frame_mut(), &mut self.timer)?;
        let t = self.timer.now();
        pixels.render()?;
        let present = self.timer.elapsed(t);
        trace!(
            ?state,
            compose_ms = stats.compose.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            present_ms = present.as_secs_f64() * 1e3,
            dirty = stats.dirty_count,
            "frame presented"
        );
        Ok(())
    }

    fn handle_key(&mut self, key: &Key, at: Instant) {
        let event = match key {
            Key::Named(NamedKey::Escape) => {
                self.interrupted.store(true, Ordering::SeqCst);
                KeyEvent::Escape
            }
            other => match key_id(other) {
                Some(id) => KeyEvent::Pressed(id, at),
                None => return,
            },
        };
        // The receiver is gone once the session has finished.
        let _ = self.keys.send(event);
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                warn!("failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(size.width, size.height) {
                warn!("failed to resize buffer: {e}");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(size.width, size.height) {
                warn!("failed to resize canvas: {e:#}");
            }
        }
        info!(width = size.width, height = size.height, "display resized");
    }

    fn abort(&mut self, event_loop: &ActiveEventLoop) {
        self.interrupted.store(true, Ordering::SeqCst);
        let _ = self.keys.send(KeyEvent::Escape);
        event_loop.exit();
    }
}

/// Single printable characters and space; everything else is not a response.
fn key_id(key: &Key) -> Option<KeyId> {
    match key {
        Key::Named(NamedKey::Space) => Some(KeyId::SPACE),
        Key::Character(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyId::new(c)),
                _ => None,
            }
        }
        _ => None,
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self
            .create_window_and_surface(event_loop)
            .and_then(|()| self.start_session())
        {
            error!("failed to start: {e:#}");
            event_loop.exit();
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Present(state) => {
                let ack = self
                    .present(&state)
                    .map_err(|e| CapabilityError::Display(format!("{e:#}")));
                let _ = self.acks.send(ack);
            }
            UserEvent::SessionEnded => event_loop.exit(),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                let at = Instant::now();
                self.handle_key(&event.logical_key, at);
            }
            WindowEvent::CloseRequested => self.abort(event_loop),
            WindowEvent::RedrawRequested => {
                if let Some(pixels) = &self.pixels {
                    if let Err(e) = pixels.render() {
                        warn!("redraw failed: {e}");
                    }
                }
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
    }
}

/// Opens the window, runs `job` on a worker thread, and returns its result
/// once the session ends or the window is closed.
pub fn run_windowed(job: SessionJob, fullscreen: bool) -> Result<SessionSummary> {
    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    let mut app = App::new(&event_loop, job, fullscreen);
    event_loop.run_app(&mut app)?;

    let worker = app.worker.take();
    // Dropping the app closes the channels so a blocked session unwinds.
    drop(app);
    match worker {
        Some(handle) => {
            let result = handle
                .join()
                .map_err(|_| anyhow!("session thread panicked"))?;
            Ok(result?)
        }
        None => bail!("the window closed before the session started"),
    }
}
