use crate::layout::Layout;
use crate::render::{FrameStats, SkiaRenderer};
use antr_core::{CapabilityError, DisplaySurface, VisualState};
use antr_timing::Timer;

/// A display surface that composes into an in-memory RGBA frame buffer.
///
/// Used for dry runs and tests; a frame counts as committed once
/// `render_frame` has copied it into the buffer.
pub struct OffscreenSurface<T: Timer<Timestamp = u64>> {
    renderer: SkiaRenderer,
    frame: Vec<u8>,
    timer: T,
    frames: usize,
    last_stats: Option<FrameStats>,
}

impl<T: Timer<Timestamp = u64>> OffscreenSurface<T> {
    pub fn new(renderer: SkiaRenderer, timer: T) -> Self {
        let frame = vec![0u8; renderer.layout().byte_len()];
        Self {
            renderer,
            frame,
            timer,
            frames: 0,
            last_stats: None,
        }
    }

    pub fn layout(&self) -> Layout {
        self.renderer.layout()
    }

    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// RGBA at `(x, y)` of the last committed frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let layout = self.layout();
        if x >= layout.width || y >= layout.height {
            return None;
        }
        let i = (y as usize * layout.width as usize + x as usize) * 4;
        let px = &self.frame[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames
    }

    pub fn last_stats(&self) -> Option<FrameStats> {
        self.last_stats
    }

    pub fn renderer(&self) -> &SkiaRenderer {
        &self.renderer
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

impl<T: Timer<Timestamp = u64>> DisplaySurface for OffscreenSurface<T> {
    fn render(&mut self, state: &VisualState) -> Result<(), CapabilityError> {
        let stats = self
            .renderer
            .render_frame(state, &mut self.frame, &mut self.timer)
            .map_err(|e| CapabilityError::Display(format!("{e:#}")))?;
        self.frames += 1;
        self.last_stats = Some(stats);
        Ok(())
    }
}
