use crate::layout::*;
use antr_core::{
    ArrowDirection, FixationColor, Stimulus, TargetPosition, TargetStimulus, VisualState,
};
use antr_timing::{CalibrationStats, HighPrecisionTimer, Timer};
use anyhow::{Context, Result, ensure};
use std::time::Duration;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, PremultipliedColorU8, Rect, Transform};
use tracing::debug;

/// Key into the preloaded sprite catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheSlot {
    Cross(FixationColor),
    Frame { cued: bool },
    Target(TargetStimulus),
}

impl CacheSlot {
    const FRAME_BASE: usize = FixationColor::COUNT;
    const TARGET_BASE: usize = Self::FRAME_BASE + 2;
    const COUNT: usize = Self::TARGET_BASE + TargetStimulus::COUNT;

    fn index(self) -> usize {
        match self {
            CacheSlot::Cross(color) => color.cache_id(),
            CacheSlot::Frame { cued } => Self::FRAME_BASE + cued as usize,
            CacheSlot::Target(stimulus) => Self::TARGET_BASE + stimulus.cache_id(),
        }
    }

    fn all() -> impl Iterator<Item = CacheSlot> {
        [
            FixationColor::Neutral,
            FixationColor::Positive,
            FixationColor::Negative,
        ]
        .into_iter()
        .map(CacheSlot::Cross)
        .chain([false, true].into_iter().map(|cued| CacheSlot::Frame { cued }))
        .chain(TargetStimulus::ALL.into_iter().map(CacheSlot::Target))
    }
}

struct Sprite {
    pixmap: Pixmap,
    opaque: bool,
}

/// Pixel rectangle on the canvas, end-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl Region {
    fn clip(x: i32, y: i32, w: u32, h: u32, layout: &Layout) -> Option<Region> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w as i32).min(layout.width as i32);
        let y1 = (y + h as i32).min(layout.height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Region {
            x0: x0 as usize,
            y0: y0 as usize,
            x1: x1 as usize,
            y1: y1 as usize,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub clear: Duration,
    pub compose: Duration,
    pub copy: Duration,
    pub total: Duration,
    pub dirty_count: usize,
}

/// Composes VisualStates from a preloaded sprite catalog.
///
/// Only regions touched by the previous or the current frame are cleared and
/// copied to the frame buffer, so the buffer must persist between calls.
pub struct SkiaRenderer {
    layout: Layout,
    catalog: Vec<Sprite>,
    canvas: Pixmap,
    dirty_regions: Vec<Region>,
    first_frame: bool,
    compose_timer: HighPrecisionTimer,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let layout = Layout::new(width, height);
        let canvas = blank_canvas(&layout)?;
        let catalog = CacheSlot::all()
            .map(|slot| {
                let pixmap = draw_sprite(slot)?;
                let opaque = pixmap.pixels().iter().all(|p| p.alpha() == 255);
                Ok(Sprite { pixmap, opaque })
            })
            .collect::<Result<Vec<_>>>()?;
        debug_assert_eq!(catalog.len(), CacheSlot::COUNT);
        debug!(width, height, sprites = catalog.len(), "stimulus catalog loaded");

        Ok(Self {
            layout,
            catalog,
            canvas,
            dirty_regions: Vec::with_capacity(8),
            first_frame: true,
            compose_timer: HighPrecisionTimer::new(),
        })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.layout = Layout::new(width, height);
        self.canvas = blank_canvas(&self.layout)?;
        self.dirty_regions.clear();
        self.first_frame = true;
        Ok(())
    }

    /// Draws `state` into `frame_buffer` (RGBA8, `width * height * 4`).
    pub fn render_frame<T: Timer<Timestamp = u64>>(
        &mut self,
        state: &VisualState,
        frame_buffer: &mut [u8],
        timer: &mut T,
    ) -> Result<FrameStats> {
        ensure!(
            frame_buffer.len() == self.layout.byte_len(),
            "frame buffer holds {} bytes, a {}x{} canvas needs {}",
            frame_buffer.len(),
            self.layout.width,
            self.layout.height,
            self.layout.byte_len()
        );
        let start = timer.now();

        if self.first_frame {
            self.first_frame = false;
            self.canvas.fill(background());
            frame_buffer.copy_from_slice(self.canvas.data());
            self.dirty_regions.clear();
        }

        let old_dirty = std::mem::take(&mut self.dirty_regions);

        let t = timer.now();
        for region in &old_dirty {
            self.clear_region(*region)?;
        }
        let clear = timer.elapsed(t);

        let t = timer.now();
        self.compose(state);
        let compose = timer.elapsed(t);
        self.compose_timer.record_frame(compose);

        let t = timer.now();
        for region in old_dirty.iter().chain(&self.dirty_regions) {
            self.copy_region(*region, frame_buffer);
        }
        let copy = timer.elapsed(t);

        let total = timer.elapsed(start);
        timer.record_frame(total);

        Ok(FrameStats {
            clear,
            compose,
            copy,
            total,
            dirty_count: self.dirty_regions.len(),
        })
    }

    /// Timing of the composition step alone, across all frames so far.
    pub fn compose_stats(&self) -> CalibrationStats {
        self.compose_timer.calibration_stats()
    }

    /// Cross, both frames and the optional target row. Layers are blended
    /// over each other without clearing in between.
    fn compose(&mut self, state: &VisualState) {
        let center = self.layout.center();
        let top = self.layout.frame_center(TargetPosition::Up);
        let bottom = self.layout.frame_center(TargetPosition::Down);

        self.blit(CacheSlot::Cross(state.cross_color()), center);
        self.blit(CacheSlot::Frame { cued: state.top_cued() }, top);
        self.blit(CacheSlot::Frame { cued: state.bottom_cued() }, bottom);
        if let Some((stimulus, position)) = state.target() {
            self.blit(CacheSlot::Target(stimulus), self.layout.frame_center(position));
        }
    }

    fn blit(&mut self, slot: CacheSlot, pos: (f32, f32)) {
        let sprite = &self.catalog[slot.index()];
        let (w, h) = (sprite.pixmap.width(), sprite.pixmap.height());
        let (x, y) = Layout::top_left(pos, w, h);
        let Some(region) = Region::clip(x, y, w, h, &self.layout) else {
            return;
        };

        let src_x = (region.x0 as i32 - x) as usize;
        let src_y = (region.y0 as i32 - y) as usize;
        let copy_w = region.x1 - region.x0;
        let src_stride = w as usize;
        let dst_stride = self.layout.width as usize;
        let src = sprite.pixmap.pixels();
        let dst = self.canvas.pixels_mut();

        for row in 0..(region.y1 - region.y0) {
            let s = (src_y + row) * src_stride + src_x;
            let d = (region.y0 + row) * dst_stride + region.x0;
            let (src_row, dst_row) = (&src[s..s + copy_w], &mut dst[d..d + copy_w]);
            if sprite.opaque {
                dst_row.copy_from_slice(src_row);
            } else {
                for (out, px) in dst_row.iter_mut().zip(src_row) {
                    *out = blend_over(*px, *out);
                }
            }
        }

        self.dirty_regions.push(region);
    }

    fn clear_region(&mut self, region: Region) -> Result<()> {
        let bg = PremultipliedColorU8::from_rgba(
            BACKGROUND[0],
            BACKGROUND[1],
            BACKGROUND[2],
            BACKGROUND[3],
        )
        .context("background colour is not premultiplied")?;
        let stride = self.layout.width as usize;
        let pixels = self.canvas.pixels_mut();
        for y in region.y0..region.y1 {
            pixels[y * stride + region.x0..y * stride + region.x1].fill(bg);
        }
        Ok(())
    }

    fn copy_region(&self, region: Region, frame_buffer: &mut [u8]) {
        let row_bytes = self.layout.width as usize * 4;
        let data = self.canvas.data();
        for y in region.y0..region.y1 {
            let start = y * row_bytes + region.x0 * 4;
            let end = y * row_bytes + region.x1 * 4;
            frame_buffer[start..end].copy_from_slice(&data[start..end]);
        }
    }
}

/// Porter-Duff over in premultiplied space.
fn blend_over(src: PremultipliedColorU8, dst: PremultipliedColorU8) -> PremultipliedColorU8 {
    match src.alpha() {
        255 => src,
        0 => dst,
        sa => {
            let inv = 255 - sa as u32;
            let mix = |s: u8, d: u8| (s as u32 + (d as u32 * inv + 127) / 255).min(255) as u8;
            PremultipliedColorU8::from_rgba(
                mix(src.red(), dst.red()),
                mix(src.green(), dst.green()),
                mix(src.blue(), dst.blue()),
                mix(src.alpha(), dst.alpha()),
            )
            .unwrap_or(src)
        }
    }
}

fn background() -> Color {
    rgba(BACKGROUND)
}

fn rgba(c: [u8; 4]) -> Color {
    Color::from_rgba8(c[0], c[1], c[2], c[3])
}

fn blank_canvas(layout: &Layout) -> Result<Pixmap> {
    let mut canvas = Pixmap::new(layout.width, layout.height)
        .with_context(|| format!("cannot allocate a {}x{} canvas", layout.width, layout.height))?;
    canvas.fill(background());
    Ok(canvas)
}

fn solid(color: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(rgba(color));
    paint
}

fn fill_bars(pm: &mut Pixmap, bars: &[(f32, f32, f32, f32)], color: [u8; 4]) -> Result<()> {
    let paint = solid(color);
    for &(x, y, w, h) in bars {
        let rect = Rect::from_xywh(x, y, w, h).context("degenerate bar")?;
        pm.fill_rect(rect, &paint, Transform::identity(), None);
    }
    Ok(())
}

fn draw_sprite(slot: CacheSlot) -> Result<Pixmap> {
    match slot {
        CacheSlot::Cross(color) => draw_cross(match color {
            FixationColor::Neutral => BLACK,
            FixationColor::Positive => GREEN,
            FixationColor::Negative => RED,
        }),
        CacheSlot::Frame { cued } => draw_frame(if cued { WHITE } else { BLACK }),
        CacheSlot::Target(stimulus) => draw_target_row(stimulus),
    }
}

fn draw_cross(color: [u8; 4]) -> Result<Pixmap> {
    let size = CROSS_SIZE as f32;
    let line = CROSS_LINE as f32;
    let mut pm = Pixmap::new(CROSS_SIZE, CROSS_SIZE).context("cross pixmap")?;
    let mid = (size - line) * 0.5;
    fill_bars(&mut pm, &[(0.0, mid, size, line), (mid, 0.0, line, size)], color)?;
    Ok(pm)
}

fn draw_frame(color: [u8; 4]) -> Result<Pixmap> {
    let (w, h) = (FRAME_WIDTH as f32, FRAME_HEIGHT as f32);
    let line = FRAME_LINE as f32;
    let mut pm = Pixmap::new(FRAME_WIDTH, FRAME_HEIGHT).context("frame pixmap")?;
    fill_bars(
        &mut pm,
        &[
            (0.0, 0.0, w, line),
            (0.0, h - line, w, line),
            (0.0, 0.0, line, h),
            (w - line, 0.0, line, h),
        ],
        color,
    )?;
    Ok(pm)
}

fn draw_target_row(stimulus: TargetStimulus) -> Result<Pixmap> {
    let mut pm = Pixmap::new(ROW_WIDTH, ROW_HEIGHT).context("target row pixmap")?;
    let paint = solid(BLACK);
    for (i, direction) in stimulus.arrows().into_iter().enumerate() {
        let x = (i as u32 * (CHEVRON_WIDTH + CHEVRON_GAP)) as f32;
        let path = chevron(x, direction).context("chevron path")?;
        pm.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    Ok(pm)
}

/// Filled `>` or `<` occupying one chevron cell starting at `x`.
fn chevron(x: f32, direction: ArrowDirection) -> Option<tiny_skia::Path> {
    let w = CHEVRON_WIDTH as f32;
    let h = CHEVRON_HEIGHT as f32;
    let t = CHEVRON_STROKE;
    let outline = [
        (0.0, 0.0),
        (t, 0.0),
        (w, h * 0.5),
        (t, h),
        (0.0, h),
        (w - t, h * 0.5),
    ];
    let place = |(px, py): (f32, f32)| match direction {
        ArrowDirection::Right => (x + px, py),
        ArrowDirection::Left => (x + w - px, py),
    };

    let mut pb = PathBuilder::new();
    let (sx, sy) = place(outline[0]);
    pb.move_to(sx, sy);
    for p in &outline[1..] {
        let (px, py) = place(*p);
        pb.line_to(px, py);
    }
    pb.close();
    pb.finish()
}
