use antr_core::TargetPosition;

pub const CROSS_SIZE: u32 = 30;
pub const CROSS_LINE: u32 = 4;

pub const CHEVRON_WIDTH: u32 = 24;
pub const CHEVRON_HEIGHT: u32 = 24;
pub const CHEVRON_GAP: u32 = 8;
/// Horizontal thickness of a chevron's arms.
pub const CHEVRON_STROKE: f32 = 6.0;

pub const ROW_WIDTH: u32 = 5 * CHEVRON_WIDTH + 4 * CHEVRON_GAP;
pub const ROW_HEIGHT: u32 = CHEVRON_HEIGHT;

pub const FRAME_MARGIN: u32 = 20;
pub const FRAME_LINE: u32 = 3;
pub const FRAME_WIDTH: u32 = ROW_WIDTH + 2 * FRAME_MARGIN;
pub const FRAME_HEIGHT: u32 = ROW_HEIGHT + 2 * FRAME_MARGIN;

pub const BACKGROUND: [u8; 4] = [80, 80, 80, 255];
pub const BLACK: [u8; 4] = [0, 0, 0, 255];
pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const RED: [u8; 4] = [255, 0, 0, 255];

/// Screen geometry. Everything is anchored on the canvas centre; the two
/// frames sit one frame height above and below the cross.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn frame_center(&self, position: TargetPosition) -> (f32, f32) {
        let (cx, cy) = self.center();
        match position {
            TargetPosition::Up => (cx, cy - FRAME_HEIGHT as f32),
            TargetPosition::Down => (cx, cy + FRAME_HEIGHT as f32),
        }
    }

    /// Top-left pixel of a `w`x`h` image centred on `pos`.
    pub fn top_left(pos: (f32, f32), w: u32, h: u32) -> (i32, i32) {
        (
            (pos.0 - w as f32 * 0.5).floor() as i32,
            (pos.1 - h as f32 * 0.5).floor() as i32,
        )
    }

    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}
