pub mod layout;
pub mod render;
pub mod surface;

pub use layout::Layout;
pub use render::{FrameStats, SkiaRenderer};
pub use surface::OffscreenSurface;
