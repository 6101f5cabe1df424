use antr_core::{
    CueFrames, DisplaySurface, FixationColor, TargetPosition, TargetStimulus, VisualState,
};
use antr_render::layout::*;
use antr_render::{OffscreenSurface, SkiaRenderer};
use antr_timing::{Timer, VirtualTimer};

fn surface() -> OffscreenSurface<VirtualTimer> {
    OffscreenSurface::new(SkiaRenderer::new(640, 480).unwrap(), VirtualTimer::new())
}

fn frame_origin(layout: Layout, position: TargetPosition) -> (u32, u32) {
    let (x, y) = Layout::top_left(layout.frame_center(position), FRAME_WIDTH, FRAME_HEIGHT);
    (x as u32, y as u32)
}

/// Pixels inside a frame's outline that differ from the background.
fn marked_inside(s: &OffscreenSurface<VirtualTimer>, position: TargetPosition) -> usize {
    let (x0, y0) = frame_origin(s.layout(), position);
    let mut n = 0;
    for y in y0 + FRAME_LINE..y0 + FRAME_HEIGHT - FRAME_LINE {
        for x in x0 + FRAME_LINE..x0 + FRAME_WIDTH - FRAME_LINE {
            if s.pixel(x, y) != Some(BACKGROUND) {
                n += 1;
            }
        }
    }
    n
}

fn outline(s: &OffscreenSurface<VirtualTimer>, position: TargetPosition) -> Option<[u8; 4]> {
    let (x0, y0) = frame_origin(s.layout(), position);
    s.pixel(x0 + 1, y0 + 1)
}

fn cross_center(s: &OffscreenSurface<VirtualTimer>) -> Option<[u8; 4]> {
    let (cx, cy) = s.layout().center();
    s.pixel(cx as u32, cy as u32)
}

#[test]
fn fixation_shows_cross_and_plain_frames() {
    let mut s = surface();
    s.render(&VisualState::NEUTRAL).unwrap();

    assert_eq!(s.pixel(0, 0), Some(BACKGROUND));
    assert_eq!(cross_center(&s), Some(BLACK));
    assert_eq!(outline(&s, TargetPosition::Up), Some(BLACK));
    assert_eq!(outline(&s, TargetPosition::Down), Some(BLACK));
    assert_eq!(marked_inside(&s, TargetPosition::Up), 0);
    assert_eq!(marked_inside(&s, TargetPosition::Down), 0);
}

#[test]
fn feedback_recolours_the_cross() {
    let mut s = surface();
    s.render(&VisualState::Fixation(FixationColor::Positive)).unwrap();
    assert_eq!(cross_center(&s), Some(GREEN));
    s.render(&VisualState::Fixation(FixationColor::Negative)).unwrap();
    assert_eq!(cross_center(&s), Some(RED));
}

#[test]
fn cue_brightens_only_the_cued_frame() {
    let mut s = surface();
    s.render(&VisualState::Cue(CueFrames::Top)).unwrap();
    assert_eq!(outline(&s, TargetPosition::Up), Some(WHITE));
    assert_eq!(outline(&s, TargetPosition::Down), Some(BLACK));
    assert_eq!(cross_center(&s), Some(BLACK));

    s.render(&VisualState::Cue(CueFrames::Both)).unwrap();
    assert_eq!(outline(&s, TargetPosition::Up), Some(WHITE));
    assert_eq!(outline(&s, TargetPosition::Down), Some(WHITE));
}

#[test]
fn target_row_lands_inside_its_frame() {
    let mut s = surface();
    s.render(&VisualState::Target {
        stimulus: TargetStimulus::IncongruentLeft,
        position: TargetPosition::Down,
    })
    .unwrap();

    assert!(marked_inside(&s, TargetPosition::Down) > 0);
    assert_eq!(marked_inside(&s, TargetPosition::Up), 0);
    assert_eq!(cross_center(&s), Some(BLACK));
}

#[test]
fn previous_target_is_erased_by_the_next_frame() {
    let mut s = surface();
    s.render(&VisualState::Target {
        stimulus: TargetStimulus::CongruentRight,
        position: TargetPosition::Up,
    })
    .unwrap();
    s.render(&VisualState::NEUTRAL).unwrap();

    assert_eq!(marked_inside(&s, TargetPosition::Up), 0);
    assert_eq!(outline(&s, TargetPosition::Up), Some(BLACK));
    assert_eq!(s.frames_rendered(), 2);
}

#[test]
fn frame_timing_is_recorded_on_the_surface_clock() {
    let mut s = surface();
    s.render(&VisualState::NEUTRAL).unwrap();
    s.render(&VisualState::Cue(CueFrames::Bottom)).unwrap();
    assert_eq!(s.timer().frame_count(), 2);
    assert_eq!(s.last_stats().map(|st| st.dirty_count), Some(3));
    assert_eq!(s.renderer().compose_stats().effective_fps, 0.0);
}

#[test]
fn mismatched_frame_buffer_is_an_error() {
    let mut renderer = SkiaRenderer::new(320, 240).unwrap();
    let mut small = vec![0u8; 16];
    let err = renderer
        .render_frame(&VisualState::NEUTRAL, &mut small, &mut VirtualTimer::new())
        .unwrap_err();
    assert!(err.to_string().contains("frame buffer"));
}

#[test]
fn resize_starts_a_fresh_canvas() {
    let mut renderer = SkiaRenderer::new(320, 240).unwrap();
    let mut timer = VirtualTimer::new();
    let mut fb = vec![0u8; 320 * 240 * 4];
    renderer.render_frame(&VisualState::NEUTRAL, &mut fb, &mut timer).unwrap();

    renderer.resize(800, 600).unwrap();
    let mut fb = vec![0u8; 800 * 600 * 4];
    renderer.render_frame(&VisualState::NEUTRAL, &mut fb, &mut timer).unwrap();
    assert_eq!(&fb[0..4], &BACKGROUND);
    let center = (300 * 800 + 400) * 4;
    assert_eq!(&fb[center..center + 4], &BLACK);
}
