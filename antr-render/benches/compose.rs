use antr_core::{CueFrames, FixationColor, TargetPosition, TargetStimulus, VisualState};
use antr_render::SkiaRenderer;
use antr_timing::HighPrecisionTimer;
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

const TRIAL: [VisualState; 6] = [
    VisualState::NEUTRAL,
    VisualState::Cue(CueFrames::Top),
    VisualState::NEUTRAL,
    VisualState::Target {
        stimulus: TargetStimulus::IncongruentRight,
        position: TargetPosition::Up,
    },
    VisualState::NEUTRAL,
    VisualState::Fixation(FixationColor::Positive),
];

fn harness() -> (SkiaRenderer, Vec<u8>, HighPrecisionTimer) {
    let (width, height) = (1920u32, 1080u32);
    let renderer = SkiaRenderer::new(width, height).expect("renderer");
    let fb = vec![0u8; (width * height * 4) as usize];
    (renderer, fb, HighPrecisionTimer::new())
}

pub fn bench_target_frame(c: &mut Criterion) {
    let mut g = c.benchmark_group("compose");
    g.sample_size(40);

    g.bench_function("target_frame", |b| {
        b.iter_batched(
            harness,
            |(mut r, mut fb, mut t)| {
                let stats = r.render_frame(&TRIAL[3], &mut fb, &mut t);
                black_box(stats)
            },
            BatchSize::LargeInput,
        )
    });

    g.bench_function("trial_timeline", |b| {
        let (mut r, mut fb, mut t) = harness();
        b.iter(|| {
            for state in &TRIAL {
                black_box(r.render_frame(state, &mut fb, &mut t).ok());
            }
        })
    });

    g.finish();
}

criterion_group!(benches, bench_target_frame);
criterion_main!(benches);
