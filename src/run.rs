use crate::app::{self, SessionJob, WindowSurface};
use crate::cli::{Cli, OutputFormat};
use crate::config::AppConfig;
use crate::headless::{HeadlessSurface, ParticipantProfile, SimulatedParticipant, TargetBoard};
use crate::input::ChannelInput;
use antr_core::{DisplaySurface, InputChannel, TrialSpec};
use antr_render::{OffscreenSurface, SkiaRenderer};
use antr_sequencer::{
    DelimitedSink, JsonLinesSink, ResultSink, Session, SessionError, SessionSummary,
    TrialSequencer, factorial_catalog, load_trial_list, shuffle_trials,
};
use antr_timing::{HighPrecisionTimer, Timer, VirtualTimer};
use anyhow::{Context, Result, ensure};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Off-screen canvas size for dry runs.
const HEADLESS_SIZE: (u32, u32) = (1280, 720);

pub type BoxedSink = Box<dyn ResultSink + Send>;

pub fn execute(cli: &Cli) -> Result<SessionSummary> {
    ensure!(
        (0.0..=1.0).contains(&cli.accuracy) && (0.0..=1.0).contains(&cli.miss_rate),
        "--accuracy and --miss-rate must lie in [0, 1]"
    );

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let seed = config.resolve_seed(cli.seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut trials = match &cli.trials {
        Some(path) => load_trial_list(path)
            .with_context(|| format!("loading trial list {}", path.display()))?,
        None => factorial_catalog(cli.repetitions()),
    };
    if !cli.keep_order {
        shuffle_trials(&mut trials, &mut rng);
    }
    info!(seed, trials = trials.len(), "trial list ready");

    let mut sink = open_sink(cli.output.as_deref(), cli.format)?;

    if cli.headless {
        let profile = ParticipantProfile {
            accuracy: cli.accuracy,
            miss_rate: cli.miss_rate,
            ..ParticipantProfile::default()
        };
        let participant_rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let participant = (profile, participant_rng);
        return if cli.fast {
            run_headless(&config, VirtualTimer::new(), participant, rng, &trials, &mut sink)
        } else {
            run_headless(&config, HighPrecisionTimer::new(), participant, rng, &trials, &mut sink)
        };
    }

    let job: SessionJob = Box::new(move |display: WindowSurface, input: ChannelInput| {
        let timer = HighPrecisionTimer::new();
        run_session(&config, display, input, timer, rng, &trials, &mut sink)
    });
    app::run_windowed(job, !cli.windowed)
}

pub fn open_sink(path: Option<&Path>, format: OutputFormat) -> Result<BoxedSink> {
    let out: Box<dyn Write + Send> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    };
    Ok(match format {
        OutputFormat::Jsonl => Box::new(JsonLinesSink::new(out)),
        OutputFormat::Tsv => Box::new(DelimitedSink::tab_separated(out)),
    })
}

pub fn run_session<D, I, T>(
    config: &AppConfig,
    display: D,
    input: I,
    timer: T,
    rng: StdRng,
    trials: &[TrialSpec],
    sink: &mut BoxedSink,
) -> Result<SessionSummary, SessionError>
where
    D: DisplaySurface,
    I: InputChannel,
    T: Timer<Timestamp = u64>,
{
    let sequencer = TrialSequencer::new(config.sequencer.clone(), display, input, timer, rng)?;
    let mut session = Session::new(sequencer, config.session.clone());
    session.run(trials, sink)
}

fn run_headless<T: Timer<Timestamp = u64>>(
    config: &AppConfig,
    timer: T,
    (profile, participant_rng): (ParticipantProfile, StdRng),
    rng: StdRng,
    trials: &[TrialSpec],
    sink: &mut BoxedSink,
) -> Result<SessionSummary> {
    let (width, height) = HEADLESS_SIZE;
    let board = TargetBoard::default();
    let display = HeadlessSurface::new(
        OffscreenSurface::new(SkiaRenderer::new(width, height)?, timer.clone()),
        board.clone(),
    );
    let participant = SimulatedParticipant::new(
        profile,
        config.sequencer.keys,
        board,
        timer.clone(),
        participant_rng,
    );
    Ok(run_session(config, display, participant, timer, rng, trials, sink)?)
}
