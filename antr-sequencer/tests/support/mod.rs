#![allow(dead_code)]

use antr_core::{
    ArrowDirection, CapabilityError, DisplaySurface, FlankerCongruency, InputChannel, KeyId,
    ResponseOutcome, TargetPosition, TrialSpec, VisualState,
};
use antr_sequencer::{SequencerConfig, TrialSequencer};
use antr_timing::{CalibrationStats, Timer, VirtualTimer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Remembers every committed frame; optionally fails on the n-th render.
/// With `lag` set, every commit takes that long on the given clock.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub states: Vec<VisualState>,
    pub fail_on: Option<usize>,
    pub lag: Option<(VirtualTimer, Duration)>,
}

impl DisplaySurface for RecordingDisplay {
    fn render(&mut self, state: &VisualState) -> Result<(), CapabilityError> {
        if self.fail_on == Some(self.states.len()) {
            return Err(CapabilityError::Display("vsync lost".into()));
        }
        self.states.push(*state);
        if let Some((timer, lag)) = &self.lag {
            timer.advance(*lag);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitCall {
    pub timeout: Option<Duration>,
    pub recognized: Vec<KeyId>,
}

/// Plays back queued outcomes and moves the shared virtual clock as if the
/// wait had really blocked. An empty script times out.
#[derive(Debug)]
pub struct ScriptedInput {
    pub script: VecDeque<Result<ResponseOutcome, CapabilityError>>,
    pub calls: Vec<WaitCall>,
    timer: VirtualTimer,
}

impl ScriptedInput {
    pub fn new(timer: VirtualTimer) -> Self {
        Self {
            script: VecDeque::new(),
            calls: Vec::new(),
            timer,
        }
    }

    pub fn press(&mut self, key: char, after_ms: u64) -> &mut Self {
        self.script.push_back(Ok(ResponseOutcome::pressed(
            KeyId::new(key),
            Duration::from_millis(after_ms),
        )));
        self
    }

    pub fn silence(&mut self) -> &mut Self {
        self.script.push_back(Ok(ResponseOutcome::timeout()));
        self
    }

    pub fn reply(&mut self, outcome: Result<ResponseOutcome, CapabilityError>) -> &mut Self {
        self.script.push_back(outcome);
        self
    }
}

impl InputChannel for ScriptedInput {
    fn wait_for_key(
        &mut self,
        timeout: Option<Duration>,
        recognized: &[KeyId],
    ) -> Result<ResponseOutcome, CapabilityError> {
        self.calls.push(WaitCall {
            timeout,
            recognized: recognized.to_vec(),
        });
        let outcome = self.script.pop_front().unwrap_or(Ok(ResponseOutcome::timeout()))?;
        let blocked = outcome
            .reaction_time
            .or(timeout)
            .unwrap_or(Duration::ZERO);
        self.timer.advance(blocked);
        Ok(outcome)
    }
}

pub type TestSequencer = TrialSequencer<RecordingDisplay, ScriptedInput, VirtualTimer, StdRng>;

pub fn sequencer(seed: u64) -> (TestSequencer, VirtualTimer) {
    let timer = VirtualTimer::new();
    let seq = TrialSequencer::new(
        SequencerConfig::default(),
        RecordingDisplay::default(),
        ScriptedInput::new(timer.clone()),
        timer.clone(),
        StdRng::seed_from_u64(seed),
    )
    .expect("default config is valid");
    (seq, timer)
}

pub fn spec(
    cue_up: bool,
    cue_down: bool,
    direction: ArrowDirection,
    position: TargetPosition,
) -> TrialSpec {
    TrialSpec::new(
        cue_up,
        cue_down,
        direction,
        FlankerCongruency::Congruent,
        position,
    )
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A virtual clock that also moves a little every time it is read, like a
/// real one does between two calls.
#[derive(Debug, Clone, Default)]
pub struct TickingTimer {
    pub inner: VirtualTimer,
    pub tick: Duration,
}

impl Timer for TickingTimer {
    type Timestamp = u64;

    fn now(&self) -> u64 {
        self.inner.advance(self.tick);
        self.inner.now()
    }

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    fn sleep(&self, d: Duration) {
        self.inner.sleep(d)
    }

    fn record_frame(&mut self, d: Duration) {
        self.inner.record_frame(d)
    }

    fn frame_count(&self) -> usize {
        self.inner.frame_count()
    }

    fn calibration_stats(&self) -> CalibrationStats {
        self.inner.calibration_stats()
    }
}

/// Counts `WARN` events seen while installed.
#[derive(Debug, Clone, Default)]
pub struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}
