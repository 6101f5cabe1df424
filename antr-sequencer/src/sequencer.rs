use super::config::SequencerConfig;
use super::trial::{TrialDurations, TrialTimestamps, planned_state};
use antr_core::{
    CapabilityError, Classification, ConfigurationError, DisplaySurface, InputChannel,
    ResponseOutcome, ResultRecord, TrialPhase, TrialSpec, VisualState,
};
use antr_timing::Timer;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs single trials end to end against an injected display, input, clock
/// and random source.
pub struct TrialSequencer<D, I, T, R>
where
    D: DisplaySurface,
    I: InputChannel,
    T: Timer,
    R: Rng,
{
    display: D,
    input: I,
    timer: T,
    rng: R,
    config: SequencerConfig,
    trial_number: usize,
    last_timestamps: Option<TrialTimestamps<T::Timestamp>>,
}

impl<D, I, T, R> TrialSequencer<D, I, T, R>
where
    D: DisplaySurface,
    I: InputChannel,
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(
        config: SequencerConfig,
        display: D,
        input: I,
        timer: T,
        rng: R,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            display,
            input,
            timer,
            rng,
            config,
            trial_number: 0,
            last_timestamps: None,
        })
    }

    /// Plays the whole phase timeline for `spec` and returns its record.
    ///
    /// Blocks for the sum of the phase holds plus the response latency. A
    /// capability failure aborts the trial and nothing is recorded for it.
    pub fn run_trial(&mut self, spec: &TrialSpec) -> Result<ResultRecord, CapabilityError> {
        let baseline = self.draw_baseline();
        let durations = TrialDurations::new(&self.config.timing, baseline);
        let mut timestamps = TrialTimestamps::default();
        let mut outcome = ResponseOutcome::timeout();
        let mut classification = Classification::Timeout;

        debug!(
            trial = self.trial_number,
            baseline_ms = durations.baseline.as_millis() as u64,
            "trial started"
        );

        for phase in TrialPhase::ALL {
            if phase.allows_input() {
                let opened = self.timer.now();
                timestamps.mark(phase, opened);
                let since_target = timestamps
                    .onset(TrialPhase::Target)
                    .map_or(Duration::ZERO, |target| self.timer.elapsed(target));
                outcome = self.collect_response(durations.remaining_budget(since_target))?;
                classification = self
                    .config
                    .keys
                    .classify(spec.arrow_direction(), outcome.key);
                continue;
            }
            if let Some(state) = planned_state(spec, phase, classification) {
                let onset = self.present(&state)?;
                timestamps.mark(phase, onset);
                debug!(trial = self.trial_number, phase = phase.name(), onset_ns = onset, "phase onset");
                self.hold_from(onset, durations.hold(phase), phase);
            }
        }

        // The wait opened after the target was cleared; shift to target onset.
        let reaction_time = outcome
            .reaction_time
            .map(|measured| measured + self.config.timing.target_display());
        let record = ResultRecord::new(spec.clone(), outcome.key, reaction_time);

        info!(
            trial = self.trial_number,
            cue = spec.cue_validity().name(),
            target = ?spec.target_stimulus(),
            result = classification.name(),
            rt_ms = reaction_time.map(|rt| rt.as_secs_f64() * 1e3),
            "trial complete"
        );

        self.trial_number += 1;
        self.last_timestamps = Some(timestamps);
        Ok(record)
    }

    fn draw_baseline(&mut self) -> Duration {
        let range = self.config.timing.baseline_range();
        let lo = range.start.as_micros() as u64;
        let hi = range.end.as_micros() as u64;
        Duration::from_micros(self.rng.random_range(lo..hi))
    }

    fn present(&mut self, state: &VisualState) -> Result<u64, CapabilityError> {
        self.display.render(state)?;
        Ok(self.timer.now())
    }

    /// Sleeps out whatever is left of `hold` since `onset`.
    fn hold_from(&self, onset: u64, hold: Duration, phase: TrialPhase) {
        if hold.is_zero() {
            return;
        }
        let spent = self.timer.elapsed(onset);
        match hold.checked_sub(spent) {
            Some(remaining) if !remaining.is_zero() => self.timer.sleep(remaining),
            Some(_) => {}
            None => warn!(
                phase = phase.name(),
                overrun_us = (spent - hold).as_micros() as u64,
                "phase overran its hold"
            ),
        }
    }

    fn collect_response(&mut self, window: Duration) -> Result<ResponseOutcome, CapabilityError> {
        let recognized = self.config.keys.recognized();
        let outcome = self.input.wait_for_key(Some(window), &recognized)?;
        Ok(match (outcome.key, outcome.reaction_time) {
            (None, None) => outcome,
            (Some(key), _) if self.config.keys.direction_of(key).is_none() => {
                warn!(%key, "input reported an unbound key; recording a timeout");
                ResponseOutcome::timeout()
            }
            (Some(_), Some(elapsed)) if elapsed <= window => outcome,
            (Some(key), Some(elapsed)) => {
                warn!(
                    %key,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "response arrived after the window closed; recording a timeout"
                );
                ResponseOutcome::timeout()
            }
            (key, elapsed) => {
                warn!(?key, ?elapsed, "incomplete response from input; recording a timeout");
                ResponseOutcome::timeout()
            }
        })
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Trials completed so far.
    pub fn trials_run(&self) -> usize {
        self.trial_number
    }

    /// Phase onsets of the most recent completed trial.
    pub fn last_timestamps(&self) -> Option<&TrialTimestamps<u64>> {
        self.last_timestamps.as_ref()
    }

    pub fn into_parts(self) -> (D, I, T, R) {
        (self.display, self.input, self.timer, self.rng)
    }
}
