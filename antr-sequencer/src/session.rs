use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::sequencer::TrialSequencer;
use crate::sink::ResultSink;
use antr_core::{
    Classification, ConfigurationError, DisplaySurface, InputChannel, KeyBindings, ResultRecord,
    TrialSpec, VisualState,
};
use antr_timing::Timer;
use rand::Rng;
use tracing::info;

/// Counts of a finished (or aborted) session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub trials: usize,
    pub responses: usize,
    pub correct: usize,
}

impl SessionSummary {
    pub fn from_records(records: &[ResultRecord], keys: &KeyBindings) -> Self {
        let mut summary = Self {
            trials: records.len(),
            ..Self::default()
        };
        for record in records {
            if record.response_key().is_some() {
                summary.responses += 1;
            }
            let class = keys.classify(record.trial().arrow_direction(), record.response_key());
            if class == Classification::Correct {
                summary.correct += 1;
            }
        }
        summary
    }
}

/// Drives a whole trial list through one sequencer.
pub struct Session<D, I, T, R>
where
    D: DisplaySurface,
    I: InputChannel,
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    sequencer: TrialSequencer<D, I, T, R>,
    config: SessionConfig,
    records: Vec<ResultRecord>,
}

impl<D, I, T, R> Session<D, I, T, R>
where
    D: DisplaySurface,
    I: InputChannel,
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    pub fn new(sequencer: TrialSequencer<D, I, T, R>, config: SessionConfig) -> Self {
        Self {
            sequencer,
            config,
            records: Vec::new(),
        }
    }

    /// Waits for a start key, shows the lead-in fixation, then runs every
    /// trial in order. Each record goes to `sink` as soon as its trial ends;
    /// the first error stops the session.
    pub fn run<S: ResultSink + ?Sized>(
        &mut self,
        trials: &[TrialSpec],
        sink: &mut S,
    ) -> Result<SessionSummary, SessionError> {
        if trials.is_empty() {
            return Err(ConfigurationError::EmptyTrialList.into());
        }

        if !self.config.start_keys.is_empty() {
            info!(keys = ?self.config.start_keys, "waiting for start key");
            self.sequencer
                .input_mut()
                .wait_for_key(None, &self.config.start_keys)?;
        }
        self.sequencer.display_mut().render(&VisualState::NEUTRAL)?;
        self.sequencer.timer().sleep(self.config.lead_in());

        info!(trials = trials.len(), seed = ?self.config.seed, "session started");
        for spec in trials {
            let record = self.sequencer.run_trial(spec)?;
            sink.append(&record)?;
            self.records.push(record);
        }
        sink.finish()?;

        let summary = self.summary();
        info!(
            trials = summary.trials,
            responses = summary.responses,
            correct = summary.correct,
            "session finished"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_records(&self.records, &self.sequencer.config().keys)
    }

    /// Records in execution order.
    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn sequencer(&self) -> &TrialSequencer<D, I, T, R> {
        &self.sequencer
    }

    pub fn into_sequencer(self) -> TrialSequencer<D, I, T, R> {
        self.sequencer
    }
}
