use antr_core::{ConfigurationError, KeyBindings, KeyId};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Duration;

/// Phase durations, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Half-open range the pre-cue baseline is drawn from, per trial.
    pub baseline_range_ms: (u64, u64),
    pub cue_display_ms: u64,
    pub cue_target_interval_ms: u64,
    pub target_display_ms: u64,
    /// Response budget counted from target onset.
    pub max_response_ms: u64,
    pub feedback_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            baseline_range_ms: (1500, 3500),
            cue_display_ms: 100,
            cue_target_interval_ms: 400,
            target_display_ms: 200,
            max_response_ms: 1700,
            feedback_ms: 400,
        }
    }
}

impl TimingConfig {
    pub fn baseline_range(&self) -> Range<Duration> {
        let (lo, hi) = self.baseline_range_ms;
        Duration::from_millis(lo)..Duration::from_millis(hi)
    }

    pub fn cue_display(&self) -> Duration {
        Duration::from_millis(self.cue_display_ms)
    }

    pub fn cue_target_interval(&self) -> Duration {
        Duration::from_millis(self.cue_target_interval_ms)
    }

    pub fn target_display(&self) -> Duration {
        Duration::from_millis(self.target_display_ms)
    }

    pub fn feedback(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }

    /// Counted from target onset.
    pub fn max_response(&self) -> Duration {
        Duration::from_millis(self.max_response_ms)
    }

    /// How long the input wait runs once the target is gone, when the
    /// blank after it commits instantly.
    pub fn response_window(&self) -> Duration {
        Duration::from_millis(self.max_response_ms.saturating_sub(self.target_display_ms))
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let (lo, hi) = self.baseline_range_ms;
        if lo >= hi {
            return Err(ConfigurationError::InvalidTiming(format!(
                "baseline range [{lo}, {hi}) ms is empty"
            )));
        }
        if self.max_response_ms <= self.target_display_ms {
            return Err(ConfigurationError::InvalidTiming(format!(
                "response budget {} ms does not outlast the {} ms target",
                self.max_response_ms, self.target_display_ms
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub timing: TimingConfig,
    pub keys: KeyBindings,
}

impl SequencerConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.timing.validate()?;
        self.keys.validate()
    }
}

/// Session-level settings around the trial loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Any of these starts the session; `t` is the scanner trigger.
    pub start_keys: Vec<KeyId>,
    pub lead_in_ms: u64,
    /// Drawn at startup when absent; always logged.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start_keys: vec![KeyId::new('t'), KeyId::SPACE],
            lead_in_ms: 1000,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn lead_in(&self) -> Duration {
        Duration::from_millis(self.lead_in_ms)
    }
}
