use crate::config::TimingConfig;
use antr_core::{Classification, TrialPhase, TrialSpec, VisualState};
use std::time::Duration;

/// How long each phase is held for one trial. Only the baseline varies
/// between trials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialDurations {
    pub baseline: Duration,
    pub cue: Duration,
    pub cue_target_gap: Duration,
    pub target: Duration,
    /// Nominal wait once the target is gone.
    pub response_window: Duration,
    /// Everything from target onset to the end of the response window.
    pub response_budget: Duration,
    pub feedback: Duration,
}

impl TrialDurations {
    pub fn new(timing: &TimingConfig, baseline: Duration) -> Self {
        Self {
            baseline,
            cue: timing.cue_display(),
            cue_target_gap: timing.cue_target_interval(),
            target: timing.target_display(),
            response_window: timing.response_window(),
            response_budget: timing.max_response(),
            feedback: timing.feedback(),
        }
    }

    /// What is left of the response budget `since_target` after target onset.
    /// Slow frames between the target and the wait shorten the window.
    pub fn remaining_budget(&self, since_target: Duration) -> Duration {
        self.response_budget.saturating_sub(since_target)
    }

    /// For the response window this is the nominal wait.
    pub fn hold(&self, phase: TrialPhase) -> Duration {
        match phase {
            TrialPhase::Baseline => self.baseline,
            TrialPhase::Cue => self.cue,
            TrialPhase::CueTargetGap => self.cue_target_gap,
            TrialPhase::Target => self.target,
            TrialPhase::PostTargetBlank => Duration::ZERO,
            TrialPhase::ResponseWindow => self.response_window,
            TrialPhase::Feedback => self.feedback,
        }
    }
}

/// The frame a phase shows. `None` for the response window, which keeps the
/// post-target blank on screen. Feedback needs the trial's classification.
pub fn planned_state(
    spec: &TrialSpec,
    phase: TrialPhase,
    classification: Classification,
) -> Option<VisualState> {
    match phase {
        TrialPhase::Baseline | TrialPhase::CueTargetGap | TrialPhase::PostTargetBlank => {
            Some(VisualState::NEUTRAL)
        }
        TrialPhase::Cue => Some(VisualState::cue(spec.cue_up(), spec.cue_down())),
        TrialPhase::Target => Some(VisualState::Target {
            stimulus: spec.target_stimulus(),
            position: spec.target_position(),
        }),
        TrialPhase::ResponseWindow => None,
        TrialPhase::Feedback => Some(VisualState::Fixation(classification.feedback_color())),
    }
}

/// Phase onsets of one trial, as timer timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialTimestamps<T> {
    onsets: Vec<(TrialPhase, T)>,
}

impl<T: Copy> TrialTimestamps<T> {
    pub fn mark(&mut self, phase: TrialPhase, at: T) {
        self.onsets.push((phase, at));
    }

    pub fn onset(&self, phase: TrialPhase) -> Option<T> {
        self.onsets
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, at)| *at)
    }

    pub fn phases(&self) -> impl Iterator<Item = TrialPhase> + '_ {
        self.onsets.iter().map(|(p, _)| *p)
    }
}
